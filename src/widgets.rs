use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::models::Action;

/// A single on-screen element. Variants expose what they can do through
/// the accessors below instead of callers inspecting the concrete kind.
#[derive(Debug, Clone)]
pub enum Widget {
    Label { text: String },
    Combobox { items: Vec<String>, index: usize },
    Button { label: String, action: Action },
    TextField { text: String },
}

impl Widget {
    pub fn label(text: impl Into<String>) -> Self {
        Widget::Label { text: text.into() }
    }

    pub fn combobox(items: Vec<String>) -> Self {
        Widget::Combobox { items, index: 0 }
    }

    pub fn button(label: impl Into<String>, action: Action) -> Self {
        Widget::Button {
            label: label.into(),
            action,
        }
    }

    pub fn text_field() -> Self {
        Widget::TextField {
            text: String::new(),
        }
    }

    pub fn selectable(&self) -> bool {
        !matches!(self, Widget::Label { .. })
    }

    /// Current combobox item, if this widget holds a choice.
    pub fn value(&self) -> Option<&str> {
        match self {
            Widget::Combobox { items, index } => items.get(*index).map(|s| s.as_str()),
            _ => None,
        }
    }

    /// Current combobox position, if this widget holds a choice.
    pub fn choice(&self) -> Option<usize> {
        match self {
            Widget::Combobox { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn set_choice(&mut self, new_index: usize) {
        if let Widget::Combobox { items, index } = self {
            if new_index < items.len() {
                *index = new_index;
            }
        }
    }

    /// Position of an item within a combobox's list.
    pub fn find_item(&self, item: &str) -> Option<usize> {
        match self {
            Widget::Combobox { items, .. } => items.iter().position(|i| i == item),
            _ => None,
        }
    }

    /// Accumulated text, if this widget holds text entry.
    pub fn text(&self) -> Option<&str> {
        match self {
            Widget::TextField { text } => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn set_text(&mut self, new_text: impl Into<String>) {
        match self {
            Widget::Label { text } | Widget::TextField { text } => *text = new_text.into(),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode) -> Option<Action> {
        match self {
            Widget::Label { .. } => None,
            Widget::Combobox { items, index } => {
                match key {
                    KeyCode::Left => *index = index.saturating_sub(1),
                    KeyCode::Right if *index + 1 < items.len() => *index += 1,
                    _ => {}
                }
                None
            }
            Widget::Button { label, action } => {
                if key == KeyCode::Enter {
                    log::info!("button pressed: {}", label);
                    Some(action.clone())
                } else {
                    None
                }
            }
            Widget::TextField { text } => {
                match key {
                    KeyCode::Esc => text.clear(),
                    KeyCode::Backspace => {
                        text.pop();
                    }
                    KeyCode::Char(c) if c.is_ascii() && !c.is_control() => text.push(c),
                    _ => {}
                }
                None
            }
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, selected: bool) {
        let line = match self {
            Widget::Label { text } => Line::from(Span::styled(
                text.clone(),
                Style::default().fg(Color::Green),
            )),
            Widget::Combobox { items, index } => {
                let style = if selected {
                    Style::default().bg(Color::White).fg(Color::Black)
                } else {
                    Style::default()
                };
                let arrow_style = style.add_modifier(Modifier::BOLD);
                let mut spans = Vec::new();
                if *index > 0 {
                    spans.push(Span::styled("◄", arrow_style));
                }
                let value = items.get(*index).map(|s| s.as_str()).unwrap_or("");
                spans.push(Span::styled(format!(" {} ", value), style));
                if *index + 1 < items.len() {
                    spans.push(Span::styled("►", arrow_style));
                }
                Line::from(spans)
            }
            Widget::Button { label, action } => {
                let style = if selected {
                    // The quit button highlights red, everything else blue.
                    if *action == Action::Quit {
                        Style::default().bg(Color::Red).fg(Color::White)
                    } else {
                        Style::default().bg(Color::Blue).fg(Color::White)
                    }
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("[{}]", label), style))
            }
            Widget::TextField { text } => {
                let style = if selected {
                    Style::default().bg(Color::Blue).fg(Color::White)
                } else {
                    Style::default()
                };
                let shown = if selected {
                    format!("> {}", text)
                } else {
                    text.clone()
                };
                Line::from(Span::styled(shown, style))
            }
        };

        f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}

/// Ordered widgets with a single focus. Up/Down move the focus between
/// selectable widgets; every other key goes to the focused widget.
#[derive(Debug, Clone, Default)]
pub struct Container {
    widgets: Vec<Widget>,
    selected: Option<usize>,
}

impl Container {
    pub fn new() -> Self {
        Container::default()
    }

    /// The first selectable widget pushed becomes the focused one.
    pub fn push(&mut self, widget: Widget) {
        if self.selected.is_none() && widget.selectable() {
            self.selected = Some(self.widgets.len());
        }
        self.widgets.push(widget);
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn widget(&self, index: usize) -> Option<&Widget> {
        self.widgets.get(index)
    }

    pub fn widget_mut(&mut self, index: usize) -> Option<&mut Widget> {
        self.widgets.get_mut(index)
    }

    pub fn widgets_mut(&mut self) -> impl Iterator<Item = &mut Widget> {
        self.widgets.iter_mut()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_widget(&self) -> Option<&Widget> {
        self.selected.and_then(|i| self.widgets.get(i))
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<Action> {
        let step: isize = match key {
            KeyCode::Down => 1,
            KeyCode::Up => -1,
            _ => 0,
        };
        if step != 0 {
            self.move_focus(step);
            return None;
        }

        let index = self.selected?;
        self.widgets[index].handle_key(key)
    }

    /// Scan in the given direction for the next selectable widget,
    /// wrapping modulo the widget count. With no focus (nothing is
    /// selectable) this is a no-op; otherwise the focused widget itself
    /// bounds the scan, so it always terminates.
    fn move_focus(&mut self, step: isize) {
        let Some(current) = self.selected else {
            return;
        };
        let len = self.widgets.len() as isize;
        let mut next = current as isize;
        loop {
            next = (next + step).rem_euclid(len);
            if self.widgets[next as usize].selectable() || next as usize == current {
                break;
            }
        }
        self.selected = Some(next as usize);
    }

    /// One row per widget, in order. Centering is each widget's own
    /// rendering concern.
    pub fn render(&self, f: &mut Frame, area: Rect) {
        for (i, widget) in self.widgets.iter().enumerate() {
            if i as u16 >= area.height {
                break;
            }
            let row = Rect::new(area.x, area.y + i as u16, area.width, 1);
            widget.render(f, row, self.selected == Some(i));
        }
    }
}
