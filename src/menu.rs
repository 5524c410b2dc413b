use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::models::Action;

const PAGE_SKIP: usize = 10;
const TITLE_HEIGHT: usize = 2;

/// Scrollable single-column menu. Selection wraps at both ends; paging
/// clamps. Esc takes the fast exit through an item labelled "Back".
#[derive(Debug, Clone)]
pub struct ListMenu {
    title: String,
    items: Vec<(String, Action)>,
    selected: usize,
    scroll: usize,
}

impl ListMenu {
    pub fn new(title: impl Into<String>, items: Vec<(String, Action)>) -> Self {
        ListMenu {
            title: title.into(),
            items,
            selected: 0,
            scroll: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Swap the item list in place, keeping the selection in bounds.
    /// Used when a screen refreshes the menu after returning to it.
    pub fn set_items(&mut self, items: Vec<(String, Action)>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<Action> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;

        match key {
            KeyCode::Up => {
                self.selected = if self.selected == 0 { last } else { self.selected - 1 };
            }
            KeyCode::Down => {
                self.selected = if self.selected == last { 0 } else { self.selected + 1 };
            }
            KeyCode::PageUp => self.selected = self.selected.saturating_sub(PAGE_SKIP),
            KeyCode::PageDown => self.selected = (self.selected + PAGE_SKIP).min(last),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = last,
            KeyCode::Esc => {
                return self
                    .items
                    .iter()
                    .find(|(label, _)| label == "Back")
                    .map(|(_, action)| action.clone());
            }
            KeyCode::Enter => return Some(self.items[self.selected].1.clone()),
            _ => {}
        }
        None
    }

    /// Keep the selected row inside the viewport.
    pub fn scroll_to_selected(&mut self, viewport: usize) {
        if viewport == 0 {
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + viewport {
            self.scroll = self.selected - viewport + 1;
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let width = area.width as usize;
        let viewport = (area.height as usize).saturating_sub(TITLE_HEIGHT);

        let title = Paragraph::new(Line::from(Span::styled(
            self.title.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center);
        f.render_widget(title, Rect::new(area.x, area.y, area.width, 1));
        if area.height > 1 {
            let underline = Paragraph::new(Span::styled(
                ".".repeat(width),
                Style::default().fg(Color::Yellow),
            ));
            f.render_widget(underline, Rect::new(area.x, area.y + 1, area.width, 1));
        }

        self.scroll_to_selected(viewport);
        let (mut rows, overflow) = self.layout_rows(width, viewport);
        if overflow > 0 {
            // Word wrapping pushed the selected row off-screen; advance
            // the scroll and lay the rows out once more.
            self.scroll = (self.scroll + overflow).min(self.selected);
            rows = self.layout_rows(width, viewport).0;
        }

        for (row, (text, item)) in rows.into_iter().take(viewport).enumerate() {
            let style = if item == self.selected {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            let paragraph = Paragraph::new(Line::from(Span::styled(text, style)))
                .alignment(Alignment::Center);
            let y = area.y + (TITLE_HEIGHT + row) as u16;
            f.render_widget(paragraph, Rect::new(area.x, y, area.width, 1));
        }
    }

    /// Display rows starting at the scroll offset, each tagged with its
    /// item index, plus how many rows the selected item's last row
    /// overflows the viewport by.
    fn layout_rows(&self, width: usize, viewport: usize) -> (Vec<(String, usize)>, usize) {
        let mut rows = Vec::new();
        let mut selected_end = 0;
        for (i, (label, _)) in self.items.iter().enumerate().skip(self.scroll) {
            for line in wrap_words(label, width) {
                rows.push((line, i));
            }
            if i == self.selected {
                selected_end = rows.len();
            }
            if rows.len() >= viewport && i >= self.selected {
                break;
            }
        }
        (rows, selected_end.saturating_sub(viewport))
    }
}

/// Greedy wrap on spaces; a single word wider than the width is split
/// hard so no line ever exceeds it.
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.chars().count() <= width {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = vec![String::new()];
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        loop {
            let current = lines.last_mut().expect("at least one line");
            let used = current.chars().count();
            let needed = word.chars().count() + if current.is_empty() { 0 } else { 1 };
            if used + needed <= width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&word);
                break;
            }
            if current.is_empty() {
                let head: String = word.chars().take(width).collect();
                word = word.chars().skip(width).collect();
                current.push_str(&head);
            }
            lines.push(String::new());
            if word.is_empty() {
                break;
            }
        }
    }
    lines.retain(|line| !line.is_empty());
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
