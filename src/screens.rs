use anyhow::Result;
use crossterm::event::KeyCode;
use rand::Rng;
use ratatui::{layout::Rect, Frame};

use crate::menu::ListMenu;
use crate::models::{Action, Activity, Plan, PRIORITY_LABELS, WEEKDAYS};
use crate::scheduler;
use crate::store::Store;
use crate::widgets::{Container, Widget};

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenKind {
    Main,
    WeekPlanner,
    RandomActivity,
    Config,
    EditActivities,
    EditActivity(String),
    NewActivity,
    WeekConfig,
}

#[derive(Debug, Clone)]
pub enum Body {
    Form(Container),
    Menu(ListMenu),
}

#[derive(Debug, Clone)]
pub struct Screen {
    pub kind: ScreenKind,
    pub body: Body,
}

impl Screen {
    pub fn main() -> Self {
        let mut c = Container::new();
        c.push(Widget::label("Welcome to Week Planner!"));
        c.push(Widget::button("Week Planner", Action::OpenWeekPlanner));
        c.push(Widget::button("Random Activity", Action::OpenRandomActivity));
        c.push(Widget::button("Config", Action::OpenConfig));
        c.push(Widget::button("Quit", Action::Quit));
        Screen {
            kind: ScreenKind::Main,
            body: Body::Form(c),
        }
    }

    pub fn week_planner(store: &Store) -> Result<Self> {
        let labels: Vec<String> = store
            .load_activities()?
            .into_iter()
            .map(|a| a.name)
            .collect();

        let mut c = Container::new();
        c.push(Widget::label("Welcome to Week Planner!"));
        for day in WEEKDAYS {
            c.push(Widget::label(day));
            c.push(Widget::combobox(labels.clone()));
        }
        c.push(Widget::button("Randomise!", Action::Randomise));
        c.push(Widget::button("Export Plan", Action::ExportPlan));
        c.push(Widget::button("Back", Action::Back));
        Ok(Screen {
            kind: ScreenKind::WeekPlanner,
            body: Body::Form(c),
        })
    }

    pub fn random_activity(store: &Store, rng: &mut impl Rng) -> Result<Self> {
        let mut c = Container::new();
        c.push(Widget::label("Welcome to Random Activity!"));
        c.push(Widget::label(random_activity_text(store, rng)?));
        c.push(Widget::button("I don't want to do that", Action::Reroll));
        c.push(Widget::button("Back", Action::Back));
        Ok(Screen {
            kind: ScreenKind::RandomActivity,
            body: Body::Form(c),
        })
    }

    pub fn config() -> Self {
        let mut c = Container::new();
        c.push(Widget::label("Welcome to Config!"));
        c.push(Widget::button("New Activity", Action::OpenNewActivity));
        c.push(Widget::button("Edit Activities", Action::OpenEditActivities));
        c.push(Widget::button("Week Config", Action::OpenWeekConfig));
        c.push(Widget::button("Back", Action::Back));
        Screen {
            kind: ScreenKind::Config,
            body: Body::Form(c),
        }
    }

    pub fn edit_activities(store: &Store) -> Result<Self> {
        let menu = ListMenu::new("Welcome to Edit Activities!", activity_items(store)?);
        Ok(Screen {
            kind: ScreenKind::EditActivities,
            body: Body::Menu(menu),
        })
    }

    pub fn edit_activity(store: &Store, name: &str) -> Result<Self> {
        let priority = store
            .load_activities()?
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.priority)
            .unwrap_or(0);

        let mut c = Container::new();
        c.push(Widget::label("Welcome to Edit Activity!"));
        c.push(Widget::label(format!("Editing activity: {}", name)));
        let mut combo = Widget::combobox(priority_labels());
        combo.set_choice((priority as usize).min(PRIORITY_LABELS.len() - 1));
        c.push(combo);
        c.push(Widget::button("Delete Activity", Action::DeleteActivity));
        c.push(Widget::button("Save", Action::SaveActivity));
        c.push(Widget::button("Back", Action::Back));
        Ok(Screen {
            kind: ScreenKind::EditActivity(name.to_string()),
            body: Body::Form(c),
        })
    }

    pub fn new_activity() -> Self {
        let mut c = Container::new();
        c.push(Widget::label("Welcome to New Activity!"));
        c.push(Widget::label("Enter the name of the new activity:"));
        c.push(Widget::text_field());
        c.push(Widget::label("Enter the priority of the new activity:"));
        c.push(Widget::combobox(priority_labels()));
        c.push(Widget::button("Create Activity", Action::CreateActivity));
        c.push(Widget::button("Back", Action::Back));
        Screen {
            kind: ScreenKind::NewActivity,
            body: Body::Form(c),
        }
    }

    pub fn week_config() -> Self {
        let mut c = Container::new();
        c.push(Widget::label("Welcome to Week Config!"));
        c.push(Widget::label("Nothing to configure yet."));
        c.push(Widget::button("Back", Action::Back));
        Screen {
            kind: ScreenKind::WeekConfig,
            body: Body::Form(c),
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<Action> {
        match &mut self.body {
            Body::Form(c) => c.handle_key(key),
            Body::Menu(m) => m.handle_key(key),
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        match &mut self.body {
            Body::Form(c) => c.render(f, area),
            Body::Menu(m) => m.render(f, area),
        }
    }

    /// Fired when the user backs into this screen, so state derived from
    /// the store can be re-read instead of the screen being rebuilt.
    pub fn on_return(&mut self, store: &Store) -> Result<()> {
        if self.kind == ScreenKind::EditActivities {
            if let Body::Menu(menu) = &mut self.body {
                menu.set_items(activity_items(store)?);
            }
        }
        Ok(())
    }

    /// Whether the focused widget consumes printable characters.
    pub fn wants_text_input(&self) -> bool {
        match &self.body {
            Body::Form(c) => c
                .selected_widget()
                .and_then(|w| w.text())
                .is_some(),
            Body::Menu(_) => false,
        }
    }

    /// Fill every day's combobox with an independent weighted pick.
    pub fn randomise(
        &mut self,
        activities: &[Activity],
        plans: &[Plan],
        rng: &mut impl Rng,
    ) -> Result<()> {
        let Body::Form(c) = &mut self.body else {
            return Ok(());
        };
        for widget in c.widgets_mut() {
            if widget.choice().is_none() {
                continue;
            }
            let pick = scheduler::pick_weighted(activities, plans, rng)?;
            if let Some(index) = widget.find_item(&pick) {
                widget.set_choice(index);
            }
        }
        Ok(())
    }

    /// Day/activity pairs in weekday order, from the combobox per day.
    pub fn plan_entries(&self) -> Vec<(String, String)> {
        let Body::Form(c) = &self.body else {
            return Vec::new();
        };
        WEEKDAYS
            .iter()
            .zip(c.widgets().iter().filter(|w| w.choice().is_some()))
            .map(|(day, widget)| {
                (day.to_string(), widget.value().unwrap_or("").to_string())
            })
            .collect()
    }

    pub fn first_text(&self) -> Option<&str> {
        match &self.body {
            Body::Form(c) => c.widgets().iter().find_map(|w| w.text()),
            Body::Menu(_) => None,
        }
    }

    pub fn first_choice(&self) -> Option<usize> {
        match &self.body {
            Body::Form(c) => c.widgets().iter().find_map(|w| w.choice()),
            Body::Menu(_) => None,
        }
    }

    pub fn set_label(&mut self, index: usize, text: impl Into<String>) {
        if let Body::Form(c) = &mut self.body {
            if let Some(widget) = c.widget_mut(index) {
                widget.set_text(text);
            }
        }
    }
}

pub fn random_activity_text(store: &Store, rng: &mut impl Rng) -> Result<String> {
    let activities = store.load_activities()?;
    let plans = store.load_plans()?;
    Ok(match scheduler::pick_weighted(&activities, &plans, rng) {
        Ok(name) => format!("Your random activity is: {}", name),
        Err(err) => {
            log::warn!("random pick failed: {}", err);
            err.to_string()
        }
    })
}

fn priority_labels() -> Vec<String> {
    PRIORITY_LABELS.iter().map(|s| s.to_string()).collect()
}

fn activity_items(store: &Store) -> Result<Vec<(String, Action)>> {
    let mut items: Vec<(String, Action)> = store
        .load_activities()?
        .into_iter()
        .map(|a| (a.name.clone(), Action::OpenEditActivity(a.name)))
        .collect();
    items.push(("Back".to_string(), Action::Back));
    Ok(items)
}

enum Pending {
    Forward(Screen),
    Backward,
}

/// Screen history. Forward transitions push freshly built screens;
/// going back re-exposes the prior instance with its state intact. At
/// most one pending transition resolves per input cycle.
pub struct Nav {
    stack: Vec<Screen>,
    pending: Option<Pending>,
}

impl Nav {
    pub fn new(root: Screen) -> Self {
        Nav {
            stack: vec![root],
            pending: None,
        }
    }

    pub fn active(&self) -> &Screen {
        self.stack.last().expect("navigation stack never empties")
    }

    pub fn active_mut(&mut self) -> &mut Screen {
        self.stack.last_mut().expect("navigation stack never empties")
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn advance(&mut self, screen: Screen) {
        self.pending = Some(Pending::Forward(screen));
    }

    pub fn back(&mut self) {
        self.pending = Some(Pending::Backward);
    }

    pub fn resolve(&mut self, store: &Store) -> Result<()> {
        match self.pending.take() {
            Some(Pending::Forward(screen)) => {
                log::debug!("advancing to {:?}", screen.kind);
                self.stack.push(screen);
            }
            Some(Pending::Backward) => {
                // The root screen stays put; quitting is an explicit
                // action, never a pop past the bottom.
                if self.stack.len() > 1 {
                    self.stack.pop();
                    log::debug!("returning to {:?}", self.active().kind);
                    self.active_mut().on_return(store)?;
                }
            }
            None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn seeded_store(dir: &tempfile::TempDir) -> Store {
        let store = Store::new(dir.path());
        store.add_activity("Reading", 1).unwrap();
        store.add_activity("Gaming", 3).unwrap();
        store
    }

    #[test]
    fn going_back_reuses_the_prior_screen_instance() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir);

        let mut main = Screen::main();
        // Move the focus so the instance has state worth preserving.
        main.handle_key(KeyCode::Down);
        let focus_before = match &main.body {
            Body::Form(c) => c.selected_index(),
            Body::Menu(_) => None,
        };

        let mut nav = Nav::new(main);
        nav.advance(Screen::config());
        nav.resolve(&store).unwrap();
        assert_eq!(nav.active().kind, ScreenKind::Config);
        assert_eq!(nav.depth(), 2);

        nav.back();
        nav.resolve(&store).unwrap();
        assert_eq!(nav.active().kind, ScreenKind::Main);
        let focus_after = match &nav.active().body {
            Body::Form(c) => c.selected_index(),
            Body::Menu(_) => None,
        };
        assert_eq!(focus_after, focus_before);
    }

    #[test]
    fn at_most_one_transition_resolves_per_cycle() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir);

        let mut nav = Nav::new(Screen::main());
        nav.advance(Screen::config());
        nav.advance(Screen::week_config());
        nav.resolve(&store).unwrap();
        assert_eq!(nav.depth(), 2);
        assert_eq!(nav.active().kind, ScreenKind::WeekConfig);

        // Nothing pending: resolving again changes nothing.
        nav.resolve(&store).unwrap();
        assert_eq!(nav.depth(), 2);
    }

    #[test]
    fn back_at_the_root_keeps_the_root() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir);

        let mut nav = Nav::new(Screen::main());
        nav.back();
        nav.resolve(&store).unwrap();
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.active().kind, ScreenKind::Main);
    }

    #[test]
    fn backing_into_edit_activities_rereads_the_store() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir);

        let mut nav = Nav::new(Screen::edit_activities(&store).unwrap());
        nav.advance(Screen::edit_activity(&store, "Reading").unwrap());
        nav.resolve(&store).unwrap();

        store.remove_activity("Reading").unwrap();
        nav.back();
        nav.resolve(&store).unwrap();

        let Body::Menu(menu) = &nav.active().body else {
            panic!("edit activities holds a menu");
        };
        // One remaining activity plus the Back item.
        assert_eq!(menu.len(), 2);
    }

    #[test]
    fn forward_transitions_do_not_refresh_the_new_screen() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir);

        let mut nav = Nav::new(Screen::main());
        let screen = Screen::edit_activities(&store).unwrap();
        store.add_activity("Cooking", 2).unwrap();
        nav.advance(screen);
        nav.resolve(&store).unwrap();

        let Body::Menu(menu) = &nav.active().body else {
            panic!("edit activities holds a menu");
        };
        // Built before Cooking existed and pushed forward, so it still
        // shows the two original activities plus Back.
        assert_eq!(menu.len(), 3);
    }

    #[test]
    fn week_planner_has_a_combobox_per_weekday() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir);

        let screen = Screen::week_planner(&store).unwrap();
        let Body::Form(c) = &screen.body else {
            panic!("week planner holds a form");
        };
        let comboboxes = c.widgets().iter().filter(|w| w.choice().is_some()).count();
        assert_eq!(comboboxes, 7);
    }

    #[test]
    fn randomise_fills_every_day_from_the_pool() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir);

        let mut screen = Screen::week_planner(&store).unwrap();
        let activities = store.load_activities().unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        screen.randomise(&activities, &[], &mut rng).unwrap();

        let entries = screen.plan_entries();
        assert_eq!(entries.len(), 7);
        for ((day, activity), expected_day) in entries.iter().zip(WEEKDAYS.iter()) {
            assert_eq!(day, expected_day);
            assert!(activity == "Reading" || activity == "Gaming");
        }
    }

    #[test]
    fn new_activity_screen_captures_text_input() {
        let mut screen = Screen::new_activity();
        assert!(screen.wants_text_input());

        for c in "Hiking".chars() {
            screen.handle_key(KeyCode::Char(c));
        }
        assert_eq!(screen.first_text(), Some("Hiking"));

        // Focus moves to the priority combobox; q no longer types.
        screen.handle_key(KeyCode::Down);
        assert!(!screen.wants_text_input());
        screen.handle_key(KeyCode::Right);
        screen.handle_key(KeyCode::Right);
        assert_eq!(screen.first_choice(), Some(2));
    }

    #[test]
    fn edit_activity_combobox_starts_at_the_stored_priority() {
        let dir = tempdir().unwrap();
        let store = seeded_store(&dir);

        let screen = Screen::edit_activity(&store, "Gaming").unwrap();
        assert_eq!(screen.first_choice(), Some(3));
    }
}
