use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Block, Borders},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use crate::models::Action;
use crate::screens::{self, Nav, Screen, ScreenKind};
use crate::store::Store;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct App {
    store: Store,
    nav: Nav,
    should_quit: bool,
}

impl App {
    pub fn new(store: Store) -> Self {
        App {
            nav: Nav::new(Screen::main()),
            store,
            should_quit: false,
        }
    }

    /// One full input cycle: forward the key, apply whatever action it
    /// produced, then resolve at most one pending screen transition.
    fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        if key == KeyCode::Char('q') && !self.nav.active().wants_text_input() {
            self.should_quit = true;
            return Ok(());
        }

        if let Some(action) = self.nav.active_mut().handle_key(key) {
            self.apply(action)?;
        }
        self.nav.resolve(&self.store)
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Back => self.nav.back(),
            Action::OpenWeekPlanner => self.nav.advance(Screen::week_planner(&self.store)?),
            Action::OpenRandomActivity => self
                .nav
                .advance(Screen::random_activity(&self.store, &mut rand::thread_rng())?),
            Action::OpenConfig => self.nav.advance(Screen::config()),
            Action::OpenNewActivity => self.nav.advance(Screen::new_activity()),
            Action::OpenEditActivities => self.nav.advance(Screen::edit_activities(&self.store)?),
            Action::OpenEditActivity(name) => self
                .nav
                .advance(Screen::edit_activity(&self.store, &name)?),
            Action::OpenWeekConfig => self.nav.advance(Screen::week_config()),
            Action::Randomise => {
                let activities = self.store.load_activities()?;
                let plans = self.store.load_plans()?;
                let outcome = self.nav.active_mut().randomise(
                    &activities,
                    &plans,
                    &mut rand::thread_rng(),
                );
                if let Err(err) = outcome {
                    log::warn!("randomise failed: {}", err);
                }
            }
            Action::ExportPlan => {
                let entries = self.nav.active().plan_entries();
                self.store.write_plan(Local::now().date_naive(), &entries)?;
            }
            Action::Reroll => {
                let text = screens::random_activity_text(&self.store, &mut rand::thread_rng())?;
                self.nav.active_mut().set_label(1, text);
            }
            Action::CreateActivity => self.create_activity()?,
            Action::SaveActivity => self.save_activity()?,
            Action::DeleteActivity => self.delete_activity()?,
        }
        Ok(())
    }

    fn create_activity(&mut self) -> Result<()> {
        let screen = self.nav.active();
        let name = screen.first_text().unwrap_or("").trim().to_string();
        let priority = screen.first_choice().unwrap_or(0) as u32;
        if name.is_empty() {
            log::warn!("refusing to create an activity without a name");
            return Ok(());
        }
        // Duplicates are rejected; the form stays up so the user can
        // pick another name.
        if let Err(err) = self.store.add_activity(&name, priority) {
            log::warn!("create failed: {}", err);
            return Ok(());
        }
        self.nav.back();
        Ok(())
    }

    fn save_activity(&mut self) -> Result<()> {
        let ScreenKind::EditActivity(name) = self.nav.active().kind.clone() else {
            return Ok(());
        };
        let priority = self.nav.active().first_choice().unwrap_or(0) as u32;
        let mut activities = self.store.load_activities()?;
        if let Some(activity) = activities.iter_mut().find(|a| a.name == name) {
            activity.priority = priority;
        }
        self.store.save_activities(&activities)
    }

    fn delete_activity(&mut self) -> Result<()> {
        let ScreenKind::EditActivity(name) = self.nav.active().kind.clone() else {
            return Ok(());
        };
        self.store.remove_activity(&name)?;
        self.nav.back();
        Ok(())
    }

    fn render(&mut self, f: &mut Frame) {
        let block = Block::default().borders(Borders::ALL).title("Week Planner");
        let inner = block.inner(f.area());
        f.render_widget(block, f.area());
        self.nav.active_mut().render(f, inner);
    }
}

pub fn run_tui(store: Store) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    let res = run_app(&mut terminal, &mut app);

    // Raw mode comes off on every exit path before the fault (if any)
    // propagates to the process exit code.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        log::error!("fatal: {:?}", err);
    }
    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        // Poll so idle frames still redraw; a timeout is the "no key"
        // case.
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code)?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
