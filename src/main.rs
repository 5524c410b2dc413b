mod cli;
mod menu;
mod models;
mod scheduler;
mod screens;
mod store;
mod ui;
mod widgets;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use std::path::PathBuf;
use store::Store;
use ui::run_tui;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .or_else(|| std::env::var_os("WEEKPLAN_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let store = Store::new(data_dir);
    init_logging(&store)?;

    match cli.command {
        Some(Commands::List) => {
            for activity in store.load_activities()? {
                println!(
                    "{}  [{}]",
                    activity.name,
                    models::priority_label(activity.priority)
                );
            }
        }
        Some(Commands::Add { name, priority }) => {
            store.add_activity(&name, priority)?;
        }
        Some(Commands::Remove { name }) => {
            if !store.remove_activity(&name)? {
                println!("No such activity: {}", name);
            }
        }
        Some(Commands::Random) => {
            let activities = store.load_activities()?;
            let plans = store.load_plans()?;
            let pick = scheduler::pick_weighted(&activities, &plans, &mut rand::thread_rng())?;
            println!("{}", pick);
        }
        Some(Commands::Plans) => {
            for file in store.plan_files()? {
                println!("{}", file);
            }
        }
        Some(Commands::Completions { shell }) => {
            use clap_complete::{generate, Shell};
            let shell = shell.to_lowercase();
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "elvish" => Shell::Elvish,
                "powershell" => Shell::PowerShell,
                _ => {
                    println!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "weekplan", &mut std::io::stdout());
        }
        Some(Commands::Tui) | None => {
            run_tui(store)?;
        }
    }

    Ok(())
}

// Log to a file so nothing scribbles over the terminal while raw mode
// is active.
fn init_logging(store: &Store) -> Result<()> {
    let logs_dir = store.logs_dir();
    std::fs::create_dir_all(&logs_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(logs_dir.join("weekplan.log"))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    log::info!("starting weekplan");
    Ok(())
}
