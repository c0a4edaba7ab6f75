//! Command-line front-end for taskbin.
//!
//! # Responsibility
//! - Map commands onto `LifecycleManager` operations.
//! - Own process wiring: env configuration, logging, database location.
//!
//! Exit codes: 0 success, 1 operation failure, 2 usage error.

mod args;

use args::{Cli, Command};
use clap::Parser;
use log::error;
use mockable::DefaultClock;
use std::process::ExitCode;
use std::sync::Arc;
use taskbin_core::config::MS_PER_DAY;
use taskbin_core::db::open_db;
use taskbin_core::{
    default_log_level, init_logging, parse_retention_window, LifecycleConfig, LifecycleManager,
    LifecycleResult, SqliteTaskRepository, Task,
};

const DEFAULT_DB_PATH: &str = "taskbin.sqlite3";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too and go to stdout.
            let code = if err.use_stderr() { 2 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::from(1)
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    if command == Command::Version {
        println!("{}", version_report());
        return Ok(());
    }

    if let Ok(log_dir) = std::env::var("TASKBIN_LOG_DIR") {
        let level = std::env::var("TASKBIN_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().to_string());
        init_logging(&level, &log_dir).map_err(|err| err.to_string())?;
    }

    let config = match std::env::var("TASKBIN_RETENTION") {
        Ok(value) => parse_retention_window(&value)
            .and_then(LifecycleConfig::with_retention_ms)
            .map_err(|err| err.to_string())?,
        Err(_) => LifecycleConfig::default(),
    };
    let db_path = std::env::var("TASKBIN_DB").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

    let conn = open_db(&db_path).map_err(|err| err.to_string())?;
    let repo = SqliteTaskRepository::try_new(conn).map_err(|err| err.to_string())?;
    let mut manager = LifecycleManager::open(repo, Arc::new(DefaultClock), config)
        .map_err(|err| err.to_string())?;

    execute(&mut manager, command).map_err(|err| err.to_string())
}

fn execute(
    manager: &mut LifecycleManager<SqliteTaskRepository, DefaultClock>,
    command: Command,
) -> LifecycleResult<()> {
    match command {
        Command::Add(add) => print_task("created", &manager.create(add.into_draft())?),
        Command::List { category } => {
            let tasks = match category {
                Some(category) => manager.list_active_by_category(&category)?,
                None => manager.list_active()?,
            };
            for task in &tasks {
                println!("{}", format_task(task));
            }
        }
        Command::Done { id } => print_task("toggled", &manager.toggle_complete(id)?),
        Command::Edit(edit) => print_task("edited", &manager.edit(edit.id, &edit.patch())?),
        Command::Delete { id } => print_task("recycled", &manager.delete(id)?),
        Command::Restore { id } => print_task("restored", &manager.restore(id)?),
        Command::Purge { id } => print_task("purged", &manager.purge_one(id)?),
        Command::Bin => {
            let view = manager.open_recycle_bin()?;
            if view.purged > 0 {
                println!("expired and purged: {}", view.purged);
            }
            for entry in &view.entries {
                println!(
                    "{}  (purged in {}d)",
                    format_task(&entry.task),
                    days_until(view.viewed_at, entry.expires_at)
                );
            }
        }
        Command::EmptyBin => println!("purged: {}", manager.empty_recycle_bin()?),
        Command::Sweep => println!("swept: {}", manager.run_maintenance()?),
        Command::Version => {}
    }
    Ok(())
}

/// Core linkage check: health ping plus crate version.
fn version_report() -> String {
    format!(
        "taskbin_core ping={}\ntaskbin_core version={}",
        taskbin_core::ping(),
        taskbin_core::core_version()
    )
}

fn print_task(action: &str, task: &Task) {
    println!("{action}: {}", format_task(task));
}

fn format_task(task: &Task) -> String {
    let mut line = format!(
        "{} [{}] {}",
        task.id,
        if task.completed { "x" } else { " " },
        task.title
    );
    if let Some(due_date) = task.due_date.as_deref() {
        line.push_str(&format!(" due:{due_date}"));
    }
    if let Some(category) = task.category.as_deref() {
        line.push_str(&format!(" #{category}"));
    }
    line
}

/// Whole days left before `expires_at`, rounded up.
fn days_until(now: i64, expires_at: i64) -> i64 {
    let remaining = expires_at.saturating_sub(now).max(0);
    remaining.saturating_add(MS_PER_DAY - 1) / MS_PER_DAY
}
