/// CLI argument parsing and command handling.
use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::engine::{TimerEngine, ToggleOutcome};
use crate::store::TaskStore;
use crate::timefmt;

#[derive(Parser)]
#[command(name = "tally", version, about = "Tally - a command-line task timer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks with their live durations.
    List {
        /// Include archived tasks.
        #[arg(long)]
        archived: bool,
    },
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Archive every row of a project (all tasks sharing id + name).
    Archive { id: String, name: String },
    /// Restore an archived project.
    Unarchive { id: String, name: String },
    /// Show the most recent completed runs.
    Log {
        #[arg(short = 'n', long = "count", default_value_t = 20)]
        count: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    Add {
        id: String,
        name: String,
        #[arg(short = 'c', long = "category", default_value = "")]
        category: String,
    },
    /// Start or stop the timer on task N (numbered as listed).
    Toggle { index: usize },
    /// Stop the running timer, if any.
    Stop,
    Delete { index: usize },
    /// Append a timestamped note line to a task.
    Note { index: usize, text: String },
    Edit {
        index: usize,
        #[arg(short = 'n', long = "name")]
        name: Option<String>,
        #[arg(short = 'c', long = "category")]
        category: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add {
        name: String,
        description: Option<String>,
    },
    Rename { old: String, new: String },
    List,
}

/// Execute a CLI command against the engine. Guard rejections and input
/// errors print a notice; nothing here is fatal to the process.
pub fn run<S: TaskStore>(command: Command, engine: &mut TimerEngine<S>) -> Result<()> {
    let now = timefmt::unix_now();
    match command {
        Command::List { archived } => handle_list(engine, archived, now),
        Command::Task { command } => handle_task(command, engine, now),
        Command::Category { command } => handle_category(command, engine),
        Command::Archive { id, name } => {
            let affected = engine.archive_project(&id, &name, now);
            if affected == 0 {
                println!("No tasks found for project '{id} {name}'.");
            } else {
                println!("Archived {affected} task(s) of project '{id} {name}'.");
            }
        }
        Command::Unarchive { id, name } => {
            let affected = engine.unarchive_project(&id, &name);
            if affected == 0 {
                println!("No tasks found for project '{id} {name}'.");
            } else {
                println!("Restored {affected} task(s) of project '{id} {name}'.");
            }
        }
        Command::Log { count } => handle_log(engine, count),
    }
    Ok(())
}

fn handle_task<S: TaskStore>(command: TaskCommand, engine: &mut TimerEngine<S>, now: f64) {
    match command {
        TaskCommand::Add { id, name, category } => {
            if !category.is_empty() && !engine.has_category(&category) {
                println!("Category '{category}' not found, creating it.");
                if let Err(err) = engine.add_category(&category, "") {
                    println!("{err}");
                    return;
                }
            }
            match engine.add_task(&id, &name, &category, now) {
                Ok(index) => println!("Added task {} ('{name}').", index + 1),
                Err(err) => println!("{err}"),
            }
        }
        TaskCommand::Toggle { index } => {
            let Some(index) = zero_based(index) else {
                println!("Task numbers start at 1.");
                return;
            };
            match engine.toggle(index, now) {
                ToggleOutcome::Started => {
                    println!("Started timer on '{}'.", engine.tasks()[index].name);
                }
                ToggleOutcome::Stopped { elapsed } => {
                    println!(
                        "Stopped '{}' after {}.",
                        engine.tasks()[index].name,
                        timefmt::format_time(elapsed)
                    );
                }
                ToggleOutcome::NoSuchTask => println!("No task {}.", index + 1),
                ToggleOutcome::OtherRunning { running } => {
                    println!(
                        "'{}' is already running; stop it first.",
                        engine.tasks()[running].name
                    );
                }
                ToggleOutcome::Archived => println!("Task is archived."),
            }
        }
        TaskCommand::Stop => match engine.stop_active(now) {
            Some(elapsed) => println!("Stopped after {}.", timefmt::format_time(elapsed)),
            None => println!("No task running."),
        },
        TaskCommand::Delete { index } => {
            let Some(index) = zero_based(index) else {
                println!("Task numbers start at 1.");
                return;
            };
            if engine.delete(index, now) {
                println!("Task deleted.");
            } else {
                println!("No task {}.", index + 1);
            }
        }
        TaskCommand::Note { index, text } => {
            let Some(index) = zero_based(index) else {
                println!("Task numbers start at 1.");
                return;
            };
            if engine.append_note(index, &text, now) {
                println!("Note added.");
            } else {
                println!("No task {}.", index + 1);
            }
        }
        TaskCommand::Edit {
            index,
            name,
            category,
        } => {
            let Some(index) = zero_based(index) else {
                println!("Task numbers start at 1.");
                return;
            };
            if engine.edit_task(index, name.as_deref(), category.as_deref()) {
                println!("Task updated.");
            } else {
                println!("No task {}.", index + 1);
            }
        }
    }
}

fn handle_category<S: TaskStore>(command: CategoryCommand, engine: &mut TimerEngine<S>) {
    match command {
        CategoryCommand::Add { name, description } => {
            match engine.add_category(&name, description.as_deref().unwrap_or("")) {
                Ok(()) => println!("Category '{name}' created."),
                Err(err) => println!("{err}"),
            }
        }
        CategoryCommand::Rename { old, new } => match engine.rename_category(&old, &new) {
            Ok(cascaded) => println!("Renamed '{old}' to '{new}' ({cascaded} task(s) updated)."),
            Err(err) => println!("{err}"),
        },
        CategoryCommand::List => {
            if engine.categories().is_empty() {
                println!("No categories.");
                return;
            }
            for category in engine.categories() {
                if category.description.is_empty() {
                    println!("{}", category.name);
                } else {
                    println!("{} - {}", category.name, category.description);
                }
            }
        }
    }
}

fn handle_list<S: TaskStore>(engine: &mut TimerEngine<S>, include_archived: bool, now: f64) {
    let tasks = engine.tasks();
    if tasks.is_empty() {
        println!("No tasks yet. Add one with `tally task add <id> <name>`.");
        return;
    }
    println!(
        "{:>3}  {:<10} {:<30} {:<12} {:<9} {:>10}",
        "#", "ID", "Task", "Category", "Status", "Duration"
    );
    for (index, task) in tasks.iter().enumerate() {
        if task.archived && !include_archived {
            continue;
        }
        let status = if engine.active_index() == Some(index) {
            "Running"
        } else if task.archived {
            "Archived"
        } else {
            "Paused"
        };
        println!(
            "{:>3}  {:<10} {:<30} {:<12} {:<9} {:>10}",
            index + 1,
            task.id,
            task.name,
            task.category,
            status,
            timefmt::format_time(engine.current_duration(index, now))
        );
    }
}

fn handle_log<S: TaskStore>(engine: &mut TimerEngine<S>, count: usize) {
    let entries = engine.recent_log(count);
    if entries.is_empty() {
        println!("No completed runs yet.");
        return;
    }
    for entry in entries {
        println!(
            "{}  ->  {}  {}  {} {} [{}]",
            timefmt::format_datetime(entry.start_epoch),
            timefmt::format_datetime(entry.end_epoch),
            timefmt::format_time(entry.duration_seconds),
            entry.task_id,
            entry.task,
            entry.category
        );
    }
}

/// The CLI numbers tasks from 1, matching the listing; the engine is
/// 0-based.
fn zero_based(index: usize) -> Option<usize> {
    index.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_based_rejects_zero() {
        assert_eq!(zero_based(0), None);
        assert_eq!(zero_based(1), Some(0));
        assert_eq!(zero_based(12), Some(11));
    }
}
