pub mod shell;

use std::{path::PathBuf, sync::Arc};

use ansi_term::Colour;
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    store::{
        entities::HabitEntity, habit_storage::JsonHabitStorage, messages::RandomMessagePicker,
        HabitStore,
    },
    utils::{clock::DefaultClock, dir::create_application_default_path, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Habitflow", version, long_about = None)]
#[command(about = "Command line tracker for daily habits and streaks", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Add a new habit to track")]
    Add {
        #[arg(help = "Name of the habit. Blank names are ignored")]
        name: String,
    },
    #[command(about = "Mark a habit as done for today")]
    Done {
        #[arg(help = "Habit id or exact name")]
        habit: String,
    },
    #[command(about = "Delete a habit")]
    Remove {
        #[arg(help = "Habit id or exact name")]
        habit: String,
    },
    #[command(about = "Show all habits with their progress")]
    List,
    #[command(about = "Run an interactive session")]
    Shell,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&dir, logging_level, args.log)?;

    let storage = JsonHabitStorage::new(dir)?;
    let mut store = HabitStore::load(
        storage,
        Arc::new(DefaultClock),
        Box::new(RandomMessagePicker),
    )
    .await?;

    match args.commands {
        Commands::Add { name } => {
            if store.add(&name).await? {
                println!("Added \"{}\"", name.trim());
            }
            Ok(())
        }
        Commands::Done { habit } => {
            if let Some(id) = resolve_habit(store.habits(), &habit) {
                store.complete(id).await?;
            }
            if let Some(message) = store.current_message() {
                println!("{message}");
            }
            Ok(())
        }
        Commands::Remove { habit } => {
            if let Some(id) = resolve_habit(store.habits(), &habit) {
                if store.remove(id).await? {
                    println!("Removed habit {id}");
                }
            }
            Ok(())
        }
        Commands::List => {
            print_habits(store.habits(), store.today());
            Ok(())
        }
        Commands::Shell => shell::run_shell(store).await,
    }
}

/// Accepts either a numeric id or an exact habit name. Names that look like ids of other habits
/// resolve as ids first.
pub(crate) fn resolve_habit(habits: &[HabitEntity], selector: &str) -> Option<i64> {
    if let Ok(id) = selector.parse::<i64>() {
        if habits.iter().any(|habit| habit.id == id) {
            return Some(id);
        }
    }
    habits
        .iter()
        .find(|habit| habit.name.as_ref() == selector)
        .map(|habit| habit.id)
}

pub(crate) fn print_habits(habits: &[HabitEntity], today: NaiveDate) {
    if habits.is_empty() {
        println!("No habits yet. Add one with \"add <name>\".");
        return;
    }
    for habit in habits {
        println!("{}", format_habit_line(habit, today));
    }
}

/// One list row: id, name, progress, streak when above zero, and the derived per-day state.
fn format_habit_line(habit: &HabitEntity, today: NaiveDate) -> String {
    let status = if habit.completed_on(today) {
        Colour::Green.paint("Done ✓")
    } else {
        Colour::Cyan.paint("Complete!")
    };

    let mut line = format!(
        "{}\t{}\tProgress: {} days",
        habit.id, habit.name, habit.completed_days
    );
    if habit.streak > 0 {
        line.push('\t');
        line.push_str(
            &Colour::Yellow
                .paint(format!("Streak: {}", habit.streak))
                .to_string(),
        );
    }
    line.push('\t');
    line.push_str(&status.to_string());
    line
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::store::entities::HabitEntity;

    use super::{format_habit_line, resolve_habit};

    fn test_habits() -> Vec<HabitEntity> {
        vec![
            HabitEntity::new(100, "Meditate".into()),
            HabitEntity::new(101, "Stretch".into()),
        ]
    }

    #[test]
    fn test_resolve_by_id() {
        assert_eq!(resolve_habit(&test_habits(), "101"), Some(101));
    }

    #[test]
    fn test_resolve_by_name() {
        assert_eq!(resolve_habit(&test_habits(), "Meditate"), Some(100));
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(resolve_habit(&test_habits(), "Running"), None);
        assert_eq!(resolve_habit(&test_habits(), "7"), None);
    }

    #[test]
    fn test_habit_line_hides_zero_streak() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let mut habit = HabitEntity::new(1, "Meditate".into());

        let line = format_habit_line(&habit, today);
        assert!(!line.contains("Streak"));
        assert!(line.contains("Complete!"));

        habit.completed_days = 7;
        habit.streak = 1;
        habit.last_completed = Some(today);

        let line = format_habit_line(&habit, today);
        assert!(line.contains("Streak: 1"));
        assert!(line.contains("Done ✓"));
        assert!(line.contains("Progress: 7 days"));
    }
}
