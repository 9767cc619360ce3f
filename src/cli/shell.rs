use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::store::{habit_storage::HabitStorage, HabitStore};

use super::{print_habits, resolve_habit};

/// Interactive session. Reads commands from stdin, re-renders the habit list after each one, and
/// prints transient messages as the store publishes and clears them.
pub async fn run_shell<S: HabitStorage>(mut store: HabitStore<S>) -> Result<()> {
    let mut messages = store.subscribe_messages();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("HabitFlow 🔄 — your habits make your stories.");
    print_habits(store.habits(), store.today());
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                if !handle_command(&mut store, line.trim()).await? {
                    return Ok(());
                }
                print_habits(store.habits(), store.today());
                prompt();
            }
            _ = messages.changed() => {
                match *messages.borrow_and_update() {
                    Some(message) => println!("{message}"),
                    None => debug!("Message cleared"),
                }
                prompt();
            }
        }
    }
}

/// Returns false once the session should end.
async fn handle_command<S: HabitStorage>(store: &mut HabitStore<S>, line: &str) -> Result<bool> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" | "list" => {}
        "add" => {
            store.add(rest).await?;
        }
        "done" => {
            if let Some(id) = resolve_habit(store.habits(), rest) {
                store.complete(id).await?;
            }
        }
        "remove" | "rm" => {
            if let Some(id) = resolve_habit(store.habits(), rest) {
                store.remove(id).await?;
            }
        }
        "help" => print_help(),
        "quit" | "exit" => return Ok(false),
        unknown => println!("Unknown command \"{unknown}\". Type \"help\" for the command list."),
    }
    Ok(true)
}

fn print_help() {
    println!(
        "Commands:\n\
         \tadd <name>\tAdd a new habit\n\
         \tdone <habit>\tMark a habit as done for today (id or name)\n\
         \tremove <habit>\tDelete a habit (id or name)\n\
         \tlist\t\tShow all habits\n\
         \tquit\t\tEnd the session"
    );
}

fn prompt() {
    print!("> ");
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::{
        store::{
            habit_storage::MockHabitStorage,
            messages::{MessagePicker, MOTIVATIONAL_MESSAGES},
            HabitStore,
        },
        utils::clock::Clock,
    };

    use super::handle_command;

    struct FrozenClock;

    #[async_trait]
    impl Clock for FrozenClock {
        fn time(&self) -> DateTime<Utc> {
            DateTime::UNIX_EPOCH
        }

        async fn sleep(&self, duration: std::time::Duration) {
            tokio::time::sleep(duration).await;
        }
    }

    struct FixedPicker;

    impl MessagePicker for FixedPicker {
        fn pick(&mut self, options: &'static [&'static str]) -> &'static str {
            options[0]
        }
    }

    async fn test_store() -> HabitStore<MockHabitStorage> {
        let mut storage = MockHabitStorage::new();
        storage.expect_load().returning(|| Ok(vec![]));
        storage.expect_save().returning(|_| Ok(()));
        HabitStore::load(storage, Arc::new(FrozenClock), Box::new(FixedPicker))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_done_commands() -> Result<()> {
        let mut store = test_store().await;

        assert!(handle_command(&mut store, "add Meditate").await?);
        assert_eq!(store.habits().len(), 1);

        assert!(handle_command(&mut store, "done Meditate").await?);
        assert_eq!(store.habits()[0].completed_days, 1);
        assert_eq!(store.current_message(), Some(MOTIVATIONAL_MESSAGES[0]));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_command() -> Result<()> {
        let mut store = test_store().await;
        handle_command(&mut store, "add Meditate").await?;
        let id = store.habits()[0].id;

        assert!(handle_command(&mut store, &format!("rm {id}")).await?);
        assert_eq!(store.habits().len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_quit_ends_session() -> Result<()> {
        let mut store = test_store().await;

        assert!(!handle_command(&mut store, "quit").await?);
        assert!(!handle_command(&mut store, "exit").await?);
        assert!(handle_command(&mut store, "definitely-not-a-command").await?);
        Ok(())
    }
}
