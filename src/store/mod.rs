//! The live habit sequence and its operations.
//! The basic idea is:
//!  - The whole sequence is loaded once at startup and kept in memory.
//!  - Every mutation (add/remove/complete) rewrites the persisted state in full.
//!  - Transient banner messages go out over a watch channel and clear themselves after a fixed
//!    delay. A newer message cancels the pending clear of an older one, so each message keeps its
//!    full visibility window.

pub mod entities;
pub mod habit_storage;
pub mod messages;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::utils::{clock::Clock, time::local_day};

use entities::HabitEntity;
use habit_storage::HabitStorage;
use messages::{MessagePicker, ALREADY_DONE_MESSAGE, MOTIVATIONAL_MESSAGES};

/// How long a transient message stays visible.
pub const MESSAGE_VISIBLE_FOR: Duration = Duration::from_millis(2000);

/// Owns the in-memory habit sequence and keeps the persisted state in sync with it.
pub struct HabitStore<S: HabitStorage> {
    habits: Vec<HabitEntity>,
    storage: S,
    clock: Arc<dyn Clock>,
    picker: Box<dyn MessagePicker>,
    message: watch::Sender<Option<&'static str>>,
    pending_clear: Option<CancellationToken>,
}

impl<S: HabitStorage> HabitStore<S> {
    /// Reads the persisted sequence and wraps it into a live store.
    pub async fn load(
        storage: S,
        clock: Arc<dyn Clock>,
        picker: Box<dyn MessagePicker>,
    ) -> Result<Self> {
        let habits = storage.load().await?;
        let (message, _) = watch::channel(None);
        Ok(Self {
            habits,
            storage,
            clock,
            picker,
            message,
            pending_clear: None,
        })
    }

    pub fn habits(&self) -> &[HabitEntity] {
        &self.habits
    }

    /// Receiver for banner updates. `None` means the banner is cleared.
    pub fn subscribe_messages(&self) -> watch::Receiver<Option<&'static str>> {
        self.message.subscribe()
    }

    pub fn current_message(&self) -> Option<&'static str> {
        *self.message.borrow()
    }

    /// Calendar day completions are compared against.
    pub fn today(&self) -> NaiveDate {
        local_day(self.clock.time())
    }

    /// Appends a new habit with zeroed counters. Blank names are dropped without an error.
    pub async fn add(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            debug!("Ignoring blank habit name");
            return Ok(false);
        }

        let id = self.next_id();
        self.habits.push(HabitEntity::new(id, name.into()));
        self.storage.save(&self.habits).await?;
        Ok(true)
    }

    /// Removes the habit with the given id. Unknown ids are ignored.
    pub async fn remove(&mut self, id: i64) -> Result<bool> {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);
        if self.habits.len() == before {
            debug!("No habit with id {id} to remove");
            return Ok(false);
        }

        self.storage.save(&self.habits).await?;
        Ok(true)
    }

    /// Marks the habit done for the current day and shows an encouragement. A repeat completion
    /// on the same day leaves the habit untouched and only shows the reminder message. Unknown
    /// ids are ignored.
    pub async fn complete(&mut self, id: i64) -> Result<()> {
        let today = local_day(self.clock.time());
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id == id) else {
            debug!("No habit with id {id} to complete");
            return Ok(());
        };

        if habit.completed_on(today) {
            self.show_message(ALREADY_DONE_MESSAGE);
            return Ok(());
        }

        habit.last_completed = Some(today);
        habit.completed_days += 1;
        if habit.completed_days % 7 == 0 {
            habit.streak += 1;
        }
        self.storage.save(&self.habits).await?;

        let encouragement = self.picker.pick(&MOTIVATIONAL_MESSAGES);
        self.show_message(encouragement);
        Ok(())
    }

    /// Ids are derived from the creation timestamp and bumped until unique, so they are never
    /// reused within a sequence.
    fn next_id(&self) -> i64 {
        let mut id = self.clock.time().timestamp_millis();
        while self.habits.iter().any(|habit| habit.id == id) {
            id += 1;
        }
        id
    }

    /// Publishes a banner message and schedules it to clear after [MESSAGE_VISIBLE_FOR]. The
    /// previous clear gets cancelled, so the newest message always keeps the full window.
    fn show_message(&mut self, text: &'static str) {
        if let Some(previous) = self.pending_clear.take() {
            previous.cancel();
        }

        self.message.send_replace(Some(text));

        let token = CancellationToken::new();
        self.pending_clear = Some(token.clone());
        let sender = self.message.clone();
        let clock = self.clock.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => (),
                _ = clock.sleep(MESSAGE_VISIBLE_FOR) => {
                    sender.send_replace(None);
                }
            }
        });
    }
}
