use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use std::sync::Arc;

/// The struct used for storing a single tracked habit on disk. Serialized field names follow the
/// original camelCase layout so existing state files stay readable.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntity {
    pub id: i64,
    pub name: Arc<str>,
    pub streak: u32,
    pub last_completed: Option<NaiveDate>,
    pub completed_days: u32,
}

impl HabitEntity {
    pub fn new(id: i64, name: Arc<str>) -> Self {
        Self {
            id,
            name,
            streak: 0,
            last_completed: None,
            completed_days: 0,
        }
    }

    /// Whether the habit has already been marked done on the given day.
    pub fn completed_on(&self, day: NaiveDate) -> bool {
        self.last_completed == Some(day)
    }
}
