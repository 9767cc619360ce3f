use chrono::{DateTime, Local, NaiveDate, Utc};

/// Calendar day a moment falls on in the local timezone. Completion checks compare these, so a
/// habit becomes completable again at local midnight.
pub fn local_day(moment: DateTime<Utc>) -> NaiveDate {
    moment.with_timezone(&Local).date_naive()
}
