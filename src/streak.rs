use crate::models::StreakRecord;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// Already counted today.
    Unchanged,
    Extended,
    Reset,
    Started,
}

impl StreakChange {
    pub fn changed(self) -> bool {
        self != StreakChange::Unchanged
    }
}

/// Daily check-in. Safe to call repeatedly: only the first call of a day changes the record.
pub fn evaluate(record: &mut StreakRecord, today: NaiveDate) -> StreakChange {
    let change = match record.last_check_date {
        None => StreakChange::Started,
        Some(last) if last >= today => return StreakChange::Unchanged,
        Some(last) if last == today - Duration::days(1) => StreakChange::Extended,
        Some(_) => StreakChange::Reset,
    };

    record.count = match change {
        StreakChange::Extended => record.count.saturating_add(1),
        _ => 1,
    };
    record.last_check_date = Some(today);
    change
}
