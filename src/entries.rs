use crate::errors::{AppError, AppResult};
use crate::models::{timestamp_id, Entry, NewEntryRequest};
use chrono::{DateTime, Utc};

pub fn add(entries: &mut Vec<Entry>, request: NewEntryRequest, now: DateTime<Utc>) -> AppResult<Entry> {
    if request.journal.trim().is_empty() {
        return Err(AppError::validation("Please write something in your journal"));
    }
    let mood = request
        .mood
        .ok_or_else(|| AppError::validation("mood is required"))?;
    let sleep_quality = request
        .sleep_quality
        .ok_or_else(|| AppError::validation("sleep quality is required"))?;

    let mut activities: Vec<String> = Vec::with_capacity(request.activities.len());
    for tag in request.activities {
        let tag = tag.trim();
        if !tag.is_empty() && !activities.iter().any(|existing| existing == tag) {
            activities.push(tag.to_string());
        }
    }

    let entry = Entry {
        id: timestamp_id(now, entries.iter().map(|entry| entry.id).max())?,
        date: now,
        mood,
        journal: request.journal,
        activities,
        sleep_quality,
    };
    entries.push(entry.clone());
    Ok(entry)
}

pub fn delete(entries: &mut Vec<Entry>, id: i64) -> bool {
    let before = entries.len();
    entries.retain(|entry| entry.id != id);
    entries.len() != before
}

/// Adds one activity tag to an existing entry. `Ok(None)` when the id is unknown.
pub fn tag_activity<'a>(
    entries: &'a mut [Entry],
    id: i64,
    activity: &str,
) -> AppResult<Option<&'a Entry>> {
    let activity = activity.trim();
    if activity.is_empty() {
        return Err(AppError::validation("activity must not be empty"));
    }

    let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
        return Ok(None);
    };
    if !entry.activities.iter().any(|existing| existing == activity) {
        entry.activities.push(activity.to_string());
    }
    Ok(Some(&*entry))
}

/// Newest first.
pub fn history(entries: &[Entry]) -> Vec<Entry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    sorted
}
