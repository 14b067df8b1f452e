use crate::errors::{AppError, AppResult};
use crate::models::{
    AchievementUnlock, Entry, ExportDocument, Goal, ImportSummary, Journal, StreakRecord,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub fn export(journal: &Journal) -> ExportDocument {
    ExportDocument {
        entries: journal.entries.clone(),
        goals: journal.goals.clone(),
        achievements: journal.achievements.clone(),
        streak: journal.streak.clone(),
    }
}

/// Replaces every collection present in `payload`. Nothing is touched unless
/// the whole document decodes.
pub fn import(journal: &mut Journal, payload: Value) -> AppResult<ImportSummary> {
    let Value::Object(mut fields) = payload else {
        return Err(AppError::validation("import data must be a JSON object"));
    };
    if !matches!(fields.get("entries"), Some(Value::Array(_))) {
        return Err(AppError::validation("import data must contain an entries list"));
    }

    let entries: Option<Vec<Entry>> = decode(&mut fields, "entries")?;
    let goals: Option<Vec<Goal>> = decode(&mut fields, "goals")?;
    let achievements: Option<Vec<AchievementUnlock>> = decode(&mut fields, "achievements")?;
    let streak: Option<StreakRecord> = decode(&mut fields, "streak")?;

    let summary = ImportSummary {
        entries: entries.as_ref().map(Vec::len),
        goals: goals.as_ref().map(Vec::len),
        achievements: achievements.as_ref().map(Vec::len),
        streak: streak.is_some(),
    };

    if let Some(entries) = entries {
        journal.entries = entries;
    }
    if let Some(goals) = goals {
        journal.goals = goals;
    }
    if let Some(achievements) = achievements {
        journal.achievements = achievements;
    }
    if let Some(streak) = streak {
        journal.streak = streak;
    }
    Ok(summary)
}

fn decode<T: DeserializeOwned>(fields: &mut Map<String, Value>, key: &'static str) -> AppResult<Option<T>> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| AppError::Parse { key, source }),
    }
}
