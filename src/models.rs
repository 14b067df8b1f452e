use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Neutral,
    Sad,
}

impl Mood {
    /// Trend and correlation score: sad 1, neutral 2, happy 3.
    pub fn score(self) -> u8 {
        match self {
            Mood::Sad => 1,
            Mood::Neutral => 2,
            Mood::Happy => 3,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Neutral => "😐",
            Mood::Sad => "😞",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl SleepQuality {
    pub fn score(self) -> u8 {
        match self {
            SleepQuality::Poor => 1,
            SleepQuality::Fair => 2,
            SleepQuality::Good => 3,
            SleepQuality::Excellent => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub mood: Mood,
    #[serde(alias = "journalText")]
    pub journal: String,
    #[serde(default)]
    pub activities: Vec<String>,
    pub sleep_quality: SleepQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub target: u32,
    pub period: GoalPeriod,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub progress: u32,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub count: u32,
    pub last_check_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementUnlock {
    pub achievement_id: String,
    pub unlocked_date: DateTime<Utc>,
}

/// In-memory copy of every persisted collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    pub entries: Vec<Entry>,
    pub goals: Vec<Goal>,
    pub achievements: Vec<AchievementUnlock>,
    pub streak: StreakRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub entries: Vec<Entry>,
    pub goals: Vec<Goal>,
    pub achievements: Vec<AchievementUnlock>,
    pub streak: StreakRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Week,
    Month,
    Quarter,
    All,
}

impl Window {
    /// Unrecognised values fall back to the weekly view.
    pub fn parse_or_week(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("month") => Window::Month,
            Some("quarter") => Window::Quarter,
            Some("all") => Window::All,
            _ => Window::Week,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEntryRequest {
    pub mood: Option<Mood>,
    #[serde(alias = "journalText")]
    pub journal: String,
    pub activities: Vec<String>,
    pub sleep_quality: Option<SleepQuality>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewGoalRequest {
    pub title: String,
    pub category: String,
    pub target: Option<i64>,
    pub period: Option<GoalPeriod>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub activity: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InsightsQuery {
    pub period: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsQuery {
    #[serde(alias = "completed_limit")]
    pub completed_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodPercentages {
    pub happy: u8,
    pub neutral: u8,
    pub sad: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepCorrelation {
    Positive,
    Negative,
    NoClear,
}

impl SleepCorrelation {
    pub fn message(self) -> &'static str {
        match self {
            SleepCorrelation::Positive => {
                "Better sleep quality seems to correspond with more positive moods."
            }
            SleepCorrelation::Negative => {
                "Poor sleep quality seems to correspond with more negative moods."
            }
            SleepCorrelation::NoClear => {
                "No clear correlation between sleep quality and mood was found."
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SleepInsight {
    pub correlation: SleepCorrelation,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: DateTime<Utc>,
    pub label: String,
    pub mood: Mood,
    pub value: u8,
    pub emoji: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub period: Window,
    pub total_entries: usize,
    pub considered: usize,
    pub moods: Option<MoodPercentages>,
    pub happy_activities: Vec<ActivityCount>,
    pub sad_activities: Vec<ActivityCount>,
    pub sleep: Option<SleepInsight>,
    pub trend: Option<Vec<TrendPoint>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub percent_complete: u8,
    pub can_complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalListing {
    pub active: Vec<GoalView>,
    pub completed: Vec<GoalView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub goal: GoalView,
    pub target_reached: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
    pub unlocked_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResponse {
    pub streak: StreakRecord,
    pub changed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub entries: Option<usize>,
    pub goals: Option<usize>,
    pub achievements: Option<usize>,
    pub streak: bool,
}

/// Result of a mutation plus any achievements it unlocked.
#[derive(Debug, Serialize)]
pub struct MutationResponse<T: Serialize> {
    pub result: T,
    pub unlocked: Vec<AchievementStatus>,
}

/// Millisecond timestamp id, bumped past `max_existing` so ids stay unique
/// and increasing even when two records land in the same millisecond.
pub fn timestamp_id(now: DateTime<Utc>, max_existing: Option<i64>) -> AppResult<i64> {
    let candidate = now.timestamp_millis();
    match max_existing {
        Some(max) if max >= candidate => max
            .checked_add(1)
            .ok_or_else(|| AppError::validation("no ids left after the largest stored id")),
        _ => Ok(candidate),
    }
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i64,
}
