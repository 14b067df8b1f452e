use crate::achievements::{self, JournalSnapshot};
use crate::errors::{AppError, AppResult};
use crate::models::{
    AchievementStatus, ActivityRequest, Deleted, Entry, ExportDocument, GoalListing, GoalView,
    GoalsQuery, ImportQuery, ImportSummary, InsightsQuery, InsightsResponse, Journal,
    MutationResponse, NewEntryRequest, NewGoalRequest, ProgressResponse, StreakRecord,
    StreakResponse, Window,
};
use crate::state::AppState;
use crate::{entries, goals, insights, streak, transfer};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

pub async fn list_entries(State(state): State<AppState>) -> Json<Vec<Entry>> {
    let journal = state.journal.lock().await;
    Json(entries::history(&journal.entries))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<NewEntryRequest>,
) -> AppResult<(StatusCode, Json<MutationResponse<Entry>>)> {
    let mut journal = state.journal.lock().await;
    let mut staged = journal.entries.clone();
    let entry = entries::add(&mut staged, payload, Utc::now())?;
    state.store.persist(&staged).await?;
    journal.entries = staged;
    info!(entry_id = entry.id, mood = ?entry.mood, "entry saved");

    let unlocked = unlock_after_mutation(&state, &mut journal).await;
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            result: entry,
            unlocked,
        }),
    ))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MutationResponse<Deleted>>> {
    let mut journal = state.journal.lock().await;
    let mut staged = journal.entries.clone();
    if !entries::delete(&mut staged, id) {
        return Err(AppError::not_found(format!("entry {id} not found")));
    }
    state.store.persist(&staged).await?;
    journal.entries = staged;
    info!(entry_id = id, "entry deleted");

    // Removing an entry can close a gap in a mood run.
    let unlocked = unlock_after_mutation(&state, &mut journal).await;
    Ok(Json(MutationResponse {
        result: Deleted { id },
        unlocked,
    }))
}

pub async fn tag_entry_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ActivityRequest>,
) -> AppResult<Json<MutationResponse<Entry>>> {
    let mut journal = state.journal.lock().await;
    let mut staged = journal.entries.clone();
    let entry = entries::tag_activity(&mut staged, id, &payload.activity)?
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("entry {id} not found")))?;
    state.store.persist(&staged).await?;
    journal.entries = staged;
    info!(entry_id = id, activity = %payload.activity.trim(), "activity tagged");

    let unlocked = unlock_after_mutation(&state, &mut journal).await;
    Ok(Json(MutationResponse {
        result: entry,
        unlocked,
    }))
}

pub async fn get_insights(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> Json<InsightsResponse> {
    let period = Window::parse_or_week(query.period.as_deref());
    let journal = state.journal.lock().await;
    debug!(?period, entries = journal.entries.len(), "building insights");
    Json(insights::build_insights(&journal.entries, period))
}

pub async fn list_goals(
    State(state): State<AppState>,
    Query(query): Query<GoalsQuery>,
) -> Json<GoalListing> {
    let journal = state.journal.lock().await;
    let mut listing = goals::listing(&journal.goals);
    if let Some(limit) = query.completed_limit {
        listing.completed.truncate(limit);
    }
    Json(listing)
}

pub async fn create_goal(
    State(state): State<AppState>,
    Json(payload): Json<NewGoalRequest>,
) -> AppResult<(StatusCode, Json<MutationResponse<GoalView>>)> {
    let mut journal = state.journal.lock().await;
    let mut staged = journal.goals.clone();
    let goal = goals::create(&mut staged, payload, Utc::now())?;
    state.store.persist(&staged).await?;
    journal.goals = staged;
    info!(goal_id = goal.id, title = %goal.title, "goal created");

    let unlocked = unlock_after_mutation(&state, &mut journal).await;
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            result: goal.view(),
            unlocked,
        }),
    ))
}

pub async fn increment_goal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProgressResponse>> {
    let mut journal = state.journal.lock().await;
    let mut staged = journal.goals.clone();
    let outcome = goals::increment_progress(&mut staged, id)
        .ok_or_else(|| AppError::not_found(format!("goal {id} not found")))?;
    state.store.persist(&staged).await?;
    journal.goals = staged;
    info!(
        goal_id = id,
        progress = outcome.goal.progress,
        target = outcome.goal.target,
        "goal progress updated"
    );

    Ok(Json(ProgressResponse {
        goal: outcome.goal.view(),
        target_reached: outcome.target_reached,
    }))
}

pub async fn complete_goal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MutationResponse<GoalView>>> {
    let mut journal = state.journal.lock().await;
    let mut staged = journal.goals.clone();
    let goal = goals::complete(&mut staged, id, Utc::now())
        .ok_or_else(|| AppError::not_found(format!("goal {id} not found")))?;
    state.store.persist(&staged).await?;
    journal.goals = staged;
    info!(goal_id = id, "goal completed");

    let unlocked = unlock_after_mutation(&state, &mut journal).await;
    Ok(Json(MutationResponse {
        result: goal.view(),
        unlocked,
    }))
}

pub async fn delete_goal(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    let mut journal = state.journal.lock().await;
    let mut staged = journal.goals.clone();
    if !goals::delete(&mut staged, id) {
        return Err(AppError::not_found(format!("goal {id} not found")));
    }
    state.store.persist(&staged).await?;
    journal.goals = staged;
    info!(goal_id = id, "goal deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_streak(State(state): State<AppState>) -> Json<StreakRecord> {
    let journal = state.journal.lock().await;
    Json(journal.streak.clone())
}

pub async fn check_streak(
    State(state): State<AppState>,
) -> AppResult<Json<MutationResponse<StreakResponse>>> {
    Ok(Json(run_streak_check(&state).await?))
}

/// Daily check-in shared by the API and startup.
pub async fn run_streak_check(state: &AppState) -> AppResult<MutationResponse<StreakResponse>> {
    let mut journal = state.journal.lock().await;
    let mut staged = journal.streak.clone();
    let change = streak::evaluate(&mut staged, Local::now().date_naive());
    if !change.changed() {
        debug!(count = staged.count, "streak already counted today");
        return Ok(MutationResponse {
            result: StreakResponse {
                streak: staged,
                changed: false,
            },
            unlocked: Vec::new(),
        });
    }

    state.store.persist(&staged).await?;
    journal.streak = staged;
    info!(count = journal.streak.count, ?change, "streak updated");

    let unlocked = unlock_after_mutation(state, &mut journal).await;
    Ok(MutationResponse {
        result: StreakResponse {
            streak: journal.streak.clone(),
            changed: true,
        },
        unlocked,
    })
}

pub async fn list_achievements(State(state): State<AppState>) -> Json<Vec<AchievementStatus>> {
    let journal = state.journal.lock().await;
    Json(achievements::statuses(&journal.achievements))
}

pub async fn evaluate_achievements(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AchievementStatus>>> {
    let mut journal = state.journal.lock().await;
    Ok(Json(unlock_achievements(&state, &mut journal).await?))
}

pub async fn export_data(State(state): State<AppState>) -> Json<ExportDocument> {
    let journal = state.journal.lock().await;
    Json(transfer::export(&journal))
}

pub async fn import_data(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    Json(payload): Json<Value>,
) -> AppResult<Json<MutationResponse<ImportSummary>>> {
    if !query.confirm {
        return Err(AppError::validation(
            "importing replaces existing data; resend with confirm=true",
        ));
    }

    let mut journal = state.journal.lock().await;
    let mut staged = journal.clone();
    let summary = transfer::import(&mut staged, payload)?;
    state.store.replace_journal(&staged, &journal).await?;
    *journal = staged;
    info!(
        entries = ?summary.entries,
        goals = ?summary.goals,
        achievements = ?summary.achievements,
        streak = summary.streak,
        "data imported"
    );

    let unlocked = unlock_after_mutation(&state, &mut journal).await;
    Ok(Json(MutationResponse {
        result: summary,
        unlocked,
    }))
}

/// The mutation itself is already stored, so a failure to record new unlocks
/// is logged and retried on the next evaluation instead of failing the request.
async fn unlock_after_mutation(state: &AppState, journal: &mut Journal) -> Vec<AchievementStatus> {
    match unlock_achievements(state, journal).await {
        Ok(unlocked) => unlocked,
        Err(err) => {
            warn!("could not record achievements: {err}");
            Vec::new()
        }
    }
}

/// Runs the achievement rules and persists the log when anything new unlocked.
async fn unlock_achievements(state: &AppState, journal: &mut Journal) -> AppResult<Vec<AchievementStatus>> {
    let snapshot = JournalSnapshot {
        entries: &journal.entries,
        goals: &journal.goals,
        streak: &journal.streak,
    };
    let mut staged = journal.achievements.clone();
    let unlocked = achievements::evaluate(&mut staged, &snapshot, Utc::now());
    if unlocked.is_empty() {
        return Ok(Vec::new());
    }

    state.store.persist(&staged).await?;
    journal.achievements = staged;
    for achievement in &unlocked {
        info!(achievement = achievement.id, "achievement unlocked");
    }

    Ok(unlocked
        .into_iter()
        .map(|achievement| achievements::status(achievement, &journal.achievements))
        .collect())
}
