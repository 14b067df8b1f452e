use crate::errors::{AppError, AppResult};
use crate::models::{timestamp_id, Goal, GoalListing, GoalView, NewGoalRequest};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct ProgressOutcome {
    pub goal: Goal,
    /// Progress has met the target. The goal is not completed automatically.
    pub target_reached: bool,
}

impl Goal {
    pub fn percent_complete(&self) -> u8 {
        if self.target == 0 {
            return 0;
        }
        let progress = u64::from(self.progress);
        let target = u64::from(self.target);
        ((progress * 200 + target) / (target * 2)).min(100) as u8
    }

    pub fn can_complete(&self) -> bool {
        !self.completed && self.progress >= self.target
    }

    pub fn view(&self) -> GoalView {
        GoalView {
            goal: self.clone(),
            percent_complete: self.percent_complete(),
            can_complete: self.can_complete(),
        }
    }
}

pub fn create(goals: &mut Vec<Goal>, request: NewGoalRequest, now: DateTime<Utc>) -> AppResult<Goal> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("goal title is required"));
    }
    let category = request.category.trim();
    if category.is_empty() {
        return Err(AppError::validation("goal category is required"));
    }
    let target = match request.target {
        Some(target) if target > 0 => u32::try_from(target)
            .map_err(|_| AppError::validation("goal target is too large"))?,
        _ => return Err(AppError::validation("goal target must be a positive number")),
    };
    let period = request
        .period
        .ok_or_else(|| AppError::validation("goal period is required"))?;
    let end_date = request
        .end_date
        .ok_or_else(|| AppError::validation("goal end date is required"))?;

    let goal = Goal {
        id: timestamp_id(now, goals.iter().map(|goal| goal.id).max())?,
        title: title.to_string(),
        category: category.to_string(),
        target,
        period,
        end_date,
        progress: 0,
        created: now,
        completed: false,
        completed_date: None,
    };
    goals.push(goal.clone());
    Ok(goal)
}

pub fn increment_progress(goals: &mut [Goal], id: i64) -> Option<ProgressOutcome> {
    let goal = goals.iter_mut().find(|goal| goal.id == id)?;
    goal.progress = goal.progress.saturating_add(1);

    Some(ProgressOutcome {
        target_reached: goal.progress >= goal.target,
        goal: goal.clone(),
    })
}

/// Marks a goal completed. Completing twice stamps a fresh `completed_date`.
pub fn complete(goals: &mut [Goal], id: i64, now: DateTime<Utc>) -> Option<Goal> {
    let goal = goals.iter_mut().find(|goal| goal.id == id)?;
    goal.completed = true;
    goal.completed_date = Some(now);
    Some(goal.clone())
}

pub fn delete(goals: &mut Vec<Goal>, id: i64) -> bool {
    let before = goals.len();
    goals.retain(|goal| goal.id != id);
    goals.len() != before
}

/// Active goals in creation order, completed goals most recent first.
pub fn listing(goals: &[Goal]) -> GoalListing {
    let active = goals
        .iter()
        .filter(|goal| !goal.completed)
        .map(Goal::view)
        .collect();

    let mut completed: Vec<&Goal> = goals.iter().filter(|goal| goal.completed).collect();
    completed.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));

    GoalListing {
        active,
        completed: completed.into_iter().map(Goal::view).collect(),
    }
}
