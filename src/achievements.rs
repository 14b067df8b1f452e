use crate::models::{AchievementStatus, AchievementUnlock, Entry, Goal, Mood, StreakRecord};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Read-only view of everything the rules are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct JournalSnapshot<'a> {
    pub entries: &'a [Entry],
    pub goals: &'a [Goal],
    pub streak: &'a StreakRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    EntriesAtLeast(usize),
    StreakAtLeast(u32),
    GoalsCreatedAtLeast(usize),
    GoalsCompletedAtLeast(usize),
    DistinctActivitiesAtLeast(usize),
    ConsecutiveMood { mood: Mood, run: usize },
}

impl Rule {
    pub fn holds(self, snapshot: &JournalSnapshot<'_>) -> bool {
        match self {
            Rule::EntriesAtLeast(n) => snapshot.entries.len() >= n,
            Rule::StreakAtLeast(n) => snapshot.streak.count >= n,
            Rule::GoalsCreatedAtLeast(n) => snapshot.goals.len() >= n,
            Rule::GoalsCompletedAtLeast(n) => {
                snapshot.goals.iter().filter(|goal| goal.completed).count() >= n
            }
            Rule::DistinctActivitiesAtLeast(n) => {
                let distinct: HashSet<&str> = snapshot
                    .entries
                    .iter()
                    .flat_map(|entry| entry.activities.iter().map(String::as_str))
                    .collect();
                distinct.len() >= n
            }
            Rule::ConsecutiveMood { mood, run } => longest_mood_run(snapshot.entries, mood) >= run,
        }
    }
}

fn longest_mood_run(entries: &[Entry], mood: Mood) -> usize {
    let mut ordered: Vec<&Entry> = entries.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let mut longest = 0;
    let mut current = 0;
    for entry in ordered {
        if entry.mood == mood {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub rule: Rule,
}

pub static CATALOG: [Achievement; 8] = [
    Achievement {
        id: "first_entry",
        title: "First Steps",
        description: "Create your first journal entry",
        rule: Rule::EntriesAtLeast(1),
    },
    Achievement {
        id: "week_streak",
        title: "Week Warrior",
        description: "Check in seven days in a row",
        rule: Rule::StreakAtLeast(7),
    },
    Achievement {
        id: "month_streak",
        title: "Monthly Master",
        description: "Check in thirty days in a row",
        rule: Rule::StreakAtLeast(30),
    },
    Achievement {
        id: "first_goal",
        title: "Goal Setter",
        description: "Create your first wellness goal",
        rule: Rule::GoalsCreatedAtLeast(1),
    },
    Achievement {
        id: "goal_achiever",
        title: "Goal Achiever",
        description: "Complete a wellness goal",
        rule: Rule::GoalsCompletedAtLeast(1),
    },
    Achievement {
        id: "goal_master",
        title: "Goal Master",
        description: "Complete three wellness goals",
        rule: Rule::GoalsCompletedAtLeast(3),
    },
    Achievement {
        id: "activity_explorer",
        title: "Activity Explorer",
        description: "Log six different activities",
        rule: Rule::DistinctActivitiesAtLeast(6),
    },
    Achievement {
        id: "happy_streak",
        title: "Sunshine Streak",
        description: "Log seven happy entries in a row",
        rule: Rule::ConsecutiveMood {
            mood: Mood::Happy,
            run: 7,
        },
    },
];

/// Appends an unlock for every catalog rule that now holds and was not
/// unlocked before. Returns the newly unlocked achievements.
pub fn evaluate(
    unlocks: &mut Vec<AchievementUnlock>,
    snapshot: &JournalSnapshot<'_>,
    now: DateTime<Utc>,
) -> Vec<&'static Achievement> {
    let mut unlocked = Vec::new();
    for achievement in CATALOG.iter() {
        let already = unlocks
            .iter()
            .any(|unlock| unlock.achievement_id == achievement.id);
        if already || !achievement.rule.holds(snapshot) {
            continue;
        }

        unlocks.push(AchievementUnlock {
            achievement_id: achievement.id.to_string(),
            unlocked_date: now,
        });
        unlocked.push(achievement);
    }
    unlocked
}

pub fn status(achievement: &'static Achievement, unlocks: &[AchievementUnlock]) -> AchievementStatus {
    let unlock = unlocks
        .iter()
        .find(|unlock| unlock.achievement_id == achievement.id);
    AchievementStatus {
        id: achievement.id,
        title: achievement.title,
        description: achievement.description,
        unlocked: unlock.is_some(),
        unlocked_date: unlock.map(|unlock| unlock.unlocked_date),
    }
}

pub fn statuses(unlocks: &[AchievementUnlock]) -> Vec<AchievementStatus> {
    CATALOG
        .iter()
        .map(|achievement| status(achievement, unlocks))
        .collect()
}
