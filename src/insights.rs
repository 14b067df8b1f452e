use crate::models::{
    ActivityCount, Entry, InsightsResponse, Mood, MoodPercentages, SleepCorrelation,
    SleepInsight, TrendPoint, Window,
};
use chrono::{DateTime, Duration, Months, Utc};
use std::collections::HashMap;

const TOP_ACTIVITIES: usize = 3;
const MIN_CORRELATION_ENTRIES: usize = 3;
const MIN_TREND_ENTRIES: usize = 2;

pub fn build_insights(entries: &[Entry], period: Window) -> InsightsResponse {
    build_insights_at(Utc::now(), entries, period)
}

pub fn build_insights_at(now: DateTime<Utc>, entries: &[Entry], period: Window) -> InsightsResponse {
    let filtered = filter_by_window(entries, period, now);
    let by_mood = |mood: Mood| -> Vec<Entry> {
        filtered
            .iter()
            .filter(|entry| entry.mood == mood)
            .cloned()
            .collect()
    };

    InsightsResponse {
        period,
        total_entries: entries.len(),
        considered: filtered.len(),
        moods: mood_percentages(&filtered),
        happy_activities: top_activities(&by_mood(Mood::Happy), TOP_ACTIVITIES),
        sad_activities: top_activities(&by_mood(Mood::Sad), TOP_ACTIVITIES),
        sleep: sleep_mood_correlation(&filtered).map(|correlation| SleepInsight {
            correlation,
            message: correlation.message(),
        }),
        trend: trend_series(&filtered),
    }
}

/// Share of each mood, rounded half up. `None` when there is nothing to count.
pub fn mood_percentages(entries: &[Entry]) -> Option<MoodPercentages> {
    if entries.is_empty() {
        return None;
    }

    let total = entries.len();
    let count = |mood: Mood| entries.iter().filter(|entry| entry.mood == mood).count();

    Some(MoodPercentages {
        happy: percent(count(Mood::Happy), total),
        neutral: percent(count(Mood::Neutral), total),
        sad: percent(count(Mood::Sad), total),
    })
}

fn percent(part: usize, total: usize) -> u8 {
    ((part * 200 + total) / (total * 2)) as u8
}

/// Most frequent activity tags, ties kept in first-seen order.
pub fn top_activities(entries: &[Entry], k: usize) -> Vec<ActivityCount> {
    let mut counts: Vec<ActivityCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for activity in entries.iter().flat_map(|entry| entry.activities.iter()) {
        match positions.get(activity.as_str()) {
            Some(&index) => counts[index].count += 1,
            None => {
                positions.insert(activity, counts.len());
                counts.push(ActivityCount {
                    name: activity.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(k);
    counts
}

pub fn sleep_mood_correlation(entries: &[Entry]) -> Option<SleepCorrelation> {
    if entries.len() < MIN_CORRELATION_ENTRIES {
        return None;
    }

    let total = entries.len() as f64;
    let avg_sleep = entries
        .iter()
        .map(|entry| f64::from(entry.sleep_quality.score()))
        .sum::<f64>()
        / total;
    let avg_mood = entries
        .iter()
        .map(|entry| f64::from(entry.mood.score()))
        .sum::<f64>()
        / total;

    let correlation = if avg_sleep > 2.5 && avg_mood > 2.5 {
        SleepCorrelation::Positive
    } else if avg_sleep < 2.0 && avg_mood < 2.0 {
        SleepCorrelation::Negative
    } else {
        SleepCorrelation::NoClear
    };
    Some(correlation)
}

/// Chronological mood values, or `None` when there are too few entries to draw a trend.
pub fn trend_series(entries: &[Entry]) -> Option<Vec<TrendPoint>> {
    if entries.len() < MIN_TREND_ENTRIES {
        return None;
    }

    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    Some(
        sorted
            .into_iter()
            .map(|entry| TrendPoint {
                date: entry.date,
                label: entry.date.format("%b %-d").to_string(),
                mood: entry.mood,
                value: entry.mood.score(),
                emoji: entry.mood.emoji(),
            })
            .collect(),
    )
}

/// Entries dated inside `[cutoff, now]` for the given window.
pub fn filter_by_window(entries: &[Entry], period: Window, now: DateTime<Utc>) -> Vec<Entry> {
    let cutoff = match period {
        Window::All => return entries.to_vec(),
        Window::Week => now - Duration::days(7),
        Window::Month => months_before(now, 1),
        Window::Quarter => months_before(now, 3),
    };

    entries
        .iter()
        .filter(|entry| entry.date >= cutoff && entry.date <= now)
        .cloned()
        .collect()
}

fn months_before(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SleepQuality;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap()
    }

    fn entry(id: i64, days_ago: i64, mood: Mood, sleep: SleepQuality, activities: &[&str]) -> Entry {
        Entry {
            id,
            date: now() - Duration::days(days_ago),
            mood,
            journal: format!("entry {id}"),
            activities: activities.iter().map(|tag| tag.to_string()).collect(),
            sleep_quality: sleep,
        }
    }

    fn moods(moods: &[Mood]) -> Vec<Entry> {
        moods
            .iter()
            .enumerate()
            .map(|(i, mood)| entry(i as i64, 0, *mood, SleepQuality::Fair, &[]))
            .collect()
    }

    #[test]
    fn percentages_for_mixed_moods() {
        let entries = moods(&[Mood::Happy, Mood::Happy, Mood::Sad, Mood::Neutral]);
        assert_eq!(
            mood_percentages(&entries),
            Some(MoodPercentages {
                happy: 50,
                neutral: 25,
                sad: 25
            })
        );
    }

    #[test]
    fn percentages_empty_is_no_data() {
        assert_eq!(mood_percentages(&[]), None);
    }

    #[test]
    fn percentages_sum_close_to_hundred() {
        let cycle = [Mood::Happy, Mood::Neutral, Mood::Sad, Mood::Happy, Mood::Sad];
        for len in 1..=40 {
            let sample: Vec<Mood> = cycle.iter().cycle().take(len).copied().collect();
            let result = mood_percentages(&moods(&sample)).unwrap();
            let sum = i32::from(result.happy) + i32::from(result.neutral) + i32::from(result.sad);
            assert!((98..=102).contains(&sum), "len {len} summed to {sum}");
        }
    }

    #[test]
    fn percentages_round_half_up() {
        let result = mood_percentages(&moods(&[Mood::Happy, Mood::Happy, Mood::Sad])).unwrap();
        assert_eq!((result.happy, result.neutral, result.sad), (67, 0, 33));
    }

    #[test]
    fn top_activities_sorted_and_truncated() {
        let entries = vec![
            entry(1, 0, Mood::Happy, SleepQuality::Good, &["reading", "exercise"]),
            entry(2, 0, Mood::Happy, SleepQuality::Good, &["exercise", "social"]),
            entry(3, 0, Mood::Happy, SleepQuality::Good, &["nature", "exercise", "social"]),
            entry(4, 0, Mood::Happy, SleepQuality::Good, &["meditation"]),
        ];

        let top = top_activities(&entries, 3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0], ActivityCount { name: "exercise".into(), count: 3 });
        assert_eq!(top[1], ActivityCount { name: "social".into(), count: 2 });
        // one-count tie: first seen wins
        assert_eq!(top[2].name, "reading");
        assert!(top.windows(2).all(|pair| pair[0].count >= pair[1].count));
    }

    #[test]
    fn top_activities_empty_input() {
        assert!(top_activities(&[], 5).is_empty());
    }

    #[test]
    fn correlation_needs_three_entries() {
        let entries = vec![
            entry(1, 0, Mood::Happy, SleepQuality::Excellent, &[]),
            entry(2, 0, Mood::Happy, SleepQuality::Excellent, &[]),
        ];
        assert_eq!(sleep_mood_correlation(&entries), None);
    }

    #[test]
    fn correlation_classifications() {
        let good = vec![
            entry(1, 0, Mood::Happy, SleepQuality::Excellent, &[]),
            entry(2, 0, Mood::Happy, SleepQuality::Good, &[]),
            entry(3, 0, Mood::Neutral, SleepQuality::Good, &[]),
        ];
        assert_eq!(sleep_mood_correlation(&good), Some(SleepCorrelation::Positive));

        let bad = vec![
            entry(1, 0, Mood::Sad, SleepQuality::Poor, &[]),
            entry(2, 0, Mood::Sad, SleepQuality::Poor, &[]),
            entry(3, 0, Mood::Neutral, SleepQuality::Fair, &[]),
        ];
        assert_eq!(sleep_mood_correlation(&bad), Some(SleepCorrelation::Negative));

        let mixed = vec![
            entry(1, 0, Mood::Happy, SleepQuality::Poor, &[]),
            entry(2, 0, Mood::Sad, SleepQuality::Excellent, &[]),
            entry(3, 0, Mood::Neutral, SleepQuality::Fair, &[]),
        ];
        assert_eq!(sleep_mood_correlation(&mixed), Some(SleepCorrelation::NoClear));
    }

    #[test]
    fn trend_is_chronological() {
        let entries = vec![
            entry(1, 0, Mood::Happy, SleepQuality::Good, &[]),
            entry(2, 2, Mood::Sad, SleepQuality::Good, &[]),
            entry(3, 1, Mood::Neutral, SleepQuality::Good, &[]),
        ];

        let trend = trend_series(&entries).unwrap();
        let values: Vec<u8> = trend.iter().map(|point| point.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(trend[2].label, "Mar 31");
        assert_eq!(trend[0].emoji, "😞");
    }

    #[test]
    fn trend_needs_two_entries() {
        let entries = vec![entry(1, 0, Mood::Happy, SleepQuality::Good, &[])];
        assert!(trend_series(&entries).is_none());
    }

    #[test]
    fn window_filters() {
        let entries = vec![
            entry(1, 0, Mood::Happy, SleepQuality::Good, &[]),
            entry(2, 6, Mood::Happy, SleepQuality::Good, &[]),
            entry(3, 20, Mood::Happy, SleepQuality::Good, &[]),
            entry(4, 60, Mood::Happy, SleepQuality::Good, &[]),
            entry(5, 200, Mood::Happy, SleepQuality::Good, &[]),
            entry(6, -1, Mood::Happy, SleepQuality::Good, &[]),
        ];

        let ids = |period| -> Vec<i64> {
            filter_by_window(&entries, period, now())
                .iter()
                .map(|entry| entry.id)
                .collect()
        };
        assert_eq!(ids(Window::Week), vec![1, 2]);
        assert_eq!(ids(Window::Month), vec![1, 2, 3]);
        assert_eq!(ids(Window::Quarter), vec![1, 2, 3, 4]);
        assert_eq!(ids(Window::All).len(), 6);
    }

    #[test]
    fn month_window_is_calendar_aware() {
        // March 31 minus one month clamps to February 28.
        let on_cutoff = Entry {
            date: Utc.with_ymd_and_hms(2026, 2, 28, 12, 0, 0).unwrap(),
            ..entry(1, 0, Mood::Sad, SleepQuality::Poor, &[])
        };
        let before_cutoff = Entry {
            id: 2,
            date: Utc.with_ymd_and_hms(2026, 2, 28, 11, 59, 59).unwrap(),
            ..on_cutoff.clone()
        };

        let kept = filter_by_window(&[on_cutoff, before_cutoff], Window::Month, now());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[test]
    fn insights_split_activity_by_mood() {
        let entries = vec![
            entry(1, 0, Mood::Happy, SleepQuality::Good, &["exercise"]),
            entry(2, 1, Mood::Sad, SleepQuality::Poor, &["work"]),
            entry(3, 2, Mood::Happy, SleepQuality::Excellent, &["exercise", "nature"]),
            entry(4, 30, Mood::Sad, SleepQuality::Poor, &["work"]),
        ];

        let insights = build_insights_at(now(), &entries, Window::Week);
        assert_eq!(insights.total_entries, 4);
        assert_eq!(insights.considered, 3);
        assert_eq!(insights.happy_activities[0].name, "exercise");
        assert_eq!(insights.happy_activities[0].count, 2);
        assert_eq!(insights.sad_activities.len(), 1);
        assert!(insights.sleep.is_some());
        assert_eq!(insights.trend.map(|points| points.len()), Some(3));
    }

    #[test]
    fn insights_with_empty_window() {
        let entries = vec![entry(1, 100, Mood::Happy, SleepQuality::Good, &[])];
        let insights = build_insights_at(now(), &entries, Window::Week);
        assert_eq!(insights.total_entries, 1);
        assert_eq!(insights.considered, 0);
        assert!(insights.moods.is_none());
        assert!(insights.trend.is_none());
    }
}
