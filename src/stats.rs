use crate::models::StressHistoryEntry;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

const DEMO_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Today"];
const DEMO_LEVELS: [u8; 7] = [3, 5, 4, 7, 6, 4, 5];

#[derive(Debug, Serialize)]
pub struct DailyStress {
    pub date: String,
    pub entries: usize,
    pub avg_level: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct StressTrend {
    pub labels: Vec<String>,
    pub levels: Vec<u8>,
    /// Placeholder series shown while no history exists yet.
    pub demo: bool,
    pub avg_level: Option<f64>,
    pub last_7_days: Vec<DailyStress>,
}

pub fn build_trend_at(today: NaiveDate, history: &[StressHistoryEntry]) -> StressTrend {
    let last_7_days = (0..7)
        .rev()
        .map(|offset| {
            let date = date_key(today - Duration::days(offset));
            let levels: Vec<u8> = history
                .iter()
                .filter(|entry| entry.date.starts_with(&date))
                .map(|entry| entry.level)
                .collect();
            DailyStress {
                date,
                entries: levels.len(),
                avg_level: average(&levels),
            }
        })
        .collect();

    if history.is_empty() {
        return StressTrend {
            labels: DEMO_LABELS.iter().map(|label| label.to_string()).collect(),
            levels: DEMO_LEVELS.to_vec(),
            demo: true,
            avg_level: average(&DEMO_LEVELS),
            last_7_days,
        };
    }

    let levels: Vec<u8> = history.iter().map(|entry| entry.level).collect();
    StressTrend {
        labels: history.iter().map(|entry| entry.date.clone()).collect(),
        avg_level: average(&levels),
        levels,
        demo: false,
        last_7_days,
    }
}

fn average(levels: &[u8]) -> Option<f64> {
    if levels.is_empty() {
        return None;
    }
    let sum: u32 = levels.iter().map(|&level| u32::from(level)).sum();
    Some(f64::from(sum) / levels.len() as f64)
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, level: u8) -> StressHistoryEntry {
        StressHistoryEntry {
            date: date.to_string(),
            level,
        }
    }

    #[test]
    fn empty_history_uses_demo_series() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let trend = build_trend_at(today, &[]);

        assert!(trend.demo);
        assert_eq!(trend.labels.last().map(String::as_str), Some("Today"));
        assert_eq!(trend.levels, vec![3, 5, 4, 7, 6, 4, 5]);
        assert_eq!(trend.last_7_days.len(), 7);
        assert!(trend.last_7_days.iter().all(|day| day.avg_level.is_none()));
    }

    #[test]
    fn history_is_bucketed_into_last_7_days() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let history = vec![
            entry("2026-01-03 09:12", 4),
            entry("2026-01-03 21:40", 8),
            entry("2025-12-20", 2),
        ];
        let trend = build_trend_at(today, &history);

        assert!(!trend.demo);
        assert_eq!(trend.levels, vec![4, 8, 2]);
        assert_eq!(trend.avg_level, Some(14.0 / 3.0));
        let day = trend
            .last_7_days
            .iter()
            .find(|day| day.date == "2026-01-03")
            .expect("missing day");
        assert_eq!(day.entries, 2);
        assert_eq!(day.avg_level, Some(6.0));
        assert_eq!(trend.last_7_days.last().unwrap().date, "2026-01-05");
    }
}
