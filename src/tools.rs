//! Small planning calculators: bedtimes from sleep cycles, and splitting a
//! big task into daily chunks.

use chrono::{Duration, NaiveTime};
use serde::Serialize;
use thiserror::Error;

const CYCLE_MINUTES: i64 = 90;
const FALL_ASLEEP_MINUTES: i64 = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("wake time must look like HH:MM")]
    InvalidWakeTime,
    #[error("please describe the task")]
    EmptyTask,
    #[error("days available must be at least 1")]
    NoDays,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bedtime {
    pub time: String,
    pub cycles: u8,
    pub hours_of_sleep: f64,
    pub label: &'static str,
}

pub fn parse_wake_time(raw: &str) -> Result<NaiveTime, ToolError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| ToolError::InvalidWakeTime)
}

pub fn bedtimes(wake: NaiveTime) -> Vec<Bedtime> {
    [(6u8, "Ideal"), (5, "Good"), (4, "Minimum")]
        .into_iter()
        .map(|(cycles, label)| {
            let sleep_minutes = i64::from(cycles) * CYCLE_MINUTES;
            // NaiveTime subtraction wraps past midnight.
            let bedtime = wake - Duration::minutes(sleep_minutes + FALL_ASLEEP_MINUTES);
            Bedtime {
                time: bedtime.format("%I:%M %p").to_string(),
                cycles,
                hours_of_sleep: sleep_minutes as f64 / 60.0,
                label,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPlan {
    pub day: u32,
    pub subtasks: Vec<&'static str>,
}

const WRITING_STEPS: &[&str] = &[
    "Research & gather 5-7 sources",
    "Create detailed outline with main arguments",
    "Write introduction (10% of total)",
    "Draft body paragraphs (Section 1)",
    "Draft body paragraphs (Section 2)",
    "Draft body paragraphs (Section 3)",
    "Write conclusion & refine thesis",
    "Edit for clarity & flow",
    "Proofread & check citations",
];

const STUDY_STEPS: &[&str] = &[
    "Review syllabus & identify key topics",
    "Organize notes by chapter/topic",
    "Read/skim Chapter 1-3",
    "Read/skim Chapter 4-6",
    "Make flashcards for key terms",
    "Practice problems (Set 1)",
    "Practice problems (Set 2)",
    "Study group or office hours",
    "Review all flashcards & weak spots",
];

const PROJECT_STEPS: &[&str] = &[
    "Read requirements & rubric carefully",
    "Brainstorm 3 potential approaches",
    "Create project outline/plan",
    "Complete Part 1 (Foundation)",
    "Complete Part 2 (Core work)",
    "Complete Part 3 (Finishing touches)",
    "Self-review against rubric",
    "Polish & final formatting",
];

const GENERIC_STEPS: &[&str] = &[
    "Clarify exact requirements",
    "Break into 3-5 major parts",
    "Complete Part 1",
    "Complete Part 2",
    "Complete Part 3",
    "Review & refine",
    "Final polish",
];

fn steps_for(task: &str) -> &'static [&'static str] {
    let task = task.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|word| task.contains(word));

    if mentions(&["thesis", "paper", "essay"]) {
        WRITING_STEPS
    } else if mentions(&["study", "exam", "test"]) {
        STUDY_STEPS
    } else if mentions(&["project", "assignment"]) {
        PROJECT_STEPS
    } else {
        GENERIC_STEPS
    }
}

/// Splits a task into `ceil(steps / days)` subtasks per day. Short plans
/// may use fewer days than offered.
pub fn chunk_task(task: &str, days: u32) -> Result<Vec<DayPlan>, ToolError> {
    if task.trim().is_empty() {
        return Err(ToolError::EmptyTask);
    }
    if days == 0 {
        return Err(ToolError::NoDays);
    }

    let steps = steps_for(task);
    let per_day = steps.len().div_ceil(days as usize);

    Ok(steps
        .chunks(per_day)
        .zip(1..)
        .map(|(chunk, day)| DayPlan {
            day,
            subtasks: chunk.to_vec(),
        })
        .collect())
}
