//! Habit-tracking progress: XP, plant level, droplets and the set of tasks
//! completed today, persisted through the [`KvStore`].

use crate::storage::{
    KEY_COMPLETED_TODAY, KEY_DROPLETS, KEY_LAST_DATE, KEY_LEVEL, KEY_XP, KvStore,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::warn;

/// XP awarded for each droplet poured on the plant.
pub const WATERING_XP: u32 = 5;

const XP_PER_LEVEL: u32 = 10;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProgressError {
    #[error("no droplets left to water the plant")]
    InsufficientResource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    LeveledUp { level: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantStage {
    Seedling,
    Sprouting,
    Growing,
    Blooming,
}

impl PlantStage {
    pub fn for_level(level: u32) -> Self {
        match level {
            0 | 1 => Self::Seedling,
            2 | 3 => Self::Sprouting,
            4 | 5 => Self::Growing,
            _ => Self::Blooming,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Seedling => "Seedling",
            Self::Sprouting => "Sprouting",
            Self::Growing => "Growing",
            Self::Blooming => "Blooming",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub xp: u32,
    pub level: u32,
    pub droplets: u32,
    pub completed_task_ids: BTreeSet<String>,
    pub last_reset_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    pub xp: u32,
    pub level: u32,
    pub xp_needed: u32,
    pub progress_pct: f64,
    pub droplets: u32,
    pub can_water: bool,
    pub stage: PlantStage,
    pub stage_label: &'static str,
    pub completed_task_ids: Vec<String>,
    pub last_reset_date: String,
}

impl SessionProgress {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            xp: 0,
            level: 1,
            droplets: 0,
            completed_task_ids: BTreeSet::new(),
            last_reset_date: today,
        }
    }

    pub fn xp_needed(&self) -> u32 {
        self.level.saturating_mul(XP_PER_LEVEL)
    }

    /// Clears the daily completion set when `today` differs from the stored
    /// reset date. Returns whether a reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        self.completed_task_ids.clear();
        self.last_reset_date = today;
        true
    }

    pub fn add_droplets(&mut self, amount: u32) {
        self.droplets = self.droplets.saturating_add(amount);
    }

    pub fn spend_droplet(&mut self) -> Result<(), ProgressError> {
        if self.droplets == 0 {
            return Err(ProgressError::InsufficientResource);
        }
        self.droplets -= 1;
        Ok(())
    }

    /// Awards XP. At most one level is gained per award; the overflow carries
    /// into the new level but stays one short of its threshold.
    pub fn add_xp(&mut self, amount: u32) -> Option<ProgressEvent> {
        let total = self.xp.saturating_add(amount);
        let needed = self.xp_needed();
        if total < needed {
            self.xp = total;
            return None;
        }

        self.level = self.level.saturating_add(1);
        let cap = self.xp_needed().saturating_sub(1);
        self.xp = (total - needed).min(cap);
        Some(ProgressEvent::LeveledUp { level: self.level })
    }

    /// Marks a task done and credits its points as droplets. Completing an
    /// already completed task does nothing.
    pub fn complete_task(&mut self, task_id: &str, points: u32) -> bool {
        if !self.completed_task_ids.insert(task_id.to_string()) {
            return false;
        }
        self.add_droplets(points);
        true
    }

    pub fn uncomplete_task(&mut self, task_id: &str, points: u32) -> bool {
        if !self.completed_task_ids.remove(task_id) {
            return false;
        }
        self.droplets = self.droplets.saturating_sub(points);
        true
    }

    pub fn water_plant(&mut self) -> Result<Option<ProgressEvent>, ProgressError> {
        self.spend_droplet()?;
        Ok(self.add_xp(WATERING_XP))
    }

    pub fn stage(&self) -> PlantStage {
        PlantStage::for_level(self.level)
    }

    pub fn view(&self) -> ProgressView {
        let xp_needed = self.xp_needed();
        let progress_pct = if xp_needed == 0 {
            0.0
        } else {
            (f64::from(self.xp) / f64::from(xp_needed) * 100.0).min(100.0)
        };
        let stage = self.stage();

        ProgressView {
            xp: self.xp,
            level: self.level,
            xp_needed,
            progress_pct,
            droplets: self.droplets,
            can_water: self.droplets > 0,
            stage,
            stage_label: stage.label(),
            completed_task_ids: self.completed_task_ids.iter().cloned().collect(),
            last_reset_date: date_key(self.last_reset_date),
        }
    }
}

/// Reads progress from the store, applying the daily reset. When a reset
/// happens the new date and the emptied set are written back to `store`.
pub fn load_progress(store: &mut KvStore, today: NaiveDate) -> SessionProgress {
    let xp = read_number(store, KEY_XP).unwrap_or(0);
    let level = read_number(store, KEY_LEVEL).unwrap_or(1).max(1);
    let droplets = read_number(store, KEY_DROPLETS).unwrap_or(0);
    let completed_task_ids = store
        .get(KEY_COMPLETED_TODAY)
        .and_then(|raw| match serde_json::from_str::<BTreeSet<String>>(raw) {
            Ok(ids) => Some(ids),
            Err(err) => {
                warn!("ignoring unreadable {KEY_COMPLETED_TODAY}: {err}");
                None
            }
        })
        .unwrap_or_default();
    let stored_date = store
        .get(KEY_LAST_DATE)
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok());

    let mut progress = SessionProgress {
        xp,
        level,
        droplets,
        completed_task_ids,
        // An unknown date always counts as a new day.
        last_reset_date: stored_date.unwrap_or(NaiveDate::MIN),
    };

    if progress.roll_over(today) {
        store.set(KEY_LAST_DATE, date_key(today));
        store.set(KEY_COMPLETED_TODAY, "[]");
    }

    progress
}

pub fn save_progress(store: &mut KvStore, progress: &SessionProgress) {
    store.set(KEY_XP, progress.xp.to_string());
    store.set(KEY_LEVEL, progress.level.to_string());
    store.set(KEY_DROPLETS, progress.droplets.to_string());
    let ids = serde_json::to_string(&progress.completed_task_ids).unwrap_or_else(|_| "[]".into());
    store.set(KEY_COMPLETED_TODAY, ids);
    store.set(KEY_LAST_DATE, date_key(progress.last_reset_date));
}

fn read_number(store: &KvStore, key: &str) -> Option<u32> {
    let raw = store.get(key)?;
    match raw.trim().parse::<u32>() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("ignoring unreadable {key} value {raw:?}: {err}");
            None
        }
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
