use crate::chat::ChatState;
use crate::escalation::EscalationView;
use crate::flow::{Effect, FlowError};
use crate::matrix::TaskMatrix;
use crate::progress::{self, ProgressView, SessionProgress};
use crate::storage::KvStore;
use crate::stress_check::{self, IntensityBand, StressCheckEvent, StressCheckState};
use crate::triage::{self, ConfirmationCopy, HelpOutcome, TriageEvent, TriageState};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StressLogStatus {
    Logged,
    Failed { message: String },
}

/// All state for the single user session. Each flow owns its slice; the
/// store is the durable backing for progress and the task matrix.
#[derive(Debug)]
pub struct Session {
    pub store: KvStore,
    pub progress: SessionProgress,
    pub stress_check: StressCheckState,
    pub triage: TriageState,
    pub chat: ChatState,
    pub matrix: TaskMatrix,
    pub stress_log: Option<StressLogStatus>,
}

impl Session {
    pub fn load(mut store: KvStore, username: &str, today: NaiveDate) -> Self {
        let progress = progress::load_progress(&mut store, today);
        let matrix = TaskMatrix::load(&store);
        Self {
            store,
            progress,
            stress_check: StressCheckState::default(),
            triage: TriageState::default(),
            chat: ChatState::new(username),
            matrix,
            stress_log: None,
        }
    }

    /// Applies the daily reset to progress and the store. Returns whether
    /// the store changed and needs persisting.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if !self.progress.roll_over(today) {
            return false;
        }
        progress::save_progress(&mut self.store, &self.progress);
        true
    }

    /// Progress for `today`, clearing yesterday's completions first.
    pub fn progress_on(&mut self, today: NaiveDate) -> &mut SessionProgress {
        self.roll_over(today);
        &mut self.progress
    }

    pub fn save_progress(&mut self) {
        progress::save_progress(&mut self.store, &self.progress);
    }

    pub fn save_matrix(&mut self) {
        self.matrix.save(&mut self.store);
    }

    pub fn apply_stress_check(&mut self, event: StressCheckEvent) -> Result<Vec<Effect>, FlowError> {
        let (next, effects) = stress_check::apply(&self.stress_check, event)?;
        self.stress_check = next;
        Ok(effects)
    }

    pub fn apply_triage(&mut self, event: TriageEvent) -> Result<Vec<Effect>, FlowError> {
        let (next, effects) = triage::apply(&self.triage, event)?;
        self.triage = next;
        Ok(effects)
    }

    pub fn apply_triage_outcome(&mut self, outcome: HelpOutcome) -> Result<Vec<Effect>, FlowError> {
        let (next, effects) = triage::apply_outcome(&self.triage, outcome)?;
        self.triage = next;
        Ok(effects)
    }

    pub fn snapshot(&self, escalation: EscalationView) -> SessionSnapshot {
        SessionSnapshot {
            progress: self.progress.view(),
            stress_check: StressCheckView {
                state: self.stress_check,
                progress_pct: self.stress_check.progress_pct(),
                band: self.stress_check.intensity().map(IntensityBand::for_intensity),
            },
            triage: TriageView {
                state: self.triage.clone(),
                confirmation: self.triage.confirmation(),
            },
            chat: self.chat.clone(),
            matrix: self.matrix.clone(),
            escalation,
            stress_log: self.stress_log.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StressCheckView {
    pub state: StressCheckState,
    pub progress_pct: u8,
    pub band: Option<IntensityBand>,
}

#[derive(Debug, Serialize)]
pub struct TriageView {
    pub state: TriageState,
    pub confirmation: Option<ConfirmationCopy>,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub progress: ProgressView,
    pub stress_check: StressCheckView,
    pub triage: TriageView,
    pub chat: ChatState,
    pub matrix: TaskMatrix,
    pub escalation: EscalationView,
    pub stress_log: Option<StressLogStatus>,
}
