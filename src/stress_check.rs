//! The 30-second stress check: source, then intensity, then a time budget,
//! with a guardrail that diverts high intensities to a crisis step.

use crate::escalation::EscalationSignal;
use crate::flow::{Effect, FlowError, Transition};
use serde::{Deserialize, Serialize};

/// Intensities at or above this value divert to the crisis step.
pub const CRISIS_THRESHOLD: u8 = 8;
pub const MAX_INTENSITY: u8 = 10;
const DEFAULT_INTENSITY: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressSource {
    ExamDeadline,
    Overthinking,
    Relationships,
    Sleep,
    Money,
    Other,
}

impl StressSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::ExamDeadline => "Exam/Deadline",
            Self::Overthinking => "Overthinking",
            Self::Relationships => "Relationships",
            Self::Sleep => "Sleep",
            Self::Money => "Money",
            Self::Other => "Something else",
        }
    }

    /// Sources better served by the focus zone than by the tool shelf.
    fn wants_focus(self) -> bool {
        matches!(self, Self::ExamDeadline | Self::Overthinking)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimeBudget {
    Two,
    Five,
    Ten,
}

impl TimeBudget {
    pub fn minutes(self) -> u8 {
        match self {
            Self::Two => 2,
            Self::Five => 5,
            Self::Ten => 10,
        }
    }
}

impl TryFrom<u8> for TimeBudget {
    type Error = String;

    fn try_from(minutes: u8) -> Result<Self, Self::Error> {
        match minutes {
            2 => Ok(Self::Two),
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            other => Err(format!("time budget must be 2, 5 or 10 minutes, got {other}")),
        }
    }
}

impl From<TimeBudget> for u8 {
    fn from(budget: TimeBudget) -> Self {
        budget.minutes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBand {
    Calm,
    Elevated,
    Severe,
}

impl IntensityBand {
    pub fn for_intensity(intensity: u8) -> Self {
        match intensity {
            0..=4 => Self::Calm,
            5..=7 => Self::Elevated,
            _ => Self::Severe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StressCheckState {
    #[default]
    Closed,
    SelectSource,
    RateIntensity {
        source: StressSource,
        intensity: u8,
    },
    Crisis {
        source: StressSource,
        intensity: u8,
    },
    ChooseTime {
        source: StressSource,
        intensity: u8,
    },
}

impl StressCheckState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::SelectSource => "selecting a source",
            Self::RateIntensity { .. } => "rating intensity",
            Self::Crisis { .. } => "in the crisis step",
            Self::ChooseTime { .. } => "choosing a time budget",
        }
    }

    pub fn progress_pct(&self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::SelectSource => 33,
            Self::RateIntensity { .. } => 66,
            Self::ChooseTime { .. } => 99,
            Self::Crisis { .. } => 100,
        }
    }

    pub fn intensity(&self) -> Option<u8> {
        match self {
            Self::RateIntensity { intensity, .. }
            | Self::Crisis { intensity, .. }
            | Self::ChooseTime { intensity, .. } => Some(*intensity),
            Self::Closed | Self::SelectSource => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StressCheckEvent {
    Start,
    SelectSource { source: StressSource },
    SetIntensity { intensity: u8 },
    ConfirmIntensity,
    OverrideCrisis,
    StartPanic,
    SelectTime { minutes: TimeBudget },
    Cancel,
}

impl StressCheckEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectSource { .. } => "select a source",
            Self::SetIntensity { .. } => "set intensity",
            Self::ConfirmIntensity => "confirm intensity",
            Self::OverrideCrisis => "override the crisis step",
            Self::StartPanic => "start panic mode",
            Self::SelectTime { .. } => "select a time budget",
            Self::Cancel => "cancel",
        }
    }
}

pub fn apply(state: &StressCheckState, event: StressCheckEvent) -> Transition<StressCheckState> {
    use StressCheckState as S;

    match (*state, event) {
        (_, StressCheckEvent::Start) => Ok((S::SelectSource, Vec::new())),
        (_, StressCheckEvent::Cancel) => Ok((S::Closed, Vec::new())),
        (S::SelectSource, StressCheckEvent::SelectSource { source }) => Ok((
            S::RateIntensity {
                source,
                intensity: DEFAULT_INTENSITY,
            },
            Vec::new(),
        )),
        (S::RateIntensity { source, .. }, StressCheckEvent::SetIntensity { intensity }) => {
            if intensity > MAX_INTENSITY {
                return Err(FlowError::invalid(format!(
                    "intensity must be between 0 and {MAX_INTENSITY}"
                )));
            }
            Ok((S::RateIntensity { source, intensity }, Vec::new()))
        }
        (S::RateIntensity { source, intensity }, StressCheckEvent::ConfirmIntensity) => {
            let effects = vec![Effect::LogStress {
                level: intensity,
                source,
            }];
            let next = if intensity >= CRISIS_THRESHOLD {
                S::Crisis { source, intensity }
            } else {
                S::ChooseTime { source, intensity }
            };
            Ok((next, effects))
        }
        (S::Crisis { source, intensity }, StressCheckEvent::OverrideCrisis) => {
            Ok((S::ChooseTime { source, intensity }, Vec::new()))
        }
        (S::Crisis { .. }, StressCheckEvent::StartPanic) => Ok((
            S::Closed,
            vec![Effect::Escalate {
                signal: EscalationSignal::PanicOverlay,
            }],
        )),
        (S::ChooseTime { source, intensity }, StressCheckEvent::SelectTime { minutes }) => Ok((
            S::Closed,
            vec![route_to_solution(minutes, source, intensity)],
        )),
        (state, event) => Err(FlowError::unexpected(state.name(), event.name())),
    }
}

/// Picks where a finished check sends the user.
pub fn route_to_solution(budget: TimeBudget, source: StressSource, intensity: u8) -> Effect {
    match budget {
        TimeBudget::Two => Effect::Escalate {
            signal: EscalationSignal::PanicOverlay,
        },
        TimeBudget::Five => Effect::PrefillChat {
            text: format!(
                "I'm feeling stressed about {} (Level {intensity}). Can we talk for 5 minutes?",
                source.label()
            ),
        },
        TimeBudget::Ten if source.wants_focus() => Effect::navigate("/focus"),
        TimeBudget::Ten => Effect::navigate("/tools"),
    }
}
