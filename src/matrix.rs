use crate::flow::FlowError;
use crate::storage::{KEY_MATRIX_TASKS, KvStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    Do,
    Schedule,
    Delegate,
    Delete,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [Self::Do, Self::Schedule, Self::Delegate, Self::Delete];
}

/// Urgent/important task matrix; each quadrant keeps its tasks in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskMatrix {
    quadrants: BTreeMap<Quadrant, Vec<String>>,
}

impl Default for TaskMatrix {
    fn default() -> Self {
        Self {
            quadrants: Quadrant::ALL.into_iter().map(|q| (q, Vec::new())).collect(),
        }
    }
}

impl TaskMatrix {
    pub fn load(store: &KvStore) -> Self {
        let Some(raw) = store.get(KEY_MATRIX_TASKS) else {
            return Self::default();
        };
        match serde_json::from_str::<BTreeMap<Quadrant, Vec<String>>>(raw) {
            Ok(stored) => {
                let mut matrix = Self::default();
                matrix.quadrants.extend(stored);
                matrix
            }
            Err(err) => {
                warn!("ignoring unreadable {KEY_MATRIX_TASKS}: {err}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut KvStore) {
        match serde_json::to_string(&self.quadrants) {
            Ok(raw) => store.set(KEY_MATRIX_TASKS, raw),
            Err(err) => warn!("failed to encode task matrix: {err}"),
        }
    }

    pub fn tasks(&self, quadrant: Quadrant) -> &[String] {
        self.quadrants.get(&quadrant).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add(&mut self, quadrant: Quadrant, text: &str) -> Result<(), FlowError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FlowError::invalid("Please enter a task description"));
        }
        self.quadrants.entry(quadrant).or_default().push(text.to_string());
        Ok(())
    }

    /// Moves a task to the end of another quadrant.
    pub fn move_task(&mut self, from: Quadrant, index: usize, to: Quadrant) -> Result<(), FlowError> {
        let task = self.take(from, index)?;
        self.quadrants.entry(to).or_default().push(task);
        Ok(())
    }

    pub fn delete(&mut self, quadrant: Quadrant, index: usize) -> Result<String, FlowError> {
        self.take(quadrant, index)
    }

    fn take(&mut self, quadrant: Quadrant, index: usize) -> Result<String, FlowError> {
        let tasks = self.quadrants.entry(quadrant).or_default();
        if index >= tasks.len() {
            return Err(FlowError::invalid(format!("no task at position {index}")));
        }
        Ok(tasks.remove(index))
    }
}
