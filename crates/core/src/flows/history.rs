use serde::{Deserialize, Serialize};

use crate::domain::step::Step;
use crate::errors::NavigationError;

/// Previously presented steps, most recent last.
///
/// Not synchronized; the owning context serializes access.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History<S> {
    steps: Vec<Step<S>>,
}

impl<S> History<S> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(&mut self, step: Step<S>) {
        self.steps.push(step);
    }

    pub fn pop(&mut self) -> Result<Step<S>, NavigationError> {
        self.steps.pop().ok_or(NavigationError::EmptyHistory)
    }

    pub fn size(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn peek(&self) -> Option<&Step<S>> {
        self.steps.last()
    }

    pub fn peek_all(&self) -> &[Step<S>] {
        &self.steps
    }
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> From<Vec<Step<S>>> for History<S> {
    fn from(steps: Vec<Step<S>>) -> Self {
        Self { steps }
    }
}

impl<S> FromIterator<Step<S>> for History<S> {
    fn from_iter<I: IntoIterator<Item = Step<S>>>(iter: I) -> Self {
        Self { steps: iter.into_iter().collect() }
    }
}
