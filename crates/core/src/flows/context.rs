use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::showcase::{PaymentSchema, Showcase};
use crate::domain::step::Step;
use crate::errors::NavigationError;
use crate::flows::history::History;
use crate::flows::request::StepRequest;
use crate::flows::states::{ShowcaseState, SubmissionOutcome};

/// Navigation state of one wizard session.
///
/// Holds the step on screen, the steps behind it, the `last_modified` marker used for
/// conditional fetches, and the outcome of the last submission. Mutation goes through
/// `&mut self`, so one session owns one context and navigation calls cannot interleave.
///
/// `params` is non-empty exactly when `state` is `Completed` as long as completion goes
/// through [`ShowcaseContext::complete`] (or [`ShowcaseContext::set_params`]).
/// [`ShowcaseContext::set_state`] is a raw setter and can break that pairing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowcaseContext<S = Showcase> {
    history: History<S>,
    last_modified: DateTime<Utc>,
    current_step: Step<S>,
    params: BTreeMap<String, String>,
    state: ShowcaseState,
}

impl<S> ShowcaseContext<S> {
    /// Fresh context for the first step of a showcase.
    pub fn new(showcase: S, submit_url: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            history: History::new(),
            last_modified,
            current_step: Step::new(showcase, submit_url),
            params: BTreeMap::new(),
            state: ShowcaseState::Unknown,
        }
    }

    /// Context that carries nothing but an outcome, e.g. a not-modified initial fetch.
    pub fn placeholder(state: ShowcaseState) -> Self {
        Self {
            history: History::new(),
            last_modified: Utc::now(),
            current_step: Step::empty(),
            params: BTreeMap::new(),
            state,
        }
    }

    /// Rebuilds a context from externally held session data.
    ///
    /// Empty history and params are fine; absent ones are rejected. An absent current step
    /// becomes an empty step, which fails later at request construction.
    pub fn resume(
        history: Option<History<S>>,
        last_modified: Option<DateTime<Utc>>,
        current_step: Option<Step<S>>,
        params: Option<BTreeMap<String, String>>,
        state: ShowcaseState,
    ) -> Result<Self, NavigationError> {
        let history = history
            .ok_or_else(|| NavigationError::InvalidArgument("history is missing".to_owned()))?;
        let last_modified = last_modified.ok_or_else(|| {
            NavigationError::InvalidArgument("last_modified is missing".to_owned())
        })?;
        let params = params
            .ok_or_else(|| NavigationError::InvalidArgument("params is missing".to_owned()))?;

        Ok(Self {
            history,
            last_modified,
            current_step: current_step.unwrap_or_else(Step::empty),
            params,
            state,
        })
    }

    /// Goes back one step.
    ///
    /// A completed context first drops its params and returns to `HasNextStep`, keeping the
    /// last step on screen so it can be resubmitted. Only a context without params walks
    /// back through history. With neither, nothing changes.
    pub fn pop_step(&mut self) -> &Step<S> {
        if !self.params.is_empty() {
            self.params.clear();
            self.state = ShowcaseState::HasNextStep;
        } else if let Ok(previous) = self.history.pop() {
            self.current_step = previous;
        }
        &self.current_step
    }

    /// Moves the current step into history and puts `new_step` on screen.
    pub fn push_current_step(
        &mut self,
        new_step: impl Into<Option<Step<S>>>,
    ) -> Result<(), NavigationError> {
        let new_step = new_step
            .into()
            .ok_or_else(|| NavigationError::InvalidArgument("new step is missing".to_owned()))?;
        let previous = std::mem::replace(&mut self.current_step, new_step);
        self.history.push(previous);
        Ok(())
    }

    /// Records the finished payment parameters and marks the context `Completed`.
    pub fn complete(&mut self, params: BTreeMap<String, String>) -> Result<(), NavigationError> {
        if params.is_empty() {
            return Err(NavigationError::InvalidArgument(
                "completed params must not be empty".to_owned(),
            ));
        }
        self.params = params;
        self.state = ShowcaseState::Completed;
        Ok(())
    }

    /// Completes from a decoded response payload of the form `{"params": {...}}`.
    pub fn set_params(&mut self, payload: &Value) -> Result<(), NavigationError> {
        let params = extract_params(payload)?;
        self.complete(params)
    }

    pub fn set_state(&mut self, state: ShowcaseState) {
        self.state = state;
    }

    /// Applies a classified transport outcome and returns the resulting state.
    pub fn apply_outcome(
        &mut self,
        outcome: SubmissionOutcome<S>,
    ) -> Result<ShowcaseState, NavigationError> {
        match outcome {
            SubmissionOutcome::NextStep { showcase, submit_url } => {
                self.push_current_step(Step::new(showcase, submit_url))?;
                self.params.clear();
                self.state = ShowcaseState::HasNextStep;
            }
            SubmissionOutcome::Completed { params } => self.complete(params)?,
            SubmissionOutcome::NotModified => {
                self.params.clear();
                self.state = ShowcaseState::NotModified;
            }
            SubmissionOutcome::InvalidParams { .. } => {
                self.params.clear();
                self.state = ShowcaseState::InvalidParams;
            }
        }
        Ok(self.state)
    }

    /// Replaces the answers of the step on screen without touching navigation.
    pub fn current_showcase_mut(&mut self) -> Option<&mut S> {
        self.current_step.showcase.as_mut()
    }

    pub fn history_size(&self) -> usize {
        self.history.size()
    }

    pub fn history(&self) -> &History<S> {
        &self.history
    }

    pub fn current_step(&self) -> &Step<S> {
        &self.current_step
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn state(&self) -> ShowcaseState {
        self.state
    }
}

impl<S> ShowcaseContext<S>
where
    S: PaymentSchema,
{
    pub fn create_request(&self) -> Result<StepRequest, NavigationError> {
        StepRequest::new(&self.current_step, self.last_modified)
    }
}

impl<S> ShowcaseContext<S>
where
    S: Clone,
{
    pub fn snapshot(&self) -> ShowcaseSnapshot<S> {
        ShowcaseSnapshot {
            history: Some(self.history.clone()),
            last_modified: Some(self.last_modified),
            current_step: Some(self.current_step.clone()),
            params: Some(self.params.clone()),
            state: self.state,
        }
    }
}

/// Serializable form of a context for session resumption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowcaseSnapshot<S = Showcase> {
    pub history: Option<History<S>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub current_step: Option<Step<S>>,
    pub params: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub state: ShowcaseState,
}

impl<S> TryFrom<ShowcaseSnapshot<S>> for ShowcaseContext<S> {
    type Error = NavigationError;

    fn try_from(snapshot: ShowcaseSnapshot<S>) -> Result<Self, Self::Error> {
        Self::resume(
            snapshot.history,
            snapshot.last_modified,
            snapshot.current_step,
            snapshot.params,
            snapshot.state,
        )
    }
}

/// Reads the finished parameter map out of a decoded completion payload.
///
/// Strings are kept verbatim, other scalars use their JSON text and `null` entries are
/// dropped.
pub fn extract_params(payload: &Value) -> Result<BTreeMap<String, String>, NavigationError> {
    let object = payload.get("params").and_then(Value::as_object).ok_or_else(|| {
        NavigationError::InvalidArgument("payload has no `params` object".to_owned())
    })?;

    Ok(object
        .iter()
        .filter_map(|(name, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((name.clone(), text.clone())),
            other => Some((name.clone(), other.to_string())),
        })
        .collect())
}
