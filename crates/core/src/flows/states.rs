use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Classification of the last submission or fetch.
///
/// No state is absorbing: `Completed` returns to `HasNextStep` when completion is undone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowcaseState {
    HasNextStep,
    InvalidParams,
    Completed,
    NotModified,
    #[default]
    Unknown,
}

impl ShowcaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasNextStep => "has_next_step",
            Self::InvalidParams => "invalid_params",
            Self::Completed => "completed",
            Self::NotModified => "not_modified",
            Self::Unknown => "unknown",
        }
    }
}

/// Already-classified result of executing a `StepRequest`.
///
/// Transport failures never reach this type; they stay on the transport's error channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionOutcome<S> {
    NextStep { showcase: S, submit_url: String },
    Completed { params: BTreeMap<String, String> },
    NotModified,
    /// The server rejected the answers. The annotated form, when returned, is kept for
    /// display only and does not replace the current step.
    InvalidParams { annotated: Option<S> },
}

impl<S> SubmissionOutcome<S> {
    pub fn state(&self) -> ShowcaseState {
        match self {
            Self::NextStep { .. } => ShowcaseState::HasNextStep,
            Self::Completed { .. } => ShowcaseState::Completed,
            Self::NotModified => ShowcaseState::NotModified,
            Self::InvalidParams { .. } => ShowcaseState::InvalidParams,
        }
    }
}
