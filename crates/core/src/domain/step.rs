use serde::{Deserialize, Serialize};

use crate::domain::showcase::Showcase;

/// One screen of the wizard: the form to present and the URL its answers are posted to.
///
/// Either part may be absent. Empty steps stand in for placeholder and terminal contexts,
/// so nothing is validated here; `StepRequest` rejects unusable steps when a request is
/// actually built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Step<S = Showcase> {
    pub showcase: Option<S>,
    pub submit_url: Option<String>,
}

impl<S> Step<S> {
    pub fn new(showcase: S, submit_url: impl Into<String>) -> Self {
        Self { showcase: Some(showcase), submit_url: Some(submit_url.into()) }
    }

    pub fn from_parts(showcase: Option<S>, submit_url: Option<String>) -> Self {
        Self { showcase, submit_url }
    }

    pub fn empty() -> Self {
        Self { showcase: None, submit_url: None }
    }

    pub fn is_empty(&self) -> bool {
        self.showcase.is_none() && self.submit_url.is_none()
    }
}
