use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::showcase::PaymentSchema;
use crate::domain::step::Step;
use crate::errors::NavigationError;

pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";

/// IMF-fixdate, the only date format HTTP senders are allowed to generate.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Transport-neutral description of a step submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepRequest {
    pub url: String,
    pub if_modified_since: DateTime<Utc>,
    pub parameters: BTreeMap<String, String>,
}

impl StepRequest {
    /// Builds the submission for `step`, failing before any network call when the step
    /// has no form or no submit URL. The URL is sent exactly as stored.
    pub fn new<S>(step: &Step<S>, last_modified: DateTime<Utc>) -> Result<Self, NavigationError>
    where
        S: PaymentSchema,
    {
        let showcase = step.showcase.as_ref().ok_or_else(|| {
            NavigationError::InvalidState("showcase of current step is missing".to_owned())
        })?;
        let url = match step.submit_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_owned(),
            _ => {
                return Err(NavigationError::InvalidState(
                    "submit url of current step is missing or empty".to_owned(),
                ))
            }
        };

        let parameters = showcase.payment_parameters();
        Ok(Self { url, if_modified_since: last_modified, parameters })
    }

    pub fn if_modified_since_header(&self) -> String {
        self.if_modified_since.format(HTTP_DATE_FORMAT).to_string()
    }

    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![(IF_MODIFIED_SINCE, self.if_modified_since_header())]
    }
}
