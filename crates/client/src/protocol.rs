use chrono::{DateTime, Utc};
use serde_json::Value;
use showcase_core::{extract_params, Showcase, ShowcaseContext, ShowcaseState, SubmissionOutcome};

use crate::error::TransportError;

pub const STATUS_OK: u16 = 200;
pub const STATUS_MULTIPLE_CHOICES: u16 = 300;
pub const STATUS_NOT_MODIFIED: u16 = 304;
pub const STATUS_BAD_REQUEST: u16 = 400;

/// Parts of an HTTP response the showcase protocol looks at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseParts<'a> {
    pub status: u16,
    pub location: Option<&'a str>,
    pub last_modified: Option<&'a str>,
    pub body: &'a [u8],
}

/// Maps the response to a step submission onto a navigation outcome.
pub fn classify_submission(
    response: &ResponseParts<'_>,
) -> Result<SubmissionOutcome<Showcase>, TransportError> {
    match response.status {
        STATUS_NOT_MODIFIED => Ok(SubmissionOutcome::NotModified),
        STATUS_MULTIPLE_CHOICES => {
            let submit_url = location(response)?;
            let showcase = serde_json::from_slice::<Showcase>(response.body)?;
            Ok(SubmissionOutcome::NextStep { showcase, submit_url })
        }
        STATUS_OK => {
            let payload = serde_json::from_slice::<Value>(response.body)?;
            let params = extract_params(&payload)
                .map_err(|error| TransportError::Protocol(error.to_string()))?;
            if params.is_empty() {
                return Err(TransportError::Protocol(
                    "completion payload carries no parameters".to_owned(),
                ));
            }
            Ok(SubmissionOutcome::Completed { params })
        }
        STATUS_BAD_REQUEST => {
            // the error annotations are a courtesy; a bare 400 is still a rejection
            let annotated = serde_json::from_slice::<Showcase>(response.body).ok();
            Ok(SubmissionOutcome::InvalidParams { annotated })
        }
        status => Err(TransportError::UnexpectedStatus { status }),
    }
}

/// Builds the starting context from the response to the initial showcase fetch.
pub fn classify_initial(
    requested_url: &str,
    response: &ResponseParts<'_>,
) -> Result<ShowcaseContext<Showcase>, TransportError> {
    match response.status {
        STATUS_NOT_MODIFIED => Ok(ShowcaseContext::placeholder(ShowcaseState::NotModified)),
        STATUS_OK | STATUS_MULTIPLE_CHOICES => {
            let showcase = serde_json::from_slice::<Showcase>(response.body)?;
            let submit_url = response
                .location
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or(requested_url)
                .to_owned();
            let last_modified =
                response.last_modified.and_then(parse_http_date).unwrap_or_else(Utc::now);
            Ok(ShowcaseContext::new(showcase, submit_url, last_modified))
        }
        status => Err(TransportError::UnexpectedStatus { status }),
    }
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim()).ok().map(|date| date.with_timezone(&Utc))
}

fn location(response: &ResponseParts<'_>) -> Result<String, TransportError> {
    response
        .location
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or(TransportError::MissingLocation { status: response.status })
}
