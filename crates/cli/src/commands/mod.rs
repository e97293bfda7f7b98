pub mod back;
pub mod config;
pub mod doctor;
pub mod inspect;
pub mod request;
pub mod walk;

use serde::Serialize;
use serde_json::Value;
use showcase_core::{ApplicationError, Showcase, ShowcaseContext};

use crate::session_store::SessionStoreError;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_application_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    pub fn from_store_error(command: &str, error: &SessionStoreError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }
}

/// JSON summary of a context shared by the session commands.
pub(crate) fn session_summary(context: &ShowcaseContext<Showcase>) -> Value {
    let current = context.current_step();
    serde_json::json!({
        "state": context.state().as_str(),
        "history_size": context.history_size(),
        "last_modified": context.last_modified().to_rfc3339(),
        "current_step": {
            "title": current.showcase.as_ref().map(|showcase| showcase.title.clone()),
            "submit_url": current.submit_url.clone(),
        },
        "params": context.params(),
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
