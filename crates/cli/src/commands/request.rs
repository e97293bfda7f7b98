use std::collections::BTreeMap;
use std::path::Path;

use showcase_core::ApplicationError;

use crate::commands::CommandResult;
use crate::session_store;

pub fn run(session: &Path) -> CommandResult {
    let context = match session_store::load(session) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_store_error("request", &error),
    };

    match context.create_request() {
        Ok(request) => {
            let headers: BTreeMap<String, String> = request
                .headers()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect();
            let data = serde_json::json!({
                "method": "POST",
                "url": request.url,
                "headers": headers,
                "parameters": request.parameters,
            });
            CommandResult::success_with_data("request", "request is ready", Some(data))
        }
        Err(error) => {
            CommandResult::from_application_error("request", &ApplicationError::from(error))
        }
    }
}
