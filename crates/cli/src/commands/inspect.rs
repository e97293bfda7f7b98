use std::path::Path;

use crate::commands::{session_summary, CommandResult};
use crate::session_store;

pub fn run(session: &Path) -> CommandResult {
    match session_store::load(session) {
        Ok(context) => CommandResult::success_with_data(
            "inspect",
            format!("session `{}` is {}", session.display(), context.state().as_str()),
            Some(session_summary(&context)),
        ),
        Err(error) => CommandResult::from_store_error("inspect", &error),
    }
}
