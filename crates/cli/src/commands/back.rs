use std::path::Path;

use tracing::info;

use crate::commands::{session_summary, CommandResult};
use crate::session_store;

pub fn run(session: &Path) -> CommandResult {
    let mut context = match session_store::load(session) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_store_error("back", &error),
    };

    let undoing = !context.params().is_empty();
    let depth = context.history_size();
    context.pop_step();

    let message = if undoing {
        "completion undone; last step kept for resubmission"
    } else if context.history_size() < depth {
        "moved back one step"
    } else {
        "already at the first step"
    };
    info!(
        event_name = "showcase.cli.back",
        session_file = %session.display(),
        history_size = context.history_size(),
        state = context.state().as_str(),
        "{message}"
    );

    if let Err(error) = session_store::save(session, &context) {
        return CommandResult::from_store_error("back", &error);
    }
    CommandResult::success_with_data("back", message, Some(session_summary(&context)))
}
