use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use showcase_client::HttpTransport;
use showcase_core::config::{AppConfig, LoadOptions};
use showcase_core::{
    ApplicationError, AuditContext, InMemoryAuditSink, Showcase, ShowcaseContext,
    ShowcaseSession, ShowcaseState,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::commands::{session_summary, CommandResult};
use crate::session_store;

/// Upper bound on submissions in one walk; servers that keep returning new steps are cut off.
const MAX_STEPS: usize = 32;

#[derive(Debug, Clone)]
pub struct WalkArgs {
    pub url: String,
    pub answers: Option<PathBuf>,
    pub session: Option<PathBuf>,
}

pub fn run(args: WalkArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "walk",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let answers = match load_answers(args.answers.as_deref()) {
        Ok(answers) => answers,
        Err(message) => return CommandResult::failure("walk", "answers_decode", message, 5),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "walk",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                5,
            );
        }
    };

    let session_id = format!("walk-{}", Uuid::new_v4().simple());
    let session_path = args
        .session
        .unwrap_or_else(|| config.session.directory.join(format!("{session_id}.json")));
    let sink = InMemoryAuditSink::default();

    let result = runtime.block_on(walk(&config, &args.url, &answers, &session_id, &sink));
    let context = match result {
        Ok(context) => context,
        Err(error) => return CommandResult::from_application_error("walk", &error),
    };

    if let Err(error) = session_store::save(&session_path, &context) {
        return CommandResult::from_store_error("walk", &error);
    }

    let mut data = session_summary(&context);
    data["session_file"] = Value::String(session_path.display().to_string());
    data["events"] = Value::from(sink.event_types());
    CommandResult::success_with_data(
        "walk",
        format!("showcase walk stopped in state {}", context.state().as_str()),
        Some(data),
    )
}

async fn walk(
    config: &AppConfig,
    url: &str,
    answers: &BTreeMap<String, String>,
    session_id: &str,
    sink: &InMemoryAuditSink,
) -> Result<ShowcaseContext<Showcase>, ApplicationError> {
    let transport = HttpTransport::new(&config.http)
        .map_err(|error| ApplicationError::Transport(error.to_string()))?;
    let context = transport
        .fetch_initial(url)
        .await
        .map_err(|error| ApplicationError::Transport(error.to_string()))?;
    info!(
        event_name = "showcase.cli.walk_started",
        session_id = %session_id,
        url = %url,
        state = context.state().as_str(),
        "showcase fetched"
    );
    if context.state() == ShowcaseState::NotModified {
        return Ok(context);
    }

    let mut session = ShowcaseSession::new(
        context,
        transport,
        sink.clone(),
        AuditContext::new(session_id, session_id, "showcase-cli"),
    );
    for _ in 0..MAX_STEPS {
        fill_answers(session.context_mut(), answers);
        if session.submit().await? != ShowcaseState::HasNextStep {
            return Ok(session.into_context());
        }
    }

    warn!(
        event_name = "showcase.cli.walk_truncated",
        session_id = %session_id,
        max_steps = MAX_STEPS,
        "showcase kept advancing; stopping walk"
    );
    Ok(session.into_context())
}

fn load_answers(path: Option<&Path>) -> Result<BTreeMap<String, String>, String> {
    let Some(path) = path else {
        return Ok(BTreeMap::new());
    };
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read answers file `{}`: {error}", path.display()))?;
    serde_json::from_str::<BTreeMap<String, String>>(&raw).map_err(|error| {
        format!("answers file `{}` must be a JSON object of strings: {error}", path.display())
    })
}

/// Copies the answers whose names appear in the current form onto the step on screen.
fn fill_answers(context: &mut ShowcaseContext<Showcase>, answers: &BTreeMap<String, String>) {
    let Some(showcase) = context.current_showcase_mut() else {
        return;
    };
    let names = form_field_names(&showcase.form);
    for (name, value) in answers.iter().filter(|(name, _)| names.contains(*name)) {
        showcase.set_value(name.clone(), value.clone());
    }
}

fn form_field_names(form: &Value) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect_names(form, &mut names);
    names
}

fn collect_names(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_names(item, names)),
        Value::Object(fields) => {
            if let Some(Value::String(name)) = fields.get("name") {
                names.insert(name.clone());
            }
            fields.values().for_each(|field| collect_names(field, names));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use serde_json::json;
    use showcase_core::{PaymentSchema, Showcase, ShowcaseContext};

    use super::{fill_answers, form_field_names};

    #[test]
    fn field_names_are_collected_from_nested_containers() {
        let form = json!([
            { "type": "text", "name": "account" },
            { "type": "group", "items": [
                { "type": "amount", "name": "sum" },
                { "type": "paragraph", "items": [{ "text": "no name here" }] }
            ]}
        ]);

        let names: Vec<_> = form_field_names(&form).into_iter().collect();

        assert_eq!(names, vec!["account".to_owned(), "sum".to_owned()]);
    }

    #[test]
    fn only_answers_for_fields_on_screen_are_filled() {
        let mut showcase = Showcase::new("Step 1").with_hidden_field("scid", "5551");
        showcase.form = json!([{ "type": "amount", "name": "sum" }]);
        let mut context = ShowcaseContext::new(showcase, "https://x/1", Utc::now());
        let answers = BTreeMap::from([
            ("sum".to_owned(), "150.00".to_owned()),
            ("account".to_owned(), "42".to_owned()),
        ]);

        fill_answers(&mut context, &answers);

        let parameters = context
            .current_step()
            .showcase
            .as_ref()
            .map(PaymentSchema::payment_parameters)
            .unwrap_or_default();
        assert_eq!(parameters.get("sum").map(String::as_str), Some("150.00"));
        assert_eq!(parameters.get("scid").map(String::as_str), Some("5551"));
        assert!(!parameters.contains_key("account"));
    }
}
