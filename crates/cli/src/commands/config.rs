use std::env;
use std::fs;
use std::path::Path;

use showcase_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "http.user_agent",
        &config.http.user_agent,
        source("http.user_agent", &["SHOWCASE_HTTP_USER_AGENT"]),
    ));
    lines.push(render_line(
        "http.timeout_secs",
        &config.http.timeout_secs.to_string(),
        source("http.timeout_secs", &["SHOWCASE_HTTP_TIMEOUT_SECS"]),
    ));
    lines.push(render_line(
        "http.accept_language",
        &config.http.accept_language,
        source("http.accept_language", &["SHOWCASE_HTTP_ACCEPT_LANGUAGE"]),
    ));

    lines.push(render_line(
        "session.directory",
        &config.session.directory.display().to_string(),
        source("session.directory", &["SHOWCASE_SESSION_DIRECTORY"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["SHOWCASE_LOGGING_LEVEL", "SHOWCASE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["SHOWCASE_LOGGING_FORMAT", "SHOWCASE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::{contains_path, render_line};

    #[test]
    fn dotted_paths_resolve_against_nested_tables() {
        let doc: toml::Value = "[http]\ntimeout_secs = 5\n".parse().expect("toml parses");

        assert!(contains_path(&doc, "http.timeout_secs"));
        assert!(!contains_path(&doc, "http.user_agent"));
        assert!(!contains_path(&doc, "session.directory"));
    }

    #[test]
    fn lines_carry_their_source() {
        assert_eq!(
            render_line("http.timeout_secs", "5", "default".to_string()),
            "- http.timeout_secs = 5 (source: default)"
        );
    }
}
