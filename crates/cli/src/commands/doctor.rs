use serde::Serialize;
use showcase_client::HttpTransport;
use showcase_core::config::{AppConfig, LoadOptions};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_session_directory(&config));
            checks.push(check_http_client(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["session_directory", "http_client"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_session_directory(config: &AppConfig) -> DoctorCheck {
    let directory = &config.session.directory;
    let (status, details) = if directory.is_dir() {
        (CheckStatus::Pass, format!("`{}` is ready", directory.display()))
    } else if directory.exists() {
        (CheckStatus::Fail, format!("`{}` exists but is not a directory", directory.display()))
    } else {
        (CheckStatus::Pass, format!("`{}` will be created on first save", directory.display()))
    };
    DoctorCheck { name: "session_directory", status, details }
}

fn check_http_client(config: &AppConfig) -> DoctorCheck {
    match HttpTransport::new(&config.http) {
        Ok(_) => DoctorCheck {
            name: "http_client",
            status: CheckStatus::Pass,
            details: format!(
                "client built (user agent `{}`, timeout {}s)",
                config.http.user_agent, config.http.timeout_secs
            ),
        },
        Err(error) => DoctorCheck {
            name: "http_client",
            status: CheckStatus::Fail,
            details: format!("failed to build HTTP client: {error}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use showcase_core::config::AppConfig;

    use super::{check_session_directory, CheckStatus};

    #[test]
    fn file_in_place_of_session_directory_fails() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let mut config = AppConfig::default();
        config.session.directory = file.path().to_path_buf();

        let check = check_session_directory(&config);

        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.details.contains("not a directory"));
    }

    #[test]
    fn missing_session_directory_is_created_later() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = AppConfig::default();
        config.session.directory = dir.path().join("sessions");

        assert_eq!(check_session_directory(&config).status, CheckStatus::Pass);
    }
}
