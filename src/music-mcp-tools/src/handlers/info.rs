//! `info`: server diagnostics.

use std::time::Duration;

use music_mcp_script::{ScriptRef, applescript_string_literal};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use super::HandlerContext;
use super::output;
use crate::envelope::ResponseEnvelope;
use crate::input::{InfoCommand, InfoInput};
use crate::schema::{FieldSpec, SchemaNode};

pub const DESCRIPTION: &str = "Get diagnostic information about the Music MCP server status";

/// Upper bound for the application version check.
pub const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub fn schema() -> SchemaNode {
    SchemaNode::new().field(FieldSpec::enumeration(
        "command",
        "Command to execute",
        InfoCommand::VALUES,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerStatus {
    Ok,
    Disabled,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoReport {
    pub version: &'static str,
    pub music_app_available: bool,
    pub apple_script_available: bool,
    pub script_dir: String,
    pub logger_path: String,
    pub logger_status: LoggerStatus,
    pub configuration_issues: Vec<String>,
}

/// Inline source asking `app` for its version.
pub fn version_check(app: &str) -> ScriptRef {
    ScriptRef::inline(format!(
        "tell application {} to get version",
        applescript_string_literal(app)
    ))
}

pub async fn handle(ctx: &HandlerContext, _input: InfoInput) -> ResponseEnvelope {
    info!("collecting diagnostics");
    let config = ctx.config();
    let mut issues = config.validate();

    let version = ctx
        .runner()
        .run(&version_check(&config.app_name), &[], VERSION_CHECK_TIMEOUT)
        .await;
    let music_app_available = output::check(version).is_ok();
    if !music_app_available {
        issues.push(format!(
            "{} app not accessible or not installed",
            config.app_name
        ));
    }

    let apple_script_available = ctx.runner().interpreter_available();
    if !apple_script_available {
        issues.push(format!(
            "AppleScript ({}) not available",
            config.interpreter
        ));
    }

    if !config.script_dir.is_dir() {
        issues.push(format!(
            "Script directory not found: {}",
            config.script_dir.display()
        ));
    }

    let logger_status = if !config.file_logging {
        LoggerStatus::Disabled
    } else if config.log_file.exists() {
        LoggerStatus::Ok
    } else {
        issues.push(format!(
            "Log file not accessible: {}",
            config.log_file.display()
        ));
        LoggerStatus::Error
    };

    let report = InfoReport {
        version: env!("CARGO_PKG_VERSION"),
        music_app_available,
        apple_script_available,
        script_dir: config.script_dir.display().to_string(),
        logger_path: config.log_file.display().to_string(),
        logger_status,
        configuration_issues: issues,
    };
    debug!(issues = report.configuration_issues.len(), "diagnostics collected");

    let data = serde_json::to_value(&report).unwrap_or_else(|e| json!({ "error": e.to_string() }));
    ResponseEnvelope::ok("Diagnostic information collected").with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_support::{StubRunner, context, context_with};
    use music_mcp_script::ExecutionResult;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn version_check_quotes_the_application_name() {
        let ScriptRef::Inline(source) = version_check("Music\" to quit") else {
            panic!("version check must be inline");
        };
        assert_eq!(source, r#"tell application "Music\" to quit" to get version"#);
    }

    #[tokio::test]
    async fn reports_healthy_setup() {
        let dir = std::env::temp_dir();
        let runner = Arc::new(StubRunner::new().respond_to("<inline>", ExecutionResult::success("1.4.5")));
        let config = Config {
            script_dir: dir.clone(),
            ..Config::default()
        };

        let envelope = handle(&context_with(&runner, config), InfoInput::default()).await;

        assert!(envelope.success);
        let data = envelope.data.unwrap();
        assert_eq!(data["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(data["musicAppAvailable"], true);
        assert_eq!(data["appleScriptAvailable"], true);
        assert_eq!(data["loggerStatus"], "disabled");
        assert_eq!(data["configurationIssues"], json!([]));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].timeout, VERSION_CHECK_TIMEOUT);
    }

    #[tokio::test]
    async fn collects_issues_but_still_succeeds() {
        let runner = Arc::new(
            StubRunner::new()
                .respond_to("<inline>", ExecutionResult::non_zero(Some(1), "not running"))
                .without_interpreter(),
        );
        let config = Config {
            script_dir: "/nonexistent/music-mcp/scripts".into(),
            file_logging: true,
            log_file: "/nonexistent/music-mcp.log".into(),
            timeout_seconds: 0,
            ..Config::default()
        };

        let envelope = handle(&context_with(&runner, config), InfoInput::default()).await;

        assert!(envelope.success);
        let data = envelope.data.unwrap();
        assert_eq!(data["musicAppAvailable"], false);
        assert_eq!(data["appleScriptAvailable"], false);
        assert_eq!(data["loggerStatus"], "error");
        assert_eq!(
            data["configurationIssues"],
            json!([
                "MUSIC_MCP_TIMEOUT_SECONDS must be positive",
                "Music app not accessible or not installed",
                "AppleScript (osascript) not available",
                "Script directory not found: /nonexistent/music-mcp/scripts",
                "Log file not accessible: /nonexistent/music-mcp.log",
            ])
        );
    }

    #[tokio::test]
    async fn marker_output_means_app_unavailable() {
        let runner = Arc::new(StubRunner::new().respond_to(
            "<inline>",
            ExecutionResult::success("Error: application isn't running"),
        ));
        let envelope = handle(&context(&runner), InfoInput::default()).await;
        assert_eq!(envelope.data.unwrap()["musicAppAvailable"], false);
    }
}
