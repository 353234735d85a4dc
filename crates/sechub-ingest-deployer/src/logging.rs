//! Tracing setup for the Lambda environment

use tracing_subscriber::EnvFilter;

/// Targets too chatty at info level
const QUIET_TARGETS: &[&str] = &["aws_smithy_runtime", "aws_smithy_http", "aws_config", "hyper", "rustls"];

/// Build the filter directive for a `LOGLEVEL` value.
///
/// Accepts the usual level names case-insensitively, plus `warning` and
/// `critical`. Anything else falls back to `info`.
pub fn filter_directive(level: Option<&str>) -> String {
    let level = match level.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("warn" | "warning") => "warn",
        Some("error" | "critical") => "error",
        _ => "info",
    };

    let mut directive = level.to_string();
    for target in QUIET_TARGETS {
        directive.push_str(&format!(",{target}=warn"));
    }
    directive
}

/// Install the global subscriber. CloudWatch adds timestamps and does not
/// render ANSI colours.
pub fn init() {
    let level = std::env::var("LOGLEVEL").ok();
    let filter = EnvFilter::try_new(filter_directive(level.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();
}
