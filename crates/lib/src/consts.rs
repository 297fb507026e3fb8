/// Environment variable holding the raw option string for a recipe run.
pub const OPTIONS_ENV: &str = "FAKTORY_OPTIONS";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "FAKTORY_LOG";

/// Filter used when `FAKTORY_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";
