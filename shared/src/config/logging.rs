//! Log output settings

use serde::{Deserialize, Serialize};

use super::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `otp_core=debug,info`; `RUST_LOG` wins
    pub level: String,
    pub format: LogFormat,
    /// Attach file and line to every event
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Verbose human-readable output locally, JSON everywhere else
    pub fn for_environment(env: Environment) -> Self {
        if env.is_development() {
            Self {
                level: "debug".into(),
                format: LogFormat::Pretty,
                source_location: true,
            }
        } else {
            Self {
                level: "info".into(),
                format: LogFormat::Json,
                source_location: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployed_environments_log_json() {
        assert_eq!(LoggingConfig::for_environment(Environment::Production).format, LogFormat::Json);
        assert_eq!(LoggingConfig::for_environment(Environment::Staging).format, LogFormat::Json);
        assert_eq!(LoggingConfig::for_environment(Environment::Development).format, LogFormat::Pretty);
    }
}
