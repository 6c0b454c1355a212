//! Environment-driven configuration.
//!
//! Every setting comes from a `SYMPTOM_TRIAGE__<SECTION>__<KEY>` variable,
//! optionally seeded from a `.env` file. All keys have defaults, so an empty
//! environment starts a server that answers emergencies and reports a
//! configuration error for everything else:
//!
//! ```text
//! SYMPTOM_TRIAGE__SERVER__PORT=8080
//! SYMPTOM_TRIAGE__AI__OPENAI_API_KEY=sk-...
//! SYMPTOM_TRIAGE__TRIAGE__STAGE_POLICY=turn_count
//! ```
//!
//! ```no_run
//! use symptom_triage::config::AppConfig;
//!
//! let config = AppConfig::load().expect("unreadable configuration");
//! config.validate().expect("invalid configuration");
//! ```

mod ai;
mod error;
mod server;
mod triage;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, LogFormat, ServerConfig};
pub use triage::{StagePolicyKind, TriageConfig};

use serde::Deserialize;

const ENV_PREFIX: &str = "SYMPTOM_TRIAGE";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Generation backend
    #[serde(default)]
    pub ai: AiConfig,

    /// Stage policy and context window
    #[serde(default)]
    pub triage: TriageConfig,
}

impl AppConfig {
    /// Reads `.env` (if any) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadError` when a value has the wrong type,
    /// e.g. a non-numeric port.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR);

        let config = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Checks each section, then the cross-section timeout budget.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.triage.validate()?;

        // A turn may run a primary and a retry call back to back
        if self.server.request_timeout_secs < 2 * self.ai.call_timeout_secs {
            return Err(ValidationError::TimeoutBudgetTooSmall);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Sets `vars`, loads, and removes them again before returning.
    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        for (key, value) in vars {
            env::set_var(format!("SYMPTOM_TRIAGE__{key}"), value);
        }
        let result = AppConfig::load();
        for (key, _) in vars {
            env::remove_var(format!("SYMPTOM_TRIAGE__{key}"));
        }
        result
    }

    #[test]
    fn empty_environment_is_runnable() {
        let config = load_with(&[]).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.triage.stage_policy, StagePolicyKind::Completeness);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn nested_keys_reach_their_sections() {
        let config = load_with(&[
            ("SERVER__PORT", "3000"),
            ("AI__OPENAI_API_KEY", "sk-test"),
            ("TRIAGE__STAGE_POLICY", "turn_count"),
            ("TRIAGE__HISTORY_WINDOW", "20"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert!(config.ai.has_openai());
        assert_eq!(config.triage.stage_policy, StagePolicyKind::TurnCount);
        assert_eq!(config.triage.history_window, 20);
    }

    #[test]
    fn production_environment_is_recognized() {
        let config = load_with(&[("SERVER__ENVIRONMENT", "production")]).unwrap();
        assert!(config.is_production());
        assert_eq!(config.server.log_format(), LogFormat::Json);
    }

    #[test]
    fn non_numeric_port_fails_to_load() {
        assert!(matches!(
            load_with(&[("SERVER__PORT", "eighty")]),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn request_timeout_must_fit_primary_and_retry() {
        let mut config = AppConfig::default();
        config.server.request_timeout_secs = 30;
        config.ai.call_timeout_secs = 20;
        assert_eq!(config.validate(), Err(ValidationError::TimeoutBudgetTooSmall));

        config.server.request_timeout_secs = 40;
        assert!(config.validate().is_ok());
    }
}
