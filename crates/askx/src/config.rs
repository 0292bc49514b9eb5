use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use chrono::TimeDelta;
use serde::Deserialize;
use thiserror::Error;

use crate::texts::Texts;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Telegram transport. The engine library is transport-agnostic, but
    /// the bundled binary refuses to start without this section.
    #[serde(default)]
    pub telegram: Option<TelegramGatewayConfig>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub texts: Texts,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let expanded = expand_env_vars(&contents)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Tunables of the question/answer economy.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Tokens deducted when an identity posts a question.
    #[serde(default = "default_question_cost")]
    pub question_cost: u32,
    /// Tokens credited for delivering an answer.
    #[serde(default = "default_answer_reward")]
    pub answer_reward: u32,
    /// Balance an identity starts with on first contact.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: u32,
    /// How long a question may sit in the pool before an answer to it is
    /// judged late.
    #[serde(default = "default_question_lifetime_minutes")]
    pub question_lifetime_minutes: i64,
    /// Upper bound on question length, in characters.
    #[serde(default = "default_question_max_chars")]
    pub question_max_chars: usize,
}

impl EngineConfig {
    pub fn question_lifetime(&self) -> TimeDelta {
        TimeDelta::minutes(self.question_lifetime_minutes)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            question_cost: default_question_cost(),
            answer_reward: default_answer_reward(),
            starting_balance: default_starting_balance(),
            question_lifetime_minutes: default_question_lifetime_minutes(),
            question_max_chars: default_question_max_chars(),
        }
    }
}

// ============================================================================
// TelegramGatewayConfig
// ============================================================================

/// Configuration for the Telegram gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramGatewayConfig {
    /// Whether the gateway is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Telegram bot token from @BotFather.
    pub bot_token: String,
}

// ============================================================================
// Private Helpers (Serde Defaults)
// ============================================================================

fn default_question_cost() -> u32 {
    10
}

fn default_answer_reward() -> u32 {
    1
}

fn default_starting_balance() -> u32 {
    1
}

fn default_question_lifetime_minutes() -> i64 {
    10
}

fn default_question_max_chars() -> usize {
    500
}

/// Serde default for bool fields that should be `true` (serde's default is `false`).
fn default_true() -> bool {
    true
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Shell-compatible syntax:
/// - `${VAR}` - required variable, errors if not set
/// - `${VAR:-default}` - optional variable with default value
/// - `$$` - escaped `$` (only needed before `{` to prevent expansion)
///
/// References do not nest; an unclosed `${` is an error. A `$` not followed
/// by `{` is kept as-is, so `price: $10` needs no escaping.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                out.push_str(&resolve_var_reference(&mut chars)?);
            }
            _ => out.push('$'),
        }
    }

    Ok(out)
}

/// Resolve one `${...}` reference, with the cursor just past the `{`.
fn resolve_var_reference(
    chars: &mut std::iter::Peekable<std::str::Chars>,
) -> Result<String, ConfigError> {
    let mut raw = String::new();
    loop {
        match chars.next() {
            Some('}') => break,
            Some(c) => raw.push(c),
            None => return Err(ConfigError::UnclosedVarReference),
        }
    }

    // Everything after the first ':-' is the fallback; a lone ':' stays part
    // of the variable name.
    let (name, default) = match raw.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (raw.as_str(), None),
    };

    match std::env::var(name) {
        Ok(value) => Ok(value),
        Err(_) => match default {
            Some(default) => Ok(default.to_string()),
            None => Err(ConfigError::MissingEnvVar(name.to_string())),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    // ========================================================================
    // Config Tests
    // ========================================================================

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.question_cost, 10);
        assert_eq!(config.engine.answer_reward, 1);
        assert_eq!(config.engine.starting_balance, 1);
        assert_eq!(config.engine.question_lifetime_minutes, 10);
        assert_eq!(config.engine.question_max_chars, 500);
        assert!(config.telegram.is_none());
        assert!(config.texts.hello.contains("{balance}"));
    }

    #[test]
    fn test_question_lifetime_conversion() {
        let engine = EngineConfig {
            question_lifetime_minutes: 3,
            ..EngineConfig::default()
        };
        assert_eq!(engine.question_lifetime(), TimeDelta::minutes(3));
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let missing_path = tmp_dir.path().join("missing-config.yaml");
        let config = Config::load(missing_path.to_str().unwrap()).await.unwrap();
        assert_eq!(config.engine.question_cost, 10);
        assert!(config.telegram.is_none());
    }

    #[tokio::test]
    async fn test_load_valid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
telegram:
  enabled: false
  bot_token: "test_token"
engine:
  question_cost: 25
  answer_reward: 2
  question_lifetime_minutes: 30
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).await.unwrap();
        let telegram = config.telegram.expect("telegram config should exist");
        assert!(!telegram.enabled);
        assert_eq!(telegram.bot_token, "test_token");
        assert_eq!(config.engine.question_cost, 25);
        assert_eq!(config.engine.answer_reward, 2);
        assert_eq!(config.engine.question_lifetime_minutes, 30);
    }

    #[tokio::test]
    async fn test_load_partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
engine:
  question_cost: 5
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(config.engine.question_cost, 5);
        assert_eq!(config.engine.answer_reward, 1); // default
        assert_eq!(config.engine.starting_balance, 1); // default
        assert_eq!(config.engine.question_max_chars, 500); // default
        assert!(config.telegram.is_none()); // default
    }

    #[tokio::test]
    async fn test_load_texts_overrides_single_key() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
texts:
  answer_sent: "delivered!"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(config.texts.answer_sent, "delivered!");
        // Untouched keys keep their defaults.
        assert_eq!(config.texts.fault, Texts::default().fault);
    }

    #[tokio::test]
    async fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(file.path().to_str().unwrap()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_telegram_minimal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
telegram:
  bot_token: "test_token"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).await.unwrap();
        let telegram = config.telegram.expect("telegram config should exist");
        assert!(telegram.enabled);
        assert_eq!(telegram.bot_token, "test_token");
    }

    #[test]
    fn test_config_error_display() {
        let io_error = ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "test",
        ));
        assert!(io_error.to_string().contains("failed to read config file"));
    }

    // ========================================================================
    // Environment Variable Expansion Tests
    // ========================================================================

    #[test]
    fn test_expand_env_vars_default_when_unset() {
        let result = expand_env_vars("token: ${ASKX_TEST_SURELY_UNSET:-fallback}").unwrap();
        assert_eq!(result, "token: fallback");
    }

    #[test]
    fn test_expand_env_vars_empty_default() {
        let result = expand_env_vars("token: '${ASKX_TEST_SURELY_UNSET:-}'").unwrap();
        assert_eq!(result, "token: ''");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        let result = expand_env_vars("token: ${ASKX_TEST_SURELY_UNSET}");
        match result {
            Err(ConfigError::MissingEnvVar(name)) => {
                assert_eq!(name, "ASKX_TEST_SURELY_UNSET");
            }
            _ => panic!("expected MissingEnvVar error"),
        }
    }

    #[test]
    fn test_expand_env_vars_escape_and_plain_dollar() {
        let result = expand_env_vars("cost: $10, literal: $${NOT_A_VAR}").unwrap();
        assert_eq!(result, "cost: $10, literal: ${NOT_A_VAR}");
    }

    #[test]
    fn test_expand_env_vars_unclosed_brace() {
        let result = expand_env_vars("value: ${UNCLOSED_VAR");
        match result {
            Err(ConfigError::UnclosedVarReference) => {}
            _ => panic!("expected UnclosedVarReference error"),
        }
    }

    #[test]
    fn test_expand_env_vars_unclosed_brace_with_default() {
        let result = expand_env_vars("value: ${VAR:-default");
        match result {
            Err(ConfigError::UnclosedVarReference) => {}
            _ => panic!("expected UnclosedVarReference error"),
        }
    }
}
