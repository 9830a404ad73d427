//! Loading the JSON config file into a rule store.
//!
//! ```json
//! {
//!     "rules": {
//!         "homeless-try": "error",
//!         "line-length": ["warning", { "maxLength": 100 }]
//!     },
//!     "ignore": ["vendor/**"]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zlint_core::{get_rule_by_name, get_rule_suggestion, LintRule, RuleLevel, RuleStore};

pub const DEFAULT_CONFIG_NAME: &str = "zlint.json";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Rule name to severity, or `[severity, options]`.
    pub rules: BTreeMap<String, RuleConfig>,
    /// Glob patterns of paths to skip.
    pub ignore: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleConfig {
    Level(RuleLevel),
    LevelWithOptions(RuleLevel, serde_json::Value),
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    UnknownRule {
        name: String,
        suggestion: Option<&'static str>,
    },
    BadOptions {
        name: String,
        error: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(error) => write!(f, "cannot read the config file: {}", error),
            ConfigError::Parse(error) => write!(f, "invalid config file: {}", error),
            ConfigError::UnknownRule { name, suggestion } => {
                write!(f, "unknown rule `{}`", name)?;
                if let Some(suggestion) = suggestion {
                    write!(f, ", did you mean `{}`?", suggestion)?;
                }
                Ok(())
            }
            ConfigError::BadOptions { name, error } => {
                write!(f, "invalid options for rule `{}`: {}", name, error)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load from `path`, or from `./zlint.json` when it exists, or the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Config::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_NAME);
                if default.exists() {
                    Config::from_file(default)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Config::from_str(&text)
    }

    pub fn from_str(text: &str) -> Result<Config, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }

    /// Builtins at their defaults, with this config's overrides applied.
    pub fn into_store(self) -> Result<RuleStore, ConfigError> {
        let mut store = RuleStore::new().builtins();
        for (name, rule_config) in self.rules {
            let (level, options) = match rule_config {
                RuleConfig::Level(level) => (level, None),
                RuleConfig::LevelWithOptions(level, options) => (level, Some(options)),
            };
            let rule = configure_rule(&name, options)?;
            store.set(rule, level);
        }
        Ok(store)
    }
}

/// Instantiate a builtin by name, optionally deserializing its options
/// through the typetag registry.
fn configure_rule(
    name: &str,
    options: Option<serde_json::Value>,
) -> Result<Box<dyn LintRule>, ConfigError> {
    let default = get_rule_by_name(name).ok_or_else(|| ConfigError::UnknownRule {
        name: name.to_string(),
        suggestion: get_rule_suggestion(name),
    })?;
    let options = match options {
        Some(options) => options,
        None => return Ok(default),
    };
    let mut tagged = serde_json::Map::new();
    tagged.insert(name.to_string(), options);
    serde_json::from_value::<Box<dyn LintRule>>(serde_json::Value::Object(tagged)).map_err(
        |error| ConfigError::BadOptions {
            name: name.to_string(),
            error,
        },
    )
}

/// The JSON schema for the config file, including every registered
/// rule's options and default severity.
#[cfg(feature = "schema")]
pub fn json_schema() -> serde_json::Value {
    use zlint_core::{rules, Rule};

    let mut rule_schemas = serde_json::Map::new();
    for rule in rules::all() {
        rule_schemas.insert(
            rule.name().to_string(),
            serde_json::json!({
                "defaultLevel": format!("{:?}", rule.default_level()).to_lowercase(),
                "docs": rule.docs(),
            }),
        );
    }
    serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "zlint configuration",
        "type": "object",
        "properties": {
            "rules": {
                "type": "object",
                "properties": rule_schemas,
            },
            "ignore": {
                "type": "array",
                "items": { "type": "string" },
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_strings_configure_levels() {
        let config = Config::from_str(
            r#"{ "rules": { "homeless-try": "off", "line-length": "warning" } }"#,
        )
        .unwrap();
        let store = config.into_store().unwrap();
        assert!(!store.contains("homeless-try"));
        let line_length = store.get("line-length").unwrap();
        assert_eq!(line_length.level, RuleLevel::Warning);
    }

    #[test]
    fn options_reach_the_rule_instance() {
        let config = Config::from_str(
            r#"{ "rules": { "line-length": ["error", { "maxLength": 100 }] } }"#,
        )
        .unwrap();
        let store = config.into_store().unwrap();
        let entry = store.get("line-length").unwrap();
        assert_eq!(entry.level, RuleLevel::Error);
        let as_json = serde_json::to_value(&entry.rule).unwrap();
        assert_eq!(as_json["line-length"]["maxLength"], 100);
    }

    #[test]
    fn unknown_rules_get_a_suggestion() {
        let config =
            Config::from_str(r#"{ "rules": { "homeles-try": "error" } }"#).unwrap();
        match config.into_store() {
            Err(ConfigError::UnknownRule { name, suggestion }) => {
                assert_eq!(name, "homeles-try");
                assert_eq!(suggestion, Some("homeless-try"));
            }
            other => panic!("expected an unknown-rule error, got {:?}", other),
        }
    }

    #[test]
    fn empty_config_is_the_builtin_set() {
        let store = Config::default().into_store().unwrap();
        assert!(store.contains("homeless-try"));
        assert!(store.contains("unused-decls"));
        // Off-by-default rules are not registered.
        assert!(!store.contains("line-length"));
    }
}
