//! Typed settings resolved from the `ai.*` namespace.

use toml::{Table, Value};

use crate::error::ConfigError;

use super::defaults::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PROVIDER, DEFAULT_TEMPERATURE, ENV_MODEL,
    ENV_PROVIDER, MAX_TEMPERATURE,
};

/// Provider and generation settings used to build an invoker.
#[derive(Debug, Clone, PartialEq)]
pub struct AiSettings {
    /// Invoker implementation name (`ai.provider`).
    pub provider: String,
    /// Default model for chat sessions (`ai.model`).
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Keys under `ai.*` that resolve into [`AiSettings`]. Every other key is
/// free-form.
pub const SETTING_KEYS: &[&str] = &["provider", "model", "temperature", "max_tokens"];

impl AiSettings {
    /// Resolve settings from the namespace table, then apply env overrides.
    pub(super) fn resolve<FEnv>(namespace: &Table, env_lookup: FEnv) -> Result<Self, ConfigError>
    where
        FEnv: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        for key in SETTING_KEYS {
            if let Some(value) = namespace.get(*key) {
                settings.apply(key, value)?;
            }
        }

        if let Some(provider) = normalized_env(&env_lookup, ENV_PROVIDER) {
            settings.provider = provider;
        }
        if let Some(model) = normalized_env(&env_lookup, ENV_MODEL) {
            settings.model = model;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check one setting on its own, ignoring the rest of the namespace and
    /// the environment.
    pub(super) fn check(key: &str, value: &Value) -> Result<(), ConfigError> {
        let mut settings = Self::default();
        settings.apply(key, value)?;
        settings.validate()
    }

    fn apply(&mut self, key: &str, value: &Value) -> Result<(), ConfigError> {
        match (key, value) {
            ("provider", Value::String(s)) => self.provider = s.trim().to_string(),
            ("model", Value::String(s)) => self.model = s.trim().to_string(),
            ("provider" | "model", other) => return Err(wrong_type(key, "a string", other)),
            ("temperature", Value::Float(f)) => self.temperature = *f,
            ("temperature", Value::Integer(i)) => self.temperature = *i as f64,
            ("temperature", other) => return Err(wrong_type(key, "a number", other)),
            ("max_tokens", Value::Integer(i)) => {
                self.max_tokens = u32::try_from(*i).map_err(|_| {
                    ConfigError::Invalid(format!("ai.max_tokens out of range: {i}"))
                })?;
            }
            ("max_tokens", other) => return Err(wrong_type(key, "an integer", other)),
            _ => {}
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("ai.provider cannot be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("ai.model cannot be empty".into()));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "ai.temperature must be between 0 and {MAX_TEMPERATURE}, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "ai.max_tokens must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn wrong_type(key: &str, expected: &str, got: &Value) -> ConfigError {
    ConfigError::Invalid(format!(
        "ai.{key} must be {expected}, got {}",
        got.type_str()
    ))
}

fn normalized_env<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> Table {
        text.parse::<Table>().expect("valid toml")
    }

    #[test]
    fn empty_namespace_yields_defaults() {
        let settings = AiSettings::resolve(&Table::new(), |_| None).unwrap();
        assert_eq!(settings, AiSettings::default());
        assert_eq!(settings.model, "claude-3");
        assert_eq!(settings.provider, "mock");
    }

    #[test]
    fn namespace_values_override_defaults() {
        let ns = table("provider = \"mock\"\nmodel = \"gpt-4\"\ntemperature = 1\nmax_tokens = 512\n");
        let settings = AiSettings::resolve(&ns, |_| None).unwrap();
        assert_eq!(settings.model, "gpt-4");
        assert_eq!(settings.temperature, 1.0);
        assert_eq!(settings.max_tokens, 512);
    }

    #[test]
    fn env_overrides_namespace() {
        let ns = table("model = \"gpt-4\"\n");
        let settings = AiSettings::resolve(&ns, |name| match name {
            "AIDE_MODEL" => Some("local-llm".to_string()),
            "AIDE_PROVIDER" => Some("  ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(settings.model, "local-llm");
        assert_eq!(settings.provider, "mock");
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = AiSettings::resolve(&table("temperature = \"hot\"\n"), |_| None).unwrap_err();
        assert!(err.to_string().contains("ai.temperature must be a number"));
        let err = AiSettings::resolve(&table("model = 3\n"), |_| None).unwrap_err();
        assert!(err.to_string().contains("ai.model must be a string"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(AiSettings::resolve(&table("temperature = 3.5\n"), |_| None).is_err());
        assert!(AiSettings::resolve(&table("max_tokens = 0\n"), |_| None).is_err());
        assert!(AiSettings::resolve(&table("max_tokens = -1\n"), |_| None).is_err());
    }

    #[test]
    fn check_looks_at_one_setting_only() {
        assert!(AiSettings::check("temperature", &Value::Float(0.5)).is_ok());
        assert!(AiSettings::check("temperature", &Value::Float(9.5)).is_err());
        assert!(AiSettings::check("model", &Value::String(" ".into())).is_err());
        let err = AiSettings::check("max_tokens", &Value::String("many".into())).unwrap_err();
        assert!(err.to_string().contains("ai.max_tokens must be an integer"));
    }
}
