//! Configuration management.
//!
//! Settings come from an optional TOML file overlaid with `QUANT__`-prefixed
//! environment variables, e.g. `QUANT__BACKTEST__COMMISSION_RATE=0.002`.

mod settings;

pub use settings::{AppConfig, AppSettings, BacktestSettings, LoggingConfig};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "QUANT";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from an optional file and the environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, SettingsError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}

impl AppConfig {
    /// Check every section that has constraints.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.backtest
            .to_backtest_config()
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;

        match self.logging.format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(SettingsError::Invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got {other:?}"
            ))),
        }
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quant_risk::SizingMethod;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.backtest.initial_capital, dec!(100000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
[app]
name = "lab"

[backtest]
initial_capital = 25000
commission_rate = 0.002

[backtest.sizing]
method = "fixed_quantity"
quantity = 10
"#,
        );

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.app.name, "lab");
        assert_eq!(config.app.environment, "development");
        assert_eq!(config.backtest.initial_capital, dec!(25000));
        assert_eq!(config.backtest.commission_rate, dec!(0.002));
        assert_eq!(config.backtest.slippage_rate, dec!(0.0005));
        assert_eq!(
            config.backtest.sizing,
            SizingMethod::FixedQuantity { quantity: 10 }
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/quant.toml")));
        assert!(matches!(result, Err(SettingsError::Load(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.backtest.slippage_rate = dec!(1.5);
        assert!(matches!(config.validate(), Err(SettingsError::Invalid(_))));

        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_backtest_config() {
        let settings = BacktestSettings::default();
        let engine_config = settings.to_backtest_config();

        assert_eq!(engine_config.commission_rate, dec!(0.001));
        assert_eq!(engine_config.sizing, SizingMethod::default());
    }

    #[test]
    fn test_toml_render_round_trips() {
        let config = AppConfig::default();
        let rendered = config.to_toml().unwrap();
        let file = write_config(&rendered);

        assert_eq!(load_config(Some(file.path())).unwrap(), config);
    }
}
