use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::cpq::message::MessageTemplate;
use crate::domain::snapshot::{Currency, RawExtra, RawQuoteInput, UnitType};

pub const CONFIG_FILE_NAME: &str = "quickquote.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub quote: QuoteDefaults,
    pub extras: Vec<ExtraConfig>,
    pub message: MessageTemplate,
    pub logging: LoggingConfig,
}

/// Starting values for every quote field, before an input file or flags
/// are applied.
#[derive(Clone, Debug)]
pub struct QuoteDefaults {
    pub service_name: String,
    pub currency: Currency,
    pub unit_type: UnitType,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub setup_fee: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub tax_enabled: bool,
    pub custom_fee: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraConfig {
    pub label: String,
    pub amount: Decimal,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub service_name: Option<String>,
    pub currency: Option<Currency>,
    pub unit_type: Option<UnitType>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quote: QuoteDefaults {
                service_name: "Service".to_string(),
                currency: Currency::Usd,
                unit_type: UnitType::Hours,
                quantity: Decimal::ONE,
                rate: Decimal::ZERO,
                setup_fee: Decimal::ZERO,
                discount_percent: Decimal::ZERO,
                tax_percent: Decimal::ZERO,
                tax_enabled: false,
                custom_fee: Decimal::ZERO,
            },
            extras: Vec::new(),
            message: MessageTemplate::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The configured defaults as raw form input, ready to be merged with
    /// an input file and flags.
    pub fn default_input(&self) -> RawQuoteInput {
        let number = |value: Decimal| Some(Value::String(value.to_string()));
        let quote = &self.quote;

        RawQuoteInput {
            service_name: Some(Value::String(quote.service_name.clone())),
            currency: Some(Value::String(quote.currency.code().to_string())),
            unit_type: Some(Value::String(quote.unit_type.as_str().to_string())),
            quantity: number(quote.quantity),
            rate: number(quote.rate),
            setup_fee: number(quote.setup_fee),
            discount_percent: number(quote.discount_percent),
            tax_percent: number(quote.tax_percent),
            tax_enabled: Some(Value::Bool(quote.tax_enabled)),
            custom_fee: number(quote.custom_fee),
            extras: Some(
                self.extras
                    .iter()
                    .map(|extra| RawExtra {
                        label: Some(Value::String(extra.label.clone())),
                        amount: number(extra.amount),
                        selected: Some(Value::Bool(extra.selected)),
                    })
                    .collect(),
            ),
            client_name: None,
            note_text: None,
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(quote) = patch.quote {
            if let Some(service_name) = quote.service_name {
                self.quote.service_name = service_name;
            }
            if let Some(currency) = quote.currency {
                self.quote.currency = currency;
            }
            if let Some(unit_type) = quote.unit_type {
                self.quote.unit_type = unit_type;
            }
            if let Some(quantity) = quote.quantity {
                self.quote.quantity = quantity;
            }
            if let Some(rate) = quote.rate {
                self.quote.rate = rate;
            }
            if let Some(setup_fee) = quote.setup_fee {
                self.quote.setup_fee = setup_fee;
            }
            if let Some(discount_percent) = quote.discount_percent {
                self.quote.discount_percent = discount_percent;
            }
            if let Some(tax_percent) = quote.tax_percent {
                self.quote.tax_percent = tax_percent;
            }
            if let Some(tax_enabled) = quote.tax_enabled {
                self.quote.tax_enabled = tax_enabled;
            }
            if let Some(custom_fee) = quote.custom_fee {
                self.quote.custom_fee = custom_fee;
            }
        }

        if let Some(extras) = patch.extras {
            self.extras = extras;
        }

        if let Some(message) = patch.message {
            if let Some(greeting) = message.greeting {
                self.message.greeting = greeting;
            }
            if let Some(generic_greeting) = message.generic_greeting {
                self.message.generic_greeting = generic_greeting;
            }
            if let Some(intro) = message.intro {
                self.message.intro = intro;
            }
            if let Some(summary_header) = message.summary_header {
                self.message.summary_header = summary_header;
            }
            if let Some(closing) = message.closing {
                self.message.closing = closing;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("QUICKQUOTE_SERVICE_NAME") {
            self.quote.service_name = value;
        }
        if let Some(value) = read_env("QUICKQUOTE_CURRENCY") {
            self.quote.currency = parse_currency("QUICKQUOTE_CURRENCY", &value)?;
        }
        if let Some(value) = read_env("QUICKQUOTE_UNIT_TYPE") {
            self.quote.unit_type = parse_unit_type("QUICKQUOTE_UNIT_TYPE", &value)?;
        }
        if let Some(value) = read_env("QUICKQUOTE_TAX_PERCENT") {
            self.quote.tax_percent = parse_decimal("QUICKQUOTE_TAX_PERCENT", &value)?;
        }
        if let Some(value) = read_env("QUICKQUOTE_TAX_ENABLED") {
            self.quote.tax_enabled = parse_bool("QUICKQUOTE_TAX_ENABLED", &value)?;
        }

        let log_level =
            read_env("QUICKQUOTE_LOGGING_LEVEL").or_else(|| read_env("QUICKQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("QUICKQUOTE_LOGGING_FORMAT").or_else(|| read_env("QUICKQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(service_name) = overrides.service_name {
            self.quote.service_name = service_name;
        }
        if let Some(currency) = overrides.currency {
            self.quote.currency = currency;
        }
        if let Some(unit_type) = overrides.unit_type {
            self.quote.unit_type = unit_type;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_quote(&self.quote)?;
        validate_extras(&self.extras)?;
        validate_message(&self.message)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The config file `load` reads: the explicit path when it exists, otherwise
/// the first of `quickquote.toml` and `config/quickquote.toml` found.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), Path::new("config").join(CONFIG_FILE_NAME)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_quote(quote: &QuoteDefaults) -> Result<(), ConfigError> {
    if quote.quantity < Decimal::ONE {
        return Err(ConfigError::Validation("quote.quantity must be at least 1".to_string()));
    }

    let non_negative = [
        ("quote.rate", quote.rate),
        ("quote.setup_fee", quote.setup_fee),
        ("quote.discount_percent", quote.discount_percent),
        ("quote.tax_percent", quote.tax_percent),
        ("quote.custom_fee", quote.custom_fee),
    ];
    if let Some((key, _)) = non_negative.iter().find(|(_, value)| *value < Decimal::ZERO) {
        return Err(ConfigError::Validation(format!("{key} must not be negative")));
    }

    if quote.discount_percent > Decimal::ONE_HUNDRED {
        return Err(ConfigError::Validation(
            "quote.discount_percent must be in range 0..=100".to_string(),
        ));
    }

    Ok(())
}

fn validate_extras(extras: &[ExtraConfig]) -> Result<(), ConfigError> {
    for (index, extra) in extras.iter().enumerate() {
        if extra.label.trim().is_empty() {
            return Err(ConfigError::Validation(format!("extras[{index}].label is required")));
        }
        if extra.amount < Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "extras[{index}].amount must not be negative (extra `{}`)",
                extra.label
            )));
        }
    }

    Ok(())
}

fn validate_message(message: &MessageTemplate) -> Result<(), ConfigError> {
    if message.generic_greeting.trim().is_empty() {
        return Err(ConfigError::Validation(
            "message.generic_greeting must not be empty".to_string(),
        ));
    }
    if !message.greeting.contains("{client}") {
        return Err(ConfigError::Validation(
            "message.greeting must contain the `{client}` placeholder".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

/// A set, non-blank environment value. Blank values count as unset.
pub fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| invalid_override(key, value))
}

fn parse_currency(key: &str, value: &str) -> Result<Currency, ConfigError> {
    Currency::parse_code(value).ok_or_else(|| invalid_override(key, value))
}

fn parse_unit_type(key: &str, value: &str) -> Result<UnitType, ConfigError> {
    UnitType::parse_label(value).ok_or_else(|| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    quote: Option<QuotePatch>,
    extras: Option<Vec<ExtraConfig>>,
    message: Option<MessagePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct QuotePatch {
    service_name: Option<String>,
    currency: Option<Currency>,
    unit_type: Option<UnitType>,
    quantity: Option<Decimal>,
    rate: Option<Decimal>,
    setup_fee: Option<Decimal>,
    discount_percent: Option<Decimal>,
    tax_percent: Option<Decimal>,
    tax_enabled: Option<bool>,
    custom_fee: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagePatch {
    greeting: Option<String>,
    generic_greeting: Option<String>,
    intro: Option<String>,
    summary_header: Option<String>,
    closing: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::domain::snapshot::{Currency, InputSnapshot, UnitType};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(dir: &TempDir, contents: &str) -> Result<std::path::PathBuf, String> {
        let path = dir.path().join("quickquote.toml");
        fs::write(&path, contents).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn defaults_load_without_a_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let config = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("missing.toml")),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.quote.currency == Currency::Usd, "default currency should be USD")?;
        ensure(config.quote.quantity == Decimal::ONE, "default quantity should be 1")?;
        ensure(config.extras.is_empty(), "no extras are configured by default")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn require_file_reports_missing_path() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let result = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should be reported",
        )
    }

    #[test]
    fn file_sections_populate_quote_extras_and_message() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[quote]
service_name = "Wedding photography"
currency = "EUR"
unit_type = "units"
rate = 1200
tax_percent = "19"
tax_enabled = true

[[extras]]
label = "Second shooter"
amount = 400

[[extras]]
label = "Album"
amount = 250.5
selected = true

[message]
closing = "Talk soon!"
"#,
        )?;

        let config =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.quote.service_name == "Wedding photography", "service name from file")?;
        ensure(config.quote.currency == Currency::Eur, "currency from file")?;
        ensure(config.quote.unit_type == UnitType::Units, "unit type from file")?;
        ensure(config.quote.rate == Decimal::new(1200, 0), "rate from file")?;
        ensure(config.quote.tax_percent == Decimal::new(19, 0), "string decimals are accepted")?;
        ensure(config.extras.len() == 2, "both extras should load")?;
        ensure(!config.extras[0].selected, "extras default to unselected")?;
        ensure(config.extras[1].amount == Decimal::new(2505, 1), "fractional extra amount")?;
        ensure(config.message.closing == "Talk soon!", "closing from file")?;
        ensure(config.message.generic_greeting == "Hi there,", "untouched message defaults")?;

        let snapshot = InputSnapshot::from_raw(&config.default_input());
        ensure(snapshot.currency == Currency::Eur, "default input carries currency")?;
        ensure(snapshot.extras.len() == 2, "default input carries the extras catalog")?;
        ensure(snapshot.extras[1].selected, "default input keeps extra selection")?;
        ensure(snapshot.tax_enabled, "default input keeps the tax toggle")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_QUICKQUOTE_SERVICE", "Garden design");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[quote]
service_name = "${TEST_QUICKQUOTE_SERVICE}"
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.quote.service_name == "Garden design",
                "service name should be interpolated from the environment",
            )
        })();

        clear_vars(&["TEST_QUICKQUOTE_SERVICE"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("QUICKQUOTE_LOG_LEVEL", "warn");
        env::set_var("QUICKQUOTE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["QUICKQUOTE_LOG_LEVEL", "QUICKQUOTE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("QUICKQUOTE_CURRENCY", "gbp");
        env::set_var("QUICKQUOTE_TAX_PERCENT", "20");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[quote]
service_name = "From file"
currency = "EUR"
tax_percent = 7

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    service_name: Some("From override".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.quote.service_name == "From override", "override should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.quote.currency == Currency::Gbp, "env currency should win over file")?;
            ensure(
                config.quote.tax_percent == Decimal::new(20, 0),
                "env tax percent should win over file",
            )
        })();

        clear_vars(&["QUICKQUOTE_CURRENCY", "QUICKQUOTE_TAX_PERCENT"]);
        result
    }

    #[test]
    fn invalid_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("QUICKQUOTE_CURRENCY", "JPY");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected an invalid override error".to_string()),
            Err(error) => {
                let names_variable = matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. } if key == "QUICKQUOTE_CURRENCY"
                );
                ensure(names_variable, "error should name the offending variable")
            }
        };

        clear_vars(&["QUICKQUOTE_CURRENCY"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[[extras]]
label = "Refund"
amount = -10
"#,
        )?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("extras[0].amount")
        );
        ensure(has_message, "validation failure should mention extras[0].amount")
    }

    #[test]
    fn greeting_without_placeholder_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[message]
greeting = "Hello,"
"#,
        )?;

        let result =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        let mentions_placeholder = matches!(
            result,
            Err(ConfigError::Validation(ref message)) if message.contains("{client}")
        );
        ensure(mentions_placeholder, "greeting validation should mention the placeholder")
    }
}
