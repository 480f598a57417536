use std::fs;
use std::path::{Path, PathBuf};

use quickquote_core::config::{read_env, resolve_config_path, AppConfig, LoadOptions};
use quickquote_core::cpq::currency::format_number;
use toml::Value;

use super::{load_config, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", error),
    };

    CommandResult::text(render(&config, options.config_path.as_deref()))
}

fn render(config: &AppConfig, explicit_path: Option<&Path>) -> String {
    let config_file_path = resolve_config_path(explicit_path);
    let file = ConfigFile {
        doc: load_config_file_doc(config_file_path.as_deref()),
        path: config_file_path,
    };

    let quote = &config.quote;
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let entries: [(&str, String, &[&str]); 10] = [
        ("quote.service_name", quote.service_name.clone(), &["QUICKQUOTE_SERVICE_NAME"]),
        ("quote.currency", quote.currency.code().to_string(), &["QUICKQUOTE_CURRENCY"]),
        ("quote.unit_type", quote.unit_type.as_str().to_string(), &["QUICKQUOTE_UNIT_TYPE"]),
        ("quote.quantity", format_number(quote.quantity), &[]),
        ("quote.rate", format_number(quote.rate), &[]),
        ("quote.setup_fee", format_number(quote.setup_fee), &[]),
        ("quote.discount_percent", format_number(quote.discount_percent), &[]),
        ("quote.tax_percent", format_number(quote.tax_percent), &["QUICKQUOTE_TAX_PERCENT"]),
        ("quote.tax_enabled", quote.tax_enabled.to_string(), &["QUICKQUOTE_TAX_ENABLED"]),
        ("quote.custom_fee", format_number(quote.custom_fee), &[]),
    ];
    for (key, value, env_keys) in entries {
        lines.push(render_line(key, &value, file.source(key, env_keys)));
    }

    let catalog = if config.extras.is_empty() {
        "<none>".to_string()
    } else {
        config
            .extras
            .iter()
            .map(|extra| {
                let marker = if extra.selected { "*" } else { "" };
                format!("{}{marker} ({})", extra.label, format_number(extra.amount))
            })
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(render_line("extras", &catalog, file.source("extras", &[])));

    let message = &config.message;
    for (key, value) in [
        ("message.greeting", &message.greeting),
        ("message.generic_greeting", &message.generic_greeting),
        ("message.intro", &message.intro),
        ("message.summary_header", &message.summary_header),
        ("message.closing", &message.closing),
    ] {
        lines.push(render_line(key, &format!("{value:?}"), file.source(key, &[])));
    }

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        file.source("logging.level", &["QUICKQUOTE_LOGGING_LEVEL", "QUICKQUOTE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        file.source("logging.format", &["QUICKQUOTE_LOGGING_FORMAT", "QUICKQUOTE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

struct ConfigFile {
    doc: Option<Value>,
    path: Option<PathBuf>,
}

impl ConfigFile {
    fn source(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| read_env(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
