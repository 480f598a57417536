use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use quickquote_core::config::AppConfig;
use quickquote_core::domain::snapshot::{coerce_text, InputSnapshot, RawExtra, RawQuoteInput};
use quickquote_core::errors::ApplicationError;
use serde_json::Value;

/// Quote fields shared by `quote`, `message` and `export`. Numbers are kept
/// as raw text and coerced by the core, so `--rate 12abc` prices at 12.
#[derive(Clone, Debug, Default, Args)]
pub struct QuoteArgs {
    #[arg(long, value_name = "FILE", help = "JSON file with quote fields")]
    pub input: Option<PathBuf>,
    #[arg(long = "service", value_name = "NAME")]
    pub service_name: Option<String>,
    #[arg(long, value_name = "CODE", help = "USD, GBP or EUR")]
    pub currency: Option<String>,
    #[arg(long = "unit", value_name = "UNIT", help = "hours or units")]
    pub unit_type: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub quantity: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub setup_fee: Option<String>,
    #[arg(long = "discount", value_name = "PERCENT", allow_hyphen_values = true)]
    pub discount_percent: Option<String>,
    #[arg(long = "tax", value_name = "PERCENT", allow_hyphen_values = true)]
    pub tax_percent: Option<String>,
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub tax_enabled: Option<bool>,
    #[arg(long, allow_hyphen_values = true)]
    pub custom_fee: Option<String>,
    #[arg(
        long = "extra",
        value_name = "LABEL=AMOUNT",
        value_parser = parse_adhoc_extra,
        help = "Add a selected extra (repeatable)"
    )]
    pub extras: Vec<AdhocExtra>,
    #[arg(long = "select", value_name = "LABEL", help = "Select a configured extra (repeatable)")]
    pub select: Vec<String>,
    #[arg(long = "client", value_name = "NAME")]
    pub client_name: Option<String>,
    #[arg(long = "note", value_name = "TEXT")]
    pub note_text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdhocExtra {
    pub label: String,
    pub amount: String,
}

fn parse_adhoc_extra(raw: &str) -> Result<AdhocExtra, String> {
    let (label, amount) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected LABEL=AMOUNT, got `{raw}`"))?;

    Ok(AdhocExtra { label: label.trim().to_string(), amount: amount.trim().to_string() })
}

impl QuoteArgs {
    fn flag_input(&self) -> RawQuoteInput {
        let text = |value: &Option<String>| value.clone().map(Value::String);

        RawQuoteInput {
            service_name: text(&self.service_name),
            currency: text(&self.currency),
            unit_type: text(&self.unit_type),
            quantity: text(&self.quantity),
            rate: text(&self.rate),
            setup_fee: text(&self.setup_fee),
            discount_percent: text(&self.discount_percent),
            tax_percent: text(&self.tax_percent),
            tax_enabled: self.tax_enabled.map(Value::Bool),
            custom_fee: text(&self.custom_fee),
            extras: None,
            client_name: text(&self.client_name),
            note_text: text(&self.note_text),
        }
    }
}

/// Layers configured defaults, the input file and flags into one snapshot.
pub fn resolve_snapshot(
    config: &AppConfig,
    args: &QuoteArgs,
) -> Result<InputSnapshot, ApplicationError> {
    let mut raw = config.default_input();

    if let Some(path) = args.input.as_deref() {
        raw = raw.merge(read_input_file(path)?);
    }
    raw = raw.merge(args.flag_input());

    let mut extras = raw.extras.take().unwrap_or_default();
    select_extras(&mut extras, &args.select);
    extras.extend(args.extras.iter().map(|extra| RawExtra {
        label: Some(Value::String(extra.label.clone())),
        amount: Some(Value::String(extra.amount.clone())),
        selected: Some(Value::Bool(true)),
    }));
    raw.extras = Some(extras);

    let snapshot = InputSnapshot::from_raw(&raw);
    tracing::debug!(
        event_name = "cli.input.resolved",
        currency = %snapshot.currency,
        extras = snapshot.extras.len(),
        from_file = args.input.is_some(),
        "quote input resolved"
    );

    Ok(snapshot)
}

pub fn read_input_file(path: &Path) -> Result<RawQuoteInput, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::Input(format!("could not read `{}`: {error}", path.display()))
    })?;

    serde_json::from_str::<RawQuoteInput>(&raw).map_err(|error| {
        ApplicationError::Input(format!("could not parse `{}`: {error}", path.display()))
    })
}

fn select_extras(extras: &mut [RawExtra], labels: &[String]) {
    for label in labels {
        let wanted = label.trim();
        let mut matched = false;

        for extra in extras.iter_mut() {
            let is_match = extra
                .label
                .as_ref()
                .and_then(coerce_text)
                .is_some_and(|candidate| candidate.trim().eq_ignore_ascii_case(wanted));
            if is_match {
                extra.selected = Some(Value::Bool(true));
                matched = true;
            }
        }

        if !matched {
            tracing::warn!(
                event_name = "cli.input.unknown_extra",
                label = wanted,
                "no configured extra matches the selected label"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use quickquote_core::config::{AppConfig, ExtraConfig};
    use quickquote_core::domain::snapshot::Currency;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{parse_adhoc_extra, resolve_snapshot, AdhocExtra, QuoteArgs};

    fn config_with_catalog() -> AppConfig {
        let mut config = AppConfig::default();
        config.quote.rate = Decimal::new(50, 0);
        config.extras = vec![
            ExtraConfig {
                label: "Rush delivery".to_string(),
                amount: Decimal::new(75, 0),
                selected: false,
            },
            ExtraConfig {
                label: "Source files".to_string(),
                amount: Decimal::new(30, 0),
                selected: false,
            },
        ];
        config
    }

    #[test]
    fn adhoc_extra_splits_on_last_equals() {
        assert_eq!(
            parse_adhoc_extra("A=B = 12"),
            Ok(AdhocExtra { label: "A=B".to_string(), amount: "12".to_string() })
        );
        assert!(parse_adhoc_extra("no amount").is_err());
    }

    #[test]
    fn flags_override_configured_defaults() {
        let args = QuoteArgs {
            rate: Some("80".to_string()),
            quantity: Some("-4".to_string()),
            currency: Some("gbp".to_string()),
            ..QuoteArgs::default()
        };

        let snapshot = resolve_snapshot(&config_with_catalog(), &args).expect("resolve");

        assert_eq!(snapshot.rate, Decimal::new(80, 0));
        assert_eq!(snapshot.quantity, Decimal::ONE);
        assert_eq!(snapshot.currency, Currency::Gbp);
        assert!(snapshot.extras.iter().all(|extra| !extra.selected));
    }

    #[test]
    fn select_and_adhoc_extras_are_applied() {
        let args = QuoteArgs {
            select: vec!["rush DELIVERY".to_string(), "missing".to_string()],
            extras: vec![AdhocExtra { label: "Printing".to_string(), amount: "12.5".to_string() }],
            ..QuoteArgs::default()
        };

        let snapshot = resolve_snapshot(&config_with_catalog(), &args).expect("resolve");

        assert_eq!(snapshot.extras.len(), 3);
        assert!(snapshot.extras[0].selected);
        assert!(!snapshot.extras[1].selected);
        assert_eq!(snapshot.extras[2].label, "Printing");
        assert_eq!(snapshot.extras[2].amount, Decimal::new(125, 1));
        assert!(snapshot.extras[2].selected);
    }

    #[test]
    fn input_file_sits_between_config_and_flags() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("quote.json");
        fs::write(
            &path,
            r#"{
                "service_name": "Editing",
                "rate": "65",
                "setup_fee": 20,
                "extras": [{ "label": "Index", "amount": 40 }]
            }"#,
        )
        .expect("write input");

        let args = QuoteArgs {
            input: Some(path),
            setup_fee: Some("0".to_string()),
            ..QuoteArgs::default()
        };
        let snapshot = resolve_snapshot(&config_with_catalog(), &args).expect("resolve");

        assert_eq!(snapshot.service_name, "Editing");
        assert_eq!(snapshot.rate, Decimal::new(65, 0));
        assert_eq!(snapshot.setup_fee, Decimal::ZERO);
        assert_eq!(snapshot.extras.len(), 1, "file extras replace the configured catalog");
        assert!(snapshot.extras[0].selected);
    }

    #[test]
    fn malformed_input_file_is_an_input_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write input");

        let args = QuoteArgs { input: Some(path), ..QuoteArgs::default() };
        let error = resolve_snapshot(&AppConfig::default(), &args).expect_err("should fail");

        assert!(matches!(error, quickquote_core::errors::ApplicationError::Input(_)));
    }
}
