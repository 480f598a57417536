use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_SERVICE_NAME: &str = "Service";
pub const DEFAULT_EXTRA_LABEL: &str = "Extra";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Gbp,
    Eur,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Eur => "EUR",
        }
    }

    pub fn parse_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Some(Self::Usd),
            "GBP" => Some(Self::Gbp),
            "EUR" => Some(Self::Eur),
            _ => None,
        }
    }

    /// Unknown codes fall back to USD.
    pub fn from_code(code: &str) -> Self {
        Self::parse_code(code).unwrap_or_default()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    #[default]
    Hours,
    Units,
}

impl UnitType {
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "hours" | "hour" => Some(Self::Hours),
            "units" | "unit" => Some(Self::Units),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Self {
        Self::parse_label(label).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::Units => "units",
        }
    }

    /// Singular when exactly one unit is quoted.
    pub fn label_for(self, quantity: Decimal) -> &'static str {
        match (self, quantity == Decimal::ONE) {
            (Self::Hours, true) => "hour",
            (Self::Hours, false) => "hours",
            (Self::Units, true) => "unit",
            (Self::Units, false) => "units",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extra {
    pub label: String,
    pub amount: Decimal,
    pub selected: bool,
}

impl Extra {
    pub fn new(label: impl Into<String>, amount: Decimal, selected: bool) -> Self {
        Self { label: label.into(), amount, selected }
    }

    pub fn counts_toward_total(&self) -> bool {
        self.selected && self.amount > Decimal::ZERO
    }
}

/// One immutable set of quote inputs. A fresh snapshot is built for every
/// recomputation; nothing in the pricing path mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
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
    pub extras: Vec<Extra>,
    pub client_name: String,
    pub note_text: String,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            currency: Currency::Usd,
            unit_type: UnitType::Hours,
            quantity: Decimal::ONE,
            rate: Decimal::ZERO,
            setup_fee: Decimal::ZERO,
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
            tax_enabled: false,
            custom_fee: Decimal::ZERO,
            extras: Vec::new(),
            client_name: String::new(),
            note_text: String::new(),
        }
    }
}

impl InputSnapshot {
    /// Applies the input minimums and text defaults. Idempotent.
    pub fn normalized(&self) -> Self {
        let service_name = self.service_name.trim();

        Self {
            service_name: if service_name.is_empty() {
                DEFAULT_SERVICE_NAME.to_string()
            } else {
                service_name.to_string()
            },
            currency: self.currency,
            unit_type: self.unit_type,
            quantity: self.quantity.max(Decimal::ONE),
            rate: self.rate.max(Decimal::ZERO),
            setup_fee: self.setup_fee.max(Decimal::ZERO),
            discount_percent: self.discount_percent.max(Decimal::ZERO),
            tax_percent: self.tax_percent.max(Decimal::ZERO),
            tax_enabled: self.tax_enabled,
            custom_fee: self.custom_fee.max(Decimal::ZERO),
            extras: self
                .extras
                .iter()
                .map(|extra| {
                    let label = extra.label.trim();
                    Extra {
                        label: if label.is_empty() {
                            DEFAULT_EXTRA_LABEL.to_string()
                        } else {
                            label.to_string()
                        },
                        amount: extra.amount,
                        selected: extra.selected,
                    }
                })
                .collect(),
            client_name: self.client_name.trim().to_string(),
            note_text: self.note_text.trim().to_string(),
        }
    }

    pub fn from_raw(raw: &RawQuoteInput) -> Self {
        let defaults = Self::default();
        let number = |value: &Option<Value>| value.as_ref().map(coerce_number);
        let text = |value: &Option<Value>| value.as_ref().and_then(coerce_text);

        let snapshot = Self {
            service_name: text(&raw.service_name).unwrap_or(defaults.service_name),
            currency: text(&raw.currency)
                .map(|code| Currency::from_code(&code))
                .unwrap_or_default(),
            unit_type: text(&raw.unit_type)
                .map(|label| UnitType::from_label(&label))
                .unwrap_or_default(),
            quantity: number(&raw.quantity).unwrap_or(Decimal::ZERO),
            rate: number(&raw.rate).unwrap_or(Decimal::ZERO),
            setup_fee: number(&raw.setup_fee).unwrap_or(Decimal::ZERO),
            discount_percent: number(&raw.discount_percent).unwrap_or(Decimal::ZERO),
            tax_percent: number(&raw.tax_percent).unwrap_or(Decimal::ZERO),
            tax_enabled: raw.tax_enabled.as_ref().map(coerce_flag).unwrap_or(false),
            custom_fee: number(&raw.custom_fee).unwrap_or(Decimal::ZERO),
            extras: raw
                .extras
                .iter()
                .flatten()
                .map(|extra| Extra {
                    label: text(&extra.label).unwrap_or_default(),
                    amount: extra.amount.as_ref().map(coerce_number).unwrap_or(Decimal::ZERO),
                    selected: extra.selected.as_ref().map(coerce_flag).unwrap_or(true),
                })
                .collect(),
            client_name: text(&raw.client_name).unwrap_or_default(),
            note_text: text(&raw.note_text).unwrap_or_default(),
        };

        snapshot.normalized()
    }
}

/// Uncoerced form values as a form layer or input file delivers them. Every
/// field accepts any JSON value; `from_raw` coerces what it can.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawQuoteInput {
    pub service_name: Option<Value>,
    pub currency: Option<Value>,
    pub unit_type: Option<Value>,
    pub quantity: Option<Value>,
    pub rate: Option<Value>,
    pub setup_fee: Option<Value>,
    pub discount_percent: Option<Value>,
    pub tax_percent: Option<Value>,
    pub tax_enabled: Option<Value>,
    pub custom_fee: Option<Value>,
    pub extras: Option<Vec<RawExtra>>,
    pub client_name: Option<Value>,
    pub note_text: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExtra {
    pub label: Option<Value>,
    pub amount: Option<Value>,
    pub selected: Option<Value>,
}

impl RawQuoteInput {
    /// Fields set on `other` replace the ones on `self`.
    pub fn merge(self, other: RawQuoteInput) -> RawQuoteInput {
        RawQuoteInput {
            service_name: other.service_name.or(self.service_name),
            currency: other.currency.or(self.currency),
            unit_type: other.unit_type.or(self.unit_type),
            quantity: other.quantity.or(self.quantity),
            rate: other.rate.or(self.rate),
            setup_fee: other.setup_fee.or(self.setup_fee),
            discount_percent: other.discount_percent.or(self.discount_percent),
            tax_percent: other.tax_percent.or(self.tax_percent),
            tax_enabled: other.tax_enabled.or(self.tax_enabled),
            custom_fee: other.custom_fee.or(self.custom_fee),
            extras: other.extras.or(self.extras),
            client_name: other.client_name.or(self.client_name),
            note_text: other.note_text.or(self.note_text),
        }
    }
}

pub fn coerce_number(value: &Value) -> Decimal {
    match value {
        Value::Number(number) => sanitize_number(&number.to_string()),
        Value::String(text) => sanitize_number(text),
        _ => Decimal::ZERO,
    }
}

/// Text for string-like values. Numbers and booleans are spelled out; null,
/// arrays and objects have no text.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(_) => coerce_number(value) != Decimal::ZERO,
        Value::String(text) => {
            matches!(text.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "on" | "1")
        }
        _ => false,
    }
}

/// Reads the longest numeric prefix of `raw`, the way a browser's
/// `parseFloat` does. Unparseable or non-finite text becomes zero. Finite
/// values beyond the `Decimal` range saturate at `Decimal::MAX`/`MIN`, and
/// magnitudes too small to represent become zero.
pub fn sanitize_number(raw: &str) -> Decimal {
    numeric_literal(raw.trim_start()).map(|literal| parse_literal(&literal)).unwrap_or_default()
}

fn numeric_literal(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let digits_from = |start: usize| {
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        end
    };

    let mut index = 0;
    let mut negative = false;
    if let Some(&sign) = bytes.first() {
        if sign == b'+' || sign == b'-' {
            negative = sign == b'-';
            index = 1;
        }
    }

    let integer_end = digits_from(index);
    let integer = &input[index..integer_end];
    index = integer_end;

    let mut fraction = "";
    if bytes.get(index) == Some(&b'.') {
        let fraction_end = digits_from(index + 1);
        fraction = &input[index + 1..fraction_end];
        index = fraction_end;
    }

    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut literal = String::with_capacity(index + 8);
    if negative {
        literal.push('-');
    }
    literal.push_str(if integer.is_empty() { "0" } else { integer });
    if !fraction.is_empty() {
        literal.push('.');
        literal.push_str(fraction);
    }

    if matches!(bytes.get(index), Some(b'e') | Some(b'E')) {
        let mut exponent_start = index + 1;
        let exponent_negative = bytes.get(exponent_start) == Some(&b'-');
        if matches!(bytes.get(exponent_start), Some(b'+') | Some(b'-')) {
            exponent_start += 1;
        }
        let exponent_end = digits_from(exponent_start);
        if exponent_end > exponent_start {
            literal.push('e');
            if exponent_negative {
                literal.push('-');
            }
            literal.push_str(&input[exponent_start..exponent_end]);
        }
    }

    Some(literal)
}

fn parse_literal(literal: &str) -> Decimal {
    let parsed = if literal.contains('e') {
        Decimal::from_scientific(literal).ok()
    } else {
        Decimal::from_str(literal).ok()
    };

    parsed.unwrap_or_else(|| saturate_literal(literal))
}

fn saturate_literal(literal: &str) -> Decimal {
    match literal.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() >= 1.0 => {
            if value.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        }
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{
        coerce_flag, coerce_number, coerce_text, sanitize_number, Currency, Extra,
        InputSnapshot, RawQuoteInput, UnitType,
    };

    #[test]
    fn sanitize_reads_numeric_prefix_like_parse_float() {
        assert_eq!(sanitize_number("42"), Decimal::new(42, 0));
        assert_eq!(sanitize_number("  12.5kg"), Decimal::new(125, 1));
        assert_eq!(sanitize_number("-3"), Decimal::new(-3, 0));
        assert_eq!(sanitize_number(".5"), Decimal::new(5, 1));
        assert_eq!(sanitize_number("1.5e3"), Decimal::new(1500, 0));
        assert_eq!(sanitize_number("2e"), Decimal::new(2, 0));
    }

    #[test]
    fn sanitize_coerces_garbage_to_zero() {
        assert_eq!(sanitize_number(""), Decimal::ZERO);
        assert_eq!(sanitize_number("abc"), Decimal::ZERO);
        assert_eq!(sanitize_number("NaN"), Decimal::ZERO);
        assert_eq!(sanitize_number("Infinity"), Decimal::ZERO);
        assert_eq!(sanitize_number("-"), Decimal::ZERO);
        assert_eq!(sanitize_number("1e400"), Decimal::ZERO);
        assert_eq!(sanitize_number("1e-400"), Decimal::ZERO);
    }

    #[test]
    fn sanitize_saturates_finite_values_beyond_decimal_range() {
        assert_eq!(sanitize_number("1e29"), Decimal::MAX);
        assert_eq!(sanitize_number("-1e29"), Decimal::MIN);
        assert_eq!(sanitize_number("123456789012345678901234567890"), Decimal::MAX);
        assert_eq!(coerce_number(&json!(1e29)), Decimal::MAX);
        assert_eq!(sanitize_number("1e-40"), Decimal::ZERO);

        let smaller = InputSnapshot::from_raw(
            &serde_json::from_value(json!({"rate": "1e28", "quantity": 2})).expect("fixture"),
        );
        let larger = InputSnapshot::from_raw(
            &serde_json::from_value(json!({"rate": "1e29", "quantity": 2})).expect("fixture"),
        );
        assert!(larger.rate > smaller.rate, "a larger rate never prices lower");
    }

    #[test]
    fn coerce_accepts_numbers_strings_and_rejects_everything_else() {
        assert_eq!(coerce_number(&json!(50)), Decimal::new(50, 0));
        assert_eq!(coerce_number(&json!(0.1)), Decimal::new(1, 1));
        assert_eq!(coerce_number(&json!("75")), Decimal::new(75, 0));
        assert_eq!(coerce_number(&json!(null)), Decimal::ZERO);
        assert_eq!(coerce_number(&json!([1, 2])), Decimal::ZERO);
        assert!(coerce_flag(&json!(true)));
        assert!(coerce_flag(&json!("on")));
        assert!(!coerce_flag(&json!("nope")));
        assert!(!coerce_flag(&json!(0)));
    }

    #[test]
    fn normalized_clamps_minimums_and_fills_defaults() {
        let snapshot = InputSnapshot {
            service_name: "   ".to_string(),
            quantity: Decimal::new(-5, 0),
            rate: Decimal::new(-20, 0),
            setup_fee: Decimal::new(-1, 0),
            discount_percent: Decimal::new(-10, 0),
            tax_percent: Decimal::new(-8, 0),
            custom_fee: Decimal::new(-3, 0),
            extras: vec![Extra::new("  ", Decimal::new(10, 0), true)],
            ..InputSnapshot::default()
        }
        .normalized();

        assert_eq!(snapshot.service_name, "Service");
        assert_eq!(snapshot.quantity, Decimal::ONE);
        assert_eq!(snapshot.rate, Decimal::ZERO);
        assert_eq!(snapshot.setup_fee, Decimal::ZERO);
        assert_eq!(snapshot.discount_percent, Decimal::ZERO);
        assert_eq!(snapshot.tax_percent, Decimal::ZERO);
        assert_eq!(snapshot.custom_fee, Decimal::ZERO);
        assert_eq!(snapshot.extras[0].label, "Extra");
        assert_eq!(snapshot.normalized(), snapshot);
    }

    #[test]
    fn from_raw_is_fail_soft() {
        let raw: RawQuoteInput = serde_json::from_value(json!({
            "service_name": "Website audit",
            "currency": "gbp",
            "unit_type": "units",
            "quantity": "three",
            "rate": "120",
            "setup_fee": {"nested": true},
            "tax_enabled": "yes",
            "tax_percent": 20,
            "extras": [
                {"label": "Rush", "amount": "50"},
                {"label": "Hosting", "amount": 30, "selected": false}
            ]
        }))
        .expect("raw input fixture");

        let snapshot = InputSnapshot::from_raw(&raw);

        assert_eq!(snapshot.service_name, "Website audit");
        assert_eq!(snapshot.currency, Currency::Gbp);
        assert_eq!(snapshot.unit_type, UnitType::Units);
        assert_eq!(snapshot.quantity, Decimal::ONE);
        assert_eq!(snapshot.rate, Decimal::new(120, 0));
        assert_eq!(snapshot.setup_fee, Decimal::ZERO);
        assert!(snapshot.tax_enabled);
        assert_eq!(snapshot.extras.len(), 2);
        assert!(snapshot.extras[0].selected);
        assert!(!snapshot.extras[1].selected);
    }

    #[test]
    fn from_raw_coerces_non_string_text_fields() {
        let raw: RawQuoteInput = serde_json::from_value(json!({
            "service_name": 12,
            "currency": 5,
            "unit_type": false,
            "client_name": ["Sam"],
            "note_text": null,
            "extras": [{"label": 7, "amount": 10}]
        }))
        .expect("non-string text fields still deserialize");

        let snapshot = InputSnapshot::from_raw(&raw);

        assert_eq!(snapshot.service_name, "12");
        assert_eq!(snapshot.currency, Currency::Usd);
        assert_eq!(snapshot.unit_type, UnitType::Hours);
        assert_eq!(snapshot.client_name, "");
        assert_eq!(snapshot.note_text, "");
        assert_eq!(snapshot.extras[0].label, "7");
        assert_eq!(coerce_text(&json!({"a": 1})), None);
    }

    #[test]
    fn unknown_currency_falls_back_to_usd() {
        assert_eq!(Currency::from_code("JPY"), Currency::Usd);
        assert_eq!(Currency::from_code(" eur "), Currency::Eur);
        assert_eq!(Currency::parse_code("JPY"), None);
    }

    #[test]
    fn merge_prefers_later_fields() {
        let base = RawQuoteInput {
            service_name: Some(json!("Consulting")),
            rate: Some(json!(100)),
            ..RawQuoteInput::default()
        };
        let merged = base.merge(RawQuoteInput {
            rate: Some(json!("150")),
            ..RawQuoteInput::default()
        });

        assert_eq!(merged.service_name, Some(json!("Consulting")));
        assert_eq!(merged.rate, Some(json!("150")));
    }

    #[test]
    fn unit_labels_follow_quantity() {
        assert_eq!(UnitType::Hours.label_for(Decimal::ONE), "hour");
        assert_eq!(UnitType::Hours.label_for(Decimal::new(25, 1)), "hours");
        assert_eq!(UnitType::Units.label_for(Decimal::new(3, 0)), "units");
    }
}
