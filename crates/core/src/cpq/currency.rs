use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::snapshot::Currency;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SymbolPosition {
    Prefix,
    Suffix,
}

#[derive(Clone, Copy, Debug)]
struct LocaleFormat {
    locale: &'static str,
    symbol: &'static str,
    group_separator: char,
    position: SymbolPosition,
}

impl LocaleFormat {
    fn for_currency(currency: Currency) -> Self {
        match currency {
            Currency::Usd => Self {
                locale: "en-US",
                symbol: "$",
                group_separator: ',',
                position: SymbolPosition::Prefix,
            },
            Currency::Gbp => Self {
                locale: "en-GB",
                symbol: "£",
                group_separator: ',',
                position: SymbolPosition::Prefix,
            },
            Currency::Eur => Self {
                locale: "de-DE",
                symbol: "€",
                group_separator: '.',
                position: SymbolPosition::Suffix,
            },
        }
    }
}

/// Renders whole-unit currency strings the way the browser's
/// `Intl.NumberFormat` does with `maximumFractionDigits: 0`.
///
/// Formatting only ever produces display text. Callers keep the unrounded
/// `Decimal` for any further arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormatter {
    currency: Currency,
}

impl CurrencyFormatter {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    pub fn for_code(code: &str) -> Self {
        Self::new(Currency::from_code(code))
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn locale(&self) -> &'static str {
        LocaleFormat::for_currency(self.currency).locale
    }

    pub fn format(&self, amount: Decimal) -> String {
        let locale = LocaleFormat::for_currency(self.currency);
        let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let digits = group_digits(&rounded.abs().normalize().to_string(), locale.group_separator);
        let sign = if amount < Decimal::ZERO { "-" } else { "" };

        match locale.position {
            SymbolPosition::Prefix => format!("{sign}{}{digits}", locale.symbol),
            SymbolPosition::Suffix => format!("{sign}{digits}\u{a0}{}", locale.symbol),
        }
    }
}

/// Plain number text for quantities and percentages, without trailing zeros.
pub fn format_number(value: Decimal) -> String {
    value.normalize().to_string()
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}
