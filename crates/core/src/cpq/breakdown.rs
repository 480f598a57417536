use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::currency::{format_number, CurrencyFormatter};
use crate::cpq::pricing::{LineItem, PricingResult};
use crate::domain::snapshot::InputSnapshot;

pub const EXTRAS_GROUP_TITLE: &str = "Extras";
pub const NO_EXTRAS_LABEL: &str = "No extras selected";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub label: String,
    pub value: String,
}

impl From<&LineItem> for BreakdownRow {
    fn from(item: &LineItem) -> Self {
        Self { label: item.label.clone(), value: item.value.clone() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownSection {
    pub title: Option<String>,
    pub rows: Vec<BreakdownRow>,
}

/// The on-screen price breakdown: charges, the extras group, adjustments,
/// the total and a one-line summary of what is being quoted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub sections: Vec<BreakdownSection>,
    pub total: String,
    pub summary_note: String,
}

pub fn build_breakdown(snapshot: &InputSnapshot, result: &PricingResult) -> Breakdown {
    let snapshot = snapshot.normalized();
    let formatter = CurrencyFormatter::new(result.currency);

    let charges = [&result.base_item, &result.setup_item, &result.custom_item]
        .into_iter()
        .filter(|item| item.visible)
        .map(BreakdownRow::from)
        .collect();

    let extras = if result.extra_items.is_empty() {
        vec![BreakdownRow {
            label: NO_EXTRAS_LABEL.to_string(),
            value: formatter.format(Decimal::ZERO),
        }]
    } else {
        result.extra_items.iter().map(BreakdownRow::from).collect()
    };

    let mut sections = vec![
        BreakdownSection { title: None, rows: charges },
        BreakdownSection { title: Some(EXTRAS_GROUP_TITLE.to_string()), rows: extras },
    ];

    let adjustments: Vec<_> = [&result.discount_item, &result.tax_item]
        .into_iter()
        .filter(|item| item.visible)
        .map(BreakdownRow::from)
        .collect();
    if !adjustments.is_empty() {
        sections.push(BreakdownSection { title: None, rows: adjustments });
    }

    let summary_note = format!(
        "{} · {} {} at {} each.",
        snapshot.service_name,
        format_number(snapshot.quantity),
        snapshot.unit_type.label_for(snapshot.quantity),
        formatter.format(snapshot.rate)
    );

    Breakdown { sections, total: formatter.format(result.total), summary_note }
}
