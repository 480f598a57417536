use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::currency::{format_number, CurrencyFormatter};
use crate::domain::snapshot::{Currency, InputSnapshot};

/// A display-ready breakdown row. `amount` stays unrounded; `value` is the
/// formatted text for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: Decimal,
    pub value: String,
    pub visible: bool,
}

impl LineItem {
    fn new(
        label: impl Into<String>,
        amount: Decimal,
        formatter: &CurrencyFormatter,
        visible: bool,
    ) -> Self {
        Self { label: label.into(), amount, value: formatter.format(amount), visible }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub currency: String,
    pub steps: Vec<PricingTraceStep>,
}

impl PricingTrace {
    fn step(&mut self, stage: &str, detail: &str, amount: Decimal) {
        self.steps.push(PricingTraceStep {
            stage: stage.to_string(),
            detail: detail.to_string(),
            amount,
        });
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub currency: Currency,
    pub base_subtotal: Decimal,
    pub extras_total: Decimal,
    pub pre_discount_subtotal: Decimal,
    pub discount_amount: Decimal,
    pub discounted_subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub base_item: LineItem,
    pub setup_item: LineItem,
    pub custom_item: LineItem,
    pub discount_item: LineItem,
    pub tax_item: LineItem,
    pub extra_items: Vec<LineItem>,
    pub trace: PricingTrace,
}

impl PricingResult {
    /// Visible rows in breakdown order: base, extras, setup, custom,
    /// discount, tax.
    pub fn visible_items(&self) -> impl Iterator<Item = &LineItem> {
        std::iter::once(&self.base_item)
            .chain(self.extra_items.iter())
            .chain([&self.setup_item, &self.custom_item, &self.discount_item, &self.tax_item])
            .filter(|item| item.visible)
    }

    pub fn formatter(&self) -> CurrencyFormatter {
        CurrencyFormatter::new(self.currency)
    }
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, snapshot: &InputSnapshot) -> PricingResult;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, snapshot: &InputSnapshot) -> PricingResult {
        compute_pricing(snapshot)
    }
}

/// Prices one snapshot. The stage order is fixed: subtotal, then discount on
/// the whole pre-discount subtotal, then tax on the discounted subtotal.
pub fn compute_pricing(snapshot: &InputSnapshot) -> PricingResult {
    let snapshot = snapshot.normalized();
    let formatter = CurrencyFormatter::new(snapshot.currency);
    let mut trace =
        PricingTrace { currency: snapshot.currency.code().to_string(), steps: Vec::new() };

    let base_subtotal = snapshot.quantity.saturating_mul(snapshot.rate);
    trace.step("base_subtotal", "quantity * rate", base_subtotal);

    let counted_extras: Vec<_> =
        snapshot.extras.iter().filter(|extra| extra.counts_toward_total()).collect();
    let extras_total =
        counted_extras.iter().fold(Decimal::ZERO, |sum, extra| sum.saturating_add(extra.amount));
    trace.step("extras_total", "sum(selected extras with amount > 0)", extras_total);

    let pre_discount_subtotal = base_subtotal
        .saturating_add(snapshot.setup_fee)
        .saturating_add(extras_total)
        .saturating_add(snapshot.custom_fee);
    trace.step(
        "pre_discount_subtotal",
        "base_subtotal + setup_fee + extras_total + custom_fee",
        pre_discount_subtotal,
    );

    let discount_amount =
        pre_discount_subtotal.saturating_mul(snapshot.discount_percent / Decimal::ONE_HUNDRED);
    trace.step(
        "discount_amount",
        "pre_discount_subtotal * discount_percent / 100",
        discount_amount,
    );

    let discounted_subtotal = pre_discount_subtotal.saturating_sub(discount_amount);
    trace.step(
        "discounted_subtotal",
        "pre_discount_subtotal - discount_amount",
        discounted_subtotal,
    );

    let tax_amount = if snapshot.tax_enabled {
        discounted_subtotal.saturating_mul(snapshot.tax_percent / Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };
    trace.step("tax_amount", "discounted_subtotal * tax_percent / 100 when enabled", tax_amount);

    let total = discounted_subtotal.saturating_add(tax_amount);
    trace.step("total", "discounted_subtotal + tax_amount", total);

    let base_item = LineItem::new(
        format!("{} × {}", format_number(snapshot.quantity), formatter.format(snapshot.rate)),
        base_subtotal,
        &formatter,
        true,
    );
    let setup_label =
        if snapshot.setup_fee > Decimal::ZERO { "Setup fee" } else { "Setup fee (included)" };
    let setup_item = LineItem::new(setup_label, snapshot.setup_fee, &formatter, true);
    let custom_item = LineItem::new(
        "Custom fee",
        snapshot.custom_fee,
        &formatter,
        snapshot.custom_fee > Decimal::ZERO,
    );
    let discount_item = LineItem::new(
        format!("Discount ({}%)", format_number(snapshot.discount_percent)),
        -discount_amount,
        &formatter,
        discount_amount > Decimal::ZERO && snapshot.discount_percent > Decimal::ZERO,
    );
    let tax_item = LineItem::new(
        format!("Tax ({}%)", format_number(snapshot.tax_percent)),
        tax_amount,
        &formatter,
        snapshot.tax_enabled && tax_amount > Decimal::ZERO,
    );
    let extra_items = counted_extras
        .iter()
        .map(|extra| LineItem::new(extra.label.clone(), extra.amount, &formatter, true))
        .collect();

    PricingResult {
        currency: snapshot.currency,
        base_subtotal,
        extras_total,
        pre_discount_subtotal,
        discount_amount,
        discounted_subtotal,
        tax_amount,
        total,
        base_item,
        setup_item,
        custom_item,
        discount_item,
        tax_item,
        extra_items,
        trace,
    }
}
