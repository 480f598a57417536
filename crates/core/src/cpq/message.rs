use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::currency::{format_number, CurrencyFormatter};
use crate::cpq::pricing::PricingResult;
use crate::domain::snapshot::InputSnapshot;

/// Fixed wording around the computed slots. `{client}` and `{service}` are
/// substituted in `greeting` and `intro`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub greeting: String,
    pub generic_greeting: String,
    pub intro: String,
    pub summary_header: String,
    pub closing: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            greeting: "Hi {client},".to_string(),
            generic_greeting: "Hi there,".to_string(),
            intro: "Thanks for your interest in {service}. Here is an estimate based on the \
                    details we discussed."
                .to_string(),
            summary_header: "Estimate summary:".to_string(),
            closing: "Let me know if you have any questions or would like to go ahead, and I \
                      will get everything scheduled."
                .to_string(),
        }
    }
}

/// Everything the composer reads besides the pricing result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    pub client_name: String,
    pub note_text: String,
    pub service_name: String,
    pub quantity: Decimal,
    pub unit_label: String,
    pub rate: Decimal,
    pub formatter: CurrencyFormatter,
    pub template: MessageTemplate,
}

impl MessageContext {
    pub fn from_snapshot(snapshot: &InputSnapshot) -> Self {
        let snapshot = snapshot.normalized();
        Self {
            unit_label: snapshot.unit_type.label_for(snapshot.quantity).to_string(),
            formatter: CurrencyFormatter::new(snapshot.currency),
            quantity: snapshot.quantity,
            rate: snapshot.rate,
            client_name: snapshot.client_name,
            note_text: snapshot.note_text,
            service_name: snapshot.service_name,
            template: MessageTemplate::default(),
        }
    }

    pub fn with_template(mut self, template: MessageTemplate) -> Self {
        self.template = template;
        self
    }
}

pub trait MessageComposer: Send + Sync {
    fn compose(&self, result: &PricingResult, context: &MessageContext) -> String;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateMessageComposer;

impl MessageComposer for TemplateMessageComposer {
    fn compose(&self, result: &PricingResult, context: &MessageContext) -> String {
        compose_message(result, context)
    }
}

pub fn compose_message(result: &PricingResult, context: &MessageContext) -> String {
    let template = &context.template;
    let formatter = &context.formatter;

    let client = context.client_name.trim();
    let greeting = if client.is_empty() {
        template.generic_greeting.clone()
    } else {
        template.greeting.replace("{client}", client)
    };

    let mut lines = vec![
        greeting,
        String::new(),
        template.intro.replace("{service}", &context.service_name),
        String::new(),
        template.summary_header.clone(),
    ];
    lines.extend(summary_bullets(result, context));
    lines.push(String::new());
    lines.push(format!("Total: {}", formatter.format(result.total)));

    let note = context.note_text.trim();
    if !note.is_empty() {
        lines.push(format!("Note: {note}"));
    }

    lines.push(String::new());
    lines.push(template.closing.clone());

    normalize_blank_lines(&lines.join("\n"))
}

fn summary_bullets(result: &PricingResult, context: &MessageContext) -> Vec<String> {
    let formatter = &context.formatter;
    let mut bullets = vec![format!(
        "• {} {} × {}: {}",
        format_number(context.quantity),
        context.unit_label,
        formatter.format(context.rate),
        result.base_item.value
    )];

    bullets.extend(
        result.extra_items.iter().map(|item| format!("• {}: {}", item.label, item.value)),
    );

    let optional = [
        (&result.setup_item, result.setup_item.amount > Decimal::ZERO),
        (&result.custom_item, result.custom_item.amount > Decimal::ZERO),
        (&result.discount_item, result.discount_amount > Decimal::ZERO),
        (&result.tax_item, result.tax_amount > Decimal::ZERO),
    ];
    bullets.extend(
        optional
            .into_iter()
            .filter(|(_, included)| *included)
            .map(|(item, _)| format!("• {}: {}", item.label, item.value)),
    );

    bullets
}

/// Collapses every run of three or more newlines to a single blank line,
/// then trims the ends.
pub fn normalize_blank_lines(message: &str) -> String {
    let mut normalized = String::with_capacity(message.len());
    let mut newline_run = 0;

    for ch in message.chars() {
        if ch == '\n' {
            newline_run += 1;
            if newline_run > 2 {
                continue;
            }
        } else {
            newline_run = 0;
        }
        normalized.push(ch);
    }

    normalized.trim().to_string()
}
