pub mod breakdown;
pub mod currency;
pub mod message;
pub mod pricing;

use serde::{Deserialize, Serialize};

use crate::domain::snapshot::InputSnapshot;

use self::{
    breakdown::{build_breakdown, Breakdown},
    message::{MessageComposer, MessageContext, MessageTemplate, TemplateMessageComposer},
    pricing::{DeterministicPricingEngine, PricingEngine, PricingResult},
};

/// Output of one recomputation pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEvaluation {
    pub snapshot: InputSnapshot,
    pub pricing: PricingResult,
    pub breakdown: Breakdown,
    pub message: String,
}

pub trait QuoteRuntime: Send + Sync {
    fn evaluate(&self, snapshot: &InputSnapshot) -> QuoteEvaluation;
}

pub struct DeterministicQuoteRuntime<P, M> {
    pricing_engine: P,
    message_composer: M,
    template: MessageTemplate,
}

impl<P, M> DeterministicQuoteRuntime<P, M> {
    pub fn new(pricing_engine: P, message_composer: M) -> Self {
        Self { pricing_engine, message_composer, template: MessageTemplate::default() }
    }

    pub fn with_template(mut self, template: MessageTemplate) -> Self {
        self.template = template;
        self
    }
}

pub type DefaultQuoteRuntime =
    DeterministicQuoteRuntime<DeterministicPricingEngine, TemplateMessageComposer>;

impl Default for DefaultQuoteRuntime {
    fn default() -> Self {
        Self::new(DeterministicPricingEngine, TemplateMessageComposer)
    }
}

impl<P, M> QuoteRuntime for DeterministicQuoteRuntime<P, M>
where
    P: PricingEngine,
    M: MessageComposer,
{
    fn evaluate(&self, snapshot: &InputSnapshot) -> QuoteEvaluation {
        let snapshot = snapshot.normalized();
        let pricing = self.pricing_engine.price(&snapshot);
        let context =
            MessageContext::from_snapshot(&snapshot).with_template(self.template.clone());
        let message = self.message_composer.compose(&pricing, &context);
        let breakdown = build_breakdown(&snapshot, &pricing);

        QuoteEvaluation { snapshot, pricing, breakdown, message }
    }
}
