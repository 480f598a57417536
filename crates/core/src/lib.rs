pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use cpq::{
    breakdown::Breakdown, currency::CurrencyFormatter, message::MessageTemplate,
    pricing::PricingResult, DefaultQuoteRuntime, DeterministicQuoteRuntime, QuoteEvaluation,
    QuoteRuntime,
};
pub use domain::snapshot::{Currency, Extra, InputSnapshot, RawQuoteInput, UnitType};
pub use errors::{ApplicationError, InterfaceError};
