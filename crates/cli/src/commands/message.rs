use quickquote_core::config::LoadOptions;

use super::input::QuoteArgs;
use super::{quote, CommandResult};

/// Prints only the composed message, ready to pipe into a clipboard tool.
pub fn run(options: &LoadOptions, args: &QuoteArgs) -> CommandResult {
    match quote::evaluate(options, args) {
        Ok(evaluation) => CommandResult::text(evaluation.message),
        Err(error) => CommandResult::from_error("message", error),
    }
}
