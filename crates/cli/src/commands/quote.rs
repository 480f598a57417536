use quickquote_core::config::LoadOptions;
use quickquote_core::cpq::breakdown::Breakdown;
use quickquote_core::cpq::{DefaultQuoteRuntime, QuoteEvaluation, QuoteRuntime};
use quickquote_core::errors::ApplicationError;

use super::input::{resolve_snapshot, QuoteArgs};
use super::{load_config, CommandResult};

const TOTAL_LABEL: &str = "Total";

pub fn run(options: &LoadOptions, args: &QuoteArgs, json_output: bool) -> CommandResult {
    let evaluation = match evaluate(options, args) {
        Ok(evaluation) => evaluation,
        Err(error) => return CommandResult::from_error("quote", error),
    };

    if json_output {
        return match serde_json::to_string_pretty(&evaluation) {
            Ok(payload) => CommandResult::text(payload),
            Err(error) => CommandResult::from_error(
                "quote",
                ApplicationError::Render(format!("quote serialization failed: {error}")),
            ),
        };
    }

    let table = render_breakdown(&evaluation.breakdown);
    CommandResult::text(format!("{table}\n\n{}", evaluation.message))
}

/// One full pass: config, input layering, pricing, message.
pub fn evaluate(
    options: &LoadOptions,
    args: &QuoteArgs,
) -> Result<QuoteEvaluation, ApplicationError> {
    let config = load_config(options)?;
    let snapshot = resolve_snapshot(&config, args)?;

    let runtime = DefaultQuoteRuntime::default().with_template(config.message.clone());
    let evaluation = runtime.evaluate(&snapshot);

    tracing::info!(
        event_name = "cli.quote.evaluated",
        currency = %evaluation.pricing.currency,
        total = %evaluation.pricing.total,
        line_items = evaluation.pricing.visible_items().count(),
        "quote evaluated"
    );

    Ok(evaluation)
}

pub fn render_breakdown(breakdown: &Breakdown) -> String {
    let width = breakdown
        .sections
        .iter()
        .flat_map(|section| section.rows.iter())
        .map(|row| row.label.chars().count())
        .chain(std::iter::once(TOTAL_LABEL.len()))
        .max()
        .unwrap_or_default();

    let mut lines = Vec::new();
    for section in &breakdown.sections {
        if let Some(title) = &section.title {
            lines.push(format!("{title}:"));
        }
        for row in &section.rows {
            lines.push(format!("  {:<width$}  {}", row.label, row.value));
        }
    }
    lines.push(format!("  {:<width$}  {}", TOTAL_LABEL, breakdown.total));
    lines.push(String::new());
    lines.push(breakdown.summary_note.clone());

    lines.join("\n")
}
