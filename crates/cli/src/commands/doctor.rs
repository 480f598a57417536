use quickquote_core::config::{AppConfig, LoadOptions};
use quickquote_core::cpq::{DefaultQuoteRuntime, QuoteRuntime};
use quickquote_core::domain::snapshot::InputSnapshot;
use rust_decimal::Decimal;
use serde::Serialize;

use super::export::PrintRenderer;
use super::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: format!(
                    "configuration loaded ({} default, {} extras in catalog)",
                    config.quote.currency,
                    config.extras.len()
                ),
            });
            checks.push(check_pricing(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "pricing_self_check",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }
    checks.push(check_export_template());

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// Prices the reference discount-plus-tax quote (1 × 1000, 20% off, 5% tax)
/// with the configured message wording and checks every figure.
fn check_pricing(config: &AppConfig) -> DoctorCheck {
    let snapshot = InputSnapshot {
        quantity: Decimal::ONE,
        rate: Decimal::new(1000, 0),
        discount_percent: Decimal::new(20, 0),
        tax_percent: Decimal::new(5, 0),
        tax_enabled: true,
        ..InputSnapshot::default()
    };
    let evaluation =
        DefaultQuoteRuntime::default().with_template(config.message.clone()).evaluate(&snapshot);
    let pricing = &evaluation.pricing;

    let expected = [
        ("base_subtotal", pricing.base_subtotal, Decimal::new(1000, 0)),
        ("discount_amount", pricing.discount_amount, Decimal::new(200, 0)),
        ("discounted_subtotal", pricing.discounted_subtotal, Decimal::new(800, 0)),
        ("tax_amount", pricing.tax_amount, Decimal::new(40, 0)),
        ("total", pricing.total, Decimal::new(840, 0)),
    ];
    let mismatches: Vec<_> = expected
        .iter()
        .filter(|(_, actual, wanted)| actual != wanted)
        .map(|(name, actual, wanted)| format!("{name} = {actual}, expected {wanted}"))
        .collect();

    if !mismatches.is_empty() {
        return DoctorCheck {
            name: "pricing_self_check",
            status: CheckStatus::Fail,
            details: mismatches.join("; "),
        };
    }

    if evaluation.message.contains("\n\n\n") {
        return DoctorCheck {
            name: "pricing_self_check",
            status: CheckStatus::Fail,
            details: "composed message contains stacked blank lines".to_string(),
        };
    }

    DoctorCheck {
        name: "pricing_self_check",
        status: CheckStatus::Pass,
        details: "reference quote priced at 840 and message composed".to_string(),
    }
}

fn check_export_template() -> DoctorCheck {
    match PrintRenderer::new() {
        Ok(_) => DoctorCheck {
            name: "export_template",
            status: CheckStatus::Pass,
            details: "print template parsed".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "export_template",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
