use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use quickquote_core::config::LoadOptions;
use quickquote_core::cpq::QuoteEvaluation;
use quickquote_core::errors::ApplicationError;
use tera::{Context, Tera};

use super::input::QuoteArgs;
use super::{quote, CommandResult};

const PRINT_TEMPLATE: &str = "print.html.tera";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("template error: {0}")]
    Template(String),
    #[error("could not write `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

impl From<ExportError> for ApplicationError {
    fn from(value: ExportError) -> Self {
        Self::Render(value.to_string())
    }
}

/// Printable HTML view of one quote. Every interpolated value is
/// HTML-escaped by the template engine.
#[derive(Clone, Debug)]
pub struct PrintRenderer {
    tera: Tera,
}

impl PrintRenderer {
    pub fn new() -> Result<Self, ExportError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html.tera", ".html"]);
        tera.add_raw_template(PRINT_TEMPLATE, include_str!("../../templates/print.html.tera"))
            .map_err(|error| ExportError::Template(error.to_string()))?;

        Ok(Self { tera })
    }

    pub fn render(
        &self,
        evaluation: &QuoteEvaluation,
        generated_on: NaiveDate,
    ) -> Result<String, ExportError> {
        let mut context = Context::new();
        context.insert("title", &format!("{} estimate", evaluation.snapshot.service_name));
        context.insert("client_name", &evaluation.snapshot.client_name);
        context.insert("generated_on", &generated_on.format("%-d %B %Y").to_string());
        context.insert("breakdown", &evaluation.breakdown);
        context.insert("message", &evaluation.message);

        self.tera
            .render(PRINT_TEMPLATE, &context)
            .map_err(|error| ExportError::Template(error.to_string()))
    }
}

pub fn run(options: &LoadOptions, args: &QuoteArgs, output: Option<&Path>) -> CommandResult {
    let html = match quote::evaluate(options, args).and_then(|evaluation| {
        let renderer = PrintRenderer::new()?;
        Ok(renderer.render(&evaluation, Local::now().date_naive())?)
    }) {
        Ok(html) => html,
        Err(error) => return CommandResult::from_error("export", error),
    };

    let Some(path) = output else {
        return CommandResult::text(html);
    };

    match write_export(path, &html) {
        Ok(()) => {
            tracing::info!(
                event_name = "cli.export.written",
                path = %path.display(),
                bytes = html.len(),
                "print export written"
            );
            CommandResult::success("export", format!("wrote {}", path.display()))
        }
        Err(error) => CommandResult::from_error("export", error.into()),
    }
}

fn write_export(path: &Path, html: &str) -> Result<(), ExportError> {
    fs::write(path, html)
        .map_err(|source| ExportError::Write { path: path.to_path_buf(), source })
}
