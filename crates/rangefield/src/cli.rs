//! Command-line entry point.

use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::app::form::Form;
use crate::domain::model::Axis;
use crate::infra::catalog::FormCatalog;
use crate::infra::config::Config;
use crate::ui::app::PickerApp;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pick values for dual-range form fields", long_about = None)]
pub struct Cli {
    /// Extra config file layered above the user and workspace configs
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Form catalog to open instead of the configured or bundled one
    #[arg(long)]
    pub form: Option<PathBuf>,
    /// Preselect a choice before editing, e.g. `weight.lower=5`
    #[arg(long = "select", value_name = "FIELD.AXIS=KEY")]
    pub selections: Vec<SelectionArg>,
    /// Print submission values as JSON instead of display values
    #[arg(long)]
    pub json: bool,
    /// Skip the interactive picker
    #[arg(long)]
    pub no_tui: bool,
    /// Override the configured log level
    #[arg(long)]
    pub log_level: Option<String>,
}

/// A `FIELD.AXIS=KEY` selection given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionArg {
    pub field: String,
    pub axis: Axis,
    pub choice: String,
}

impl FromStr for SelectionArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (target, choice) = value
            .split_once('=')
            .ok_or_else(|| format!("expected FIELD.AXIS=KEY, got '{value}'"))?;
        let (field, axis) = target
            .rsplit_once('.')
            .ok_or_else(|| format!("expected FIELD.AXIS before '=', got '{target}'"))?;
        if field.is_empty() || choice.is_empty() {
            return Err(format!("expected FIELD.AXIS=KEY, got '{value}'"));
        }
        Ok(Self {
            field: field.to_string(),
            axis: axis.parse().map_err(|err| format!("{err}"))?,
            choice: choice.to_string(),
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    execute(cli, &mut io::stdout())
}

/// Load config and catalog, apply selections, optionally run the picker, then report.
pub fn execute(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = Config::load_with_explicit(cli.config.as_deref())?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.defaults.log_level().to_string());
    crate::init(&level)?;

    let catalog = match cli
        .form
        .clone()
        .or_else(|| config.defaults.form.as_ref().map(PathBuf::from))
    {
        Some(path) => FormCatalog::load(&path)?,
        None => FormCatalog::demo()?,
    };
    let mut form = catalog.build_form()?;

    for selection in &cli.selections {
        form.set_selection(&selection.field, selection.axis, &selection.choice)
            .with_context(|| {
                format!(
                    "cannot select `{}` on {}.{}",
                    selection.choice, selection.field, selection.axis
                )
            })?;
    }

    if !cli.no_tui {
        let titles = catalog
            .fields
            .iter()
            .map(|spec| (spec.key.clone(), spec.title().to_string()))
            .collect();
        let mut app = PickerApp::new(form, titles, &config);
        app.run()?;
        form = app.into_form();
    }

    report(&form, cli.json, out)?;

    let failures = form.validate();
    if !failures.is_empty() {
        let details: Vec<String> = failures.iter().map(ToString::to_string).collect();
        bail!("form is invalid: {}", details.join("; "));
    }
    Ok(())
}

fn report(form: &Form, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(&form.values())
            .context("failed to serialize form values")?;
        writeln!(out, "{rendered}")?;
    } else {
        for (key, display) in form.display_values() {
            writeln!(out, "{key}: {display}")?;
        }
    }
    Ok(())
}
