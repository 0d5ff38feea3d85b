// gantry/src/cli/resolve.rs
use clap::Args;
use colored::Colorize;
use gantry_common::dependency::{AttemptOutcome, DependencyRequest, VersionConstraint};
use gantry_common::error::{GantryError, Result};
use gantry_common::Config;
use gantry_core::resolver_for;
use prettytable::{format, Cell, Row, Table};

#[derive(Args, Debug)]
pub struct Resolve {
    /// Dependency name
    pub name: String,

    /// Version constraint, e.g. "~> 1.2" or ">= 2.0"
    #[arg(long = "version", value_name = "CONSTRAINT")]
    pub constraint: Option<String>,

    /// Try the embedded framework first
    #[arg(long)]
    pub framework: bool,
}

impl Resolve {
    pub fn run(&self, config: Config) -> Result<()> {
        let constraint = match &self.constraint {
            Some(c) => VersionConstraint::parse(c)?,
            None => VersionConstraint::Any,
        };
        let request = DependencyRequest::new(self.name.clone())
            .with_constraint(constraint)
            .framework_internal(self.framework);

        let mut resolver = resolver_for(&config);
        let result = resolver.resolve(&request)?;

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("Strategy").style_spec("b"),
            Cell::new("Outcome").style_spec("b"),
            Cell::new("Detail").style_spec("b"),
        ]));
        for attempt in &result.attempts {
            let (outcome, detail) = match &attempt.outcome {
                AttemptOutcome::Success(location) => {
                    ("found", location.path.display().to_string())
                }
                AttemptOutcome::Recoverable(reason) => ("miss", reason.clone()),
                AttemptOutcome::Fatal(reason) => ("fatal", reason.clone()),
            };
            let style = match outcome {
                "found" => "Fg",
                "fatal" => "Fr",
                _ => "Fy",
            };
            table.add_row(Row::new(vec![
                Cell::new(&attempt.strategy.to_string()),
                Cell::new(outcome).style_spec(style),
                Cell::new(&detail),
            ]));
        }
        table.printstd();

        if let Some(p) = result.provenance() {
            let version = p
                .version
                .as_ref()
                .map(|v| format!(" {v}"))
                .unwrap_or_default();
            println!(
                "{}{}{} {}",
                "==> ".bold().blue(),
                result.request.name.bold(),
                version,
                p.detail
            );
            return Ok(());
        }

        eprintln!("{}", result.explain());
        Err(GantryError::Unresolved {
            name: request.name.clone(),
            result: Box::new(result),
        })
    }
}
