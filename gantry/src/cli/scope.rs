// gantry/src/cli/scope.rs
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use gantry_common::error::Result;
use gantry_common::Config;
use gantry_core::{Bootstrap, TemplateLocator, TracingSink};
use prettytable::{format, Cell, Row, Table};

use super::boot::boot_manifest;

#[derive(Args, Debug)]
pub struct Scope {
    /// Startup manifest; the built-in defaults are used without one
    pub manifest: Option<PathBuf>,

    /// List the templates a generator would use
    #[arg(long)]
    pub generator: Option<String>,

    /// Templates root (defaults to <root>/templates)
    #[arg(long)]
    pub templates: Option<PathBuf>,
}

impl Scope {
    pub fn run(&self, config: Config) -> Result<()> {
        let configured = match &self.manifest {
            Some(path) => boot_manifest(path, config)?,
            None => Bootstrap::new(config, Box::new(TracingSink)).finish(),
        };
        let scope = configured.generator_scope();
        println!(
            "{}Generator scope: {}",
            "==> ".bold().blue(),
            scope.join(" > ")
        );

        let Some(generator) = &self.generator else {
            return Ok(());
        };
        let root = self
            .templates
            .clone()
            .unwrap_or_else(|| configured.config().templates_dir());
        let locator = TemplateLocator::new(root, scope);
        let templates = locator.templates(generator)?;
        if templates.is_empty() {
            println!("{}", format!("No templates for '{generator}'").yellow());
            return Ok(());
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("Template").style_spec("b"),
            Cell::new("Scope").style_spec("b"),
            Cell::new("Source").style_spec("b"),
        ]));
        for template in &templates {
            table.add_row(Row::new(vec![
                Cell::new(&template.relative.display().to_string()),
                Cell::new(&template.scope),
                Cell::new(&template.source.display().to_string()),
            ]));
        }
        table.printstd();
        Ok(())
    }
}
