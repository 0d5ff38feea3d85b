// gantry/src/cli/boot.rs
use std::path::{Path, PathBuf};

use clap::Args;
use colored::Colorize;
use gantry_common::error::Result;
use gantry_common::Config;
use gantry_core::{BootReport, Bootstrap, Configured, Manifest, ReportEntry, TracingSink};
use tracing::debug;

#[derive(Args, Debug)]
pub struct Boot {
    /// Startup manifest to evaluate
    pub manifest: PathBuf,

    /// Print the boot report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Boot {
    pub fn run(&self, config: Config) -> Result<()> {
        let configured = boot_manifest(&self.manifest, config)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(configured.report())?);
            return Ok(());
        }
        print_summary(&configured);
        Ok(())
    }
}

/// Runs one configuration pass over the manifest at `path`.
pub fn boot_manifest(path: &Path, mut config: Config) -> Result<Configured> {
    let manifest = Manifest::load(path)?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    manifest.apply_to(&mut config, base_dir)?;
    debug!("Effective configuration: {:?}", config);

    let mut bootstrap = Bootstrap::new(config, Box::new(TracingSink));
    bootstrap.run(&manifest)?;
    Ok(bootstrap.finish())
}

fn print_summary(configured: &Configured) {
    let report = configured.report();
    for entry in &report.entries {
        match entry {
            ReportEntry::Dependency { result, required } => {
                if let Some(p) = result.provenance() {
                    println!(
                        "{} {} {}",
                        "✓".green(),
                        result.request.to_string().bold(),
                        format!("({}: {})", p.strategy, p.location.display()).dimmed()
                    );
                } else {
                    let marker = if *required { "✗".red() } else { "!".yellow() };
                    println!("{} {} not found", marker, result.request.to_string().bold());
                }
            }
            ReportEntry::Policy {
                category,
                candidate,
                applied,
                error,
                ..
            } => {
                if *applied {
                    println!("{} {} = {}", "✓".green(), category.bold(), candidate);
                } else {
                    println!(
                        "{} {} = {} {}",
                        "!".yellow(),
                        category.bold(),
                        candidate,
                        format!("({})", error.as_deref().unwrap_or("not applied")).dimmed()
                    );
                }
            }
        }
    }

    println!("{}{}", "==> ".bold().blue(), outcome_counts(report));
    println!(
        "{}Generator scope: {}",
        "==> ".bold().blue(),
        configured.generator_scope().join(" > ")
    );
}

fn outcome_counts(report: &BootReport) -> String {
    let (dependencies, selections) = report
        .entries
        .iter()
        .fold((0, 0), |(deps, sels), entry| match entry {
            ReportEntry::Dependency { .. } => (deps + 1, sels),
            ReportEntry::Policy { .. } => (deps, sels + 1),
        });
    format!(
        "{} dependency lookups, {} policy selections, {} with warnings",
        dependencies,
        selections,
        report.failures().count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_common::dependency::{DependencyList, DependencyRequest};

    #[test]
    fn counts_entries_not_directives() {
        let dir = tempfile::tempdir().unwrap();
        for lib in ["foo", "bar", "baz"] {
            std::fs::create_dir_all(dir.path().join("lib").join(lib)).unwrap();
        }
        let config = Config::rooted_at(dir.path());
        let mut bootstrap = Bootstrap::new(config, Box::new(TracingSink));
        bootstrap
            .dependencies(&DependencyList::names(["foo", "bar", "baz"]))
            .unwrap();
        bootstrap
            .dependency(&DependencyRequest::new("ghost"), false)
            .unwrap();
        let configured = bootstrap.finish();

        assert_eq!(
            outcome_counts(configured.report()),
            "4 dependency lookups, 0 policy selections, 1 with warnings"
        );
    }
}
