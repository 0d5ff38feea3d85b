// gantry/src/cli/categories.rs
use gantry_common::error::Result;
use gantry_common::policy::{Activation, PolicyRegistry, Reselection, Severity};
use gantry_common::Config;
use prettytable::{format, Cell, Row, Table};

pub fn run(config: &Config) -> Result<()> {
    let registry = PolicyRegistry::with_defaults(&config.package_prefix());

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.add_row(Row::new(vec![
        Cell::new("Category").style_spec("b"),
        Cell::new("Candidates").style_spec("b"),
        Cell::new("Once").style_spec("b"),
        Cell::new("On failure").style_spec("b"),
        Cell::new("Layered").style_spec("b"),
        Cell::new("Package").style_spec("b"),
    ]));
    for category in registry.categories() {
        let example = category
            .candidates()
            .first()
            .map(|c| category.package_for(c))
            .unwrap_or_default();
        table.add_row(Row::new(vec![
            Cell::new(category.name()),
            Cell::new(&category.candidates().join(", ")),
            Cell::new(yes_no(
                category.reselection_policy() == Reselection::Forbidden,
            )),
            Cell::new(match category.severity_class() {
                Severity::Hard => "stop",
                Severity::Soft => "warn",
            }),
            Cell::new(yes_no(category.activation_mode() == Activation::Layered)),
            Cell::new(&example),
        ]));
    }
    table.printstd();
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
