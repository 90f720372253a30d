use crate::utils::sample_csv_path;
use columnar_prep::{CategoryRule, LoaderOptions, RuleSet, Table, normalize};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = sample_csv_path();
    let table = Table::load_csv(path.as_path(), &LoaderOptions::default())?;

    let rules = RuleSet::new(
        vec![
            CategoryRule::new("Shrub", ["shrub", "Shrub"]),
            CategoryRule::new("Tree", ["Tree", "Tree; Shrub"]),
        ],
        "Unknown",
    );
    let table = normalize(table, "growth_form", "form", &rules)?;

    for record in table.records() {
        println!(
            "{:<20} {:<12} -> {}",
            record.get("species").map(|v| v.to_string()).unwrap_or_default(),
            record.get("growth_form").map(|v| v.to_string()).unwrap_or_default(),
            record.get("form").map(|v| v.to_string()).unwrap_or_default(),
        );
    }

    Ok(())
}
