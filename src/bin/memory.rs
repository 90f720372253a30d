use std::path::Path;

use columnar_prep::{
    AggregateOp, Aggregation, CategoryRule, LoaderOptions, RuleSet, Table, aggregate, normalize,
};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _profiler = dhat::Profiler::new_heap();

    // Produced by the data_generator binary
    let path = Path::new("data/plants_synthetic.csv");
    let table = Table::load_csv(path, &LoaderOptions::default())?;

    let rules = RuleSet::new(
        vec![
            CategoryRule::new("Shrub", ["shrub"]),
            CategoryRule::new("Tree", ["tree", "Tree; Shrub"]),
            CategoryRule::new("Herb", ["herb"]),
        ],
        "Unknown",
    );
    let table = normalize(table, "growth_form", "form", &rules)?;
    let _groups = aggregate(
        &table,
        &["site", "form"],
        &[Aggregation::new("height", AggregateOp::Mean)],
    )?;

    println!("Memory benchmark finished. See dhat-heap.json for details");
    Ok(())
}
