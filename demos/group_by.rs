use crate::utils::sample_csv_path;
use columnar_prep::{AggregateOp, Aggregation, LoaderOptions, Table, aggregate};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = sample_csv_path();

    let table = Table::load_csv(path.as_path(), &LoaderOptions::default())?;

    // Group by site and compute the average height
    let grouped = aggregate(
        &table,
        &["site"],
        &[
            Aggregation::new("height", AggregateOp::Mean),
            Aggregation::new("height", AggregateOp::Count),
        ],
    )?;
    for g in grouped {
        println!("Site {} => {:?}", g.key[0], g.stats);
    }

    Ok(())
}
