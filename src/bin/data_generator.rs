use rand::Rng;
use std::fs::{self, File};
use std::io::{BufWriter, Write};

/// Raw growth-form spellings as they show up in survey sheets.
const FORMS: [&str; 7] = ["shrub", "Shrub", "Tree", "Tree; Shrub", "tree", "Herb", "herb"];
const SITES: [&str; 4] = ["Ridge", "Valley", "Coast", "Plateau"];

fn main() -> std::io::Result<()> {
    let rows: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000_000);
    let path = "data/plants_synthetic.csv";
    fs::create_dir_all("data")?;
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "id,site,growth_form,height,leaf_count")?;

    let mut rng = rand::rng();
    for i in 0..rows {
        let site = SITES[rng.random_range(0..SITES.len())];
        let form = FORMS[rng.random_range(0..FORMS.len())];
        let height: f64 = rng.random_range(0.05..30.0);
        let leaves = rng.random_range(10..5000);
        writeln!(
            writer,
            "{},{},\"{}\",{:.2},{}",
            i, site, form, height, leaves
        )?;
    }
    writer.flush()?;

    println!("Sample CSV generated: {} ({} rows)", path, rows);
    Ok(())
}
