use std::io::Write;

use columnar_prep::{
    AggregateOp, AggregateResult, Aggregation, CategoryRule, LoaderOptions, Pipeline,
    ProcessorError, RuleSet, ShapingConfig, Table, aggregate, normalize,
};
use tempfile::NamedTempFile;

fn write_csv(csv: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(tmp, "{}", csv).unwrap();
    tmp
}

#[test]
fn test_load_normalize_aggregate() {
    let tmp = write_csv(
        "species,growth_form,height\n\
         a,shrub,1.0\n\
         b,Shrub,3.0\n\
         c,Tree,20\n\
         d,Tree; Shrub,10\n\
         e,fern,0.5\n",
    );
    let table = Table::load_csv(tmp.path(), &LoaderOptions::default()).unwrap();

    let rules = RuleSet::new(
        vec![
            CategoryRule::new("Shrub", ["shrub", "Shrub"]),
            CategoryRule::new("Tree", ["Tree", "Tree; Shrub"]),
        ],
        "Unknown",
    );
    let table = normalize(table, "growth_form", "form", &rules).unwrap();

    let groups = aggregate(
        &table,
        &["form"],
        &[
            Aggregation::new("height", AggregateOp::Mean),
            Aggregation::new("height", AggregateOp::Count).with_alias("n"),
        ],
    )
    .unwrap();

    let lookup = |key: &str, stat: &str| {
        groups
            .iter()
            .find(|g| g.key == [key])
            .and_then(|g| g.get(stat))
            .unwrap()
    };
    assert_eq!(lookup("Shrub", "height_mean"), AggregateResult::Float(2.0));
    assert_eq!(lookup("Tree", "height_mean"), AggregateResult::Float(15.0));
    assert_eq!(lookup("Unknown", "n"), AggregateResult::Int(1));

    let total: f64 = groups.iter().map(|g| g.get("n").unwrap().as_f64()).sum();
    assert_eq!(total as usize, table.row_count());
}

#[test]
fn test_pipeline_from_config() {
    let data = write_csv("g,v\nA,10\nA,20\nB,5\n");
    let config = format!(
        r#"
        [source]
        path = "{}"

        [aggregate]
        group_by = ["g"]
        stats = [{{ column = "v", op = "mean" }}, {{ column = "v", op = "count" }}]
        "#,
        data.path().display()
    );
    let config = ShapingConfig::from_str(&config, "inline.toml".as_ref()).unwrap();

    let shaped = Pipeline::run(&config).unwrap();
    assert_eq!(shaped.table.row_count(), 3);
    assert_eq!(shaped.summaries.len(), 2);
    let a = &shaped.summaries[0];
    assert_eq!(a.key, ["A"]);
    assert_eq!(a.get("v_mean"), Some(AggregateResult::Float(15.0)));
    assert_eq!(a.get("v_count"), Some(AggregateResult::Int(2)));
}

#[test]
fn test_pipeline_surfaces_missing_column() {
    let data = write_csv("g,v\nA,1\n");
    let config = format!(
        r#"
        [source]
        path = "{}"

        [[normalize]]
        column = "growth_form"
        output = "form"
        "#,
        data.path().display()
    );
    let config = ShapingConfig::from_str(&config, "inline.toml".as_ref()).unwrap();

    let err = Pipeline::run(&config).unwrap_err();
    assert!(matches!(err, ProcessorError::ColumnNotFound(c) if c == "growth_form"));
}

#[test]
fn test_bundled_sample_pipeline() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/shaping.toml");
    let config = ShapingConfig::from_file(&path).unwrap();
    let shaped = Pipeline::run(&config).unwrap();

    let labels: Vec<&str> = shaped.summaries.iter().map(|g| g.key[0].as_str()).collect();
    assert_eq!(labels, ["Shrub", "Tree", "Unknown"]);
    let counted: i64 = shaped
        .summaries
        .iter()
        .map(|g| match g.get("n") {
            Some(AggregateResult::Int(n)) => n,
            other => panic!("unexpected {other:?}"),
        })
        .sum();
    assert_eq!(counted as usize, shaped.table.row_count());
}
