use columnar_prep::{
    AggregateOp, Aggregation, CategoryRule, LoaderOptions, RuleSet, Table, aggregate, normalize,
};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::Rng;
use std::hint::black_box;
use std::io::{BufWriter, Write};
use tempfile::NamedTempFile;

const ROWS: usize = 200_000;

fn synthetic_csv() -> NamedTempFile {
    let forms = ["shrub", "Shrub", "Tree", "Tree; Shrub", "herb"];
    let tmp = NamedTempFile::new().unwrap();
    let mut writer = BufWriter::new(tmp.reopen().unwrap());
    writeln!(writer, "id,site,growth_form,height").unwrap();

    let mut rng = rand::rng();
    for i in 0..ROWS {
        let site = rng.random_range(0..8);
        let form = forms[rng.random_range(0..forms.len())];
        let height: f64 = rng.random_range(0.1..30.0);
        writeln!(writer, "{},s{},{},{:.2}", i, site, form, height).unwrap();
    }
    writer.flush().unwrap();
    tmp
}

fn rules() -> RuleSet {
    RuleSet::new(
        vec![
            CategoryRule::new("Shrub", ["shrub", "Shrub"]),
            CategoryRule::new("Tree", ["Tree", "Tree; Shrub"]),
        ],
        "Unknown",
    )
}

fn shaping(c: &mut Criterion) {
    let data = synthetic_csv();
    let options = LoaderOptions::default();

    let mut group = c.benchmark_group("columnar_prep");
    group.sample_size(10);
    group.throughput(Throughput::Elements(ROWS as u64));

    group.bench_function("load_csv", |b| {
        b.iter(|| Table::load_csv(black_box(data.path()), &options).unwrap())
    });

    let table = Table::load_csv(data.path(), &options).unwrap();
    let rules = rules();
    group.bench_function("normalize", |b| {
        b.iter(|| normalize(table.clone(), "growth_form", "form", black_box(&rules)).unwrap())
    });

    let shaped = normalize(table, "growth_form", "form", &rules).unwrap();
    let stats = [
        Aggregation::new("height", AggregateOp::Mean),
        Aggregation::new("height", AggregateOp::Count),
    ];
    group.bench_function("group_by_site_form_mean", |b| {
        b.iter(|| aggregate(black_box(&shaped), &["site", "form"], &stats).unwrap())
    });

    group.finish();
}

criterion_group!(benches, shaping);
criterion_main!(benches);
