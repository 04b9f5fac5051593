use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use ontc::ontology::{Database, ResourceId};
use ontc::{exec, parse, settings::Settings};

// ------------- Fixtures -------------
fn populated(resources: usize, facts: usize) -> (Database, ResourceId, Vec<ResourceId>) {
    let mut db = Database::new();
    let (relation, _) = db.keep_resource("isPreceededBy");
    let ids: Vec<ResourceId> = (0..resources)
        .map(|i| db.keep_resource(&format!("resource{}", i)).0)
        .collect();
    for i in 0..facts {
        let mut fact = db.create_fact(relation).unwrap();
        db.add_argument(&mut fact, ids[i % resources]).unwrap();
        db.add_argument(&mut fact, ids[(i * 7 + 3) % resources]).unwrap();
        db.add_fact(fact).unwrap();
    }
    (db, relation, ids)
}

fn program(functions: usize) -> String {
    let mut source = String::new();
    for i in 0..functions {
        source.push_str(&format!("fn f{}() {{ print(\"\"); }}\n", i));
    }
    source.push_str("fn main() { println(\"main\"); }\n");
    for i in 0..functions {
        source.push_str(&format!("main isPreceededBy f{}.\n", i));
    }
    source
}

// ------------- Benchmarks -------------
fn store_benchmark(c: &mut Criterion) {
    let (db, relation, ids) = populated(1_000, 10_000);
    c.bench_function("find_resource", |b| {
        b.iter(|| db.find_resource(black_box("resource512")))
    });
    c.bench_function("query_triple subject", |b| {
        b.iter(|| db.query_triple(relation, Some(black_box(ids[17])), None))
    });
    c.bench_function("query_triple object", |b| {
        b.iter(|| db.query_triple(relation, None, Some(black_box(ids[17]))))
    });
    let mut probe = db.create_fact(relation).unwrap();
    db.add_argument(&mut probe, ids[999]).unwrap();
    db.add_argument(&mut probe, ids[(999 * 7 + 3) % 1_000]).unwrap();
    c.bench_function("check", |b| b.iter(|| db.check(black_box(&probe))));
}

fn program_benchmark(c: &mut Criterion) {
    let source = program(200);
    c.bench_function("parse", |b| b.iter(|| parse::parse(black_box(&source))));
    let settings = Settings::default();
    c.bench_function("exec_program", |b| {
        b.iter(|| {
            let mut out = Vec::new();
            exec::exec_program(black_box(&source), &settings, &mut out)
        })
    });
}

criterion_group!(benches, store_benchmark, program_benchmark);
criterion_main!(benches);
