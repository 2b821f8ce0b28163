use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hyperway::argpack::{ArgPack, Returned};
use hyperway::graph::Graph;
use hyperway::stepper::{run_to_exhaustion, Stepper};
use hyperway::unit::Unit;
use serde_json::json;

fn add(n: i64) -> Unit {
    Unit::new(move |pos, _kw| {
        let v = pos.first().and_then(|v| v.as_i64()).unwrap_or(0);
        Ok(Returned::Value(json!(v + n)))
    })
}

fn linear_chain_benchmark(c: &mut Criterion) {
    let mut graph = Graph::new();
    let units: Vec<Unit> = (0..64).map(add).collect();
    let start = units[0].clone();
    let sink = units.last().unwrap().clone();
    graph.chain(units);

    c.bench_function("linear chain of 64, run to exhaustion", |b| {
        b.iter(|| {
            let stash = run_to_exhaustion(
                black_box(&graph),
                black_box(start.clone()),
                ArgPack::single(json!(0)),
                None,
            )
            .unwrap();
            black_box(stash.get(&sink.id()));
        });
    });
}

fn branch_and_merge_benchmark(c: &mut Criterion) {
    let mut graph = Graph::new();
    let start = add(0);
    let sink = add(0).with_merge_node(true);
    for n in 0..16 {
        graph.add(start.clone(), add(n), None, None);
    }
    for edge in graph.outgoing(start.id()).to_vec() {
        graph.add(edge.target().clone(), sink.clone(), None, None);
    }

    c.bench_function("fan-out to 16, merge-aware fold", |b| {
        b.iter(|| {
            let mut stepper = Stepper::new(black_box(&graph)).with_merge_aware(true);
            stepper.prepare(start.clone(), ArgPack::single(json!(0)));
            loop {
                if stepper.step().unwrap().is_empty() {
                    break;
                }
            }
            black_box(stepper.stash().get(&sink.id()));
        });
    });
}

criterion_group!(benches, linear_chain_benchmark, branch_and_merge_benchmark);
criterion_main!(benches);
