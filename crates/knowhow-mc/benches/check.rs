//! Benchmark for the knowing-how check on a chain-of-rooms model.

use criterion::{criterion_group, criterion_main, Criterion};
use knowhow_mc::{CheckConfig, Lts, ModelChecker};
use knowhow_syntax::parse;

/// A corridor of `n` rooms plus a trap room: `step` moves forward, `back`
/// returns to the start from anywhere past it, and the trap has no exits.
fn corridor(n: u32) -> Lts<u32, &'static str> {
    let mut lts = Lts::new();
    lts.add_state(0, ["start"]);
    for room in 1..n - 1 {
        lts.add_state(room, ["mid"]);
    }
    lts.add_state(n - 1, ["goal"]);
    lts.add_state(n, ["trap"]);

    for room in 0..n - 1 {
        lts.add_transition(room, room + 1, "step");
    }
    for room in 1..n {
        lts.add_transition(room, 0, "back");
    }
    lts
}

fn bench_check(c: &mut Criterion) {
    let lts = corridor(12);
    let holds = parse("kh(start, goal)").expect("parse");
    // only the empty plan is executable from the trap, so no shared plan
    // can reach the goal
    let fails = parse("kh(start or trap, goal)").expect("parse");

    c.bench_function("check_kh_corridor_holds", |b| {
        b.iter(|| {
            let mc = ModelChecker::new(&lts, 0, CheckConfig::default()).expect("checker");
            assert!(mc.check(&holds).expect("check"));
        })
    });

    c.bench_function("check_kh_corridor_fails", |b| {
        b.iter(|| {
            let mc = ModelChecker::new(&lts, 0, CheckConfig::default()).expect("checker");
            assert!(!mc.check(&fails).expect("check"));
        })
    });

    c.bench_function("check_kh_corridor_minimized", |b| {
        b.iter(|| {
            let mc = ModelChecker::new(&lts, 0, CheckConfig { minimize: true }).expect("checker");
            assert!(mc.check(&holds).expect("check"));
        })
    });
}

criterion_group!(benches, bench_check);
criterion_main!(benches);
