use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tripswitch::CircuitBreaker;

fn call_closed(c: &mut Criterion) {
    let circuit_breaker: CircuitBreaker<usize, usize> = CircuitBreaker::default();
    let mut n = 0;

    c.bench_function("call_closed", |b| {
        b.iter(|| {
            let _ = circuit_breaker.call(|| dangerous_call(black_box(n)));
            n += 1;
        })
    });
}

fn call_rejected(c: &mut Criterion) {
    let circuit_breaker: CircuitBreaker<usize, usize> =
        CircuitBreaker::builder().failure_threshold(0).build();
    circuit_breaker.record_failure();

    c.bench_function("call_rejected", |b| {
        b.iter(|| {
            assert!(circuit_breaker.call(|| Ok(black_box(1))).is_err());
        })
    });
}

fn state_derivation(c: &mut Criterion) {
    let circuit_breaker: CircuitBreaker<usize, usize> = CircuitBreaker::default();

    c.bench_function("state_derivation", |b| {
        b.iter(|| black_box(circuit_breaker.state()))
    });
}

fn dangerous_call(n: usize) -> Result<usize, usize> {
    if n % 5 == 0 {
        Err(n)
    } else {
        Ok(n)
    }
}

criterion_group!(benches, call_closed, call_rejected, state_derivation);
criterion_main!(benches);
