use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mpcore::{div_rem, div_rem_scalar, get_div_len};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_words(rng: &mut StdRng, len: usize) -> Vec<u64> {
    let mut v: Vec<u64> = (0..len).map(|_| rng.random()).collect();
    *v.last_mut().unwrap() |= 1 << 63;
    v
}

/// Scalar divisor: 32-bit and 64-bit fast paths
fn bench_div_scalar(c: &mut Criterion) {
    let mut group = c.benchmark_group("div_scalar_1024");
    let mut rng = StdRng::seed_from_u64(1);
    let a = random_words(&mut rng, 1024);
    let mut q = vec![0u64; 1024];
    group.bench_function("divisor_32bit", |bench| {
        bench.iter(|| div_rem_scalar(black_box(&a), black_box(&mut q), black_box(0xfff_ffff)));
    });
    group.bench_function("divisor_64bit", |bench| {
        bench.iter(|| {
            div_rem_scalar(black_box(&a), black_box(&mut q), black_box(0xdead_beef_cafe_babe))
        });
    });
    group.finish();
}

/// Knuth Algorithm D across divisor widths
fn bench_div_knuth(c: &mut Criterion) {
    let mut group = c.benchmark_group("div_knuth");
    group.sample_size(30);
    let mut rng = StdRng::seed_from_u64(2);
    let a = random_words(&mut rng, 2048);
    for dlen in [16usize, 256, 1024] {
        let b = random_words(&mut rng, dlen);
        let mut quot = vec![0u64; get_div_len(2048, dlen)];
        let mut rem = vec![0u64; dlen];
        group.bench_with_input(BenchmarkId::from_parameter(dlen), &dlen, |bench, _| {
            bench.iter(|| {
                div_rem(black_box(&a), black_box(&b), black_box(&mut quot), black_box(&mut rem))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_div_scalar, bench_div_knuth);
criterion_main!(benches);
