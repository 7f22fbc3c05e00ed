use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use zk_election::{CommitmentRegistry, Fr};

fn random_leaves(count: usize) -> Vec<Fr> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    (0..count).map(|_| Fr::from_u64(rng.gen())).collect()
}

fn registry_insert(c: &mut Criterion) {
    let leaves = random_leaves(64);

    c.bench_function("registry_insert_depth20", |b| {
        b.iter_batched(
            || CommitmentRegistry::new(20).unwrap(),
            |mut registry| {
                for leaf in &leaves {
                    registry.insert(*leaf).unwrap();
                }
                registry.current_root()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, registry_insert);
criterion_main!(benches);
