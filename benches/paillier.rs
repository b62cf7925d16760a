use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use num_bigint::BigInt;
use tally_paillier::{
    generate_key_pair,
    shamir::{generate_shares, reconstruct_secret},
    ShamirParameters, VoteEncryption,
};

fn bench_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt_vote");

    for bits in [512, 1024, 2048] {
        let (pk, _) = generate_key_pair(bits).unwrap().into_parts();
        let votes = VoteEncryption::new(pk);
        let one = BigInt::from(1);

        group.bench_with_input(BenchmarkId::from_parameter(bits), &votes, |b, votes| {
            b.iter(|| votes.encrypt_vote(&one).unwrap())
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_votes");
    let (pk, _) = generate_key_pair(1024).unwrap().into_parts();
    let votes = VoteEncryption::new(pk);

    for size in [10, 100, 1000] {
        let ballots: Vec<_> = (0..size)
            .map(|i| votes.encrypt_vote(&BigInt::from(i % 2)).unwrap())
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &ballots, |b, ballots| {
            b.iter(|| votes.aggregate_votes(ballots).unwrap())
        });
    }
    group.finish();
}

fn bench_sharing(c: &mut Criterion) {
    let mut group = c.benchmark_group("shamir");
    let (_, sk) = generate_key_pair(1024).unwrap().into_parts();

    for (total, threshold) in [(5, 3), (15, 8), (50, 26)] {
        let params = ShamirParameters::generate(total, threshold, 1088).unwrap();
        let shares = generate_shares(sk.lambda(), &params).unwrap();

        group.bench_with_input(
            BenchmarkId::new("generate", total),
            &params,
            |b, params| b.iter(|| generate_shares(sk.lambda(), params).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("reconstruct", total),
            &shares,
            |b, shares| b.iter(|| reconstruct_secret(shares, &params).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_encrypt, bench_aggregate, bench_sharing);
criterion_main!(benches);
