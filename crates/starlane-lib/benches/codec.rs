use criterion::{black_box, criterion_group, criterion_main, Criterion};

use starlane_lib::codec::{
    decode_coordinate, decode_rows, encode_coordinate, encode_rows, IndexedSystem,
};

fn sample_rows() -> Vec<IndexedSystem> {
    vec![
        IndexedSystem {
            id64: 1,
            x: 2.0,
            y: 3.0,
            z: 4.0,
            is_neutron: true,
            is_scoopable: true,
        },
        IndexedSystem {
            id64: 999,
            x: 2234.234,
            y: 3.123,
            z: 4.555,
            is_neutron: false,
            is_scoopable: true,
        },
        IndexedSystem {
            id64: 44,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            is_neutron: false,
            is_scoopable: false,
        },
    ]
}

fn bench_coordinate_key(c: &mut Criterion) {
    c.bench_function("encode_coordinate", |b| {
        b.iter(|| encode_coordinate(black_box(-14_567.238)))
    });

    let key = encode_coordinate(-14_567.238);
    c.bench_function("decode_coordinate", |b| {
        b.iter(|| decode_coordinate(black_box(key)))
    });
}

fn bench_leaf_rows(c: &mut Criterion) {
    let rows = sample_rows();
    c.bench_function("encode_rows", |b| b.iter(|| encode_rows(black_box(&rows))));

    let bytes = encode_rows(&rows);
    c.bench_function("decode_rows", |b| {
        b.iter(|| decode_rows(black_box(&bytes)).expect("valid leaf"))
    });
}

criterion_group!(benches, bench_coordinate_key, bench_leaf_rows);
criterion_main!(benches);
