use bitflake::{Decoder, Encoder, Preset, TimeSource};
use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn now_ms(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated or decoded per benchmark iteration.
const TOTAL_IDS: usize = 4096;

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode/twitter");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        let time = FixedMockTime {
            millis: 1_700_000_000_000,
        };
        b.iter(|| {
            let preset = Preset::Twitter;
            let encoder = Encoder::new(preset.layout(), preset.clock(), 1, 2)
                .expect("node ids fit the preset");
            for _ in 0..TOTAL_IDS {
                black_box(encoder.encode(&time).expect("sequence cannot exhaust the field"));
            }
        });
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode/twitter");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let preset = Preset::Twitter;
    let encoder =
        Encoder::new(preset.layout(), preset.clock(), 1, 2).expect("node ids fit the preset");
    let ids: Vec<String> = encoder
        .encode_batch_at(TOTAL_IDS, 1_700_000_000_000)
        .expect("batch fits two ticks")
        .into_iter()
        .map(|id| id.to_string())
        .collect();

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        let decoder = Decoder::new(preset.layout(), preset.clock());
        b.iter(|| {
            for text in &ids {
                black_box(decoder.decode_text(text).expect("encoder output decodes"));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
