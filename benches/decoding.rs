use std::hint::black_box;

use codeswitch::{
    DecodeMode, Decoder, DecoderConfig, LanguageModel, LanguagePair, Lexicon, NgramModel,
    TrainingConfig,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};

fn synthetic_entries(onsets: &[&str], vowels: &[&str], codas: &[&str]) -> Vec<(String, u64)> {
    let mut entries = Vec::new();
    for (i, onset) in onsets.iter().enumerate() {
        for (j, vowel) in vowels.iter().enumerate() {
            for (k, coda) in codas.iter().enumerate() {
                let count = ((i * 31 + j * 17 + k * 7) % 97 + 1) as u64;
                entries.push((format!("{onset}{vowel}{coda}"), count));
            }
        }
    }
    entries
}

fn ga_entries() -> Vec<(String, u64)> {
    synthetic_entries(
        &["b", "c", "d", "g", "m", "s", "t"],
        &["a", "á", "ea", "é", "io"],
        &["ch", "dh", "il", "nn", "r"],
    )
}

fn en_entries() -> Vec<(String, u64)> {
    synthetic_entries(
        &["th", "wh", "st", "pl", "k", "r", "w"],
        &["a", "e", "i", "o", "ou"],
        &["ck", "ng", "sh", "t", "y"],
    )
}

fn build_pair() -> LanguagePair {
    let cfg = TrainingConfig::builder()
        .order(2)
        .show_progress(false)
        .build()
        .expect("configuration");
    let ga_entries = ga_entries();
    let en_entries = en_entries();
    let ga = LanguageModel::new(
        "ga",
        Lexicon::from_entries(&ga_entries),
        NgramModel::train("ga", &ga_entries, &cfg).expect("training"),
        0.8,
    )
    .expect("model");
    let en = LanguageModel::new(
        "en",
        Lexicon::from_entries(&en_entries),
        NgramModel::train("en", &en_entries, &cfg).expect("training"),
        0.8,
    )
    .expect("model");
    LanguagePair::new(ga, en).expect("pair")
}

fn build_sentences() -> Vec<Vec<String>> {
    let ga: Vec<String> = ga_entries().into_iter().map(|(word, _)| word).collect();
    let en: Vec<String> = en_entries().into_iter().map(|(word, _)| word).collect();
    // Alternate runs of each language with the occasional unseen token.
    (0..256)
        .map(|i| {
            (0..16)
                .map(|j| match (i + j) % 7 {
                    0 | 1 | 2 => ga[(i * 16 + j) % ga.len()].clone(),
                    3 => format!("zz{j}"),
                    _ => en[(i * 13 + j) % en.len()].clone(),
                })
                .collect()
        })
        .collect()
}

fn bench_decoding(c: &mut Criterion) {
    let pair = build_pair();
    let sentences = build_sentences();
    let total_tokens: usize = sentences.iter().map(|tokens| tokens.len()).sum();

    let mut group = c.benchmark_group("decode_batch");
    group.throughput(Throughput::Elements(total_tokens as u64));
    group.sampling_mode(SamplingMode::Flat);
    for mode in [DecodeMode::Viterbi, DecodeMode::Independent] {
        let decoder = Decoder::new(
            DecoderConfig::builder()
                .mode(mode)
                .build()
                .expect("configuration"),
        );
        group.bench_function(BenchmarkId::from_parameter(format!("{mode:?}")), |b| {
            b.iter(|| {
                let labels = decoder.decode_batch(&pair, &sentences).expect("decoding");
                let _ = black_box(labels);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decoding);
criterion_main!(benches);
