//! Benchmarks for shortcut compilation, decoding and registration
//!
//! Run with: cargo bench keymap

use mnemokeys::host::{Handler, MemoryHost};
use mnemokeys::keymap::{compile, decode, default_shortcuts, RawEvent, Registrar};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

const NAMES: &[&str] = &[
    "enter_yank",
    "open_file",
    "search_just_kill",
    "enter__yank",
    "EY",
    "as_indented",
];

#[divan::bench]
fn compile_names() {
    for name in NAMES {
        divan::black_box(compile(divan::black_box(name)).ok());
    }
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn decode_codes(n: i64) {
    let base = 134_217_825;
    for i in 0..n {
        divan::black_box(decode(&RawEvent::Code(base + i % 26)));
    }
}

#[divan::bench]
fn register_defaults(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| (MemoryHost::new(), Registrar::new(), default_shortcuts()))
        .bench_values(|(mut host, mut registrar, entries)| {
            let report =
                registrar.define_all(&mut host, entries, std::path::Path::new("shortcuts.yaml"));
            divan::black_box(report.outcomes.len())
        });
}

#[divan::bench]
fn register_one(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| (MemoryHost::new(), Registrar::new()))
        .bench_values(|(mut host, mut registrar)| {
            divan::black_box(registrar.register(&mut host, "enter_yank", Handler::command("yank")))
        });
}
