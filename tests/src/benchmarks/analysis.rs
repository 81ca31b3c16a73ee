//! # Analysis Latency
//!
//! The engine re-tokenizes the whole buffer on every request, so latency
//! grows with file size.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use jedihttp::{AnalysisRequest, Analyzer, LexicalAnalyzer};

/// A module of `functions` small functions followed by a call to the last one
fn synthetic_module(functions: usize) -> (String, usize) {
    let mut source = String::from("import os\n\n");
    for i in 0..functions {
        source.push_str(&format!(
            "def function_{i}(a, b=1):\n    \"\"\"Doc for {i}.\"\"\"\n    value_{i} = a + b\n    return value_{i}\n\n"
        ));
    }
    source.push_str(&format!("result = function_{}(1)\nfunc", functions.saturating_sub(1)));
    let last_line = source.split('\n').count();
    (source, last_line)
}

pub fn bench_completions(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis/completions");

    for functions in [10, 100, 1000] {
        let (source, line) = synthetic_module(functions);
        let request = AnalysisRequest {
            source,
            line,
            col: 4,
            source_path: "/tmp/bench.py".to_string(),
        };
        group.throughput(Throughput::Bytes(request.source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(functions), &request, |b, request| {
            b.iter(|| black_box(LexicalAnalyzer.completions(request)))
        });
    }

    group.finish();
}

pub fn bench_goto_definition(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis/gotodefinition");

    for functions in [10, 100, 1000] {
        let (source, line) = synthetic_module(functions);
        let request = AnalysisRequest {
            source,
            line: line - 1,
            col: 10,
            source_path: "/tmp/bench.py".to_string(),
        };
        group.bench_with_input(BenchmarkId::from_parameter(functions), &request, |b, request| {
            b.iter(|| black_box(LexicalAnalyzer.goto_definitions(request)))
        });
    }

    group.finish();
}
