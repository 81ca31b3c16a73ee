//! # JediHTTP Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | `hmac/digest` | Raw HMAC-SHA256 throughput |
//! | `hmac/request` | Request signing and verification (4 HMACs) |
//! | `hmac/response` | Response signing |
//! | `hmac/compare` | Constant-time digest comparison |
//! | `analysis/*` | Engine latency against file size |

use criterion::{criterion_group, criterion_main};
use jedihttp_tests::benchmarks::{analysis, hmac};

criterion_group!(
    hmac_benches,
    hmac::bench_digest,
    hmac::bench_request_verification,
    hmac::bench_response_signing,
    hmac::bench_constant_time_compare,
);

criterion_group!(
    analysis_benches,
    analysis::bench_completions,
    analysis::bench_goto_definition,
);

criterion_main!(hmac_benches, analysis_benches);
