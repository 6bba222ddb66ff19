use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use axum::{extract::Request, middleware::Next, response::Response};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Registry, TextEncoder};

/// Upper bound on distinct `code` label values; later codes share [`OVERFLOW_LABEL`].
pub const MAX_ERROR_CODES: usize = 40;
pub const OVERFLOW_LABEL: &str = "other";

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static HTTP_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let v = IntCounterVec::new(
        prometheus::Opts::new("http_errors_total", "Count of HTTP error responses emitted (status >= 400)"),
        &["service", "code", "status"],
    ).expect("valid metric definition");
    REGISTRY.register(Box::new(v.clone())).ok();
    v
});

static DISTINCT_CODES: Lazy<IntGauge> = Lazy::new(|| {
    let g = IntGauge::new("http_error_codes_distinct", "Distinct error codes currently tracked as labels").expect("valid metric definition");
    REGISTRY.register(Box::new(g.clone())).ok();
    g
});

static CODE_OVERFLOW: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("http_error_code_overflow_total", "Error responses folded into the overflow code label").expect("valid metric definition");
    REGISTRY.register(Box::new(c.clone())).ok();
    c
});

static SEEN_CODES: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

fn code_label(code: &str) -> String {
    let mut seen = SEEN_CODES.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if seen.contains(code) {
        return code.to_string();
    }
    if seen.len() >= MAX_ERROR_CODES {
        CODE_OVERFLOW.inc();
        return OVERFLOW_LABEL.to_string();
    }
    seen.insert(code.to_string());
    DISTINCT_CODES.set(seen.len() as i64);
    code.to_string()
}

pub fn record_error(service: &str, code: &str, status: u16) {
    let label = code_label(code);
    HTTP_ERRORS_TOTAL.with_label_values(&[service, &label, &status.to_string()]).inc();
}

type ResponseFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Middleware for `axum::middleware::from_fn` counting error responses by the
/// `X-Error-Code` header the error types set.
pub fn http_error_metrics_layer(
    service: &'static str,
) -> impl Fn(Request, Next) -> ResponseFuture + Clone + Send + Sync + 'static {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let resp = next.run(req).await;
            let status = resp.status();
            if status.is_client_error() || status.is_server_error() {
                let code = resp
                    .headers()
                    .get("X-Error-Code")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("http_{}", status.as_u16()));
                record_error(service, &code, status.as_u16());
            }
            resp
        })
    }
}

/// Prometheus text exposition of [`REGISTRY`].
pub fn gather() -> String {
    Lazy::force(&HTTP_ERRORS_TOTAL);
    Lazy::force(&DISTINCT_CODES);
    Lazy::force(&CODE_OVERFLOW);
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&REGISTRY.gather(), &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
pub fn simulate_error_code(code: &str) {
    code_label(code);
}

#[cfg(test)]
pub fn distinct_gauge() -> i64 {
    DISTINCT_CODES.get()
}

#[cfg(test)]
pub fn overflow_count() -> u64 {
    CODE_OVERFLOW.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_codes_are_capped() {
        for i in 0..(MAX_ERROR_CODES + 10) {
            simulate_error_code(&format!("unit_code_{i}"));
        }
        assert!(distinct_gauge() as usize <= MAX_ERROR_CODES);
        assert!(overflow_count() > 0);
        assert_eq!(code_label("unit_code_0"), "unit_code_0");
    }

    #[test]
    fn gather_exposes_error_counter() {
        record_error("unit-svc", "not_found", 404);
        let text = gather();
        assert!(text.contains("http_errors_total"), "{text}");
    }
}
