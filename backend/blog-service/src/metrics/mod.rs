//! Prometheus collectors for the blog and the `/metrics` scrape endpoint.
//!
//! `blog` holds the collectors themselves: listing latency per view, page
//! cache hits, misses and writes, post mutations and follow transitions.
//! They live in the default registry, so the scrape handler only gathers.

use actix_web::HttpResponse;
use prometheus::{Encoder, TextEncoder};

pub mod blog;

/// Register every blog collector up front so a scrape taken before the
/// first request already lists their metric families.
pub fn register_collectors() {
    lazy_static::initialize(&blog::LISTING_DURATION_SECONDS);
    lazy_static::initialize(&blog::PAGE_CACHE_EVENTS);
    lazy_static::initialize(&blog::PAGE_CACHE_WRITE_TOTAL);
    lazy_static::initialize(&blog::POST_MUTATIONS_TOTAL);
    lazy_static::initialize(&blog::FOLLOW_TRANSITIONS);
}

/// GET /metrics
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut body = Vec::new();

    match encoder.encode(&prometheus::gather(), &mut body) {
        Ok(()) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(body),
        Err(err) => {
            tracing::error!("metrics encoding failed: {}", err);
            HttpResponse::InternalServerError().finish()
        }
    }
}
