use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

lazy_static! {
    /// Duration of listing requests by view (index, group, profile, feed).
    pub static ref LISTING_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "blog_listing_duration_seconds",
        "Listing request duration segmented by view",
        &["view"]
    )
    .expect("failed to register blog_listing_duration_seconds");

    /// Public listing cache events (hit/miss/error/clear).
    pub static ref PAGE_CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "blog_page_cache_events_total",
        "Public listing cache events segmented by outcome",
        &["event"]
    )
    .expect("failed to register blog_page_cache_events_total");

    /// Public listing cache write results (success/error).
    pub static ref PAGE_CACHE_WRITE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_page_cache_write_total",
        "Public listing cache write attempts segmented by outcome",
        &["result"]
    )
    .expect("failed to register blog_page_cache_write_total");

    /// Post mutations by action (create/update/delete).
    pub static ref POST_MUTATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_post_mutations_total",
        "Post mutations segmented by action",
        &["action"]
    )
    .expect("failed to register blog_post_mutations_total");

    /// Follow requests by action and whether the edge actually changed.
    pub static ref FOLLOW_TRANSITIONS: IntCounterVec = register_int_counter_vec!(
        "blog_follow_transitions_total",
        "Follow/unfollow requests segmented by action and outcome",
        &["action", "result"]
    )
    .expect("failed to register blog_follow_transitions_total");
}
