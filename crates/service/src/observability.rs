use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static STORE_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_store_mutations_total",
        "Committed in-memory mutations per collection",
        &["collection", "kind"]
    )
    .expect("register store_mutations_total")
});

pub static PERSISTENCE_WRITES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_persistence_writes_total",
        "Successful whole-collection writes",
        &["collection"]
    )
    .expect("register persistence_writes_total")
});

pub static PERSISTENCE_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "storefront_persistence_failures_total",
        "Failed whole-collection writes",
        &["collection"]
    )
    .expect("register persistence_failures_total")
});

pub fn record_mutation(collection: &str, kind: &str) {
    STORE_MUTATIONS_TOTAL.with_label_values(&[collection, kind]).inc();
}

pub fn record_write(collection: &str) {
    PERSISTENCE_WRITES_TOTAL.with_label_values(&[collection]).inc();
}

pub fn record_write_failure(collection: &str) {
    PERSISTENCE_FAILURES_TOTAL.with_label_values(&[collection]).inc();
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather_text() -> String {
    // touch the lazies so the families show up even before first use
    Lazy::force(&STORE_MUTATIONS_TOTAL);
    Lazy::force(&PERSISTENCE_WRITES_TOTAL);
    Lazy::force(&PERSISTENCE_FAILURES_TOTAL);

    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&prometheus::gather(), &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_text_output() {
        record_mutation("metrics_test", "created");
        record_write("metrics_test");
        let text = gather_text();
        assert!(text.contains("storefront_store_mutations_total"));
        assert!(text.contains("storefront_persistence_writes_total"));
        assert!(text.contains("metrics_test"));
    }
}
