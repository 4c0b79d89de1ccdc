use prometheus::{
    opts, register_int_counter_vec_with_registry, register_int_gauge_vec_with_registry, Encoder,
    IntCounterVec, IntGaugeVec, Registry,
};

const METRICS_NAMESPACE: &str = "watchtower_responder";

fn namespaced(name: &str) -> String {
    format!("{}_{}", METRICS_NAMESPACE, name)
}

/// Prometheus instrumentation for the responder engine, labelled by signing
/// account so several responders can share one registry.
#[derive(Clone)]
pub struct ResponderMetrics {
    registry: Registry,
    queue_length: IntGaugeVec,
    broadcasts: IntCounterVec,
    broadcast_failures: IntCounterVec,
    dropped_responses: IntCounterVec,
    consistency_errors: IntCounterVec,
}

impl ResponderMetrics {
    /// Register the responder metrics against the given registry.
    pub fn new(registry: Registry) -> eyre::Result<Self> {
        let queue_length = register_int_gauge_vec_with_registry!(
            opts!(
                namespaced("queue_length"),
                "The number of in-flight transactions currently queued",
            ),
            &["signer"],
            registry.clone()
        )?;
        let broadcasts = register_int_counter_vec_with_registry!(
            opts!(
                namespaced("broadcasts"),
                "The number of transaction broadcasts attempted",
            ),
            &["signer"],
            registry.clone()
        )?;
        let broadcast_failures = register_int_counter_vec_with_registry!(
            opts!(
                namespaced("broadcast_failures"),
                "The number of transaction broadcasts that failed",
            ),
            &["signer"],
            registry.clone()
        )?;
        let dropped_responses = register_int_counter_vec_with_registry!(
            opts!(
                namespaced("dropped_responses"),
                "The number of response obligations dropped because the queue was full",
            ),
            &["signer"],
            registry.clone()
        )?;
        let consistency_errors = register_int_counter_vec_with_registry!(
            opts!(
                namespaced("consistency_errors"),
                "The number of chain events that contradicted the queue's model",
            ),
            &["signer"],
            registry.clone()
        )?;
        Ok(Self {
            registry,
            queue_length,
            broadcasts,
            broadcast_failures,
            dropped_responses,
            consistency_errors,
        })
    }

    pub fn update_queue_length_metric(&self, signer: &str, length: u64) {
        self.queue_length
            .with_label_values(&[signer])
            .set(length as i64);
    }

    pub fn update_broadcasts_metric(&self, signer: &str) {
        self.broadcasts.with_label_values(&[signer]).inc();
    }

    pub fn update_broadcast_failures_metric(&self, signer: &str) {
        self.broadcast_failures.with_label_values(&[signer]).inc();
    }

    pub fn update_dropped_responses_metric(&self, signer: &str) {
        self.dropped_responses.with_label_values(&[signer]).inc();
    }

    pub fn update_consistency_errors_metric(&self, signer: &str) {
        self.consistency_errors.with_label_values(&[signer]).inc();
    }

    /// Encode the registry's current contents in the Prometheus text format.
    pub fn gather(&self) -> prometheus::Result<Vec<u8>> {
        let collected_metrics = self.registry.gather();
        let mut out_buf = Vec::with_capacity(1024 * 16);
        let encoder = prometheus::TextEncoder::new();
        encoder.encode(&collected_metrics, &mut out_buf)?;
        Ok(out_buf)
    }

    #[cfg(test)]
    pub fn dummy_instance() -> Self {
        let registry = Registry::new();
        let instance = Self::new(registry);
        instance.unwrap()
    }
}
