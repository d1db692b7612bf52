//! Prometheus counters exposed at `/metrics`
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub records_created: IntCounter,
    pub alerts_raised: IntCounter,
    pub commit_conflicts: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let records_created = IntCounter::new(
            "aquatrace_records_created_total",
            "Quality records committed",
        )?;
        let alerts_raised = IntCounter::new(
            "aquatrace_alerts_raised_total",
            "Quality alerts committed alongside a record",
        )?;
        let commit_conflicts = IntCounter::new(
            "aquatrace_commit_conflicts_total",
            "Transactions rejected by optimistic concurrency control",
        )?;
        registry.register(Box::new(records_created.clone()))?;
        registry.register(Box::new(alerts_raised.clone()))?;
        registry.register(Box::new(commit_conflicts.clone()))?;
        Ok(Self {
            registry,
            records_created,
            alerts_raised,
            commit_conflicts,
        })
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_exported() {
        let metrics = Metrics::new().unwrap();
        metrics.records_created.inc();
        let text = metrics.encode().unwrap();
        assert!(text.contains("aquatrace_records_created_total 1"));
        assert!(text.contains("aquatrace_commit_conflicts_total 0"));
    }
}
