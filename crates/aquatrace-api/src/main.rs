//! Binary entrypoint for the aquatrace API server.
use anyhow::Context;
use aquatrace_api::{metrics::Metrics, run, AppState};
use aquatrace_core::{CallerIdentity, MemoryLedger};
use aquatrace_ledger::{ContractConfig, QualityContract};
use tracing::info;

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config() -> anyhow::Result<ContractConfig> {
    match std::env::var("AQUATRACE_CONFIG") {
        Ok(path) => {
            let yaml = std::fs::read_to_string(&path)
                .with_context(|| format!("reading contract config {}", path))?;
            Ok(ContractConfig::from_yaml(&yaml)?)
        }
        Err(_) => Ok(ContractConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    // Default listen address can be overridden with AQUATRACE_ADDR
    let addr = std::env::var("AQUATRACE_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    let config = load_config()?;
    info!(regulation = %config.regulation, "contract configured");

    let ledger = MemoryLedger::new();
    let contract = QualityContract::new(config);
    let operator = CallerIdentity::new("aquatrace-bootstrap", "SAUR");

    ledger
        .execute(operator.clone(), |tx| contract.initialize(tx))
        .context("initializing ledger")?;

    if let Ok(path) = std::env::var("AQUATRACE_THRESHOLDS") {
        let yaml = std::fs::read_to_string(&path)
            .with_context(|| format!("reading thresholds {}", path))?;
        let document = aquatrace_scoring::thresholds::from_yaml(&yaml)?;
        let regulation = document.regulation.clone();
        ledger
            .execute(operator, |tx| contract.publish_thresholds(tx, document))
            .with_context(|| format!("publishing thresholds {}", regulation))?;
    }

    let metrics = Metrics::new()?;
    run(&addr, AppState::new(ledger, contract, metrics)).await
}
