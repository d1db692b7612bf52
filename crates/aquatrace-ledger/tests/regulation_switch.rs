//! Contract configured from the fixture YAML, scoring against a published
//! national threshold document.

use aquatrace_core::{CallerIdentity, ComplianceStatus, LedgerError, MemoryLedger};
use aquatrace_ledger::{keys, ContractConfig, NewRecord, QualityContract, REFERENCE_STATION_ID};

fn fixture(relative: &str) -> String {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let path = std::path::Path::new(&manifest_dir)
        .join("../../testing/fixtures")
        .join(relative);
    std::fs::read_to_string(path).unwrap()
}

fn regulator() -> CallerIdentity {
    CallerIdentity::new("regulator", "MinistereSanteMSP")
}

const HIGH_NITRATES: &str = r#"{
    "ph": 7.2, "turbidity": 0.8, "chlorine": 0.3, "bacterialCount": 0,
    "heavyMetals": 5.0, "organicPollutants": 0.2, "temperature": 18.5,
    "conductivity": 850.0, "dissolvedOxygen": 8.5, "alkalinity": 120.0,
    "nitrates": 40.0, "phosphates": 0.1
}"#;

#[test]
fn test_records_scored_against_configured_regulation() {
    let config = ContractConfig::from_yaml(&fixture("config/contract.yaml")).unwrap();
    assert_eq!(config.alert_actions.len(), 3);

    let ledger = MemoryLedger::new();
    let contract = QualityContract::new(config);
    ledger.execute(regulator(), |tx| contract.initialize(tx)).unwrap();

    let yaml = fixture("thresholds/fr_arrete_2007_01_11.yaml");
    let document = aquatrace_scoring::thresholds::from_yaml(&yaml).unwrap();
    ledger
        .execute(regulator(), |tx| contract.publish_thresholds(tx, document))
        .unwrap();

    let input = NewRecord::new("QR_FR_1", REFERENCE_STATION_ID, HIGH_NITRATES)
        .certified_by("CERT", "LAB");
    let record = ledger
        .execute(regulator(), |tx| contract.create_quality_record(tx, input))
        .unwrap()
        .value;

    // nitrates between max and critical: partial credit, no violation
    assert_eq!(record.compliance_score, 9_791);
    assert_eq!(record.compliance_status, ComplianceStatus::Compliant);
    assert_eq!(record.regulatory_reference, "FR_ARRETE_2007_01_11");
}

#[test]
fn test_publishing_archives_superseded_document() {
    let ledger = MemoryLedger::new();
    let contract = QualityContract::default();
    ledger.execute(regulator(), |tx| contract.initialize(tx)).unwrap();

    let tx = ledger.begin(regulator());
    let original = contract.get_thresholds(&tx, "EU_DIRECTIVE_98_83_EC").unwrap();
    drop(tx);

    let mut revised = original.clone();
    revised.last_update = original.last_update + chrono::Duration::days(1);
    revised.max_limits.nitrates = 30.0;
    ledger
        .execute(regulator(), |tx| contract.publish_thresholds(tx, revised))
        .unwrap();

    let archive_key = keys::thresholds_archive_key(
        "EU_DIRECTIVE_98_83_EC",
        &original.last_update.to_rfc3339(),
    );
    let archived: aquatrace_core::ComplianceThresholds =
        serde_json::from_slice(&ledger.committed_value(&archive_key).unwrap()).unwrap();
    assert_eq!(archived, original);

    let tx = ledger.begin(regulator());
    let current = contract.get_thresholds(&tx, "EU_DIRECTIVE_98_83_EC").unwrap();
    assert_eq!(current.max_limits.nitrates, 30.0);
}

#[test]
fn test_publishing_rejects_inverted_bounds() {
    let ledger = MemoryLedger::new();
    let contract = QualityContract::default();
    ledger.execute(regulator(), |tx| contract.initialize(tx)).unwrap();

    let mut broken = aquatrace_scoring::thresholds::eu_default();
    broken.regulation = "BROKEN".to_string();
    broken.min_limits.ph = 10.0;
    let err = ledger
        .execute(regulator(), |tx| contract.publish_thresholds(tx, broken))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}
