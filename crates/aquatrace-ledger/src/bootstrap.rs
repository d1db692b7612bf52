//! Seed state installed by `initialize`
//!
//! The EU threshold document, the Traffeyère treatment station and one
//! certified reference record that anchors that station's chain.
use aquatrace_audit::{seal, Provenance};
use aquatrace_core::{
    AuditTrail, ComplianceStatus, LedgerError, Location, QualityLevel, QualityRecord, StationInfo,
    TransactionContext, WaterParameters,
};
use aquatrace_scoring::thresholds::eu_directive_98_83_ec;
use aquatrace_scoring::EU_DIRECTIVE_98_83_EC;

use crate::keys;
use crate::records::{append_to_station_index, put_record, write_json};

pub const REFERENCE_STATION_ID: &str = "TRAFFEYERE_MAIN";
pub const REFERENCE_RECORD_ID: &str = "QR_REFERENCE_001";

const REFERENCE_WITNESSES: [&str; 2] = ["REGULATOR", "CERTBODY"];

pub fn reference_station<C: TransactionContext + ?Sized>(ctx: &C) -> StationInfo {
    StationInfo {
        station_id: REFERENCE_STATION_ID.to_string(),
        name: "Station d'épuration Traffeyère".to_string(),
        location: Location {
            latitude: 45.6581,
            longitude: 5.1694,
            address: "Rue de la Traffeyère, 38120 Saint-Égrève".to_string(),
            region: "Auvergne-Rhône-Alpes".to_string(),
        },
        capacity: 15_000,
        operator_id: "SAUR_FRANCE".to_string(),
        status: "OPERATIONAL".to_string(),
        last_update: ctx.timestamp(),
        certifications: vec!["ISO_14001".to_string(), "ISA_IEC_62443_SL2".to_string()],
    }
}

/// Laboratory sample the reference record certifies
pub fn reference_parameters() -> WaterParameters {
    WaterParameters {
        ph: 7.2,
        turbidity: 0.8,
        chlorine: 0.3,
        bacterial_count: 0,
        heavy_metals: 5.0,
        organic_pollutants: 0.2,
        temperature: 18.5,
        conductivity: 850.0,
        dissolved_oxygen: 8.5,
        alkalinity: 120.0,
        nitrates: 2.5,
        phosphates: 0.1,
    }
}

/// The reference record as certified by the regional laboratory.
///
/// Its score and level are the laboratory's, not recomputed.
pub fn reference_record<C: TransactionContext + ?Sized>(ctx: &C) -> QualityRecord {
    let record = QualityRecord {
        id: REFERENCE_RECORD_ID.to_string(),
        station_id: REFERENCE_STATION_ID.to_string(),
        timestamp: ctx.timestamp(),
        parameters: reference_parameters(),
        quality_level: QualityLevel::Excellent,
        compliance_score: 9_200,
        certifier_id: "CERT_LAB_001".to_string(),
        certifier_org: "LABORATORY_REGIONAL_SAVOIE".to_string(),
        signature: String::new(),
        ipfs_hash: "QmX7Y8Z9...".to_string(),
        compliance_status: ComplianceStatus::Compliant,
        violations: Vec::new(),
        audit_trail: AuditTrail::default(),
        blockchain_hash: String::new(),
        regulatory_reference: EU_DIRECTIVE_98_83_EC.to_string(),
    };
    let provenance = Provenance {
        caller_id: ctx.caller_id(),
        caller_org: "SAUR",
        transaction_id: ctx.transaction_id(),
        created_at: ctx.timestamp(),
    };
    seal(
        record,
        "",
        &provenance,
        REFERENCE_WITNESSES.iter().map(|w| w.to_string()).collect(),
    )
}

/// Write the seed state. Fails with `AlreadyExists` on a second run.
pub fn seed<C: TransactionContext + ?Sized>(ctx: &mut C) -> Result<(), LedgerError> {
    let thresholds_key = keys::thresholds_key(EU_DIRECTIVE_98_83_EC);
    if ctx.contains_key(&thresholds_key)? {
        return Err(LedgerError::AlreadyExists(
            "ledger already initialized".to_string(),
        ));
    }

    let thresholds = eu_directive_98_83_ec(ctx.timestamp());
    write_json(ctx, &thresholds_key, &thresholds)?;

    let station = reference_station(&*ctx);
    write_json(ctx, &keys::station_key(&station.station_id), &station)?;

    let record = reference_record(&*ctx);
    put_record(ctx, &record)?;
    append_to_station_index(ctx, &record.station_id, &record.id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::caller;
    use aquatrace_audit::verify_chain;
    use aquatrace_core::MemoryLedger;

    #[test]
    fn test_reference_record_is_sealed() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin(caller());
        let record = reference_record(&tx);

        assert_eq!(record.audit_trail.previous_hash, "");
        assert_eq!(record.audit_trail.organization, "SAUR");
        assert_eq!(record.audit_trail.witnesses, vec!["REGULATOR", "CERTBODY"]);
        assert!(record.signature.starts_with("SHA256:"));
        assert!(verify_chain(REFERENCE_STATION_ID, &[record]).is_intact());
    }

    #[test]
    fn test_seed_twice_fails() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin(caller());
        seed(&mut tx).unwrap();
        assert!(matches!(seed(&mut tx), Err(LedgerError::AlreadyExists(_))));
    }
}
