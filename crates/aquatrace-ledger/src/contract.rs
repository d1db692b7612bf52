//! Quality contract: the operations a host dispatches into
//!
//! Every operation takes the host context explicitly. Write operations
//! either return `Ok` and leave their writes for the host to commit, or
//! return `Err` and expect the host to discard the whole unit of work.
use aquatrace_audit::{seal, verify_chain, ChainReport, Provenance};
use aquatrace_core::{
    AuditTrail, ComplianceThresholds, LedgerError, QualityAlert, QualityRecord, StateStore,
    StationInfo, TransactionContext, WaterParameters,
};
use aquatrace_scoring::{evaluate_json, score, thresholds, ScoreOutcome};
use tracing::{debug, info};

use crate::alerts;
use crate::bootstrap;
use crate::config::ContractConfig;
use crate::events::{self, RecordCreated, RECORD_CREATED_EVENT};
use crate::keys::{self, validate_identifier};
use crate::query;
use crate::records::{self, read_json, write_json};

/// Input of [`QualityContract::create_quality_record`]
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub id: String,
    pub station_id: String,
    /// JSON measurement payload, all 12 fields
    pub parameters: String,
    pub certifier_id: String,
    pub certifier_org: String,
    /// Off-chain content pointer, may be empty
    pub ipfs_hash: String,
}

impl NewRecord {
    pub fn new(
        id: impl Into<String>,
        station_id: impl Into<String>,
        parameters: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            station_id: station_id.into(),
            parameters: parameters.into(),
            ..Self::default()
        }
    }

    pub fn certified_by(
        mut self,
        certifier_id: impl Into<String>,
        certifier_org: impl Into<String>,
    ) -> Self {
        self.certifier_id = certifier_id.into();
        self.certifier_org = certifier_org.into();
        self
    }

    pub fn with_ipfs_hash(mut self, ipfs_hash: impl Into<String>) -> Self {
        self.ipfs_hash = ipfs_hash.into();
        self
    }

    fn validate(&self) -> Result<(), LedgerError> {
        validate_identifier("record ID", &self.id)?;
        validate_identifier("station ID", &self.station_id)?;
        if self.parameters.trim().is_empty() {
            return Err(LedgerError::Validation("parameters are required".to_string()));
        }
        if self.certifier_id.trim().is_empty() {
            return Err(LedgerError::Validation("certifier ID is required".to_string()));
        }
        if self.certifier_org.trim().is_empty() {
            return Err(LedgerError::Validation(
                "certifier organization is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Water quality certification contract
#[derive(Debug, Clone, Default)]
pub struct QualityContract {
    config: ContractConfig,
}

impl QualityContract {
    pub fn new(config: ContractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Seed thresholds, the reference station and its reference record.
    pub fn initialize<C>(&self, ctx: &mut C) -> Result<(), LedgerError>
    where
        C: TransactionContext + ?Sized,
    {
        bootstrap::seed(ctx)?;
        info!(
            station_id = bootstrap::REFERENCE_STATION_ID,
            record_id = bootstrap::REFERENCE_RECORD_ID,
            "ledger initialized"
        );
        Ok(())
    }

    /// Score, seal and store a new certified record.
    ///
    /// The station must already be registered.
    pub fn create_quality_record<C>(
        &self,
        ctx: &mut C,
        input: NewRecord,
    ) -> Result<QualityRecord, LedgerError>
    where
        C: TransactionContext + ?Sized,
    {
        input.validate()?;
        if records::record_exists(&*ctx, &input.id)? {
            return Err(LedgerError::AlreadyExists(format!(
                "record {} already exists",
                input.id
            )));
        }

        let parameters = WaterParameters::parse(&input.parameters)?;
        if !ctx.contains_key(&keys::station_key(&input.station_id))? {
            return Err(LedgerError::NotFound(format!(
                "station {} not found",
                input.station_id
            )));
        }
        let thresholds = self.load_thresholds(&*ctx, &self.config.regulation)?;
        let outcome = score(&parameters, &thresholds);
        let previous_hash = records::last_chain_hash(&*ctx, &input.station_id)?;

        let record = QualityRecord {
            id: input.id,
            station_id: input.station_id,
            timestamp: ctx.timestamp(),
            parameters,
            quality_level: outcome.quality_level,
            compliance_score: outcome.compliance_score,
            certifier_id: input.certifier_id,
            certifier_org: input.certifier_org,
            signature: String::new(),
            ipfs_hash: input.ipfs_hash,
            compliance_status: outcome.compliance_status,
            violations: outcome.violations,
            audit_trail: AuditTrail::default(),
            blockchain_hash: String::new(),
            regulatory_reference: thresholds.regulation,
        };
        let record = {
            let provenance = Provenance {
                caller_id: ctx.caller_id(),
                caller_org: ctx.caller_org(),
                transaction_id: ctx.transaction_id(),
                created_at: ctx.timestamp(),
            };
            let witnesses = vec![provenance.caller_org.to_string()];
            seal(record, &previous_hash, &provenance, witnesses)
        };

        records::put_record(ctx, &record)?;
        let position = records::append_to_station_index(ctx, &record.station_id, &record.id)?;
        events::emit(ctx, RECORD_CREATED_EVENT, &RecordCreated::from(&record))?;

        let alert = alerts::maybe_emit_alert(ctx, &record, &self.config);

        info!(
            record_id = %record.id,
            station_id = %record.station_id,
            quality_level = %record.quality_level,
            compliance_score = record.compliance_score,
            chain_position = position,
            alert = alert.is_some(),
            "quality record created"
        );
        Ok(record)
    }

    /// Score a measurement payload without writing anything.
    pub fn analyze_quality<S>(
        &self,
        store: &S,
        parameters: &str,
    ) -> Result<ScoreOutcome, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        let thresholds = self.load_thresholds(store, &self.config.regulation)?;
        evaluate_json(parameters, &thresholds)
    }

    pub fn get_quality_record<S>(
        &self,
        store: &S,
        record_id: &str,
    ) -> Result<QualityRecord, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        validate_identifier("record ID", record_id)?;
        records::get_record(store, record_id)
    }

    pub fn get_station_records<S>(
        &self,
        store: &S,
        station_id: &str,
    ) -> Result<Vec<QualityRecord>, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        validate_identifier("station ID", station_id)?;
        query::station_records(store, station_id)
    }

    pub fn get_all_records<S>(&self, store: &S) -> Result<Vec<QualityRecord>, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        query::scan_all_records(store)
    }

    pub fn record_exists<S>(&self, store: &S, record_id: &str) -> Result<bool, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        validate_identifier("record ID", record_id)?;
        records::record_exists(store, record_id)
    }

    pub fn station_exists<S>(&self, store: &S, station_id: &str) -> Result<bool, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        validate_identifier("station ID", station_id)?;
        Ok(store.contains_key(&keys::station_key(station_id))?)
    }

    pub fn get_station<S>(&self, store: &S, station_id: &str) -> Result<StationInfo, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        validate_identifier("station ID", station_id)?;
        read_json(store, &keys::station_key(station_id))?
            .ok_or_else(|| LedgerError::NotFound(format!("station {} does not exist", station_id)))
    }

    pub fn register_station<C>(
        &self,
        ctx: &mut C,
        station: StationInfo,
    ) -> Result<StationInfo, LedgerError>
    where
        C: TransactionContext + ?Sized,
    {
        validate_identifier("station ID", &station.station_id)?;
        if station.name.trim().is_empty() {
            return Err(LedgerError::Validation("station name is required".to_string()));
        }
        let key = keys::station_key(&station.station_id);
        if ctx.contains_key(&key)? {
            return Err(LedgerError::AlreadyExists(format!(
                "station {} already exists",
                station.station_id
            )));
        }
        write_json(ctx, &key, &station)?;
        info!(
            station_id = %station.station_id,
            operator_id = %station.operator_id,
            "station registered"
        );
        Ok(station)
    }

    /// Supersede the current document for a regulation.
    ///
    /// The replaced document is archived under its `lastUpdate`.
    pub fn publish_thresholds<C>(
        &self,
        ctx: &mut C,
        document: ComplianceThresholds,
    ) -> Result<(), LedgerError>
    where
        C: TransactionContext + ?Sized,
    {
        validate_identifier("regulation", &document.regulation)?;
        thresholds::validate(&document).map_err(|e| LedgerError::Validation(e.to_string()))?;

        let key = keys::thresholds_key(&document.regulation);
        if let Some(current) = read_json::<_, ComplianceThresholds>(&*ctx, &key)? {
            if document.last_update <= current.last_update {
                return Err(LedgerError::Validation(format!(
                    "thresholds {} must be newer than {}",
                    document.regulation,
                    current.last_update.to_rfc3339()
                )));
            }
            let archive = keys::thresholds_archive_key(
                &current.regulation,
                &current.last_update.to_rfc3339(),
            );
            write_json(ctx, &archive, &current)?;
            debug!(archive_key = %archive, "archived superseded thresholds");
        }

        write_json(ctx, &key, &document)?;
        info!(
            regulation = %document.regulation,
            authority = %document.authority,
            last_update = %document.last_update.to_rfc3339(),
            "thresholds published"
        );
        Ok(())
    }

    pub fn get_thresholds<S>(
        &self,
        store: &S,
        regulation: &str,
    ) -> Result<ComplianceThresholds, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        validate_identifier("regulation", regulation)?;
        self.load_thresholds(store, regulation)
    }

    pub fn get_station_alerts<S>(
        &self,
        store: &S,
        station_id: &str,
    ) -> Result<Vec<QualityAlert>, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        validate_identifier("station ID", station_id)?;
        alerts::station_alerts(store, station_id)
    }

    /// Walk a station's chain in index order.
    ///
    /// Unlike listings, a record missing from the store is an error here.
    pub fn verify_station_chain<S>(
        &self,
        store: &S,
        station_id: &str,
    ) -> Result<ChainReport, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        validate_identifier("station ID", station_id)?;
        let chain = records::station_index(store, station_id)?
            .iter()
            .map(|id| records::get_record(store, id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(verify_chain(station_id, &chain))
    }

    fn load_thresholds<S>(
        &self,
        store: &S,
        regulation: &str,
    ) -> Result<ComplianceThresholds, LedgerError>
    where
        S: StateStore + ?Sized,
    {
        read_json(store, &keys::thresholds_key(regulation))?
            .ok_or_else(|| LedgerError::ThresholdsNotFound(regulation.to_string()))
    }
}
