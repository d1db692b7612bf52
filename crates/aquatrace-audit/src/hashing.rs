//! Integrity fingerprints
//!
//! The concatenation formats are frozen: records written by earlier versions
//! must keep verifying. Floats render with six fractional digits and fields
//! are joined without separators.
use aquatrace_core::WaterParameters;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn reading(value: f64) -> String {
    format!("{:.6}", value)
}

/// Content fingerprint over record ID, station, pH, turbidity and bacterial count.
///
/// Only these five fields are covered. The remaining readings and the audit
/// metadata are outside the fingerprint.
pub fn data_hash(record_id: &str, station_id: &str, params: &WaterParameters) -> String {
    let data = format!(
        "{}{}{}{}{}",
        record_id,
        station_id,
        reading(params.ph),
        reading(params.turbidity),
        params.bacterial_count
    );
    sha256_hex(data.as_bytes())
}

/// Chain hash binding a record to the transaction that wrote it.
pub fn chain_hash(
    record_id: &str,
    station_id: &str,
    transaction_id: &str,
    data_hash: &str,
) -> String {
    let data = format!("{}{}{}{}", record_id, station_id, transaction_id, data_hash);
    sha256_hex(data.as_bytes())
}

/// Certifier signature: `SHA256:` plus the first 16 digest bytes in hex.
pub fn certifier_signature(certifier_id: &str, params: &WaterParameters) -> String {
    let data = format!(
        "{}{}{}{}",
        certifier_id,
        reading(params.ph),
        reading(params.turbidity),
        params.bacterial_count
    );
    let digest = Sha256::digest(data.as_bytes());
    format!("SHA256:{}", hex::encode(&digest[..16]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WaterParameters {
        WaterParameters {
            ph: 7.2,
            turbidity: 0.8,
            bacterial_count: 0,
            ..WaterParameters::default()
        }
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_data_hash_concatenation() {
        let expected = sha256_hex(b"QR_1TRAFFEYERE_MAIN7.2000000.8000000");
        assert_eq!(data_hash("QR_1", "TRAFFEYERE_MAIN", &sample()), expected);
    }

    #[test]
    fn test_data_hash_ignores_uncovered_readings() {
        let mut other = sample();
        other.nitrates = 99.0;
        other.temperature = 40.0;
        assert_eq!(
            data_hash("QR_1", "S", &sample()),
            data_hash("QR_1", "S", &other)
        );
        other.turbidity = 0.9;
        assert_ne!(
            data_hash("QR_1", "S", &sample()),
            data_hash("QR_1", "S", &other)
        );
    }

    #[test]
    fn test_chain_hash_concatenation() {
        let data = data_hash("QR_1", "S", &sample());
        let expected = sha256_hex(format!("QR_1Stx-1{}", data).as_bytes());
        assert_eq!(chain_hash("QR_1", "S", "tx-1", &data), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn test_signature_shape() {
        let signature = certifier_signature("CERT_LAB_001", &sample());
        assert!(signature.starts_with("SHA256:"));
        assert_eq!(signature.len(), "SHA256:".len() + 32);
    }
}
