use serde::Serialize;
use std::collections::BTreeMap;

/// One validated enrollment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub subscriber_id: String,
    pub first_name: String,
    pub last_name: String,
    pub version: u32,
    /// Carrier name exactly as it appeared in the input (trimmed)
    pub carrier: String,
}

impl Record {
    /// Grouping key for this record's carrier
    pub fn carrier_key(&self) -> String {
        carrier_key(&self.carrier)
    }
}

/// Normalizes a carrier name into the key used for grouping.
///
/// Display values keep their original casing; only keying goes through here.
pub fn carrier_key(carrier: &str) -> String {
    carrier.trim().to_lowercase()
}

/// Records of a single carrier, in the order the current stage left them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierBucket {
    pub key: String,
    /// Carrier name of the first record seen for this key, used for file naming
    pub display_name: String,
    pub records: Vec<Record>,
}

impl CarrierBucket {
    pub fn new(first: Record) -> Self {
        Self {
            key: first.carrier_key(),
            display_name: first.carrier.clone(),
            records: vec![first],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Carrier key -> bucket. Ordered by key so stage output is reproducible.
pub type CarrierBuckets = BTreeMap<String, CarrierBucket>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carrier_key_folds_case_and_whitespace() {
        assert_eq!(carrier_key("Acme"), "acme");
        assert_eq!(carrier_key("acme "), "acme");
        assert_eq!(carrier_key("  ACME Health "), "acme health");
    }

    #[test]
    fn bucket_takes_display_name_from_first_record() {
        let record = Record {
            subscriber_id: "U1".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            version: 1,
            carrier: "Acme Health".to_string(),
        };
        let bucket = CarrierBucket::new(record);
        assert_eq!(bucket.key, "acme health");
        assert_eq!(bucket.display_name, "Acme Health");
        assert_eq!(bucket.len(), 1);
    }
}
