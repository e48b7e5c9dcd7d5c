use std::collections::HashMap;

use crate::types::{CarrierBucket, CarrierBuckets, Record};

/// Keep only the highest version per subscriber inside every carrier bucket.
pub fn resolve_versions(buckets: CarrierBuckets) -> CarrierBuckets {
    buckets
        .into_iter()
        .map(|(key, bucket)| (key, resolve_bucket(bucket)))
        .collect()
}

/// Collapse one bucket to a single record per subscriber ID.
///
/// Equal versions go to the later record. Survivors sit where their subscriber
/// first appeared.
pub fn resolve_bucket(bucket: CarrierBucket) -> CarrierBucket {
    let CarrierBucket {
        key,
        display_name,
        records,
    } = bucket;

    let mut slots: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut resolved: Vec<Record> = Vec::with_capacity(records.len());

    for record in records {
        match slots.get(&record.subscriber_id).copied() {
            Some(slot) => {
                if record.version >= resolved[slot].version {
                    resolved[slot] = record;
                }
            }
            None => {
                slots.insert(record.subscriber_id.clone(), resolved.len());
                resolved.push(record);
            }
        }
    }

    CarrierBucket {
        key,
        display_name,
        records: resolved,
    }
}
