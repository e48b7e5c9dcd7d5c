use std::cmp::Ordering;

use crate::types::{CarrierBucket, CarrierBuckets, Record};

/// Output ordering: first name, then last name, byte-wise and case-sensitive.
pub fn compare_by_name(a: &Record, b: &Record) -> Ordering {
    a.first_name
        .cmp(&b.first_name)
        .then_with(|| a.last_name.cmp(&b.last_name))
}

pub fn sort_buckets(buckets: CarrierBuckets) -> CarrierBuckets {
    buckets
        .into_iter()
        .map(|(key, bucket)| (key, sort_bucket(bucket)))
        .collect()
}

// Stable sort, so equal names keep their post-resolution order
pub fn sort_bucket(mut bucket: CarrierBucket) -> CarrierBucket {
    bucket.records.sort_by(compare_by_name);
    bucket
}
