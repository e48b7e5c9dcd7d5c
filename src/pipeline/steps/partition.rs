use std::collections::btree_map::Entry;

use crate::types::{CarrierBucket, CarrierBuckets, Record};

/// Accumulates validated records into per-carrier buckets, in arrival order.
#[derive(Debug, Default)]
pub struct CarrierPartitioner {
    buckets: CarrierBuckets,
}

impl CarrierPartitioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: Record) {
        match self.buckets.entry(record.carrier_key()) {
            Entry::Occupied(mut bucket) => bucket.get_mut().records.push(record),
            Entry::Vacant(slot) => {
                slot.insert(CarrierBucket::new(record));
            }
        }
    }

    pub fn finish(self) -> CarrierBuckets {
        self.buckets
    }
}

/// Partition a whole batch of records at once.
pub fn partition(records: impl IntoIterator<Item = Record>) -> CarrierBuckets {
    let mut partitioner = CarrierPartitioner::new();
    for record in records {
        partitioner.add(record);
    }
    partitioner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::steps::parse::LineParser;

    fn records(lines: &[&str]) -> Vec<Record> {
        let parser = LineParser::new(",");
        lines.iter().map(|l| parser.parse(l).unwrap()).collect()
    }

    #[test]
    fn groups_carriers_case_insensitively() {
        let buckets = partition(records(&["U1,Ann,Lee,1,Acme", "U2,Bob,Kim,1,acme "]));

        assert_eq!(buckets.len(), 1);
        let bucket = &buckets["acme"];
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.display_name, "Acme");
        assert_eq!(bucket.records[1].carrier, "acme");
    }

    #[test]
    fn keeps_input_order_within_bucket() {
        let buckets = partition(records(&[
            "U3,Cat,Ng,1,Beta",
            "U1,Ann,Lee,1,Acme",
            "U2,Bob,Kim,1,Beta",
        ]));

        assert_eq!(buckets.len(), 2);
        let beta: Vec<&str> = buckets["beta"]
            .records
            .iter()
            .map(|r| r.subscriber_id.as_str())
            .collect();
        assert_eq!(beta, vec!["U3", "U2"]);
    }

    #[test]
    fn empty_input_has_no_buckets() {
        assert!(partition(Vec::new()).is_empty());
    }
}
