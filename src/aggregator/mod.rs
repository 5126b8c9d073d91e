use tracing::debug;

use crate::datatype::{Aggregates, FlowRecord};
use crate::lookup::LookupTable;

/// Classifies flow records against a lookup table and keeps the counts.
pub struct Aggregator<'a> {
    table:      &'a LookupTable,
    aggregates: Aggregates,
}

impl<'a> Aggregator<'a> {
    pub fn new(table: &'a LookupTable) -> Aggregator<'a> {
        Aggregator { table, aggregates: Aggregates::default() }
    }

    /// Count one record: always under its port/protocol pair, and under
    /// either its tag or the untagged bucket.
    pub fn record(&mut self, record: &FlowRecord) {
        let key = record.key();

        match self.table.get(&key) {
            Some(tag) => {
                debug!(key = %key, tag, "tagged");
                self.aggregates.tag_counts.increment(tag.to_string());
            }
            None => {
                debug!(key = %key, "untagged");
                self.aggregates.untagged += 1;
            }
        }

        self.aggregates.port_protocol_counts.increment(key);
    }

    pub fn finish(self) -> Aggregates {
        self.aggregates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::LookupKey;

    fn table() -> LookupTable {
        [
            (LookupKey::new(25, "tcp"), "sv_P1".to_string()),
            (LookupKey::new(23, "tcp"), "sv_P1".to_string()),
            (LookupKey::new(0, "icmp"), "sv_P5".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_tagged_record() {
        let table = table();
        let mut aggregator = Aggregator::new(&table);
        aggregator.record(&FlowRecord::new(25, "tcp"));

        let aggregates = aggregator.finish();
        assert_eq!(aggregates.tag_counts.get(&"sv_P1".to_string()), 1);
        assert_eq!(aggregates.port_protocol_counts.get(&LookupKey::new(25, "tcp")), 1);
        assert_eq!(aggregates.untagged, 0);
    }

    #[test]
    fn test_unmatched_udp_record() {
        let table = table();
        let mut aggregator = Aggregator::new(&table);
        aggregator.record(&FlowRecord::new(25, "udp"));

        let aggregates = aggregator.finish();
        assert!(aggregates.tag_counts.is_empty());
        assert_eq!(aggregates.port_protocol_counts.get(&LookupKey::new(25, "udp")), 1);
        assert_eq!(aggregates.untagged, 1);
    }

    #[test]
    fn test_unknown_protocol_counts_as_unmatched() {
        let table = table();
        let mut aggregator = Aggregator::new(&table);
        aggregator.record(&FlowRecord::new(0, "unknown"));

        let aggregates = aggregator.finish();
        assert_eq!(aggregates.untagged, 1);
        assert_eq!(aggregates.port_protocol_counts.get(&LookupKey::new(0, "unknown")), 1);
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_bucket() {
        let table = table();
        let mut aggregator = Aggregator::new(&table);
        let records = [
            FlowRecord::new(25, "tcp"),
            FlowRecord::new(23, "tcp"),
            FlowRecord::new(80, "tcp"),
            FlowRecord::new(0, "icmp"),
            FlowRecord::new(25, "tcp"),
            FlowRecord::new(53, "udp"),
        ];
        for record in &records {
            aggregator.record(record);
        }

        let aggregates = aggregator.finish();
        assert_eq!(aggregates.tag_counts.total() + aggregates.untagged, records.len() as u64);
        assert_eq!(aggregates.records(), records.len() as u64);

        let tags: Vec<(&str, u64)> = aggregates.tag_counts.iter().map(|(t, c)| (t.as_str(), c)).collect();
        assert_eq!(tags, vec![("sv_P1", 3), ("sv_P5", 1)]);

        let pairs: Vec<String> = aggregates.port_protocol_counts.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(pairs, vec!["25,tcp", "23,tcp", "80,tcp", "0,icmp", "53,udp"]);
    }
}
