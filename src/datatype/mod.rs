use std::{fmt, hash::Hash};

use indexmap::IndexMap;

/// Destination port and lowercase protocol name of a flow.
///
/// The port is wider than a real port number so that out-of-range values
/// in a flow log can still be counted under their own pair.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct LookupKey {
    port:     u32,
    protocol: String,
}

impl LookupKey {
    pub fn new(port: u32, protocol: impl Into<String>) -> LookupKey {
        LookupKey { port, protocol: protocol.into() }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.port, self.protocol)
    }
}

/// One eligible line of a flow log, reduced to what classification needs
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct FlowRecord {
    pub port:     u32,
    pub protocol: &'static str,
}

impl FlowRecord {
    pub fn new(port: u32, protocol: &'static str) -> FlowRecord {
        FlowRecord { port, protocol }
    }

    pub fn key(&self) -> LookupKey {
        LookupKey::new(self.port, self.protocol)
    }
}

/// Occurrence counts that iterate in the order keys were first seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counter<K: Hash + Eq> {
    counts: IndexMap<K, u64>,
}

impl<K: Hash + Eq> Default for Counter<K> {
    fn default() -> Self {
        Counter { counts: IndexMap::new() }
    }
}

impl<K: Hash + Eq> Counter<K> {
    pub fn new() -> Counter<K> {
        Counter::default()
    }

    /// Insert the key with a zero count if absent, then add one
    pub fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Final state of a run, handed from the aggregator to the report writer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub tag_counts:           Counter<String>,
    pub port_protocol_counts: Counter<LookupKey>,
    pub untagged:             u64,
}

impl Aggregates {
    /// Number of records that went through classification
    pub fn records(&self) -> u64 {
        self.port_protocol_counts.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_keeps_first_seen_order() {
        let mut counter = Counter::new();
        for tag in ["b", "a", "b", "c", "a", "b"] {
            counter.increment(tag.to_string());
        }
        let seen: Vec<(&str, u64)> = counter.iter().map(|(k, c)| (k.as_str(), c)).collect();
        assert_eq!(seen, vec![("b", 3), ("a", 2), ("c", 1)]);
        assert_eq!(counter.total(), 6);
        assert_eq!(counter.len(), 3);
        assert_eq!(counter.get(&"z".to_string()), 0);
    }

    #[test]
    fn test_lookup_key_equality_is_by_value() {
        let from_record = FlowRecord::new(25, "tcp").key();
        assert_eq!(from_record, LookupKey::new(25, String::from("tcp")));
        assert_ne!(from_record, LookupKey::new(25, "udp"));
        assert_eq!(from_record.to_string(), "25,tcp");
    }
}
