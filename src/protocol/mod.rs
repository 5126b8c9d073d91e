/// Name given to every protocol identifier outside the table below
pub const UNKNOWN: &str = "unknown";

// IANA protocol numbers the flow logs are expected to carry
const IANA_PROTOCOLS: [(&str, &str); 3] = [
    ("6",  "tcp"),
    ("17", "udp"),
    ("1",  "icmp"),
];

/// Map the protocol field of a flow record to its lowercase name.
///
/// The match is on the raw text, so `"06"` or `" 6"` resolve to
/// [`UNKNOWN`] just like `"99"` or `"-"` do.
pub fn resolve(id: &str) -> &'static str {
    IANA_PROTOCOLS
        .iter()
        .find(|(number, _)| *number == id)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN)
}
