//! Append-only, hash-chained audit log of pipeline milestones.
//!
//! Each entry records the hash of its predecessor and a digest of its own
//! content, so editing any recorded entry after the fact breaks the chain
//! at that entry. The digest is [`chain_digest`], which is not
//! cryptographic: this detects accidental or casual edits, not a
//! determined forger. There is no repair or rollback.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::digest::chain_digest;

/// `previous_hash` of the first entry.
pub const GENESIS_HASH: &str = "0";

/// One recorded milestone. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    index: u64,
    timestamp: String,
    action: String,
    payload: Value,
    previous_hash: String,
    hash: String,
}

impl AuditEntry {
    /// 1-based position in the chain.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// RFC 3339, millisecond precision, UTC.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Digest of everything except the stored hash.
    fn content_hash(&self) -> String {
        content_hash(
            self.index,
            &self.timestamp,
            &self.action,
            &self.payload,
            &self.previous_hash,
        )
    }
}

fn content_hash(
    index: u64,
    timestamp: &str,
    action: &str,
    payload: &Value,
    previous_hash: &str,
) -> String {
    chain_digest(&hashed_content(index, timestamp, action, payload, previous_hash))
}

/// Compact JSON the entry hash is taken over: fields in declaration order,
/// payload object keys sorted at every depth.
fn hashed_content(
    index: u64,
    timestamp: &str,
    action: &str,
    payload: &Value,
    previous_hash: &str,
) -> String {
    let content = HashContent {
        index,
        timestamp,
        action,
        payload: SortedKeys(payload),
        previous_hash,
    };
    // Serializing plain structs, strings and JSON values cannot fail
    serde_json::to_string(&content).unwrap_or_default()
}

#[derive(Serialize)]
struct HashContent<'a> {
    index: u64,
    timestamp: &'a str,
    action: &'a str,
    payload: SortedKeys<'a>,
    previous_hash: &'a str,
}

/// Serializes a JSON value with object keys in byte order, whatever map
/// type `serde_json` was built with.
struct SortedKeys<'a>(&'a Value);

impl Serialize for SortedKeys<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &SortedKeys(value))?;
                }
                out.end()
            }
            Value::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(&SortedKeys(item))?;
                }
                out.end()
            }
            other => other.serialize(serializer),
        }
    }
}

/// How an entry failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TamperKind {
    /// Stored hash does not match the entry's content.
    HashMismatch,
    /// `previous_hash` does not match the preceding entry's hash.
    BrokenLink,
    /// Stored index does not match the entry's position.
    OutOfSequence,
}

impl std::fmt::Display for TamperKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::HashMismatch => "content hash mismatch",
            Self::BrokenLink => "broken link to previous entry",
            Self::OutOfSequence => "index out of sequence",
        };
        f.write_str(label)
    }
}

/// Integrity failure found by [`AuditLog::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tamper detected at entry {index}: {kind}")]
pub struct TamperDetected {
    /// 1-based position of the first entry that failed.
    pub index: u64,
    pub kind: TamperKind,
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The chain itself. Serializes as a plain array of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a milestone stamped with the current time.
    pub fn append(&mut self, action: &str, payload: Value) -> &AuditEntry {
        self.append_at(action, payload, Utc::now())
    }

    /// Append with an explicit timestamp (replay, tests).
    pub fn append_at(&mut self, action: &str, payload: Value, at: DateTime<Utc>) -> &AuditEntry {
        let index = self.entries.len() as u64 + 1;
        let timestamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let previous_hash = self
            .entries
            .last()
            .map_or_else(|| GENESIS_HASH.to_string(), |e| e.hash.clone());
        let hash = content_hash(index, &timestamp, action, &payload, &previous_hash);

        log::info!("audit #{} {:?} hash={}", index, action, hash);
        self.entries.push(AuditEntry {
            index,
            timestamp,
            action: action.to_string(),
            payload,
            previous_hash,
            hash,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Walk the chain from the first entry and report the first one that
    /// fails a check.
    pub fn verify(&self) -> Result<(), TamperDetected> {
        let mut expected_previous = GENESIS_HASH;
        for (position, entry) in self.entries.iter().enumerate() {
            let position = position as u64 + 1;
            let fail = |kind| TamperDetected {
                index: position,
                kind,
            };
            if entry.index != position {
                return Err(fail(TamperKind::OutOfSequence));
            }
            if entry.previous_hash != expected_previous {
                return Err(fail(TamperKind::BrokenLink));
            }
            if entry.content_hash() != entry.hash {
                return Err(fail(TamperKind::HashMismatch));
            }
            expected_previous = entry.hash.as_str();
        }
        Ok(())
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    pub fn to_json_pretty(&self) -> Result<String, AuditError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a previously dumped log. The result is not verified; call
    /// [`AuditLog::verify`] on it.
    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn chain(n: usize) -> AuditLog {
        let mut log = AuditLog::new();
        for i in 0..n {
            log.append_at(&format!("Step {i}"), json!({ "step": i }), at(i as i64));
        }
        log
    }

    #[test]
    fn test_first_entry_links_to_genesis() {
        let log = chain(1);
        let first = &log.entries()[0];
        assert_eq!(first.index(), 1);
        assert_eq!(first.previous_hash(), GENESIS_HASH);
        assert!(!first.hash().is_empty());
    }

    #[test]
    fn test_entries_link_to_predecessor() {
        let log = chain(4);
        for pair in log.entries().windows(2) {
            assert_eq!(pair[1].previous_hash(), pair[0].hash());
            assert_eq!(pair[1].index(), pair[0].index() + 1);
        }
    }

    #[test]
    fn test_timestamp_format() {
        let log = chain(1);
        assert_eq!(log.entries()[0].timestamp(), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(chain(3), chain(3));
    }

    #[test]
    fn test_hashed_content_layout() {
        let payload = json!({ "b": { "d": 1, "c": [ { "f": 1, "e": 2 } ] }, "a": "x" });
        assert_eq!(
            hashed_content(3, "2023-11-14T22:13:20.000Z", "Step", &payload, "ab12"),
            r#"{"index":3,"timestamp":"2023-11-14T22:13:20.000Z","action":"Step","payload":{"a":"x","b":{"c":[{"e":2,"f":1}],"d":1}},"previous_hash":"ab12"}"#
        );
    }

    #[test]
    fn test_entry_hash_golden() {
        let mut log = AuditLog::new();
        let entry = log.append_at("A", json!({ "b": 1, "a": 2 }), at(0));
        assert_eq!(entry.hash(), "57c0d522");
        assert_eq!(
            entry.hash(),
            chain_digest(
                r#"{"index":1,"timestamp":"2023-11-14T22:13:20.000Z","action":"A","payload":{"a":2,"b":1},"previous_hash":"0"}"#
            )
        );
    }

    #[test]
    fn test_verify_untouched_chain() {
        assert_eq!(chain(0).verify(), Ok(()));
        assert_eq!(chain(3).verify(), Ok(()));
        assert_eq!(chain(10).verify(), Ok(()));
    }

    #[test]
    fn test_payload_mutation_reported_at_entry() {
        let mut log = chain(5);
        log.entries[2].payload = json!({ "step": 99 });
        assert_eq!(
            log.verify(),
            Err(TamperDetected {
                index: 3,
                kind: TamperKind::HashMismatch
            })
        );
    }

    #[test]
    fn test_rehashed_entry_breaks_next_link() {
        // Forger recomputes the edited entry's hash; the successor's link breaks
        let mut log = chain(4);
        log.entries[1].action = "Forged".to_string();
        log.entries[1].hash = log.entries[1].content_hash();
        assert_eq!(
            log.verify(),
            Err(TamperDetected {
                index: 3,
                kind: TamperKind::BrokenLink
            })
        );
    }

    #[test]
    fn test_removed_entry_detected() {
        let mut log = chain(4);
        log.entries.remove(1);
        assert_eq!(
            log.verify(),
            Err(TamperDetected {
                index: 2,
                kind: TamperKind::OutOfSequence
            })
        );
    }

    #[test]
    fn test_json_dump_round_trips_and_verifies() {
        let log = chain(3);
        let dumped = log.to_json_pretty().unwrap();
        assert!(dumped.trim_start().starts_with('['));
        let loaded = AuditLog::from_json(&dumped).unwrap();
        assert_eq!(loaded, log);
        assert_eq!(loaded.verify(), Ok(()));
    }

    #[test]
    fn test_tampered_dump_detected() {
        let log = chain(3);
        let dumped = log.to_json_pretty().unwrap().replace("\"step\": 1", "\"step\": 7");
        let loaded = AuditLog::from_json(&dumped).unwrap();
        assert_eq!(loaded.verify().unwrap_err().index, 2);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(AuditLog::from_json("{not json"), Err(AuditError::Json(_))));
    }

    proptest! {
        #[test]
        fn property_any_payload_edit_is_located(
            len in 3usize..10,
            target in 0usize..10,
            value in any::<i64>(),
        ) {
            let target = target % len;
            let mut log = chain(len);
            prop_assume!(log.entries[target].payload != json!({ "step": value }));
            log.entries[target].payload = json!({ "step": value });
            let err = log.verify().unwrap_err();
            prop_assert_eq!(err.index, target as u64 + 1);
            prop_assert_eq!(err.kind, TamperKind::HashMismatch);
        }
    }
}
