//! Index Serializer (spec 4.10): persist and restore `BM25Index` +
//! `FuzzyMatcher` to skip expensive rebuilds across process restarts.
//!
//! Failure is always soft: a missing file, a malformed payload, a version
//! mismatch, a checksum mismatch, or a stale document count all log a
//! warning and return `None` rather than propagating an error. The caller
//! rebuilds from the corpus in every such case.

use equisearch_retrieve::{BM25Index, FuzzyMatcher};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use equisearch_core::EquisearchResult;

const FORMAT_VERSION: &str = "1.0.0";

#[derive(Serialize, Deserialize)]
struct Payload {
    bm25: BM25Index,
    fuzzy: FuzzyMatcher,
    doc_count: usize,
}

/// On-disk envelope: version, build timestamp, and a checksum covering
/// only `data` (spec "Persisted index file": "checksum covers only the
/// `data` field"). The envelope itself is JSON, human-inspectable;
/// `data` is the compact `postcard`-encoded `Payload`.
#[derive(Serialize, Deserialize)]
struct Envelope {
    version: String,
    timestamp: u64,
    checksum: String,
    data: Vec<u8>,
}

fn checksum_of(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Serialize `bm25` + `fuzzy` and write the versioned, checksummed
/// envelope to `path`.
pub fn save(
    path: &std::path::Path,
    bm25: &BM25Index,
    fuzzy: &FuzzyMatcher,
    doc_count: usize,
) -> EquisearchResult<()> {
    let payload = Payload { bm25: bm25.clone(), fuzzy: fuzzy.clone(), doc_count };
    let data = postcard::to_allocvec(&payload)?;
    let checksum = checksum_of(&data);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let envelope = Envelope { version: FORMAT_VERSION.to_string(), timestamp, checksum, data };
    let bytes = serde_json::to_vec(&envelope)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Load a previously saved index, verifying version, checksum, and that
/// `expected_doc_count` still matches the live corpus size. Every failure
/// mode is logged and folded into `None` so the caller can rebuild.
pub fn load(path: &std::path::Path, expected_doc_count: usize) -> Option<(BM25Index, FuzzyMatcher)> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "index file not found, rebuilding");
            return None;
        }
    };

    let envelope: Envelope = match serde_json::from_slice(&bytes) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "index file malformed, rebuilding");
            return None;
        }
    };

    if envelope.version != FORMAT_VERSION {
        tracing::warn!(
            found = %envelope.version,
            expected = FORMAT_VERSION,
            "index format version mismatch, rebuilding"
        );
        return None;
    }

    if checksum_of(&envelope.data) != envelope.checksum {
        tracing::warn!("index checksum mismatch, rebuilding");
        return None;
    }

    let payload: Payload = match postcard::from_bytes(&envelope.data) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "index payload malformed, rebuilding");
            return None;
        }
    };

    if payload.doc_count != expected_doc_count {
        tracing::warn!(
            persisted = payload.doc_count,
            live = expected_doc_count,
            "index document count is stale, rebuilding"
        );
        return None;
    }

    Some((payload.bm25, payload.fuzzy))
}
