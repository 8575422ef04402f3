//! Versioned envelope for persisted collections.
//!
//! Collections are stored as
//!
//! ```json
//! {"version": 1, "items": [ ... ]}
//! ```
//!
//! A bare JSON array is the unversioned layout written before the envelope
//! existed. It is read as version 0 and migrated on load: records that no
//! longer decode (for example a cart line saved with quantity 0) are dropped
//! with a warning instead of discarding the whole collection. Current-version
//! envelopes are decoded strictly.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::storage::StorageError;

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    items: &'a [T],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored {
    Envelope { version: u32, items: Vec<Value> },
    Legacy(Vec<Value>),
}

/// Encode a collection in the current envelope.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if an item fails to serialize.
pub fn encode<T: Serialize>(items: &[T]) -> Result<String, StorageError> {
    let envelope = EnvelopeRef {
        version: CURRENT_VERSION,
        items,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode a stored collection, migrating older layouts.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the value is not an envelope or
/// array, or if a current-version item fails to decode. Returns
/// `StorageError::UnsupportedVersion` for envelopes from a newer schema.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, StorageError> {
    match serde_json::from_str::<Stored>(raw)? {
        Stored::Envelope { version, items } if version == CURRENT_VERSION => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(StorageError::from))
            .collect(),
        Stored::Envelope { version, .. } if version > CURRENT_VERSION => {
            Err(StorageError::UnsupportedVersion {
                found: version,
                supported: CURRENT_VERSION,
            })
        }
        Stored::Envelope { items, .. } | Stored::Legacy(items) => Ok(migrate_v0(items)),
    }
}

fn migrate_v0<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let migrated: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(index, error = %e, "Dropping unreadable record from legacy collection");
                None
            }
        })
        .collect();
    if migrated.len() < total {
        warn!(
            kept = migrated.len(),
            dropped = total - migrated.len(),
            "Migrated legacy collection with losses"
        );
    }
    migrated
}
