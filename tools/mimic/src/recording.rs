//! Serializable snapshots of recorded interactions.
//!
//! Each record becomes the payload of one `interaction_recorded` log line.
//! Records are write-only: nothing reads them back into interactions.

use crate::interaction::{Interaction, Outcome};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static RECORD_SEQ: AtomicU64 = AtomicU64::new(1);

pub fn next_seq() -> u64 {
    RECORD_SEQ.fetch_add(1, Ordering::Relaxed)
}

pub fn timestamp_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutcomeRecord {
    Absent,
    Returned { value: Json },
    Raised { class: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub seq: u64,
    pub timestamp_ns: u64,
    pub fake_name: String,
    pub method: String,
    pub args: Vec<Json>,
    pub outcome: OutcomeRecord,
}

impl InteractionRecord {
    /// `hash_threshold` bounds the rendered size of each value; larger ones
    /// are replaced by `<hash:sha256:…>`.
    pub fn capture(fake_name: &str, interaction: &Interaction, hash_threshold: usize) -> Self {
        let args = interaction
            .args()
            .iter()
            .map(|arg| bounded(arg.to_json(), hash_threshold))
            .collect();
        let outcome = match interaction.outcome() {
            Outcome::Absent => OutcomeRecord::Absent,
            Outcome::Returned(value) => OutcomeRecord::Returned {
                value: bounded(value.to_json(), hash_threshold),
            },
            Outcome::Raised(class) => OutcomeRecord::Raised {
                class: class.as_str().to_string(),
            },
        };
        Self {
            seq: next_seq(),
            timestamp_ns: timestamp_ns(),
            fake_name: fake_name.to_string(),
            method: interaction.method().to_string(),
            args,
            outcome,
        }
    }
}

fn bounded(value: Json, threshold: usize) -> Json {
    let rendered = value.to_string();
    if rendered.len() <= threshold {
        return value;
    }
    let hash = Sha256::digest(rendered.as_bytes());
    // First 8 bytes, 16 hex chars.
    Json::String(format!("<hash:sha256:{}>", hex_bytes(&hash[..8])))
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
