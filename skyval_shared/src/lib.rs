use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skyval_core::{OutcomeCategory, Settled, Symbol};

pub mod gift;
pub mod progress;

pub use gift::{
    answered_link, base_url, decode_gift, encode_gift, gift_from_url, gift_url, landing_bouquet,
    location_hash, try_decode_gift, GiftError, GiftPayload, GIFT_PARAM,
};
pub use progress::{FileStore, MemoryStore, Progress, ProgressStore, StoreError, PROGRESS_KEY};

/// One settled spin, as exported by the CLI.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinLogEntry {
    pub ts: DateTime<Utc>,
    pub nonce: u64,
    pub reels: [Symbol; 3],
    pub outcome: OutcomeCategory,
    pub title: String,
    pub bonus_spins: u32,
    pub spins_left: u32,
    pub unlocked_next: bool,
}

impl SpinLogEntry {
    pub const CSV_HEADER: [&'static str; 8] = [
        "ts",
        "nonce",
        "reels",
        "outcome",
        "title",
        "bonus_spins",
        "spins_left",
        "unlocked_next",
    ];

    pub fn from_settled(ts: DateTime<Utc>, nonce: u64, settled: &Settled) -> Self {
        Self {
            ts,
            nonce,
            reels: settled.outcome.triple,
            outcome: settled.outcome.category(),
            title: settled.outcome.title(),
            bonus_spins: settled.outcome.bonus_spins,
            spins_left: settled.spins_left,
            unlocked_next: settled.unlocked_next,
        }
    }

    pub fn csv_record(&self) -> [String; 8] {
        let reels = self.reels.map(Symbol::key).join("|");
        let outcome = match self.outcome {
            OutcomeCategory::Win => "WIN",
            OutcomeCategory::Pair => "PAIR",
            OutcomeCategory::NearMiss => "NEAR_MISS",
            OutcomeCategory::NoHit => "NO_HIT",
        };
        [
            self.ts.to_rfc3339(),
            self.nonce.to_string(),
            reels,
            outcome.to_string(),
            self.title.clone(),
            self.bonus_spins.to_string(),
            self.spins_left.to_string(),
            self.unlocked_next.to_string(),
        ]
    }
}
