//! Deterministic core of the skyval greeting: seeded bouquet layout and the
//! shaped slot machine, plus the small state holders the UI shell threads
//! between calls.

pub mod catalog;
pub mod engine;
pub mod journey;
pub mod layout;
pub mod paytable;
pub mod poem;
pub mod rng;
pub mod session;
pub mod symbols;

pub use crate::catalog::{resolve_ids, Bouquet, BouquetError, Flower, DEFAULT_BOUQUET, MAX_BOUQUET, MIN_TO_SEAL};
pub use crate::engine::{classify, next_symbols, spin, EngineParams, Outcome, OutcomeCategory, OutcomeKind, ReelState};
pub use crate::journey::{Dodge, Journey, JourneyError, NoButton, Scene, Vault, VaultAttempt};
pub use crate::layout::{place, place_flowers, Placement};
pub use crate::paytable::Paytable;
pub use crate::poem::{poem, poem_for_ids};
pub use crate::rng::{derive_floats, derive_hash_hex, fnv1a32, Entropy, Mulberry32, ScriptedEntropy, SeedStream};
pub use crate::session::{PendingSpin, ReelMotion, Settled, SlotError, SlotSession};
pub use crate::symbols::{ReelStrip, Symbol, SymbolWeights};
