use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::engine::{self, EngineParams, Outcome, ReelState};
use crate::rng::Entropy;
use crate::symbols::{Symbol, REEL_DURATIONS_MS};

/// Most reels a player may hold at once; one always has to spin.
pub const MAX_HELD: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("a spin is already in flight")]
    Busy,
    #[error("no spins left")]
    OutOfSpins,
    #[error("reel {0} does not exist")]
    NoSuchReel(usize),
    #[error("at most {MAX_HELD} reels can be held")]
    TooManyHeld,
}

/// One reel that has to finish its animation before the spin can settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelMotion {
    pub reel: usize,
    pub target: Symbol,
    pub duration_ms: u64,
}

/// A spin whose outcome is decided but not yet shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSpin {
    next: ReelState,
    outcome: Outcome,
    pub motions: Vec<ReelMotion>,
}

impl PendingSpin {
    pub fn landing(&self) -> [Symbol; 3] {
        self.next.symbols
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settled {
    pub outcome: Outcome,
    pub spins_left: u32,
    /// True only for the session's first win.
    pub unlocked_next: bool,
}

/// Slot machine state owned by the UI shell across spins.
#[derive(Debug, Clone, Default)]
pub struct SlotSession {
    state: ReelState,
    params: EngineParams,
    first_win_achieved: bool,
    busy: bool,
}

impl SlotSession {
    pub fn new(params: EngineParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn with_state(state: ReelState, params: EngineParams) -> Self {
        Self {
            state,
            params,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &ReelState {
        &self.state
    }

    pub fn first_win_achieved(&self) -> bool {
        self.first_win_achieved
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_spin(&self) -> bool {
        !self.busy && self.state.spins_left > 0
    }

    /// Flip the hold on `reel`, returning the new hold flag.
    pub fn toggle_hold(&mut self, reel: usize) -> Result<bool, SlotError> {
        if self.busy {
            return Err(SlotError::Busy);
        }
        if reel >= 3 {
            return Err(SlotError::NoSuchReel(reel));
        }
        let next = !self.state.held[reel];
        if next && self.state.held_count() >= MAX_HELD {
            return Err(SlotError::TooManyHeld);
        }
        self.state.held[reel] = next;
        Ok(next)
    }

    /// Decide the next landing and mark the machine busy until [`settle`](Self::settle).
    pub fn begin_spin(&mut self, rng: &mut impl Entropy) -> Result<PendingSpin, SlotError> {
        if self.busy {
            return Err(SlotError::Busy);
        }
        if self.state.spins_left == 0 {
            return Err(SlotError::OutOfSpins);
        }
        let (next, outcome) = engine::spin(&self.state, &self.params, rng);
        let motions = self
            .state
            .unheld()
            .into_iter()
            .map(|reel| ReelMotion {
                reel,
                target: next.symbols[reel],
                duration_ms: REEL_DURATIONS_MS[reel],
            })
            .collect();
        self.busy = true;
        Ok(PendingSpin {
            next,
            outcome,
            motions,
        })
    }

    /// Commit a spin once every moving reel has stopped.
    pub fn settle(&mut self, pending: PendingSpin) -> Settled {
        let PendingSpin { next, outcome, .. } = pending;
        self.state = next;
        self.busy = false;

        let unlocked_next = outcome.is_win() && !self.first_win_achieved;
        if unlocked_next {
            self.first_win_achieved = true;
            info!(triple = ?outcome.triple, "first win, next scene unlocked");
        }

        Settled {
            outcome,
            spins_left: self.state.spins_left,
            unlocked_next,
        }
    }

    /// `begin_spin` + `settle` with no animation in between.
    pub fn spin_now(&mut self, rng: &mut impl Entropy) -> Result<Settled, SlotError> {
        let pending = self.begin_spin(rng)?;
        Ok(self.settle(pending))
    }
}
