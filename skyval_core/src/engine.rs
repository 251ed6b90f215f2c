use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    paytable::{Paytable, BLOCKED_LINE, JOKE_DOUBLE_LINE, NO_HIT_LINE},
    rng::Entropy,
    symbols::{pick_plain, Symbol, SymbolWeights, JOKE},
};

/// Chance a spin with fewer than two joke reels gets topped up to exactly two.
pub const NEAR_MISS_INJECTION: f64 = 0.55;
pub const DEFAULT_SPINS: u32 = 100;

#[derive(Debug, Clone)]
pub struct EngineParams {
    pub weights: SymbolWeights,
    pub paytable: Paytable,
    pub near_miss_injection: f64,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            weights: SymbolWeights::default(),
            paytable: Paytable::simple_default(),
            near_miss_injection: NEAR_MISS_INJECTION,
        }
    }
}

/// Reels between spins.
///
/// Callers should keep at most two reels held; the engine tolerates three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelState {
    pub symbols: [Symbol; 3],
    pub held: [bool; 3],
    pub spins_left: u32,
}

impl Default for ReelState {
    fn default() -> Self {
        Self {
            symbols: [Symbol::MovieNight, Symbol::LongHug, Symbol::Kiss],
            held: [false; 3],
            spins_left: DEFAULT_SPINS,
        }
    }
}

impl ReelState {
    pub fn unheld(&self) -> Vec<usize> {
        (0..3).filter(|&i| !self.held[i]).collect()
    }

    pub fn held_count(&self) -> usize {
        self.held.iter().filter(|&&h| h).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeCategory {
    Win,
    Pair,
    NearMiss,
    NoHit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "symbol", rename_all = "snake_case")]
pub enum OutcomeKind {
    Win(Symbol),
    /// Three joke symbols: shown, never paid.
    Blocked,
    /// Exactly two joke symbols.
    NearMiss,
    Pair(Symbol),
    NoHit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub triple: [Symbol; 3],
    pub bonus_spins: u32,
}

impl Outcome {
    pub fn category(&self) -> OutcomeCategory {
        match self.kind {
            OutcomeKind::Win(_) => OutcomeCategory::Win,
            OutcomeKind::Pair(_) => OutcomeCategory::Pair,
            OutcomeKind::Blocked | OutcomeKind::NearMiss => OutcomeCategory::NearMiss,
            OutcomeKind::NoHit => OutcomeCategory::NoHit,
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self.kind, OutcomeKind::Win(_))
    }

    pub fn is_near_miss(&self) -> bool {
        self.category() == OutcomeCategory::NearMiss
    }

    pub fn title(&self) -> String {
        match self.kind {
            OutcomeKind::Win(sym) => format!("WIN — {}", sym.pretty()),
            OutcomeKind::Blocked => "BLOCKED — 🧱🧱🧱".to_string(),
            OutcomeKind::NearMiss => "NEAR MISS — 🧱🧱…".to_string(),
            OutcomeKind::Pair(sym) => format!("PAIR — {}", sym.pretty()),
            OutcomeKind::NoHit => "No hit.".to_string(),
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self.kind {
            OutcomeKind::Win(sym) => sym.win_line(),
            OutcomeKind::Blocked => BLOCKED_LINE,
            OutcomeKind::NearMiss => JOKE_DOUBLE_LINE,
            OutcomeKind::Pair(sym) => sym.pair_line(),
            OutcomeKind::NoHit => NO_HIT_LINE,
        }
    }
}

fn joke_count(symbols: &[Symbol; 3]) -> usize {
    symbols.iter().filter(|s| s.is_joke()).count()
}

/// Land the next triple for `state`.
///
/// Unheld reels take a weighted draw, then the joke symbol is shaped: it may
/// never complete a triple, a held joke pair blocks further jokes, and with
/// probability [`EngineParams::near_miss_injection`] a spin is topped up to
/// exactly two jokes.
pub fn next_symbols(state: &ReelState, params: &EngineParams, rng: &mut impl Entropy) -> [Symbol; 3] {
    let mut results = state.symbols;
    let unheld = state.unheld();
    let held_jokes = (0..3)
        .filter(|&i| state.held[i] && results[i].is_joke())
        .count();

    for &i in &unheld {
        results[i] = params.weights.pick(rng);
    }

    if held_jokes >= 2 {
        for &i in &unheld {
            if results[i].is_joke() {
                results[i] = pick_plain(rng);
                debug!(reel = i, replacement = ?results[i], "held joke pair, redrew joke reel");
            }
        }
    }

    let mut jokes = joke_count(&results);
    if jokes == 3 {
        let i = unheld.first().copied().unwrap_or(0);
        results[i] = pick_plain(rng);
        jokes = 2;
        debug!(reel = i, replacement = ?results[i], "blocked joke triple");
    }

    if jokes < 2 && rng.next_f64() < params.near_miss_injection && !unheld.is_empty() {
        let candidates: Vec<usize> = unheld.iter().copied().filter(|&i| !results[i].is_joke()).collect();
        for i in candidates {
            if jokes >= 2 {
                break;
            }
            results[i] = JOKE;
            jokes += 1;
            debug!(reel = i, "injected near miss");
        }
        if joke_count(&results) == 3 {
            if let Some(&i) = unheld.iter().find(|&&i| results[i].is_joke()) {
                results[i] = pick_plain(rng);
            }
        }
    }

    if joke_count(&results) == 3 {
        let i = unheld.first().copied().unwrap_or(0);
        results[i] = pick_plain(rng);
        debug!(reel = i, replacement = ?results[i], "final joke triple guard");
    }

    results
}

/// Classify a landed triple. Precedence: joke triple, joke pair, win, pair, no hit.
///
/// Draws from `rng` only when a bonus-eligible symbol wins.
pub fn classify(triple: [Symbol; 3], paytable: &Paytable, rng: &mut impl Entropy) -> Outcome {
    let [a, b, c] = triple;
    let jokes = joke_count(&triple);

    let kind = if jokes == 3 {
        OutcomeKind::Blocked
    } else if jokes == 2 {
        OutcomeKind::NearMiss
    } else if a == b && b == c && a.is_playable() {
        OutcomeKind::Win(a)
    } else if let Some(sym) = pair_symbol(&triple) {
        OutcomeKind::Pair(sym)
    } else {
        OutcomeKind::NoHit
    };

    let bonus_spins = match kind {
        OutcomeKind::Win(sym) => paytable.bonus_for(sym, rng),
        _ => 0,
    };

    Outcome {
        kind,
        triple,
        bonus_spins,
    }
}

fn pair_symbol(triple: &[Symbol; 3]) -> Option<Symbol> {
    let [a, b, c] = *triple;
    [(a, b), (a, c), (b, c)]
        .into_iter()
        .find(|(x, y)| x == y && x.is_playable())
        .map(|(x, _)| x)
}

/// One atomic spin: costs one spin, lands, classifies, and pays free spins back.
pub fn spin(state: &ReelState, params: &EngineParams, rng: &mut impl Entropy) -> (ReelState, Outcome) {
    let symbols = next_symbols(state, params, rng);
    let outcome = classify(symbols, &params.paytable, rng);
    let next = ReelState {
        symbols,
        held: state.held,
        spins_left: state.spins_left.saturating_sub(1).saturating_add(outcome.bonus_spins),
    };
    (next, outcome)
}
