use serde::{Deserialize, Serialize};

use crate::rng::Entropy;
use crate::symbols::Symbol;

pub const NO_HIT_LINE: &str = "Spin again. The sky is watching.";
pub const JOKE_DOUBLE_LINE: &str = "The brick dream is rigged. Again.";
pub const BLOCKED_LINE: &str = "Spin again, my pockets are empty.";
pub const OUT_OF_SPINS_LINE: &str = "The reels rest for a breath… hold something and try again soon.";

/// What a winning triple pays. Only free spins are on the table here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paytable {
    /// Symbols whose win draws a free-spin bonus.
    pub bonus_symbols: Vec<Symbol>,
    /// Chance the bonus is the small one.
    pub small_bonus_chance: f64,
    pub small_bonus: u32,
    pub big_bonus: u32,
}

impl Default for Paytable {
    fn default() -> Self {
        Self::simple_default()
    }
}

impl Paytable {
    pub fn simple_default() -> Self {
        Self {
            bonus_symbols: vec![Symbol::Sleepover, Symbol::MovieNight],
            small_bonus_chance: 0.6,
            small_bonus: 1,
            big_bonus: 3,
        }
    }

    pub fn is_bonus_eligible(&self, sym: Symbol) -> bool {
        self.bonus_symbols.contains(&sym)
    }

    /// Free spins for a win on `sym`. Draws once, and only for bonus-eligible symbols.
    pub fn bonus_for(&self, sym: Symbol, rng: &mut impl Entropy) -> u32 {
        if !self.is_bonus_eligible(sym) {
            return 0;
        }
        if rng.next_f64() < self.small_bonus_chance {
            self.small_bonus
        } else {
            self.big_bonus
        }
    }
}
