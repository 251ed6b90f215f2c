use serde::{Deserialize, Serialize};

use crate::rng::Entropy;

/// Slot symbols. `Lego` is the joke symbol: it may show as a pair but never pays out as a triple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Symbol {
    Kiss,
    Sleepover,
    LongHug,
    MovieNight,
    Lego,
    /// Anything that failed to parse. Never drawn, never wins, never pairs.
    Unknown,
}

pub const JOKE: Symbol = Symbol::Lego;

/// Playable symbols in catalog order. Weighted draws scan in this order.
pub const PLAYABLE: [Symbol; 5] = [
    Symbol::Kiss,
    Symbol::Sleepover,
    Symbol::LongHug,
    Symbol::MovieNight,
    Symbol::Lego,
];

/// Playable symbols minus the joke symbol.
pub const PLAIN: [Symbol; 4] = [
    Symbol::Kiss,
    Symbol::Sleepover,
    Symbol::LongHug,
    Symbol::MovieNight,
];

impl Symbol {
    /// Total parse: trims, uppercases, folds whitespace to `_`, then retries
    /// ignoring every non-letter. Falls back to [`Symbol::Unknown`].
    pub fn parse(raw: &str) -> Self {
        let upper = raw
            .trim()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_uppercase();
        if let Some(sym) = PLAYABLE.into_iter().find(|s| s.key() == upper) {
            return sym;
        }
        let letters_only = |s: &str| s.chars().filter(|c| c.is_ascii_uppercase()).collect::<String>();
        let simplified = letters_only(&upper);
        if simplified.is_empty() {
            return Symbol::Unknown;
        }
        PLAYABLE
            .into_iter()
            .find(|s| letters_only(s.key()) == simplified)
            .unwrap_or(Symbol::Unknown)
    }

    pub fn key(self) -> &'static str {
        match self {
            Symbol::Kiss => "KISS",
            Symbol::Sleepover => "SLEEPOVER",
            Symbol::LongHug => "LONG_HUG",
            Symbol::MovieNight => "MOVIE_NIGHT",
            Symbol::Lego => "LEGO",
            Symbol::Unknown => "UNKNOWN",
        }
    }

    pub fn is_joke(self) -> bool {
        self == JOKE
    }

    pub fn is_playable(self) -> bool {
        self != Symbol::Unknown
    }

    pub fn label(self) -> &'static str {
        match self {
            Symbol::Kiss => "A kiss",
            Symbol::Sleepover => "A sleepover",
            Symbol::LongHug => "A long hug",
            Symbol::MovieNight => "Movie night (your pick)",
            Symbol::Lego => "Lego set",
            Symbol::Unknown => "Mystery",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Symbol::Kiss => "💋",
            Symbol::Sleepover => "🛌",
            Symbol::LongHug => "🫂",
            Symbol::MovieNight => "🎬",
            Symbol::Lego => "🧱",
            Symbol::Unknown => "✨",
        }
    }

    /// `"{emoji} {label}"`, as shown on the reel and in results.
    pub fn pretty(self) -> String {
        format!("{} {}", self.emoji(), self.label())
    }

    pub fn win_line(self) -> &'static str {
        match self {
            Symbol::Kiss => "Come here. Just one. (Or three.)",
            Symbol::Sleepover => "You’re staying. I’m not negotiating.",
            Symbol::LongHug => "The kind that melts the whole day away.",
            Symbol::MovieNight => "You choose the movie. I’ll bring the cuddles.",
            Symbol::Lego => "The brick dream… suspiciously close.",
            Symbol::Unknown => "",
        }
    }

    pub fn pair_line(self) -> &'static str {
        match self {
            Symbol::Kiss => "Two kisses lined up. Hold it. Be greedy 😈",
            Symbol::Sleepover => "Two pillows. One more and you’re trapped here.",
            Symbol::LongHug => "Two hugs landed. One more and I’m not letting go.",
            Symbol::MovieNight => "Two screens lit up. One more and you pick the movie.",
            Symbol::Lego => "Two bricks… don’t get excited 🙃",
            Symbol::Unknown => "Two lined up. Hold that reel and try again 😈",
        }
    }
}

/// Base draw weights, aligned with [`PLAYABLE`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolWeights(pub [f64; 5]);

impl Default for SymbolWeights {
    fn default() -> Self {
        // Kiss (the favorite) and Lego (the joke) land about 1.5x as often as the rest.
        Self([3.0, 2.0, 2.0, 2.0, 3.0])
    }
}

impl SymbolWeights {
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn weight(&self, sym: Symbol) -> f64 {
        PLAYABLE
            .iter()
            .position(|&s| s == sym)
            .map(|i| self.0[i])
            .unwrap_or(0.0)
    }

    /// Weighted draw: roll over `[0, total)` and subtract weights in catalog
    /// order until the roll goes non-positive.
    pub fn pick(&self, rng: &mut impl Entropy) -> Symbol {
        let mut roll = rng.next_f64() * self.total();
        for (sym, w) in PLAYABLE.iter().zip(self.0.iter()) {
            roll -= w;
            if roll <= 0.0 {
                return *sym;
            }
        }
        PLAYABLE[0]
    }
}

/// Uniform draw over the non-joke symbols.
pub fn pick_plain(rng: &mut impl Entropy) -> Symbol {
    let i = (rng.next_f64() * PLAIN.len() as f64).floor() as usize;
    PLAIN[i.min(PLAIN.len() - 1)]
}

/// Cells in a reel strip.
pub const REEL_LENGTH: usize = 60;
/// Per-reel animation length; reels stop left to right.
pub const REEL_DURATIONS_MS: [u64; 3] = [1000, 1250, 1550];

/// The symbol strip a reel scrolls through. Purely cosmetic: the landing is
/// decided by the engine, the strip only picks where to stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelStrip {
    pub cells: Vec<Symbol>,
}

impl ReelStrip {
    /// Repeated Fisher-Yates shuffles of the playable symbols, cut to [`REEL_LENGTH`].
    pub fn build(rng: &mut impl Entropy) -> Self {
        let mut cells = Vec::with_capacity(REEL_LENGTH + PLAYABLE.len());
        while cells.len() < REEL_LENGTH {
            let mut batch = PLAYABLE;
            for i in (1..batch.len()).rev() {
                let j = ((rng.next_f64() * (i + 1) as f64).floor() as usize).min(i);
                batch.swap(i, j);
            }
            cells.extend_from_slice(&batch);
        }
        cells.truncate(REEL_LENGTH);
        Self { cells }
    }

    /// One of the cells showing `sym`, chosen at random; 0 when absent.
    pub fn land_index(&self, sym: Symbol, rng: &mut impl Entropy) -> usize {
        let matches: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == sym)
            .map(|(i, _)| i)
            .collect();
        if matches.is_empty() {
            return 0;
        }
        let k = ((rng.next_f64() * matches.len() as f64).floor() as usize).min(matches.len() - 1);
        matches[k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{Mulberry32, ScriptedEntropy};

    #[test]
    fn parse_is_total() {
        assert_eq!(Symbol::parse("KISS"), Symbol::Kiss);
        assert_eq!(Symbol::parse("  movie night "), Symbol::MovieNight);
        assert_eq!(Symbol::parse("long-hug"), Symbol::LongHug);
        assert_eq!(Symbol::parse("LongHug"), Symbol::LongHug);
        assert_eq!(Symbol::parse("lego"), Symbol::Lego);
        assert_eq!(Symbol::parse("jackpot"), Symbol::Unknown);
        assert_eq!(Symbol::parse(""), Symbol::Unknown);
        assert_eq!(Symbol::parse("!!!"), Symbol::Unknown);
    }

    #[test]
    fn keys_parse_back() {
        for s in PLAYABLE {
            assert_eq!(Symbol::parse(s.key()), s);
        }
    }

    #[test]
    fn weighted_pick_boundaries() {
        let w = SymbolWeights::default();
        // roll = f * 12; boundaries land on the earlier symbol.
        let cases = [
            (0.0, Symbol::Kiss),
            (3.0 / 12.0, Symbol::Kiss),
            (3.5 / 12.0, Symbol::Sleepover),
            (4.9 / 12.0, Symbol::Sleepover),
            (6.0 / 12.0, Symbol::LongHug),
            (8.5 / 12.0, Symbol::MovieNight),
            (11.9 / 12.0, Symbol::Lego),
        ];
        for (f, expected) in cases {
            let mut e = ScriptedEntropy::new(vec![f]);
            assert_eq!(w.pick(&mut e), expected, "draw {f}");
        }
    }

    #[test]
    fn weighted_pick_frequencies() {
        let w = SymbolWeights::default();
        let mut rng = Mulberry32::new(0xC0FFEE);
        let n = 100_000;
        let mut counts = [0usize; 5];
        for _ in 0..n {
            let sym = w.pick(&mut rng);
            let i = PLAYABLE.iter().position(|&s| s == sym).unwrap();
            counts[i] += 1;
        }
        for (i, c) in counts.iter().enumerate() {
            let observed = *c as f64 / n as f64;
            let expected = w.0[i] / w.total();
            assert!((observed - expected).abs() < 0.02, "{:?}: {observed} vs {expected}", PLAYABLE[i]);
        }
    }

    #[test]
    fn pick_plain_never_jokes() {
        let mut rng = Mulberry32::new(7);
        for _ in 0..1_000 {
            assert!(!pick_plain(&mut rng).is_joke());
        }
        let mut top = ScriptedEntropy::new(vec![0.999_999]);
        assert_eq!(pick_plain(&mut top), Symbol::MovieNight);
    }

    #[test]
    fn reel_strip_contains_every_symbol() {
        let mut rng = Mulberry32::new(3);
        let strip = ReelStrip::build(&mut rng);
        assert_eq!(strip.cells.len(), REEL_LENGTH);
        for s in PLAYABLE {
            assert_eq!(strip.cells.iter().filter(|&&c| c == s).count(), REEL_LENGTH / 5);
            let at = strip.land_index(s, &mut rng);
            assert_eq!(strip.cells[at], s);
        }
        assert_eq!(strip.land_index(Symbol::Unknown, &mut rng), 0);
    }
}
