use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most flowers a bouquet wrap can hold.
pub const MAX_BOUQUET: usize = 7;
/// Fewest flowers before a bouquet can be sealed.
pub const MIN_TO_SEAL: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Flower {
    Rose,
    Lily,
    Peony,
    Tulip,
    Daisy,
    Lavender,
    Babysbreath,
    Camellia,
    Sunflower,
    Sakura,
}

/// Bouquet shown on the landing overlay when no gift link was opened.
pub const DEFAULT_BOUQUET: [Flower; 5] = [
    Flower::Lavender,
    Flower::Rose,
    Flower::Tulip,
    Flower::Camellia,
    Flower::Sunflower,
];

impl Flower {
    pub const ALL: [Flower; 10] = [
        Flower::Rose,
        Flower::Lily,
        Flower::Peony,
        Flower::Tulip,
        Flower::Daisy,
        Flower::Lavender,
        Flower::Babysbreath,
        Flower::Camellia,
        Flower::Sunflower,
        Flower::Sakura,
    ];

    /// Exact id lookup. Ids are case sensitive.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id)
    }

    pub fn id(self) -> &'static str {
        match self {
            Flower::Rose => "rose",
            Flower::Lily => "lily",
            Flower::Peony => "peony",
            Flower::Tulip => "tulip",
            Flower::Daisy => "daisy",
            Flower::Lavender => "lavender",
            Flower::Babysbreath => "babysbreath",
            Flower::Camellia => "camellia",
            Flower::Sunflower => "sunflower",
            Flower::Sakura => "sakura",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Flower::Rose => "Rose",
            Flower::Lily => "Lily",
            Flower::Peony => "Peony",
            Flower::Tulip => "Tulip",
            Flower::Daisy => "Daisy",
            Flower::Lavender => "Lavender",
            Flower::Babysbreath => "Baby’s Breath",
            Flower::Camellia => "Camellia",
            Flower::Sunflower => "Sunflower",
            Flower::Sakura => "Cherry Blossom",
        }
    }

    pub fn keywords(self) -> [&'static str; 2] {
        match self {
            Flower::Rose => ["admiration", "warmth"],
            Flower::Lily => ["devotion", "sincerity"],
            Flower::Peony => ["tenderness", "romance"],
            Flower::Tulip => ["choosing you", "closeness"],
            Flower::Daisy => ["gentle joy", "lightness"],
            Flower::Lavender => ["calm", "comfort"],
            Flower::Babysbreath => ["forever", "tenderness"],
            Flower::Camellia => ["special", "noticing you"],
            Flower::Sunflower => ["warmth", "loyalty"],
            Flower::Sakura => ["presence", "gentle moments"],
        }
    }

    pub fn poetic_lines(self) -> [&'static str; 2] {
        match self {
            Flower::Rose => ["I look at you and soften.", "You make love feel safe."],
            Flower::Lily => ["Quiet devotion, deep and steady.", "I stay, gently."],
            Flower::Peony => ["Soft love that blooms slowly.", "No rush. Just real."],
            Flower::Tulip => ["Out of everyone, I choose you.", "Again and again."],
            Flower::Daisy => [
                "You make ordinary days feel light.",
                "You make me smile quietly.",
            ],
            Flower::Lavender => ["You quiet the noise in my head.", "You feel like peace."],
            Flower::Babysbreath => ["Something small that lasts.", "Softness that stays."],
            Flower::Camellia => ["I notice you in every room.", "You feel rare to me."],
            Flower::Sunflower => [
                "I turn toward you without thinking.",
                "You feel like sunlight.",
            ],
            Flower::Sakura => [
                "Moments with you feel soft and rare.",
                "I hold them carefully.",
            ],
        }
    }
}

/// Resolve ids in order, silently dropping unknown ones.
pub fn resolve_ids<S: AsRef<str>>(ids: &[S]) -> Vec<Flower> {
    ids.iter().filter_map(|id| Flower::parse(id.as_ref())).collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BouquetError {
    #[error("the wrap can only hold {MAX_BOUQUET} flowers")]
    Full,
    #[error("unknown flower id: {0}")]
    UnknownFlower(String),
}

/// The user's in-progress selection. Order matters: it drives layout and poem order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bouquet {
    flowers: Vec<Flower>,
}

impl Bouquet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: &str) -> Result<Flower, BouquetError> {
        let flower = Flower::parse(id).ok_or_else(|| BouquetError::UnknownFlower(id.to_string()))?;
        self.push(flower)?;
        Ok(flower)
    }

    pub fn push(&mut self, flower: Flower) -> Result<(), BouquetError> {
        if self.flowers.len() >= MAX_BOUQUET {
            return Err(BouquetError::Full);
        }
        self.flowers.push(flower);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<Flower> {
        (index < self.flowers.len()).then(|| self.flowers.remove(index))
    }

    pub fn clear(&mut self) {
        self.flowers.clear();
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.flowers.iter().map(|f| f.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.flowers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flowers.is_empty()
    }

    pub fn can_seal(&self) -> bool {
        self.flowers.len() >= MIN_TO_SEAL
    }

    pub fn counter_label(&self) -> String {
        format!("{} / {} flowers", self.flowers.len(), MAX_BOUQUET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_parse() {
        for f in Flower::ALL {
            assert_eq!(Flower::parse(f.id()), Some(f));
        }
        assert_eq!(Flower::parse("Rose"), None);
        assert_eq!(Flower::parse("orchid"), None);
    }

    #[test]
    fn serde_uses_ids() {
        let json = serde_json::to_string(&Flower::Babysbreath).unwrap();
        assert_eq!(json, "\"babysbreath\"");
    }

    #[test]
    fn bouquet_caps_at_seven() {
        let mut b = Bouquet::new();
        for _ in 0..MAX_BOUQUET {
            b.add("rose").unwrap();
        }
        assert_eq!(b.add("tulip"), Err(BouquetError::Full));
        assert_eq!(b.counter_label(), "7 / 7 flowers");
    }

    #[test]
    fn bouquet_rejects_unknown_and_seals_at_three() {
        let mut b = Bouquet::new();
        assert!(matches!(b.add("weed"), Err(BouquetError::UnknownFlower(_))));
        b.add("rose").unwrap();
        b.add("lily").unwrap();
        assert!(!b.can_seal());
        b.add("daisy").unwrap();
        assert!(b.can_seal());
        assert_eq!(b.remove(1), Some(Flower::Lily));
        assert_eq!(b.remove(9), None);
        assert_eq!(b.ids(), vec!["rose", "daisy"]);
        b.clear();
        assert!(b.is_empty());
        assert!(!b.can_seal());
        assert_eq!(b.counter_label(), "0 / 7 flowers");
    }
}
