//! Linear four-scene flow: bouquet, slots, vault, question.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Fragment that jumps straight to the answered question.
pub const ANSWERED_FRAGMENT: &str = "#yes";
pub const DEFAULT_VAULT_PASSWORD: &str = "BK";
/// Dodges before the "no" button gives up and disappears.
pub const NO_BUTTON_ESCAPES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Scene {
    Bouquet = 1,
    Slots = 2,
    Vault = 3,
    Question = 4,
}

impl Scene {
    pub const LAST: Scene = Scene::Question;

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Scene::Bouquet),
            2 => Some(Scene::Slots),
            3 => Some(Scene::Vault),
            4 => Some(Scene::Question),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn progress_label(self) -> String {
        format!("Scene {}/{}", self.number(), Self::LAST.number())
    }
}

impl From<Scene> for u8 {
    fn from(scene: Scene) -> u8 {
        scene.number()
    }
}

impl TryFrom<u8> for Scene {
    type Error = JourneyError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Scene::from_number(n).ok_or(JourneyError::NoSuchScene(n))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JourneyError {
    #[error("scene {0} does not exist")]
    NoSuchScene(u8),
    #[error("scene {requested} is locked (unlocked up to {unlocked})")]
    Locked { requested: u8, unlocked: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    scene: Scene,
    unlocked: Scene,
    answered: bool,
}

impl Default for Journey {
    fn default() -> Self {
        Self {
            scene: Scene::Bouquet,
            unlocked: Scene::Bouquet,
            answered: false,
        }
    }
}

impl Journey {
    /// Resume from persisted progress. `fragment` is the URL hash, `#yes` included.
    pub fn boot(unlocked: u8, fragment: Option<&str>) -> Self {
        let unlocked = Scene::from_number(unlocked.clamp(1, Scene::LAST.number())).unwrap_or(Scene::Bouquet);
        let mut journey = Self {
            scene: unlocked,
            unlocked,
            answered: false,
        };
        if fragment == Some(ANSWERED_FRAGMENT) {
            journey.unlocked = Scene::LAST;
            journey.scene = Scene::LAST;
            journey.answered = true;
        }
        journey
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn unlocked(&self) -> Scene {
        self.unlocked
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    /// Move to `scene`. Going back is always allowed; going forward needs the unlock.
    pub fn show(&mut self, scene: Scene) -> Result<(), JourneyError> {
        if scene > self.unlocked {
            return Err(JourneyError::Locked {
                requested: scene.number(),
                unlocked: self.unlocked.number(),
            });
        }
        self.scene = scene;
        Ok(())
    }

    /// Unlock the scene after the current one. Returns the new high-water mark.
    pub fn unlock_next(&mut self) -> Scene {
        if let Some(next) = self.scene.next() {
            if next > self.unlocked {
                self.unlocked = next;
                info!(scene = next.number(), "scene unlocked");
            }
        }
        self.unlocked
    }

    /// Unlock and move forward in one step, as the continue buttons do.
    pub fn advance(&mut self) -> Scene {
        self.unlock_next();
        if let Some(next) = self.scene.next() {
            self.scene = next;
        }
        self.scene
    }

    pub fn answer_yes(&mut self) {
        self.answered = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultAttempt {
    TooShort,
    Wrong,
    Opened,
}

/// Two-letter password lock guarding the memory letter.
#[derive(Debug, Clone)]
pub struct Vault {
    password: String,
    open: bool,
}

impl Default for Vault {
    fn default() -> Self {
        Self::new(DEFAULT_VAULT_PASSWORD)
    }
}

impl Vault {
    pub fn new(password: &str) -> Self {
        Self {
            password: Self::normalize(password),
            open: false,
        }
    }

    /// Trim, uppercase, keep the first two characters.
    pub fn normalize(input: &str) -> String {
        input.trim().to_uppercase().chars().take(2).collect()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn attempt(&mut self, input: &str) -> VaultAttempt {
        if self.open {
            return VaultAttempt::Opened;
        }
        let attempt = Self::normalize(input);
        if attempt.chars().count() < 2 {
            return VaultAttempt::TooShort;
        }
        if attempt == self.password {
            self.open = true;
            info!("vault opened");
            VaultAttempt::Opened
        } else {
            VaultAttempt::Wrong
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dodge {
    Move,
    Vanish,
}

/// The "no" answer that keeps running away.
#[derive(Debug, Clone, Default)]
pub struct NoButton {
    escapes: u32,
}

impl NoButton {
    pub fn dodge(&mut self) -> Dodge {
        self.escapes += 1;
        if self.escapes <= NO_BUTTON_ESCAPES {
            Dodge::Move
        } else {
            Dodge::Vanish
        }
    }

    pub fn escapes(&self) -> u32 {
        self.escapes
    }
}
