//! Ending Gate - weighted completion scoring and the four-branch finale.
//!
//! The gate never talks to the clue tracker. It reads the tracker's
//! persisted set straight from the store, because the finale page and the
//! clue board may never be loaded together. Locked/unlocked is not a stored
//! mode: every refresh recomputes it from persisted state, and there is no
//! re-lock transition to model.

use serde::{Deserialize, Serialize};
use story_bible::{EndingDefinition, EndingKey, Storyline};

use crate::storage::{self, keys, ProgressStore};
use crate::visits;

/// Derived player progress. Recomputed from the store on demand, never
/// persisted on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    /// Number of entries in the persisted discovered-clue set.
    pub clues: usize,

    /// Whether every understanding page has been visited.
    pub understanding: bool,

    /// Whether both designated cycle clues have been discovered.
    pub cycles: bool,
}

/// Gates the finale behind accumulated discovery and records the player's
/// choice.
pub struct EndingGate<'s> {
    storyline: &'s Storyline,
    progress: PlayerProgress,
}

impl<'s> EndingGate<'s> {
    /// Create a gate with zeroed progress. Call
    /// [`refresh_progress`](Self::refresh_progress) before querying.
    pub fn new(storyline: &'s Storyline) -> Self {
        Self {
            storyline,
            progress: PlayerProgress::default(),
        }
    }

    /// The most recently computed progress.
    pub fn progress(&self) -> PlayerProgress {
        self.progress
    }

    /// Recompute progress from persisted state. Safe on a completely empty
    /// store: zero clues, both flags false.
    pub fn refresh_progress(&mut self, store: &dyn ProgressStore) {
        let discovered = storage::read_list(store, keys::CLUE_PROGRESS);

        self.progress.clues = discovered.len();
        self.progress.understanding = visits::has_visited_all(
            store,
            self.storyline
                .understanding_pages()
                .iter()
                .map(String::as_str),
        );
        self.progress.cycles = self
            .storyline
            .cycle_clues()
            .iter()
            .all(|id| discovered.iter().any(|found| found == id.as_str()));
    }

    /// Weighted completion percentage. The clue term carries 60 points,
    /// understanding and cycle awareness 20 each; the clue term is not
    /// capped on its own, the clamp happens once after the sum.
    pub fn total_progress(&self) -> u8 {
        let gate = self.storyline.gate();
        let mut score = 60.0 * self.progress.clues as f64 / gate.clue_threshold as f64;
        if self.progress.understanding {
            score += 20.0;
        }
        if self.progress.cycles {
            score += 20.0;
        }
        (score.round() as u32).min(100) as u8
    }

    /// All requirements met. Each component is independently required; no
    /// clue surplus substitutes for a missing flag.
    pub fn is_unlocked(&self) -> bool {
        let gate = self.storyline.gate();
        self.progress.clues >= gate.clue_threshold
            && (!gate.require_understanding || self.progress.understanding)
            && (!gate.require_cycles || self.progress.cycles)
    }

    /// One human-readable line per unmet requirement, in a fixed order:
    /// clue shortfall, understanding, cycle awareness. Empty exactly when
    /// the gate is unlocked.
    pub fn missing_requirements(&self) -> Vec<String> {
        let gate = self.storyline.gate();
        let mut missing = Vec::new();

        if self.progress.clues < gate.clue_threshold {
            missing.push(format!(
                "Find more clues ({}/{})",
                self.progress.clues, gate.clue_threshold
            ));
        }
        if gate.require_understanding && !self.progress.understanding {
            missing.push("Study the time loop theory in depth".to_string());
        }
        if gate.require_cycles && !self.progress.cycles {
            missing.push("Uncover the key evidence of the 47 cycles".to_string());
        }

        missing
    }

    /// Record the player's choice and return the chosen ending for display.
    /// Unknown keys are ignored. The viewed set only grows; the final
    /// choice is overwritten on every call. The matching `ending_<key>`
    /// achievement is recorded on first view.
    ///
    /// The gate does not check [`is_unlocked`](Self::is_unlocked) here;
    /// only the reveal surface is access-controlled.
    pub fn select_ending(
        &self,
        store: &mut dyn ProgressStore,
        key: &str,
    ) -> Option<&'s EndingDefinition> {
        let key = EndingKey::parse(key)?;
        let ending = self.storyline.ending(key)?;

        storage::append_unique(store, keys::ENDING_CHOICES, key.as_str());
        storage::write_string(store, keys::FINAL_CHOICE, key.as_str());
        storage::append_unique(store, keys::ACHIEVEMENTS, &key.achievement_id());

        Some(ending)
    }

    /// Ending keys the player has viewed, in first-view order. Falls back
    /// to the legacy `playerChoices` key when the current list is empty.
    pub fn viewed_endings(&self, store: &dyn ProgressStore) -> Vec<EndingKey> {
        let mut raw = storage::read_list(store, keys::ENDING_CHOICES);
        if raw.is_empty() {
            raw = storage::read_list(store, keys::PLAYER_CHOICES);
        }
        raw.iter().filter_map(|key| EndingKey::parse(key)).collect()
    }

    /// The most recently selected ending, if any.
    pub fn final_choice(&self, store: &dyn ProgressStore) -> Option<EndingKey> {
        storage::read_string(store, keys::FINAL_CHOICE)
            .and_then(|key| EndingKey::parse(&key))
    }

    /// Recorded achievement ids.
    pub fn achievements(&self, store: &dyn ProgressStore) -> Vec<String> {
        storage::read_list(store, keys::ACHIEVEMENTS)
    }
}
