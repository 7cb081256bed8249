//! Clue Graph Tracker - owns the discovered-clue set and its persistence.
//!
//! The tracker borrows the static [`Storyline`] and mutates exactly one
//! thing: the set of discovered clue ids, persisted under
//! [`keys::CLUE_PROGRESS`] after every change. The set only grows; a clue
//! is never un-discovered.

use std::collections::HashSet;

use story_bible::{ClueDefinition, ClueId, Storyline};

use crate::storage::{self, keys, ProgressStore};

/// Outcome of an unlock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Newly discovered. The host fires its unlock notification exactly
    /// once, for this outcome only.
    Unlocked,

    /// Already in the discovered set; nothing changed.
    AlreadyDiscovered,

    /// Not a clue in this story. Ignored without mutation, so stale or
    /// misspelled ids on content pages cannot break the tracker.
    Unknown,
}

/// Startup options for [`ClueTracker::initialize`].
///
/// The host sources the developer-mode flag from wherever it likes - a
/// query parameter, a key chord. The tracker only honors the decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerOptions {
    /// Developer mode: unlock every clue immediately.
    pub unlock_all: bool,
}

/// Tracks which clues the player has discovered.
pub struct ClueTracker<'s> {
    storyline: &'s Storyline,
    discovered: HashSet<ClueId>,
}

impl<'s> ClueTracker<'s> {
    /// Create a tracker with an empty discovered set. Call
    /// [`initialize`](Self::initialize) to rehydrate from the store.
    pub fn new(storyline: &'s Storyline) -> Self {
        Self {
            storyline,
            discovered: HashSet::new(),
        }
    }

    /// Rehydrate from the store, apply developer mode, then drain the
    /// pending unlock queue left by pages that had no live tracker.
    ///
    /// Returns the clue ids newly discovered while draining, so the host
    /// can refresh its display and show one notification per clue.
    pub fn initialize(
        &mut self,
        store: &mut dyn ProgressStore,
        options: TrackerOptions,
    ) -> Vec<ClueId> {
        self.discovered = storage::read_list(store, keys::CLUE_PROGRESS)
            .into_iter()
            .map(ClueId::new)
            .collect();

        if options.unlock_all {
            self.unlock_all(store);
        }

        let mut applied = Vec::new();
        for id in storage::read_list(store, keys::PENDING_UNLOCKS) {
            let id = ClueId::new(id);
            if self.unlock(store, &id) == UnlockOutcome::Unlocked {
                applied.push(id);
            }
        }
        store.remove(keys::PENDING_UNLOCKS);

        applied
    }

    /// Discover a clue. Idempotent; unknown ids are ignored without a
    /// persistence write.
    pub fn unlock(&mut self, store: &mut dyn ProgressStore, id: &ClueId) -> UnlockOutcome {
        if !self.storyline.contains(id) {
            return UnlockOutcome::Unknown;
        }
        if !self.discovered.insert(id.clone()) {
            return UnlockOutcome::AlreadyDiscovered;
        }
        self.save(store);
        UnlockOutcome::Unlocked
    }

    /// Developer-mode shortcut: discover every defined clue, with a single
    /// persistence write.
    pub fn unlock_all(&mut self, store: &mut dyn ProgressStore) {
        self.discovered.extend(self.storyline.clue_ids().cloned());
        self.save(store);
    }

    /// Whether the clue has been discovered.
    pub fn is_discovered(&self, id: &ClueId) -> bool {
        self.discovered.contains(id)
    }

    /// Number of discovered clues.
    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    /// The discovered clue ids, in no particular order.
    pub fn discovered_ids(&self) -> impl Iterator<Item = &ClueId> {
        self.discovered.iter()
    }

    /// A clue is available once every requirement is discovered. Clues
    /// already discovered are trivially available; ids outside the story
    /// are not.
    pub fn is_available(&self, id: &ClueId) -> bool {
        if self.discovered.contains(id) {
            return true;
        }
        match self.storyline.clue(id) {
            Some(clue) => self.requirements_met(clue),
            None => false,
        }
    }

    /// Undiscovered clues whose requirements are already met, in story
    /// order. This is the "next steps" hint list; empty together with
    /// [`is_complete`](Self::is_complete) means the puzzle is solved.
    pub fn available_undiscovered(&self) -> Vec<&'s ClueDefinition> {
        self.storyline
            .clues()
            .filter(|clue| !self.discovered.contains(&clue.id))
            .filter(|clue| self.requirements_met(clue))
            .collect()
    }

    /// Whether every defined clue has been discovered.
    pub fn is_complete(&self) -> bool {
        self.discovered.len() == self.storyline.clue_count()
    }

    /// Fraction of clues discovered, in [0, 1].
    pub fn progress_ratio(&self) -> f64 {
        if self.storyline.clue_count() == 0 {
            return 0.0;
        }
        self.discovered.len() as f64 / self.storyline.clue_count() as f64
    }

    /// Progress rounded to an integer percentage for display.
    pub fn progress_percent(&self) -> u8 {
        (self.progress_ratio() * 100.0).round() as u8
    }

    fn requirements_met(&self, clue: &ClueDefinition) -> bool {
        clue.requirements
            .iter()
            .all(|requirement| self.discovered.contains(requirement))
    }

    fn save(&self, store: &mut dyn ProgressStore) {
        let mut ids: Vec<String> = self.discovered.iter().map(ClueId::to_string).collect();
        ids.sort();
        storage::write_list(store, keys::CLUE_PROGRESS, &ids);
    }
}

/// Unlock a clue from any content page. With a live tracker the clue is
/// applied immediately; otherwise it is queued for the next tracker
/// initialization. This is the only way narrative pages outside the core
/// trigger discovery.
pub fn unlock_from_page(
    store: &mut dyn ProgressStore,
    tracker: Option<&mut ClueTracker<'_>>,
    id: &ClueId,
) {
    match tracker {
        Some(tracker) => {
            tracker.unlock(store, id);
        }
        None => queue_unlock(store, id),
    }
}

/// Queue a clue unlock under [`keys::PENDING_UNLOCKS`] for a page with no
/// live tracker. Duplicates are collapsed.
pub fn queue_unlock(store: &mut dyn ProgressStore, id: &ClueId) {
    storage::append_unique(store, keys::PENDING_UNLOCKS, id.as_str());
}
