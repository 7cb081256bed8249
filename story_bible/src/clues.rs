//! Clue definitions - the units of narrative discovery.

use serde::{Deserialize, Serialize};

/// Identifier for a clue. Clue ids are human-authored slugs from the story
/// content ("blog-cycle-47"), stable across saves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClueId(String);

impl ClueId {
    /// Create a clue id from a slug.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw slug.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ClueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display grouping for clues. The category has no effect on gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueCategory {
    /// Traces left in the novelist's own writing.
    Creation,
    /// Evidence uncovered by investigating the case.
    Research,
    /// Records from the hidden laboratory.
    Experiment,
}

impl ClueCategory {
    /// Human-readable name for display grouping.
    pub fn display_name(&self) -> &'static str {
        match self {
            ClueCategory::Creation => "Creation",
            ClueCategory::Research => "Research",
            ClueCategory::Experiment => "Experiment",
        }
    }
}

/// A clue is a unit of narrative discovery with prerequisites.
///
/// `requirements` gate availability: a clue only counts as reachable once
/// every requirement has been discovered. `unlocks` is advisory forward
/// metadata - discovery never cascades through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueDefinition {
    pub id: ClueId,

    /// Short display title.
    pub title: String,

    /// What the player learns from this clue.
    #[serde(default)]
    pub description: String,

    /// Page path where the clue can be found.
    #[serde(default)]
    pub location: String,

    pub category: ClueCategory,

    /// Clue ids that must already be discovered before this clue counts
    /// as available. Order is irrelevant.
    #[serde(default)]
    pub requirements: Vec<ClueId>,

    /// Clue ids hinted as following this one. Inert metadata.
    #[serde(default)]
    pub unlocks: Vec<ClueId>,
}

impl ClueDefinition {
    /// Create a new clue with the given id and title.
    pub fn new(id: impl Into<ClueId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            location: String::new(),
            category: ClueCategory::Creation,
            requirements: Vec::new(),
            unlocks: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the page location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the display category.
    pub fn with_category(mut self, category: ClueCategory) -> Self {
        self.category = category;
        self
    }

    /// Add a prerequisite clue.
    pub fn with_requirement(mut self, id: impl Into<ClueId>) -> Self {
        self.requirements.push(id.into());
        self
    }

    /// Add a forward reference.
    pub fn with_unlock(mut self, id: impl Into<ClueId>) -> Self {
        self.unlocks.push(id.into());
        self
    }

    /// Check whether this clue lists the given id as a prerequisite.
    pub fn requires(&self, id: &ClueId) -> bool {
        self.requirements.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clue_builder() {
        let clue = ClueDefinition::new("writing-reality", "Where Fiction Bleeds")
            .with_description("The notes no longer distinguish draft from diary.")
            .with_location("blog/writing-notes/reality-boundary.html")
            .with_category(ClueCategory::Creation)
            .with_requirement("blog-cycle-47")
            .with_unlock("chapter-7-breakdown");

        assert_eq!(clue.id.as_str(), "writing-reality");
        assert!(clue.requires(&ClueId::new("blog-cycle-47")));
        assert!(!clue.requires(&ClueId::new("chapter-7-breakdown")));
        assert_eq!(clue.unlocks.len(), 1);
    }

    #[test]
    fn test_clue_id_equality_and_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(ClueId::new("blog-cycle-47"));
        set.insert(ClueId::new("blog-cycle-47"));

        assert_eq!(set.len(), 1);
        assert_eq!(ClueId::new("a"), ClueId::from("a"));
    }

    #[test]
    fn test_category_display_name() {
        assert_eq!(ClueCategory::Creation.display_name(), "Creation");
        assert_eq!(ClueCategory::Research.display_name(), "Research");
        assert_eq!(ClueCategory::Experiment.display_name(), "Experiment");
    }
}
