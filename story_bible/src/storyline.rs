//! The storyline - the single fixed story graph, loaded and validated once
//! at startup.
//!
//! The story ships as an embedded TOML document. [`Storyline::load`]
//! validates it structurally: every cross-reference must resolve and the
//! requirements graph must be acyclic, so availability queries can never
//! loop at runtime. Validation failures are configuration errors surfaced
//! as [`StoryError`]; the runtime layer never sees an invalid storyline.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::clues::{ClueDefinition, ClueId};
use crate::endings::{EndingDefinition, EndingKey};

const STORY_TOML: &str = include_str!("../story.toml");

/// Errors detected while loading the story definition.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("failed to parse story definition: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate clue id '{0}'")]
    DuplicateClue(ClueId),

    #[error("clue '{clue}' references unknown clue '{reference}'")]
    UnknownReference { clue: ClueId, reference: ClueId },

    #[error("requirement cycle involving clue '{0}'")]
    RequirementCycle(ClueId),

    #[error("missing ending branch '{0}'")]
    MissingEnding(EndingKey),

    #[error("duplicate ending branch '{0}'")]
    DuplicateEnding(EndingKey),

    #[error("cycle evidence references unknown clue '{0}'")]
    UnknownCycleClue(ClueId),
}

/// Static finale requirements.
#[derive(Debug, Clone, Deserialize)]
pub struct GateRequirements {
    /// Minimum number of discovered clues.
    pub clue_threshold: usize,

    /// Whether every understanding page must have been visited.
    pub require_understanding: bool,

    /// Whether both designated cycle clues must have been discovered.
    pub require_cycles: bool,
}

/// Raw shape of the embedded story document.
#[derive(Debug, Deserialize)]
struct StoryDocument {
    understanding_pages: Vec<String>,
    cycle_clues: [ClueId; 2],
    gate: GateRequirements,
    clues: Vec<ClueDefinition>,
    endings: Vec<EndingDefinition>,
}

/// The complete, validated story graph.
///
/// Clues keep their definition order; that order drives the "next steps"
/// hint list. All lookups go through the id index.
#[derive(Debug, Clone)]
pub struct Storyline {
    clues: Vec<ClueDefinition>,
    index: HashMap<ClueId, usize>,
    endings: HashMap<EndingKey, EndingDefinition>,
    understanding_pages: Vec<String>,
    cycle_clues: [ClueId; 2],
    gate: GateRequirements,
}

impl Storyline {
    /// Load and validate the embedded story.
    pub fn load() -> Result<Self, StoryError> {
        Self::from_toml(STORY_TOML)
    }

    /// Load and validate a story from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, StoryError> {
        let doc: StoryDocument = toml::from_str(text)?;
        Self::from_parts(
            doc.clues,
            doc.endings,
            doc.understanding_pages,
            doc.cycle_clues,
            doc.gate,
        )
    }

    /// Assemble and validate a story from already-built parts.
    pub fn from_parts(
        clues: Vec<ClueDefinition>,
        endings: Vec<EndingDefinition>,
        understanding_pages: Vec<String>,
        cycle_clues: [ClueId; 2],
        gate: GateRequirements,
    ) -> Result<Self, StoryError> {
        let mut index = HashMap::with_capacity(clues.len());
        for (position, clue) in clues.iter().enumerate() {
            if index.insert(clue.id.clone(), position).is_some() {
                return Err(StoryError::DuplicateClue(clue.id.clone()));
            }
        }

        for clue in &clues {
            for reference in clue.requirements.iter().chain(&clue.unlocks) {
                if !index.contains_key(reference) {
                    return Err(StoryError::UnknownReference {
                        clue: clue.id.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }

        check_acyclic(&clues, &index)?;

        let mut ending_map = HashMap::with_capacity(endings.len());
        for ending in endings {
            let key = ending.key;
            if ending_map.insert(key, ending).is_some() {
                return Err(StoryError::DuplicateEnding(key));
            }
        }
        for key in EndingKey::ALL {
            if !ending_map.contains_key(&key) {
                return Err(StoryError::MissingEnding(key));
            }
        }

        for id in &cycle_clues {
            if !index.contains_key(id) {
                return Err(StoryError::UnknownCycleClue(id.clone()));
            }
        }

        Ok(Self {
            clues,
            index,
            endings: ending_map,
            understanding_pages,
            cycle_clues,
            gate,
        })
    }

    /// Look up a clue by id.
    pub fn clue(&self, id: &ClueId) -> Option<&ClueDefinition> {
        self.index.get(id).map(|position| &self.clues[*position])
    }

    /// Check whether an id belongs to the story.
    pub fn contains(&self, id: &ClueId) -> bool {
        self.index.contains_key(id)
    }

    /// All clues, in definition order.
    pub fn clues(&self) -> impl Iterator<Item = &ClueDefinition> {
        self.clues.iter()
    }

    /// All clue ids, in definition order.
    pub fn clue_ids(&self) -> impl Iterator<Item = &ClueId> {
        self.clues.iter().map(|clue| &clue.id)
    }

    /// Total number of defined clues.
    pub fn clue_count(&self) -> usize {
        self.clues.len()
    }

    /// Look up an ending by key. Always present after validation.
    pub fn ending(&self, key: EndingKey) -> Option<&EndingDefinition> {
        self.endings.get(&key)
    }

    /// The four endings, in presentation order.
    pub fn endings(&self) -> impl Iterator<Item = &EndingDefinition> {
        EndingKey::ALL.iter().filter_map(|key| self.endings.get(key))
    }

    /// Pages that must all be visited for the understanding requirement.
    pub fn understanding_pages(&self) -> &[String] {
        &self.understanding_pages
    }

    /// The two clues that together establish cycle awareness.
    pub fn cycle_clues(&self) -> &[ClueId; 2] {
        &self.cycle_clues
    }

    /// Finale requirements.
    pub fn gate(&self) -> &GateRequirements {
        &self.gate
    }
}

/// Reject requirement graphs with cycles. Depth-first, three marks.
fn check_acyclic(
    clues: &[ClueDefinition],
    index: &HashMap<ClueId, usize>,
) -> Result<(), StoryError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(
        position: usize,
        clues: &[ClueDefinition],
        index: &HashMap<ClueId, usize>,
        marks: &mut [Mark],
    ) -> Result<(), StoryError> {
        match marks[position] {
            Mark::Done => Ok(()),
            Mark::InProgress => Err(StoryError::RequirementCycle(clues[position].id.clone())),
            Mark::Unvisited => {
                marks[position] = Mark::InProgress;
                for requirement in &clues[position].requirements {
                    // References were resolved before this pass.
                    if let Some(next) = index.get(requirement) {
                        visit(*next, clues, index, marks)?;
                    }
                }
                marks[position] = Mark::Done;
                Ok(())
            }
        }
    }

    let mut marks = vec![Mark::Unvisited; clues.len()];
    for position in 0..clues.len() {
        visit(position, clues, index, &mut marks)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clues::ClueCategory;

    fn sample_endings() -> Vec<EndingDefinition> {
        EndingKey::ALL
            .iter()
            .map(|key| EndingDefinition::new(*key, key.as_str(), "The end."))
            .collect()
    }

    fn sample_gate() -> GateRequirements {
        GateRequirements {
            clue_threshold: 2,
            require_understanding: true,
            require_cycles: true,
        }
    }

    #[test]
    fn test_embedded_story_loads() {
        let story = Storyline::load().expect("embedded story must be valid");

        assert!(story.clue_count() >= story.gate().clue_threshold);
        assert_eq!(story.gate().clue_threshold, 18);
        assert!(story.gate().require_understanding);
        assert!(story.gate().require_cycles);
        assert_eq!(story.understanding_pages().len(), 3);
        assert_eq!(story.endings().count(), 4);
    }

    #[test]
    fn test_embedded_story_graph_shape() {
        let story = Storyline::load().unwrap();

        let opener = story.clue(&ClueId::new("read-blog-chapter7")).unwrap();
        assert!(opener.requirements.is_empty());

        let cycle = story.clue(&ClueId::new("blog-cycle-47")).unwrap();
        assert!(cycle.requires(&ClueId::new("read-blog-chapter7")));

        let boundary = story.clue(&ClueId::new("writing-reality")).unwrap();
        assert_eq!(boundary.requirements, vec![ClueId::new("blog-cycle-47")]);
        assert_eq!(boundary.category, ClueCategory::Creation);

        // Both designated cycle clues resolve.
        for id in story.cycle_clues() {
            assert!(story.contains(id), "cycle clue {id} must exist");
        }
    }

    #[test]
    fn test_clues_keep_definition_order() {
        let story = Storyline::load().unwrap();
        let first = story.clues().next().unwrap();
        assert_eq!(first.id.as_str(), "read-blog-chapter7");
    }

    #[test]
    fn test_duplicate_clue_rejected() {
        let clues = vec![
            ClueDefinition::new("a", "A"),
            ClueDefinition::new("a", "A again"),
        ];
        let result = Storyline::from_parts(
            clues,
            sample_endings(),
            vec![],
            [ClueId::new("a"), ClueId::new("a")],
            sample_gate(),
        );
        assert!(matches!(result, Err(StoryError::DuplicateClue(_))));
    }

    #[test]
    fn test_unknown_requirement_rejected() {
        let clues = vec![ClueDefinition::new("a", "A").with_requirement("ghost")];
        let result = Storyline::from_parts(
            clues,
            sample_endings(),
            vec![],
            [ClueId::new("a"), ClueId::new("a")],
            sample_gate(),
        );
        assert!(matches!(result, Err(StoryError::UnknownReference { .. })));
    }

    #[test]
    fn test_requirement_cycle_rejected() {
        let clues = vec![
            ClueDefinition::new("a", "A").with_requirement("b"),
            ClueDefinition::new("b", "B").with_requirement("a"),
        ];
        let result = Storyline::from_parts(
            clues,
            sample_endings(),
            vec![],
            [ClueId::new("a"), ClueId::new("b")],
            sample_gate(),
        );
        assert!(matches!(result, Err(StoryError::RequirementCycle(_))));
    }

    #[test]
    fn test_self_requirement_rejected() {
        let clues = vec![ClueDefinition::new("a", "A").with_requirement("a")];
        let result = Storyline::from_parts(
            clues,
            sample_endings(),
            vec![],
            [ClueId::new("a"), ClueId::new("a")],
            sample_gate(),
        );
        assert!(matches!(result, Err(StoryError::RequirementCycle(_))));
    }

    #[test]
    fn test_missing_ending_rejected() {
        let mut endings = sample_endings();
        endings.pop();
        let clues = vec![ClueDefinition::new("a", "A")];
        let result = Storyline::from_parts(
            clues,
            endings,
            vec![],
            [ClueId::new("a"), ClueId::new("a")],
            sample_gate(),
        );
        assert!(matches!(result, Err(StoryError::MissingEnding(_))));
    }

    #[test]
    fn test_duplicate_ending_rejected() {
        let mut endings = sample_endings();
        endings.push(EndingDefinition::new(
            EndingKey::Meta,
            "Meta again",
            "The end, again.",
        ));
        let clues = vec![ClueDefinition::new("a", "A")];
        let result = Storyline::from_parts(
            clues,
            endings,
            vec![],
            [ClueId::new("a"), ClueId::new("a")],
            sample_gate(),
        );
        assert!(matches!(result, Err(StoryError::DuplicateEnding(_))));
    }

    #[test]
    fn test_unknown_cycle_clue_rejected() {
        let clues = vec![ClueDefinition::new("a", "A")];
        let result = Storyline::from_parts(
            clues,
            sample_endings(),
            vec![],
            [ClueId::new("a"), ClueId::new("ghost")],
            sample_gate(),
        );
        assert!(matches!(result, Err(StoryError::UnknownCycleClue(_))));
    }
}
