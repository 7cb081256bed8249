//! The four narrative branches the finale can resolve to.

use serde::{Deserialize, Serialize};

/// Key of a narrative ending. The set is closed: the story resolves into
/// exactly one of these four branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndingKey {
    /// The novelist turns himself in and writes his way back.
    Redemption,
    /// The plan is carried out; the law answers.
    Condemnation,
    /// Neither crime nor confession - the case stays open forever.
    Mystery,
    /// The character recognizes the reader.
    Meta,
}

impl EndingKey {
    /// All four branches, in presentation order.
    pub const ALL: [EndingKey; 4] = [
        EndingKey::Redemption,
        EndingKey::Condemnation,
        EndingKey::Mystery,
        EndingKey::Meta,
    ];

    /// The stable wire string used in persisted state and page callbacks.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndingKey::Redemption => "redemption",
            EndingKey::Condemnation => "condemnation",
            EndingKey::Mystery => "mystery",
            EndingKey::Meta => "meta",
        }
    }

    /// Parse a wire string. Unknown strings yield `None` rather than an
    /// error; callers treat them as a no-op.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "redemption" => Some(EndingKey::Redemption),
            "condemnation" => Some(EndingKey::Condemnation),
            "mystery" => Some(EndingKey::Mystery),
            "meta" => Some(EndingKey::Meta),
            _ => None,
        }
    }

    /// Achievement id recorded when this ending is viewed.
    pub fn achievement_id(&self) -> String {
        format!("ending_{}", self.as_str())
    }
}

impl std::fmt::Display for EndingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One narrative conclusion: a title and the multi-paragraph closing text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndingDefinition {
    pub key: EndingKey,
    pub title: String,
    pub story: String,
}

impl EndingDefinition {
    /// Create a new ending definition.
    pub fn new(key: EndingKey, title: impl Into<String>, story: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            story: story.into(),
        }
    }

    /// The story text split into display paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.story
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}
