//! Shared data structures for the word-order analysis kernel.

use serde::{Deserialize, Serialize};

/// Ordered sequence of categorical tags for one sentence
pub type TagSequence = Vec<String>;

/// Token of a dependency-annotated sentence.
///
/// `head == 0` marks the sentence root. Tags use `None` for placeholder
/// omissions in the source corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepToken {
    pub id: u32,
    #[serde(default)]
    pub form: String,
    #[serde(default)]
    pub upos: Option<String>,
    #[serde(default)]
    pub head: u32,
    #[serde(default)]
    pub deprel: Option<String>,
}

impl DepToken {
    pub fn new(id: u32, upos: &str, head: u32, deprel: &str) -> Self {
        Self {
            id,
            form: String::new(),
            upos: Some(upos.to_string()),
            head,
            deprel: Some(deprel.to_string()),
        }
    }

    /// Part-of-speech tag; empty or `_` counts as missing
    pub fn upos(&self) -> Option<&str> {
        self.upos.as_deref().filter(|tag| !is_placeholder(tag))
    }

    /// Relation label including any subtype; empty or `_` counts as missing
    pub fn deprel(&self) -> Option<&str> {
        self.deprel.as_deref().filter(|rel| !is_placeholder(rel))
    }

    /// Relation label with the `:subtype` suffix removed
    pub fn base_deprel(&self) -> Option<&str> {
        self.deprel().map(base_relation)
    }

    pub fn is_root(&self) -> bool {
        self.head == 0
    }
}

/// Annotation value standing for an omitted field
pub const PLACEHOLDER: &str = "_";

pub fn is_placeholder(field: &str) -> bool {
    field.is_empty() || field == PLACEHOLDER
}

/// Strip a relation label to the part before the first colon
pub fn base_relation(deprel: &str) -> &str {
    deprel.split(':').next().unwrap_or(deprel)
}

/// Dependency-annotated sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(default)]
    pub sent_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tokens: Vec<DepToken>,
}

impl Sentence {
    pub fn new(tokens: Vec<DepToken>) -> Self {
        Self {
            tokens,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Aggregation key: (head tag, dependent tag, base relation).
///
/// Field order gives the lexicographic tuple ordering used to fix feature columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationPairKey {
    pub head: String,
    pub dependent: String,
    pub relation: String,
}

impl RelationPairKey {
    pub fn new(
        head: impl Into<String>,
        dependent: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            head: head.into(),
            dependent: dependent.into(),
            relation: relation.into(),
        }
    }
}

impl std::fmt::Display for RelationPairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}({})", self.head, self.dependent, self.relation)
    }
}

/// Accumulated direction counts for one relation pair in one language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairStats {
    /// Occurrences where the head precedes the dependent
    pub head_initial: u64,
    pub total: u64,
}

impl PairStats {
    pub fn record(&mut self, head_initial: bool) {
        self.total += 1;
        if head_initial {
            self.head_initial += 1;
        }
    }

    /// Head-initial rate; 0.5 when nothing has been observed
    pub fn rate(&self) -> f64 {
        if self.total > 0 {
            self.head_initial as f64 / self.total as f64
        } else {
            0.5
        }
    }
}

/// Edit operation in sequence alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOp {
    Match,
    Substitute,
    Insert,
    Delete,
}

/// Gap marker in aligned tag sequences
pub const GAP: &str = "-";

/// Result of aligning two tag sequences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alignment {
    pub sequence_a: Vec<String>,
    pub sequence_b: Vec<String>,
    pub operations: Vec<EditOp>,
    pub cost: usize,
}

impl Alignment {
    pub fn new(
        sequence_a: Vec<String>,
        sequence_b: Vec<String>,
        operations: Vec<EditOp>,
        cost: usize,
    ) -> Self {
        Self {
            sequence_a,
            sequence_b,
            operations,
            cost,
        }
    }

    /// Tag pairs replaced by one another in the alignment
    pub fn substitutions(&self) -> Vec<(String, String)> {
        self.operations
            .iter()
            .zip(self.sequence_a.iter().zip(&self.sequence_b))
            .filter(|(op, _)| **op == EditOp::Substitute)
            .map(|(_, (a, b))| (a.clone(), b.clone()))
            .collect()
    }
}
