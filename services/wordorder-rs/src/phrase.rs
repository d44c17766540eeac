//! Phrase grouping over dependency trees.
//!
//! Tokens are merged into phrases around content-word heads. A dependent
//! joins its head's phrase unless its relation marks a clause or argument
//! boundary. Only the run of consecutive token ids around the head is kept.

use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::types::{base_relation, DepToken, Sentence};

/// Parts of speech that can head a phrase
pub const HEAD_POS: &[&str] = &[
    "NOUN", "VERB", "ADJ", "ADV", "PROPN", "PRON", "NUM", "DET", "INTJ", "X", "SYM",
];

/// Base relations that start a new phrase instead of joining the head's
pub const BOUNDARY_DEPRELS: &[&str] = &[
    "root",
    "punct",
    "nsubj",
    "csubj",
    "obj",
    "iobj",
    "ccomp",
    "xcomp",
    "advcl",
    "acl",
    "nmod",
    "obl",
    "conj",
    "vocative",
    "dislocated",
    "orphan",
    "reparandum",
];

/// Possessive nominal modifiers always merge into their head
const POSSESSIVE: &str = "nmod:poss";

fn is_head_pos(upos: &str) -> bool {
    HEAD_POS.contains(&upos)
}

fn is_boundary(token: &DepToken) -> bool {
    let deprel = token.deprel().unwrap_or("");
    BOUNDARY_DEPRELS.contains(&base_relation(deprel)) && deprel != POSSESSIVE
}

/// Arena of token nodes with head → dependent edges
pub struct DependencyTree<'a> {
    graph: DiGraph<&'a DepToken, ()>,
    node_map: FxHashMap<u32, NodeIndex>,
}

impl<'a> DependencyTree<'a> {
    /// Build from head references; dangling heads and the root get no parent edge
    pub fn build(sentence: &'a Sentence) -> Self {
        let mut graph = DiGraph::with_capacity(sentence.len(), sentence.len());
        let mut node_map = FxHashMap::default();

        for token in &sentence.tokens {
            let idx = graph.add_node(token);
            node_map.insert(token.id, idx);
        }

        for token in &sentence.tokens {
            if token.is_root() {
                continue;
            }
            let head = node_map.get(&token.head);
            let dep = node_map.get(&token.id);
            if let (Some(&head), Some(&dep)) = (head, dep) {
                graph.add_edge(head, dep, ());
            }
        }

        Self { graph, node_map }
    }

    pub fn token(&self, id: u32) -> Option<&'a DepToken> {
        self.node_map.get(&id).map(|&idx| self.graph[idx])
    }

    /// Dependents of `id` in sentence order
    pub fn children(&self, id: u32) -> Vec<&'a DepToken> {
        let Some(&idx) = self.node_map.get(&id) else {
            return Vec::new();
        };
        let mut children: Vec<&'a DepToken> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|child| self.graph[child])
            .collect();
        children.sort_by_key(|token| token.id);
        children
    }

    /// Token ids reachable from `id` through non-boundary dependents
    fn phrase_members(&self, id: u32, included: &mut HashSet<u32>) -> Vec<u32> {
        let mut members = vec![id];
        included.insert(id);

        for child in self.children(id) {
            if included.contains(&child.id) || is_boundary(child) {
                continue;
            }
            members.extend(self.phrase_members(child.id, included));
        }

        members
    }
}

/// Group of consecutive tokens around one head
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    pub head_id: u32,
    pub head_upos: String,
    pub head_deprel: Option<String>,
    /// Member token ids, ascending
    pub token_ids: Vec<u32>,
}

/// Keep the longest run of consecutive ids that contains `head`
fn contiguous_span(mut members: Vec<u32>, head: u32) -> Vec<u32> {
    members.sort_unstable();
    let head_idx = members.iter().position(|&m| m == head).unwrap_or(0);

    let mut start = head_idx;
    while start > 0 && members[start] - members[start - 1] == 1 {
        start -= 1;
    }
    let mut end = head_idx;
    while end + 1 < members.len() && members[end + 1] - members[end] == 1 {
        end += 1;
    }

    members[start..=end].to_vec()
}

fn phrase_for(token: &DepToken, token_ids: Vec<u32>) -> Phrase {
    Phrase {
        head_id: token.id,
        head_upos: token.upos().map(str::to_string).unwrap_or_default(),
        head_deprel: token.deprel().map(str::to_string),
        token_ids,
    }
}

/// Split a sentence into phrases, ordered by their first token
pub fn merge_to_phrases(sentence: &Sentence) -> Vec<Phrase> {
    if sentence.is_empty() {
        return Vec::new();
    }

    let tree = DependencyTree::build(sentence);
    let mut included: HashSet<u32> = HashSet::new();
    let mut phrases = Vec::new();

    let build_phrase = |token: &DepToken, included: &mut HashSet<u32>| -> Phrase {
        let mut candidate = included.clone();
        let members = tree.phrase_members(token.id, &mut candidate);
        let span = contiguous_span(members, token.id);
        included.extend(span.iter().copied());
        phrase_for(token, span)
    };

    // Pass 1: independent heads claim their dependents first
    for token in &sentence.tokens {
        if included.contains(&token.id) {
            continue;
        }
        let independent = is_boundary(token) || token.is_root();
        if token.upos().is_some_and(is_head_pos) && independent {
            phrases.push(build_phrase(token, &mut included));
        }
    }

    // Pass 2: leftover heads, then single-token phrases
    for token in &sentence.tokens {
        if included.contains(&token.id) {
            continue;
        }
        if token.upos().is_some_and(is_head_pos) {
            phrases.push(build_phrase(token, &mut included));
        } else {
            included.insert(token.id);
            phrases.push(phrase_for(token, vec![token.id]));
        }
    }

    phrases.sort_by_key(|phrase| phrase.token_ids.first().copied().unwrap_or(0));
    phrases
}
