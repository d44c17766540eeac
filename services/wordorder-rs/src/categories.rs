//! Coarse category tables for merged head-direction analysis.
//!
//! Groups the 17 Universal POS tags into six buckets and the UD relation
//! labels into eight, shrinking the relation-pair feature space. Unknown
//! tags fall back to [`OTHER`].

/// Catch-all bucket for unrecognized tags and relations
pub const OTHER: &str = "OTHER";

/// Part-of-speech tag treated as punctuation
pub const PUNCT: &str = "PUNCT";

/// UPOS tag → coarse category
pub const UPOS_MERGE: &[(&str, &str)] = &[
    ("NOUN", "NOMINAL"),
    ("PROPN", "NOMINAL"),
    ("PRON", "NOMINAL"),
    ("VERB", "VERBAL"),
    ("AUX", "VERBAL"),
    ("ADJ", "MODIFIER"),
    ("ADV", "MODIFIER"),
    ("ADP", "FUNCTION"),
    ("DET", "FUNCTION"),
    ("PART", "FUNCTION"),
    ("SCONJ", "FUNCTION"),
    ("CCONJ", "FUNCTION"),
    ("NUM", "OTHER"),
    ("INTJ", "OTHER"),
    ("SYM", "OTHER"),
    ("X", "OTHER"),
    ("PUNCT", "PUNCT"),
];

/// Base relation label → coarse category
pub const DEPREL_MERGE: &[(&str, &str)] = &[
    ("nsubj", "CORE_ARG"),
    ("obj", "CORE_ARG"),
    ("iobj", "CORE_ARG"),
    ("csubj", "CORE_ARG"),
    ("ccomp", "CORE_ARG"),
    ("xcomp", "CORE_ARG"),
    ("obl", "OBLIQUE"),
    ("advcl", "OBLIQUE"),
    ("amod", "MODIFIER"),
    ("advmod", "MODIFIER"),
    ("nummod", "MODIFIER"),
    ("acl", "MODIFIER"),
    ("case", "FUNCTION"),
    ("det", "FUNCTION"),
    ("mark", "FUNCTION"),
    ("cop", "FUNCTION"),
    ("aux", "FUNCTION"),
    ("nmod", "NOMINAL_MOD"),
    ("appos", "NOMINAL_MOD"),
    ("compound", "COMPOUND"),
    ("flat", "COMPOUND"),
    ("fixed", "COMPOUND"),
    ("conj", "COORD"),
    ("cc", "COORD"),
];

fn lookup(table: &'static [(&'static str, &'static str)], tag: &str) -> &'static str {
    table
        .iter()
        .find(|(source, _)| *source == tag)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(OTHER)
}

/// Map a UPOS tag to its coarse category
pub fn merge_upos(upos: &str) -> &'static str {
    lookup(UPOS_MERGE, upos)
}

/// Map a relation label (subtype allowed) to its coarse category
pub fn merge_deprel(deprel: &str) -> &'static str {
    lookup(DEPREL_MERGE, crate::types::base_relation(deprel))
}
