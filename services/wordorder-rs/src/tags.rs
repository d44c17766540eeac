//! Reduce parsed sentences to categorical tag sequences.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::phrase::merge_to_phrases;
use crate::types::{Sentence, TagSequence};

/// Which tag each sequence element carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// Universal part-of-speech tag per token
    Upos,
    /// Base dependency relation per token
    Deprel,
    /// Part-of-speech tag of each phrase head
    PhraseHead,
}

impl TagKind {
    pub const ALL: [TagKind; 3] = [TagKind::Upos, TagKind::Deprel, TagKind::PhraseHead];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upos => "upos",
            Self::Deprel => "deprel",
            Self::PhraseHead => "phrase_head",
        }
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags of one sentence; tokens without the requested tag are left out
pub fn tag_sequence(sentence: &Sentence, kind: TagKind) -> TagSequence {
    match kind {
        TagKind::Upos => sentence
            .tokens
            .iter()
            .filter_map(|token| token.upos())
            .map(str::to_string)
            .collect(),
        TagKind::Deprel => sentence
            .tokens
            .iter()
            .filter_map(|token| token.base_deprel())
            .map(str::to_string)
            .collect(),
        TagKind::PhraseHead => merge_to_phrases(sentence)
            .into_iter()
            .map(|phrase| phrase.head_upos)
            .filter(|upos| !upos.is_empty())
            .collect(),
    }
}

/// Non-empty tag sequences of a sentence collection, in corpus order
pub fn tag_sequences(sentences: &[Sentence], kind: TagKind) -> Vec<TagSequence> {
    sentences
        .iter()
        .map(|sentence| tag_sequence(sentence, kind))
        .filter(|sequence| !sequence.is_empty())
        .collect()
}

/// Tag sequences for every language of a corpus
pub fn corpus_tag_sequences(
    corpus: &BTreeMap<String, Vec<Sentence>>,
    kind: TagKind,
) -> BTreeMap<String, Vec<TagSequence>> {
    corpus
        .par_iter()
        .map(|(language, sentences)| (language.clone(), tag_sequences(sentences, kind)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DepToken;

    fn sentence() -> Sentence {
        let mut placeholder = DepToken::new(4, "PUNCT", 2, "punct");
        placeholder.upos = None;
        Sentence::new(vec![
            DepToken::new(1, "PRON", 2, "nsubj"),
            DepToken::new(2, "VERB", 0, "root"),
            DepToken::new(3, "NOUN", 2, "obl:tmod"),
            placeholder,
        ])
    }

    #[test]
    fn test_upos_sequence_skips_missing() {
        assert_eq!(tag_sequence(&sentence(), TagKind::Upos), vec!["PRON", "VERB", "NOUN"]);
    }

    #[test]
    fn test_deprel_sequence_uses_base() {
        assert_eq!(
            tag_sequence(&sentence(), TagKind::Deprel),
            vec!["nsubj", "root", "obl", "punct"]
        );
    }

    #[test]
    fn test_phrase_head_sequence() {
        assert_eq!(
            tag_sequence(&sentence(), TagKind::PhraseHead),
            vec!["PRON", "VERB", "NOUN"]
        );
    }

    #[test]
    fn test_empty_sentences_are_dropped() {
        let sentences = vec![Sentence::default(), sentence()];
        assert_eq!(tag_sequences(&sentences, TagKind::Upos).len(), 1);
    }
}
