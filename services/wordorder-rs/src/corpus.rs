//! Corpus ingestion: CoNLL-U text and processed JSON collections.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::types::{is_placeholder, DepToken, Sentence, PLACEHOLDER};

/// Parallel Universal Dependencies languages
const PUD_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("zh", "Chinese"),
    ("cs", "Czech"),
    ("en", "English"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("gl", "Galician"),
    ("de", "German"),
    ("hi", "Hindi"),
    ("is", "Icelandic"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("es", "Spanish"),
    ("sv", "Swedish"),
    ("th", "Thai"),
    ("tr", "Turkish"),
];

const ADDITIONAL_LANGUAGES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("fo", "Faroese"),
    ("he", "Hebrew"),
    ("ga", "Irish"),
    ("kpv", "Komi_Zyrian"),
    ("yrk", "Nenets"),
    ("nn", "Norwegian_Nynorsk"),
    ("no", "Norwegian"),
    ("sa", "Sanskrit"),
    ("tl", "Tagalog"),
    ("ta", "Tamil"),
    ("uz", "Uzbek"),
    ("vi", "Vietnamese"),
    ("sah", "Yakut"),
];

/// Language name for a treebank code, or the uppercased code if unknown
pub fn language_name(code: &str) -> String {
    PUD_LANGUAGES
        .iter()
        .chain(ADDITIONAL_LANGUAGES)
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_uppercase())
}

/// One language's sentence collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub language: String,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

impl Corpus {
    /// Parse the processed JSON format
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_conllu_str(language: impl Into<String>, input: &str) -> Self {
        Self {
            language: language.into(),
            sentences: parse_conllu(input),
        }
    }
}

fn optional_field(field: &str) -> Option<String> {
    (!is_placeholder(field)).then(|| field.to_string())
}

/// Parse one token line; `None` for multi-word ranges, empty nodes and malformed lines
fn parse_token_line(line: &str) -> Option<DepToken> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 10 {
        warn!("skipping token line with {} fields: {:.50}", fields.len(), line);
        return None;
    }

    let id_field = fields[0];
    if id_field.contains('-') || id_field.contains('.') {
        return None;
    }

    let id = match id_field.parse::<u32>() {
        Ok(id) => id,
        Err(err) => {
            warn!("skipping token line with bad id {:?}: {}", id_field, err);
            return None;
        }
    };

    let head = match fields[6] {
        PLACEHOLDER => 0,
        raw => match raw.parse::<u32>() {
            Ok(head) => head,
            Err(err) => {
                warn!("skipping token {} with bad head {:?}: {}", id, raw, err);
                return None;
            }
        },
    };

    Some(DepToken {
        id,
        form: fields[1].to_string(),
        upos: optional_field(fields[3]),
        head,
        deprel: optional_field(fields[7]),
    })
}

/// Parse CoNLL-U text into sentences.
///
/// `# sent_id` and `# text` comments fill sentence metadata. Sentences
/// without tokens are dropped.
pub fn parse_conllu(input: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut current = Sentence::default();

    let mut flush = |current: &mut Sentence| {
        let finished = std::mem::take(current);
        if !finished.is_empty() {
            sentences.push(finished);
        }
    };

    for line in input.lines() {
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            flush(&mut current);
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if let Some((key, value)) = comment.split_once('=') {
                match key.trim() {
                    "sent_id" => {
                        // A new id without a blank line still starts a new sentence
                        flush(&mut current);
                        current.sent_id = value.trim().to_string();
                    }
                    "text" => current.text = value.trim().to_string(),
                    _ => {}
                }
            }
            continue;
        }

        if let Some(token) = parse_token_line(line) {
            current.tokens.push(token);
        }
    }
    flush(&mut current);

    sentences
}

/// Load every `*.json` and `*.conllu` collection in `dir`, keyed by language.
///
/// Files are read in filename order; a later file for the same language
/// replaces the earlier one.
pub fn load_corpus_dir(dir: impl AsRef<Path>) -> Result<BTreeMap<String, Vec<Sentence>>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|err| AnalysisError::io(dir, err))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| AnalysisError::io(dir, err))?;
        paths.push(entry.path());
    }
    paths.sort();

    let mut corpus = BTreeMap::new();
    for path in paths {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            continue;
        };
        if extension != "json" && extension != "conllu" {
            continue;
        }

        let contents = fs::read_to_string(&path).map_err(|err| AnalysisError::io(&path, err))?;
        let collection = if extension == "json" {
            Corpus::from_json_str(&contents)?
        } else {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let code = stem.split('_').next().unwrap_or(stem);
            Corpus::from_conllu_str(language_name(code), &contents)
        };

        info!(
            "loaded {} sentences for {} from {}",
            collection.sentences.len(),
            collection.language,
            path.display()
        );
        let language = collection.language;
        if corpus.insert(language.clone(), collection.sentences).is_some() {
            warn!("{} loaded twice; keeping {}", language, path.display());
        }
    }

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# sent_id = n01001011\n\
# text = The dog barks.\n\
1\tThe\tthe\tDET\tDT\t_\t2\tdet\t_\t_\n\
2\tdog\tdog\tNOUN\tNN\t_\t3\tnsubj\t_\t_\n\
3\tbarks\tbark\tVERB\tVBZ\t_\t0\troot\t_\tSpaceAfter=No\n\
4\t.\t.\tPUNCT\t.\t_\t3\tpunct\t_\t_\n\
\n\
# sent_id = n01001012\n\
1-2\tdon't\t_\t_\t_\t_\t_\t_\t_\t_\n\
1\tdo\tdo\tAUX\t_\t_\t3\taux\t_\t_\n\
2\tn't\tnot\tPART\t_\t_\t3\tadvmod\t_\t_\n\
3\tgo\tgo\tVERB\t_\t_\t0\troot\t_\t_\n\
3.1\tgo\tgo\tVERB\t_\t_\t_\t_\t_\t_\n";

    #[test]
    fn test_parse_sentences() {
        let sentences = parse_conllu(SAMPLE);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].sent_id, "n01001011");
        assert_eq!(sentences[0].text, "The dog barks.");
        assert_eq!(sentences[0].tokens.len(), 4);
        assert_eq!(sentences[0].tokens[1].head, 3);
        assert_eq!(sentences[0].tokens[1].deprel.as_deref(), Some("nsubj"));
    }

    #[test]
    fn test_ranges_and_empty_nodes_skipped() {
        let sentences = parse_conllu(SAMPLE);
        let ids: Vec<u32> = sentences[1].tokens.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_placeholders_become_missing() {
        let input = "1\tx\tx\t_\t_\t_\t_\t_\t_\t_\n";
        let sentences = parse_conllu(input);
        assert_eq!(sentences.len(), 1);
        let token = &sentences[0].tokens[0];
        assert_eq!(token.upos, None);
        assert_eq!(token.deprel, None);
        assert_eq!(token.head, 0);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let input = "1\tshort\tline\n2\tok\tok\tNOUN\t_\t_\t0\troot\t_\t_\n";
        let sentences = parse_conllu(input);
        assert_eq!(sentences[0].tokens.len(), 1);
        assert_eq!(sentences[0].tokens[0].id, 2);
    }

    #[test]
    fn test_json_corpus() {
        let input = r#"{
            "language": "English",
            "sentence_count": 1,
            "sentences": [{
                "sent_id": "1",
                "text": "Dogs bark",
                "tokens": [
                    {"id": 1, "form": "Dogs", "lemma": "dog", "upos": "NOUN", "head": 2, "deprel": "nsubj", "feats": {}},
                    {"id": 2, "form": "bark", "upos": "VERB", "head": 0, "deprel": "root", "xpos": null}
                ]
            }]
        }"#;
        let corpus = Corpus::from_json_str(input).unwrap();
        assert_eq!(corpus.language, "English");
        assert_eq!(corpus.sentences[0].tokens[0].upos.as_deref(), Some("NOUN"));
    }

    #[test]
    fn test_json_and_conllu_placeholders_agree() {
        use crate::head_direction::extract_head_dependent_pairs;
        use crate::tags::{tag_sequence, TagKind};

        let json = r#"{
            "language": "English",
            "sentences": [{"tokens": [
                {"id": 1, "form": "x", "upos": "_", "head": 2, "deprel": "nsubj"},
                {"id": 2, "form": "runs", "upos": "VERB", "head": 0, "deprel": "root"},
                {"id": 3, "form": "y", "upos": "ADV", "head": 2, "deprel": "_"}
            ]}]
        }"#;
        let conllu = "1\tx\tx\t_\t_\t_\t2\tnsubj\t_\t_\n\
2\truns\trun\tVERB\t_\t_\t0\troot\t_\t_\n\
3\ty\ty\tADV\t_\t_\t2\t_\t_\t_\n";

        let from_json = Corpus::from_json_str(json).unwrap().sentences;
        let from_conllu = Corpus::from_conllu_str("English", conllu).sentences;

        let json_pairs = extract_head_dependent_pairs(&from_json, false, true);
        assert!(json_pairs.is_empty());
        assert_eq!(json_pairs, extract_head_dependent_pairs(&from_conllu, false, true));

        for kind in TagKind::ALL {
            assert_eq!(
                tag_sequence(&from_json[0], kind),
                tag_sequence(&from_conllu[0], kind)
            );
        }
        assert_eq!(tag_sequence(&from_json[0], TagKind::Upos), vec!["VERB", "ADV"]);
    }

    #[test]
    fn test_later_file_replaces_language() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a_english.json"),
            r#"{"language": "English", "sentences": []}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("en_pud.conllu"),
            "1\tgo\tgo\tVERB\t_\t_\t0\troot\t_\t_\n",
        )
        .unwrap();

        let corpus = load_corpus_dir(dir.path()).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus["English"].len(), 1);
    }

    #[test]
    fn test_language_names() {
        assert_eq!(language_name("ja"), "Japanese");
        assert_eq!(language_name("sah"), "Yakut");
        assert_eq!(language_name("xx"), "XX");
    }
}
