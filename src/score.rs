use std::collections::HashMap;
use std::fs::File;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

// Default keyword weights, tuned for fault-tolerant quantum computation.
const DEFAULT_KEYWORDS: &[(&str, i32)] = &[
    ("topological", 10),
    ("qubit", 5),
    ("qec", 20),
    ("tqec", 20),
    ("ftqc", 20),
    ("ftqec", 20),
    ("fault tolerant", 25),
    ("error correction", 20),
    ("error", 5),
    ("surface code", 20),
    ("code", 10),
    ("circuit", 15),
    ("quantum computing", 15),
    ("computer", 15),
    ("lower", 5),
    ("distillation", 4),
    ("threshold", 6),
    ("cluster state", 15),
    ("error rate", 10),
    ("classical processing", 15),
    ("ion trap", 10),
    ("scalability", 8),
    ("scalable", 8),
    ("stabiliser", 15),
    ("minimum weight", 25),
    ("perfect matching", 25),
    ("gate", 10),
    ("cnot", 15),
    ("shor", 20),
    ("pauli", 20),
    ("clifford", 20),
    ("toffoli", 20),
    ("grover", 20),
    ("algorithm", 20),
    ("hadamard", 10),
    ("unitary", 5),
    ("logical qubit", 15),
    ("logical", 7),
    ("nearest neighbour", 15),
    ("nearest neighbor", 15),
];

static NON_WORD_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]+").unwrap());

/// Phrase-to-weight table. Loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Keywords(HashMap<String, i32>);

impl Default for Keywords {
    fn default() -> Self {
        Keywords(
            DEFAULT_KEYWORDS
                .iter()
                .map(|&(phrase, weight)| (phrase.to_string(), weight))
                .collect(),
        )
    }
}

impl Keywords {
    /// Load a `{"phrase": weight, ...}` table from a JSON file.
    pub fn from_json_file(path: &str) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening keyword table {}", path))?;
        let table: HashMap<String, i32> = serde_json::from_reader(file)
            .with_context(|| format!("parsing keyword table {}", path))?;
        Ok(Keywords(table))
    }
}

/// Scores titles and abstracts against the keyword table. Both the table
/// phrases and the scored text go through the same clean/tokenize/stem
/// pipeline, so inflection differences still match.
pub struct RelevanceScorer {
    stemmer: Stemmer,
    phrases: Vec<(Vec<String>, i32)>,
}

impl RelevanceScorer {
    pub fn new(keywords: &Keywords) -> Self {
        let stemmer = Stemmer::create(Algorithm::English);
        let phrases = keywords
            .0
            .iter()
            .map(|(phrase, &weight)| (tokenize(&stemmer, phrase), weight))
            .filter(|(ngram, _)| !ngram.is_empty())
            .collect();
        RelevanceScorer { stemmer, phrases }
    }

    /// Title hits count for half again as much as abstract hits. Presence is
    /// binary per keyword per field; repeats add nothing.
    pub fn score(&self, title: &str, abstract_text: &str) -> f32 {
        let title_tokens = tokenize(&self.stemmer, title);
        let abstract_tokens = tokenize(&self.stemmer, abstract_text);
        self.find_keywords(&title_tokens) as f32 * 1.5
            + self.find_keywords(&abstract_tokens) as f32
    }

    fn find_keywords(&self, tokens: &[String]) -> i32 {
        self.phrases
            .iter()
            .filter(|(ngram, _)| tokens.windows(ngram.len()).any(|w| w == ngram.as_slice()))
            .map(|&(_, weight)| weight)
            .sum()
    }
}

/// Strip apostrophes, turn every other punctuation run into a space, then
/// split and stem. Stems are lowercase.
fn tokenize(stemmer: &Stemmer, text: &str) -> Vec<String> {
    let text = text.replace('\'', "");
    NON_WORD_RUNS
        .replace_all(&text, " ")
        .split_whitespace()
        .map(|token| stemmer.stem(&token.to_lowercase()).into_owned())
        .collect()
}
