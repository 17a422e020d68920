use serde::Serialize;
use std::collections::BTreeMap;

use crate::digest::sentences::split_sentences;

pub const DEFAULT_MAX_KEY_POINTS: usize = 5;

const STOPWORDS: [&str; 48] = [
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "his", "how", "its", "may", "new", "now", "who", "did",
    "she", "him", "they", "this", "that", "with", "from", "were", "been", "into", "than", "then",
    "them", "these", "those", "there", "their", "what", "when", "which", "will", "would",
];
const MIN_TERM_CHARS: usize = 3;
const SHORT_SENTENCE_WORDS: usize = 5;
const LONG_SENTENCE_WORDS: usize = 40;

const WEIGHT_DENSITY: f64 = 0.40;
const WEIGHT_POSITION: f64 = 0.35;
const WEIGHT_LENGTH: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyPoint {
    pub index: usize,
    pub text: String,
    pub score: f64,
}

fn content_terms(sentence: &str) -> Vec<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| w.chars().count() >= MIN_TERM_CHARS)
        .filter(|w| !w.chars().all(|c| c.is_numeric()))
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

fn length_score(sentence: &str) -> f64 {
    let words = sentence.split_whitespace().count();
    if words < SHORT_SENTENCE_WORDS {
        0.3
    } else if words > LONG_SENTENCE_WORDS {
        0.6
    } else {
        1.0
    }
}

fn position_score(index: usize, total: usize) -> f64 {
    if total <= 1 {
        return 1.0;
    }
    1.0 - (index as f64 / total as f64)
}

fn score_sentences(sentences: &[String]) -> Vec<KeyPoint> {
    let terms: Vec<Vec<String>> = sentences.iter().map(|s| content_terms(s)).collect();

    let mut frequency = BTreeMap::<&str, usize>::new();
    for term in terms.iter().flatten() {
        *frequency.entry(term.as_str()).or_insert(0) += 1;
    }
    let max_frequency = frequency.values().copied().max().unwrap_or(1) as f64;

    sentences
        .iter()
        .zip(&terms)
        .enumerate()
        .map(|(index, (sentence, sentence_terms))| {
            let density = if sentence_terms.is_empty() {
                0.0
            } else {
                let total: usize = sentence_terms
                    .iter()
                    .map(|t| frequency.get(t.as_str()).copied().unwrap_or(0))
                    .sum();
                (total as f64 / sentence_terms.len() as f64) / max_frequency
            };
            let score = WEIGHT_DENSITY * density
                + WEIGHT_POSITION * position_score(index, sentences.len())
                + WEIGHT_LENGTH * length_score(sentence);
            KeyPoint {
                index,
                text: sentence.clone(),
                score,
            }
        })
        .collect()
}

/// Rank sentences by position, length and keyword density and keep the best
/// `max_points`, returned in document order.
pub fn extract_key_points(text: &str, max_points: usize) -> Vec<KeyPoint> {
    let sentences = split_sentences(text);
    let mut ranked = score_sentences(&sentences);
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    ranked.truncate(max_points);
    ranked.sort_by_key(|p| p.index);
    ranked
}
