use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::digest::sentences::split_sentences;

/// Block sizes for the opening/middle/closing extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub head: usize,
    pub middle: usize,
    pub tail: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            head: 4,
            middle: 3,
            tail: 3,
        }
    }
}

impl FallbackConfig {
    pub fn sentence_budget(&self) -> usize {
        self.head + self.middle + self.tail
    }
}

fn representative_indices(total: usize, blocks: &FallbackConfig) -> BTreeSet<usize> {
    let mut picked = BTreeSet::new();
    picked.extend(0..blocks.head.min(total));

    let middle = blocks.middle.min(total);
    let middle_start = (total - middle) / 2;
    picked.extend(middle_start..middle_start + middle);

    let tail = blocks.tail.min(total);
    picked.extend(total - tail..total);
    picked
}

/// Pick representative sentences without any model involvement.
///
/// With `count` or fewer sentences the whole text comes back; otherwise the
/// first, middle and last blocks are concatenated in document order.
pub fn extract_representative_with(text: &str, count: usize, blocks: &FallbackConfig) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= count {
        return sentences.join(" ");
    }

    representative_indices(sentences.len(), blocks)
        .into_iter()
        .map(|idx| sentences[idx].as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
