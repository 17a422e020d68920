use serde::Serialize;
use tracing::debug;

use crate::digest::sentences::{char_len, split_sentences};

pub const DEFAULT_MAX_SEGMENT_CHARS: usize = 700;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub index: usize,
    pub text: String,
    pub sentence_count: usize,
}

impl Segment {
    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }
}

#[derive(Default)]
struct SegmentBuffer {
    text: String,
    chars: usize,
    sentences: usize,
}

impl SegmentBuffer {
    fn is_empty(&self) -> bool {
        self.sentences == 0
    }

    fn len_with(&self, sentence_chars: usize) -> usize {
        if self.is_empty() {
            sentence_chars
        } else {
            self.chars + 1 + sentence_chars
        }
    }

    fn push(&mut self, sentence: &str, sentence_chars: usize) {
        if !self.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(sentence);
        self.chars = self.len_with(sentence_chars);
        self.sentences += 1;
    }

    fn close(&mut self, index: usize) -> Segment {
        let done = std::mem::take(self);
        Segment {
            index,
            text: done.text,
            sentence_count: done.sentences,
        }
    }
}

/// Greedily pack whole sentences into segments shorter than `max_length`
/// characters. A sentence that alone reaches the limit becomes its own
/// oversized segment; nothing is truncated.
pub fn segment(text: &str, max_length: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut buffer = SegmentBuffer::default();

    for sentence in split_sentences(text) {
        let sentence_chars = char_len(&sentence);
        if !buffer.is_empty() && buffer.len_with(sentence_chars) >= max_length {
            segments.push(buffer.close(segments.len()));
        }
        buffer.push(&sentence, sentence_chars);
    }
    if !buffer.is_empty() {
        segments.push(buffer.close(segments.len()));
    }

    debug!(
        segments = segments.len(),
        max_length, "segmented document"
    );
    segments
}
