//! Candidate cut positions, grouped by separator strength.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Separator kinds, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryLevel {
    /// Blank line
    Paragraph,
    /// Single newline
    Line,
    /// Unicode sentence boundary
    Sentence,
    /// Any whitespace character
    Whitespace,
}

impl BoundaryLevel {
    pub const ALL: [BoundaryLevel; 4] = [
        BoundaryLevel::Paragraph,
        BoundaryLevel::Line,
        BoundaryLevel::Sentence,
        BoundaryLevel::Whitespace,
    ];

    fn index(self) -> usize {
        match self {
            BoundaryLevel::Paragraph => 0,
            BoundaryLevel::Line => 1,
            BoundaryLevel::Sentence => 2,
            BoundaryLevel::Whitespace => 3,
        }
    }
}

/// Cut positions of one text, in character offsets.
///
/// A cut at `p` ends a chunk just before character `p`. Every list is
/// sorted ascending.
pub(crate) struct BoundaryMap {
    char_to_byte: Vec<usize>,
    cuts: [Vec<usize>; 4],
}

impl BoundaryMap {
    pub fn new(text: &str) -> Self {
        let mut char_to_byte = Vec::with_capacity(text.len() + 1);
        let mut paragraph = Vec::new();
        let mut line = Vec::new();
        let mut whitespace = Vec::new();
        let mut after_newline = false;

        for (i, (byte, ch)) in text.char_indices().enumerate() {
            char_to_byte.push(byte);
            let cut = i + 1;

            if ch == '\n' {
                line.push(cut);
                if after_newline {
                    paragraph.push(cut);
                }
            }
            if ch.is_whitespace() {
                whitespace.push(cut);
            }
            // "\r\n\r\n" still counts as a blank line
            after_newline = ch == '\n' || (ch == '\r' && after_newline);
        }
        char_to_byte.push(text.len());

        let sentence = text
            .split_sentence_bound_indices()
            .filter(|(byte, _)| *byte > 0)
            .filter_map(|(byte, _)| char_to_byte.binary_search(&byte).ok())
            .collect();

        Self {
            char_to_byte,
            cuts: [paragraph, line, sentence, whitespace],
        }
    }

    /// Number of characters in the text.
    pub fn char_len(&self) -> usize {
        self.char_to_byte.len() - 1
    }

    /// Text between two character offsets.
    pub fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> &'a str {
        &text[self.char_to_byte[start]..self.char_to_byte[end]]
    }

    /// Best cut in `(lo, hi]`: the last one of the strongest level that has
    /// any, or `hi` itself when no separator falls in range.
    pub fn best_cut(&self, lo: usize, hi: usize) -> (usize, Option<BoundaryLevel>) {
        BoundaryLevel::ALL
            .iter()
            .find_map(|level| last_within(&self.cuts[level.index()], lo, hi).map(|p| (p, Some(*level))))
            .unwrap_or((hi, None))
    }
}

fn last_within(cuts: &[usize], lo: usize, hi: usize) -> Option<usize> {
    let idx = cuts.partition_point(|&p| p <= hi);
    match idx {
        0 => None,
        _ => Some(cuts[idx - 1]).filter(|&p| p > lo),
    }
}
