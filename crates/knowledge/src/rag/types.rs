//! Answer types.

use crate::types::RetrievedChunk;
use serde::{Deserialize, Serialize};

const SNIPPET_CHARS: usize = 100;

/// A generated answer and the chunks it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generator output, unmodified
    pub answer: String,

    /// Chunks placed in the prompt context, best first
    pub sources: Vec<RetrievedChunk>,
}

/// Human-readable pointer to where part of an answer came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// Document identifier, as cited in the answer
    pub source: String,

    /// e.g. "chars 0-1000"
    pub location: String,

    pub snippet: String,

    pub score: f32,
}

impl Answer {
    pub fn source_refs(&self) -> Vec<SourceRef> {
        self.sources.iter().map(SourceRef::from_retrieved).collect()
    }
}

impl SourceRef {
    fn from_retrieved(retrieved: &RetrievedChunk) -> Self {
        let chunk = &retrieved.chunk;
        let (start, end) = chunk.metadata.char_range;

        let mut snippet: String = chunk
            .text
            .chars()
            .take(SNIPPET_CHARS)
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        if chunk.metadata.char_count > SNIPPET_CHARS {
            snippet.push_str("...");
        }

        Self {
            source: chunk.source_id.clone(),
            location: format!("chars {}-{}", start, end),
            snippet: snippet.trim().to_string(),
            score: retrieved.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::types::DocType;

    #[test]
    fn test_source_refs() {
        let long = format!("First line\nsecond line {}", "x".repeat(200));
        let answer = Answer {
            answer: "done".to_string(),
            sources: vec![
                RetrievedChunk {
                    chunk: Chunk::new("notes.txt", DocType::Txt, 0, "Short\ntext".to_string(), (0, 10)),
                    score: 0.9,
                },
                RetrievedChunk {
                    chunk: Chunk::new("notes.txt", DocType::Txt, 1, long, (8, 231)),
                    score: 0.5,
                },
            ],
        };

        let refs = answer.source_refs();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].source, "notes.txt");
        assert_eq!(refs[0].location, "chars 0-10");
        assert_eq!(refs[0].snippet, "Short text");
        assert_eq!(refs[1].location, "chars 8-231");
        assert!(refs[1].snippet.starts_with("First line second line"));
        assert!(refs[1].snippet.ends_with("..."));
        assert_eq!(refs[1].snippet.chars().count(), SNIPPET_CHARS + 3);
    }
}
