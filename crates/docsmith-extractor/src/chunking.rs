//! Splitting oversized documents into ordered chunks
//!
//! The splitter partitions a document into `chunk_count` contiguous slices at
//! proportional character offsets. It is deliberately not boundary-aware: a
//! table or statement can be severed mid-definition. Boundary-aware splitting
//! (on heading/blank-line boundaries) is a known, deferred improvement.

use crate::profile::estimate_tokens;

/// One bounded slice of a source document, processed as one completion call
///
/// Ephemeral: produced per parse run and discarded after use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    /// 0-based position in the run
    pub index: usize,

    /// Ordinal section label; `None` when the document was not split
    pub label: Option<String>,

    /// Text slice
    pub text: String,

    /// Estimated token cost of this slice
    pub estimated_tokens: u64,
}

/// Partition `text` into `chunk_count` contiguous slices
///
/// Slice boundaries are proportional **character** offsets
/// (`start_i = floor(chars * i / chunk_count)`), so multi-byte text is never
/// split inside a code point. `chunk_count <= 1` returns a single unlabeled
/// chunk containing the whole document.
pub fn split(text: &str, chunk_count: usize) -> Vec<DocumentChunk> {
    if chunk_count <= 1 {
        return vec![DocumentChunk {
            index: 0,
            label: None,
            text: text.to_string(),
            estimated_tokens: estimate_tokens(text),
        }];
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    (0..chunk_count)
        .map(|i| {
            let start = total * i / chunk_count;
            let end = total * (i + 1) / chunk_count;
            let slice: String = chars[start..end].iter().collect();
            DocumentChunk {
                index: i,
                label: Some(format!("Part {} of {}", i + 1, chunk_count)),
                estimated_tokens: estimate_tokens(&slice),
                text: slice,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_is_whole_unlabeled_document() {
        let chunks = split("whole document", 1);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "whole document");
        assert!(chunks[0].label.is_none());
    }

    #[test]
    fn test_zero_chunk_count_behaves_like_one() {
        let chunks = split("text", 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "text");
    }

    #[test]
    fn test_chunks_are_contiguous_and_ordered() {
        let text = "abcdefghij";
        let chunks = split(text, 3);
        assert_eq!(chunks.len(), 3);

        let rejoined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rejoined, text);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.label.as_deref(), Some(format!("Part {} of 3", i + 1).as_str()));
        }
    }

    #[test]
    fn test_proportional_offsets() {
        // 10 chars into 3 chunks: floor boundaries at 0, 3, 6, 10
        let chunks = split("abcdefghij", 3);
        assert_eq!(chunks[0].text, "abc");
        assert_eq!(chunks[1].text, "def");
        assert_eq!(chunks[2].text, "ghij");
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let text = "用户登录接口设计文档";
        let chunks = split(text, 3);
        let rejoined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rejoined, text);
        // every chunk is valid UTF-8 by construction; check the division
        assert_eq!(chunks[0].text.chars().count(), 3);
    }

    #[test]
    fn test_more_chunks_than_chars() {
        let chunks = split("ab", 4);
        assert_eq!(chunks.len(), 4);
        let rejoined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rejoined, "ab");
    }

    #[test]
    fn test_chunk_token_estimates_sum_to_document_estimate_or_more() {
        // Per-chunk ceil can only round up relative to the whole document
        let text = "The users table stores accounts. ".repeat(50);
        let whole = estimate_tokens(&text);
        let chunks = split(&text, 7);
        let sum: u64 = chunks.iter().map(|c| c.estimated_tokens).sum();
        assert!(sum >= whole);
        assert!(sum <= whole + chunks.len() as u64);
    }
}
