//! Document profiling: token estimation and budget arithmetic
//!
//! The profiler decides, before any backend call, whether a document fits in
//! one completion request or must be chunked, and how long processing is
//! likely to take. It is a pure function of the document text and the
//! provider limits.

use docsmith_llm::ProviderLimits;

/// Profile of one document against one provider's budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentProfile {
    /// Estimated completion-backend tokens for the whole document
    pub estimated_tokens: u64,

    /// Number of chunks a parse run will use (>= 1)
    pub chunk_count: usize,

    /// Whether the document exceeds the single-call budget
    pub needs_chunking: bool,

    /// Linear processing-time estimate in seconds, for progress UI only
    pub estimated_seconds: u64,
}

/// Estimates token cost and chunking requirements for documents
#[derive(Debug, Clone, Copy)]
pub struct DocumentProfiler {
    available_budget: u64,
    seconds_per_chunk: u64,
}

impl DocumentProfiler {
    /// Create a profiler from provider limits and the per-call prompt overhead
    ///
    /// The available budget is the provider's input limit minus the fixed
    /// overhead reserved for the system instruction. The caller validates
    /// that the overhead is below the limit; a degenerate budget is clamped
    /// to 1 so the arithmetic stays defined.
    pub fn new(limits: ProviderLimits, prompt_overhead_tokens: u64) -> Self {
        let available_budget = limits
            .max_input_tokens
            .saturating_sub(prompt_overhead_tokens)
            .max(1);
        Self {
            available_budget,
            seconds_per_chunk: limits.seconds_per_chunk,
        }
    }

    /// Tokens a single chunk may carry
    pub fn available_budget(&self) -> u64 {
        self.available_budget
    }

    /// Profile a document
    pub fn profile(&self, text: &str) -> DocumentProfile {
        let estimated_tokens = estimate_tokens(text);
        let chunk_count = (estimated_tokens.div_ceil(self.available_budget)).max(1) as usize;
        DocumentProfile {
            estimated_tokens,
            chunk_count,
            needs_chunking: estimated_tokens > self.available_budget,
            estimated_seconds: chunk_count as u64 * self.seconds_per_chunk,
        }
    }
}

/// Estimate the completion-backend token cost of a text
///
/// Wide (CJK-range) characters count as 2 tokens, everything else as 0.75,
/// rounded up. Multi-byte script characters cost proportionally more backend
/// tokens than ASCII, so the weighting is asymmetric.
pub fn estimate_tokens(text: &str) -> u64 {
    let mut wide: u64 = 0;
    let mut narrow: u64 = 0;
    for c in text.chars() {
        if is_wide_char(c) {
            wide += 1;
        } else {
            narrow += 1;
        }
    }
    ((wide * 2) as f64 + narrow as f64 * 0.75).ceil() as u64
}

/// Whether a character falls in the wide (CJK-range) script blocks
fn is_wide_char(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'   // CJK punctuation
        | '\u{3040}'..='\u{30FF}' // Hiragana, Katakana
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{AC00}'..='\u{D7AF}' // Hangul syllables
        | '\u{F900}'..='\u{FAFF}' // CJK compatibility ideographs
        | '\u{FF00}'..='\u{FFEF}' // full-width forms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_input_tokens: u64) -> ProviderLimits {
        ProviderLimits {
            max_input_tokens,
            seconds_per_chunk: 10,
        }
    }

    #[test]
    fn test_ascii_weighting() {
        // 100 ASCII chars * 0.75 = 75
        let text = "a".repeat(100);
        assert_eq!(estimate_tokens(&text), 75);
    }

    #[test]
    fn test_cjk_weighting() {
        // 10 CJK chars * 2 = 20
        let text = "用".repeat(10);
        assert_eq!(estimate_tokens(&text), 20);
    }

    #[test]
    fn test_mixed_weighting_rounds_up() {
        // 1 ASCII char -> 0.75, ceil -> 1
        assert_eq!(estimate_tokens("a"), 1);
        // 2 CJK + 1 ASCII -> 4.75, ceil -> 5
        assert_eq!(estimate_tokens("用户a"), 5);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_monotonicity_on_prefixes() {
        let text = "The users 用户 table stores accounts. ".repeat(20);
        let mut previous = 0;
        for end in (0..text.chars().count()).step_by(7) {
            let prefix: String = text.chars().take(end).collect();
            let estimate = estimate_tokens(&prefix);
            assert!(estimate >= previous);
            previous = estimate;
        }
    }

    #[test]
    fn test_small_document_is_one_chunk() {
        let profiler = DocumentProfiler::new(limits(2_000), 500);
        let profile = profiler.profile("short document");
        assert_eq!(profile.chunk_count, 1);
        assert!(!profile.needs_chunking);
        assert_eq!(profile.estimated_seconds, 10);
    }

    #[test]
    fn test_empty_document_is_one_chunk() {
        let profiler = DocumentProfiler::new(limits(2_000), 500);
        let profile = profiler.profile("");
        assert_eq!(profile.chunk_count, 1);
        assert!(!profile.needs_chunking);
    }

    #[test]
    fn test_chunk_count_formula() {
        // budget = 1000 - 250 = 750; 5x the budget => 5 chunks
        let profiler = DocumentProfiler::new(limits(1_000), 250);
        // 5 * 750 = 3750 tokens = 5000 ASCII chars
        let text = "a".repeat(5_000);
        let profile = profiler.profile(&text);
        assert_eq!(profile.estimated_tokens, 3_750);
        assert_eq!(profile.chunk_count, 5);
        assert!(profile.needs_chunking);
        assert_eq!(profile.estimated_seconds, 50);
    }

    #[test]
    fn test_exactly_at_budget_needs_no_chunking() {
        let profiler = DocumentProfiler::new(limits(1_000), 250);
        // exactly 750 tokens = 1000 ASCII chars
        let text = "a".repeat(1_000);
        let profile = profiler.profile(&text);
        assert_eq!(profile.estimated_tokens, 750);
        assert!(!profile.needs_chunking);
        assert_eq!(profile.chunk_count, 1);
    }

    #[test]
    fn test_one_over_budget_chunks() {
        let profiler = DocumentProfiler::new(limits(1_000), 250);
        // 752 tokens > 750 budget
        let text = "a".repeat(1_002);
        let profile = profiler.profile(&text);
        assert!(profile.needs_chunking);
        assert_eq!(profile.chunk_count, 2);
    }

    #[test]
    fn test_degenerate_budget_is_clamped() {
        let profiler = DocumentProfiler::new(limits(100), 1_500);
        assert_eq!(profiler.available_budget(), 1);
        // Still defined, one chunk per token
        let profile = profiler.profile("ab");
        assert!(profile.chunk_count >= 1);
    }
}
