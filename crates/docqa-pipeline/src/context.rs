//! Budget-bounded context assembly

use docqa_domain::{Chunk, ContextBudget};
use tracing::debug;

/// Returned in place of context when a document has no chunks at all
pub const NO_CONTENT_PLACEHOLDER: &str = "No document content available.";

const SEPARATOR: &str = "\n\n";

/// Context text plus the number of chunks that went into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    /// Rendered context, ready for a prompt template
    pub text: String,

    /// Chunks actually included (not the document's total)
    pub context_used: usize,
}

/// Greedily selects a prefix of a document's chunks under a budget
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler {
    budget: ContextBudget,
}

impl ContextAssembler {
    /// Create an assembler for the given budget
    pub fn new(budget: ContextBudget) -> Self {
        Self { budget }
    }

    /// Assemble context from chunks in document order
    ///
    /// At most `max_chunks` chunks are considered. Selection stops at the first
    /// chunk that would push the body (separators included) past `max_chars`;
    /// no later, shorter chunk is substituted. A title adds a
    /// `Document: <title>` header that does not count against the budget.
    ///
    /// An empty `chunks` slice yields [`NO_CONTENT_PLACEHOLDER`]. When chunks
    /// exist but the first already exceeds `max_chars`, the body is empty: the
    /// text is just the header (or `""` without a title) and `context_used`
    /// is 0.
    pub fn assemble(&self, chunks: &[Chunk], title: Option<&str>) -> AssembledContext {
        if chunks.is_empty() {
            debug!("No chunks to assemble context from");
            return AssembledContext {
                text: NO_CONTENT_PLACEHOLDER.to_string(),
                context_used: 0,
            };
        }

        let mut parts: Vec<&str> = Vec::new();
        let mut total_chars = 0;

        for chunk in chunks.iter().take(self.budget.max_chunks) {
            let separator = if parts.is_empty() { 0 } else { SEPARATOR.len() };
            let needed = separator + chunk.char_len();
            if total_chars + needed > self.budget.max_chars {
                break;
            }
            parts.push(&chunk.text);
            total_chars += needed;
        }

        if parts.is_empty() {
            debug!(
                "No chunk fits the context budget ({} available)",
                chunks.len()
            );
        }

        let body = parts.join(SEPARATOR);
        let text = match title.filter(|t| !t.is_empty()) {
            Some(title) => format!("Document: {}{}{}", title, SEPARATOR, body),
            None => body,
        };

        debug!(
            "Assembled context from {} of {} chunks ({} chars)",
            parts.len(),
            chunks.len(),
            total_chars
        );

        AssembledContext {
            text,
            context_used: parts.len(),
        }
    }
}
