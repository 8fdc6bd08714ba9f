//! Prompt templates for question answering and summarization

/// Renders prompts around an assembled context
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new() -> Self {
        Self
    }

    /// Question-answering prompt
    pub fn question(&self, context: &str, question: &str) -> String {
        format!(
            "You are an AI assistant that answers questions based on document content. \n\n\
             Document Context:\n{context}\n\n\
             User Question: {question}\n\n\
             {QA_INSTRUCTIONS}\n\n\
             Answer:"
        )
    }

    /// Summarization prompt
    pub fn summary(&self, context: &str, title: &str) -> String {
        format!(
            "Please provide a concise summary of the following document:\n\n\
             Document: {title}\n\n\
             Content:\n{context}\n\n\
             Summary:"
        )
    }
}

const QA_INSTRUCTIONS: &str = "Instructions:
- Answer the question based ONLY on the provided document context
- If the answer is not in the document, say \"I cannot find this information in the provided document\"
- Be concise and accurate
- Quote relevant parts from the document when possible
- If the question is unclear, ask for clarification";
