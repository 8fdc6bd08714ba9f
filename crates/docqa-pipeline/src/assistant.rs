//! Question answering and summarization over one document
//!
//! Inference failures never escape as errors: they become a fallback answer
//! with `success = false`, so callers can record and return a uniform shape.

use crate::context::ContextAssembler;
use crate::error::PipelineError;
use crate::prompt::PromptBuilder;
use docqa_domain::{ContextBudget, Document, DocumentId, QaRecord, UserId};
use docqa_llm::{LlmError, LlmProvider};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Answer returned when inference fails
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't process your question at the moment.";

/// Summary returned when inference fails
pub const FALLBACK_SUMMARY: &str = "Could not generate summary.";

/// Outcome of a question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaAnswer {
    /// Whether the model produced the answer
    pub success: bool,

    /// Model answer, or [`FALLBACK_ANSWER`]
    pub answer: String,

    /// Chunks included in the prompt (0 on failure)
    pub context_used: usize,

    /// Failure detail, for logs and history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QaAnswer {
    /// History record for this answer
    pub fn to_record(&self, owner: UserId, document_id: DocumentId, question: &str) -> QaRecord {
        QaRecord::new(
            owner,
            document_id,
            question,
            self.answer.clone(),
            self.success,
            self.context_used,
        )
    }
}

/// Outcome of a summarization request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryOutcome {
    /// Whether the model produced the summary
    pub success: bool,

    /// Model summary, or [`FALLBACK_SUMMARY`]
    pub summary: String,

    /// Failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Answers questions about, and summarizes, a single document
pub struct DocumentAssistant<L: LlmProvider> {
    llm: L,
    assembler: ContextAssembler,
    prompts: PromptBuilder,
    timeout: Duration,
}

impl<L: LlmProvider> DocumentAssistant<L> {
    /// Create an assistant
    ///
    /// `timeout` bounds each inference call; there is no retry.
    pub fn new(llm: L, budget: ContextBudget, timeout: Duration) -> Self {
        Self {
            llm,
            assembler: ContextAssembler::new(budget),
            prompts: PromptBuilder::new(),
            timeout,
        }
    }

    /// The underlying provider
    pub fn provider(&self) -> &L {
        &self.llm
    }

    /// Answer a question from the document's chunks
    ///
    /// Only a blank question is an error; inference failures produce a
    /// fallback answer.
    pub async fn ask(&self, document: &Document, question: &str) -> Result<QaAnswer, PipelineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        let context = self
            .assembler
            .assemble(document.chunks(), Some(document.title()));
        let prompt = self.prompts.question(&context.text, question);

        match self.infer(&prompt).await {
            Ok(answer) => {
                info!(
                    "Answered question on document {} using {} chunks",
                    document.id, context.context_used
                );
                Ok(QaAnswer {
                    success: true,
                    answer,
                    context_used: context.context_used,
                    error: None,
                })
            }
            Err(e) => {
                warn!("Question on document {} failed: {}", document.id, e);
                Ok(QaAnswer {
                    success: false,
                    answer: FALLBACK_ANSWER.to_string(),
                    context_used: 0,
                    error: Some(e.to_string()),
                })
            }
        }
    }

    /// Summarize the document
    pub async fn summarize(&self, document: &Document) -> SummaryOutcome {
        // The summary template names the document itself
        let context = self.assembler.assemble(document.chunks(), None);
        let prompt = self.prompts.summary(&context.text, document.title());

        match self.infer(&prompt).await {
            Ok(summary) => SummaryOutcome {
                success: true,
                summary,
                error: None,
            },
            Err(e) => {
                warn!("Summary of document {} failed: {}", document.id, e);
                SummaryOutcome {
                    success: false,
                    summary: FALLBACK_SUMMARY.to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn infer(&self, prompt: &str) -> Result<String, LlmError> {
        let started = Instant::now();
        debug!(
            "Calling model '{}' with {} char prompt",
            self.llm.model_name(),
            prompt.chars().count()
        );

        let result = timeout(self.timeout, self.llm.generate(prompt))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?;

        debug!("Inference finished in {:?}", started.elapsed());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_domain::Chunk;
    use docqa_llm::MockProvider;

    fn document() -> Document {
        let mut document = Document::new(
            UserId::new(),
            "facts.txt",
            "uploads/facts.txt",
            "The sky is blue. Grass is green.",
            32,
        );
        document
            .attach_chunks(vec![
                Chunk::new("The sky is blue.", 0, 16),
                Chunk::new("Grass is green.", 17, 32),
            ])
            .unwrap();
        document
    }

    fn assistant(llm: MockProvider) -> DocumentAssistant<MockProvider> {
        DocumentAssistant::new(llm, ContextBudget::default(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_ask_success() {
        let assistant = assistant(MockProvider::new("Blue."));
        let answer = assistant.ask(&document(), "What color is the sky?").await.unwrap();

        assert!(answer.success);
        assert_eq!(answer.answer, "Blue.");
        assert_eq!(answer.context_used, 2);
        assert!(answer.error.is_none());

        let prompt = assistant.provider().last_prompt().unwrap();
        assert!(prompt.contains("Document: facts.txt\n\nThe sky is blue.\n\nGrass is green."));
        assert!(prompt.contains("User Question: What color is the sky?"));
    }

    #[tokio::test]
    async fn test_ask_blank_question() {
        let assistant = assistant(MockProvider::default());
        let result = assistant.ask(&document(), "   ").await;
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
        assert_eq!(assistant.provider().call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_inference_failure_falls_back() {
        let assistant = assistant(MockProvider::failing(LlmError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        }));
        let answer = assistant.ask(&document(), "Anything?").await.unwrap();

        assert!(!answer.success);
        assert_eq!(answer.answer, FALLBACK_ANSWER);
        assert_eq!(answer.context_used, 0);
        assert!(answer.error.unwrap().contains("502"));
    }

    #[tokio::test]
    async fn test_ask_timeout_falls_back() {
        let llm = MockProvider::new("too late").with_delay(Duration::from_secs(5));
        let assistant =
            DocumentAssistant::new(llm, ContextBudget::default(), Duration::from_millis(50));

        let answer = assistant.ask(&document(), "Anything?").await.unwrap();
        assert!(!answer.success);
        assert_eq!(answer.answer, FALLBACK_ANSWER);
        assert!(answer.error.unwrap().contains("timed out"));
        assert_eq!(assistant.provider().call_count(), 1);
    }

    #[tokio::test]
    async fn test_ask_document_without_chunks() {
        let assistant = assistant(MockProvider::new("Nothing there."));
        let empty = Document::new(UserId::new(), "empty.txt", "", "", 0);
        let answer = assistant.ask(&empty, "Anything?").await.unwrap();

        assert!(answer.success);
        assert_eq!(answer.context_used, 0);
        let prompt = assistant.provider().last_prompt().unwrap();
        assert!(prompt.contains("No document content available."));
    }

    #[tokio::test]
    async fn test_summarize() {
        let assistant = assistant(MockProvider::new("Colors of nature."));
        let outcome = assistant.summarize(&document()).await;

        assert!(outcome.success);
        assert_eq!(outcome.summary, "Colors of nature.");
        let prompt = assistant.provider().last_prompt().unwrap();
        assert!(prompt.contains("Document: facts.txt\n\nContent:\nThe sky is blue."));
    }

    #[tokio::test]
    async fn test_summarize_failure() {
        let assistant = assistant(MockProvider::failing(LlmError::Communication(
            "connection reset".to_string(),
        )));
        let outcome = assistant.summarize(&document()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.summary, FALLBACK_SUMMARY);
    }

    #[test]
    fn test_answer_to_record() {
        let answer = QaAnswer {
            success: true,
            answer: "Blue.".to_string(),
            context_used: 2,
            error: None,
        };
        let owner = UserId::new();
        let doc_id = DocumentId::new();
        let record = answer.to_record(owner, doc_id, "Sky?");
        assert_eq!(record.owner, owner);
        assert_eq!(record.document_id, doc_id);
        assert_eq!(record.answer, "Blue.");
        assert_eq!(record.context_used, 2);
    }
}
