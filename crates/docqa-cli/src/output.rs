//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use docqa_domain::{Document, QaRecord, User};
use docqa_pipeline::{QaAnswer, SummaryOutcome};
use docqa_store::TableCounts;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Widest question or answer shown in a table cell.
const CELL_CHARS: usize = 60;

/// A history record with the title of its document, when still known.
pub type HistoryRow = (QaRecord, Option<String>);

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a document listing.
    pub fn format_documents(&self, documents: &[Document]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let list: Vec<Value> = documents.iter().map(document_json).collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "documents": list,
                    "total": documents.len(),
                }))?)
            }
            OutputFormat::Quiet => Ok(ids(documents.iter().map(|d| d.id.to_string()))),
            OutputFormat::Table => {
                if documents.is_empty() {
                    return Ok(self.colorize("No documents found.", "yellow"));
                }
                Ok(self.documents_table(documents))
            }
        }
    }

    /// Format a freshly ingested document.
    pub fn format_ingested(&self, document: &Document) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&document_json(document))?),
            OutputFormat::Quiet => Ok(document.id.to_string()),
            OutputFormat::Table => Ok(self.success(&format!(
                "Ingested '{}' as {} ({} chunks)",
                document.filename,
                document.id,
                document.chunks_count()
            ))),
        }
    }

    /// Format one document with a content preview.
    pub fn format_document(&self, document: &Document) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = document_json(document);
                value["content_preview"] = json!(document.content_preview());
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(document.content_preview()),
            OutputFormat::Table => {
                let mut out = self.documents_table(std::slice::from_ref(document));
                out.push_str("\n\n");
                out.push_str(&self.colorize("Preview:", "cyan"));
                out.push('\n');
                out.push_str(&document.content_preview());
                Ok(out)
            }
        }
    }

    /// Format the chunk offsets of a document.
    pub fn format_chunks(&self, document: &Document) -> Result<String> {
        let chunks = document.chunks();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(chunks)?),
            OutputFormat::Quiet => Ok(chunks
                .iter()
                .map(|c| format!("{}\t{}", c.start_pos, c.end_pos))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("Document has no chunks.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Start", "End", "Chars", "Text"]);
                for (i, chunk) in chunks.iter().enumerate() {
                    builder.push_record([
                        i.to_string(),
                        chunk.start_pos.to_string(),
                        chunk.end_pos.to_string(),
                        chunk.char_len().to_string(),
                        truncate(&chunk.text, CELL_CHARS),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format an answer to a question.
    pub fn format_answer(&self, answer: &QaAnswer, record: &QaRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "success": answer.success,
                "answer": answer.answer,
                "context_used": answer.context_used,
                "qa_id": record.id,
            }))?),
            OutputFormat::Quiet => Ok(answer.answer.clone()),
            OutputFormat::Table => {
                let status = if answer.success {
                    self.colorize(&format!("({} chunks of context)", answer.context_used), "cyan")
                } else {
                    self.warning(answer.error.as_deref().unwrap_or("inference failed"))
                };
                Ok(format!("{}\n{}", answer.answer, status))
            }
        }
    }

    /// Format a document summary.
    pub fn format_summary(&self, document: &Document, outcome: &SummaryOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "success": outcome.success,
                "summary": outcome.summary,
                "document_title": document.title(),
            }))?),
            OutputFormat::Quiet => Ok(outcome.summary.clone()),
            OutputFormat::Table => {
                let mut out = format!(
                    "{}\n{}",
                    self.colorize(&format!("Summary of {}:", document.title()), "cyan"),
                    outcome.summary
                );
                if let Some(error) = &outcome.error {
                    out.push('\n');
                    out.push_str(&self.warning(error));
                }
                Ok(out)
            }
        }
    }

    /// Format history entries.
    pub fn format_history(&self, rows: &[HistoryRow]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let list: Vec<Value> = rows
                    .iter()
                    .map(|(record, title)| {
                        let mut value = json!(record);
                        value["document_title"] = json!(title);
                        value
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json!({
                    "history": list,
                    "total": rows.len(),
                }))?)
            }
            OutputFormat::Quiet => Ok(ids(rows.iter().map(|(r, _)| r.id.to_string()))),
            OutputFormat::Table => {
                if rows.is_empty() {
                    return Ok(self.colorize("No history found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Document", "Question", "Answer", "OK", "Context"]);
                for (record, title) in rows {
                    builder.push_record([
                        record.id.to_string(),
                        title.clone().unwrap_or_else(|| "Unknown".to_string()),
                        truncate(&record.question, CELL_CHARS),
                        truncate(&record.answer, CELL_CHARS),
                        String::from(if record.success { "yes" } else { "no" }),
                        record.context_used.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the database viewer output.
    pub fn format_tables(
        &self,
        counts: &TableCounts,
        users: &[User],
        documents: &[Document],
        history: &[QaRecord],
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "counts": {
                    "users": counts.users,
                    "documents": counts.documents,
                    "qa_history": counts.qa_history,
                },
                "users": users.iter().map(user_json).collect::<Vec<_>>(),
                "documents": documents.iter().map(document_json).collect::<Vec<_>>(),
                "qa_history": history,
            }))?),
            OutputFormat::Quiet => Ok(format!(
                "users\t{}\ndocuments\t{}\nqa_history\t{}",
                counts.users, counts.documents, counts.qa_history
            )),
            OutputFormat::Table => {
                let mut sections = Vec::new();

                let mut builder = Builder::default();
                builder.push_record(["Table", "Rows"]);
                builder.push_record(["users".to_string(), counts.users.to_string()]);
                builder.push_record(["documents".to_string(), counts.documents.to_string()]);
                builder.push_record(["qa_history".to_string(), counts.qa_history.to_string()]);
                sections.push(self.render(builder));

                let mut builder = Builder::default();
                builder.push_record(["ID", "Username", "Email", "Created", "Active"]);
                for user in users {
                    builder.push_record([
                        user.id.to_string(),
                        user.username.clone(),
                        user.email.clone(),
                        user.created_at.to_string(),
                        user.is_active.to_string(),
                    ]);
                }
                sections.push(format!("{}\n{}", self.colorize("users", "cyan"), self.render(builder)));

                if !documents.is_empty() {
                    sections.push(format!(
                        "{}\n{}",
                        self.colorize("documents", "cyan"),
                        self.documents_table(documents)
                    ));
                }

                if !history.is_empty() {
                    let mut builder = Builder::default();
                    builder.push_record(["ID", "Document", "Question", "OK", "Timestamp"]);
                    for record in history {
                        builder.push_record([
                            record.id.to_string(),
                            record.document_id.to_string(),
                            truncate(&record.question, CELL_CHARS),
                            record.success.to_string(),
                            record.timestamp.to_string(),
                        ]);
                    }
                    sections.push(format!(
                        "{}\n{}",
                        self.colorize("qa_history", "cyan"),
                        self.render(builder)
                    ));
                }

                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn documents_table(&self, documents: &[Document]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["ID", "Title", "Size", "Chunks", "Uploaded"]);
        for document in documents {
            builder.push_record([
                document.id.to_string(),
                document.title().to_string(),
                document.file_size.to_string(),
                document.chunks_count().to_string(),
                document.uploaded_at.to_string(),
            ]);
        }
        self.render(builder)
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn document_json(document: &Document) -> Value {
    json!({
        "document_id": document.id,
        "title": document.title(),
        "filename": document.filename,
        "file_path": document.file_path,
        "file_size": document.file_size,
        "uploaded_at": document.uploaded_at,
        "processed": document.processed,
        "chunks_count": document.chunks_count(),
    })
}

fn user_json(user: &User) -> Value {
    json!({
        "user_id": user.id,
        "username": user.username,
        "email": user.email,
        "created_at": user.created_at,
        "is_active": user.is_active,
    })
}

fn ids(ids: impl Iterator<Item = String>) -> String {
    ids.collect::<Vec<_>>().join("\n")
}

/// Cut `text` to at most `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_domain::{Chunk, UserId};

    fn create_test_document() -> Document {
        Document::new(
            UserId::new(),
            "report.txt",
            "/tmp/report.txt",
            "Quarterly results were strong.",
            30,
        )
        .with_chunks(vec![Chunk::new("Quarterly results were strong.", 0, 30)])
    }

    fn answer(success: bool) -> QaAnswer {
        QaAnswer {
            success,
            answer: "Strong.".to_string(),
            context_used: if success { 1 } else { 0 },
            error: (!success).then(|| "Inference timed out after 30s".to_string()),
        }
    }

    #[test]
    fn test_json_documents() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_documents(&[create_test_document()]).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["documents"][0]["title"], "report.txt");
        assert_eq!(value["documents"][0]["chunks_count"], 1);
    }

    #[test]
    fn test_quiet_documents() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let document = create_test_document();
        let output = formatter.format_documents(std::slice::from_ref(&document)).unwrap();
        assert_eq!(output, document.id.to_string());
    }

    #[test]
    fn test_table_documents() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_documents(&[create_test_document()]).unwrap();
        assert!(output.contains("Title"));
        assert!(output.contains("report.txt"));
    }

    #[test]
    fn test_empty_documents() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_documents(&[]).unwrap();
        assert!(output.contains("No documents found"));
    }

    #[test]
    fn test_chunk_offsets() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_chunks(&create_test_document()).unwrap();
        assert_eq!(output, "0\t30");
    }

    #[test]
    fn test_failed_answer_shows_warning() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let document = create_test_document();
        let failed = answer(false);
        let record = failed.to_record(document.owner, document.id, "How were results?");
        let output = formatter.format_answer(&failed, &record).unwrap();
        assert!(output.contains("Strong."));
        assert!(output.contains("⚠ Inference timed out"));
    }

    #[test]
    fn test_json_answer_carries_qa_id() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let document = create_test_document();
        let ok = answer(true);
        let record = ok.to_record(document.owner, document.id, "How were results?");
        let value: Value = serde_json::from_str(&formatter.format_answer(&ok, &record).unwrap()).unwrap();
        assert_eq!(value["qa_id"], record.id.to_string());
        assert_eq!(value["context_used"], 1);
    }

    #[test]
    fn test_history_unknown_title() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let document = create_test_document();
        let record = answer(true).to_record(document.owner, document.id, "q");
        let output = formatter.format_history(&[(record, None)]).unwrap();
        assert!(output.contains("Unknown"));
    }

    #[test]
    fn test_quiet_tables_counts() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let counts = TableCounts {
            users: 1,
            documents: 2,
            qa_history: 3,
        };
        let output = formatter.format_tables(&counts, &[], &[], &[]).unwrap();
        assert_eq!(output, "users\t1\ndocuments\t2\nqa_history\t3");
    }

    #[test]
    fn test_truncate_is_char_aware() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
