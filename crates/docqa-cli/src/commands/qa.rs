//! Question answering and summarization commands.

use crate::cli::{AskArgs, DocumentArg};
use crate::error::Result;
use crate::output::Formatter;
use crate::session::Session;
use docqa_domain::traits::QaHistoryStore;
use docqa_domain::{Document, QaRecord};
use docqa_pipeline::QaAnswer;

/// Execute the ask command.
pub async fn execute_ask(args: AskArgs, session: &mut Session, formatter: &Formatter) -> Result<()> {
    let document = session.document(&args.id)?;
    let (answer, record) = ask_and_record(session, &document, &args.question.join(" ")).await?;
    println!("{}", formatter.format_answer(&answer, &record)?);
    Ok(())
}

/// Execute the summarize command.
pub async fn execute_summarize(args: DocumentArg, session: &Session, formatter: &Formatter) -> Result<()> {
    let document = session.document(&args.id)?;
    let outcome = session.assistant().summarize(&document).await;
    println!("{}", formatter.format_summary(&document, &outcome)?);
    Ok(())
}

/// Answer a question and append it to the history, successful or not.
pub async fn ask_and_record(
    session: &mut Session,
    document: &Document,
    question: &str,
) -> Result<(QaAnswer, QaRecord)> {
    let answer = session.assistant().ask(document, question).await?;
    let record = answer.to_record(session.user().id, document.id, question.trim());
    session.store_mut().record_qa(&record)?;
    Ok((answer, record))
}
