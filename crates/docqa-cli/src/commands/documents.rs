//! Document listing, inspection and removal.

use crate::cli::{DocumentArg, RemoveArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::Session;
use docqa_domain::traits::DocumentStore;
use docqa_domain::Document;
use std::fs;
use tracing::warn;

/// Execute the documents command.
pub async fn execute_documents(session: &Session, formatter: &Formatter) -> Result<()> {
    let documents = session.store().list_documents(session.user().id)?;
    println!("{}", formatter.format_documents(&documents)?);
    Ok(())
}

/// Execute the show command.
pub async fn execute_show(args: DocumentArg, session: &Session, formatter: &Formatter) -> Result<()> {
    let document = session.document(&args.id)?;
    println!("{}", formatter.format_document(&document)?);
    Ok(())
}

/// Execute the chunks command.
pub async fn execute_chunks(args: DocumentArg, session: &Session, formatter: &Formatter) -> Result<()> {
    let document = session.document(&args.id)?;
    println!("{}", formatter.format_chunks(&document)?);
    Ok(())
}

/// Execute the remove command.
pub async fn execute_remove(args: RemoveArgs, session: &mut Session, formatter: &Formatter) -> Result<()> {
    let document = remove_document(session, &args.id, args.delete_file)?;
    println!(
        "{}",
        formatter.success(&format!("Removed document '{}'", document.title()))
    );
    Ok(())
}

/// Delete a document and its history, optionally with its source file.
pub fn remove_document(session: &mut Session, raw_id: &str, delete_file: bool) -> Result<Document> {
    let document = session.document(raw_id)?;

    if !session.store_mut().delete_document(document.id)? {
        return Err(CliError::NotFound(format!("document {}", raw_id)));
    }

    if delete_file {
        if let Err(e) = fs::remove_file(&document.file_path) {
            warn!("Could not delete {}: {}", document.file_path, e);
        }
    }

    Ok(document)
}
