//! Ingest command implementation.

use crate::cli::IngestArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::Session;
use docqa_domain::Document;
use docqa_pipeline::{IngestRequest, TextExtractor};
use std::fs;
use std::path::Path;

/// Execute the ingest command.
pub async fn execute_ingest(args: IngestArgs, session: &mut Session, formatter: &Formatter) -> Result<()> {
    let document = ingest_file(session, &args.file)?;
    println!("{}", formatter.format_ingested(&document)?);
    Ok(())
}

/// Extract, chunk and store a file in place.
///
/// The document records the file's absolute path; the file itself is not
/// copied.
pub fn ingest_file(session: &mut Session, path: &Path) -> Result<Document> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::InvalidInput(format!("not a file name: {}", path.display())))?
        .to_string();

    // Reject unsupported extensions before reading the file
    TextExtractor::format_for(&filename)?;

    let bytes = fs::read(path)?;
    let file_path = fs::canonicalize(path)?;
    let request = IngestRequest {
        owner: session.user().id,
        filename,
        file_path: file_path.display().to_string(),
        bytes,
    };

    let ingestor = *session.ingestor();
    Ok(ingestor.ingest(session.store_mut(), &request)?)
}
