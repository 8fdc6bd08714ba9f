//! History listing and deletion.

use crate::cli::{ForgetArgs, HistoryArgs};
use crate::error::{CliError, Result};
use crate::output::{Formatter, HistoryRow};
use crate::session::{parse_id, Session};
use docqa_domain::traits::{DocumentStore, HistoryQuery, QaHistoryStore};
use docqa_domain::{DocumentId, QaId};
use std::collections::HashMap;

/// Execute the history command.
pub async fn execute_history(args: HistoryArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let rows = history_rows(session, args.document.as_deref(), args.limit)?;
    println!("{}", formatter.format_history(&rows)?);
    Ok(())
}

/// Execute the forget command.
pub async fn execute_forget(args: ForgetArgs, session: &mut Session, formatter: &Formatter) -> Result<()> {
    // Parse everything up front so a typo deletes nothing
    let ids = args
        .ids
        .iter()
        .map(|raw| parse_id::<QaId>("history", raw))
        .collect::<Result<Vec<_>>>()?;

    let mut deleted = 0;
    for id in ids {
        if forget(session, id)? {
            deleted += 1;
        } else {
            eprintln!("{}", formatter.warning(&format!("History entry {} not found", id)));
        }
    }

    println!("{}", formatter.success(&format!("Deleted {} history entry(ies)", deleted)));
    Ok(())
}

/// The user's history, newest first, with document titles resolved.
pub fn history_rows(session: &Session, document: Option<&str>, limit: usize) -> Result<Vec<HistoryRow>> {
    if limit == 0 {
        return Err(CliError::InvalidInput("limit must be greater than 0".to_string()));
    }

    let query = HistoryQuery {
        owner: session.user().id,
        document_id: document.map(|raw| parse_id("document", raw)).transpose()?,
        limit,
    };
    let records = session.store().list_history(&query)?;

    let mut titles: HashMap<DocumentId, Option<String>> = HashMap::new();
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let title = match titles.get(&record.document_id) {
            Some(title) => title.clone(),
            None => {
                let title = session
                    .store()
                    .get_document(record.document_id)?
                    .map(|d| d.title().to_string());
                titles.insert(record.document_id, title.clone());
                title
            }
        };
        rows.push((record, title));
    }
    Ok(rows)
}

/// Delete one of the user's history entries; returns whether it existed.
pub fn forget(session: &mut Session, id: QaId) -> Result<bool> {
    let owner = session.user().id;
    Ok(session.store_mut().delete_qa(owner, id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{ask_and_record, ingest_file, test_session};
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_history_filter_and_forget() {
        let dir = TempDir::new().unwrap();
        let mut session = test_session("answer");

        let first_path = dir.path().join("a.txt");
        let second_path = dir.path().join("b.txt");
        fs::write(&first_path, "Alpha document.").unwrap();
        fs::write(&second_path, "Beta document.").unwrap();
        let first = ingest_file(&mut session, &first_path).unwrap();
        let second = ingest_file(&mut session, &second_path).unwrap();

        let (_, on_first) = ask_and_record(&mut session, &first, "one?").await.unwrap();
        ask_and_record(&mut session, &second, "two?").await.unwrap();
        ask_and_record(&mut session, &second, "three?").await.unwrap();

        let all = history_rows(&session, None, 50).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].0.question, "three?");

        let only_first = history_rows(&session, Some(&first.id.to_string()), 50).unwrap();
        assert_eq!(only_first.len(), 1);
        assert_eq!(only_first[0].1.as_deref(), Some("a.txt"));

        assert_eq!(history_rows(&session, None, 2).unwrap().len(), 2);

        assert!(forget(&mut session, on_first.id).unwrap());
        assert!(!forget(&mut session, on_first.id).unwrap());
        assert!(history_rows(&session, Some(&first.id.to_string()), 50)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_filters() {
        let session = test_session("answer");
        assert!(matches!(
            history_rows(&session, Some("nope"), 10),
            Err(CliError::InvalidInput(_))
        ));
        assert!(matches!(
            history_rows(&session, None, 0),
            Err(CliError::InvalidInput(_))
        ));
    }
}
