//! Database viewer.

use crate::cli::TablesArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::session::Session;

/// Execute the tables command.
///
/// Lists every row regardless of owner, so the output covers accounts
/// created through the HTTP API as well.
pub async fn execute_tables(args: TablesArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let store = session.store();
    let counts = store.table_counts()?;
    let users = store.list_users()?;
    let documents = store.list_all_documents()?;
    let history = store.list_all_history(args.limit)?;

    println!("{}", formatter.format_tables(&counts, &users, &documents, &history)?);
    Ok(())
}
