//! Integration tests for the SQLite store

use docqa_domain::traits::{DocumentStore, HistoryQuery, QaHistoryStore, UserStore};
use docqa_domain::{Chunk, Document, QaRecord, User};
use docqa_store::SqliteStore;
use tempfile::TempDir;

fn ingested(owner: &User, name: &str) -> Document {
    let mut document = Document::new(owner.id, name, format!("/uploads/{}", name), "One. Two.", 9);
    document
        .attach_chunks(vec![Chunk::new("One. Two.", 0, 9)])
        .unwrap();
    document
}

#[test]
fn test_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("document_qa.db");

    let user = User::new("ada", "ada@example.com", "hash");
    let document = ingested(&user, "a.txt");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        store.create_user(&user).unwrap();
        store.insert_document(&document).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let loaded = store.get_document(document.id).unwrap().unwrap();
    assert_eq!(loaded.chunks(), document.chunks());
    assert_eq!(loaded.filename, "a.txt");
}

#[test]
fn test_documents_scoped_to_owner() {
    let mut store = SqliteStore::in_memory().unwrap();
    let ada = User::new("ada", "ada@example.com", "hash");
    let bob = User::new("bob", "bob@example.com", "hash");
    store.create_user(&ada).unwrap();
    store.create_user(&bob).unwrap();

    let mut first = ingested(&ada, "first.txt");
    first.uploaded_at = 100;
    let mut second = ingested(&ada, "second.txt");
    second.uploaded_at = 200;
    store.insert_document(&first).unwrap();
    store.insert_document(&second).unwrap();
    store.insert_document(&ingested(&bob, "bob.txt")).unwrap();

    let listed = store.list_documents(ada.id).unwrap();
    let names: Vec<_> = listed.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["second.txt", "first.txt"]);
    assert_eq!(store.list_documents(bob.id).unwrap().len(), 1);
    assert_eq!(store.list_all_documents().unwrap().len(), 3);
}

#[test]
fn test_history_filters_and_limit() {
    let mut store = SqliteStore::in_memory().unwrap();
    let user = User::new("ada", "ada@example.com", "hash");
    store.create_user(&user).unwrap();
    let doc_a = ingested(&user, "a.txt");
    let doc_b = ingested(&user, "b.txt");
    store.insert_document(&doc_a).unwrap();
    store.insert_document(&doc_b).unwrap();

    for i in 0..5 {
        let mut record = QaRecord::new(user.id, doc_a.id, format!("q{}", i), "a", true, 1);
        record.timestamp = 1000 + i;
        store.record_qa(&record).unwrap();
    }
    store
        .record_qa(&QaRecord::new(user.id, doc_b.id, "other", "a", false, 0))
        .unwrap();

    let all = store.list_history(&HistoryQuery::for_user(user.id)).unwrap();
    assert_eq!(all.len(), 6);

    let query = HistoryQuery {
        owner: user.id,
        document_id: Some(doc_a.id),
        limit: 3,
    };
    let limited = store.list_history(&query).unwrap();
    let questions: Vec<_> = limited.iter().map(|r| r.question.as_str()).collect();
    assert_eq!(questions, vec!["q4", "q3", "q2"]);
}

#[test]
fn test_delete_qa_requires_owner() {
    let mut store = SqliteStore::in_memory().unwrap();
    let ada = User::new("ada", "ada@example.com", "hash");
    let eve = User::new("eve", "eve@example.com", "hash");
    store.create_user(&ada).unwrap();
    store.create_user(&eve).unwrap();
    let document = ingested(&ada, "a.txt");
    store.insert_document(&document).unwrap();

    let record = QaRecord::new(ada.id, document.id, "q", "a", true, 1);
    store.record_qa(&record).unwrap();

    assert!(!store.delete_qa(eve.id, record.id).unwrap());
    assert!(store.delete_qa(ada.id, record.id).unwrap());
    assert!(!store.delete_qa(ada.id, record.id).unwrap());
}

#[test]
fn test_delete_document_removes_history() {
    let mut store = SqliteStore::in_memory().unwrap();
    let user = User::new("ada", "ada@example.com", "hash");
    store.create_user(&user).unwrap();
    let document = ingested(&user, "a.txt");
    store.insert_document(&document).unwrap();
    store
        .record_qa(&QaRecord::new(user.id, document.id, "q", "a", true, 1))
        .unwrap();

    assert!(store.delete_document(document.id).unwrap());
    assert!(store.get_document(document.id).unwrap().is_none());
    let counts = store.table_counts().unwrap();
    assert_eq!(counts.documents, 0);
    assert_eq!(counts.qa_history, 0);
    assert!(!store.delete_document(document.id).unwrap());
}
