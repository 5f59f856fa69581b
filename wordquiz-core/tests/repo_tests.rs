use wordquiz_core::{
    memory::MemoryRepo, AttemptRecord, CoreError, GradeValue, ProgressRepository, ProgressStore,
    SessionRecord, SessionSummary, Wordbook,
};

fn record(book_hash: &str) -> SessionRecord {
    SessionRecord::from_summary(
        book_hash,
        "title",
        &SessionSummary {
            started_at_ms: 0,
            ended_at_ms: 60_000,
            planned_count: 5,
            correct_count: 4,
            wrong_count: 1,
            slowest: None,
            most_missed: None,
        },
    )
}

#[tokio::test]
async fn progress_roundtrip_and_lazy_load() {
    let repo = MemoryRepo::new();

    // unknown books load empty, never error
    let empty = repo.load_progress("nope").await.unwrap();
    assert!(empty.is_empty());

    let mut store = ProgressStore::new();
    store.ensure("a").history.push(AttemptRecord {
        timestamp: 1,
        grade: GradeValue::Easy,
    });
    repo.save_progress("h1", &store).await.unwrap();

    let loaded = repo.load_progress("h1").await.unwrap();
    assert_eq!(loaded, store);

    repo.delete_progress("h1").await.unwrap();
    assert!(repo.load_progress("h1").await.unwrap().is_empty());
    assert!(matches!(
        repo.delete_progress("h1").await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn sessions_filter_by_book() {
    let repo = MemoryRepo::new();
    repo.record_session(&record("h1")).await.unwrap();
    repo.record_session(&record("h1")).await.unwrap();
    repo.record_session(&record("h2")).await.unwrap();

    assert_eq!(repo.list_sessions(None).await.unwrap().len(), 3);
    assert_eq!(repo.list_sessions(Some("h1")).await.unwrap().len(), 2);
    assert_eq!(repo.list_sessions(Some("h3")).await.unwrap().len(), 0);
}

#[tokio::test]
async fn wordbook_registry_upserts() {
    let repo = MemoryRepo::new();
    assert!(repo.get_wordbook("h1").await.unwrap().is_none());

    let mut book = Wordbook::new("Verbs", "h1", 120);
    repo.upsert_wordbook(&book).await.unwrap();
    assert_eq!(
        repo.get_wordbook("h1").await.unwrap().map(|b| b.title),
        Some("Verbs".into())
    );

    book.new_quota = Some(5);
    repo.upsert_wordbook(&book).await.unwrap();
    let books = repo.list_wordbooks().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].new_quota, Some(5));
}
