use chrono::{NaiveDate, TimeZone, Utc};
use staffbook_core::{
    DocumentStore, NewTranscript, StoreConfig, StoreError, TranscriptFilter, TranscriptService,
};
use std::fs;

fn weekly_sync() -> NewTranscript {
    NewTranscript {
        title: "Weekly Sync: Platform".to_string(),
        text: "Jane: the cutover is done.\n```\n## Notes\n```\nSam: I'll write the retro.".to_string(),
        date: Some(Utc.with_ymd_and_hms(2024, 4, 2, 15, 30, 0).unwrap()),
        participants: vec!["Jane Doe".to_string(), "Sam Lee".to_string()],
    }
}

#[test]
fn transcript_document_is_named_by_date_and_title() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = DocumentStore::open(&StoreConfig::new(dir.path())).unwrap();
    let created = TranscriptService::new(&mut store)
        .create_transcript(weekly_sync())
        .unwrap();

    let doc = store.transcript_document(created.id).unwrap();
    assert_eq!(doc.path.parent().unwrap(), dir.path().join("transcripts"));
    let file_name = doc.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("2024-04-02-weekly-sync-platform-"));
    assert!(file_name.ends_with(".md"));
    assert!(doc.text.contains("# Weekly Sync: Platform\n"));
    assert!(doc.text.contains("processed: false\n"));
    assert!(doc.text.contains("_No items extracted yet._"));
}

#[test]
fn recorded_items_survive_reopen_with_exact_text() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = DocumentStore::open(&StoreConfig::new(dir.path())).unwrap();
    let mut service = TranscriptService::new(&mut store);
    let created = service.create_transcript(weekly_sync()).unwrap();

    let items = vec![
        "Sam to write the retro".to_string(),
        "Jane to close the migration ticket".to_string(),
    ];
    let processed = service.record_extracted_items(created.id, &items).unwrap();
    assert!(processed.processed);
    assert!(processed.updated_at > created.updated_at);

    let (reopened, report) = DocumentStore::open(&StoreConfig::new(dir.path())).unwrap();
    assert!(report.is_clean());
    let loaded = reopened.transcript(created.id).unwrap();
    assert_eq!(loaded, &processed);
    assert_eq!(loaded.text, weekly_sync().text);
    assert_eq!(loaded.extracted_items, items);
}

#[test]
fn foreign_section_in_transcript_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = DocumentStore::open(&StoreConfig::new(dir.path())).unwrap();
    let created = TranscriptService::new(&mut store)
        .create_transcript(weekly_sync())
        .unwrap();
    let path = store.transcript_document(created.id).unwrap().path.to_path_buf();

    let review = "## Follow-up Review\nDiscussed again on Friday.\n\n";
    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, text.replace("## Extracted Items", &format!("{review}## Extracted Items"))).unwrap();

    TranscriptService::new(&mut store)
        .record_extracted_items(created.id, &[])
        .unwrap();

    let merged = fs::read_to_string(&path).unwrap();
    assert!(merged.contains(review));
    assert!(merged.contains("_No items found._"));
    assert!(merged.contains("processed: true\n"));
}

#[test]
fn list_filters_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = DocumentStore::open(&StoreConfig::new(dir.path())).unwrap();
    let mut service = TranscriptService::new(&mut store);
    let sync = service.create_transcript(weekly_sync()).unwrap();
    let later = service
        .create_transcript(NewTranscript {
            title: "Skip level".to_string(),
            text: "Ada: all good.".to_string(),
            date: Some(Utc.with_ymd_and_hms(2024, 5, 9, 9, 0, 0).unwrap()),
            participants: vec!["Ada".to_string()],
        })
        .unwrap();

    let titles = |filter: TranscriptFilter| -> Vec<String> {
        service
            .list_transcripts(&filter)
            .into_iter()
            .map(|item| item.title)
            .collect()
    };
    assert_eq!(
        titles(TranscriptFilter::default()),
        ["Weekly Sync: Platform", "Skip level"]
    );
    assert_eq!(
        titles(TranscriptFilter {
            participant: Some("sam lee".to_string()),
            ..TranscriptFilter::default()
        }),
        ["Weekly Sync: Platform"]
    );
    assert_eq!(
        titles(TranscriptFilter {
            since: NaiveDate::from_ymd_opt(2024, 5, 1),
            ..TranscriptFilter::default()
        }),
        ["Skip level"]
    );

    let path = store.transcript_document(sync.id).unwrap().path.to_path_buf();
    let mut service = TranscriptService::new(&mut store);
    service.delete_transcript(sync.id).unwrap();
    assert!(!path.exists());
    assert!(matches!(
        service.get_transcript(sync.id).unwrap_err(),
        StoreError::NotFound { .. }
    ));
    assert_eq!(service.get_transcript(later.id).unwrap().title, "Skip level");
}

#[test]
fn blank_transcript_text_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = DocumentStore::open(&StoreConfig::new(dir.path())).unwrap();
    let err = TranscriptService::new(&mut store)
        .create_transcript(NewTranscript {
            text: "   \n".to_string(),
            ..weekly_sync()
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(fs::read_dir(dir.path().join("transcripts")).unwrap().count(), 0);
}
