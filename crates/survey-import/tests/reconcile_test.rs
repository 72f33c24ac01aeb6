use survey_db::{MemoryStore, StructureRepository, StructureRow, TaxonomySnapshot};
use survey_import::{parse_structure, reconcile};

fn row(inst: &str, fac: &str, prog: &str) -> StructureRow {
    let opt = |s: &str| Some(s.to_string()).filter(|s| !s.is_empty());
    StructureRow {
        institution: opt(inst),
        faculty: opt(fac),
        program: opt(prog),
    }
}

async fn snapshot(store: &MemoryStore) -> TaxonomySnapshot {
    TaxonomySnapshot::load(store, store).await.unwrap()
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let store = MemoryStore::new();
    let rows = vec![row("X", "Y", "Z")];

    let first = reconcile(&rows, &snapshot(&store).await, &store).await.unwrap();
    assert_eq!(first.new_items, 1);

    let second = reconcile(&rows, &snapshot(&store).await, &store).await.unwrap();
    assert_eq!(second.new_items, 0);

    assert_eq!(store.list_institutions().await.unwrap().len(), 1);
    assert_eq!(store.list_faculties().await.unwrap().len(), 1);
    assert_eq!(store.list_programs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_later_rows_see_entities_created_earlier_in_batch() {
    let store = MemoryStore::new();
    let rows = vec![
        row("Univ", "Teknik", "Informatika"),
        row("Univ", "Teknik", "Sipil"),
        row("Univ", "Kedokteran", "Informatika"),
    ];

    let outcome = reconcile(&rows, &TaxonomySnapshot::default(), &store)
        .await
        .unwrap();

    assert_eq!(outcome.new_items, 3);
    assert_eq!(outcome.snapshot.institutions.len(), 1);
    assert_eq!(outcome.snapshot.faculties.len(), 2);
    assert_eq!(outcome.snapshot.programs.len(), 3);
}

#[tokio::test]
async fn test_names_match_exactly_after_trimming() {
    let store = MemoryStore::new();
    let rows = vec![row("  Univ ", "Teknik", "A"), row("Univ", "Teknik", "A"), row("univ", "Teknik", "A")];

    let outcome = reconcile(&rows, &TaxonomySnapshot::default(), &store)
        .await
        .unwrap();

    let names: Vec<_> = store
        .list_institutions()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["Univ", "univ"]);
    assert_eq!(outcome.new_items, 2);
}

#[tokio::test]
async fn test_missing_levels_are_reported_or_skipped() {
    let store = MemoryStore::new();
    let rows = vec![row("", "Teknik", "A"), row("Univ", "", "A"), row("Univ", "Teknik", "")];

    let outcome = reconcile(&rows, &TaxonomySnapshot::default(), &store)
        .await
        .unwrap();

    assert_eq!(outcome.new_items, 0);
    let messages: Vec<_> = outcome
        .issues
        .iter()
        .map(|i| (i.row_number, i.message.as_str()))
        .collect();
    assert_eq!(messages, vec![(2, "missing faculty"), (3, "missing program")]);
    assert_eq!(store.list_institutions().await.unwrap().len(), 1);
    assert_eq!(store.list_faculties().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_failure_aborts_without_rollback() {
    let store = MemoryStore::new();
    let rows = vec![row("Univ", "Teknik", "A"), row("Univ", "Teknik", "B")];

    store.fail_writes_after(2).unwrap();
    let err = reconcile(&rows, &TaxonomySnapshot::default(), &store)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("injected store failure"));
    assert_eq!(store.list_institutions().await.unwrap().len(), 1);
    assert!(store.list_programs().await.unwrap().is_empty());

    store.clear_failures().unwrap();
    let outcome = reconcile(&rows, &snapshot(&store).await, &store).await.unwrap();
    assert_eq!(outcome.new_items, 2);
    assert_eq!(store.list_faculties().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_structure_file_to_taxonomy() {
    let store = MemoryStore::new();
    let parsed = parse_structure(
        "Institusi\tFakultas\tProdi\n\
         Universitas X\tFakultas Teknik\tInformatika\n\
         Universitas X\tFakultas Teknik\tTeknik Sipil\n",
    )
    .unwrap();

    let outcome = reconcile(&parsed.rows, &snapshot(&store).await, &store)
        .await
        .unwrap();
    assert_eq!(outcome.new_items, 2);
    assert!(outcome.issues.is_empty());
}
