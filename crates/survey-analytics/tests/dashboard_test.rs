use survey_analytics::{compute, filter_responses, DashboardState, FilterSelection};
use survey_db::{
    CategoryRepository, MemoryStore, NewSurveyResponse, ResponseFilter, ResponseRepository,
    Sentiment, StructureRepository, TaxonomySnapshot,
};
use uuid::Uuid;

struct Fixture {
    store: MemoryStore,
    informatika: Uuid,
    hukum: Uuid,
    infrastructure: Uuid,
}

fn new_response(
    row_id: &str,
    program: Uuid,
    sentiment: Sentiment,
    ai: &[&str],
    human: Option<&[&str]>,
    comment: &str,
) -> NewSurveyResponse {
    NewSurveyResponse {
        original_row_id: row_id.to_string(),
        comment_text: comment.to_string(),
        sentiment,
        ai_suggested_categories: ai.iter().map(|s| s.to_string()).collect(),
        human_selected_categories: human.map(|h| h.iter().map(|s| s.to_string()).collect()),
        ai_reasoning: None,
        is_suggestion: row_id.ends_with('0'),
        is_verified: true,
        study_program_id: program,
    }
}

async fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let inst = store.create_institution("Universitas X").await.unwrap();
    let teknik = store.create_faculty("Teknik", inst.id).await.unwrap();
    let hukum_fac = store.create_faculty("Hukum", inst.id).await.unwrap();
    let informatika = store.create_program("Informatika", teknik.id).await.unwrap().id;
    let hukum = store.create_program("Ilmu Hukum", hukum_fac.id).await.unwrap().id;

    let infra = store.create_parent("Infrastructure", None).await.unwrap();
    let academic = store.create_parent("Academic", Some("Teaching and curriculum")).await.unwrap();
    store.create_subcategory("Facilities", infra.id).await.unwrap();
    store.create_subcategory("Internet", infra.id).await.unwrap();
    store.create_subcategory("Curriculum", academic.id).await.unwrap();

    store
        .upsert_bulk(vec![
            new_response("1", informatika, Sentiment::Negative, &["Facilities", "Internet"], None, "Wifi lambat dan AC rusak"),
            new_response("2", informatika, Sentiment::Positive, &["Curriculum"], None, "Dosen sangat membantu"),
            new_response("3", hukum, Sentiment::Neutral, &["Internet"], Some(&["Curriculum"]), "Kurikulum perlu update"),
            new_response("4", hukum, Sentiment::Negative, &["Parking"], None, "Parkir sempit"),
            new_response("10", informatika, Sentiment::Neutral, &[], Some(&["Facilities"]), "Tolong tambah wifi di perpustakaan"),
        ])
        .await
        .unwrap();

    Fixture {
        store,
        informatika,
        hukum,
        infrastructure: infra.id,
    }
}

#[tokio::test]
async fn test_infrastructure_counts_response_once() {
    let f = fixture().await;
    let state = DashboardState::load(&f.store, &f.store, &f.store).await.unwrap();
    let data = state.recompute();

    let infra = data
        .sentiment_by_parent
        .iter()
        .find(|p| p.parent_id == f.infrastructure)
        .unwrap();
    // row 1 carries two Infrastructure subs, row 10 one via its human override
    assert_eq!(infra.counts.negative, 1);
    assert_eq!(infra.counts.neutral, 1);
    assert_eq!(infra.counts.total(), 2);
}

#[tokio::test]
async fn test_filtered_is_subset_and_counts_sum() {
    let f = fixture().await;
    let snapshot = TaxonomySnapshot::load(&f.store, &f.store).await.unwrap();
    let all = f.store.list_all().await.unwrap();

    let filters = [
        ResponseFilter::default(),
        ResponseFilter {
            study_program_id: Some(f.informatika),
            ..Default::default()
        },
        ResponseFilter {
            sentiment: Some(Sentiment::Negative),
            ..Default::default()
        },
        ResponseFilter {
            search: Some("WIFI".to_string()),
            ..Default::default()
        },
        ResponseFilter {
            study_program_id: Some(f.hukum),
            is_suggestion: Some(true),
            ..Default::default()
        },
    ];

    for filter in &filters {
        let data = compute(&all, filter, &snapshot);
        assert!(data.filtered.iter().all(|r| all.contains(r)));
        let sum: usize = data.sentiment_counts.iter().map(|c| c.count).sum();
        assert_eq!(sum, data.filtered.len());
        if data.filtered.is_empty() {
            assert_eq!(data.net_sentiment_score, 0);
        }
    }
}

#[tokio::test]
async fn test_store_category_filter_agrees_with_parent_filter() {
    let f = fixture().await;
    let snapshot = TaxonomySnapshot::load(&f.store, &f.store).await.unwrap();
    let all = f.store.list_all().await.unwrap();

    for parent in &snapshot.parents {
        let names: Vec<String> = snapshot
            .subcategory_names(parent.id)
            .into_iter()
            .map(String::from)
            .collect();
        let from_store = f.store.filter_by_categories(&names).await.unwrap();
        let client_side = filter_responses(
            &all,
            &ResponseFilter {
                parent_category_id: Some(parent.id),
                ..Default::default()
            },
            &snapshot,
        );
        assert_eq!(from_store, client_side, "parent {}", parent.name);
    }
}

#[tokio::test]
async fn test_named_selection_and_keywords() {
    let f = fixture().await;
    let mut state = DashboardState::load(&f.store, &f.store, &f.store).await.unwrap();

    state
        .select(&FilterSelection {
            faculty: Some("Teknik".to_string()),
            ..Default::default()
        })
        .unwrap();
    let data = state.recompute();

    assert_eq!(data.total_responses, 3);
    assert_eq!(data.total_suggestions, 1);
    assert_eq!(data.keywords[0].word, "wifi");
    assert_eq!(data.keywords[0].count, 2);

    state.clear_filter();
    assert_eq!(state.recompute().total_responses, 5);
}

#[tokio::test]
async fn test_dashboard_serializes() {
    let f = fixture().await;
    let state = DashboardState::load(&f.store, &f.store, &f.store).await.unwrap();
    let json = serde_json::to_value(state.recompute()).unwrap();

    assert_eq!(json["total_responses"], 5);
    assert_eq!(json["sentiment_counts"][0]["sentiment"], "Positive");
    assert!(json["sentiment_by_subcategory"].is_array());
    assert_eq!(json["sentiment_by_parent"][0]["name"], "Academic");
}
