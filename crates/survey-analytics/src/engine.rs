//! Dashboard aggregation.
//!
//! [`compute`] filters the full response set and derives every dashboard
//! series from the filtered subset. It performs no I/O.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use survey_core::{FilterContext, ResponseFilter, Sentiment, SurveyResponse, TaxonomySnapshot};

use crate::keywords::{top_keywords, KeywordCount};

/// Per-sentiment tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentBreakdown {
    pub fn add(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// One slice of the sentiment distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentimentCount {
    pub sentiment: Sentiment,
    pub count: usize,
}

/// Sentiment tallies for one parent category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentSentiment {
    pub parent_id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub counts: SentimentBreakdown,
}

/// Sentiment tallies for one sub-category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategorySentiment {
    pub name: String,
    #[serde(flatten)]
    pub counts: SentimentBreakdown,
    pub total: usize,
}

/// Sub-category rows sorted by total, largest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubcategorySeries {
    rows: Vec<SubcategorySentiment>,
}

impl SubcategorySeries {
    pub fn rows(&self) -> &[SubcategorySentiment] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `top_n` rows, optionally restricted to the sub-categories
    /// of one parent. A parent without sub-categories yields nothing.
    pub fn view(
        &self,
        snapshot: &TaxonomySnapshot,
        parent_id: Option<Uuid>,
        top_n: usize,
    ) -> Vec<&SubcategorySentiment> {
        let allowed: Option<HashSet<&str>> =
            parent_id.map(|id| snapshot.subcategory_names(id).into_iter().collect());

        self.rows
            .iter()
            .filter(|row| {
                allowed
                    .as_ref()
                    .map_or(true, |names| names.contains(row.name.as_str()))
            })
            .take(top_n)
            .collect()
    }
}

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub filtered: Vec<SurveyResponse>,
    pub total_responses: usize,
    pub total_suggestions: usize,
    pub sentiment_counts: Vec<SentimentCount>,
    pub net_sentiment_score: i64,
    pub sentiment_by_parent: Vec<ParentSentiment>,
    pub sentiment_by_subcategory: SubcategorySeries,
    pub keywords: Vec<KeywordCount>,
}

/// Responses matching `filter`, in input order.
pub fn filter_responses(
    all: &[SurveyResponse],
    filter: &ResponseFilter,
    snapshot: &TaxonomySnapshot,
) -> Vec<SurveyResponse> {
    let ctx = FilterContext::new(filter, snapshot);
    all.iter().filter(|r| ctx.matches(r)).cloned().collect()
}

/// `round(100 * (positive - negative) / total)`, halves rounded up.
/// Zero when there is nothing to score.
pub fn net_sentiment_score(counts: &SentimentBreakdown) -> i64 {
    let total = counts.total();
    if total == 0 {
        return 0;
    }
    let diff = counts.positive as f64 - counts.negative as f64;
    (100.0 * diff / total as f64 + 0.5).floor() as i64
}

/// Filter `all` and aggregate the result.
pub fn compute(
    all: &[SurveyResponse],
    filter: &ResponseFilter,
    snapshot: &TaxonomySnapshot,
) -> DashboardData {
    let start = Instant::now();
    let filtered = filter_responses(all, filter, snapshot);

    let mut overall = SentimentBreakdown::default();
    for response in &filtered {
        overall.add(response.sentiment);
    }

    let sentiment_counts = Sentiment::ALL
        .iter()
        .filter(|s| overall.get(**s) > 0)
        .map(|s| SentimentCount {
            sentiment: *s,
            count: overall.get(*s),
        })
        .collect();

    let data = DashboardData {
        total_responses: filtered.len(),
        total_suggestions: filtered.iter().filter(|r| r.is_suggestion).count(),
        sentiment_counts,
        net_sentiment_score: net_sentiment_score(&overall),
        sentiment_by_parent: by_parent(&filtered, snapshot),
        sentiment_by_subcategory: by_subcategory(&filtered),
        keywords: top_keywords(filtered.iter().map(|r| r.comment_text.as_str())),
        filtered,
    };

    debug!(
        subsystem = "analytics",
        component = "engine",
        op = "compute",
        input_count = all.len(),
        result_count = data.total_responses,
        duration_ms = start.elapsed().as_millis() as u64,
        "Dashboard computed"
    );
    data
}

fn by_parent(responses: &[SurveyResponse], snapshot: &TaxonomySnapshot) -> Vec<ParentSentiment> {
    let index: HashMap<Uuid, usize> = snapshot
        .parents
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i))
        .collect();

    // sub-category name -> owning parent positions; a name may sit under several parents
    let mut owners: HashMap<&str, Vec<usize>> = HashMap::new();
    for sub in &snapshot.subcategories {
        if let Some(&i) = index.get(&sub.parent_category_id) {
            owners.entry(sub.name.as_str()).or_default().push(i);
        }
    }

    let mut rows: Vec<ParentSentiment> = snapshot
        .parents
        .iter()
        .map(|p| ParentSentiment {
            parent_id: p.id,
            name: p.name.clone(),
            counts: SentimentBreakdown::default(),
        })
        .collect();

    for response in responses {
        let hit: HashSet<usize> = response
            .display_categories()
            .iter()
            .filter_map(|name| owners.get(name.as_str()))
            .flatten()
            .copied()
            .collect();
        for i in hit {
            rows[i].counts.add(response.sentiment);
        }
    }
    rows
}

fn by_subcategory(responses: &[SurveyResponse]) -> SubcategorySeries {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<SubcategorySentiment> = Vec::new();

    for response in responses {
        let mut seen: HashSet<&str> = HashSet::new();
        for name in response.display_categories() {
            if !seen.insert(name.as_str()) {
                continue;
            }
            let i = *index.entry(name.as_str()).or_insert_with(|| {
                rows.push(SubcategorySentiment {
                    name: name.clone(),
                    counts: SentimentBreakdown::default(),
                    total: 0,
                });
                rows.len() - 1
            });
            rows[i].counts.add(response.sentiment);
            rows[i].total += 1;
        }
    }

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    SubcategorySeries { rows }
}
