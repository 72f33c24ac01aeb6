//! `survey dashboard` and `survey export`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use survey_analytics::{
    filter_responses, DashboardData, DashboardState, FilterSelection, KeywordCount,
    ParentSentiment, SentimentCount, SubcategorySentiment,
};
use survey_core::defaults;
use survey_import::export_responses_to_path;

use super::{FilterArgs, Stores};

#[derive(Args, Debug)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Sub-categories to show
    #[arg(long, default_value_t = defaults::SUBCATEGORY_TOP_N)]
    pub top: usize,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Destination CSV file
    #[arg(long, short)]
    pub output: PathBuf,
}

/// Dashboard output without the filtered rows themselves.
#[derive(Serialize)]
struct Report<'a> {
    total_responses: usize,
    total_suggestions: usize,
    net_sentiment_score: i64,
    sentiment_counts: &'a [SentimentCount],
    sentiment_by_parent: &'a [ParentSentiment],
    sentiment_by_subcategory: Vec<&'a SubcategorySentiment>,
    keywords: &'a [KeywordCount],
}

impl<'a> Report<'a> {
    fn new(data: &'a DashboardData, subcategories: Vec<&'a SubcategorySentiment>) -> Self {
        Self {
            total_responses: data.total_responses,
            total_suggestions: data.total_suggestions,
            net_sentiment_score: data.net_sentiment_score,
            sentiment_counts: &data.sentiment_counts,
            sentiment_by_parent: &data.sentiment_by_parent,
            sentiment_by_subcategory: subcategories,
            keywords: &data.keywords,
        }
    }
}

pub async fn run(args: DashboardArgs, stores: &Stores, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut state = DashboardState::load(
        stores.structure.as_ref(),
        stores.categories.as_ref(),
        stores.responses.as_ref(),
    )
    .await?;
    state.select(&FilterSelection::from(args.filter))?;

    let data = state.recompute();
    let subcategories = data.sentiment_by_subcategory.view(
        state.snapshot(),
        state.filter().effective_parent(),
        args.top,
    );
    let report = Report::new(&data, subcategories);

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        print_report(&report, out)?;
    }
    Ok(())
}

fn print_report(report: &Report<'_>, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Responses:        {}", report.total_responses)?;
    writeln!(out, "Suggestions:      {}", report.total_suggestions)?;
    writeln!(out, "Net sentiment:    {}", report.net_sentiment_score)?;
    for c in report.sentiment_counts {
        writeln!(out, "  {:<10} {}", c.sentiment.as_str(), c.count)?;
    }

    writeln!(out)?;
    writeln!(out, "By parent category (positive / negative / neutral)")?;
    if report.sentiment_by_parent.is_empty() {
        writeln!(out, "  -")?;
    }
    for p in report.sentiment_by_parent {
        writeln!(
            out,
            "  {:<24} {} / {} / {}",
            p.name, p.counts.positive, p.counts.negative, p.counts.neutral
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Top sub-categories (positive / negative / neutral)")?;
    if report.sentiment_by_subcategory.is_empty() {
        writeln!(out, "  -")?;
    }
    for s in &report.sentiment_by_subcategory {
        writeln!(
            out,
            "  {:<24} {} / {} / {}",
            s.name, s.counts.positive, s.counts.negative, s.counts.neutral
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Keywords")?;
    if report.keywords.is_empty() {
        writeln!(out, "  -")?;
    }
    for k in report.keywords {
        writeln!(out, "  {:<24} {}", k.word, k.count)?;
    }
    Ok(())
}

pub async fn export(args: ExportArgs, stores: &Stores, out: &mut dyn Write) -> anyhow::Result<()> {
    let (snapshot, all) = futures::try_join!(stores.snapshot(), stores.responses.list_all())?;
    let filter = FilterSelection::from(args.filter).resolve(&snapshot)?;
    let rows = filter_responses(&all, &filter, &snapshot);
    export_responses_to_path(&args.output, &rows, &snapshot)
        .with_context(|| format!("writing {}", args.output.display()))?;
    writeln!(out, "Exported {} responses to {}.", rows.len(), args.output.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::{NewSurveyResponse, Sentiment};
    use survey_db::MemoryStore;

    async fn seeded() -> Stores {
        let stores = Stores::memory(MemoryStore::new());
        let inst = stores.structure.create_institution("Univ").await.unwrap();
        let fac = stores.structure.create_faculty("Teknik", inst.id).await.unwrap();
        let prog = stores.structure.create_program("Informatika", fac.id).await.unwrap();
        let infra = stores.categories.create_parent("Infrastructure", None).await.unwrap();
        stores.categories.create_subcategory("Internet", infra.id).await.unwrap();

        let rows = [
            ("1", "wifi lambat sekali", Sentiment::Negative, true),
            ("2", "wifi kampus bagus", Sentiment::Positive, false),
            ("3", "wifi mati terus", Sentiment::Negative, false),
        ]
        .into_iter()
        .map(|(no, text, sentiment, is_suggestion)| NewSurveyResponse {
            original_row_id: no.to_string(),
            comment_text: text.to_string(),
            sentiment,
            ai_suggested_categories: vec!["Internet".to_string()],
            human_selected_categories: None,
            ai_reasoning: None,
            is_suggestion,
            is_verified: true,
            study_program_id: prog.id,
        })
        .collect();
        stores.responses.upsert_bulk(rows).await.unwrap();
        stores
    }

    fn dashboard(filter: FilterArgs, json: bool) -> DashboardArgs {
        DashboardArgs {
            filter,
            top: defaults::SUBCATEGORY_TOP_N,
            json,
        }
    }

    #[tokio::test]
    async fn test_text_report() {
        let stores = seeded().await;
        let mut out = Vec::new();
        run(dashboard(FilterArgs::default(), false), &stores, &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Responses:        3"));
        assert!(text.contains("Suggestions:      1"));
        // (1 - 2) / 3 = -33.3
        assert!(text.contains("Net sentiment:    -33"));
        assert!(text.contains("Infrastructure"));
        assert!(text.contains("1 / 2 / 0"));
        assert!(text.contains("wifi"));
    }

    #[tokio::test]
    async fn test_json_report_respects_filter() {
        let stores = seeded().await;
        let mut out = Vec::new();
        run(
            dashboard(
                FilterArgs {
                    sentiment: Some("Negative".to_string()),
                    ..Default::default()
                },
                true,
            ),
            &stores,
            &mut out,
        )
        .await
        .unwrap();
        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(report["total_responses"], 2);
        assert_eq!(report["net_sentiment_score"], -100);
        assert_eq!(report["sentiment_by_subcategory"][0]["name"], "Internet");
        assert!(report.get("filtered").is_none());
    }

    #[tokio::test]
    async fn test_export_writes_filtered_rows() {
        let stores = seeded().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut out = Vec::new();
        export(
            ExportArgs {
                filter: FilterArgs {
                    search: Some("MATI".to_string()),
                    ..Default::default()
                },
                output: path.clone(),
            },
            &stores,
            &mut out,
        )
        .await
        .unwrap();

        assert!(String::from_utf8(out).unwrap().starts_with("Exported 1 responses"));
        let reloaded = survey_import::parse_comment_file(&path).unwrap();
        assert_eq!(reloaded.rows.len(), 1);
        assert_eq!(reloaded.rows[0].row_id, "3");
    }
}
