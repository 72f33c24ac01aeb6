//! Category suggestions from a language model.
//!
//! A batch of comments goes out as one chat request. The reply must be a
//! JSON object `{ "suggestions": [ { "parent": .., "child": .. } ] }`,
//! optionally wrapped in a markdown code fence. Anything else is
//! [`Error::BadFormat`].

use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use survey_core::{
    CategorySuggestion, Error, GenerationBackend, PendingSuggestion, Result, SuggestionPayload,
    SuggestionRepository,
};

pub const SYSTEM_PROMPT: &str = "You are an assistant that suggests parent & child category names.\n\
Return ONLY valid JSON matching this type:\n\
{ \"suggestions\": [ { \"parent\": \"string\", \"child\": \"string\" } ] }";

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```$").expect("fence pattern is valid")
});

/// User message listing one comment per line.
pub fn build_prompt<S: AsRef<str>>(comments: &[S]) -> String {
    let lines: Vec<String> = comments
        .iter()
        .map(|c| format!("- {}", c.as_ref()))
        .collect();
    format!("Here are some comments:\n{}", lines.join("\n"))
}

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str().trim())
}

/// Decode and validate a model reply.
pub fn parse_suggestions(raw: &str) -> Result<Vec<CategorySuggestion>> {
    let body = strip_code_fence(raw);
    let payload: SuggestionPayload =
        serde_json::from_str(body).map_err(|e| Error::BadFormat(e.to_string()))?;

    for (i, s) in payload.suggestions.iter().enumerate() {
        if s.parent.is_empty() {
            return Err(Error::BadFormat(format!("suggestion {} has an empty parent", i)));
        }
        if s.child.is_empty() {
            return Err(Error::BadFormat(format!("suggestion {} has an empty child", i)));
        }
    }
    Ok(payload.suggestions)
}

/// Ask the backend for category suggestions covering `comments`.
pub async fn suggest_categories<G, S>(backend: &G, comments: &[S]) -> Result<Vec<CategorySuggestion>>
where
    G: GenerationBackend + ?Sized,
    S: AsRef<str>,
{
    if comments.is_empty() {
        return Err(Error::InvalidInput("no comments to send".to_string()));
    }

    let start = Instant::now();
    let reply = backend
        .generate_with_system(SYSTEM_PROMPT, &build_prompt(comments))
        .await?;

    let suggestions = parse_suggestions(&reply).inspect_err(|e| {
        warn!(
            subsystem = "inference",
            component = "suggestion",
            op = "suggest_categories",
            model = backend.model_name(),
            response_len = reply.len(),
            error = %e,
            "Failed to parse suggestion reply"
        );
    })?;

    info!(
        subsystem = "inference",
        component = "suggestion",
        op = "suggest_categories",
        model = backend.model_name(),
        input_count = comments.len(),
        result_count = suggestions.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Category suggestions received"
    );
    Ok(suggestions)
}

/// Ask for suggestions and store them as pending review items.
pub async fn suggest_and_enqueue<G, Q, S>(
    backend: &G,
    queue: &Q,
    comments: &[S],
) -> Result<Vec<PendingSuggestion>>
where
    G: GenerationBackend + ?Sized,
    Q: SuggestionRepository + ?Sized,
    S: AsRef<str>,
{
    let suggestions = suggest_categories(backend, comments).await?;
    if suggestions.is_empty() {
        return Ok(Vec::new());
    }
    queue.enqueue(&suggestions).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;

    #[test]
    fn test_build_prompt() {
        assert_eq!(
            build_prompt(&["AC rusak", "Wifi lambat"]),
            "Here are some comments:\n- AC rusak\n- Wifi lambat"
        );
    }

    #[test]
    fn test_system_prompt_text() {
        assert!(SYSTEM_PROMPT.starts_with("You are an assistant that suggests parent & child category names.\n"));
        assert!(SYSTEM_PROMPT.ends_with(r#"{ "suggestions": [ { "parent": "string", "child": "string" } ] }"#));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_parse_fenced_reply() {
        let raw = "```json\n{\"suggestions\":[{\"parent\":\"Infra\",\"child\":\"Wifi\"}]}\n```";
        assert_eq!(
            parse_suggestions(raw).unwrap(),
            vec![CategorySuggestion {
                parent: "Infra".to_string(),
                child: "Wifi".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for raw in [
            "",
            "Sure! Here are some categories.",
            "{\"suggestions\": {}}",
            "{\"suggestions\":[{\"parent\":\"Infra\"}]}",
            "{\"suggestions\":[{\"parent\":\"\",\"child\":\"Wifi\"}]}",
            "{\"suggestions\":[{\"parent\":\"Infra\",\"child\":\"\"}]}",
        ] {
            assert!(
                matches!(parse_suggestions(raw), Err(Error::BadFormat(_))),
                "accepted {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_parse_empty_list_is_ok() {
        assert!(parse_suggestions("{\"suggestions\":[]}").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_suggest_sends_system_and_prompt() {
        let backend = MockGenerationBackend::new()
            .with_response("{\"suggestions\":[{\"parent\":\"Academic\",\"child\":\"Lecturers\"}]}");

        let suggestions = suggest_categories(&backend, &["Dosen sering telat"]).await.unwrap();

        assert_eq!(suggestions[0].child, "Lecturers");
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, SYSTEM_PROMPT);
        assert_eq!(calls[0].prompt, "Here are some comments:\n- Dosen sering telat");
    }

    #[tokio::test]
    async fn test_backend_failure_passes_through() {
        let backend = MockGenerationBackend::new().with_failure("connection refused");
        let err = suggest_categories(&backend, &["x"]).await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[tokio::test]
    async fn test_empty_comment_list_is_rejected_without_call() {
        let backend = MockGenerationBackend::new();
        let comments: [&str; 0] = [];
        let err = suggest_categories(&backend, &comments).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(backend.calls().is_empty());
    }
}
