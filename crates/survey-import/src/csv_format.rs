//! Delimited file decoding and encoding.
//!
//! Comment exports and structure exports are decoded into strict row types
//! at this boundary. Problems with single rows are reported as [`RowIssue`]s
//! and the rest of the file still loads.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use survey_core::defaults::DELIMITER_SNIFF_LINES;
use survey_core::{
    trimmed, Error, Result, RowIssue, Sentiment, StructureRow, SurveyResponse, TaxonomySnapshot,
    WorkingRow,
};

pub const COL_NO: &str = "No";
pub const COL_INSTITUTION: &str = "Institusi";
pub const COL_FACULTY: &str = "Fakultas";
pub const COL_PROGRAM: &str = "Prodi";
pub const COL_PROGRAM_ALT: &str = "Program Studi";
pub const COL_COMMENT: &str = "Learning Experience_comment";
pub const COL_SENTIMENT: &str = "sentiment";
pub const COL_AI_SUBCATEGORIES: &str = "ai_subcategories";
pub const COL_HUMAN_CATEGORIES: &str = "human_selected_categories";
pub const COL_AI_REASONING: &str = "ai_reasoning";
pub const COL_IS_SUGGESTION: &str = "is_suggestion";

/// Header row written by [`export_responses`].
pub const EXPORT_HEADERS: [&str; 7] = [
    COL_NO,
    COL_PROGRAM,
    COL_COMMENT,
    COL_SENTIMENT,
    COL_AI_SUBCATEGORIES,
    COL_HUMAN_CATEGORIES,
    COL_IS_SUGGESTION,
];

/// Decoded comment export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedComments {
    pub rows: Vec<WorkingRow>,
    pub issues: Vec<RowIssue>,
}

/// Decoded structure export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedStructure {
    pub rows: Vec<StructureRow>,
    pub issues: Vec<RowIssue>,
}

/// Pick tab, comma or semicolon from the first non-blank line that
/// contains any of them. Defaults to tab.
pub fn detect_delimiter(text: &str) -> u8 {
    for line in text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(DELIMITER_SNIFF_LINES)
    {
        let counts = [
            (b'\t', line.matches('\t').count()),
            (b',', line.matches(',').count()),
            (b';', line.matches(';').count()),
        ];
        if let Some((delimiter, count)) = counts.iter().max_by_key(|(_, count)| *count) {
            if *count > 0 {
                return *delimiter;
            }
        }
    }
    b'\t'
}

/// Column lookup by trimmed header name.
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();
        Self { index }
    }

    fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        self.index.get(name).and_then(|&i| record.get(i))
    }

    fn trimmed<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        trimmed(self.get(record, name))
    }
}

fn reader(text: &str) -> csv::Reader<&[u8]> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(text))
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Decode a JSON array of category names. Anything else yields an empty list.
pub fn parse_category_list(cell: Option<&str>) -> Vec<String> {
    match cell.map(str::trim).filter(|c| !c.is_empty()) {
        Some(raw) => serde_json::from_str::<Vec<String>>(raw).unwrap_or_default(),
        None => Vec::new(),
    }
}

/// `true` iff the cell reads `true`, ignoring case.
pub fn parse_flag(cell: Option<&str>) -> bool {
    cell.map(|c| c.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Decode a comment export held in memory.
pub fn parse_comments(text: &str) -> Result<ParsedComments> {
    let mut reader = reader(text);
    let headers = reader.headers()?.clone();
    let cols = Columns::new(&headers);
    if !cols.has(COL_NO) {
        return Err(Error::InvalidInput(format!(
            "missing required column `{}`",
            COL_NO
        )));
    }

    let mut parsed = ParsedComments::default();
    for (i, record) in reader.records().enumerate() {
        let row_number = i + 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(subsystem = "import", component = "csv", row_number, error = %e, "Skipping malformed record");
                parsed.issues.push(RowIssue {
                    row_number,
                    message: format!("malformed record dropped: {}", e),
                });
                continue;
            }
        };
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let Some(row_id) = cols.trimmed(&record, COL_NO) else {
            continue;
        };

        let sentiment = match cols.trimmed(&record, COL_SENTIMENT) {
            None => None,
            Some(raw) => match raw.parse::<Sentiment>() {
                Ok(s) => Some(s),
                Err(e) => {
                    parsed.issues.push(RowIssue {
                        row_number,
                        message: e,
                    });
                    None
                }
            },
        };

        let program_name = cols
            .trimmed(&record, COL_PROGRAM)
            .or_else(|| cols.trimmed(&record, COL_PROGRAM_ALT))
            .unwrap_or_default();

        parsed.rows.push(WorkingRow {
            row_id: row_id.to_string(),
            institution: cols.trimmed(&record, COL_INSTITUTION).map(String::from),
            faculty: cols.trimmed(&record, COL_FACULTY).map(String::from),
            program_name: program_name.to_string(),
            comment_text: cols
                .get(&record, COL_COMMENT)
                .unwrap_or_default()
                .to_string(),
            sentiment,
            ai_subcategories: parse_category_list(cols.get(&record, COL_AI_SUBCATEGORIES)),
            // present in our own exports; absent in survey exports
            human_selected_categories: cols
                .trimmed(&record, COL_HUMAN_CATEGORIES)
                .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok()),
            ai_reasoning: cols.trimmed(&record, COL_AI_REASONING).map(String::from),
            is_suggestion: parse_flag(cols.get(&record, COL_IS_SUGGESTION)),
            is_verified: false,
        });
    }

    debug!(
        subsystem = "import",
        component = "csv",
        op = "parse_comments",
        row_count = parsed.rows.len(),
        issue_count = parsed.issues.len(),
        "Decoded comment file"
    );
    Ok(parsed)
}

/// Decode a comment export from disk.
pub fn parse_comment_file(path: impl AsRef<Path>) -> Result<ParsedComments> {
    let text = std::fs::read_to_string(path)?;
    parse_comments(&text)
}

/// Decode a structure export (`Institusi, Fakultas, Prodi`) held in memory.
pub fn parse_structure(text: &str) -> Result<ParsedStructure> {
    let mut reader = reader(text);
    let headers = reader.headers()?.clone();
    let cols = Columns::new(&headers);
    if !cols.has(COL_INSTITUTION) {
        return Err(Error::InvalidInput(format!(
            "missing required column `{}`",
            COL_INSTITUTION
        )));
    }

    let mut parsed = ParsedStructure::default();
    for (i, record) in reader.records().enumerate() {
        let row_number = i + 1;
        match record {
            Ok(record) => {
                if record.iter().all(|v| v.trim().is_empty()) {
                    continue;
                }
                parsed.rows.push(StructureRow {
                    institution: cols.trimmed(&record, COL_INSTITUTION).map(String::from),
                    faculty: cols.trimmed(&record, COL_FACULTY).map(String::from),
                    program: cols
                        .trimmed(&record, COL_PROGRAM)
                        .or_else(|| cols.trimmed(&record, COL_PROGRAM_ALT))
                        .map(String::from),
                });
            }
            Err(e) => parsed.issues.push(RowIssue {
                row_number,
                message: format!("malformed record: {}", e),
            }),
        }
    }
    Ok(parsed)
}

/// Decode a structure export from disk.
pub fn parse_structure_file(path: impl AsRef<Path>) -> Result<ParsedStructure> {
    let text = std::fs::read_to_string(path)?;
    parse_structure(&text)
}

/// Write responses in the import format so an export can be loaded again.
pub fn export_responses<W: Write>(
    out: W,
    responses: &[SurveyResponse],
    snapshot: &TaxonomySnapshot,
) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(EXPORT_HEADERS)?;

    for r in responses {
        let program = snapshot
            .program(r.study_program_id)
            .map(|p| p.name.as_str())
            .unwrap_or_default();
        let ai = serde_json::to_string(&r.ai_suggested_categories)?;
        let human = match &r.human_selected_categories {
            Some(h) => serde_json::to_string(h)?,
            None => String::new(),
        };
        let sentiment = r.sentiment.to_string();
        let flag = r.is_suggestion.to_string();
        writer.write_record([
            r.original_row_id.as_str(),
            program,
            r.comment_text.as_str(),
            sentiment.as_str(),
            ai.as_str(),
            human.as_str(),
            flag.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(responses.len())
}

/// Write an export to a file path.
pub fn export_responses_to_path(
    path: impl AsRef<Path>,
    responses: &[SurveyResponse],
    snapshot: &TaxonomySnapshot,
) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    export_responses(file, responses, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("No\tProdi\n1\tA"), b'\t');
        assert_eq!(detect_delimiter("\n\nNo,Prodi,Learning Experience_comment\n"), b',');
        assert_eq!(detect_delimiter("No;Prodi"), b';');
        assert_eq!(detect_delimiter("No"), b'\t');
    }

    #[test]
    fn test_parse_comments_tab_delimited() {
        let text = "No\tProdi\tLearning Experience_comment\tsentiment\tai_subcategories\tis_suggestion\n\
                    1\tInformatika\tDosen ramah\tpositive\t[\"Staff\"]\tTRUE\n";
        let parsed = parse_comments(text).unwrap();
        assert!(parsed.issues.is_empty());
        let row = &parsed.rows[0];
        assert_eq!(row.row_id, "1");
        assert_eq!(row.program_name, "Informatika");
        assert_eq!(row.comment_text, "Dosen ramah");
        assert_eq!(row.sentiment, Some(Sentiment::Positive));
        assert_eq!(row.ai_subcategories, vec!["Staff".to_string()]);
        assert!(row.is_suggestion);
        assert!(!row.is_verified);
        assert!(row.human_selected_categories.is_none());
    }

    #[test]
    fn test_parse_comments_program_studi_fallback() {
        let text = "No,Prodi,Program Studi\n1,,Farmasi\n2,Gizi,Farmasi\n";
        let parsed = parse_comments(text).unwrap();
        assert_eq!(parsed.rows[0].program_name, "Farmasi");
        assert_eq!(parsed.rows[1].program_name, "Gizi");
    }

    #[test]
    fn test_parse_comments_skips_rows_without_no_and_blank_lines() {
        let text = "No,Prodi\n1,A\n\n,B\n , C\n2,D\n";
        let parsed = parse_comments(text).unwrap();
        let ids: Vec<_> = parsed.rows.iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_parse_comments_bad_json_is_empty_list() {
        let text = "No\tai_subcategories\n1\tnot json\n2\t\n";
        let parsed = parse_comments(text).unwrap();
        assert!(parsed.rows[0].ai_subcategories.is_empty());
        assert!(parsed.rows[1].ai_subcategories.is_empty());
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn test_parse_comments_unknown_sentiment_is_reported() {
        let text = "No,sentiment\n1,meh\n";
        let parsed = parse_comments(text).unwrap();
        assert_eq!(parsed.rows[0].sentiment, None);
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.issues[0].row_number, 1);
    }

    #[test]
    fn test_parse_comments_requires_no_column() {
        let err = parse_comments("Prodi,comment\nA,b\n").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some(" True ")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("1")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_parse_structure() {
        let text = "Institusi,Fakultas,Prodi\nUniv X, Teknik ,Informatika\nUniv X,,\n";
        let parsed = parse_structure(text).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].faculty.as_deref(), Some("Teknik"));
        assert_eq!(parsed.rows[1].faculty, None);
        assert_eq!(parsed.rows[1].program, None);
    }
}
