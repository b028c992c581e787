//! Incident report summaries

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Number of terms kept in a summary
pub const MAX_COMMON_TERMS: usize = 10;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "in", "on", "at", "by", "for", "to", "of", "is", "was", "were",
];

/// Free-text accident report as submitted by field staff
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IncidentReport {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    pub total_reports: usize,
    pub common_terms: Vec<TermCount>,
    pub severity_counts: BTreeMap<String, usize>,
    pub top_report: Option<IncidentReport>,
}

/// Lowercased ASCII-letter runs, stopwords removed
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_ascii_lowercase())
        .filter(|token| !STOPWORDS.contains(&token.as_str()))
}

pub fn summarize_reports(reports: &[IncidentReport]) -> ReportSummary {
    // term -> (count, first position)
    let mut terms: HashMap<String, (usize, usize)> = HashMap::new();
    let mut position = 0;
    for report in reports {
        for token in tokenize(&report.description) {
            terms.entry(token).or_insert((0, position)).0 += 1;
            position += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = terms
        .into_iter()
        .map(|(term, (count, first))| (term, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let mut severity_counts = BTreeMap::new();
    for report in reports {
        let severity = report
            .severity
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_else(|| "unknown".to_string());
        *severity_counts.entry(severity).or_insert(0) += 1;
    }

    ReportSummary {
        total_reports: reports.len(),
        common_terms: ranked
            .into_iter()
            .take(MAX_COMMON_TERMS)
            .map(|(term, count, _)| TermCount { term, count })
            .collect(),
        severity_counts,
        top_report: reports.first().cloned(),
    }
}
