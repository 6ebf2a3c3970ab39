//! Rule-based priority scoring for new reports.
//!
//! Two tables live here and are deliberately kept apart:
//!
//! * the **operational** table ([`classify`]) decides the stored `priority`,
//!   which in turn selects the SLA deadline;
//! * the **analytics** table ([`analytics_score`]) produces the 0-100
//!   `priority_score` and the [`RiskLevel`] tag used by dashboards.
//!
//! They share a family of keywords and category weights but are tuned
//! independently, so the same report can score differently in each.

use crate::features::reports::models::{ReportCategory, ReportPriority, ReportSeverity, RiskLevel};

const BASE_SCORE: i32 = 50;

const CRITICAL_KEYWORDS: &[&str] = &[
    "emergency",
    "urgent",
    "dangerous",
    "fire",
    "flood",
    "accident",
    "immediate",
    "critical",
    "overflow",
    "blocked",
    "broken",
];

const HIGH_KEYWORDS: &[&str] = &[
    "water",
    "traffic",
    "signal",
    "school",
    "hospital",
    "main road",
    "highway",
    "market",
    "busy",
];

const MEDIUM_KEYWORDS: &[&str] = &["repair", "cleaning", "maintenance", "improvement"];

/// Checked in order; only the first tier with a hit contributes
const KEYWORD_TIERS: &[(&[&str], i32)] = &[
    (CRITICAL_KEYWORDS, 40),
    (HIGH_KEYWORDS, 25),
    (MEDIUM_KEYWORDS, 10),
];

const ANALYTICS_URGENT_KEYWORDS: &[&str] = &["emergency", "urgent", "dangerous"];
const ANALYTICS_INFRASTRUCTURE_KEYWORDS: &[&str] = &["water", "traffic", "signal"];
const ANALYTICS_SCORE_CAP: i32 = 100;

/// Fields of a submission the classifier reads
#[derive(Debug, Clone, Copy)]
pub struct ClassificationInput<'a> {
    pub title: Option<&'a str>,
    pub description: &'a str,
    pub category: ReportCategory,
    pub severity: Option<ReportSeverity>,
}

/// Operational classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub priority: ReportPriority,
    /// Unclamped sum of all contributions; can exceed 100
    pub raw_score: i32,
}

impl Classification {
    /// `raw_score` clamped into 0..=100
    pub fn score(&self) -> i32 {
        self.raw_score.clamp(0, 100)
    }
}

fn searchable_text(input: &ClassificationInput<'_>) -> String {
    match input.title {
        Some(title) => format!("{} {}", title, input.description).to_lowercase(),
        None => input.description.to_lowercase(),
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn keyword_bonus(text: &str) -> i32 {
    KEYWORD_TIERS
        .iter()
        .find(|(words, _)| contains_any(text, words))
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

fn category_weight(category: ReportCategory) -> i32 {
    match category {
        ReportCategory::Water => 30,
        ReportCategory::Traffic => 25,
        ReportCategory::Drainage => 20,
        ReportCategory::Streetlight => 15,
        ReportCategory::Pothole => 10,
        ReportCategory::Garbage => 5,
        ReportCategory::Construction => 5,
        ReportCategory::Other => 0,
    }
}

fn severity_adjustment(severity: Option<ReportSeverity>) -> i32 {
    match severity {
        Some(ReportSeverity::Critical) => 30,
        Some(ReportSeverity::High) => 20,
        Some(ReportSeverity::Medium) | None => 0,
        Some(ReportSeverity::Low) => -10,
    }
}

fn priority_for_score(score: i32) -> ReportPriority {
    match score {
        s if s >= 80 => ReportPriority::Critical,
        s if s >= 65 => ReportPriority::High,
        s if s >= 35 => ReportPriority::Medium,
        _ => ReportPriority::Low,
    }
}

/// Compute the operational priority of a submission
pub fn classify(input: &ClassificationInput<'_>) -> Classification {
    let text = searchable_text(input);

    let raw_score = BASE_SCORE
        + keyword_bonus(&text)
        + category_weight(input.category)
        + severity_adjustment(input.severity);

    Classification {
        priority: priority_for_score(raw_score),
        raw_score,
    }
}

fn analytics_category_weight(category: ReportCategory) -> i32 {
    match category {
        ReportCategory::Water => 30,
        ReportCategory::Traffic => 25,
        ReportCategory::Streetlight => 15,
        _ => 0,
    }
}

/// Analytics priority score, capped at 100. Severity is not an input here,
/// and the two keyword groups add up instead of short-circuiting.
pub fn analytics_score(input: &ClassificationInput<'_>) -> i32 {
    let text = searchable_text(input);
    let mut score = BASE_SCORE;

    if contains_any(&text, ANALYTICS_URGENT_KEYWORDS) {
        score += 40;
    }
    if contains_any(&text, ANALYTICS_INFRASTRUCTURE_KEYWORDS) {
        score += 25;
    }
    score += analytics_category_weight(input.category);

    score.min(ANALYTICS_SCORE_CAP)
}

pub fn risk_level(analytics_score: i32) -> RiskLevel {
    if analytics_score >= 80 {
        RiskLevel::High
    } else if analytics_score >= 60 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
