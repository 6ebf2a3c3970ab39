use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::features::reports::models::{GeoPoint, Report, ReportCategory};
use crate::shared::constants::{DUPLICATE_RADIUS_METERS, DUPLICATE_WINDOW_HOURS};

/// What a new submission looks like before it has been persisted
#[derive(Debug, Clone, Copy)]
pub struct DuplicateCandidate<'a> {
    pub category: ReportCategory,
    pub point: GeoPoint,
    pub description: &'a str,
}

/// An existing report that the candidate duplicates
#[derive(Debug, Clone, Copy)]
pub struct DuplicateMatch<'a> {
    pub report: &'a Report,
    pub distance_meters: f64,
    /// 0..=100
    pub similarity: u8,
}

/// Find the first report in `existing` that the candidate duplicates.
///
/// A peer qualifies when it is open, has the same category, valid coordinates,
/// lies within the duplicate radius and was created no more than the duplicate
/// window before `now`. Peers are examined in slice order, so callers decide
/// which match wins by how they order the slice.
pub fn find_duplicate<'a>(
    candidate: &DuplicateCandidate<'_>,
    existing: &'a [Report],
    now: DateTime<Utc>,
) -> Option<DuplicateMatch<'a>> {
    if !candidate.point.is_valid() {
        return None;
    }

    let window_start = now - Duration::hours(DUPLICATE_WINDOW_HOURS);

    existing.iter().find_map(|report| {
        if !report.status.is_open() || report.category != candidate.category {
            return None;
        }

        let point = report.location.point();
        if !point.is_valid() {
            return None;
        }

        let distance = candidate.point.distance_meters(&point);
        if distance > DUPLICATE_RADIUS_METERS || report.created_at < window_start {
            return None;
        }

        Some(DuplicateMatch {
            report,
            distance_meters: distance,
            similarity: similarity_score(candidate, report, distance),
        })
    })
}

fn distance_points(distance_meters: f64) -> u32 {
    if distance_meters < 50.0 {
        30
    } else if distance_meters < 100.0 {
        20
    } else if distance_meters < 200.0 {
        10
    } else {
        0
    }
}

/// Category match (40) + proximity (up to 30) + word overlap (up to 30), capped at 100
pub fn similarity_score(
    candidate: &DuplicateCandidate<'_>,
    report: &Report,
    distance_meters: f64,
) -> u8 {
    let mut score = 0u32;

    if candidate.category == report.category {
        score += 40;
    }
    score += distance_points(distance_meters);
    score += (text_similarity(candidate.description, &report.description) * 30.0).floor() as u32;

    score.min(100) as u8
}

/// Jaccard index over the distinct lowercase whitespace-separated words
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();

    intersection as f64 / union as f64
}
