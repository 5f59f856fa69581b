use crate::{
    AttemptRecord, GradeValue, ProgressStore, Word, WordProgress, MS_PER_DAY, PRIORITY_MAX,
    PRIORITY_MIN, PRIORITY_NEW, RECENCY_DECAY,
};
use std::cmp::Ordering;

/// Scheduling weight of one grade. Higher means the word needs review
/// sooner.
pub fn grade_weight(grade: GradeValue) -> f32 {
    match grade {
        GradeValue::Hard => 1.5,
        GradeValue::Again => 1.1,
        GradeValue::Normal => 0.75,
        GradeValue::Easy => 0.25,
        GradeValue::Unknown => {
            tracing::warn!("unrecognized grade in history, weighting as 0");
            0.0
        }
    }
}

/// Recency-weighted average of the graded history, newest entry first.
/// The most recent grade dominates (each older entry decays by
/// `RECENCY_DECAY`), clamped to `[PRIORITY_MIN, PRIORITY_MAX]`. An empty
/// history scores `PRIORITY_NEW`.
pub fn calculate_priority(history: &[AttemptRecord]) -> f32 {
    if history.is_empty() {
        return PRIORITY_NEW;
    }

    let mut weighted_sum = 0.0f32;
    let mut total_weight = 0.0f32;
    for (i, record) in history.iter().rev().enumerate() {
        let recency = RECENCY_DECAY.powi(i as i32);
        weighted_sum += grade_weight(record.grade) * recency;
        total_weight += recency;
    }

    if total_weight == 0.0 {
        return PRIORITY_NEW;
    }
    (weighted_sum / total_weight).clamp(PRIORITY_MIN, PRIORITY_MAX)
}

pub fn word_priority(word: &Word, store: &ProgressStore) -> f32 {
    store
        .get(&word.question)
        .map(|p| calculate_priority(&p.history))
        .unwrap_or(PRIORITY_NEW)
}

/// Display label for a priority value; not used in queue math.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityCategory {
    Easy,
    Normal,
    Again,
    Hard,
}

impl PriorityCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PriorityCategory::Easy => "easy",
            PriorityCategory::Normal => "normal",
            PriorityCategory::Again => "again",
            PriorityCategory::Hard => "hard",
        }
    }

    pub fn range_label(self) -> &'static str {
        match self {
            PriorityCategory::Easy => "~0.5",
            PriorityCategory::Normal => "0.5~1.0",
            PriorityCategory::Again => "1.0~1.2",
            PriorityCategory::Hard => "1.2~",
        }
    }
}

impl std::fmt::Display for PriorityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn category_of(priority: f32) -> PriorityCategory {
    if priority < 0.5 {
        PriorityCategory::Easy
    } else if priority < 1.0 {
        PriorityCategory::Normal
    } else if priority < 1.2 {
        PriorityCategory::Again
    } else {
        PriorityCategory::Hard
    }
}

/// A reviewed word not graded within the threshold window. Words with no
/// history are never stale.
pub fn is_stale(progress: &WordProgress, now_ms: i64, threshold_days: i64) -> bool {
    match progress.last_attempt_ms() {
        Some(last) => last < now_ms - threshold_days * MS_PER_DAY,
        None => false,
    }
}

/// Descending by priority; stable, so equal-priority words keep their
/// input order.
pub fn sort_by_priority(words: &[Word], store: &ProgressStore) -> Vec<Word> {
    let mut keyed: Vec<(f32, Word)> = words
        .iter()
        .map(|w| (word_priority(w, store), w.clone()))
        .collect();
    keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    keyed.into_iter().map(|(_, w)| w).collect()
}
