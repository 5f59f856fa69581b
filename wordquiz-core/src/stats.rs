use crate::{GradeValue, ProgressStore, WordProgress};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct Totals {
    pub total: u32,
    pub again: u32,
    pub hard: u32,
    pub normal: u32,
    pub easy: u32,
}

impl Totals {
    pub fn record(&mut self, g: GradeValue) {
        self.total += 1;
        match g {
            GradeValue::Again => self.again += 1,
            GradeValue::Hard => self.hard += 1,
            GradeValue::Normal => self.normal += 1,
            GradeValue::Easy => self.easy += 1,
            GradeValue::Unknown => {}
        }
    }

    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.normal + self.easy) as f32 / self.total as f32
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StatsSummary {
    pub totals: Totals,
    pub per_day: BTreeMap<NaiveDate, Totals>,
}

pub fn date_of_ms(ms: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|t| t.date_naive())
}

pub fn summarize(store: &ProgressStore) -> StatsSummary {
    let mut summary = StatsSummary::default();
    for (_, progress) in store.iter() {
        for rec in &progress.history {
            summary.totals.record(rec.grade);
            if let Some(d) = date_of_ms(rec.timestamp) {
                summary.per_day.entry(d).or_default().record(rec.grade);
            }
        }
    }
    summary
}

pub fn daily_streak(store: &ProgressStore, today: NaiveDate) -> u32 {
    let per_day = summarize(store).per_day;
    let mut streak = 0u32;
    let mut day = today;
    loop {
        if per_day.get(&day).map(|t| t.total > 0).unwrap_or(false) {
            streak += 1;
            day -= Duration::days(1);
        } else {
            break;
        }
    }
    streak
}

/// Correct/wrong counts recomputed from history. Kept separate from the
/// lifetime counters on `WordProgress`; some data written by older tools
/// disagrees between the two, and reporting surfaces the drift instead of
/// unifying it.
pub fn derived_counts(progress: &WordProgress) -> (u32, u32) {
    let mut correct = 0u32;
    let mut wrong = 0u32;
    for rec in &progress.history {
        match rec.grade {
            GradeValue::Normal | GradeValue::Easy => correct += 1,
            GradeValue::Again | GradeValue::Hard => wrong += 1,
            GradeValue::Unknown => {}
        }
    }
    (correct, wrong)
}

pub fn counters_drift(progress: &WordProgress) -> bool {
    derived_counts(progress) != (progress.correct, progress.wrong)
}
