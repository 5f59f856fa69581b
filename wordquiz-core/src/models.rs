use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const PRIORITY_MIN: f32 = 0.1;
pub const PRIORITY_MAX: f32 = 1.5;
pub const PRIORITY_NEW: f32 = 1.0;
/// Per-step decay applied to older history entries, newest first.
pub const RECENCY_DECAY: f32 = 0.5;

pub const STALE_AFTER_DAYS: i64 = 30;
pub const STALE_SLOT_SHARE: f64 = 0.1;
pub const STALE_SLOT_MAX: usize = 10;

pub const MS_PER_DAY: i64 = 86_400_000;

/// One entry of a word list. Identity is the `question` text, assumed
/// unique within a list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Word {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
}

impl Word {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            reading: None,
        }
    }
}

/// User self-assessment after seeing the answer. `Unknown` only arises
/// from unrecognized values in stored history; it is never a valid input
/// to grading and weighs zero in priority math.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradeValue {
    Again,
    Hard,
    Normal,
    Easy,
    Unknown,
}

impl GradeValue {
    pub fn is_negative(self) -> bool {
        matches!(self, GradeValue::Again | GradeValue::Hard)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GradeValue::Again => "again",
            GradeValue::Hard => "hard",
            GradeValue::Normal => "normal",
            GradeValue::Easy => "easy",
            GradeValue::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GradeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Tolerant of grades written by other tools: anything unrecognized loads
// as `Unknown` instead of failing the whole progress file.
impl<'de> Deserialize<'de> for GradeValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "again" => GradeValue::Again,
            "hard" => GradeValue::Hard,
            "normal" => GradeValue::Normal,
            "easy" => GradeValue::Easy,
            _ => GradeValue::Unknown,
        })
    }
}

/// One graded attempt. `timestamp` is epoch milliseconds; history vectors
/// are append-only and therefore chronological.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AttemptRecord {
    pub timestamp: i64,
    pub grade: GradeValue,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WordProgress {
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub wrong: u32,
    #[serde(default)]
    pub history: Vec<AttemptRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl WordProgress {
    pub fn last_attempt_ms(&self) -> Option<i64> {
        self.history.last().map(|r| r.timestamp)
    }
}

/// Per-word learning progress for one word list, keyed by question text.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ProgressStore {
    words: HashMap<String, WordProgress>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&WordProgress> {
        self.words.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut WordProgress> {
        self.words.get_mut(key)
    }

    /// Lazily creates a zeroed entry; missing progress is self-healing,
    /// never an error.
    pub fn ensure(&mut self, key: &str) -> &mut WordProgress {
        self.words.entry(key.to_string()).or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.words.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<WordProgress> {
        self.words.remove(key)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WordProgress)> {
        self.words.iter()
    }
}

/// Content-derived identifier of a word list: the original tool's 32-bit
/// rolling hash over the concatenated question+answer text (UTF-16 code
/// units, wrapping arithmetic), rendered in decimal. Opaque to the core.
pub fn wordbook_hash(words: &[Word]) -> String {
    let mut h: i32 = 0;
    for w in words {
        for unit in w.question.encode_utf16().chain(w.answer.encode_utf16()) {
            h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32);
        }
    }
    h.to_string()
}

/// Registry entry for a known word list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Wordbook {
    pub hash: String,
    pub title: String,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_quota: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_quota: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_studied_ms: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Wordbook {
    pub fn new(title: impl Into<String>, hash: impl Into<String>, word_count: usize) -> Self {
        Self {
            hash: hash.into(),
            title: title.into(),
            word_count,
            new_quota: None,
            review_quota: None,
            last_studied_ms: None,
            created_at: chrono::Utc::now(),
        }
    }
}
