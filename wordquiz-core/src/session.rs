use crate::{sort_by_priority, CoreError, GradeValue, ProgressStore, Word};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionTiming {
    pub question: String,
    pub elapsed_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MostMissed {
    pub question: String,
    pub count: u32,
}

/// Emitted once when a session completes; consumed by the session
/// recorder.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub started_at_ms: i64,
    pub ended_at_ms: i64,
    pub planned_count: usize,
    pub correct_count: u32,
    /// Words still flagged wrong at the end (failed and never cleared).
    pub wrong_count: usize,
    pub slowest: Option<QuestionTiming>,
    pub most_missed: Option<MostMissed>,
}

impl SessionSummary {
    pub fn elapsed_ms(&self) -> i64 {
        self.ended_at_ms - self.started_at_ms
    }
}

/// What `grade_word` hands back: either the next question or the final
/// summary.
#[derive(Clone, Debug, PartialEq)]
pub enum GradeOutcome {
    Next(Word),
    Completed(SessionSummary),
}

/// Persisted record of a completed session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub book_hash: String,
    pub title: String,
    pub started_at_ms: i64,
    pub ended_at_ms: i64,
    pub planned_count: usize,
    pub correct_count: u32,
    pub wrong_count: usize,
}

impl SessionRecord {
    pub fn from_summary(
        book_hash: impl Into<String>,
        title: impl Into<String>,
        summary: &SessionSummary,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_hash: book_hash.into(),
            title: title.into(),
            started_at_ms: summary.started_at_ms,
            ended_at_ms: summary.ended_at_ms,
            planned_count: summary.planned_count,
            correct_count: summary.correct_count,
            wrong_count: summary.wrong_count,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.ended_at_ms - self.started_at_ms
    }

    /// Seconds per planned question, the original tool's "answer speed".
    pub fn average_answer_secs(&self) -> f64 {
        if self.planned_count == 0 {
            0.0
        } else {
            (self.duration_ms() as f64 / 1000.0) / self.planned_count as f64
        }
    }
}

/// Cursor-based traversal over a growable queue. Failing a question
/// appends it to the queue, so the session only completes once every
/// item, including requeued ones, has been graded. The completion check
/// always runs after any requeue.
pub struct QuizSession {
    phase: SessionPhase,
    queue: Vec<Word>,
    cursor: isize,
    current: Option<Word>,
    wrong_list: Vec<Word>,
    wrong_seen_order: Vec<String>,
    correct_count: u32,
    session_wrong_counts: HashMap<String, u32>,
    planned_count: usize,
    started_at_ms: i64,
    ended_at_ms: Option<i64>,
    question_timings: Vec<QuestionTiming>,
    last_question_start_ms: Option<i64>,
    summary: Option<SessionSummary>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            queue: Vec::new(),
            cursor: -1,
            current: None,
            wrong_list: Vec::new(),
            wrong_seen_order: Vec::new(),
            correct_count: 0,
            session_wrong_counts: HashMap::new(),
            planned_count: 0,
            started_at_ms: 0,
            ended_at_ms: None,
            question_timings: Vec::new(),
            last_question_start_ms: None,
            summary: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.current.as_ref()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn wrong_list(&self) -> &[Word] {
        &self.wrong_list
    }

    pub fn session_wrong_counts(&self) -> &HashMap<String, u32> {
        &self.session_wrong_counts
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// 1-based position of the current question and the queue length so
    /// far; the denominator grows as failures requeue.
    pub fn position(&self) -> (usize, usize) {
        ((self.cursor.max(0) as usize) + 1, self.queue.len())
    }

    /// Begins a session over `queue`. Returns the first question, or
    /// `None` for an empty queue (the session then completes on the
    /// spot and the summary is available immediately).
    pub fn start(
        &mut self,
        queue: Vec<Word>,
        planned_count: usize,
        now_ms: i64,
    ) -> Result<Option<Word>, CoreError> {
        if self.phase == SessionPhase::InProgress {
            return Err(CoreError::InvalidState("session already in progress"));
        }
        self.phase = SessionPhase::InProgress;
        self.queue = queue;
        self.cursor = -1;
        self.current = None;
        self.wrong_list.clear();
        self.wrong_seen_order.clear();
        self.correct_count = 0;
        self.session_wrong_counts.clear();
        self.planned_count = planned_count;
        self.started_at_ms = now_ms;
        self.ended_at_ms = None;
        self.question_timings.clear();
        self.last_question_start_ms = None;
        self.summary = None;
        Ok(self.advance(now_ms))
    }

    /// Moves to the next queue item. Returns `None` exactly when the
    /// cursor has run past the end, which transitions to `Completed` and
    /// emits the summary.
    pub fn advance(&mut self, now_ms: i64) -> Option<Word> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        self.cursor += 1;
        if self.cursor as usize >= self.queue.len() {
            self.current = None;
            self.last_question_start_ms = None;
            self.ended_at_ms = Some(now_ms);
            self.summary = Some(self.build_summary(now_ms));
            self.phase = SessionPhase::Completed;
            return None;
        }
        let word = self.queue[self.cursor as usize].clone();
        self.current = Some(word.clone());
        self.last_question_start_ms = Some(now_ms);
        Some(word)
    }

    /// Records a grade for the current question, mutating `store`:
    /// appends to the word's history, bumps its lifetime counters, and on
    /// a negative grade requeues the word at the back of the queue.
    /// Persisting `store` afterwards is the caller's job.
    pub fn grade_word(
        &mut self,
        store: &mut ProgressStore,
        grade: GradeValue,
        now_ms: i64,
    ) -> Result<GradeOutcome, CoreError> {
        if self.phase != SessionPhase::InProgress {
            return Err(CoreError::InvalidState("no session in progress"));
        }
        let word = self
            .current
            .clone()
            .ok_or(CoreError::InvalidState("no question is showing"))?;
        if grade == GradeValue::Unknown {
            return Err(CoreError::Invalid("unrecognized grade"));
        }

        if let Some(start) = self.last_question_start_ms {
            self.question_timings.push(QuestionTiming {
                question: word.question.clone(),
                elapsed_ms: now_ms - start,
            });
        }

        {
            let progress = store.ensure(&word.question);
            progress.history.push(crate::AttemptRecord {
                timestamp: now_ms,
                grade,
            });
            if grade.is_negative() {
                progress.wrong += 1;
            } else {
                progress.correct += 1;
            }
        }

        if grade.is_negative() {
            if !self.wrong_list.iter().any(|w| w.question == word.question) {
                self.wrong_list.push(word.clone());
                self.wrong_seen_order.push(word.question.clone());
            }
            self.queue.push(word.clone());
            *self
                .session_wrong_counts
                .entry(word.question.clone())
                .or_insert(0) += 1;
            // keep the outstanding-wrong list in urgency order for reporting
            self.wrong_list = sort_by_priority(&self.wrong_list, store);
        } else {
            self.correct_count += 1;
            // a later success clears the outstanding flag; the session
            // wrong count stays as a historical tally
            self.wrong_list.retain(|w| w.question != word.question);
        }

        match self.advance(now_ms) {
            Some(next) => Ok(GradeOutcome::Next(next)),
            None => {
                let summary = self
                    .summary
                    .clone()
                    .ok_or(CoreError::InvalidState("completed without a summary"))?;
                Ok(GradeOutcome::Completed(summary))
            }
        }
    }

    /// Discards the session without emitting a summary. Grades already
    /// written to the progress store stand.
    pub fn abandon(&mut self) -> Result<(), CoreError> {
        if self.phase != SessionPhase::InProgress {
            return Err(CoreError::InvalidState("no session to abandon"));
        }
        *self = Self::new();
        Ok(())
    }

    fn build_summary(&self, now_ms: i64) -> SessionSummary {
        let slowest = self
            .question_timings
            .iter()
            .max_by_key(|t| t.elapsed_ms)
            .cloned();

        // first-encountered failure wins ties
        let mut most_missed: Option<MostMissed> = None;
        for question in &self.wrong_seen_order {
            let count = self
                .session_wrong_counts
                .get(question)
                .copied()
                .unwrap_or(0);
            if count > 0 && most_missed.as_ref().map_or(true, |m| count > m.count) {
                most_missed = Some(MostMissed {
                    question: question.clone(),
                    count,
                });
            }
        }

        SessionSummary {
            started_at_ms: self.started_at_ms,
            ended_at_ms: self.ended_at_ms.unwrap_or(now_ms),
            planned_count: self.planned_count,
            correct_count: self.correct_count,
            wrong_count: self.wrong_list.len(),
            slowest,
            most_missed,
        }
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}
