use chrono::{DateTime, Utc};

/// One completed question/answer exchange. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// Answer delivered by the question endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub asked_at: DateTime<Utc>,
}

/// Follow-up question state for one document: input box, the outstanding
/// question (at most one), and the append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QaSession {
    input: String,
    pending: Option<String>,
    history: Vec<QaRecord>,
    last_error: Option<String>,
}

impl QaSession {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: String) {
        self.input = input;
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn history(&self) -> &[QaRecord] {
        &self.history
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Marks the trimmed input as outstanding. Returns `None` when the input is
    /// blank or another question is still outstanding.
    pub(crate) fn begin(&mut self) -> Option<String> {
        if self.pending.is_some() {
            return None;
        }
        let question = self.input.trim();
        if question.is_empty() {
            return None;
        }
        let question = question.to_string();
        self.pending = Some(question.clone());
        self.last_error = None;
        Some(question)
    }

    /// Appends the outstanding question with its answer and clears the input.
    pub(crate) fn complete(&mut self, answer: Answer) -> bool {
        let Some(question) = self.pending.take() else {
            return false;
        };
        self.history.push(QaRecord {
            question,
            answer: answer.text,
            asked_at: answer.asked_at,
        });
        self.input.clear();
        true
    }

    /// Drops the outstanding question; the input stays for a retry.
    pub(crate) fn fail(&mut self, message: String) -> bool {
        if self.pending.take().is_none() {
            return false;
        }
        self.last_error = Some(message);
        true
    }
}
