use crate::quiz::{Question, QuizPayload};

pub const CORRECT_FEEDBACK: &str = "Correct!";

/// Where a session currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Question `index` is shown and nothing has been chosen yet
    Answering { index: usize },
    /// An option was chosen for question `index`; the choice is final
    Revealed {
        index: usize,
        selected: String,
        correct: bool,
    },
    Complete,
}

/// How a single option should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionClass {
    Neutral,
    Correct,
    Incorrect,
}

/// An in-progress quiz over a fixed question list.
///
/// Created fresh for every payload. There is no way back once a question is
/// answered, and `Complete` is terminal.
#[derive(Debug, Clone)]
pub struct QuizSession {
    payload: QuizPayload,
    phase: Phase,
    score: usize,
}

impl QuizSession {
    pub fn new(payload: QuizPayload) -> Self {
        Self {
            payload,
            phase: Phase::Answering { index: 0 },
            score: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.payload.len()
    }

    pub fn questions(&self) -> &[Question] {
        self.payload.questions()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Index of the question on screen, `None` once complete
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Answering { index } | Phase::Revealed { index, .. } => Some(index),
            Phase::Complete => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().map(|i| &self.payload.questions()[i])
    }

    pub fn selected_option(&self) -> Option<&str> {
        match &self.phase {
            Phase::Revealed { selected, .. } => Some(selected),
            _ => None,
        }
    }

    /// Options accept a choice only while nothing has been chosen
    pub fn options_enabled(&self) -> bool {
        matches!(self.phase, Phase::Answering { .. })
    }

    /// Choose `option` for the current question.
    ///
    /// Only the first choice per question counts; later calls return `false`
    /// and change nothing.
    pub fn select_option(&mut self, option: &str) -> bool {
        let Phase::Answering { index } = self.phase else {
            return false;
        };

        let correct = self.payload.questions()[index].is_correct(option);
        if correct {
            self.score += 1;
        }
        self.phase = Phase::Revealed {
            index,
            selected: option.to_string(),
            correct,
        };
        true
    }

    /// Choose by position in the current option list. Out of range is a no-op.
    pub fn select_index(&mut self, position: usize) -> bool {
        let Some(option) = self
            .current_question()
            .and_then(|q| q.options.get(position))
            .cloned()
        else {
            return false;
        };
        self.select_option(&option)
    }

    /// Move past a revealed question. Does nothing unless an option was chosen.
    pub fn advance(&mut self) -> bool {
        let Phase::Revealed { index, .. } = self.phase else {
            return false;
        };

        self.phase = if index + 1 < self.total() {
            Phase::Answering { index: index + 1 }
        } else {
            Phase::Complete
        };
        true
    }

    /// Feedback for the revealed question
    pub fn feedback(&self) -> Option<String> {
        match &self.phase {
            Phase::Revealed { correct: true, .. } => Some(CORRECT_FEEDBACK.to_string()),
            Phase::Revealed { index, .. } => Some(format!(
                "Wrong. The correct answer was: {}",
                self.payload.questions()[*index].answer
            )),
            _ => None,
        }
    }

    pub fn option_class(&self, option: &str) -> OptionClass {
        match &self.phase {
            Phase::Revealed {
                index, selected, ..
            } => {
                if self.payload.questions()[*index].is_correct(option) {
                    OptionClass::Correct
                } else if selected == option {
                    OptionClass::Incorrect
                } else {
                    OptionClass::Neutral
                }
            }
            _ => OptionClass::Neutral,
        }
    }

    /// "Question 2 / 5" style label, `None` once complete
    pub fn progress_label(&self) -> Option<String> {
        self.current_index()
            .map(|i| format!("Question {} / {}", i + 1, self.total()))
    }

    pub fn summary(&self) -> String {
        format!("You scored {} out of {}", self.score, self.total())
    }
}
