use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Fewest options a question may carry and still be answerable
pub const MIN_OPTIONS: usize = 2;

/// A single multiple-choice question as produced by the generation service.
///
/// `answer` is trusted to equal one of `options`; it is never checked locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default)]
    pub difficulty: String,
}

impl Question {
    pub fn is_correct(&self, option: &str) -> bool {
        self.answer == option
    }
}

/// The ordered question list handed over by the service. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizPayload {
    questions: Vec<Question>,
}

impl QuizPayload {
    /// Builds a payload, refusing shapes a session cannot run: no questions at
    /// all, or a question with fewer than [`MIN_OPTIONS`] options.
    pub fn new(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() || questions.iter().any(|q| q.options.len() < MIN_OPTIONS) {
            return None;
        }
        Some(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// How many questions to ask the service for
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum QuestionCount {
    #[default]
    #[value(name = "5")]
    #[strum(serialize = "5")]
    Five,
    #[value(name = "10")]
    #[strum(serialize = "10")]
    Ten,
    #[value(name = "15")]
    #[strum(serialize = "15")]
    Fifteen,
}

impl QuestionCount {
    pub const ALL: [QuestionCount; 3] = [Self::Five, Self::Ten, Self::Fifteen];

    pub fn get(self) -> u32 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Fifteen => 15,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Five => Self::Ten,
            Self::Ten => Self::Fifteen,
            Self::Fifteen => Self::Five,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Five => Self::Fifteen,
            Self::Ten => Self::Five,
            Self::Fifteen => Self::Ten,
        }
    }
}

impl From<QuestionCount> for u32 {
    fn from(count: QuestionCount) -> Self {
        count.get()
    }
}

impl TryFrom<u32> for QuestionCount {
    type Error = String;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            15 => Ok(Self::Fifteen),
            other => Err(format!("unsupported question count {other}, expected 5, 10 or 15")),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_question(n: usize) -> Question {
    Question {
        question: format!("Question number {n}?"),
        options: vec![
            format!("right {n}"),
            format!("wrong {n}a"),
            format!("wrong {n}b"),
            format!("wrong {n}c"),
        ],
        answer: format!("right {n}"),
        difficulty: "Easy".to_string(),
    }
}

#[cfg(test)]
pub(crate) fn sample_payload(n: usize) -> QuizPayload {
    QuizPayload::new((1..=n).map(sample_question).collect()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_deserializes_from_service_shape() {
        let q: Question = serde_json::from_str(
            r#"{"question":"2+2?","options":["3","4"],"answer":"4","difficulty":"Easy"}"#,
        )
        .unwrap();
        assert_eq!(q.options.len(), 2);
        assert!(q.is_correct("4"));
        assert!(!q.is_correct("3"));
    }

    #[test]
    fn missing_difficulty_defaults_to_empty_label() {
        let q: Question =
            serde_json::from_str(r#"{"question":"q","options":["a","b"],"answer":"a"}"#).unwrap();
        assert_eq!(q.difficulty, "");
    }

    #[test]
    fn payload_rejects_zero_questions() {
        assert!(QuizPayload::new(vec![]).is_none());
    }

    #[test]
    fn payload_rejects_single_option_question() {
        let mut q = sample_question(1);
        q.options.truncate(1);
        assert!(QuizPayload::new(vec![sample_question(2), q]).is_none());
    }

    #[test]
    fn payload_keeps_order() {
        let payload = sample_payload(3);
        assert_eq!(payload.len(), 3);
        assert_eq!(payload.questions()[2].question, "Question number 3?");
    }

    #[test]
    fn question_count_cycles_both_ways() {
        assert_eq!(QuestionCount::Five.next(), QuestionCount::Ten);
        assert_eq!(QuestionCount::Fifteen.next(), QuestionCount::Five);
        assert_eq!(QuestionCount::Five.prev(), QuestionCount::Fifteen);
        for c in QuestionCount::ALL {
            assert_eq!(c.next().prev(), c);
        }
    }

    #[test]
    fn question_count_wire_values() {
        assert_eq!(QuestionCount::Ten.get(), 10);
        assert_eq!(QuestionCount::Fifteen.to_string(), "15");
        assert_eq!(serde_json::to_string(&QuestionCount::Ten).unwrap(), "10");
        assert_eq!(
            serde_json::from_str::<QuestionCount>("15").unwrap(),
            QuestionCount::Fifteen
        );
        assert!(serde_json::from_str::<QuestionCount>("7").is_err());
    }
}
