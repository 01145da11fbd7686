//! Domain entities: result bundle, quiz and flashcard state

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::mind_map::TreeNode;

/// Reading speed used for reading-time estimates.
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "Multiple Choice")]
    MultipleChoice,
    #[serde(rename = "True/False")]
    TrueFalse,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "Multiple Choice"),
            QuestionType::TrueFalse => write!(f, "True/False"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Assigned by [`ProcessedData::finalize`]; the provider may omit it
    #[serde(default)]
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub answer: String,
}

impl Question {
    /// Options offered to the learner.
    ///
    /// True/false questions without explicit options offer `True` and `False`.
    pub fn choices(&self) -> Vec<String> {
        match (&self.options, self.kind) {
            (Some(options), _) if !options.is_empty() => options.clone(),
            (_, QuestionType::TrueFalse) => vec!["True".to_string(), "False".to_string()],
            _ => Vec::new(),
        }
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        self.answer.trim().eq_ignore_ascii_case(answer.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(default)]
    pub word_count: usize,
    /// Minutes
    #[serde(default)]
    pub reading_time: usize,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Result bundle produced for one processed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub mind_map: Option<TreeNode>,
    #[serde(default)]
    pub analysis: Analysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ProcessedData {
    /// Client-side post-processing of a freshly received bundle.
    ///
    /// Renumbers questions 1..n, cleans the mind map and, given the source
    /// text, recomputes word count and reading time.
    pub fn finalize(&mut self, source_text: Option<&str>) -> Result<(), DomainError> {
        let mind_map = self.mind_map.as_ref().ok_or(DomainError::MissingRoot)?;
        self.mind_map = Some(mind_map.cleaned());

        for (question, id) in self.questions.iter_mut().zip(1..) {
            question.id = id;
        }

        if let Some(text) = source_text {
            let stats = TextStats::from_text(text);
            self.analysis.word_count = stats.word_count;
            self.analysis.reading_time = stats.reading_time;
        }
        Ok(())
    }

    pub fn mind_map(&self) -> Result<&TreeNode, DomainError> {
        self.mind_map.as_ref().ok_or(DomainError::MissingRoot)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub word_count: usize,
    pub reading_time: usize,
}

impl TextStats {
    pub fn from_text(text: &str) -> Self {
        let word_count = text.split_whitespace().count();
        Self {
            word_count,
            reading_time: word_count.div_ceil(WORDS_PER_MINUTE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect { expected: String },
    /// The question was answered before; the first answer stands.
    AlreadyAnswered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: usize,
    pub answered: usize,
    pub total: usize,
}

impl Score {
    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.correct, self.answered)
    }
}

/// Quiz over a fixed question set. Each question accepts one answer.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: BTreeMap<u32, String>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            answers: BTreeMap::new(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answer(&mut self, question_id: u32, answer: &str) -> Result<AnswerOutcome, DomainError> {
        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or(DomainError::QuestionNotFound(question_id))?;

        if self.answers.contains_key(&question_id) {
            return Ok(AnswerOutcome::AlreadyAnswered);
        }

        let outcome = if question.is_correct(answer) {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect {
                expected: question.answer.clone(),
            }
        };
        self.answers.insert(question_id, answer.to_string());
        Ok(outcome)
    }

    pub fn given_answer(&self, question_id: u32) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn score(&self) -> Score {
        let correct = self
            .questions
            .iter()
            .filter(|q| self.answers.get(&q.id).is_some_and(|a| q.is_correct(a)))
            .count();
        Score {
            correct,
            answered: self.answers.len(),
            total: self.questions.len(),
        }
    }

    pub fn reset(&mut self) {
        self.answers.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

impl From<&Question> for Flashcard {
    fn from(q: &Question) -> Self {
        Self {
            front: q.question.clone(),
            back: q.answer.clone(),
        }
    }
}

/// Cyclic deck of question/answer cards.
#[derive(Debug, Clone, Default)]
pub struct FlashcardDeck {
    cards: Vec<Flashcard>,
    index: usize,
    flipped: bool,
}

impl FlashcardDeck {
    pub fn new(questions: &[Question]) -> Self {
        Self {
            cards: questions.iter().map(Flashcard::from).collect(),
            index: 0,
            flipped: false,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.index)
    }

    /// 1-based position of the current card.
    pub fn position(&self) -> usize {
        self.index + 1
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn next(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.flipped = false;
        self.index = (self.index + 1) % self.cards.len();
    }

    pub fn previous(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.flipped = false;
        self.index = (self.index + self.cards.len() - 1) % self.cards.len();
    }
}
