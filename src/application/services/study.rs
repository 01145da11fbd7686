//! Study service
//!
//! Loads result bundles and runs quiz and flashcard sessions through a
//! [`Prompter`].

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::error_ext::{IoResultExt, JsonResultExt};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{AnswerOutcome, FlashcardDeck, ProcessedData, QuizSession, Score, TextStats};
use crate::infrastructure::traits::{FileSystem, Prompter};

/// Summary of a bundle or a plain text file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum AnalysisReport {
    Text(TextStats),
    #[serde(rename_all = "camelCase")]
    Bundle {
        word_count: usize,
        reading_time: usize,
        keywords: Vec<String>,
        questions: usize,
        mind_map_nodes: usize,
        mind_map_depth: usize,
    },
}

/// Outcome of a flashcard walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashcardSummary {
    /// Distinct cards shown
    pub seen: usize,
    /// Cards turned to their answer at least once
    pub revealed: usize,
    pub total: usize,
}

/// Service for quizzes, flashcards and text statistics.
pub struct StudyService {
    fs: Arc<dyn FileSystem>,
    prompter: Arc<dyn Prompter>,
}

impl StudyService {
    pub fn new(fs: Arc<dyn FileSystem>, prompter: Arc<dyn Prompter>) -> Self {
        Self { fs, prompter }
    }

    /// Read and post-process a result bundle.
    #[instrument(level = "debug", skip(self))]
    pub fn load_bundle(&self, path: &Path) -> ApplicationResult<ProcessedData> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read bundle", path)?;
        let mut bundle: ProcessedData = serde_json::from_str(&content).with_parse_context(path)?;
        bundle.finalize(None)?;
        debug!(questions = bundle.questions.len(), "bundle loaded");
        Ok(bundle)
    }

    /// Statistics for a `.json` bundle or any other file read as plain text.
    pub fn analyze(&self, path: &Path) -> ApplicationResult<AnalysisReport> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            let text = self
                .fs
                .read_to_string(path)
                .with_path_context("read text", path)?;
            return Ok(AnalysisReport::Text(TextStats::from_text(&text)));
        }

        let bundle = self.load_bundle(path)?;
        let mind_map = bundle.mind_map()?;
        Ok(AnalysisReport::Bundle {
            word_count: bundle.analysis.word_count,
            reading_time: bundle.analysis.reading_time,
            keywords: bundle.analysis.keywords.clone(),
            questions: bundle.questions.len(),
            mind_map_nodes: mind_map.node_count(),
            mind_map_depth: mind_map.depth(),
        })
    }

    /// Ask every question once; stops early at end of input.
    #[instrument(level = "debug", skip_all)]
    pub fn run_quiz(&self, bundle: &ProcessedData) -> ApplicationResult<Score> {
        let mut quiz = QuizSession::new(bundle.questions.clone());
        let total = bundle.questions.len();

        if total == 0 {
            self.prompter.show("No questions available.");
            return Ok(quiz.score());
        }

        'questions: for (n, question) in bundle.questions.iter().enumerate() {
            self.prompter.show(&format!(
                "\nQuestion {}/{} ({}): {}",
                n + 1,
                total,
                question.kind,
                question.question
            ));
            let choices = question.choices();
            for (i, choice) in choices.iter().enumerate() {
                self.prompter.show(&format!("  {}. {}", i + 1, choice));
            }

            loop {
                let Some(input) = self.ask("Your answer:")? else {
                    break 'questions;
                };
                let Some(answer) = resolve_answer(&choices, &input) else {
                    self.prompter.show(&format!(
                        "Enter a number between 1 and {} or the option text.",
                        choices.len()
                    ));
                    continue;
                };

                match quiz.answer(question.id, &answer)? {
                    AnswerOutcome::Correct => self.prompter.show("Correct!"),
                    AnswerOutcome::Incorrect { expected } => self
                        .prompter
                        .show(&format!("Incorrect. The answer is: {expected}")),
                    AnswerOutcome::AlreadyAnswered => {}
                }
                break;
            }
        }

        let score = quiz.score();
        self.prompter.show(&format!("\nScore: {score}"));
        Ok(score)
    }

    /// Walk the deck: Enter or `f` flips, `n`/`p` move, `q` quits.
    #[instrument(level = "debug", skip_all)]
    pub fn run_flashcards(&self, bundle: &ProcessedData) -> ApplicationResult<FlashcardSummary> {
        let mut deck = FlashcardDeck::new(&bundle.questions);
        let mut seen = HashSet::new();
        let mut revealed = HashSet::new();

        if deck.is_empty() {
            self.prompter
                .show("No questions available to generate flashcards.");
            return Ok(FlashcardSummary {
                seen: 0,
                revealed: 0,
                total: 0,
            });
        }

        loop {
            let Some(card) = deck.current() else { break };
            seen.insert(deck.position());
            let face = if deck.is_flipped() {
                revealed.insert(deck.position());
                format!("Answer: {}", card.back)
            } else {
                card.front.clone()
            };
            self.prompter
                .show(&format!("\n[{}/{}] {}", deck.position(), deck.len(), face));

            let Some(input) = self.ask("[Enter] flip  [n]ext  [p]revious  [q]uit:")? else {
                break;
            };
            match input.trim().to_ascii_lowercase().as_str() {
                "" | "f" => deck.flip(),
                "n" => deck.next(),
                "p" => deck.previous(),
                "q" => break,
                other => self.prompter.show(&format!("Unknown command: {other}")),
            }
        }

        Ok(FlashcardSummary {
            seen: seen.len(),
            revealed: revealed.len(),
            total: deck.len(),
        })
    }

    fn ask(&self, prompt: &str) -> ApplicationResult<Option<String>> {
        self.prompter
            .ask(prompt)
            .map_err(|e| ApplicationError::OperationFailed {
                context: "read answer".to_string(),
                source: Box::new(e),
            })
    }
}

/// Map learner input to an option: a 1-based number or the option text,
/// case-insensitive. Free text is accepted when there are no options.
pub fn resolve_answer(choices: &[String], input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if choices.is_empty() {
        return Some(input.to_string());
    }
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| choices.get(i)).cloned();
    }
    choices
        .iter()
        .find(|choice| choice.trim().eq_ignore_ascii_case(input))
        .cloned()
}
