//! Server-side quiz engine
//!
//! The quiz bank lives in memory and attempts are graded here. Each attempt
//! is a small state machine (`NotStarted → InProgress → Completed`) driven
//! either by participant requests or by the countdown timer; `Completed` is
//! terminal, so a fresh attempt is always a new instance.

use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Score percentage required to pass and earn a certificate
pub const PASS_THRESHOLD: u32 = 70;

/// A single multiple-choice question
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

/// A quiz definition with an ordered question list and a time limit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    /// Countdown budget for one attempt, in minutes
    pub time_limit: u64,
}

/// The built-in quiz bank
pub fn quiz_bank() -> Vec<Quiz> {
    vec![Quiz {
        id: "web-dev-quiz".to_string(),
        title: "Web Development Quiz".to_string(),
        description: "Test your knowledge of HTML, CSS, and JavaScript".to_string(),
        questions: vec![
            Question {
                question_text: "What does HTML stand for?".to_string(),
                options: vec![
                    "Hyper Text Markup Language".to_string(),
                    "High Tech Modern Language".to_string(),
                    "Hyper Transfer Markup Language".to_string(),
                    "Home Tool Markup Language".to_string(),
                ],
                correct_answer: 0,
            },
            Question {
                question_text: "Which CSS property is used to change the text color?"
                    .to_string(),
                options: vec![
                    "text-color".to_string(),
                    "font-color".to_string(),
                    "color".to_string(),
                    "text-style".to_string(),
                ],
                correct_answer: 2,
            },
            Question {
                question_text: "Which of the following is a JavaScript framework?".to_string(),
                options: vec![
                    "React".to_string(),
                    "Laravel".to_string(),
                    "Django".to_string(),
                    "Flask".to_string(),
                ],
                correct_answer: 0,
            },
        ],
        time_limit: 5,
    }]
}

/// Lifecycle of a quiz attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptState {
    NotStarted,
    InProgress,
    Completed,
}

/// Result of grading an attempt
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: usize,
    pub total_questions: usize,
    pub percentage: u32,
    pub passed: bool,
    pub certificate_eligible: bool,
}

/// One attempt at a quiz
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    quiz: Quiz,
    answers: Vec<Option<usize>>,
    remaining_seconds: u64,
    state: AttemptState,
    result: Option<QuizResult>,
}

impl QuizAttempt {
    /// Create a fresh attempt for the given quiz
    pub fn new(quiz: Quiz) -> Self {
        let answers = vec![None; quiz.questions.len()];
        let remaining_seconds = quiz.time_limit * 60;

        Self {
            quiz,
            answers,
            remaining_seconds,
            state: AttemptState::NotStarted,
            result: None,
        }
    }

    /// Start the countdown and accept answers
    pub fn begin(&mut self) -> ApiResult<()> {
        if self.state != AttemptState::NotStarted {
            return Err(ApiError::InvalidInput(
                "Quiz attempt has already started".to_string(),
            ));
        }

        self.state = AttemptState::InProgress;
        Ok(())
    }

    /// Record or overwrite the answer to one question
    pub fn answer(&mut self, question: usize, choice: usize) -> ApiResult<()> {
        if self.state != AttemptState::InProgress {
            return Err(ApiError::InvalidInput(
                "Quiz attempt is not in progress".to_string(),
            ));
        }

        let Some(slot) = self.answers.get_mut(question) else {
            return Err(ApiError::InvalidInput(format!(
                "Question {} does not exist",
                question
            )));
        };

        if choice >= self.quiz.questions[question].options.len() {
            return Err(ApiError::InvalidInput(format!(
                "Option {} does not exist",
                choice
            )));
        }

        *slot = Some(choice);
        Ok(())
    }

    /// Grade the attempt and complete it
    pub fn submit(&mut self) -> ApiResult<QuizResult> {
        if self.state != AttemptState::InProgress {
            return Err(ApiError::InvalidInput(
                "Quiz attempt is not in progress".to_string(),
            ));
        }

        Ok(self.complete())
    }

    /// Advance the countdown by one second
    ///
    /// On reaching zero the current answers are submitted as-is; this is a
    /// state transition, not an error. Returns the result when the tick
    /// completed the attempt.
    pub fn tick(&mut self) -> Option<QuizResult> {
        if self.state != AttemptState::InProgress {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            return Some(self.complete());
        }

        None
    }

    fn complete(&mut self) -> QuizResult {
        let score = self
            .quiz
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(question, answer)| **answer == Some(question.correct_answer))
            .count();

        let total_questions = self.quiz.questions.len();
        let percentage = if total_questions == 0 {
            0
        } else {
            (100.0 * score as f64 / total_questions as f64).round() as u32
        };
        let passed = percentage >= PASS_THRESHOLD;

        let result = QuizResult {
            score,
            total_questions,
            percentage,
            passed,
            certificate_eligible: passed,
        };

        self.state = AttemptState::Completed;
        self.result = Some(result);
        result
    }

    /// ID of the quiz under attempt
    pub fn quiz_id(&self) -> &str {
        &self.quiz.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Seconds left on the countdown
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    /// Graded result, present once the attempt is completed
    pub fn result(&self) -> Option<QuizResult> {
        self.result
    }
}

/// An attempt together with the countdown task driving it
struct ActiveAttempt {
    attempt: Arc<Mutex<QuizAttempt>>,
    timer: JoinHandle<()>,
}

/// Manages at most one active quiz attempt per user
///
/// Attempts are not durable state; restarting the service forgets them.
#[derive(Clone)]
pub struct QuizService {
    quizzes: Arc<Vec<Quiz>>,
    attempts: Arc<Mutex<HashMap<Uuid, ActiveAttempt>>>,
    tick_period: Duration,
}

impl QuizService {
    /// Create a quiz service over the built-in bank with a one-second tick
    pub fn new() -> Self {
        Self::with_quizzes(quiz_bank(), Duration::from_secs(1))
    }

    /// Create a quiz service over a custom bank and tick period
    pub fn with_quizzes(quizzes: Vec<Quiz>, tick_period: Duration) -> Self {
        Self {
            quizzes: Arc::new(quizzes),
            attempts: Arc::new(Mutex::new(HashMap::new())),
            tick_period,
        }
    }

    /// The quiz bank
    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    /// Start a new attempt for a user, replacing any previous one
    ///
    /// The previous attempt's timer is stopped first so a single timer
    /// drives the state.
    pub async fn start(&self, user_id: Uuid, quiz_id: &str) -> ApiResult<(String, u64, usize)> {
        let quiz = self
            .quizzes
            .iter()
            .find(|quiz| quiz.id == quiz_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;

        let title = quiz.title.clone();
        let total_questions = quiz.questions.len();

        let mut attempt = QuizAttempt::new(quiz);
        attempt.begin()?;
        let remaining_seconds = attempt.remaining_seconds();

        let attempt = Arc::new(Mutex::new(attempt));
        let timer = self.spawn_countdown(attempt.clone());

        let mut attempts = self.attempts.lock().await;
        if let Some(previous) = attempts.insert(user_id, ActiveAttempt { attempt, timer }) {
            previous.timer.abort();
        }

        info!("User {} started quiz {}", user_id, quiz_id);
        Ok((title, remaining_seconds, total_questions))
    }

    /// Record an answer on the user's active attempt
    pub async fn answer(
        &self,
        user_id: Uuid,
        quiz_id: &str,
        question: usize,
        choice: usize,
    ) -> ApiResult<u64> {
        let attempts = self.attempts.lock().await;
        let active = attempts
            .get(&user_id)
            .ok_or_else(|| ApiError::NotFound("No active quiz attempt".to_string()))?;

        let mut attempt = active.attempt.lock().await;
        if attempt.quiz_id() != quiz_id {
            return Err(ApiError::NotFound(
                "No active attempt for this quiz".to_string(),
            ));
        }

        attempt.answer(question, choice)?;
        Ok(attempt.remaining_seconds())
    }

    /// Submit the user's active attempt and return the graded result
    ///
    /// When the countdown already completed the attempt, the auto-submitted
    /// result is returned instead of an error.
    pub async fn submit(&self, user_id: Uuid, quiz_id: &str) -> ApiResult<QuizResult> {
        let mut attempts = self.attempts.lock().await;
        let Entry::Occupied(entry) = attempts.entry(user_id) else {
            return Err(ApiError::NotFound("No active quiz attempt".to_string()));
        };

        let matches_quiz = entry.get().attempt.lock().await.quiz_id() == quiz_id;
        if !matches_quiz {
            return Err(ApiError::NotFound(
                "No active attempt for this quiz".to_string(),
            ));
        }

        let active = entry.remove();
        drop(attempts);

        active.timer.abort();

        let mut attempt = active.attempt.lock().await;
        match attempt.state() {
            AttemptState::InProgress => attempt.submit(),
            AttemptState::Completed => attempt.result().ok_or(ApiError::InternalServerError),
            AttemptState::NotStarted => Err(ApiError::InvalidInput(
                "Quiz attempt has not started".to_string(),
            )),
        }
    }

    fn spawn_countdown(&self, attempt: Arc<Mutex<QuizAttempt>>) -> JoinHandle<()> {
        let period = self.tick_period;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // the first tick of a tokio interval completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;

                let mut attempt = attempt.lock().await;
                match attempt.tick() {
                    Some(result) => {
                        info!(
                            "Quiz attempt auto-submitted on timeout: {}/{} correct",
                            result.score, result.total_questions
                        );
                        break;
                    }
                    None if attempt.state() != AttemptState::InProgress => break,
                    None => {}
                }
            }
        })
    }
}

impl Default for QuizService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_dev_attempt() -> QuizAttempt {
        let mut attempt = QuizAttempt::new(quiz_bank().remove(0));
        attempt.begin().unwrap();
        attempt
    }

    #[test]
    fn test_partial_score_below_threshold() {
        let mut attempt = web_dev_attempt();
        attempt.answer(0, 0).unwrap();
        attempt.answer(1, 2).unwrap();
        attempt.answer(2, 1).unwrap();

        let result = attempt.submit().unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.percentage, 67);
        assert!(!result.passed);
        assert!(!result.certificate_eligible);
    }

    #[test]
    fn test_all_correct_earns_certificate() {
        let mut attempt = web_dev_attempt();
        attempt.answer(0, 0).unwrap();
        attempt.answer(1, 2).unwrap();
        attempt.answer(2, 0).unwrap();

        let result = attempt.submit().unwrap();
        assert_eq!(result.score, 3);
        assert_eq!(result.percentage, 100);
        assert!(result.passed);
        assert!(result.certificate_eligible);
    }

    #[test]
    fn test_unanswered_question_counts_as_wrong() {
        let mut attempt = web_dev_attempt();
        attempt.answer(0, 0).unwrap();
        attempt.answer(1, 2).unwrap();

        let result = attempt.submit().unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.percentage, 67);
        assert!(!result.certificate_eligible);
    }

    #[test]
    fn test_answers_can_be_changed_while_in_progress() {
        let mut attempt = web_dev_attempt();
        attempt.answer(0, 3).unwrap();
        attempt.answer(0, 0).unwrap();

        let result = attempt.submit().unwrap();
        assert_eq!(result.score, 1);
    }

    #[test]
    fn test_out_of_range_answers_are_rejected() {
        let mut attempt = web_dev_attempt();
        assert!(attempt.answer(3, 0).is_err());
        assert!(attempt.answer(0, 4).is_err());
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut attempt = web_dev_attempt();
        attempt.answer(0, 0).unwrap();
        attempt.submit().unwrap();

        assert_eq!(attempt.state(), AttemptState::Completed);
        assert!(attempt.answer(1, 2).is_err());
        assert!(attempt.submit().is_err());
        assert!(attempt.begin().is_err());
    }

    #[test]
    fn test_answering_before_begin_is_rejected() {
        let mut attempt = QuizAttempt::new(quiz_bank().remove(0));
        assert!(attempt.answer(0, 0).is_err());
    }

    #[test]
    fn test_countdown_expiry_auto_submits() {
        let mut attempt = web_dev_attempt();
        attempt.answer(0, 0).unwrap();
        attempt.answer(1, 2).unwrap();

        let limit = attempt.remaining_seconds();
        let mut completed = None;
        for _ in 0..limit {
            completed = attempt.tick();
            if completed.is_some() {
                break;
            }
        }

        let result = completed.expect("countdown should auto-submit at zero");
        assert_eq!(attempt.state(), AttemptState::Completed);
        assert_eq!(result.score, 2);
        assert_eq!(result.percentage, 67);
        assert!(!result.certificate_eligible);

        // a tick after completion changes nothing
        assert!(attempt.tick().is_none());
    }

    fn short_quiz() -> Quiz {
        Quiz {
            id: "short".to_string(),
            title: "Short Quiz".to_string(),
            description: "One question".to_string(),
            questions: vec![Question {
                question_text: "Pick the first option".to_string(),
                options: vec!["first".to_string(), "second".to_string()],
                correct_answer: 0,
            }],
            time_limit: 1,
        }
    }

    #[tokio::test]
    async fn test_service_grades_active_attempt() {
        let service = QuizService::with_quizzes(vec![short_quiz()], Duration::from_secs(1));
        let user_id = Uuid::new_v4();

        let (title, remaining, total) = service.start(user_id, "short").await.unwrap();
        assert_eq!(title, "Short Quiz");
        assert_eq!(remaining, 60);
        assert_eq!(total, 1);

        service.answer(user_id, "short", 0, 0).await.unwrap();
        let result = service.submit(user_id, "short").await.unwrap();
        assert_eq!(result.score, 1);
        assert!(result.certificate_eligible);

        // the attempt is gone once submitted
        assert!(service.submit(user_id, "short").await.is_err());
    }

    #[tokio::test]
    async fn test_service_rejects_unknown_quiz_and_missing_attempt() {
        let service = QuizService::with_quizzes(vec![short_quiz()], Duration::from_secs(1));
        let user_id = Uuid::new_v4();

        assert!(service.start(user_id, "nope").await.is_err());
        assert!(service.answer(user_id, "short", 0, 0).await.is_err());
        assert!(service.submit(user_id, "short").await.is_err());
    }

    #[tokio::test]
    async fn test_quiz_id_must_match_the_active_attempt() {
        let service = QuizService::with_quizzes(vec![short_quiz()], Duration::from_secs(1));
        let user_id = Uuid::new_v4();

        service.start(user_id, "short").await.unwrap();
        assert!(service.answer(user_id, "other", 0, 0).await.is_err());
        assert!(service.submit(user_id, "other").await.is_err());

        // the mismatching submit must not consume the attempt
        service.answer(user_id, "short", 0, 0).await.unwrap();
        let result = service.submit(user_id, "short").await.unwrap();
        assert_eq!(result.score, 1);
    }

    #[tokio::test]
    async fn test_starting_again_replaces_the_attempt() {
        let service = QuizService::with_quizzes(vec![short_quiz()], Duration::from_secs(1));
        let user_id = Uuid::new_v4();

        service.start(user_id, "short").await.unwrap();
        service.answer(user_id, "short", 0, 0).await.unwrap();

        // a fresh attempt is a new instance with cleared answers
        service.start(user_id, "short").await.unwrap();
        let result = service.submit(user_id, "short").await.unwrap();
        assert_eq!(result.score, 0);
    }

    #[tokio::test]
    async fn test_timer_expiry_auto_submits_through_service() {
        let service = QuizService::with_quizzes(vec![short_quiz()], Duration::from_millis(1));
        let user_id = Uuid::new_v4();

        service.start(user_id, "short").await.unwrap();
        service.answer(user_id, "short", 0, 0).await.unwrap();

        // 60 one-millisecond ticks drain the one-minute budget
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(service.answer(user_id, "short", 0, 1).await.is_err());
        let result = service.submit(user_id, "short").await.unwrap();
        assert_eq!(result.score, 1);
        assert!(result.certificate_eligible);
    }
}
