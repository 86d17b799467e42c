use crate::libshuati::tiku::Question;
use log::debug;
use rand::rng;
use rand::seq::SliceRandom;
use std::time::{Duration, Instant};

/// How many questions one round draws from the bank (fewer if the bank is
/// smaller).
pub const JUAN_SIZE: usize = 10;
/// Answers submitted faster than this are treated as blind guessing.
pub const MIN_ANSWER_TIME: Duration = Duration::from_millis(2000);
/// How long a transient warning stays visible before it clears itself.
pub const WARNING_LINGER: Duration = Duration::from_secs(2);

pub const NAME_WARNING: &str = "请输入您的真实姓名以记录成绩";
pub const TOO_FAST_WARNING: &str = "做题要认真哦，不要秒选！";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Start,
    NameInput,
    Quiz,
    Finished,
}

/// One recorded answer. Option values are the texts snapshotted at the moment
/// of answering, never indices, so they stay meaningful even if the bank file
/// changes between sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAnswer {
    pub question_id: u32,
    pub question_text: String,
    pub selected_option: String,
    pub correct_option: String,
    pub is_correct: bool,
    /// Seconds, sub-second precision.
    pub time_spent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted { correct: bool, finished: bool },
    /// Rejected by the anti-guessing gate. The question timer restarts from
    /// the rejection, so the full minimum dwell applies again.
    TooFast,
}

/// The whole quiz session. Status only moves forward
/// (Start → NameInput → Quiz → Finished) except for the explicit
/// return-to-home intent; `confirm_name` resets all quiz-scoped data, so a
/// restarted session begins from a clean slate.
#[derive(Debug)]
pub struct Kaoshi {
    status: Status,
    user_name: String,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<UserAnswer>,
    warning: Option<(String, Instant)>,
    question_started: Instant,
}

impl Kaoshi {
    pub fn new() -> Kaoshi {
        Kaoshi {
            status: Status::Start,
            user_name: String::new(),
            questions: Vec::new(),
            current_index: 0,
            answers: Vec::new(),
            warning: None,
            question_started: Instant::now(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }
    pub fn user_name(&self) -> &str {
        &self.user_name
    }
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
    pub fn current_index(&self) -> usize {
        self.current_index
    }
    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    /// The question currently on screen. Valid while in `Status::Quiz`.
    pub fn current_question(&self) -> Option<&Question> {
        if self.status == Status::Quiz {
            self.questions.get(self.current_index)
        } else {
            None
        }
    }

    /// The transient warning, if it has not expired yet.
    pub fn warning(&self) -> Option<&str> {
        self.warning_at(Instant::now())
    }

    pub fn warning_at(&self, now: Instant) -> Option<&str> {
        match &self.warning {
            Some((message, expiry)) if now < *expiry => Some(message.as_str()),
            _ => None,
        }
    }

    fn raise_warning(&mut self, message: &str, now: Instant) {
        self.warning = Some((message.to_string(), now + WARNING_LINGER));
    }

    /// Start → NameInput. No data changes.
    pub fn begin(&mut self) {
        if self.status == Status::Start {
            self.status = Status::NameInput;
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.user_name = name.to_string();
    }

    /// NameInput → Quiz, guarded on a non-blank name. Draws a fresh uniform
    /// random subset of the bank and resets all per-round data. Returns false
    /// (and raises a warning) when the guard fails.
    pub fn confirm_name(&mut self, bank: &[Question]) -> bool {
        self.confirm_name_at(bank, Instant::now())
    }

    pub fn confirm_name_at(&mut self, bank: &[Question], now: Instant) -> bool {
        if self.status != Status::NameInput {
            return false;
        }
        if self.user_name.trim().is_empty() {
            self.raise_warning(NAME_WARNING, now);
            return false;
        }

        // Fisher-Yates over the whole bank, then keep the head.
        let mut shuffled = bank.to_vec();
        shuffled.shuffle(&mut rng());
        shuffled.truncate(JUAN_SIZE);
        debug!(
            "[Session] Drew {} of {} questions for {}.",
            shuffled.len(),
            bank.len(),
            self.user_name.trim()
        );

        self.questions = shuffled;
        self.current_index = 0;
        self.answers = Vec::new();
        self.warning = None;
        self.question_started = now;
        self.status = Status::Quiz;
        true
    }

    /// Handles a select-option intent. Returns `None` outside `Status::Quiz`
    /// or for an option index the current question does not have.
    pub fn select_option(&mut self, selected_idx: usize) -> Option<Outcome> {
        self.select_option_at(selected_idx, Instant::now())
    }

    pub fn select_option_at(&mut self, selected_idx: usize, now: Instant) -> Option<Outcome> {
        if self.status != Status::Quiz {
            return None;
        }
        let question = &self.questions[self.current_index];
        if selected_idx >= question.options.len() {
            return None;
        }

        let elapsed = now.duration_since(self.question_started);
        if elapsed < MIN_ANSWER_TIME {
            debug!(
                "[Session] Rejected answer after {} ms.",
                elapsed.as_millis()
            );
            self.question_started = now;
            self.raise_warning(TOO_FAST_WARNING, now);
            return Some(Outcome::TooFast);
        }

        let is_correct = selected_idx == question.correct_answer;
        self.answers.push(UserAnswer {
            question_id: question.id,
            question_text: question.text.clone(),
            selected_option: question.options[selected_idx].clone(),
            correct_option: question.options[question.correct_answer].clone(),
            is_correct,
            time_spent: elapsed.as_secs_f64(),
        });

        let finished = self.current_index + 1 == self.questions.len();
        if finished {
            self.status = Status::Finished;
            debug!("[Session] Finished with {} answers.", self.answers.len());
        } else {
            self.current_index += 1;
            self.question_started = now;
        }
        self.warning = None;
        Some(Outcome::Accepted {
            correct: is_correct,
            finished,
        })
    }

    /// Finished → Start. Answers stay around until the next `confirm_name`
    /// wipes them, so the review screen can still read them if re-rendered.
    pub fn return_home(&mut self) {
        if self.status == Status::Finished {
            self.status = Status::Start;
        }
    }
}
