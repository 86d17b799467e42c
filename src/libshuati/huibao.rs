use crate::libshuati::chengjidan;
use crate::libshuati::kaoshi::UserAnswer;
use chrono::{SecondsFormat, Utc};
use log::{error, info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

/// Sentinel left in unconfigured webhook URLs. Matching it (or an empty URL)
/// means reporting is off, which is not an error.
pub const URL_PLACEHOLDER: &str = "your-webhook-link";

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Sending,
    Success,
    Error,
}

/// Wire format of the webhook body. Field names follow the receiving side's
/// camelCase contract.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub student_name: String,
    pub score: u32,
    pub timestamp: String,
    pub details: Vec<Detail>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    /// 1-based position in the round.
    pub index: usize,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    /// Formatted as "2.50s".
    pub time_spent: String,
}

impl Payload {
    pub fn build(user_name: &str, answers: &[UserAnswer]) -> Payload {
        Payload {
            student_name: user_name.to_string(),
            score: chengjidan::score(answers),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            details: answers
                .iter()
                .enumerate()
                .map(|(idx, answer)| Detail {
                    index: idx + 1,
                    question: answer.question_text.clone(),
                    user_answer: answer.selected_option.clone(),
                    correct_answer: answer.correct_option.clone(),
                    is_correct: answer.is_correct,
                    time_spent: format!("{:.2}s", answer.time_spent),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Error)]
enum DeliveryError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook responded with {0}")]
    Rejected(reqwest::StatusCode),
}

pub fn configured(url: &str) -> bool {
    !url.trim().is_empty() && !url.contains(URL_PLACEHOLDER)
}

/// Fire-and-forget result delivery. `send` hands the payload to a detached
/// thread and returns immediately; the caller polls `status` while rendering.
/// At most one report goes out per round, and nothing ever cancels or retries
/// it.
#[derive(Debug)]
pub struct Huibao {
    url: String,
    status: Arc<Mutex<Status>>,
    handle: Option<JoinHandle<()>>,
}

impl Huibao {
    pub fn new(url: impl Into<String>) -> Huibao {
        Huibao {
            url: url.into(),
            status: Arc::new(Mutex::new(Status::Idle)),
            handle: None,
        }
    }

    pub fn status(&self) -> Status {
        *self.status.lock().unwrap()
    }

    pub fn send(&mut self, payload: Payload) {
        if !configured(&self.url) {
            warn!("[Report] Webhook not configured, skipping delivery.");
            return;
        }
        *self.status.lock().unwrap() = Status::Sending;

        let url = self.url.clone();
        let status = Arc::clone(&self.status);
        self.handle = Some(std::thread::spawn(move || {
            let outcome = match deliver(&url, &payload) {
                Ok(()) => {
                    info!(
                        "[Report] Delivered score {} for {}.",
                        payload.score, payload.student_name
                    );
                    Status::Success
                }
                Err(err) => {
                    error!("[Report] Delivery failed: {}", err);
                    Status::Error
                }
            };
            *status.lock().unwrap() = outcome;
        }));
    }

    /// Blocks until an in-flight delivery settles. Called before process exit
    /// so the report thread is not killed mid-request, and by tests.
    pub fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Back to `Idle` for the next round. Waits out any in-flight delivery
    /// first.
    pub fn reset(&mut self) {
        self.wait();
        *self.status.lock().unwrap() = Status::Idle;
    }
}

fn deliver(url: &str, payload: &Payload) -> Result<(), DeliveryError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(DELIVERY_TIMEOUT)
        .build()?;
    let response = client.post(url).json(payload).send()?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(DeliveryError::Rejected(response.status()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn answers() -> Vec<UserAnswer> {
        vec![
            UserAnswer {
                question_id: 7,
                question_text: "哪个 HTTP 状态码表示'未找到页面'？".into(),
                selected_option: "404".into(),
                correct_option: "404".into(),
                is_correct: true,
                time_spent: 3.0,
            },
            UserAnswer {
                question_id: 2,
                question_text: "下列哪个不是 CSS 的布局模型？".into(),
                selected_option: "Float".into(),
                correct_option: "Hyperlink".into(),
                is_correct: false,
                time_spent: 2.5,
            },
        ]
    }

    #[test]
    fn payload_matches_the_webhook_contract() {
        let payload = Payload::build("张三", &answers());
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["studentName"], "张三");
        assert_eq!(value["score"], 10);
        DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).unwrap();

        let details = value["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["index"], 1);
        assert_eq!(details[0]["userAnswer"], "404");
        assert_eq!(details[0]["correctAnswer"], "404");
        assert_eq!(details[0]["isCorrect"], true);
        assert_eq!(details[0]["timeSpent"], "3.00s");
        assert_eq!(details[1]["index"], 2);
        assert_eq!(details[1]["isCorrect"], false);
        assert_eq!(details[1]["timeSpent"], "2.50s");
    }

    #[test]
    fn placeholder_and_empty_urls_are_unconfigured() {
        assert!(!configured(""));
        assert!(!configured("   "));
        assert!(!configured("https://example.com/your-webhook-link"));
        assert!(configured("https://open.feishu.cn/open-apis/bot/v2/hook/abc"));
    }

    #[test]
    fn unconfigured_reporter_stays_idle() {
        let mut reporter = Huibao::new("");
        reporter.send(Payload::build("张三", &answers()));
        reporter.wait();
        assert_eq!(reporter.status(), Status::Idle);
    }

    #[test]
    fn unreachable_endpoint_settles_on_error() {
        let mut reporter = Huibao::new("http://127.0.0.1:9/hook");
        reporter.send(Payload::build("张三", &answers()));
        reporter.wait();
        assert_eq!(reporter.status(), Status::Error);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut reporter = Huibao::new("http://127.0.0.1:9/hook");
        reporter.send(Payload::build("张三", &answers()));
        reporter.reset();
        assert_eq!(reporter.status(), Status::Idle);
    }
}
