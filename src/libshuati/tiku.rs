use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// A single bank entry. `correct_answer` is a 0-based index into `options`;
/// an out-of-range index is a bank authoring error, not something we defend
/// against at runtime.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

#[derive(Serialize, Deserialize, Debug)]
struct TikuJson {
    questions: Vec<Question>,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read bank file: {0}")]
    Read(#[from] std::io::Error),
    #[error("malformed bank JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn load(path: &Path) -> Result<Vec<Question>, Error> {
    let json = std::fs::read_to_string(path)?;
    let questions = parse(json.as_str())?;
    info!(
        "[Bank] Loaded {} questions from {:?}",
        questions.len(),
        path
    );
    Ok(questions)
}

fn parse(json: &str) -> Result<Vec<Question>, serde_json::Error> {
    let content: TikuJson = serde_json::from_str(json)?;
    Ok(content.questions)
}
