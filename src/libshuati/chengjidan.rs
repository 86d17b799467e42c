use crate::libshuati::kaoshi::UserAnswer;
use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Spreadsheet tools sniff the encoding off this, so the transcript always
/// leads with it.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

const HEADERS: [&str; 7] = ["姓名", "序号", "题目", "你的选择", "标准答案", "判断", "用时(秒)"];

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot render transcript: {0}")]
    Render(#[from] csv::Error),
    #[error("cannot write transcript file: {0}")]
    Write(#[from] std::io::Error),
}

pub fn score(answers: &[UserAnswer]) -> u32 {
    answers.iter().filter(|a| a.is_correct).count() as u32 * 10
}

/// The displayed accuracy percentage is the score itself, not
/// correct/total×100. Only a true percentage for 10-question rounds, but that
/// is the product behavior and every round draws 10 when the bank allows.
pub fn accuracy_percent(answers: &[UserAnswer]) -> u32 {
    score(answers)
}

pub fn total_time(answers: &[UserAnswer]) -> f64 {
    answers.iter().map(|a| a.time_spent).sum()
}

pub fn transcript_filename(user_name: &str) -> String {
    format!("{}_成绩单.csv", user_name)
}

/// Renders the transcript as UTF-8 CSV bytes with a leading BOM. Fields
/// containing commas or quotes come out quoted with doubled inner quotes,
/// which is the csv writer's default.
pub fn render_transcript(user_name: &str, answers: &[UserAnswer]) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    buf.extend_from_slice(UTF8_BOM);
    let mut writer = csv::Writer::from_writer(&mut buf);
    writer.write_record(HEADERS)?;
    for (idx, answer) in answers.iter().enumerate() {
        let seq = (idx + 1).to_string();
        let verdict = if answer.is_correct { "正确" } else { "错误" };
        let time_spent = format!("{:.2}", answer.time_spent);
        writer.write_record([
            user_name,
            seq.as_str(),
            answer.question_text.as_str(),
            answer.selected_option.as_str(),
            answer.correct_option.as_str(),
            verdict,
            time_spent.as_str(),
        ])?;
    }
    writer.flush()?;
    drop(writer);
    Ok(buf)
}

/// Writes `<name>_成绩单.csv` into `dir` and returns the written path.
pub fn export(dir: &Path, user_name: &str, answers: &[UserAnswer]) -> Result<PathBuf, Error> {
    let path = dir.join(transcript_filename(user_name));
    let bytes = render_transcript(user_name, answers)?;
    std::fs::write(&path, bytes)?;
    info!("[Export] Wrote {} rows to {:?}", answers.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str, selected: &str, correct: &str, is_correct: bool, secs: f64) -> UserAnswer {
        UserAnswer {
            question_id: 1,
            question_text: text.to_string(),
            selected_option: selected.to_string(),
            correct_option: correct.to_string(),
            is_correct,
            time_spent: secs,
        }
    }

    fn answers_with_correct(correct_count: usize) -> Vec<UserAnswer> {
        (0..10)
            .map(|i| answer("题目", "甲", "甲", i < correct_count, 2.5))
            .collect()
    }

    #[test]
    fn score_is_ten_per_correct_answer() {
        for correct_count in 0..=10 {
            let answers = answers_with_correct(correct_count);
            assert_eq!(score(&answers), correct_count as u32 * 10);
            assert_eq!(accuracy_percent(&answers), score(&answers));
        }
    }

    #[test]
    fn total_time_sums_all_answers() {
        let answers = answers_with_correct(3);
        assert!((total_time(&answers) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn transcript_filename_appends_suffix() {
        assert_eq!(transcript_filename("张三"), "张三_成绩单.csv");
    }

    #[test]
    fn transcript_starts_with_bom() {
        let bytes = render_transcript("张三", &answers_with_correct(5)).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
    }

    #[test]
    fn transcript_round_trips_through_a_csv_reader() {
        let answers = vec![
            answer("哪个 HTTP 状态码表示'未找到页面'？", "404", "404", true, 3.0),
            answer("含\"引号\"和,逗号的题目", "选项,带逗号", "正确\"答案\"", false, 2.518),
        ];
        let bytes = render_transcript("张三", &answers).unwrap();

        let mut reader = csv::Reader::from_reader(&bytes[3..]);
        assert_eq!(
            reader.headers().unwrap(),
            &csv::StringRecord::from(HEADERS.to_vec())
        );

        let rows: Vec<csv::StringRecord> =
            reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), answers.len());
        for (idx, (row, answer)) in rows.iter().zip(&answers).enumerate() {
            assert_eq!(&row[0], "张三");
            assert_eq!(row[1].parse::<usize>().unwrap(), idx + 1);
            assert_eq!(&row[2], answer.question_text.as_str());
            assert_eq!(&row[3], answer.selected_option.as_str());
            assert_eq!(&row[4], answer.correct_option.as_str());
            assert_eq!(&row[5], if answer.is_correct { "正确" } else { "错误" });
            let time: f64 = row[6].parse().unwrap();
            assert!((time - answer.time_spent).abs() < 0.01);
        }
    }

    #[test]
    fn export_writes_the_transcript_file() {
        let dir = std::env::temp_dir();
        let path = export(&dir, "张三", &answers_with_correct(10)).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "张三_成绩单.csv"
        );
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
        std::fs::remove_file(path).unwrap();
    }
}
