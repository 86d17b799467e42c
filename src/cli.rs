use crate::libshuati::chengjidan;
use crate::libshuati::huibao::{Huibao, Payload, Status as ReportStatus};
use crate::libshuati::kaoshi::{Kaoshi, Outcome, Status};
use crate::libshuati::tiku::Question;
use colored::Colorize;
use log::debug;
use std::path::Path;
use text_io::read;

#[derive(Debug, PartialEq)]
enum Choice {
    Option(usize),
    Invalid,
    Quit,
}

impl Choice {
    fn from_str(choices_count: usize, input: &str) -> Choice {
        match input.trim() {
            "q" => Choice::Quit,
            input => match input.parse::<usize>() {
                Ok(num) if (1..=choices_count).contains(&num) => Choice::Option(num - 1),
                _ => Choice::Invalid,
            },
        }
    }
}

/// The interactive loop. Renders whatever state the session is in, reads one
/// intent, feeds it to the session and goes around again.
pub fn run(bank: Vec<Question>, webhook_url: String) {
    let mut session = Kaoshi::new();
    let mut reporter = Huibao::new(webhook_url);

    loop {
        match session.status() {
            Status::Start => {
                println!("{}", "==========> 极速刷题宝 <==========".cyan());
                println!("智能随机抽题，随时随地开启高效练习。");
                print!("{} ", "按回车立即开始 (q 退出):".cyan());
                let line: String = read!("{}\n");
                if line.trim() == "q" {
                    reporter.wait();
                    return;
                }
                session.begin();
            }
            Status::NameInput => name_step(&mut session, &bank),
            Status::Quiz => {
                if quiz_step(&mut session, &mut reporter) {
                    reporter.wait();
                    return;
                }
            }
            Status::Finished => {
                if finished_step(&mut session, &mut reporter) {
                    return;
                }
            }
        }
    }
}

fn name_step(session: &mut Kaoshi, bank: &[Question]) {
    print!("{} ", "请输入您的姓名（例如：张三）:".cyan());
    let name: String = read!("{}\n");
    session.set_name(name.as_str());
    if session.confirm_name(bank) {
        println!(
            "{}",
            format!(
                "当前考生：{}（防秒选模式已启动，共 {} 题）",
                session.user_name().trim(),
                session.questions().len()
            )
            .cyan()
        );
    } else if let Some(warning) = session.warning() {
        println!("{}", format!("⚠️ {}", warning).bright_red());
    }
}

/// Returns true when the user quits mid-quiz.
fn quiz_step(session: &mut Kaoshi, reporter: &mut Huibao) -> bool {
    let question = match session.current_question() {
        Some(question) => question.clone(),
        None => return false,
    };

    let leading = format!(
        "{}/{}. ",
        session.current_index() + 1,
        session.questions().len()
    );
    println!(
        "{}{}",
        leading.cyan(),
        question.text.as_str().black().bold().on_white()
    );
    let indent = " ".repeat(leading.len());
    for (i, option) in question.options.iter().enumerate() {
        println!("{}{}. {}", indent, format!("{}", i + 1).bold(), option);
    }

    print!(
        "{} ",
        format!("请选择 (1-{}, q 提前退出):", question.options.len()).cyan()
    );
    let choice_string: String = read!("{}\n");
    let choice = Choice::from_str(question.options.len(), choice_string.as_str());
    debug!("choice: {:?}", choice);

    match choice {
        Choice::Option(num) => match session.select_option(num) {
            Some(Outcome::Accepted { correct, finished }) => {
                if correct {
                    println!("{}", "回答正确！".bright_green());
                } else {
                    println!("{}", "回答错误！".bright_red());
                    if let Some(answer) = session.answers().last() {
                        println!(
                            "{}",
                            format!("标准答案是：{}", answer.correct_option).green()
                        );
                    }
                }
                if finished {
                    reporter.send(Payload::build(session.user_name(), session.answers()));
                }
            }
            Some(Outcome::TooFast) => {
                if let Some(warning) = session.warning() {
                    println!("{}", format!("⚠️ {}", warning).bright_red());
                }
            }
            None => {}
        },
        Choice::Invalid => {
            println!(
                "{}",
                format!("只有 {} 个选项！", question.options.len()).bright_red()
            );
        }
        Choice::Quit => {
            println!("{}", "已提前退出！".cyan());
            return true;
        }
    }
    false
}

/// Score summary, report status and review list, then one menu command.
/// Returns true when the user quits.
fn finished_step(session: &mut Kaoshi, reporter: &mut Huibao) -> bool {
    let answers = session.answers();
    println!(
        "{}",
        format!(
            "==========> 考生 {} 的测试得分 <==========",
            session.user_name().trim()
        )
        .cyan()
    );
    println!(
        "{}",
        format!("{}", chengjidan::score(answers)).bold().on_white()
    );
    println!(
        "正确率: {}%  总用时: {:.0}s",
        chengjidan::accuracy_percent(answers),
        chengjidan::total_time(answers)
    );
    match reporter.status() {
        ReportStatus::Idle => {}
        ReportStatus::Sending => println!("{}", "正在上报成绩...".cyan()),
        ReportStatus::Success => println!("{}", "✅ 成绩已成功同步至老师端".green()),
        ReportStatus::Error => println!("{}", "❌ 成绩同步失败，请手动导出".bright_red()),
    }

    println!("{}", "--- 答题回顾 ---".cyan());
    for (idx, answer) in answers.iter().enumerate() {
        let verdict = if answer.is_correct {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("{} {}. {}", verdict, idx + 1, answer.question_text);
        if answer.is_correct {
            println!("   你的回答：{}", answer.selected_option.as_str().green());
        } else {
            println!(
                "   你的回答：{}  标准答案：{}",
                answer.selected_option.as_str().red(),
                answer.correct_option.as_str().green()
            );
        }
    }

    print!(
        "{} ",
        "d 导出成绩单, r 回到主页, 回车刷新上报状态, q 退出:".cyan()
    );
    let command: String = read!("{}\n");
    match command.trim() {
        "d" => {
            match chengjidan::export(Path::new("."), session.user_name(), answers) {
                Ok(path) => println!("{}", format!("成绩单已导出至 {:?}", path).green()),
                Err(err) => println!("{}", format!("导出失败：{}", err).bright_red()),
            }
            false
        }
        "r" => {
            session.return_home();
            reporter.reset();
            false
        }
        "q" => {
            reporter.wait();
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parses_in_range_numbers() {
        assert_eq!(Choice::from_str(4, "1"), Choice::Option(0));
        assert_eq!(Choice::from_str(4, "4"), Choice::Option(3));
        assert_eq!(Choice::from_str(4, " 2 "), Choice::Option(1));
    }

    #[test]
    fn choice_flags_everything_else() {
        assert_eq!(Choice::from_str(4, "5"), Choice::Invalid);
        assert_eq!(Choice::from_str(4, "0"), Choice::Invalid);
        assert_eq!(Choice::from_str(4, "abc"), Choice::Invalid);
        assert_eq!(Choice::from_str(4, ""), Choice::Invalid);
        assert_eq!(Choice::from_str(4, "q"), Choice::Quit);
    }
}
