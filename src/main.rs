use clap::Parser;
use env_logger::Env;
use log::debug;
use std::path::PathBuf;
use thiserror::Error;

mod cli;
mod libshuati;

use crate::libshuati::tiku;

#[derive(Parser, Debug)]
#[command(name = "极速刷题宝 (Jísù Shuātíbǎo)")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "tiku.json")]
    bank: PathBuf,
    /// Webhook URL for score reporting. Falls back to the SHUATIBAO_WEBHOOK
    /// env var; reporting is skipped when neither is set.
    #[arg(short, long, value_name = "URL")]
    webhook: Option<String>,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[derive(Debug, Error)]
enum Error {
    #[error("cannot load question bank: {0}")]
    Bank(#[from] tiku::Error),
    #[error("the question bank is empty!")]
    EmptyBank,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let bank = tiku::load(&args.bank)?;
    if bank.is_empty() {
        return Err(Error::EmptyBank);
    }
    debug!("[Bank] {} candidate questions.", bank.len());

    let webhook = args
        .webhook
        .or_else(|| std::env::var("SHUATIBAO_WEBHOOK").ok())
        .unwrap_or_default();
    if webhook.is_empty() {
        debug!("[Report] No webhook configured.");
    }

    cli::run(bank, webhook);
    Ok(())
}
