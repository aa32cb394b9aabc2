mod auth;
mod cli;
mod completion;
mod config;
mod gate;
mod logging;
mod shell;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use config::DeepCoderConfig;
use shell::Shell;

/// Describe an app, get the code.
#[derive(Parser, Debug)]
#[command(name = "deepcoder", version, about)]
struct Args {
    /// Generate once for this description and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Sign in with GitHub before generating (with --prompt)
    #[arg(long)]
    login: bool,

    /// Config file to use instead of ~/.config/deepcoder/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // .env ファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // ログシステムの初期化（guard は終了直前まで保持する）
    let guard = logging::init_logging();
    info!("deepcoder started");

    let config = match args.config {
        Some(ref path) => DeepCoderConfig::load_from(path),
        None => DeepCoderConfig::load(),
    };

    let mut shell = Shell::new(&config);
    let exit_code = match args.prompt {
        Some(ref prompt) => shell.run_once(prompt, args.login).await,
        None => shell.run().await,
    };

    info!(exit_code, "deepcoder exiting");
    // process::exit はデストラクタを走らせないため、先にログを flush する
    drop(guard);
    std::process::exit(exit_code);
}
