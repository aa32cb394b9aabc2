//! ログ初期化モジュール
//!
//! `tracing` + `tracing-subscriber` でログをファイルに出力する。
//! 端末には何も出さない（REPL の表示を崩さないため）。
//! ログファイルはローカル日付で日次ローテーションする。

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use directories::ProjectDirs;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{fmt, EnvFilter};

/// ログレベルを指定する環境変数
const LOG_ENV: &str = "DEEPCODER_LOG";
const LOG_PREFIX: &str = "deepcoder.log";

/// ログ行のタイムスタンプをローカル時刻（オフセット付き）で出力するタイマー
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// ローカル日付で日次ローテーションするファイルアペンダー。
///
/// 書き込みのたびに日付を確認し、変わっていれば新しいファイルを開く。
struct DailyAppender {
    dir: PathBuf,
    current_date: NaiveDate,
    file: File,
}

impl DailyAppender {
    fn new(dir: PathBuf) -> std::io::Result<Self> {
        let today = Local::now().date_naive();
        let file = Self::open_log_file(&dir, today)?;
        Ok(Self {
            dir,
            current_date: today,
            file,
        })
    }

    fn file_name(date: NaiveDate) -> String {
        format!("{LOG_PREFIX}.{}", date.format("%Y-%m-%d"))
    }

    fn open_log_file(dir: &Path, date: NaiveDate) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(Self::file_name(date)))
    }
}

impl Write for DailyAppender {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let today = Local::now().date_naive();
        if today != self.current_date {
            self.file = Self::open_log_file(&self.dir, today)?;
            self.current_date = today;
        }
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

/// ログの出力先ディレクトリ。
///
/// 開発時（`CARGO_MANIFEST_DIR` あり）は `var/logs/`、
/// それ以外はプラットフォームのデータディレクトリ配下の `logs/`。
fn log_dir() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        return PathBuf::from(manifest_dir).join("var").join("logs");
    }

    match ProjectDirs::from("", "", "deepcoder") {
        Some(dirs) => dirs.data_local_dir().join("logs"),
        None => PathBuf::from("var").join("logs"),
    }
}

/// ログシステムを初期化する。
///
/// - レベルは `DEEPCODER_LOG` で制御（デフォルト: `info`）
/// - 出力先は `deepcoder.log.YYYY-MM-DD`
///
/// 返ってくるガードは `main()` で保持し続けること（ドロップするとログ出力が止まる）。
/// ログファイルを開けなかった場合は警告を出して `None` を返す（ログなしで続行）。
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = log_dir();

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!(
            "deepcoder: warning: failed to create log directory {}: {e}",
            log_dir.display()
        );
        return None;
    }

    let appender = match DailyAppender::new(log_dir.clone()) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!(
                "deepcoder: warning: failed to create log file in {}: {e}",
                log_dir.display()
            );
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(non_blocking)
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .init();

    Some(guard)
}
