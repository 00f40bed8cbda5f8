//! # Logging モジュール
//!
//! 射撃計算ツールのログ管理機能を提供します。
//!
//! tracing-appender による非同期ファイル出力とコンソール出力を切り替えられます。
//! 計算結果のレポートは標準出力に直接書き出し、ログには探索の経過や設定内容を残します。
//!
//! ## 設定可能な出力先
//!
//! - `Console`: コンソール（標準エラー）のみ
//! - `File`: ファイルのみ（logs/cannon-calc.YYYY-MM-DD、JSON形式）
//! - `Both`: コンソールとファイルの両方

use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

/// ログ出力先の設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogOutput {
    /// コンソールのみ
    Console,
    /// ファイルのみ
    File,
    /// コンソールとファイルの両方
    Both,
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stderr" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(format!("無効な出力先: {}. 利用可能: console, file, both", s)),
        }
    }
}

/// ログ設定構造体
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// ログレベル
    pub level: Level,
    /// 出力先
    pub output: LogOutput,
    /// ログファイルのディレクトリ（File または Both の場合）
    pub log_dir: String,
    /// ログファイル名のプレフィックス
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            output: LogOutput::Console,
            log_dir: "logs".to_string(),
            file_prefix: "cannon-calc".to_string(),
        }
    }
}

/// ログシステムを初期化
///
/// `RUST_LOG` が設定されていればそちらを優先します。
/// ファイル出力を使う場合は戻り値のガードを保持している間だけ書き込みが続きます。
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_string()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match config.output {
        LogOutput::Console => {
            Registry::default()
                .with(env_filter)
                .with(console_layer())
                .try_init()?;
            Ok(None)
        }
        LogOutput::File => {
            ensure_log_directory(&config.log_dir)?;
            let file_appender = rolling::daily(&config.log_dir, &config.file_prefix);
            let (non_blocking_appender, guard) = non_blocking(file_appender);

            Registry::default()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(non_blocking_appender)
                        .with_target(true)
                        .with_thread_ids(false)
                        .json(),
                )
                .try_init()?;
            Ok(Some(guard))
        }
        LogOutput::Both => {
            ensure_log_directory(&config.log_dir)?;
            let file_appender = rolling::daily(&config.log_dir, &config.file_prefix);
            let (non_blocking_appender, guard) = non_blocking(file_appender);

            Registry::default()
                .with(env_filter)
                .with(console_layer())
                .with(
                    fmt::layer()
                        .with_writer(non_blocking_appender)
                        .with_target(true)
                        .with_thread_ids(false)
                        .json(),
                )
                .try_init()?;
            Ok(Some(guard))
        }
    }
}

/// コンソール（標準エラー）向けのレイヤー
fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
}

/// ログレベルを文字列から解析
///
/// 無効な場合は WARN
pub fn parse_log_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("警告: 無効なログレベル '{}'. WARNを使用します", level_str);
            Level::WARN
        }
    }
}

/// 詳細出力レベル（-v の回数）からログレベルを決める
pub fn level_for_verbosity(verbose_level: u8) -> Level {
    match verbose_level {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// ログディレクトリを作成
pub fn ensure_log_directory(log_dir: &str) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(log_dir)?;
    Ok(())
}
