//! # subs CLI エントリーポイント
//!
//! 引数を解析し、ログと設定を初期化してからサブコマンドを実行する。

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use subscription_reminder_lib::features::notifications::{Notifier, SmtpNotifier};
use subscription_reminder_lib::features::subscriptions::commands::{
    self, parse_date_arg, AddArgs, DailyArgs, ListArgs, RemoveArgs, UpdateArgs,
};
use subscription_reminder_lib::features::subscriptions::SubscriptionFile;
use subscription_reminder_lib::shared::utils::today_local;
use subscription_reminder_lib::shared::{
    initialize_application, initialize_logging_system, load_environment_variables,
    log_environment_file, log_initialization_complete, AppError, AppResult, ErrorSeverity,
};

/// サブスクリプションの更新日を管理し、更新が近いものを知らせる
#[derive(Parser, Debug)]
#[command(name = "subs", version, about, long_about = None)]
struct Cli {
    /// ログを詳しく出す（-v, -vv, -vvv）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// データファイルのパス（省略時: $SUBSCRIPTIONS_FILE または ~/.subscriptions.json）
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// 評価日（YYYY-MM-DD、省略時: 今日）
    #[arg(long, global = true, value_parser = parse_date_arg)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// サブスクリプションを追加する
    Add(AddArgs),

    /// サブスクリプションを更新する（名前が一致する最初の1件）
    Update(UpdateArgs),

    /// サブスクリプションを削除する（名前が一致するものすべて）
    Remove(RemoveArgs),

    /// 更新が近いサブスクリプションを表示する
    Check,

    /// 更新日を過ぎたサブスクリプションを1サイクル繰り越す
    #[command(alias = "roll")]
    AutoUpdate,

    /// 通知判定と繰り越しを行い、更新が近いものをメールで知らせる
    Daily(DailyArgs),

    /// サブスクリプション一覧を表示する
    List(ListArgs),

    /// 有効なサブスクリプションの月額合計を表示する
    Total,
}

fn main() -> ExitCode {
    let env_file = load_environment_variables();

    let cli = Cli::parse();
    initialize_logging_system(cli.verbose);
    log_environment_file(&env_file);

    match run(cli) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) if !e.is_fatal() => {
            println!("🙅 {}", e.user_message());
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> AppResult<Vec<String>> {
    let init = initialize_application(cli.data_file)?;
    log_initialization_complete(&init);

    let file = SubscriptionFile::new(init.data_file);
    let today = cli.today.unwrap_or_else(today_local);
    log::debug!("評価日: {today}");

    match cli.command {
        Commands::Add(args) => commands::run_add(args, &file),
        Commands::Update(args) => commands::run_update(args, &file),
        Commands::Remove(args) => commands::run_remove(args, &file),
        Commands::Check => commands::run_check(&file, today),
        Commands::AutoUpdate => commands::run_auto_update(&file, today),
        Commands::Daily(args) => commands::run_daily(args, &file, today, || {
            SmtpNotifier::from_env().map(|notifier| Box::new(notifier) as Box<dyn Notifier>)
        }),
        Commands::List(args) => commands::run_list(args, &file),
        Commands::Total => commands::run_total(&file),
    }
}

fn report_error(error: &AppError) {
    match error.severity() {
        ErrorSeverity::Low => log::info!("{}", error.details()),
        ErrorSeverity::Medium => log::warn!("{}", error.details()),
        ErrorSeverity::High | ErrorSeverity::Critical => log::error!("{}", error.details()),
    }
    eprintln!("エラー: {}", error.user_message());
}
