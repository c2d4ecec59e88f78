//! サブコマンドの引数定義と処理
//!
//! 各`run_*`は標準出力に表示する行を返す。ログは標準エラーに出る。

use super::models::{BillingInterval, CreateSubscriptionDto, UpdateSubscriptionDto};
use super::renewal::{self, RenewalReport};
use super::repository::{self, SubscriptionFile};
use crate::features::notifications::{Notifier, NOTIFICATION_SUBJECT};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{
    format_cost, parse_date, validate_cost, validate_required_field, validate_text_length,
};
use chrono::NaiveDate;
use clap::Args;

/// サービス名の最大文字数
const MAX_NAME_LENGTH: usize = 100;

/// `add`の引数
#[derive(Args, Debug)]
pub struct AddArgs {
    /// サービス名
    pub name: String,

    /// 1回あたりの金額
    #[arg(long)]
    pub cost: f64,

    /// 次回更新日（YYYY-MM-DD）
    #[arg(long, value_parser = parse_date_arg)]
    pub renewal: NaiveDate,

    /// 支払いサイクル
    #[arg(long, value_enum)]
    pub interval: BillingInterval,

    /// 更新日の何日前から通知するか（省略時: 1）
    #[arg(long)]
    pub remind_days: Option<u32>,
}

/// `update`の引数
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// 更新するサービス名（大文字小文字を区別しない）
    pub name: String,

    /// 新しい金額
    #[arg(long)]
    pub cost: Option<f64>,

    /// 新しい次回更新日（YYYY-MM-DD）
    #[arg(long, value_parser = parse_date_arg)]
    pub renewal: Option<NaiveDate>,

    /// 新しい支払いサイクル
    #[arg(long, value_enum)]
    pub interval: Option<BillingInterval>,

    /// 有効/無効
    #[arg(long, value_name = "true|false")]
    pub active: Option<bool>,

    /// 更新日の何日前から通知するか
    #[arg(long)]
    pub remind_days: Option<u32>,

    /// 更新日を今すぐ1サイクル進める
    #[arg(long)]
    pub bump: bool,
}

/// `remove`の引数
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// 削除するサービス名（一致するものをすべて削除）
    pub name: String,
}

/// `list`の引数
#[derive(Args, Debug)]
pub struct ListArgs {
    /// 有効なサブスクリプションのみ表示する
    #[arg(long)]
    pub active_only: bool,
}

/// `daily`の引数
#[derive(Args, Debug)]
pub struct DailyArgs {
    /// 通知を送らない
    #[arg(long)]
    pub no_notify: bool,
}

/// clap用の日付パーサー
pub fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(String::from)
}

/// サブスクリプションを追加する
pub fn run_add(args: AddArgs, file: &SubscriptionFile) -> AppResult<Vec<String>> {
    let dto = CreateSubscriptionDto {
        name: args.name.trim().to_string(),
        cost: args.cost,
        renewal_date: args.renewal,
        interval: args.interval,
        remind_days_before: args.remind_days,
    };
    validate_create_subscription_dto(&dto)?;

    let subscription = repository::create(file, dto)?;

    Ok(vec![format!(
        "✨ サブスクリプションを追加しました: {}（{} / {}、次回 {}）",
        subscription.name,
        format_cost(subscription.cost),
        subscription.interval,
        subscription.renewal_date
    )])
}

/// サブスクリプションを更新する
///
/// 見つからない場合は`AppError::NotFound`を返し、ファイルは変更しない。
pub fn run_update(args: UpdateArgs, file: &SubscriptionFile) -> AppResult<Vec<String>> {
    let dto = UpdateSubscriptionDto {
        cost: args.cost,
        renewal_date: args.renewal,
        interval: args.interval,
        active: args.active,
        remind_days_before: args.remind_days,
        bump: args.bump,
    };
    validate_update_subscription_dto(&dto)?;

    let subscription = repository::update(file, &args.name, dto)?;

    Ok(vec![format!(
        "✨ {} を更新しました（次回 {}）",
        subscription.name, subscription.renewal_date
    )])
}

/// サブスクリプションを削除する
pub fn run_remove(args: RemoveArgs, file: &SubscriptionFile) -> AppResult<Vec<String>> {
    let removed = repository::delete(file, &args.name)?;

    Ok(vec![format!("🗑️  {} を削除しました（{removed} 件）", args.name)])
}

/// 更新が近いサブスクリプションを表示する（読み取りのみ）
pub fn run_check(file: &SubscriptionFile, today: NaiveDate) -> AppResult<Vec<String>> {
    let subscriptions = file.load()?;
    let notices = renewal::due_soon(&subscriptions, today);

    if notices.is_empty() {
        return Ok(vec!["✨ 近日中に更新されるサブスクリプションはありません".to_string()]);
    }

    Ok(notices.iter().map(|notice| notice.message()).collect())
}

/// 更新日を過ぎたサブスクリプションを1サイクル繰り越す
pub fn run_auto_update(file: &SubscriptionFile, today: NaiveDate) -> AppResult<Vec<String>> {
    let report = evaluate_and_persist(file, today)?;

    Ok(rollover_lines(&report))
}

/// 毎日の定期実行: 通知判定、繰り越し、保存、通知送信
///
/// # 引数
/// * `args` - `daily`の引数
/// * `file` - データファイル
/// * `today` - 評価日
/// * `connect` - 通知先を作成する関数（通知対象がある場合のみ呼ばれる）
///
/// # 戻り値
/// 表示する行。通知の失敗はエラーではなく1行のメッセージとして返す。
pub fn run_daily<F>(
    args: DailyArgs,
    file: &SubscriptionFile,
    today: NaiveDate,
    connect: F,
) -> AppResult<Vec<String>>
where
    F: FnOnce() -> AppResult<Box<dyn Notifier>>,
{
    let report = evaluate_and_persist(file, today)?;

    let mut lines = Vec::new();
    if report.due_soon.is_empty() {
        lines.push("✨ 近日中に更新されるサブスクリプションはありません".to_string());
    } else {
        lines.extend(report.due_soon.iter().map(|notice| notice.message()));
    }
    lines.extend(rollover_lines(&report));

    if report.due_soon.is_empty() || args.no_notify {
        return Ok(lines);
    }

    let body = report.notification_body();
    match connect().and_then(|notifier| notifier.send(NOTIFICATION_SUBJECT, &body)) {
        Ok(()) => lines.push(format!(
            "📧 {} 件の通知を送信しました",
            report.due_soon.len()
        )),
        Err(e) => {
            log::warn!("通知の送信に失敗しました: {}", e.details());
            lines.push(format!("⚠️  通知を送信できませんでした: {e}"));
        }
    }

    Ok(lines)
}

/// サブスクリプション一覧を表示する
pub fn run_list(args: ListArgs, file: &SubscriptionFile) -> AppResult<Vec<String>> {
    let subscriptions = repository::find_all(file, args.active_only)?;

    if subscriptions.is_empty() {
        return Ok(vec!["登録されているサブスクリプションはありません".to_string()]);
    }

    Ok(subscriptions
        .iter()
        .map(|sub| {
            let status = if sub.is_active() { "" } else { " [停止中]" };
            format!(
                "{}: {} / {}、次回 {}（{}日前に通知）{status}",
                sub.name,
                format_cost(sub.cost),
                sub.interval,
                sub.renewal_date,
                sub.remind_days_before
            )
        })
        .collect())
}

/// 有効なサブスクリプションの月額合計を表示する
pub fn run_total(file: &SubscriptionFile) -> AppResult<Vec<String>> {
    let total = repository::calculate_monthly_total(file)?;

    Ok(vec![format!("💰 月額合計: {}", format_cost(total))])
}

/// 読み込み、評価し、繰り越しがあれば保存する
fn evaluate_and_persist(file: &SubscriptionFile, today: NaiveDate) -> AppResult<RenewalReport> {
    let mut subscriptions = file.load()?;
    let report = renewal::evaluate(&mut subscriptions, today)?;

    if report.has_changes() {
        file.save(&subscriptions)?;
        log::info!(
            "{} 件のサブスクリプションの更新日を繰り越しました",
            report.rolled_over.len()
        );
    }

    Ok(report)
}

fn rollover_lines(report: &RenewalReport) -> Vec<String> {
    if !report.has_changes() {
        return vec!["✨ 今日繰り越すサブスクリプションはありません".to_string()];
    }

    let mut lines = vec!["🔄 更新日を繰り越しました:".to_string()];
    lines.extend(report.rolled_over.iter().map(|rollover| rollover.message()));
    lines
}

/// サブスクリプション作成DTOのバリデーション
fn validate_create_subscription_dto(dto: &CreateSubscriptionDto) -> AppResult<()> {
    validate_required_field(&dto.name, "サービス名")?;
    validate_text_length(&dto.name, MAX_NAME_LENGTH, "サービス名")?;
    validate_cost(dto.cost)?;
    Ok(())
}

/// サブスクリプション更新DTOのバリデーション
fn validate_update_subscription_dto(dto: &UpdateSubscriptionDto) -> AppResult<()> {
    if dto.is_empty() {
        return Err(AppError::validation(
            "更新する項目を指定してください（--cost, --renewal, --interval, --active, --remind-days, --bump）",
        ));
    }

    if let Some(cost) = dto.cost {
        validate_cost(cost)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn temp_file() -> (TempDir, SubscriptionFile) {
        let temp_dir = TempDir::new().unwrap();
        let file = SubscriptionFile::new(temp_dir.path().join("subscriptions.json"));
        (temp_dir, file)
    }

    fn add(file: &SubscriptionFile, name: &str, renewal: NaiveDate, interval: BillingInterval) {
        run_add(
            AddArgs {
                name: name.to_string(),
                cost: 10.0,
                renewal,
                interval,
                remind_days: None,
            },
            file,
        )
        .unwrap();
    }

    /// 送信内容を記録する通知先
    struct RecordingNotifier {
        sent: Rc<RefCell<Vec<(String, String)>>>,
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, subject: &str, body: &str) -> AppResult<()> {
            self.sent
                .borrow_mut()
                .push((subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    /// 常に失敗する通知先
    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn send(&self, _subject: &str, _body: &str) -> AppResult<()> {
            Err(AppError::notification("connection refused"))
        }
    }

    #[test]
    fn test_add_validates_input() {
        let (_temp_dir, file) = temp_file();

        let empty_name = run_add(
            AddArgs {
                name: "   ".to_string(),
                cost: 1.0,
                renewal: date(2024, 1, 1),
                interval: BillingInterval::Monthly,
                remind_days: None,
            },
            &file,
        );
        assert!(matches!(empty_name, Err(AppError::Validation(_))));

        let negative_cost = run_add(
            AddArgs {
                name: "Netflix".to_string(),
                cost: -1.0,
                renewal: date(2024, 1, 1),
                interval: BillingInterval::Monthly,
                remind_days: None,
            },
            &file,
        );
        assert!(matches!(negative_cost, Err(AppError::Validation(_))));
        assert!(!file.path().exists());
    }

    #[test]
    fn test_add_and_list() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Netflix", date(2024, 3, 5), BillingInterval::Monthly);

        let lines = run_list(ListArgs { active_only: false }, &file).unwrap();
        assert_eq!(
            lines,
            vec!["Netflix: 10 / monthly、次回 2024-03-05（1日前に通知）".to_string()]
        );
    }

    #[test]
    fn test_update_requires_some_field() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Netflix", date(2024, 3, 5), BillingInterval::Monthly);

        let result = run_update(
            UpdateArgs {
                name: "Netflix".to_string(),
                cost: None,
                renewal: None,
                interval: None,
                active: None,
                remind_days: None,
                bump: false,
            },
            &file,
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_bump() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Spotify", date(2023, 12, 10), BillingInterval::Monthly);

        let lines = run_update(
            UpdateArgs {
                name: "spotify".to_string(),
                cost: None,
                renewal: None,
                interval: None,
                active: None,
                remind_days: None,
                bump: true,
            },
            &file,
        )
        .unwrap();

        assert_eq!(lines, vec!["✨ Spotify を更新しました（次回 2024-01-10）".to_string()]);
    }

    #[test]
    fn test_remove_not_found() {
        let (_temp_dir, file) = temp_file();

        let result = run_remove(
            RemoveArgs {
                name: "Hulu".to_string(),
            },
            &file,
        );

        let error = result.unwrap_err();
        assert!(!error.is_fatal());
        assert!(!file.path().exists());
    }

    #[test]
    fn test_check_is_read_only() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Lapsed", date(2024, 3, 1), BillingInterval::Monthly);
        let before = fs::read_to_string(file.path()).unwrap();

        let lines = run_check(&file, date(2024, 3, 3)).unwrap();

        assert_eq!(
            lines,
            vec!["⚠️  Lapsed の更新日（2024-03-01）を2日過ぎています（10）".to_string()]
        );
        assert_eq!(fs::read_to_string(file.path()).unwrap(), before);
    }

    #[test]
    fn test_check_with_nothing_due() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Later", date(2024, 4, 1), BillingInterval::Monthly);

        let lines = run_check(&file, date(2024, 3, 3)).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("✨"));
    }

    #[test]
    fn test_auto_update_persists_and_is_idempotent() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Netflix", date(2024, 1, 31), BillingInterval::Monthly);
        let today = date(2024, 2, 1);

        let lines = run_auto_update(&file, today).unwrap();
        assert_eq!(
            lines,
            vec![
                "🔄 更新日を繰り越しました:".to_string(),
                "Netflix → 2024-02-29".to_string()
            ]
        );
        assert_eq!(file.load().unwrap()[0].renewal_date, date(2024, 2, 29));

        let before = fs::read_to_string(file.path()).unwrap();
        let lines = run_auto_update(&file, today).unwrap();
        assert_eq!(
            lines,
            vec!["✨ 今日繰り越すサブスクリプションはありません".to_string()]
        );
        assert_eq!(fs::read_to_string(file.path()).unwrap(), before);
    }

    #[test]
    fn test_daily_sends_notification_and_rolls_over() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Lapsed", date(2024, 3, 9), BillingInterval::Monthly);
        add(&file, "Tomorrow", date(2024, 3, 11), BillingInterval::Yearly);
        let sent = Rc::new(RefCell::new(Vec::new()));
        let notifier = RecordingNotifier { sent: sent.clone() };

        let lines = run_daily(
            DailyArgs { no_notify: false },
            &file,
            date(2024, 3, 10),
            move || Ok(Box::new(notifier) as Box<dyn Notifier>),
        )
        .unwrap();

        let sent = sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NOTIFICATION_SUBJECT);
        assert_eq!(
            sent[0].1,
            "⚠️  Lapsed の更新日（2024-03-09）を1日過ぎています（10）\n⚠️  Tomorrow は明日更新されます（10）"
        );
        assert!(lines.contains(&"Lapsed → 2024-04-09".to_string()));
        assert_eq!(lines.last().unwrap(), "📧 2 件の通知を送信しました");
        assert_eq!(file.load().unwrap()[0].renewal_date, date(2024, 4, 9));
    }

    #[test]
    fn test_daily_notification_failure_keeps_rollover() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Lapsed", date(2024, 3, 9), BillingInterval::Monthly);

        let lines = run_daily(
            DailyArgs { no_notify: false },
            &file,
            date(2024, 3, 10),
            || Ok(Box::new(FailingNotifier) as Box<dyn Notifier>),
        )
        .unwrap();

        assert!(lines.last().unwrap().contains("通知を送信できませんでした"));
        assert_eq!(file.load().unwrap()[0].renewal_date, date(2024, 4, 9));
    }

    #[test]
    fn test_daily_missing_credentials_only_fails_notification() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Lapsed", date(2024, 3, 9), BillingInterval::Monthly);

        let lines = run_daily(DailyArgs { no_notify: false }, &file, date(2024, 3, 10), || {
            Err(AppError::configuration("NOTIFY_EMAIL が未設定です"))
        })
        .unwrap();

        assert!(lines.last().unwrap().contains("NOTIFY_EMAIL が未設定です"));
        assert_eq!(file.load().unwrap()[0].renewal_date, date(2024, 4, 9));
    }

    #[test]
    fn test_daily_skips_notifier_when_nothing_due() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Later", date(2024, 4, 1), BillingInterval::Monthly);

        let lines = run_daily(DailyArgs { no_notify: false }, &file, date(2024, 3, 10), || {
            panic!("通知対象が無いのに通知先が作成されました")
        })
        .unwrap();

        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_daily_no_notify() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Tomorrow", date(2024, 3, 11), BillingInterval::Monthly);

        let lines = run_daily(DailyArgs { no_notify: true }, &file, date(2024, 3, 10), || {
            panic!("--no-notify なのに通知先が作成されました")
        })
        .unwrap();

        assert_eq!(lines[0], "⚠️  Tomorrow は明日更新されます（10）");
    }

    #[test]
    fn test_total() {
        let (_temp_dir, file) = temp_file();
        add(&file, "Netflix", date(2024, 3, 5), BillingInterval::Monthly);
        add(&file, "Domain", date(2024, 3, 5), BillingInterval::Yearly);

        let lines = run_total(&file).unwrap();
        assert_eq!(lines, vec!["💰 月額合計: 10.83".to_string()]);
    }

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(parse_date_arg("2024-01-31").unwrap(), date(2024, 1, 31));
        assert!(parse_date_arg("31/01/2024").is_err());
    }
}
