//! 更新日の繰り越しと「もうすぐ更新」の判定
//!
//! 評価日（1回の実行につき1度だけ読み取る今日の日付）を基準に、
//! 各サブスクリプションについて次の2つを計算する。
//!
//! - 通知判定: 更新日までの日数が`remind_days_before`以下なら通知対象。
//!   更新日を過ぎている（日数が負）ものも対象に含める。
//! - 繰り越し: 評価日が更新日より後なら、更新日を1サイクルだけ進める。
//!   何サイクル分遅れていても1回の実行で進めるのは1サイクルのみ。
//!
//! `active`フラグはどちらの計算でも参照しない。

use super::models::{BillingInterval, Subscription};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::format_cost;
use chrono::{Months, NaiveDate};

/// 通知対象のサブスクリプション
#[derive(Debug, Clone, PartialEq)]
pub struct DueNotice {
    pub name: String,
    pub cost: f64,
    pub renewal_date: NaiveDate,
    /// 評価日から更新日までの日数（過ぎている場合は負）
    pub days_until: i64,
}

impl DueNotice {
    /// 表示・通知用のメッセージを生成する
    pub fn message(&self) -> String {
        let cost = format_cost(self.cost);
        match self.days_until {
            d if d < 0 => format!(
                "⚠️  {} の更新日（{}）を{}日過ぎています（{}）",
                self.name,
                self.renewal_date,
                -d,
                cost
            ),
            0 => format!("⚠️  {} は今日更新されます（{}）", self.name, cost),
            1 => format!("⚠️  {} は明日更新されます（{}）", self.name, cost),
            d => format!(
                "⚠️  {} は{}日後（{}）に更新されます（{}）",
                self.name, d, self.renewal_date, cost
            ),
        }
    }
}

/// 繰り越されたサブスクリプション
#[derive(Debug, Clone, PartialEq)]
pub struct Rollover {
    pub name: String,
    pub previous_date: NaiveDate,
    pub new_date: NaiveDate,
}

impl Rollover {
    /// 表示用のメッセージを生成する
    pub fn message(&self) -> String {
        format!("{} → {}", self.name, self.new_date)
    }
}

/// 一括評価の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenewalReport {
    /// 通知対象（繰り越し前の状態で判定）
    pub due_soon: Vec<DueNotice>,
    /// 今回の評価で更新日が進んだもの
    pub rolled_over: Vec<Rollover>,
}

impl RenewalReport {
    /// 保存が必要な変更があるか
    pub fn has_changes(&self) -> bool {
        !self.rolled_over.is_empty()
    }

    /// 通知本文（通知メッセージを改行で連結したもの）
    pub fn notification_body(&self) -> String {
        self.due_soon
            .iter()
            .map(DueNotice::message)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 日付を1サイクル進める
///
/// # 引数
/// * `date` - 現在の更新日
/// * `interval` - 支払いサイクル
///
/// # 戻り値
/// 1サイクル後の日付、または日付の表現範囲を超える場合はエラー
///
/// # 月末の扱い
/// 移動先の月に同じ日が無い場合はその月の末日に丸める
/// （1月31日 → 2月29日/28日、うるう年の2月29日 → 翌年2月28日）。
/// 12月の次は翌年の1月になる。
pub fn advance_one_cycle(date: NaiveDate, interval: BillingInterval) -> AppResult<NaiveDate> {
    let months = match interval {
        BillingInterval::Monthly => Months::new(1),
        BillingInterval::Yearly => Months::new(12),
    };

    date.checked_add_months(months).ok_or_else(|| {
        AppError::validation(format!("{date} から{interval}の繰り越しができません"))
    })
}

/// 評価日から更新日までの日数
pub fn days_until_renewal(subscription: &Subscription, today: NaiveDate) -> i64 {
    subscription
        .renewal_date
        .signed_duration_since(today)
        .num_days()
}

/// 通知対象かどうか
pub fn is_due_soon(subscription: &Subscription, today: NaiveDate) -> bool {
    days_until_renewal(subscription, today) <= i64::from(subscription.remind_days_before)
}

/// 通知対象を抽出する（読み取りのみ）
pub fn due_soon(subscriptions: &[Subscription], today: NaiveDate) -> Vec<DueNotice> {
    subscriptions
        .iter()
        .filter(|sub| is_due_soon(sub, today))
        .map(|sub| DueNotice {
            name: sub.name.clone(),
            cost: sub.cost,
            renewal_date: sub.renewal_date,
            days_until: days_until_renewal(sub, today),
        })
        .collect()
}

/// 更新日を過ぎていれば1サイクル進める
///
/// # 戻り値
/// 繰り越した場合は`Some(Rollover)`、更新日がまだ来ていなければ`None`
pub fn roll_over(subscription: &mut Subscription, today: NaiveDate) -> AppResult<Option<Rollover>> {
    if today <= subscription.renewal_date {
        return Ok(None);
    }

    let previous_date = subscription.renewal_date;
    let new_date = advance_one_cycle(previous_date, subscription.interval)?;
    subscription.renewal_date = new_date;

    log::debug!(
        "{} の更新日を繰り越しました: {previous_date} -> {new_date}",
        subscription.name
    );

    Ok(Some(Rollover {
        name: subscription.name.clone(),
        previous_date,
        new_date,
    }))
}

/// 全サブスクリプションを評価する
///
/// 通知対象は繰り越し前の状態で判定し、その後で繰り越しを行う。
/// 繰り越しの途中でエラーになった場合、呼び出し側は結果を保存してはならない。
pub fn evaluate(subscriptions: &mut [Subscription], today: NaiveDate) -> AppResult<RenewalReport> {
    let due = due_soon(subscriptions, today);

    let mut rolled_over = Vec::new();
    for subscription in subscriptions.iter_mut() {
        if let Some(rollover) = roll_over(subscription, today)? {
            rolled_over.push(rollover);
        }
    }

    log::debug!(
        "評価日 {today}: 通知対象 {} 件、繰り越し {} 件",
        due.len(),
        rolled_over.len()
    );

    Ok(RenewalReport {
        due_soon: due,
        rolled_over,
    })
}
