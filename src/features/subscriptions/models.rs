use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// `remind_days_before`が保存されていない場合の既定値
pub const DEFAULT_REMIND_DAYS_BEFORE: u32 = 1;

/// 支払いサイクル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    /// 毎月
    Monthly,
    /// 毎年（古いデータの"annual"も受け付ける）
    #[serde(alias = "annual")]
    #[value(alias = "annual")]
    Yearly,
}

impl BillingInterval {
    /// 保存形式の文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Monthly => "monthly",
            BillingInterval::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// サブスクリプションデータモデル
///
/// 過去の保存形式をすべて読めるように、欠けているフィールドは既定値で補い、
/// 知らないフィールドは`extra`に保持して書き戻す。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subscription {
    pub name: String,              // サービス名（大文字小文字を区別せずに照合）
    pub cost: f64,                 // 0以上、通貨は問わない
    pub renewal_date: NaiveDate,   // YYYY-MM-DD形式
    pub interval: BillingInterval, // "monthly" または "yearly"
    #[serde(default = "default_remind_days_before")]
    pub remind_days_before: u32, // 更新日の何日前から通知するか
    #[serde(
        default,
        deserialize_with = "deserialize_active",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<bool>, // 古いデータでは"true"/"false"の文字列
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_remind_days_before() -> u32 {
    DEFAULT_REMIND_DAYS_BEFORE
}

/// `active`フィールドを真偽値・文字列のどちらからでも読み込む
fn deserialize_active<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ActiveValue {
        Flag(bool),
        Text(String),
    }

    match Option::<ActiveValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ActiveValue::Flag(flag)) => Ok(Some(flag)),
        Some(ActiveValue::Text(text)) => match text.trim().to_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(D::Error::custom(format!(
                "activeは true または false である必要があります（受信: '{other}'）"
            ))),
        },
    }
}

impl Subscription {
    /// 作成用DTOから新しいサブスクリプションを組み立てる
    pub fn new(dto: CreateSubscriptionDto) -> Self {
        Self {
            name: dto.name,
            cost: dto.cost,
            renewal_date: dto.renewal_date,
            interval: dto.interval,
            remind_days_before: dto
                .remind_days_before
                .unwrap_or(DEFAULT_REMIND_DAYS_BEFORE),
            active: Some(true),
            extra: serde_json::Map::new(),
        }
    }

    /// 名前が一致するか（大文字小文字を区別しない）
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// 有効なサブスクリプションかどうか
    ///
    /// `active`が保存されていない古いデータは有効として扱う。
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }

    /// 月額換算の金額
    pub fn monthly_cost(&self) -> f64 {
        match self.interval {
            BillingInterval::Monthly => self.cost,
            BillingInterval::Yearly => self.cost / 12.0,
        }
    }
}

/// サブスクリプション作成用DTO
#[derive(Debug, Clone)]
pub struct CreateSubscriptionDto {
    pub name: String,
    pub cost: f64,
    pub renewal_date: NaiveDate,
    pub interval: BillingInterval,
    pub remind_days_before: Option<u32>,
}

/// サブスクリプション更新用DTO
///
/// `None`のフィールドは変更しない。`bump`が真なら、他の変更を適用した後に
/// 更新日を1サイクル進める。
#[derive(Debug, Clone, Default)]
pub struct UpdateSubscriptionDto {
    pub cost: Option<f64>,
    pub renewal_date: Option<NaiveDate>,
    pub interval: Option<BillingInterval>,
    pub active: Option<bool>,
    pub remind_days_before: Option<u32>,
    pub bump: bool,
}

impl UpdateSubscriptionDto {
    /// 変更内容が何も指定されていないか
    pub fn is_empty(&self) -> bool {
        self.cost.is_none()
            && self.renewal_date.is_none()
            && self.interval.is_none()
            && self.active.is_none()
            && self.remind_days_before.is_none()
            && !self.bump
    }
}
