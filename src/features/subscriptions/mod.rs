/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連するすべての機能を提供します：
/// - サブスクリプションの追加、一覧、更新、削除
/// - 更新日が近いものの判定と通知
/// - 更新日を過ぎたものの繰り越し
/// - 月額合計の計算
pub mod commands;
pub mod models;
pub mod renewal;
pub mod repository;

// 公開インターフェース
pub use commands::{
    run_add, run_auto_update, run_check, run_daily, run_list, run_remove, run_total, run_update,
    AddArgs, DailyArgs, ListArgs, RemoveArgs, UpdateArgs,
};

pub use models::{BillingInterval, CreateSubscriptionDto, Subscription, UpdateSubscriptionDto};

pub use renewal::{advance_one_cycle, evaluate, DueNotice, RenewalReport, Rollover};

pub use repository::{
    calculate_monthly_total, create, delete, find_all, update, SubscriptionFile,
};
