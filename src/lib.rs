//! サブスクリプションの更新日を記録し、更新が近いものを知らせるCLIのライブラリ部分
//!
//! - `features::subscriptions` — 記録の追加・更新・削除、更新日の判定と繰り越し
//! - `features::notifications` — 通知の送信
//! - `shared` — エラー型、設定、ユーティリティ

pub mod features;
pub mod shared;
