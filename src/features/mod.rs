/// 通知機能（SMTPメール）
pub mod notifications;

/// サブスクリプション管理機能
pub mod subscriptions;
