/// 通知機能モジュール
///
/// 更新が近いサブスクリプションの一覧を外部に届ける。
/// 送信に失敗しても、それ以前に保存した繰り越し結果は取り消さない。
pub mod mailer;

use crate::shared::errors::AppResult;

pub use mailer::{SmtpConfig, SmtpNotifier};

/// 通知の件名
pub const NOTIFICATION_SUBJECT: &str = "サブスクリプション更新のお知らせ";

/// 通知の送信先
pub trait Notifier {
    /// 件名と本文を送信する（リトライはしない）
    fn send(&self, subject: &str, body: &str) -> AppResult<()>;
}
