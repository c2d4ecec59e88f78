//! SMTPによるメール通知
//!
//! 送信元アカウントにログインし、自分宛て（または`NOTIFY_TO`宛て）に
//! プレーンテキストのメールを送る。

use super::Notifier;
use crate::shared::errors::{AppError, AppResult};
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// 既定のSMTPサーバー
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// 既定のSMTPポート（暗黙的TLS）
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// SMTP設定
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTPサーバーのホスト名
    pub host: String,
    /// SMTPサーバーのポート
    pub port: u16,
    /// 送信元アドレス（ログインユーザー名を兼ねる）
    pub sender: String,
    /// ログインパスワード
    pub password: String,
    /// 宛先アドレス
    pub recipient: String,
}

// パスワードをログに出さない
impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &"***")
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl SmtpConfig {
    /// 実行時の環境変数から設定を読み込む
    ///
    /// 認証情報をバイナリに埋め込まないよう、ビルド時の環境変数は参照しない。
    ///
    /// 読み込む環境変数:
    /// - `NOTIFY_EMAIL`（必須、無ければ`EMAIL`）
    /// - `NOTIFY_EMAIL_PASSWORD`（必須、無ければ`EMAIL_PASSWORD`）
    /// - `SMTP_HOST`（省略時: smtp.gmail.com）
    /// - `SMTP_PORT`（省略時: 465）
    /// - `NOTIFY_TO`（省略時: 送信元と同じ）
    ///
    /// # 戻り値
    /// SMTP設定、必須の値が無い場合は設定エラー
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 変数名から値を引く関数を使って設定を組み立てる
    ///
    /// # 引数
    /// * `lookup` - 変数名を受け取り、値があれば返す関数
    ///
    /// # 戻り値
    /// SMTP設定、必須の値が無い場合は設定エラー
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_of = |names: &[&str]| names.iter().find_map(|name| lookup(name));

        let sender = first_of(&["NOTIFY_EMAIL", "EMAIL"]).ok_or_else(|| {
            AppError::configuration("環境変数 NOTIFY_EMAIL（または EMAIL）が設定されていません")
        })?;
        let password = first_of(&["NOTIFY_EMAIL_PASSWORD", "EMAIL_PASSWORD"]).ok_or_else(|| {
            AppError::configuration(
                "環境変数 NOTIFY_EMAIL_PASSWORD（または EMAIL_PASSWORD）が設定されていません",
            )
        })?;

        let host = lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let port = match lookup("SMTP_PORT") {
            Some(value) => value.parse().unwrap_or_else(|_| {
                log::warn!(
                    "SMTP_PORTのパースに失敗しました。デフォルト値{DEFAULT_SMTP_PORT}を使用します"
                );
                DEFAULT_SMTP_PORT
            }),
            None => DEFAULT_SMTP_PORT,
        };
        let recipient = lookup("NOTIFY_TO").unwrap_or_else(|| sender.clone());

        let config = Self {
            host,
            port,
            sender,
            password,
            recipient,
        };
        config.validate()?;

        log::debug!("SMTP設定を読み込みました: {config:?}");
        Ok(config)
    }

    /// 設定を検証する
    pub fn validate(&self) -> AppResult<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::configuration("SMTP_HOSTが空です"));
        }
        if self.sender.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::configuration(
                "NOTIFY_EMAIL と NOTIFY_EMAIL_PASSWORD を設定してください",
            ));
        }
        Ok(())
    }
}

/// SMTPでメールを送る通知先
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// 設定からSMTP接続を準備する（接続自体は送信時に行われる）
    pub fn new(config: SmtpConfig) -> AppResult<Self> {
        let from = parse_mailbox(&config.sender)?;
        let to = parse_mailbox(&config.recipient)?;

        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| AppError::notification(format!("SMTPトランスポートの作成に失敗: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(config.sender, config.password))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    /// 環境変数の設定から作成する
    pub fn from_env() -> AppResult<Self> {
        Self::new(SmtpConfig::from_env()?)
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, subject: &str, body: &str) -> AppResult<()> {
        let message = build_message(&self.from, &self.to, subject, body)?;

        self.transport
            .send(&message)
            .map_err(|e| AppError::notification(format!("メール送信に失敗: {e}")))?;

        log::info!("通知メールを送信しました: {}", self.to);
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::configuration(format!("メールアドレスが不正です '{address}': {e}")))
}

fn build_message(from: &Mailbox, to: &Mailbox, subject: &str, body: &str) -> AppResult<Message> {
    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| AppError::notification(format!("メールの作成に失敗: {e}")))
}
