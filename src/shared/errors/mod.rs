use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 対象のサブスクリプションが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 保存データが壊れている・解釈できない場合のエラー
    #[error("保存データエラー: {0}")]
    Storage(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// 通知送信でのエラー
    #[error("通知エラー: {0}")]
    Notification(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラー、未登録の名前など）
    Low,
    /// 中重要度（通知の一時的な失敗など）
    Medium,
    /// 高重要度（保存データの破損など）
    High,
    /// 最重要（設定が欠けていて処理を続けられない）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::Storage(_) => "保存データを読み込めませんでした",
            AppError::Configuration(msg) => msg,
            AppError::Notification(_) => "通知の送信でエラーが発生しました",
            AppError::Io(_) => "ファイル操作でエラーが発生しました",
            AppError::Json(_) => "データ形式の解析でエラーが発生しました",
        }
    }

    /// エラーの詳細情報を取得（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::Storage(_) => ErrorSeverity::High,
            AppError::Configuration(_) => ErrorSeverity::Critical,
            AppError::Notification(_) => ErrorSeverity::Medium,
            AppError::Io(_) => ErrorSeverity::High,
            AppError::Json(_) => ErrorSeverity::High,
        }
    }

    /// 処理を中断すべきエラーかどうか
    ///
    /// 未登録の名前に対する更新・削除は「見つからない」と報告するだけで、
    /// 失敗扱いにはしない。
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::NotFound(_))
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 保存データエラーを作成するヘルパー関数
    pub fn storage<S: Into<String>>(message: S) -> Self {
        AppError::Storage(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// 通知エラーを作成するヘルパー関数
    pub fn notification<S: Into<String>>(message: S) -> Self {
        AppError::Notification(message.into())
    }
}

/// AppErrorからStringへの変換（CLIでの表示のため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
