use std::path::PathBuf;

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let environment = get_environment();
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if environment == Environment::Development {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        Self {
            environment: format!("{environment:?}").to_lowercase(),
            log_level,
        }
    }

    /// 設定されたログレベルを`log::LevelFilter`に変換する
    ///
    /// 不明な値は`Info`として扱う。
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. 実行時環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// カレントディレクトリの.envファイルを読み込む
///
/// `LOG_LEVEL`を反映させるためロガーより先に呼ぶので、ここではログを出さない。
/// 結果は初期化後に[`log_environment_file`]へ渡す。
///
/// # 戻り値
/// 読み込んだファイルのパス、またはdotenvのエラー
pub fn load_environment_variables() -> Result<PathBuf, dotenv::Error> {
    dotenv::dotenv()
}

/// .envファイルの読み込み結果をログに出す
///
/// ファイルが無い場合は警告のみで続行する（通知用の認証情報は
/// シェルの環境変数で渡されてもよい）。
pub fn log_environment_file(result: &Result<PathBuf, dotenv::Error>) {
    let (level, message) = environment_file_message(result);
    log::log!(level, "{message}");
}

fn environment_file_message(result: &Result<PathBuf, dotenv::Error>) -> (log::Level, String) {
    match result {
        Ok(path) => (
            log::Level::Debug,
            format!("環境ファイルを読み込みました: {}", path.display()),
        ),
        Err(e) => (
            log::Level::Warn,
            format!("環境ファイルを読み込みませんでした: {e}"),
        ),
    }
}

/// ログシステムを初期化する
///
/// # 引数
/// * `verbosity` - `-v`の指定回数。指定があれば環境設定より優先する
///
/// # 処理内容
/// 1. 環境設定を取得
/// 2. ログレベルを設定
/// 3. env_loggerを初期化（出力先は標準エラー）
pub fn initialize_logging_system(verbosity: u8) {
    let env_config = EnvironmentConfig::from_env();

    let log_level = match verbosity {
        0 => env_config.level_filter(),
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();

    log::debug!(
        "ログシステムを初期化しました: level={log_level}, environment={}",
        env_config.environment
    );
}
