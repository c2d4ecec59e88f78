use crate::shared::config::{get_environment, Environment};
use crate::shared::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// データファイルのパスを指定する環境変数名
pub const DATA_FILE_ENV: &str = "SUBSCRIPTIONS_FILE";

/// ホームディレクトリ直下に置く既定のデータファイル名
pub const DEFAULT_DATA_FILENAME: &str = ".subscriptions.json";

/// アプリケーション初期化の結果を表す構造体
#[derive(Debug)]
pub struct InitializationResult {
    /// 初回起動かどうか（データファイルがまだ存在しない）
    pub is_first_run: bool,
    /// サブスクリプションを保存するファイルのパス
    pub data_file: PathBuf,
    /// 実行環境
    pub environment: Environment,
}

/// アプリケーションの初期化を実行する
///
/// # 引数
/// * `data_file_override` - `--data-file`で指定されたパス
///
/// # 戻り値
/// 初期化結果、または失敗時はエラー
///
/// # 処理内容
/// 1. データファイルの場所を決定（引数 > 環境変数 > ホームディレクトリ）
/// 2. 初回起動の判定
pub fn initialize_application(
    data_file_override: Option<PathBuf>,
) -> AppResult<InitializationResult> {
    let environment = get_environment();
    let env_value = std::env::var(DATA_FILE_ENV).ok();
    let data_file = resolve_data_file(data_file_override, env_value, dirs::home_dir())?;

    let is_first_run = !data_file.exists();
    if is_first_run {
        log_first_run_initialization(&environment, &data_file);
    }

    Ok(InitializationResult {
        is_first_run,
        data_file,
        environment,
    })
}

/// データファイルのパスを決定する
///
/// # 引数
/// * `cli_path` - コマンドライン引数で指定されたパス
/// * `env_path` - 環境変数`SUBSCRIPTIONS_FILE`の値
/// * `home_dir` - ホームディレクトリ
///
/// # 戻り値
/// 使用するパス、またはどれも決定できない場合は設定エラー
pub fn resolve_data_file(
    cli_path: Option<PathBuf>,
    env_path: Option<String>,
    home_dir: Option<PathBuf>,
) -> AppResult<PathBuf> {
    if let Some(path) = cli_path {
        log::debug!("データファイル: 引数で指定されたパスを使用 -> {}", path.display());
        return Ok(path);
    }

    if let Some(path) = env_path.filter(|p| !p.trim().is_empty()) {
        log::debug!("データファイル: {DATA_FILE_ENV} を使用 -> {path}");
        return Ok(PathBuf::from(path));
    }

    home_dir
        .map(|home| home.join(DEFAULT_DATA_FILENAME))
        .ok_or_else(|| {
            AppError::configuration(format!(
                "ホームディレクトリを取得できません。--data-file または {DATA_FILE_ENV} を指定してください"
            ))
        })
}

/// 初回起動時の初期化ログを出力する
fn log_first_run_initialization(environment: &Environment, data_file: &Path) {
    log::info!("=== 初回起動 ===");
    log::info!("実行環境: {environment:?}");
    log::info!("データファイル: {} （未作成）", data_file.display());
}

/// 初期化完了ログを出力する
///
/// # 引数
/// * `result` - 初期化結果
pub fn log_initialization_complete(result: &InitializationResult) {
    if result.is_first_run {
        log::debug!("データファイルは最初の保存時に作成されます");
    }
    log::debug!("環境: {:?}", result.environment);
    log::debug!("データファイル: {}", result.data_file.display());
}
