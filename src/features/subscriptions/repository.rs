use super::models::{CreateSubscriptionDto, Subscription, UpdateSubscriptionDto};
use super::renewal;
use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// サブスクリプション一覧を保存するJSONファイル
///
/// 読み込みは常にファイル全体、保存は常にファイル全体の上書き。
#[derive(Debug, Clone)]
pub struct SubscriptionFile {
    path: PathBuf,
}

impl SubscriptionFile {
    /// 保存先のパスを指定して作成する
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 保存先のパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 全件を読み込む
    ///
    /// # 戻り値
    /// サブスクリプションのリスト。ファイルが無い場合は空のリスト。
    /// 内容が壊れている場合はエラー（部分的な読み込みはしない）。
    pub fn load(&self) -> AppResult<Vec<Subscription>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!(
                    "データファイルが無いため空の一覧として扱います: {}",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let subscriptions: Vec<Subscription> = serde_json::from_str(&content).map_err(|e| {
            AppError::storage(format!(
                "{} の内容を解釈できません: {e}",
                self.path.display()
            ))
        })?;

        log::debug!(
            "{} 件のサブスクリプションを読み込みました: {}",
            subscriptions.len(),
            self.path.display()
        );
        Ok(subscriptions)
    }

    /// 全件を保存する
    ///
    /// # 引数
    /// * `subscriptions` - 保存するサブスクリプションのリスト
    pub fn save(&self, subscriptions: &[Subscription]) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                log::debug!("ディレクトリを作成しました: {}", parent.display());
            }
        }

        let content = serde_json::to_string_pretty(subscriptions)?;
        fs::write(&self.path, content)?;

        log::debug!(
            "{} 件のサブスクリプションを保存しました: {}",
            subscriptions.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// サブスクリプションを追加する
///
/// 同名のサブスクリプションがあっても追加する（重複チェックはしない）。
///
/// # 引数
/// * `file` - データファイル
/// * `dto` - サブスクリプション作成用DTO
///
/// # 戻り値
/// 追加されたサブスクリプション、または失敗時はエラー
pub fn create(file: &SubscriptionFile, dto: CreateSubscriptionDto) -> AppResult<Subscription> {
    let mut subscriptions = file.load()?;

    if subscriptions.iter().any(|sub| sub.matches_name(&dto.name)) {
        log::warn!("同じ名前のサブスクリプションが既に登録されています: {}", dto.name);
    }

    let subscription = Subscription::new(dto);
    subscriptions.push(subscription.clone());
    file.save(&subscriptions)?;

    log::info!("サブスクリプションを追加しました: {}", subscription.name);
    Ok(subscription)
}

/// サブスクリプション一覧を取得する
///
/// # 引数
/// * `file` - データファイル
/// * `active_only` - 有効なサブスクリプションのみを取得するか
pub fn find_all(file: &SubscriptionFile, active_only: bool) -> AppResult<Vec<Subscription>> {
    let subscriptions = file.load()?;

    Ok(subscriptions
        .into_iter()
        .filter(|sub| !active_only || sub.is_active())
        .collect())
}

/// サブスクリプションを更新する
///
/// 名前が一致する最初の1件だけを更新する。DTOで指定されたフィールドのみ上書きし、
/// `bump`が指定されていれば最後に更新日を1サイクル進める。
///
/// # 引数
/// * `file` - データファイル
/// * `name` - サブスクリプション名（大文字小文字を区別しない）
/// * `dto` - サブスクリプション更新用DTO
///
/// # 戻り値
/// 更新されたサブスクリプション、見つからない場合は`AppError::NotFound`
pub fn update(
    file: &SubscriptionFile,
    name: &str,
    dto: UpdateSubscriptionDto,
) -> AppResult<Subscription> {
    let mut subscriptions = file.load()?;

    let existing = subscriptions
        .iter_mut()
        .find(|sub| sub.matches_name(name))
        .ok_or_else(|| AppError::not_found(format!("サブスクリプション '{name}' ")))?;

    if let Some(cost) = dto.cost {
        existing.cost = cost;
    }
    if let Some(renewal_date) = dto.renewal_date {
        existing.renewal_date = renewal_date;
    }
    if let Some(interval) = dto.interval {
        existing.interval = interval;
    }
    if let Some(active) = dto.active {
        existing.active = Some(active);
    }
    if let Some(remind_days_before) = dto.remind_days_before {
        existing.remind_days_before = remind_days_before;
    }
    if dto.bump {
        existing.renewal_date =
            renewal::advance_one_cycle(existing.renewal_date, existing.interval)?;
    }

    let updated = existing.clone();
    file.save(&subscriptions)?;

    log::info!("サブスクリプションを更新しました: {}", updated.name);
    Ok(updated)
}

/// サブスクリプションを削除する
///
/// 名前が一致するものをすべて削除する。
///
/// # 戻り値
/// 削除した件数、1件も無かった場合は`AppError::NotFound`（ファイルは変更しない）
pub fn delete(file: &SubscriptionFile, name: &str) -> AppResult<usize> {
    let subscriptions = file.load()?;
    let original_count = subscriptions.len();

    let remaining: Vec<Subscription> = subscriptions
        .into_iter()
        .filter(|sub| !sub.matches_name(name))
        .collect();

    let removed = original_count - remaining.len();
    if removed == 0 {
        return Err(AppError::not_found(format!("サブスクリプション '{name}' ")));
    }

    file.save(&remaining)?;

    log::info!("サブスクリプションを削除しました: {name}（{removed} 件）");
    Ok(removed)
}

/// 有効なサブスクリプションの月額合計を計算する
///
/// 年額のものは12で割って月額に換算する。
pub fn calculate_monthly_total(file: &SubscriptionFile) -> AppResult<f64> {
    let subscriptions = find_all(file, true)?;

    Ok(subscriptions.iter().map(Subscription::monthly_cost).sum())
}
