use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, Local, NaiveDate};

/// 日付の保存・入力形式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 日付文字列を解析する
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 解析された日付、または無効な場合はエラー
///
/// # バリデーション規則
/// - YYYY-MM-DD形式であること
/// - 実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn parse_date(date_str: &str) -> AppResult<NaiveDate> {
    let date_str = date_str.trim();

    if date_str.len() != 10
        || date_str.chars().nth(4) != Some('-')
        || date_str.chars().nth(7) != Some('-')
    {
        return Err(AppError::validation(format!(
            "日付はYYYY-MM-DD形式で入力してください（受信: '{date_str}'）"
        )));
    }

    let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("無効な日付です: {date_str}")))?;

    if !(1900..=2100).contains(&date.year()) {
        return Err(AppError::validation(
            "日付は1900年から2100年の間で入力してください",
        ));
    }

    Ok(date)
}

/// 金額のバリデーション
///
/// # バリデーション規則
/// - 0以上であること（無料枠のサブスクリプションも登録できる）
/// - 有限の数値であること
pub fn validate_cost(cost: f64) -> AppResult<()> {
    if !cost.is_finite() {
        return Err(AppError::validation("無効な金額です"));
    }

    if cost < 0.0 {
        return Err(AppError::validation("金額は0以上で入力してください"));
    }

    Ok(())
}

/// 文字列の長さバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `max_length` - 最大文字数
/// * `field_name` - フィールド名（エラーメッセージ用）
pub fn validate_text_length(text: &str, max_length: usize, field_name: &str) -> AppResult<()> {
    let char_count = text.chars().count();
    if char_count > max_length {
        return Err(AppError::validation(format!(
            "{field_name}は{max_length}文字以内で入力してください（現在: {char_count}文字）"
        )));
    }
    Ok(())
}

/// 必須フィールドのバリデーション
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(format!("{field_name}は必須項目です")));
    }
    Ok(())
}

/// 今日の日付をローカルタイムゾーン基準で取得
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// 金額を表示用に整形する
///
/// 小数点以下が0なら整数で、それ以外は2桁で表示する。
pub fn format_cost(cost: f64) -> String {
    if cost.fract() == 0.0 {
        format!("{cost:.0}")
    } else {
        format!("{cost:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            parse_date(" 2024-01-05 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        // 形式違い
        assert!(parse_date("2024/01/05").is_err());
        assert!(parse_date("2024-1-5").is_err());
        // 実在しない日付
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("2024-13-01").is_err());
        // 範囲外
        assert!(parse_date("1899-12-31").is_err());
    }

    #[test]
    fn test_validate_cost() {
        assert!(validate_cost(0.0).is_ok());
        assert!(validate_cost(15.99).is_ok());
        assert!(validate_cost(-1.0).is_err());
        assert!(validate_cost(f64::NAN).is_err());
        assert!(validate_cost(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_text_length() {
        assert!(validate_text_length("Netflix", 100, "サービス名").is_ok());
        let long_name = "あ".repeat(101);
        assert!(validate_text_length(&long_name, 100, "サービス名").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        assert!(validate_required_field("Spotify", "サービス名").is_ok());
        assert!(validate_required_field("   ", "サービス名").is_err());
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(10.0), "10");
        assert_eq!(format_cost(9.99), "9.99");
        assert_eq!(format_cost(9.5), "9.50");
    }
}
