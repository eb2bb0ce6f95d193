use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Personal data ("datos personales"). The first row with `active = 1` is the
/// one the public site publishes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: i32,
    pub description: String,
    pub active: i32,
    pub last_names: String,
    pub first_names: String,
    pub nationality: String,
    pub birthplace: String,
    pub birth_date: NaiveDate,
    pub id_number: String,
    pub sex: String,
    pub marital_status: String,
    pub driving_license: String,
    pub landline_phone: String,
    pub phone: String,
    pub work_address: String,
    pub home_address: String,
    pub website: String,
    /// Comma-separated list.
    pub skills: Option<String>,
    /// Comma-separated list.
    pub interests: Option<String>,
    pub photo_url: Option<String>,
    pub background_professional_url: Option<String>,
    pub background_modern_url: Option<String>,
}

impl ProfileRow {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names.trim(), self.last_names.trim())
            .trim()
            .to_string()
    }

    pub fn skill_list(&self) -> Vec<String> {
        split_list(self.skills.as_deref())
    }

    pub fn interest_list(&self) -> Vec<String> {
        split_list(self.interests.as_deref())
    }

    pub fn has_photo(&self) -> bool {
        non_empty(self.photo_url.as_deref()).is_some()
    }

    pub fn sex_label(&self) -> &str {
        match self.sex.as_str() {
            "H" => "Hombre",
            "M" => "Mujer",
            other => other,
        }
    }
}

/// `dd/mm/yyyy`, the date format used on every public page.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `start - end`, with an open end shown as "Actualidad".
pub fn format_period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<String> {
    let start = start?;
    let end = end.map(format_date).unwrap_or_else(|| "Actualidad".to_string());
    Some(format!("{} - {}", format_date(start), end))
}

/// Admin-controlled switches for the public CV sections.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VisibilityRow {
    pub profile_id: i32,
    pub show_personal_data: bool,
    pub show_experiences: bool,
    pub show_courses: bool,
    pub show_recognitions: bool,
    pub show_academic_products: bool,
    pub show_work_products: bool,
}

/// Splits a comma-separated field into trimmed, non-empty items.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Returns the trimmed value when it is present and not blank.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_trims_and_drops_empty_items() {
        let items = split_list(Some(" Rust, ,SQL ,  Docker,"));
        assert_eq!(items, vec!["Rust", "SQL", "Docker"]);
    }

    #[test]
    fn test_split_list_none_is_empty() {
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_format_period() {
        let start = NaiveDate::from_ymd_opt(2019, 3, 1);
        let end = NaiveDate::from_ymd_opt(2021, 12, 31);
        assert_eq!(format_period(start, end).as_deref(), Some("01/03/2019 - 31/12/2021"));
        assert_eq!(format_period(start, None).as_deref(), Some("01/03/2019 - Actualidad"));
        assert_eq!(format_period(None, end), None);
    }

    #[test]
    fn test_non_empty_rejects_blank() {
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(Some(" x ")), Some("x"));
        assert_eq!(non_empty(None), None);
    }
}
