use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceRow {
    pub id: i32,
    pub profile_id: i32,
    pub position: Option<String>,
    pub company: Option<String>,
    pub company_location: Option<String>,
    pub company_email: Option<String>,
    pub company_website: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duties: Option<String>,
    pub visible: bool,
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseRow {
    pub id: i32,
    pub profile_id: i32,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_hours: Option<i32>,
    pub description: Option<String>,
    pub sponsor: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub sponsor_email: Option<String>,
    pub visible: bool,
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecognitionRow {
    pub id: i32,
    pub profile_id: i32,
    /// One of the [`RecognitionKind`] labels.
    pub kind: Option<String>,
    pub awarded_on: Option<NaiveDate>,
    pub description: Option<String>,
    pub sponsor: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub visible: bool,
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcademicProductRow {
    pub id: i32,
    pub profile_id: i32,
    pub name: Option<String>,
    pub classifier: Option<String>,
    pub description: Option<String>,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkProductRow {
    pub id: i32,
    pub profile_id: i32,
    pub name: Option<String>,
    pub produced_on: Option<NaiveDate>,
    pub description: Option<String>,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecognitionKind {
    #[serde(rename = "Académico")]
    Academic,
    #[serde(rename = "Público")]
    Public,
    #[serde(rename = "Privado")]
    Private,
}

impl RecognitionKind {
    pub const ALL: [RecognitionKind; 3] = [
        RecognitionKind::Academic,
        RecognitionKind::Public,
        RecognitionKind::Private,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RecognitionKind::Academic => "Académico",
            RecognitionKind::Public => "Público",
            RecognitionKind::Private => "Privado",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_kind_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&RecognitionKind::Public).unwrap();
        assert_eq!(json, "\"Público\"");
        let back: RecognitionKind = serde_json::from_str("\"Académico\"").unwrap();
        assert_eq!(back, RecognitionKind::Academic);
    }

    #[test]
    fn test_recognition_kind_from_label_is_exact() {
        assert_eq!(
            RecognitionKind::from_label("Privado"),
            Some(RecognitionKind::Private)
        );
        assert_eq!(RecognitionKind::from_label("privado"), None);
    }
}
