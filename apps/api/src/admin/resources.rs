//! Admin-editable resources: the JSON payload for each table, how it is
//! validated and which columns it writes.

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres};

use super::validation::Checks;
use crate::errors::AppError;
use crate::models::career::{
    AcademicProductRow, CourseRow, ExperienceRow, RecognitionKind, RecognitionRow, WorkProductRow,
};
use crate::models::garage::{Availability, GarageItemRow, ItemCondition};
use crate::models::profile::ProfileRow;

pub type Values<'qb, 'args> = Separated<'qb, 'args, Postgres, &'static str>;

pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    type Row: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin + 'static;

    const TABLE: &'static str;
    /// Used in error messages.
    const NAME: &'static str;
    /// Written columns, in the order [`Resource::bind_values`] binds them.
    const COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str = "id";

    fn validate(&self, today: NaiveDate) -> Result<(), AppError>;

    fn bind_values(&self, values: &mut Values<'_, '_>);

    /// Called before insert with the active profile's id, for resources that
    /// may be created without naming a profile.
    fn assign_default_profile(&mut self, _profile_id: i32) {}

    fn needs_default_profile(&self) -> bool {
        false
    }
}

fn default_true() -> bool {
    true
}

fn default_active() -> i32 {
    1
}

fn default_availability() -> String {
    Availability::Available.label().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ProfilePayload {
    pub description: String,
    #[serde(default = "default_active")]
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
    pub skills: Option<String>,
    pub interests: Option<String>,
}

impl Resource for ProfilePayload {
    type Row = ProfileRow;
    const TABLE: &'static str = "profiles";
    const NAME: &'static str = "Profile";
    const COLUMNS: &'static [&'static str] = &[
        "description",
        "active",
        "last_names",
        "first_names",
        "nationality",
        "birthplace",
        "birth_date",
        "id_number",
        "sex",
        "marital_status",
        "driving_license",
        "landline_phone",
        "phone",
        "work_address",
        "home_address",
        "website",
        "skills",
        "interests",
    ];

    fn validate(&self, today: NaiveDate) -> Result<(), AppError> {
        let mut checks = Checks::new();
        for (field, value, max) in [
            ("description", &self.description, 50),
            ("last_names", &self.last_names, 60),
            ("first_names", &self.first_names, 60),
            ("nationality", &self.nationality, 20),
            ("birthplace", &self.birthplace, 60),
            ("id_number", &self.id_number, 10),
            ("marital_status", &self.marital_status, 50),
            ("driving_license", &self.driving_license, 6),
            ("landline_phone", &self.landline_phone, 15),
            ("phone", &self.phone, 15),
            ("work_address", &self.work_address, 50),
            ("home_address", &self.home_address, 50),
            ("website", &self.website, 60),
        ] {
            checks.required(field, value);
            checks.max_len(field, value, max);
        }
        checks.one_of("sex", Some(self.sex.as_str()), &["H", "M"]);
        checks.birth_date(self.birth_date, today);
        checks.finish()
    }

    fn bind_values(&self, values: &mut Values<'_, '_>) {
        values.push_bind(self.description.clone());
        values.push_bind(self.active);
        values.push_bind(self.last_names.clone());
        values.push_bind(self.first_names.clone());
        values.push_bind(self.nationality.clone());
        values.push_bind(self.birthplace.clone());
        values.push_bind(self.birth_date);
        values.push_bind(self.id_number.clone());
        values.push_bind(self.sex.clone());
        values.push_bind(self.marital_status.clone());
        values.push_bind(self.driving_license.clone());
        values.push_bind(self.landline_phone.clone());
        values.push_bind(self.phone.clone());
        values.push_bind(self.work_address.clone());
        values.push_bind(self.home_address.clone());
        values.push_bind(self.website.clone());
        values.push_bind(self.skills.clone());
        values.push_bind(self.interests.clone());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Career records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ExperiencePayload {
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
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Resource for ExperiencePayload {
    type Row = ExperienceRow;
    const TABLE: &'static str = "experiences";
    const NAME: &'static str = "Experience";
    const COLUMNS: &'static [&'static str] = &[
        "profile_id",
        "position",
        "company",
        "company_location",
        "company_email",
        "company_website",
        "contact_name",
        "contact_phone",
        "start_date",
        "end_date",
        "duties",
        "visible",
    ];

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let mut checks = Checks::new();
        checks.max_len_opt("position", self.position.as_deref(), 100);
        checks.max_len_opt("company", self.company.as_deref(), 50);
        checks.max_len_opt("company_location", self.company_location.as_deref(), 50);
        checks.max_len_opt("company_email", self.company_email.as_deref(), 100);
        checks.max_len_opt("company_website", self.company_website.as_deref(), 100);
        checks.max_len_opt("contact_name", self.contact_name.as_deref(), 100);
        checks.max_len_opt("contact_phone", self.contact_phone.as_deref(), 60);
        checks.max_len_opt("duties", self.duties.as_deref(), 100);
        checks.date_in_range("start_date", self.start_date);
        checks.date_in_range("end_date", self.end_date);
        checks.date_order(self.start_date, self.end_date);
        checks.finish()
    }

    fn bind_values(&self, values: &mut Values<'_, '_>) {
        values.push_bind(self.profile_id);
        values.push_bind(self.position.clone());
        values.push_bind(self.company.clone());
        values.push_bind(self.company_location.clone());
        values.push_bind(self.company_email.clone());
        values.push_bind(self.company_website.clone());
        values.push_bind(self.contact_name.clone());
        values.push_bind(self.contact_phone.clone());
        values.push_bind(self.start_date);
        values.push_bind(self.end_date);
        values.push_bind(self.duties.clone());
        values.push_bind(self.visible);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoursePayload {
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
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Resource for CoursePayload {
    type Row = CourseRow;
    const TABLE: &'static str = "courses";
    const NAME: &'static str = "Course";
    const COLUMNS: &'static [&'static str] = &[
        "profile_id",
        "name",
        "start_date",
        "end_date",
        "total_hours",
        "description",
        "sponsor",
        "contact_name",
        "contact_phone",
        "sponsor_email",
        "visible",
    ];

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let mut checks = Checks::new();
        checks.max_len_opt("name", self.name.as_deref(), 100);
        checks.max_len_opt("description", self.description.as_deref(), 100);
        checks.max_len_opt("sponsor", self.sponsor.as_deref(), 100);
        checks.max_len_opt("contact_name", self.contact_name.as_deref(), 100);
        checks.max_len_opt("contact_phone", self.contact_phone.as_deref(), 60);
        checks.max_len_opt("sponsor_email", self.sponsor_email.as_deref(), 60);
        checks.min_value("total_hours", self.total_hours, 1);
        checks.date_in_range("start_date", self.start_date);
        checks.date_in_range("end_date", self.end_date);
        checks.date_order(self.start_date, self.end_date);
        checks.finish()
    }

    fn bind_values(&self, values: &mut Values<'_, '_>) {
        values.push_bind(self.profile_id);
        values.push_bind(self.name.clone());
        values.push_bind(self.start_date);
        values.push_bind(self.end_date);
        values.push_bind(self.total_hours);
        values.push_bind(self.description.clone());
        values.push_bind(self.sponsor.clone());
        values.push_bind(self.contact_name.clone());
        values.push_bind(self.contact_phone.clone());
        values.push_bind(self.sponsor_email.clone());
        values.push_bind(self.visible);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionPayload {
    pub profile_id: i32,
    pub kind: Option<String>,
    pub awarded_on: Option<NaiveDate>,
    pub description: Option<String>,
    pub sponsor: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Resource for RecognitionPayload {
    type Row = RecognitionRow;
    const TABLE: &'static str = "recognitions";
    const NAME: &'static str = "Recognition";
    const COLUMNS: &'static [&'static str] = &[
        "profile_id",
        "kind",
        "awarded_on",
        "description",
        "sponsor",
        "contact_name",
        "contact_phone",
        "visible",
    ];

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let labels: Vec<&str> = RecognitionKind::ALL.iter().map(|k| k.label()).collect();
        let mut checks = Checks::new();
        checks.one_of("kind", self.kind.as_deref(), &labels);
        checks.max_len_opt("description", self.description.as_deref(), 100);
        checks.max_len_opt("sponsor", self.sponsor.as_deref(), 100);
        checks.max_len_opt("contact_name", self.contact_name.as_deref(), 100);
        checks.max_len_opt("contact_phone", self.contact_phone.as_deref(), 60);
        checks.date_in_range("awarded_on", self.awarded_on);
        checks.finish()
    }

    fn bind_values(&self, values: &mut Values<'_, '_>) {
        values.push_bind(self.profile_id);
        values.push_bind(self.kind.clone());
        values.push_bind(self.awarded_on);
        values.push_bind(self.description.clone());
        values.push_bind(self.sponsor.clone());
        values.push_bind(self.contact_name.clone());
        values.push_bind(self.contact_phone.clone());
        values.push_bind(self.visible);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcademicProductPayload {
    pub profile_id: i32,
    pub name: Option<String>,
    pub classifier: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Resource for AcademicProductPayload {
    type Row = AcademicProductRow;
    const TABLE: &'static str = "academic_products";
    const NAME: &'static str = "Academic product";
    const COLUMNS: &'static [&'static str] =
        &["profile_id", "name", "classifier", "description", "visible"];

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let mut checks = Checks::new();
        checks.max_len_opt("name", self.name.as_deref(), 100);
        checks.max_len_opt("classifier", self.classifier.as_deref(), 100);
        checks.max_len_opt("description", self.description.as_deref(), 100);
        checks.finish()
    }

    fn bind_values(&self, values: &mut Values<'_, '_>) {
        values.push_bind(self.profile_id);
        values.push_bind(self.name.clone());
        values.push_bind(self.classifier.clone());
        values.push_bind(self.description.clone());
        values.push_bind(self.visible);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkProductPayload {
    pub profile_id: i32,
    pub name: Option<String>,
    pub produced_on: Option<NaiveDate>,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Resource for WorkProductPayload {
    type Row = WorkProductRow;
    const TABLE: &'static str = "work_products";
    const NAME: &'static str = "Work product";
    const COLUMNS: &'static [&'static str] =
        &["profile_id", "name", "produced_on", "description", "visible"];
    const ORDER_BY: &'static str = "produced_on DESC NULLS LAST, id";

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let mut checks = Checks::new();
        checks.max_len_opt("name", self.name.as_deref(), 100);
        checks.max_len_opt("description", self.description.as_deref(), 100);
        checks.date_in_range("produced_on", self.produced_on);
        checks.finish()
    }

    fn bind_values(&self, values: &mut Values<'_, '_>) {
        values.push_bind(self.profile_id);
        values.push_bind(self.name.clone());
        values.push_bind(self.produced_on);
        values.push_bind(self.description.clone());
        values.push_bind(self.visible);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Garage sale
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GarageItemPayload {
    /// Defaults to the active profile.
    pub profile_id: Option<i32>,
    pub name: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i32>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_availability")]
    pub availability: String,
    pub published_on: Option<NaiveDate>,
}

impl Resource for GarageItemPayload {
    type Row = GarageItemRow;
    const TABLE: &'static str = "garage_items";
    const NAME: &'static str = "Garage item";
    const COLUMNS: &'static [&'static str] = &[
        "profile_id",
        "name",
        "condition",
        "description",
        "price_cents",
        "visible",
        "availability",
        "published_on",
    ];
    const ORDER_BY: &'static str = "name, id";

    fn validate(&self, _today: NaiveDate) -> Result<(), AppError> {
        let mut checks = Checks::new();
        if self.profile_id.is_none() {
            checks.fail("profile_id is required when no profile is active");
        }
        checks.max_len_opt("name", self.name.as_deref(), 100);
        checks.max_len_opt("description", self.description.as_deref(), 100);
        checks.one_of(
            "condition",
            self.condition.as_deref(),
            &[ItemCondition::Good.label(), ItemCondition::Fair.label()],
        );
        checks.one_of(
            "availability",
            Some(self.availability.as_str()),
            &[Availability::Available.label(), Availability::Sold.label()],
        );
        checks.price(self.price_cents);
        checks.date_in_range("published_on", self.published_on);
        checks.finish()
    }

    fn bind_values(&self, values: &mut Values<'_, '_>) {
        values.push_bind(self.profile_id);
        values.push_bind(self.name.clone());
        values.push_bind(self.condition.clone());
        values.push_bind(self.description.clone());
        values.push_bind(self.price_cents);
        values.push_bind(self.visible);
        values.push_bind(self.availability.clone());
        values.push_bind(self.published_on);
    }

    fn assign_default_profile(&mut self, profile_id: i32) {
        self.profile_id.get_or_insert(profile_id);
    }

    fn needs_default_profile(&self) -> bool {
        self.profile_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn validation_message(result: Result<(), AppError>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn profile_json() -> serde_json::Value {
        json!({
            "description": "Desarrolladora",
            "last_names": "Mendoza Ruiz",
            "first_names": "Ana",
            "nationality": "Ecuatoriana",
            "birthplace": "Manta",
            "birth_date": "1990-05-17",
            "id_number": "1312345678",
            "sex": "M",
            "marital_status": "Soltera",
            "driving_license": "B",
            "landline_phone": "052123456",
            "phone": "0991234567",
            "work_address": "Av. 4 de Noviembre",
            "home_address": "Calle 13",
            "website": "https://ana.example"
        })
    }

    #[test]
    fn test_valid_profile_defaults_to_active() {
        let payload: ProfilePayload = serde_json::from_value(profile_json()).unwrap();
        assert_eq!(payload.active, 1);
        assert!(payload.validate(today()).is_ok());
    }

    #[test]
    fn test_profile_rejects_bad_sex_and_long_id() {
        let mut value = profile_json();
        value["sex"] = json!("X");
        value["id_number"] = json!("13123456789");
        let payload: ProfilePayload = serde_json::from_value(value).unwrap();
        let msg = validation_message(payload.validate(today()));
        assert!(msg.contains("sex must be one of: H, M"));
        assert!(msg.contains("id_number must be at most 10"));
    }

    #[test]
    fn test_columns_match_bound_values() {
        fn bound<R: Resource>(payload: &R) -> usize {
            let mut qb = sqlx::QueryBuilder::<Postgres>::new("SELECT ");
            {
                let mut values = qb.separated(", ");
                payload.bind_values(&mut values);
            }
            qb.sql().matches('$').count()
        }

        let profile: ProfilePayload = serde_json::from_value(profile_json()).unwrap();
        assert_eq!(bound(&profile), ProfilePayload::COLUMNS.len());

        let course: CoursePayload = serde_json::from_value(json!({"profile_id": 1})).unwrap();
        assert_eq!(bound(&course), CoursePayload::COLUMNS.len());

        let item: GarageItemPayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(bound(&item), GarageItemPayload::COLUMNS.len());

        let experience: ExperiencePayload = serde_json::from_value(json!({"profile_id": 1})).unwrap();
        assert_eq!(bound(&experience), ExperiencePayload::COLUMNS.len());

        let recognition: RecognitionPayload = serde_json::from_value(json!({"profile_id": 1})).unwrap();
        assert_eq!(bound(&recognition), RecognitionPayload::COLUMNS.len());

        let academic: AcademicProductPayload = serde_json::from_value(json!({"profile_id": 1})).unwrap();
        assert_eq!(bound(&academic), AcademicProductPayload::COLUMNS.len());

        let work: WorkProductPayload = serde_json::from_value(json!({"profile_id": 1})).unwrap();
        assert_eq!(bound(&work), WorkProductPayload::COLUMNS.len());
    }

    #[test]
    fn test_course_hours_and_dates() {
        let payload: CoursePayload = serde_json::from_value(json!({
            "profile_id": 1,
            "total_hours": 0,
            "start_date": "2024-05-01",
            "end_date": "2024-04-01"
        }))
        .unwrap();
        let msg = validation_message(payload.validate(today()));
        assert!(msg.contains("total_hours must be at least 1"));
        assert!(msg.contains("start_date must not be after end_date"));
    }

    #[test]
    fn test_recognition_kind_must_be_a_label() {
        let payload: RecognitionPayload =
            serde_json::from_value(json!({"profile_id": 1, "kind": "Deportivo"})).unwrap();
        assert!(payload.validate(today()).is_err());

        let payload: RecognitionPayload =
            serde_json::from_value(json!({"profile_id": 1, "kind": "Público"})).unwrap();
        assert!(payload.validate(today()).is_ok());
    }

    #[test]
    fn test_garage_item_defaults_and_profile() {
        let mut payload: GarageItemPayload =
            serde_json::from_value(json!({"name": "Bicicleta", "price_cents": 4500})).unwrap();
        assert_eq!(payload.availability, "Disponible");
        assert!(payload.visible);
        assert!(payload.needs_default_profile());
        assert!(payload.validate(today()).is_err());

        payload.assign_default_profile(3);
        assert_eq!(payload.profile_id, Some(3));
        assert!(payload.validate(today()).is_ok());
    }

    #[test]
    fn test_garage_item_price_and_labels() {
        let payload: GarageItemPayload = serde_json::from_value(json!({
            "profile_id": 1,
            "price_cents": 100000,
            "condition": "Malo",
            "availability": "Reservado"
        }))
        .unwrap();
        let msg = validation_message(payload.validate(today()));
        assert!(msg.contains("price_cents"));
        assert!(msg.contains("condition must be one of"));
        assert!(msg.contains("availability must be one of"));
    }
}
