//! Which CV sections are shown.
//!
//! Two sources decide it: the admin flags stored per profile, and, for the
//! personalised downloads, the sections a visitor ticks in the selector form.
//! A section is rendered only when both allow it.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::models::profile::VisibilityRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    PersonalData,
    Experiences,
    Courses,
    Recognitions,
    AcademicProducts,
    WorkProducts,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::PersonalData,
        Section::Experiences,
        Section::Courses,
        Section::Recognitions,
        Section::AcademicProducts,
        Section::WorkProducts,
    ];

    /// Query-string key used by the section selector form.
    pub fn query_key(&self) -> &'static str {
        match self {
            Section::PersonalData => "datos_personales",
            Section::Experiences => "experiencias_laborales",
            Section::Courses => "cursos",
            Section::Recognitions => "reconocimientos",
            Section::AcademicProducts => "productos_academicos",
            Section::WorkProducts => "productos_laborales",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::PersonalData => "Datos personales",
            Section::Experiences => "Experiencia laboral",
            Section::Courses => "Cursos realizados",
            Section::Recognitions => "Reconocimientos",
            Section::AcademicProducts => "Productos académicos",
            Section::WorkProducts => "Productos laborales",
        }
    }
}

/// A set of enabled sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSet {
    pub personal_data: bool,
    pub experiences: bool,
    pub courses: bool,
    pub recognitions: bool,
    pub academic_products: bool,
    pub work_products: bool,
}

impl SectionSet {
    pub fn all() -> Self {
        Self {
            personal_data: true,
            experiences: true,
            courses: true,
            recognitions: true,
            academic_products: true,
            work_products: true,
        }
    }

    pub fn none() -> Self {
        Self {
            personal_data: false,
            experiences: false,
            courses: false,
            recognitions: false,
            academic_products: false,
            work_products: false,
        }
    }

    pub fn includes(&self, section: Section) -> bool {
        match section {
            Section::PersonalData => self.personal_data,
            Section::Experiences => self.experiences,
            Section::Courses => self.courses,
            Section::Recognitions => self.recognitions,
            Section::AcademicProducts => self.academic_products,
            Section::WorkProducts => self.work_products,
        }
    }

    pub fn set(&mut self, section: Section, on: bool) {
        let slot = match section {
            Section::PersonalData => &mut self.personal_data,
            Section::Experiences => &mut self.experiences,
            Section::Courses => &mut self.courses,
            Section::Recognitions => &mut self.recognitions,
            Section::AcademicProducts => &mut self.academic_products,
            Section::WorkProducts => &mut self.work_products,
        };
        *slot = on;
    }

    /// Admin flags for a profile. A profile without a stored record shows every
    /// section, and personal data can never be hidden by the admin.
    pub fn from_admin(row: Option<&VisibilityRow>) -> Self {
        let Some(row) = row else {
            return Self::all();
        };
        Self {
            personal_data: true,
            experiences: row.show_experiences,
            courses: row.show_courses,
            recognitions: row.show_recognitions,
            academic_products: row.show_academic_products,
            work_products: row.show_work_products,
        }
    }

    /// Sections ticked in the selector form. Only the literal value `on` counts.
    pub fn from_query(params: &[(String, String)]) -> Self {
        let mut selection = Self::none();
        for section in Section::ALL {
            let ticked = params
                .iter()
                .any(|(key, value)| key == section.query_key() && value == "on");
            selection.set(section, ticked);
        }
        selection
    }

    pub fn intersect(&self, other: &SectionSet) -> SectionSet {
        let mut out = Self::none();
        for section in Section::ALL {
            out.set(section, self.includes(section) && other.includes(section));
        }
        out
    }

    pub fn into_row(self, profile_id: i32) -> VisibilityRow {
        VisibilityRow {
            profile_id,
            show_personal_data: true,
            show_experiences: self.experiences,
            show_courses: self.courses,
            show_recognitions: self.recognitions,
            show_academic_products: self.academic_products,
            show_work_products: self.work_products,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence
// ────────────────────────────────────────────────────────────────────────────

pub async fn load_visibility(
    pool: &PgPool,
    profile_id: i32,
) -> Result<Option<VisibilityRow>, sqlx::Error> {
    sqlx::query_as::<_, VisibilityRow>("SELECT * FROM cv_visibility WHERE profile_id = $1")
        .bind(profile_id)
        .fetch_optional(pool)
        .await
}

/// Upserts the admin flags. `show_personal_data` is always written as true.
pub async fn save_visibility(
    pool: &PgPool,
    profile_id: i32,
    sections: SectionSet,
) -> Result<VisibilityRow, sqlx::Error> {
    let row = sections.into_row(profile_id);
    sqlx::query_as::<_, VisibilityRow>(
        r#"
        INSERT INTO cv_visibility
            (profile_id, show_personal_data, show_experiences, show_courses,
             show_recognitions, show_academic_products, show_work_products)
        VALUES ($1, TRUE, $2, $3, $4, $5, $6)
        ON CONFLICT (profile_id) DO UPDATE SET
            show_personal_data = TRUE,
            show_experiences = EXCLUDED.show_experiences,
            show_courses = EXCLUDED.show_courses,
            show_recognitions = EXCLUDED.show_recognitions,
            show_academic_products = EXCLUDED.show_academic_products,
            show_work_products = EXCLUDED.show_work_products
        RETURNING *
        "#,
    )
    .bind(row.profile_id)
    .bind(row.show_experiences)
    .bind(row.show_courses)
    .bind(row.show_recognitions)
    .bind(row.show_academic_products)
    .bind(row.show_work_products)
    .fetch_one(pool)
    .await
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InitializeReport {
    pub created: u32,
    pub already_existing: u32,
    pub total: u32,
}

/// Creates an all-visible record for every active profile that lacks one.
pub async fn initialize_visibility(pool: &PgPool) -> Result<InitializeReport, sqlx::Error> {
    let profile_ids: Vec<i32> =
        sqlx::query_scalar("SELECT id FROM profiles WHERE active = 1 ORDER BY id")
            .fetch_all(pool)
            .await?;

    let mut report = InitializeReport::default();
    for profile_id in profile_ids {
        let result = sqlx::query(
            "INSERT INTO cv_visibility (profile_id) VALUES ($1) ON CONFLICT (profile_id) DO NOTHING",
        )
        .bind(profile_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 1 {
            info!("Created visibility record for profile {profile_id}");
            report.created += 1;
        } else {
            report.already_existing += 1;
        }
    }
    report.total = report.created + report.already_existing;

    info!(
        "Visibility initialization: {} created, {} already existing",
        report.created, report.already_existing
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::repository::tests::insert_profile;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn admin_row() -> VisibilityRow {
        VisibilityRow {
            profile_id: 1,
            show_personal_data: false,
            show_experiences: true,
            show_courses: false,
            show_recognitions: true,
            show_academic_products: false,
            show_work_products: true,
        }
    }

    #[test]
    fn test_missing_admin_record_shows_everything() {
        assert_eq!(SectionSet::from_admin(None), SectionSet::all());
    }

    #[test]
    fn test_admin_cannot_hide_personal_data() {
        let set = SectionSet::from_admin(Some(&admin_row()));
        assert!(set.personal_data);
        assert!(set.experiences);
        assert!(!set.courses);
        assert!(!set.academic_products);
    }

    #[test]
    fn test_query_requires_literal_on() {
        let set = SectionSet::from_query(&params(&[
            ("cursos", "on"),
            ("reconocimientos", "true"),
            ("experiencias_laborales", "ON"),
            ("productos_laborales", "on"),
        ]));
        assert!(set.courses);
        assert!(set.work_products);
        assert!(!set.recognitions);
        assert!(!set.experiences);
        assert!(!set.personal_data);
    }

    #[test]
    fn test_effective_sections_need_both_admin_and_visitor() {
        let admin = SectionSet::from_admin(Some(&admin_row()));
        let visitor = SectionSet::from_query(&params(&[
            ("datos_personales", "on"),
            ("cursos", "on"),
            ("reconocimientos", "on"),
        ]));
        let effective = visitor.intersect(&admin);
        assert!(effective.personal_data);
        assert!(effective.recognitions);
        // visitor asked, admin hides
        assert!(!effective.courses);
        // admin shows, visitor did not ask
        assert!(!effective.experiences);
        assert!(!effective.work_products);
    }

    #[test]
    fn test_into_row_forces_personal_data() {
        let row = SectionSet::none().into_row(9);
        assert_eq!(row.profile_id, 9);
        assert!(row.show_personal_data);
        assert!(!row.show_courses);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_initialize_counts_created_and_existing(pool: PgPool) {
        let with_record = insert_profile(&pool, "0000000001", 1).await;
        let without_record = insert_profile(&pool, "0000000002", 1).await;
        insert_profile(&pool, "0000000003", 0).await;
        save_visibility(&pool, with_record, SectionSet::none()).await.unwrap();

        let report = initialize_visibility(&pool).await.unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.already_existing, 1);
        assert_eq!(report.total, 2);

        let created = load_visibility(&pool, without_record).await.unwrap().unwrap();
        assert_eq!(SectionSet::from_admin(Some(&created)), SectionSet::all());
        // existing flags are left alone
        let kept = load_visibility(&pool, with_record).await.unwrap().unwrap();
        assert!(!kept.show_courses);

        let again = initialize_visibility(&pool).await.unwrap();
        assert_eq!(again.created, 0);
        assert_eq!(again.already_existing, 2);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL server in DATABASE_URL"]
    async fn test_save_visibility_upserts_with_personal_data_on(pool: PgPool) {
        let profile_id = insert_profile(&pool, "0000000001", 1).await;
        sqlx::query(
            "INSERT INTO cv_visibility (profile_id, show_personal_data, show_courses) VALUES ($1, FALSE, TRUE)",
        )
        .bind(profile_id)
        .execute(&pool)
        .await
        .unwrap();

        let mut sections = SectionSet::all();
        sections.personal_data = false;
        sections.courses = false;
        let saved = save_visibility(&pool, profile_id, sections).await.unwrap();
        assert!(saved.show_personal_data);
        assert!(!saved.show_courses);
        assert!(saved.show_experiences);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cv_visibility")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_query_keys_are_distinct() {
        let keys: std::collections::HashSet<_> =
            Section::ALL.iter().map(|s| s.query_key()).collect();
        assert_eq!(keys.len(), Section::ALL.len());
    }
}
