use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use crate::cv::assemble::CvSource;
use crate::cv::visibility::load_visibility;
use crate::models::career::{
    AcademicProductRow, CourseRow, ExperienceRow, RecognitionRow, WorkProductRow,
};
use crate::models::profile::ProfileRow;

/// The first profile marked active, if any.
pub async fn load_active_profile(pool: &PgPool) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE active = 1 ORDER BY id LIMIT 1")
        .fetch_optional(pool)
        .await
}

/// The active profile, creating a placeholder one when the table has none.
pub async fn ensure_active_profile(pool: &PgPool) -> Result<ProfileRow, sqlx::Error> {
    if let Some(profile) = load_active_profile(pool).await? {
        return Ok(profile);
    }

    let created = sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles
            (description, active, last_names, first_names, nationality, birthplace,
             birth_date, id_number, sex, marital_status, driving_license,
             landline_phone, phone, work_address, home_address, website)
        VALUES ('Perfil por defecto', 1, 'Predeterminado', 'Perfil', 'Colombia', 'Bogotá',
                $1, '1234567890', 'H', 'Soltero', 'B1',
                '6012345678', '3001234567', 'Calle 123', 'Carrera 456', 'https://example.com')
        ON CONFLICT (id_number) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Utc::now().date_naive())
    .fetch_optional(pool)
    .await?;

    match created {
        Some(profile) => {
            info!("Created placeholder profile {}", profile.id);
            Ok(profile)
        }
        // Placeholder id number already taken by an inactive profile: reactivate it.
        None => {
            sqlx::query_as::<_, ProfileRow>(
                "UPDATE profiles SET active = 1 WHERE id_number = '1234567890' RETURNING *",
            )
            .fetch_one(pool)
            .await
        }
    }
}

/// Loads every record of the profile, hidden ones included.
pub async fn load_cv_source(pool: &PgPool, profile: ProfileRow) -> Result<CvSource, sqlx::Error> {
    let id = profile.id;
    let visibility = load_visibility(pool, id).await?;

    let experiences = sqlx::query_as::<_, ExperienceRow>(
        "SELECT * FROM experiences WHERE profile_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let courses =
        sqlx::query_as::<_, CourseRow>("SELECT * FROM courses WHERE profile_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(pool)
            .await?;

    let recognitions = sqlx::query_as::<_, RecognitionRow>(
        "SELECT * FROM recognitions WHERE profile_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let academic_products = sqlx::query_as::<_, AcademicProductRow>(
        "SELECT * FROM academic_products WHERE profile_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let work_products = sqlx::query_as::<_, WorkProductRow>(
        "SELECT * FROM work_products WHERE profile_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(CvSource {
        profile,
        visibility,
        experiences,
        courses,
        recognitions,
        academic_products,
        work_products,
    })
}
