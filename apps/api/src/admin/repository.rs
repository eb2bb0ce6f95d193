use sqlx::{PgPool, Postgres, QueryBuilder};

use super::resources::Resource;
use crate::db::{is_foreign_key_violation, is_unique_violation};
use crate::errors::AppError;

pub async fn list<R: Resource>(pool: &PgPool) -> Result<Vec<R::Row>, AppError> {
    let sql = format!("SELECT * FROM {} ORDER BY {}", R::TABLE, R::ORDER_BY);
    Ok(sqlx::query_as::<_, R::Row>(&sql).fetch_all(pool).await?)
}

pub async fn get<R: Resource>(pool: &PgPool, id: i32) -> Result<R::Row, AppError> {
    let sql = format!("SELECT * FROM {} WHERE id = $1", R::TABLE);
    sqlx::query_as::<_, R::Row>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found::<R>(id))
}

pub async fn insert<R: Resource>(pool: &PgPool, payload: &R) -> Result<R::Row, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        R::TABLE,
        R::COLUMNS.join(", ")
    ));
    {
        let mut values = qb.separated(", ");
        payload.bind_values(&mut values);
    }
    qb.push(") RETURNING *");

    qb.build_query_as::<R::Row>()
        .fetch_one(pool)
        .await
        .map_err(write_error)
}

pub async fn update<R: Resource>(pool: &PgPool, id: i32, payload: &R) -> Result<R::Row, AppError> {
    // Row-constructor form so insert and update share the same binding order.
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "UPDATE {} SET ({}) = ROW(",
        R::TABLE,
        R::COLUMNS.join(", ")
    ));
    {
        let mut values = qb.separated(", ");
        payload.bind_values(&mut values);
    }
    qb.push(") WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING *");

    qb.build_query_as::<R::Row>()
        .fetch_optional(pool)
        .await
        .map_err(write_error)?
        .ok_or_else(|| not_found::<R>(id))
}

pub async fn delete<R: Resource>(pool: &PgPool, id: i32) -> Result<(), AppError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", R::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(not_found::<R>(id));
    }
    Ok(())
}

/// Saves an uploaded blob URL on a record.
pub async fn set_url(
    pool: &PgPool,
    table: &str,
    column: &str,
    id: i32,
    url: &str,
) -> Result<bool, AppError> {
    let sql = format!("UPDATE {table} SET {column} = $1 WHERE id = $2");
    let result = sqlx::query(&sql).bind(url).bind(id).execute(pool).await?;
    Ok(result.rows_affected() == 1)
}

pub async fn exists(pool: &PgPool, table: &str, id: i32) -> Result<bool, AppError> {
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
    Ok(sqlx::query_scalar::<_, bool>(&sql).bind(id).fetch_one(pool).await?)
}

fn not_found<R: Resource>(id: i32) -> AppError {
    AppError::NotFound(format!("{} {id} not found", R::NAME))
}

/// Constraint violations are the client's fault; anything else is ours.
fn write_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::Validation("id_number is already registered".to_string())
    } else if is_foreign_key_violation(&err) {
        AppError::Validation("profile_id does not reference an existing profile".to_string())
    } else {
        AppError::Database(err)
    }
}
