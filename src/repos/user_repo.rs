/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - email を自然キーとして lookup / create を提供
 * - DB エラーは RepoError に変換して返す
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    pub email: String,
    #[sqlx(rename = "firstName")]
    pub first_name: Option<String>,
    #[sqlx(rename = "lastName")]
    pub last_name: Option<String>,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT "userId", email, "firstName", "lastName", "createdAt"
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(db: &PgPool, user: NewUser<'_>) -> Result<UserRow, RepoError> {
    // A concurrent sign-in for the same email wins the race; return the stored row.
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, "firstName", "lastName")
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING "userId", email, "firstName", "lastName", "createdAt"
        "#,
    )
    .bind(user.email)
    .bind(user.first_name)
    .bind(user.last_name)
    .fetch_one(db)
    .await?;

    Ok(row)
}
