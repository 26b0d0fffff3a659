/*
 * Responsibility
 * - notes CRUD (常に所有者 email でスコープする)
 * - "noteId" は内部 PK。外部には "publicId" (UUID) だけを見せる
 * - 一覧系は LIMIT/OFFSET でスライスし、件数は同じ REPEATABLE READ transaction 内で取る
 *   (total と data が別の snapshot を見ないように)
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    #[sqlx(rename = "noteId")]
    pub note_id: i64,

    #[sqlx(rename = "publicId")]
    pub public_id: Uuid,

    #[sqlx(rename = "userEmail")]
    pub user_email: String,

    pub role: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub category: Option<String>,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewNote<'a> {
    pub role: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub tags: &'a [String],
    pub category: Option<&'a str>,
}

// None: do not update. For `category`, Some(None) sets NULL.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteChanges<'a> {
    pub role: Option<&'a str>,
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub tags: Option<&'a [String]>,
    pub category: Option<Option<&'a str>>,
}

pub async fn create(db: &PgPool, owner: &str, note: NewNote<'_>) -> Result<NoteRow, RepoError> {
    let row = sqlx::query_as::<_, NoteRow>(
        r#"
        INSERT INTO notes ("userEmail", role, title, content, tags, category)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING
            "noteId", "publicId", "userEmail", role, title, content, tags, category,
            "createdAt", "updatedAt"
        "#,
    )
    .bind(owner)
    .bind(note.role)
    .bind(note.title)
    .bind(note.content)
    .bind(note.tags)
    .bind(note.category)
    .fetch_one(db)
    .await?;

    Ok(row)
}

/// One page of the owner's notes plus the full count, read from a single snapshot.
pub async fn page_by_owner(
    db: &PgPool,
    owner: &str,
    limit: i64,
    offset: i64,
) -> Result<(Vec<NoteRow>, u64), RepoError> {
    let mut tx = db.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
        .execute(&mut *tx)
        .await?;

    let total = count_by_owner(&mut *tx, owner).await?;
    let rows = list_by_owner(&mut *tx, owner, limit, offset).await?;

    tx.commit().await?;
    Ok((rows, total))
}

/// Same as `page_by_owner`, restricted to notes carrying any of `tags`.
pub async fn page_by_tags(
    db: &PgPool,
    owner: &str,
    tags: &[String],
    limit: i64,
    offset: i64,
) -> Result<(Vec<NoteRow>, u64), RepoError> {
    let mut tx = db.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
        .execute(&mut *tx)
        .await?;

    let total = count_by_tags(&mut *tx, owner, tags).await?;
    let rows = list_by_tags(&mut *tx, owner, tags, limit, offset).await?;

    tx.commit().await?;
    Ok((rows, total))
}

async fn list_by_owner<'e, E: PgExecutor<'e>>(
    db: E,
    owner: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<NoteRow>, RepoError> {
    let rows = sqlx::query_as::<_, NoteRow>(
        r#"
        SELECT
            "noteId", "publicId", "userEmail", role, title, content, tags, category,
            "createdAt", "updatedAt"
        FROM notes
        WHERE "userEmail" = $1
        ORDER BY "createdAt" DESC, "noteId" DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

async fn count_by_owner<'e, E: PgExecutor<'e>>(db: E, owner: &str) -> Result<u64, RepoError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM notes WHERE "userEmail" = $1
        "#,
    )
    .bind(owner)
    .fetch_one(db)
    .await?;

    u64::try_from(total).map_err(|_| RepoError::OutOfRange("notes count"))
}

async fn list_by_tags<'e, E: PgExecutor<'e>>(
    db: E,
    owner: &str,
    tags: &[String],
    limit: i64,
    offset: i64,
) -> Result<Vec<NoteRow>, RepoError> {
    let rows = sqlx::query_as::<_, NoteRow>(
        r#"
        SELECT
            "noteId", "publicId", "userEmail", role, title, content, tags, category,
            "createdAt", "updatedAt"
        FROM notes
        WHERE "userEmail" = $1 AND tags && $2
        ORDER BY "createdAt" DESC, "noteId" DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(owner)
    .bind(tags)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

async fn count_by_tags<'e, E: PgExecutor<'e>>(
    db: E,
    owner: &str,
    tags: &[String],
) -> Result<u64, RepoError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM notes WHERE "userEmail" = $1 AND tags && $2
        "#,
    )
    .bind(owner)
    .bind(tags)
    .fetch_one(db)
    .await?;

    u64::try_from(total).map_err(|_| RepoError::OutOfRange("notes count"))
}

pub async fn get(db: &PgPool, owner: &str, public_id: Uuid) -> Result<Option<NoteRow>, RepoError> {
    let row = sqlx::query_as::<_, NoteRow>(
        r#"
        SELECT
            "noteId", "publicId", "userEmail", role, title, content, tags, category,
            "createdAt", "updatedAt"
        FROM notes
        WHERE "publicId" = $1 AND "userEmail" = $2
        "#,
    )
    .bind(public_id)
    .bind(owner)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    owner: &str,
    public_id: Uuid,
    changes: NoteChanges<'_>,
) -> Result<Option<NoteRow>, RepoError> {
    let row = sqlx::query_as::<_, NoteRow>(
        r#"
        UPDATE notes
        SET
            role = COALESCE($3, role),
            title = COALESCE($4, title),
            content = COALESCE($5, content),
            tags = COALESCE($6, tags),
            category = CASE
                WHEN $7 = false THEN category
                ELSE $8
            END,
            "updatedAt" = now()
        WHERE "publicId" = $1 AND "userEmail" = $2
        RETURNING
            "noteId", "publicId", "userEmail", role, title, content, tags, category,
            "createdAt", "updatedAt"
        "#,
    )
    .bind(public_id)
    .bind(owner)
    .bind(changes.role)
    .bind(changes.title)
    .bind(changes.content)
    .bind(changes.tags)
    .bind(changes.category.is_some()) // $7: flag to set category
    .bind(changes.category.flatten()) // $8: new category value
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, owner: &str, public_id: Uuid) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM notes
        WHERE "publicId" = $1 AND "userEmail" = $2
        "#,
    )
    .bind(public_id)
    .bind(owner)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
