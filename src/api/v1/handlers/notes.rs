/*
 * Responsibility
 * - /notes 系 CRUD handler
 * - 所有者は常に AuthCtxExtractor の email (body や path からは受け取らない)
 * - 一覧系は repo でスライス + count → paginate() で共通の封筒に包む
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::notes::{CreateNoteRequest, NoteResponse, TagsQuery, UpdateNoteRequest},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::note_repo::{self, NewNote, NoteChanges},
    services::pagination::{IntoPublic, PaginatedResult, Pagination, PaginationOptions, paginate},
    state::AppState,
};

const NOTE: &str = "Note";

pub async fn create_note(
    State(state): State<AppState>,
    AuthCtxExtractor(identity): AuthCtxExtractor,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_NOTE", msg))?;

    let row = note_repo::create(
        &state.db,
        &identity.email,
        NewNote {
            role: req.role.as_str(),
            title: req.title.trim(),
            content: &req.content,
            tags: &req.tags,
            category: req.category.as_deref(),
        },
    )
    .await?;

    tracing::info!(note_id = row.note_id, "note created");

    Ok((StatusCode::CREATED, Json(row.into_public())))
}

pub async fn list_notes(
    State(state): State<AppState>,
    AuthCtxExtractor(identity): AuthCtxExtractor,
    Query(options): Query<PaginationOptions>,
) -> Result<Json<PaginatedResult<NoteResponse>>, AppError> {
    let pagination = options.resolve();

    let (rows, total) = note_repo::page_by_owner(
        &state.db,
        &identity.email,
        i64::from(pagination.limit()),
        pagination.offset(),
    )
    .await?;

    Ok(Json(paginate(rows, total, pagination)))
}

pub async fn find_by_tags(
    State(state): State<AppState>,
    AuthCtxExtractor(identity): AuthCtxExtractor,
    Query(query): Query<TagsQuery>,
) -> Result<Json<PaginatedResult<NoteResponse>>, AppError> {
    let tags = query.tags();
    if tags.is_empty() {
        return Err(AppError::bad_request("INVALID_TAGS", "tags is required"));
    }
    let pagination: Pagination = query.options().into();

    let (rows, total) = note_repo::page_by_tags(
        &state.db,
        &identity.email,
        &tags,
        i64::from(pagination.limit()),
        pagination.offset(),
    )
    .await?;

    Ok(Json(paginate(rows, total, pagination)))
}

pub async fn get_note(
    State(state): State<AppState>,
    AuthCtxExtractor(identity): AuthCtxExtractor,
    Path(note_id): Path<Uuid>,
) -> Result<Json<NoteResponse>, AppError> {
    let row = note_repo::get(&state.db, &identity.email, note_id)
        .await?
        .ok_or(AppError::not_found(NOTE))?;

    Ok(Json(row.into_public()))
}

pub async fn update_note(
    State(state): State<AppState>,
    AuthCtxExtractor(identity): AuthCtxExtractor,
    Path(note_id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<NoteResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_NOTE", msg))?;

    let changes = NoteChanges {
        role: req.role.as_ref().map(|r| r.as_str()),
        title: req.title.as_deref().map(str::trim),
        content: req.content.as_deref(),
        tags: req.tags.as_deref(),
        category: req.category.as_ref().map(|inner| inner.as_deref()),
    };

    let row = note_repo::update(&state.db, &identity.email, note_id, changes)
        .await?
        .ok_or(AppError::not_found(NOTE))?;

    Ok(Json(row.into_public()))
}

pub async fn delete_note(
    State(state): State<AppState>,
    AuthCtxExtractor(identity): AuthCtxExtractor,
    Path(note_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = note_repo::delete(&state.db, &identity.email, note_id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(NOTE))
    }
}
