pub mod error;
pub mod note_repo;
pub mod user_repo;
