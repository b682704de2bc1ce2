pub mod post_repository;
pub mod user_repository;

pub use post_repository::SqlitePostRepository;
pub use user_repository::SqliteUserRepository;
