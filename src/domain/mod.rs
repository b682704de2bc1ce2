pub mod error;
pub mod ownership;
pub mod post;
pub mod user;
