pub mod account_service;
pub mod blog_service;
