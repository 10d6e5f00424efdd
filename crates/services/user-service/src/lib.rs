//! User Service Library
//!
//! User persistence and the create/get/update/delete use cases.

pub mod infra;
pub mod repository;
pub mod service;

pub use infra::Database;
pub use repository::{UserRepository, UserStore};
pub use service::{CreateUserCommand, UpdateUserCommand, UserManager, UserService};
