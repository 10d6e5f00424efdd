//! Adapters connecting services to each other.

mod user_directory;

pub use user_directory::UserServiceDirectory;
