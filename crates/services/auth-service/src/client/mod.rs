//! Access to user records owned by another component.

mod user_directory;

pub use user_directory::UserDirectory;

#[cfg(any(test, feature = "test-utils"))]
pub use user_directory::MockUserDirectory;
