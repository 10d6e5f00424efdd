//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Value objects validate themselves on construction; the `User` entity is
//! built only from value objects.

pub mod constants;
pub mod error;
pub mod user;
pub mod value_objects;

pub use constants::*;
pub use error::{DomainResult, ValidationErrorDetail, ValidationFailures};
pub use user::{NewUser, User, UserPatch, UserResponse};
pub use value_objects::{
    estimate_entropy_bits, DateOfBirth, Email, Name, Password, PasswordHash, Username,
};
