//! Named validation rules.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use common::{ClassifiedError, ErrorCode};
use domain::{DateOfBirth, Email, Name, Password, Username};

/// Single field value handed to a named rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Str(&'a str),
    Timestamp(DateTime<Utc>),
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Str(value)
    }
}

impl From<DateTime<Utc>> for FieldValue<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

/// Predicate behind a named rule.
pub type RulePredicate = Arc<dyn Fn(FieldValue<'_>) -> bool + Send + Sync>;

/// Rule registry misconfiguration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleRegistryError {
    #[error("validation rule name cannot be empty")]
    EmptyName,
    #[error("validation rule `{0}` is not registered")]
    UnknownRule(String),
}

impl From<RuleRegistryError> for ClassifiedError {
    fn from(err: RuleRegistryError) -> Self {
        ErrorCode::ValidationRegistration
            .with_detail(err.to_string())
            .with_cause(err)
    }
}

/// Rule name to predicate map.
///
/// Filled at startup, then shared read-only behind the application state.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, RulePredicate>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the rules of every value object:
    /// `username`, `email`, `password`, `name` and `dateofbirth`.
    pub fn with_domain_rules() -> Result<Self, RuleRegistryError> {
        let mut registry = Self::new();

        registry.register("username", |value| match value {
            FieldValue::Str(s) => Username::parse(s).is_ok(),
            FieldValue::Timestamp(_) => false,
        })?;
        registry.register("email", |value| match value {
            FieldValue::Str(s) => Email::parse(s).is_ok(),
            FieldValue::Timestamp(_) => false,
        })?;
        registry.register("password", |value| match value {
            FieldValue::Str(s) => Password::parse(s).is_ok(),
            FieldValue::Timestamp(_) => false,
        })?;
        registry.register("name", |value| match value {
            FieldValue::Str(s) => Name::parse("name", s).is_ok(),
            FieldValue::Timestamp(_) => false,
        })?;
        registry.register("dateofbirth", |value| match value {
            FieldValue::Timestamp(t) => DateOfBirth::parse(t).is_ok(),
            FieldValue::Str(_) => false,
        })?;

        Ok(registry)
    }

    /// Register `predicate` under `name`, replacing any rule already there.
    pub fn register<F>(&mut self, name: &str, predicate: F) -> Result<(), RuleRegistryError>
    where
        F: Fn(FieldValue<'_>) -> bool + Send + Sync + 'static,
    {
        if name.is_empty() {
            let err = RuleRegistryError::EmptyName;
            error!(
                component = "validation",
                function = "register",
                event = "custom_validation_failed",
                error = %err,
                "Attempted to register custom validation with an empty tag"
            );
            return Err(err);
        }

        self.rules.insert(name.to_string(), Arc::new(predicate));
        info!(
            component = "validation",
            function = "register",
            event = "custom_validation_success",
            tag = name,
            "Custom validation registered successfully"
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Fail on the first of `names` that has no registered rule.
    pub fn ensure_registered<'n, I>(&self, names: I) -> Result<(), RuleRegistryError>
    where
        I: IntoIterator<Item = &'n str>,
    {
        match names.into_iter().find(|name| !self.contains(name)) {
            Some(name) => Err(RuleRegistryError::UnknownRule(name.to_string())),
            None => Ok(()),
        }
    }

    /// Run the rule registered as `name` against `value`.
    pub fn check(&self, name: &str, value: FieldValue<'_>) -> Result<bool, RuleRegistryError> {
        let predicate = self
            .rules
            .get(name)
            .ok_or_else(|| RuleRegistryError::UnknownRule(name.to_string()))?;
        Ok(predicate(value))
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("RuleRegistry").field("rules", &names).finish()
    }
}
