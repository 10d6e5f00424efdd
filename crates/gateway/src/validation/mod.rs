//! Request validation pipeline.
//!
//! Two stages that can run on their own:
//!
//! 1. [`decode_json`] turns the body into a typed request, stopping at the
//!    first structural problem.
//! 2. [`validate_rules`] runs the declared field rules (`validator` derive)
//!    and the named domain rules, and reports every failing field at once.

mod decode;
mod rules;

pub use decode::{decode_json, read_body, MAX_BODY_BYTES};
pub use rules::{FieldValue, RulePredicate, RuleRegistry, RuleRegistryError};

use std::collections::HashSet;

use axum::body::Body;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationError};

use common::{validation_error, ApiResult};
use domain::ValidationErrorDetail;

/// Named rule applied to one field of a request.
#[derive(Debug, Clone, Copy)]
pub struct NamedRule<'a> {
    /// Wire name of the field
    pub field: &'static str,
    /// Registry name of the rule
    pub rule: &'static str,
    /// Field value; absent fields are skipped
    pub value: Option<FieldValue<'a>>,
}

impl<'a> NamedRule<'a> {
    pub fn new<V>(field: &'static str, rule: &'static str, value: Option<V>) -> Self
    where
        V: Into<FieldValue<'a>>,
    {
        Self {
            field,
            rule,
            value: value.map(Into::into),
        }
    }
}

/// Request type carrying named domain rules on top of its declared ones.
pub trait DomainRules: Validate {
    fn named_rules(&self) -> Vec<NamedRule<'_>>;

    /// Registry names this request type refers to.
    fn rule_names() -> Vec<&'static str>
    where
        Self: Default + Sized,
    {
        Self::default()
            .named_rules()
            .iter()
            .map(|named| named.rule)
            .collect()
    }
}

/// Read, decode and validate a request body.
pub async fn validate_request<T>(body: Body, registry: &RuleRegistry) -> ApiResult<T>
where
    T: DeserializeOwned + DomainRules,
{
    let bytes = read_body(body).await?;
    let request: T = decode_json(&bytes)?;
    validate_rules(&request, registry)?;
    Ok(request)
}

/// Run every rule of `request` and collect all failures.
///
/// A field that fails a declared rule is not checked against its named rule.
/// Failures come back sorted by field.
pub fn validate_rules<T: DomainRules>(request: &T, registry: &RuleRegistry) -> ApiResult<()> {
    let mut details = Vec::new();

    if let Err(errors) = request.validate() {
        for (field, field_errors) in errors.field_errors() {
            let field = camel_case(&field.to_string());
            details.extend(field_errors.iter().map(|e| describe(&field, e)));
        }
    }

    let failed: HashSet<String> = details.iter().map(|d| d.field.clone()).collect();
    for rule in request.named_rules() {
        let Some(value) = rule.value else { continue };
        if failed.contains(rule.field) {
            continue;
        }
        if !registry.check(rule.rule, value)? {
            details.push(ValidationErrorDetail::new(
                rule.field,
                rule.rule,
                message(rule.field, rule.rule, None),
            ));
        }
    }

    if details.is_empty() {
        return Ok(());
    }

    details.sort_by(|a, b| a.field.cmp(&b.field));
    Err(validation_error(details))
}

fn describe(field: &str, error: &ValidationError) -> ValidationErrorDetail {
    let (rule, param) = match &*error.code {
        "length" => length_bound(error),
        code => (code.to_string(), None),
    };

    let detail = ValidationErrorDetail::new(field, &rule, message(field, &rule, param.as_deref()));
    match param {
        Some(param) => detail.with_param(param),
        None => detail,
    }
}

/// Which side of a length rule failed, and its bound.
fn length_bound(error: &ValidationError) -> (String, Option<String>) {
    let param = |name: &str| error.params.get(name).and_then(Value::as_u64);
    let length = error
        .params
        .get("value")
        .and_then(Value::as_str)
        .map(|v| v.chars().count() as u64);

    match (length, param("min"), param("max")) {
        (Some(length), Some(min), _) if length < min => ("min".into(), Some(min.to_string())),
        (_, _, Some(max)) => ("max".into(), Some(max.to_string())),
        (_, min, None) => ("min".into(), min.map(|m| m.to_string())),
    }
}

fn message(field: &str, rule: &str, param: Option<&str>) -> String {
    let param = param.unwrap_or_default();
    match rule {
        "required" => format!("{field} is required."),
        "min" => format!("{field} must be at least {param} characters long."),
        "max" => format!("{field} must be at most {param} characters long."),
        "email" => format!("{field} must be a valid email address."),
        "username" => format!("{field} must be a valid username."),
        "password" => format!("{field} must be a valid password."),
        "dateofbirth" => format!("{field} must be a valid date of birth."),
        "name" => format!("{field} must be a valid name."),
        _ => format!("Validation failed for {field} with tag {rule}."),
    }
}

/// `date_of_birth` -> `dateOfBirth`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
