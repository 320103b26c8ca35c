//! Patch documents applied to the editable user projection
//!
//! A patch document is a JSON array of operations shaped like RFC 6902
//! (`op`, `path`, `value`, `from`). Paths address the top-level fields of
//! [`UserUpdateDto`]; segment names are matched case-insensitively.
//! Operations run in order against the projection. An operation that
//! cannot be applied records an error and leaves the projection untouched,
//! and the remaining operations still run; the caller validates the result
//! as a whole before anything is stored.

use common::error::ValidationErrors;
use serde::Deserialize;
use serde_json::Value;

use crate::models::UserUpdateDto;
use crate::validation::{FIRST_NAME, LAST_NAME, LOGIN};

/// Single patch operation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add {
        path: String,
        #[serde(default, deserialize_with = "present")]
        value: Option<Value>,
    },
    Remove {
        path: String,
    },
    Replace {
        path: String,
        #[serde(default, deserialize_with = "present")]
        value: Option<Value>,
    },
    Move {
        from: String,
        path: String,
    },
    Copy {
        from: String,
        path: String,
    },
    Test {
        path: String,
        #[serde(default, deserialize_with = "present")]
        value: Option<Value>,
    },
}

/// Keeps an explicit `null` apart from a missing `value` member
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Ordered list of patch operations
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

/// Field of the projection a path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserField {
    Login,
    FirstName,
    LastName,
}

impl UserField {
    fn parse(path: &str) -> Option<Self> {
        let segment = path.strip_prefix('/')?;
        if segment.contains('/') {
            return None;
        }

        if segment.eq_ignore_ascii_case(LOGIN) {
            Some(Self::Login)
        } else if segment.eq_ignore_ascii_case(FIRST_NAME) {
            Some(Self::FirstName)
        } else if segment.eq_ignore_ascii_case(LAST_NAME) {
            Some(Self::LastName)
        } else {
            None
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Login => LOGIN,
            Self::FirstName => FIRST_NAME,
            Self::LastName => LAST_NAME,
        }
    }

    fn slot(self, target: &mut UserUpdateDto) -> &mut Option<String> {
        match self {
            Self::Login => &mut target.login,
            Self::FirstName => &mut target.first_name,
            Self::LastName => &mut target.last_name,
        }
    }

    fn get(self, target: &UserUpdateDto) -> Option<&str> {
        match self {
            Self::Login => target.login.as_deref(),
            Self::FirstName => target.first_name.as_deref(),
            Self::LastName => target.last_name.as_deref(),
        }
    }
}

/// Why a single operation failed; keyed by field name (or raw path)
type OpError = (String, String);

fn resolve(path: &str) -> Result<UserField, OpError> {
    UserField::parse(path).ok_or_else(|| {
        (
            path.trim_start_matches('/').to_string(),
            format!("The target location specified by path segment '{}' was not found.", path),
        )
    })
}

fn to_field_value(field: UserField, value: Option<&Value>) -> Result<Option<String>, OpError> {
    match value {
        None => Err((
            field.name().to_string(),
            "The 'value' member is required for this operation.".to_string(),
        )),
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err((
            field.name().to_string(),
            format!("The value '{}' is invalid for target location.", other),
        )),
    }
}

impl PatchOperation {
    fn apply(&self, target: &mut UserUpdateDto) -> Result<(), OpError> {
        match self {
            Self::Add { path, value } | Self::Replace { path, value } => {
                let field = resolve(path)?;
                *field.slot(target) = to_field_value(field, value.as_ref())?;
            }
            Self::Remove { path } => {
                let field = resolve(path)?;
                *field.slot(target) = None;
            }
            Self::Copy { from, path } => {
                let source = resolve(from)?;
                let field = resolve(path)?;
                *field.slot(target) = source.get(target).map(str::to_string);
            }
            Self::Move { from, path } => {
                let source = resolve(from)?;
                let field = resolve(path)?;
                let value = source.slot(target).take();
                *field.slot(target) = value;
            }
            Self::Test { path, value } => {
                let field = resolve(path)?;
                let expected = to_field_value(field, value.as_ref())?;
                if field.get(target) != expected.as_deref() {
                    return Err((
                        field.name().to_string(),
                        format!(
                            "The current value '{}' at path '{}' is not equal to the test value '{}'.",
                            field.get(target).unwrap_or_default(),
                            path,
                            expected.unwrap_or_default()
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl PatchDocument {
    /// Apply every operation in order, recording failures in `errors`
    pub fn apply_to(&self, target: &mut UserUpdateDto, errors: &mut ValidationErrors) {
        for operation in &self.0 {
            if let Err((field, message)) = operation.apply(target) {
                errors.add(field, message);
            }
        }
    }
}
