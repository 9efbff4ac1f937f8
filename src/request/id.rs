//! Resource identifiers and path templates
//!
//! Most endpoints accept either a numeric ID or a URL-encoded
//! `namespace/path` for the project, group or user they act on.

use crate::error::{Error, Result};
use crate::types::ResourceKind;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Characters escaped inside a single path segment.
///
/// `/` and `.` are escaped too, so `group/sub.project` stays one segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Escape a value for use as one path segment
pub fn path_escape(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Identifier of a project, group, user or runner
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// Numeric ID, rendered as-is
    Numeric(u64),
    /// Full path such as `group/subgroup/project`, rendered percent-encoded
    Path(String),
}

impl ResourceId {
    /// Create a path identifier
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Render as a single escaped path segment
    pub fn to_path_segment(&self) -> Result<String> {
        match self {
            Self::Numeric(id) => Ok(id.to_string()),
            Self::Path(path) if path.trim().is_empty() => {
                Err(Error::invalid_id("path identifier must not be empty"))
            }
            Self::Path(path) => Ok(path_escape(path)),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        Self::Numeric(id)
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        Self::Numeric(u64::from(id))
    }
}

impl From<&str> for ResourceId {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<&String> for ResourceId {
    fn from(path: &String) -> Self {
        Self::Path(path.clone())
    }
}

impl TryFrom<i64> for ResourceId {
    type Error = Error;

    fn try_from(id: i64) -> Result<Self> {
        u64::try_from(id)
            .map(Self::Numeric)
            .map_err(|_| Error::invalid_id(format!("negative identifier {id}")))
    }
}

impl TryFrom<&Value> for ResourceId {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self::Numeric).ok_or_else(|| {
                Error::invalid_id(format!("expected a non-negative integer, got {n}"))
            }),
            Value::String(s) if s.trim().is_empty() => {
                Err(Error::invalid_id("path identifier must not be empty"))
            }
            Value::String(s) => Ok(Self::Path(s.clone())),
            other => Err(Error::invalid_id(format!(
                "unsupported identifier type {}, expected integer or string",
                json_type_name(other)
            ))),
        }
    }
}

impl TryFrom<Value> for ResourceId {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::try_from(&value)
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    /// All-digit input is numeric, anything else is a path
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::invalid_id("identifier must not be empty"));
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = s.parse() {
                return Ok(Self::Numeric(id));
            }
        }
        Ok(Self::Path(s.to_string()))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One positional argument of a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathArg {
    /// Resource identifier, escaped
    Id(ResourceId),
    /// Free-form segment such as a branch name, escaped
    Segment(String),
    /// Numeric sub-resource ID
    Number(u64),
    /// Inserted verbatim (artifact paths, prefixes)
    Raw(String),
}

impl PathArg {
    /// An argument inserted without escaping
    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw(value.into())
    }

    fn render(&self) -> Result<String> {
        match self {
            Self::Id(id) => id.to_path_segment(),
            Self::Segment(s) => Ok(path_escape(s)),
            Self::Number(n) => Ok(n.to_string()),
            Self::Raw(s) => Ok(s.clone()),
        }
    }
}

impl From<&ResourceId> for PathArg {
    fn from(id: &ResourceId) -> Self {
        Self::Id(id.clone())
    }
}

impl From<ResourceId> for PathArg {
    fn from(id: ResourceId) -> Self {
        Self::Id(id)
    }
}

impl From<u64> for PathArg {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for PathArg {
    fn from(s: &str) -> Self {
        Self::Segment(s.to_string())
    }
}

impl From<String> for PathArg {
    fn from(s: String) -> Self {
        Self::Segment(s)
    }
}

impl From<ResourceKind> for PathArg {
    fn from(kind: ResourceKind) -> Self {
        Self::Raw(kind.as_path().to_string())
    }
}

/// Substitute `{}` placeholders in `template` with rendered `args`
pub fn expand_path(template: &str, args: &[PathArg]) -> Result<String> {
    let pieces: Vec<&str> = template.split("{}").collect();
    let expected = pieces.len() - 1;
    if expected != args.len() {
        return Err(Error::PathArguments {
            template: template.to_string(),
            expected,
            actual: args.len(),
        });
    }

    let mut path = String::with_capacity(template.len() + args.len() * 8);
    for (i, piece) in pieces.iter().enumerate() {
        path.push_str(piece);
        if let Some(arg) = args.get(i) {
            path.push_str(&arg.render()?);
        }
    }
    Ok(path)
}
