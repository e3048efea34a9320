//! Script directives: `STDLIB_VERSION`, `CONTENT_TYPE` and `SCRIPT_TYPE`.
//!
//! Directives are validated before the script body is parsed or checked.

use core::fmt;

use tracing::debug;

use crate::api::{Diagnostic, Severity};
use crate::parser::{RawDirective, Span};

pub const MIN_STDLIB_VERSION: u8 = 1;
pub const MAX_STDLIB_VERSION: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Expression,
    DApp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptType {
    Account,
    Asset,
}

/// Validated directives of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectiveSet {
    pub stdlib_version: u8,
    pub content_type: ContentType,
    pub script_type: ScriptType,
}

impl Default for DirectiveSet {
    fn default() -> Self {
        Self {
            stdlib_version: MAX_STDLIB_VERSION,
            content_type: ContentType::Expression,
            script_type: ScriptType::Account,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Expression => write!(f, "EXPRESSION"),
            ContentType::DApp => write!(f, "DAPP"),
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptType::Account => write!(f, "ACCOUNT"),
            ScriptType::Asset => write!(f, "ASSET"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectiveError {
    pub kind: DirectiveErrorKind,
    pub source: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveErrorKind {
    /// Unknown name, unknown value, repeated directive or unsupported version.
    InvalidDirective { name: String, reason: String },
    /// Each directive is valid on its own but the combination is not.
    IncompatibleDirectives { message: String },
}

impl DirectiveError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (message, code, help) = match &self.kind {
            DirectiveErrorKind::InvalidDirective { name, reason } => (
                format!("Invalid directive '{}': {}", name, reason),
                "D001",
                Some(
                    "Supported directives are STDLIB_VERSION, CONTENT_TYPE and SCRIPT_TYPE"
                        .to_string(),
                ),
            ),
            DirectiveErrorKind::IncompatibleDirectives { message } => (
                format!("Incompatible directives: {}", message),
                "D002",
                None,
            ),
        };
        Diagnostic {
            severity: Severity::Error,
            message,
            span: self.span.clone(),
            related: Vec::new(),
            help,
            code: Some(code.to_string()),
        }
    }
}

impl fmt::Display for DirectiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

impl std::error::Error for DirectiveError {}

/// Validate raw directives, filling in defaults for the missing ones.
pub fn validate(directives: &[RawDirective<'_>], source: &str) -> Result<DirectiveSet, DirectiveError> {
    let invalid = |d: &RawDirective<'_>, reason: String| DirectiveError {
        kind: DirectiveErrorKind::InvalidDirective {
            name: d.name.to_string(),
            reason,
        },
        source: source.to_string(),
        span: d.span.clone(),
    };

    let mut version = None;
    let mut content_type = None;
    let mut script_type = None;

    for d in directives {
        let duplicate = match d.name {
            "STDLIB_VERSION" => {
                let v = d
                    .value
                    .parse::<u8>()
                    .ok()
                    .filter(|v| (MIN_STDLIB_VERSION..=MAX_STDLIB_VERSION).contains(v))
                    .ok_or_else(|| {
                        invalid(
                            d,
                            format!(
                                "unsupported version '{}' (expected {} to {})",
                                d.value, MIN_STDLIB_VERSION, MAX_STDLIB_VERSION
                            ),
                        )
                    })?;
                version.replace(v).is_some()
            }
            "CONTENT_TYPE" => {
                let ct = match d.value {
                    "EXPRESSION" => ContentType::Expression,
                    "DAPP" => ContentType::DApp,
                    other => return Err(invalid(d, format!("unknown content type '{}'", other))),
                };
                content_type.replace(ct).is_some()
            }
            "SCRIPT_TYPE" => {
                let st = match d.value {
                    "ACCOUNT" => ScriptType::Account,
                    "ASSET" => ScriptType::Asset,
                    other => return Err(invalid(d, format!("unknown script type '{}'", other))),
                };
                script_type.replace(st).is_some()
            }
            _ => return Err(invalid(d, "unknown directive".to_string())),
        };
        if duplicate {
            return Err(invalid(d, "directive is repeated".to_string()));
        }
    }

    let defaults = DirectiveSet::default();
    let set = DirectiveSet {
        stdlib_version: version.unwrap_or(defaults.stdlib_version),
        content_type: content_type.unwrap_or(defaults.content_type),
        script_type: script_type.unwrap_or(defaults.script_type),
    };

    check_compatibility(&set).map_err(|message| {
        let span = match (directives.first(), directives.last()) {
            (Some(first), Some(last)) => Span::combine(&first.span, &last.span),
            _ => Span(0..0),
        };
        DirectiveError {
            kind: DirectiveErrorKind::IncompatibleDirectives { message },
            source: source.to_string(),
            span,
        }
    })?;

    debug!(
        version = set.stdlib_version,
        content_type = %set.content_type,
        script_type = %set.script_type,
        "Directives validated"
    );
    Ok(set)
}

/// The fixed compatibility table.
fn check_compatibility(set: &DirectiveSet) -> Result<(), String> {
    match (set.content_type, set.script_type) {
        (ContentType::DApp, ScriptType::Asset) => {
            Err("DAPP scripts can only be attached to an ACCOUNT".to_string())
        }
        (ContentType::DApp, ScriptType::Account) if set.stdlib_version < 3 => Err(format!(
            "DAPP scripts require STDLIB_VERSION 3 or later, found {}",
            set.stdlib_version
        )),
        (ContentType::Expression, ScriptType::Asset) if set.stdlib_version < 2 => Err(format!(
            "ASSET scripts require STDLIB_VERSION 2 or later, found {}",
            set.stdlib_version
        )),
        _ => Ok(()),
    }
}
