//! Extraction rules: which call, constructor or decorator sites carry translatable messages.
//!
//! ## Module Structure
//!
//! - `registry`: ordered rule list with first-match-wins lookup
//! - `signature`: owner, arity and parameter-type matching

pub mod registry;
pub mod signature;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use registry::RuleRegistry;

/// What an argument position contributes to a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamRole {
    #[default]
    None,
    Singular,
    Plural,
    Context,
}

impl fmt::Display for ParamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamRole::None => write!(f, "none"),
            ParamRole::Singular => write!(f, "singular"),
            ParamRole::Plural => write!(f, "plural"),
            ParamRole::Context => write!(f, "context"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub role: ParamRole,
}

impl ParamSpec {
    pub fn new(type_name: impl Into<String>, role: ParamRole) -> Self {
        Self {
            type_name: type_name.into(),
            role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRule {
    /// Method or function name.
    #[serde(default)]
    pub name: String,
    /// Qualified declaring type, or the module of a free function.
    #[serde(default)]
    pub owner: String,
    /// Default context for messages without an explicit one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Also match call sites whose static type inherits from `owner`.
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub signature: Vec<ParamSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorRule {
    #[serde(default)]
    pub name: String,
    /// Qualified name of the constructed type.
    #[serde(default)]
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub signature: Vec<ParamSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRule {
    #[serde(default)]
    pub name: String,
    /// Qualified name of the decorator.
    #[serde(default)]
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tag fields whose values are messages.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Tag field holding the message context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractionRule {
    Method(MethodRule),
    Constructor(ConstructorRule),
    Tag(TagRule),
}

/// Why a rule was rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule has no name")]
    MissingName,
    #[error("rule has no owner")]
    MissingOwner,
    #[error("signature needs exactly one singular parameter, found {0}")]
    SingularCount(usize),
    #[error("signature declares more than one {0} parameter")]
    DuplicateRole(ParamRole),
    #[error("tag rule lists no message fields")]
    NoTagFields,
}

impl ExtractionRule {
    pub fn name(&self) -> &str {
        match self {
            ExtractionRule::Method(rule) => &rule.name,
            ExtractionRule::Constructor(rule) => &rule.name,
            ExtractionRule::Tag(rule) => &rule.name,
        }
    }

    pub fn owner(&self) -> &str {
        match self {
            ExtractionRule::Method(rule) => &rule.owner,
            ExtractionRule::Constructor(rule) => &rule.owner,
            ExtractionRule::Tag(rule) => &rule.owner,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ExtractionRule::Method(rule) => rule.description.as_deref(),
            ExtractionRule::Constructor(rule) => rule.description.as_deref(),
            ExtractionRule::Tag(rule) => rule.description.as_deref(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ExtractionRule::Method(_) => "method",
            ExtractionRule::Constructor(_) => "constructor",
            ExtractionRule::Tag(_) => "tag",
        }
    }

    /// Parameter list for call-shaped rules; tag rules have none.
    pub fn signature(&self) -> Option<&[ParamSpec]> {
        match self {
            ExtractionRule::Method(rule) => Some(&rule.signature),
            ExtractionRule::Constructor(rule) => Some(&rule.signature),
            ExtractionRule::Tag(_) => None,
        }
    }

    /// Argument index carrying `role`, if the signature declares it.
    pub fn role_index(&self, role: ParamRole) -> Option<usize> {
        self.signature()?.iter().position(|p| p.role == role)
    }

    pub fn has_plural(&self) -> bool {
        self.role_index(ParamRole::Plural).is_some()
    }

    /// Load-time validation. Every rule must at least be named.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.name().trim().is_empty() {
            return Err(RuleError::MissingName);
        }
        if self.owner().trim().is_empty() {
            return Err(RuleError::MissingOwner);
        }

        match self {
            ExtractionRule::Method(MethodRule { signature, .. })
            | ExtractionRule::Constructor(ConstructorRule { signature, .. }) => {
                validate_signature(signature)
            }
            ExtractionRule::Tag(rule) => {
                if rule.fields.is_empty() {
                    Err(RuleError::NoTagFields)
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn validate_signature(signature: &[ParamSpec]) -> Result<(), RuleError> {
    let count = |role: ParamRole| signature.iter().filter(|p| p.role == role).count();

    let singular = count(ParamRole::Singular);
    if singular != 1 {
        return Err(RuleError::SingularCount(singular));
    }
    for role in [ParamRole::Plural, ParamRole::Context] {
        if count(role) > 1 {
            return Err(RuleError::DuplicateRole(role));
        }
    }
    Ok(())
}
