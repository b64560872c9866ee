//! Structural predicates deciding whether a site matches a rule.
//!
//! Matching is nominal: a rule written against a base type only matches calls whose static
//! receiver type is that base type, unless the rule opts into `inherited`, in which case
//! the supertype closure of the call-site type is walked.

use crate::core::rules::{ConstructorRule, MethodRule, ParamSpec, TagRule};
use crate::core::syntax::{Construction, Invocation, SymbolLookup, TagUse, TypeGraph};

/// Does `site_owner` satisfy `rule_owner`?
pub fn owner_matches(
    site_owner: Option<&str>,
    rule_owner: &str,
    inherited: bool,
    types: &TypeGraph,
) -> bool {
    let Some(site_owner) = site_owner else {
        return false;
    };
    if site_owner == rule_owner {
        return true;
    }
    inherited && types.is_subtype_of(site_owner, rule_owner)
}

/// Arity and per-position type equality (no coercion).
pub fn params_match(signature: &[ParamSpec], param_types: &[String]) -> bool {
    signature.len() == param_types.len()
        && signature
            .iter()
            .zip(param_types)
            .all(|(spec, actual)| spec.type_name == *actual)
}

pub fn match_method(rule: &MethodRule, call: &Invocation, types: &TypeGraph) -> bool {
    call.name == rule.name
        && call.is_static == rule.is_static
        && params_match(&rule.signature, &call.param_types)
        && owner_matches(call.owner.as_deref(), &rule.owner, rule.inherited, types)
}

pub fn match_constructor(rule: &ConstructorRule, new: &Construction, types: &TypeGraph) -> bool {
    params_match(&rule.signature, &new.param_types)
        && owner_matches(new.type_name.as_deref(), &rule.owner, rule.inherited, types)
}

pub fn match_tag(rule: &TagRule, tag: &TagUse, lookup: &dyn SymbolLookup) -> bool {
    lookup
        .resolve_name(&tag.name)
        .is_some_and(|qualified| qualified == rule.owner)
}
