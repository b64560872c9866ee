use crate::core::{
    error::ExtractError,
    rules::{
        ExtractionRule,
        signature::{match_constructor, match_method, match_tag},
    },
    syntax::{NodeKind, SymbolLookup, SyntaxNode},
};

/// Ordered, validated rule set.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: Vec<ExtractionRule>,
}

impl RuleRegistry {
    pub fn new(rules: Vec<ExtractionRule>) -> Result<Self, ExtractError> {
        if rules.is_empty() {
            return Err(ExtractError::EmptyRegistry);
        }
        for (index, rule) in rules.iter().enumerate() {
            rule.validate()
                .map_err(|reason| ExtractError::InvalidRule {
                    index,
                    name: rule.name().to_string(),
                    reason,
                })?;
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule (in registration order) that matches `node`.
    pub fn find(&self, node: &SyntaxNode, lookup: &dyn SymbolLookup) -> Option<&ExtractionRule> {
        let types = lookup.types();
        let found = self.rules.iter().find(|rule| match (rule, &node.kind) {
            (ExtractionRule::Method(rule), NodeKind::Invocation(call)) => {
                match_method(rule, call, types)
            }
            (ExtractionRule::Constructor(rule), NodeKind::NewObject(new)) => {
                match_constructor(rule, new, types)
            }
            (ExtractionRule::Tag(rule), NodeKind::TagUse(tag)) => match_tag(rule, tag, lookup),
            _ => false,
        });

        if let Some(rule) = found {
            tracing::debug!(
                line = node.position.line,
                rule = rule.name(),
                kind = rule.kind_name(),
                "site matched"
            );
        }
        found
    }
}
