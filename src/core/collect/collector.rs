use indexmap::IndexSet;

use crate::{
    core::{
        collect::{
            comments::comments_for,
            message::{MessageStore, SourceReference},
        },
        error::ExtractError,
        eval::{ConstantResolver, EvaluationError, Evaluator},
        rules::{ExtractionRule, ParamRole},
        syntax::{NodeKind, Position, SourceTree, SyntaxNode},
    },
    issues::{
        EmptyMessageIssue, EvaluationFailedIssue, Issue, SourceContext, UnresolvedTagFieldIssue,
    },
};

/// Folded role values of one site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteCandidates {
    /// `None` when the rule has no context argument or the tag omits the context field.
    pub context: Option<IndexSet<String>>,
    pub singular: IndexSet<String>,
    /// `Some` exactly when the rule has a plural argument.
    pub plural: Option<IndexSet<String>>,
}

/// Where a matched site sits in the source.
#[derive(Debug, Clone)]
pub struct Site<'a> {
    pub path: &'a str,
    pub position: Position,
    pub source_line: &'a str,
    pub comments: Vec<String>,
}

impl<'a> Site<'a> {
    pub fn new(tree: &'a SourceTree, position: Position, comment_tag: Option<&str>) -> Self {
        Self {
            path: &tree.path,
            position,
            source_line: tree.source_line(position.line),
            comments: comments_for(&tree.comments, position, comment_tag),
        }
    }
}

/// Turns matched sites into messages.
pub struct MessageCollector<'a> {
    evaluator: Evaluator<'a>,
    comment_tag: Option<String>,
    store: MessageStore,
    issues: Vec<Issue>,
}

impl<'a> MessageCollector<'a> {
    pub fn new(resolver: &'a dyn ConstantResolver, comment_tag: Option<String>) -> Self {
        Self {
            evaluator: Evaluator::new(resolver),
            comment_tag,
            store: MessageStore::new(),
            issues: Vec::new(),
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn finish(self) -> (MessageStore, Vec<Issue>) {
        (self.store, self.issues)
    }

    /// Evaluate the role arguments of a matched site and collect its messages.
    pub fn visit(
        &mut self,
        tree: &SourceTree,
        node: &SyntaxNode,
        rule: &ExtractionRule,
    ) -> Result<(), ExtractError> {
        let site = Site::new(tree, node.position, self.comment_tag.as_deref());

        match (&node.kind, rule) {
            (NodeKind::TagUse(tag), ExtractionRule::Tag(tag_rule)) => {
                let context = match tag_rule
                    .context_field
                    .as_deref()
                    .and_then(|field| tag.field(field).map(|value| (field, value)))
                {
                    Some((field, value)) => match self.evaluator.evaluate(value) {
                        Ok(values) => Some(values),
                        Err(err) => {
                            self.unresolved_tag_field(tree, rule, field, err);
                            return Ok(());
                        }
                    },
                    None => None,
                };

                for field in &tag_rule.fields {
                    let Some(value) = tag.field(field) else {
                        continue;
                    };
                    match self.evaluator.evaluate(value) {
                        Ok(singular) => {
                            let candidates = SiteCandidates {
                                context: context.clone(),
                                singular,
                                plural: None,
                            };
                            self.collect(rule, &site, candidates)?;
                        }
                        Err(err) => self.unresolved_tag_field(tree, rule, field, err),
                    }
                }
                Ok(())
            }
            (NodeKind::Invocation(_), ExtractionRule::Method(_))
            | (NodeKind::NewObject(_), ExtractionRule::Constructor(_)) => {
                let args = match &node.kind {
                    NodeKind::Invocation(call) => &call.args,
                    NodeKind::NewObject(new) => &new.args,
                    _ => return Ok(()),
                };
                let arg = |role: ParamRole| rule.role_index(role).and_then(|i| args.get(i));

                let Some(singular) = arg(ParamRole::Singular) else {
                    return Ok(());
                };
                let Some(singular) = self.evaluate_arg(tree, rule, singular) else {
                    return Ok(());
                };
                let plural = match arg(ParamRole::Plural) {
                    Some(node) => match self.evaluate_arg(tree, rule, node) {
                        Some(values) => Some(values),
                        None => return Ok(()),
                    },
                    None => None,
                };
                let context = match arg(ParamRole::Context) {
                    Some(node) => match self.evaluate_arg(tree, rule, node) {
                        Some(values) => Some(values),
                        None => return Ok(()),
                    },
                    None => None,
                };

                self.collect(
                    rule,
                    &site,
                    SiteCandidates {
                        context,
                        singular,
                        plural,
                    },
                )
            }
            _ => Ok(()),
        }
    }

    /// Upsert the messages of one site into the store.
    pub fn collect(
        &mut self,
        rule: &ExtractionRule,
        site: &Site<'_>,
        candidates: SiteCandidates,
    ) -> Result<(), ExtractError> {
        let default_context = rule.description().map(str::to_string);
        let mut contexts: Vec<Option<String>> = Vec::new();
        match candidates.context {
            Some(values) if !values.is_empty() => {
                for value in values {
                    let context = if value.is_empty() {
                        default_context.clone()
                    } else {
                        Some(value)
                    };
                    if !contexts.contains(&context) {
                        contexts.push(context);
                    }
                }
            }
            _ => contexts.push(default_context),
        }

        let reference = SourceReference {
            path: site.path.to_string(),
            line: site.position.line,
            rule: rule.name().to_string(),
            comments: site.comments.clone(),
        };

        match candidates.plural {
            Some(plural) => {
                if candidates.singular.len() != 1 || plural.len() != 1 {
                    return Err(ExtractError::AmbiguousPlural {
                        path: site.path.to_string(),
                        line: site.position.line,
                        rule: rule.name().to_string(),
                        singular: candidates.singular.len(),
                        plural: plural.len(),
                    });
                }
                let (Some(singular), Some(plural)) =
                    (candidates.singular.first(), plural.first())
                else {
                    return Ok(());
                };
                if singular.is_empty() {
                    self.empty_message(rule, site);
                    return Ok(());
                }
                for context in contexts {
                    self.upsert(context, singular.clone(), Some(plural.clone()), &reference);
                }
            }
            None => {
                for singular in &candidates.singular {
                    if singular.is_empty() {
                        self.empty_message(rule, site);
                        continue;
                    }
                    for context in &contexts {
                        self.upsert(context.clone(), singular.clone(), None, &reference);
                    }
                }
            }
        }
        Ok(())
    }

    fn upsert(
        &mut self,
        context: Option<String>,
        singular: String,
        plural: Option<String>,
        reference: &SourceReference,
    ) {
        if self
            .store
            .upsert(context, singular.clone(), plural, reference.clone())
        {
            tracing::debug!(message = %singular, reference = %reference, "new message");
        }
    }

    fn evaluate_arg(
        &mut self,
        tree: &SourceTree,
        rule: &ExtractionRule,
        node: &SyntaxNode,
    ) -> Option<IndexSet<String>> {
        match self.evaluator.evaluate(node) {
            Ok(values) => Some(values),
            Err(err) => {
                tracing::warn!(
                    rule = rule.name(),
                    path = %tree.path,
                    line = err.position.line,
                    expression = %err.expression,
                    "{}",
                    err.reason
                );
                self.issues
                    .push(Issue::EvaluationFailed(EvaluationFailedIssue {
                        context: issue_context(tree, &err),
                        rule: rule.name().to_string(),
                        expression: err.expression,
                        reason: err.reason.to_string(),
                    }));
                None
            }
        }
    }

    fn unresolved_tag_field(
        &mut self,
        tree: &SourceTree,
        rule: &ExtractionRule,
        field: &str,
        err: EvaluationError,
    ) {
        tracing::warn!(
            rule = rule.name(),
            path = %tree.path,
            line = err.position.line,
            field,
            expression = %err.expression,
            "{}",
            err.reason
        );
        self.issues
            .push(Issue::UnresolvedTagField(UnresolvedTagFieldIssue {
                context: issue_context(tree, &err),
                rule: rule.name().to_string(),
                field: field.to_string(),
                expression: err.expression,
                reason: err.reason.to_string(),
            }));
    }

    fn empty_message(&mut self, rule: &ExtractionRule, site: &Site<'_>) {
        tracing::warn!(
            rule = rule.name(),
            path = site.path,
            line = site.position.line,
            "empty message skipped"
        );
        self.issues.push(Issue::EmptyMessage(EmptyMessageIssue {
            context: SourceContext::new(
                site.path,
                site.position.line,
                site.position.column + 1,
                site.source_line,
            ),
            rule: rule.name().to_string(),
        }));
    }
}

fn issue_context(tree: &SourceTree, err: &EvaluationError) -> SourceContext {
    SourceContext::new(
        &tree.path,
        err.position.line,
        err.position.column + 1,
        tree.source_line(err.position.line),
    )
}
