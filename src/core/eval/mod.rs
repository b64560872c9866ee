//! Constant folding of message arguments.
//!
//! Every sub-expression folds to an ordered set of candidate values. Conditionals contribute
//! both branches, and binary operators combine candidates as a cartesian product (left
//! operand major). Nothing outside the fixed set of constructs below is ever executed.
//!
//! ## Module Structure
//!
//! - `builtins`: whitelisted pure string operations
//! - `constants`: project constant table (`ProjectConstants`)

pub mod builtins;
pub mod constants;

use std::fmt;

use indexmap::IndexSet;
use thiserror::Error;

use crate::core::syntax::{
    BinaryOp, Construction, FieldRef, Invocation, Literal, NodeKind, Position, SyntaxNode, UnaryOp,
};

pub use constants::ProjectConstants;

/// Maximum expression nesting the evaluator descends into.
pub const MAX_DEPTH: usize = 64;

/// Maximum number of candidates a single node may fold to.
pub const MAX_CANDIDATES: usize = 1024;

/// Maximum length, in bytes, of a folded string.
pub const MAX_RESULT_LEN: usize = 64 * 1024;

/// A folded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Folded {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
    Array(Vec<Folded>),
}

impl Folded {
    pub fn type_name(&self) -> &'static str {
        match self {
            Folded::Str(_) => "string",
            Folded::Num(_) => "number",
            Folded::Bool(_) => "boolean",
            Folded::Null => "null",
            Folded::Array(_) => "array",
        }
    }

    /// String conversion used by concatenation.
    pub fn to_js_string(&self) -> String {
        match self {
            Folded::Str(s) => s.clone(),
            Folded::Num(n) => format_number(*n),
            Folded::Bool(b) => b.to_string(),
            Folded::Null => "null".to_string(),
            Folded::Array(items) => items
                .iter()
                .map(|item| match item {
                    Folded::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl fmt::Display for Folded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Folded::Str(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other.to_js_string()),
        }
    }
}

/// Number formatting as JavaScript prints it for common values.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Why a node could not be folded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalReason {
    #[error("operator '{0}' is not supported")]
    UnsupportedOperator(String),
    #[error("operator '{op}' cannot combine {left} and {right}")]
    NonNumericOperands {
        op: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("'{0}' is not a constant")]
    NonConstantField(String),
    #[error("unknown constant '{0}'")]
    UnknownConstant(String),
    #[error("cyclic constant '{0}'")]
    CyclicConstant(String),
    #[error("call to '{0}' cannot be evaluated")]
    UnsupportedCall(String),
    #[error("invalid arguments for '{0}'")]
    InvalidArguments(String),
    #[error("{0} value is not a message")]
    NotAString(&'static str),
    #[error("{0} cannot be evaluated")]
    Opaque(String),
    #[error("expression nesting is too deep")]
    TooDeep,
    #[error("expression has more than {MAX_CANDIDATES} candidate values")]
    TooManyCandidates,
    #[error("folded string is longer than {MAX_RESULT_LEN} bytes")]
    ResultTooLong,
}

/// A node-scoped evaluation failure. Only the occurrence it belongs to is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot evaluate `{expression}`: {reason}")]
pub struct EvaluationError {
    pub position: Position,
    pub expression: String,
    pub reason: EvalReason,
}

impl EvaluationError {
    fn at(node: &SyntaxNode, reason: EvalReason) -> Self {
        Self {
            position: node.position,
            expression: node.to_string(),
            reason,
        }
    }
}

/// Source of constant values and whitelisted operations.
pub trait ConstantResolver {
    /// Candidates of a constant field.
    fn read_field(&self, field: &FieldRef) -> Result<Vec<Folded>, EvalReason>;

    /// Apply a call with already folded receiver and arguments.
    fn invoke(
        &self,
        call: &Invocation,
        receiver: Option<&Folded>,
        args: &[Folded],
    ) -> Result<Folded, EvalReason>;

    fn construct(&self, new: &Construction, args: &[Folded]) -> Result<Folded, EvalReason>;
}

pub struct Evaluator<'a> {
    resolver: &'a dyn ConstantResolver,
}

impl<'a> Evaluator<'a> {
    pub fn new(resolver: &'a dyn ConstantResolver) -> Self {
        Self { resolver }
    }

    /// Fold `node` to its ordered set of candidate messages.
    ///
    /// Array values contribute each element as a candidate.
    pub fn evaluate(&self, node: &SyntaxNode) -> Result<IndexSet<String>, EvaluationError> {
        let mut messages = IndexSet::new();
        for value in self.fold(node, 0)? {
            match value {
                Folded::Str(s) => {
                    messages.insert(s);
                }
                Folded::Array(items) => {
                    for item in items {
                        match item {
                            Folded::Str(s) => {
                                messages.insert(s);
                            }
                            other => {
                                return Err(EvaluationError::at(
                                    node,
                                    EvalReason::NotAString(other.type_name()),
                                ));
                            }
                        }
                    }
                }
                other => {
                    return Err(EvaluationError::at(
                        node,
                        EvalReason::NotAString(other.type_name()),
                    ));
                }
            }
        }
        Ok(messages)
    }

    /// Fold `node` to its candidate values without the top-level string requirement.
    pub fn fold(&self, node: &SyntaxNode, depth: usize) -> Result<Vec<Folded>, EvaluationError> {
        if depth > MAX_DEPTH {
            return Err(EvaluationError::at(node, EvalReason::TooDeep));
        }
        let next = depth + 1;

        match &node.kind {
            NodeKind::Literal(literal) => Ok(vec![match literal {
                Literal::Str(s) => Folded::Str(s.clone()),
                Literal::Num(n) => Folded::Num(*n),
                Literal::Bool(b) => Folded::Bool(*b),
                Literal::Null => Folded::Null,
            }]),
            NodeKind::Binary { op, left, right } => {
                let left = self.fold(left, next)?;
                let right = self.fold(right, next)?;
                check_product(node, [left.len(), right.len()])?;
                let mut out = Vec::new();
                for l in &left {
                    for r in &right {
                        let value =
                            binary(*op, l, r).map_err(|reason| EvaluationError::at(node, reason))?;
                        push_unique(&mut out, value);
                    }
                }
                Ok(out)
            }
            NodeKind::Unary { op, operand } => match op {
                UnaryOp::Plus | UnaryOp::PostIncrement | UnaryOp::PostDecrement => {
                    self.fold(operand, next)
                }
                other => Err(EvaluationError::at(
                    node,
                    EvalReason::UnsupportedOperator(other.to_string()),
                )),
            },
            NodeKind::Conditional {
                consequent,
                alternate,
                ..
            } => {
                let mut out = self.fold(consequent, next)?;
                let alternate = self.fold(alternate, next)?;
                check_product(node, [out.len() + alternate.len()])?;
                for value in alternate {
                    push_unique(&mut out, value);
                }
                Ok(out)
            }
            NodeKind::FieldAccess(field) => {
                if !field.constant {
                    return Err(EvaluationError::at(
                        node,
                        EvalReason::NonConstantField(field.name.clone()),
                    ));
                }
                self.resolver
                    .read_field(field)
                    .map_err(|reason| EvaluationError::at(node, reason))
            }
            NodeKind::Invocation(call) => {
                let receiver = match &call.receiver {
                    Some(receiver) => Some(self.fold(receiver, next)?),
                    None => None,
                };
                let args = self.fold_all(&call.args, next)?;
                let receivers = receiver.as_ref().map_or(1, Vec::len);
                check_product(node, args.iter().map(Vec::len).chain([receivers]))?;

                let mut out = Vec::new();
                for combo in cartesian(&args) {
                    match &receiver {
                        Some(receivers) => {
                            for value in receivers {
                                let result = self
                                    .resolver
                                    .invoke(call, Some(value), &combo)
                                    .map_err(|reason| EvaluationError::at(node, reason))?;
                                push_unique(&mut out, result);
                            }
                        }
                        None => {
                            let result = self
                                .resolver
                                .invoke(call, None, &combo)
                                .map_err(|reason| EvaluationError::at(node, reason))?;
                            push_unique(&mut out, result);
                        }
                    }
                }
                Ok(out)
            }
            NodeKind::NewObject(new) => {
                let args = self.fold_all(&new.args, next)?;
                check_product(node, args.iter().map(Vec::len))?;
                let mut out = Vec::new();
                for combo in cartesian(&args) {
                    let result = self
                        .resolver
                        .construct(new, &combo)
                        .map_err(|reason| EvaluationError::at(node, reason))?;
                    push_unique(&mut out, result);
                }
                Ok(out)
            }
            NodeKind::ArrayLiteral(items) => {
                let items = self.fold_all(items, next)?;
                check_product(node, items.iter().map(Vec::len))?;
                Ok(cartesian(&items).into_iter().map(Folded::Array).collect())
            }
            NodeKind::TagUse(_) => Err(EvaluationError::at(
                node,
                EvalReason::Opaque("decorator".to_string()),
            )),
            NodeKind::Opaque { description } => Err(EvaluationError::at(
                node,
                EvalReason::Opaque(description.clone()),
            )),
        }
    }

    fn fold_all(
        &self,
        nodes: &[SyntaxNode],
        depth: usize,
    ) -> Result<Vec<Vec<Folded>>, EvaluationError> {
        nodes.iter().map(|node| self.fold(node, depth)).collect()
    }
}

fn binary(op: BinaryOp, left: &Folded, right: &Folded) -> Result<Folded, EvalReason> {
    let non_numeric = || EvalReason::NonNumericOperands {
        op: op.to_string(),
        left: left.type_name(),
        right: right.type_name(),
    };

    match op {
        BinaryOp::Add => match (left, right) {
            (Folded::Str(_), _) | (_, Folded::Str(_)) => {
                let joined = format!("{}{}", left.to_js_string(), right.to_js_string());
                if joined.len() > MAX_RESULT_LEN {
                    return Err(EvalReason::ResultTooLong);
                }
                Ok(Folded::Str(joined))
            }
            (Folded::Num(l), Folded::Num(r)) => Ok(Folded::Num(l + r)),
            _ => Err(non_numeric()),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let (Folded::Num(l), Folded::Num(r)) = (left, right) else {
                return Err(non_numeric());
            };
            Ok(Folded::Num(match op {
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                _ => l % r,
            }))
        }
        BinaryOp::Other(op) => Err(EvalReason::UnsupportedOperator(op.to_string())),
    }
}

/// Fail when combining candidate lists of these sizes would exceed [`MAX_CANDIDATES`].
fn check_product(
    node: &SyntaxNode,
    sizes: impl IntoIterator<Item = usize>,
) -> Result<(), EvaluationError> {
    let total = sizes
        .into_iter()
        .try_fold(1usize, |acc, size| acc.checked_mul(size));
    match total {
        Some(total) if total <= MAX_CANDIDATES => Ok(()),
        _ => Err(EvaluationError::at(node, EvalReason::TooManyCandidates)),
    }
}

fn push_unique(values: &mut Vec<Folded>, value: Folded) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// Every combination picking one candidate per position, first position major.
fn cartesian(lists: &[Vec<Folded>]) -> Vec<Vec<Folded>> {
    lists.iter().fold(vec![Vec::new()], |acc, candidates| {
        acc.iter()
            .flat_map(|prefix| {
                candidates.iter().map(move |value| {
                    let mut combo = prefix.clone();
                    combo.push(value.clone());
                    combo
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::eval::*;

    /// Resolver that knows a single constant and refuses every call.
    struct OneConstant;

    impl ConstantResolver for OneConstant {
        fn read_field(&self, field: &FieldRef) -> Result<Vec<Folded>, EvalReason> {
            match field.name.as_str() {
                "SAVE" => Ok(vec![Folded::Str("Save".to_string())]),
                other => Err(EvalReason::UnknownConstant(other.to_string())),
            }
        }

        fn invoke(
            &self,
            call: &Invocation,
            _receiver: Option<&Folded>,
            _args: &[Folded],
        ) -> Result<Folded, EvalReason> {
            Err(EvalReason::UnsupportedCall(call.name.clone()))
        }

        fn construct(&self, new: &Construction, _args: &[Folded]) -> Result<Folded, EvalReason> {
            Err(EvalReason::UnsupportedCall(
                new.type_name.clone().unwrap_or_default(),
            ))
        }
    }

    fn s(value: &str) -> SyntaxNode {
        SyntaxNode::string(value, Position::line(1))
    }

    fn n(value: f64) -> SyntaxNode {
        SyntaxNode::number(value, Position::line(1))
    }

    fn add(left: SyntaxNode, right: SyntaxNode) -> SyntaxNode {
        SyntaxNode::binary(BinaryOp::Add, left, right)
    }

    fn ternary(consequent: SyntaxNode, alternate: SyntaxNode) -> SyntaxNode {
        SyntaxNode::new(
            NodeKind::Conditional {
                test: Box::new(SyntaxNode::opaque("flag", Position::line(1))),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            Position::line(1),
        )
    }

    fn field(name: &str, constant: bool) -> SyntaxNode {
        SyntaxNode::new(
            NodeKind::FieldAccess(FieldRef {
                owner: Some("src/labels".to_string()),
                name: name.to_string(),
                constant,
            }),
            Position::line(1),
        )
    }

    fn evaluate(node: &SyntaxNode) -> Result<Vec<String>, EvaluationError> {
        Evaluator::new(&OneConstant)
            .evaluate(node)
            .map(|set| set.into_iter().collect())
    }

    #[test]
    fn test_concatenation_folds() {
        let node = add(add(s("Hello"), s(", ")), s("World"));
        assert_eq!(evaluate(&node).unwrap(), vec!["Hello, World"]);
    }

    #[test]
    fn test_numbers_stringify_inside_concatenation() {
        assert_eq!(evaluate(&add(s("Page "), n(2.0))).unwrap(), vec!["Page 2"]);
        assert_eq!(evaluate(&add(s("x"), n(1.5))).unwrap(), vec!["x1.5"]);
        // 1 + 2 folds numerically before meeting the string
        assert_eq!(
            evaluate(&add(add(n(1.0), n(2.0)), s("px"))).unwrap(),
            vec!["3px"]
        );
    }

    #[test]
    fn test_ternary_fans_out_in_order() {
        let node = add(ternary(s("Open"), s("Close")), s(" file"));
        assert_eq!(evaluate(&node).unwrap(), vec!["Open file", "Close file"]);
    }

    #[test]
    fn test_product_is_left_major() {
        let node = add(ternary(s("a"), s("b")), ternary(s("1"), s("2")));
        assert_eq!(evaluate(&node).unwrap(), vec!["a1", "a2", "b1", "b2"]);
    }

    #[test]
    fn test_duplicate_candidates_collapse() {
        let node = ternary(s("Same"), s("Same"));
        assert_eq!(evaluate(&node).unwrap(), vec!["Same"]);
    }

    #[test]
    fn test_subtraction_of_strings_is_an_error() {
        let node = SyntaxNode::binary(BinaryOp::Sub, s("a"), s("b"));
        let err = evaluate(&node).unwrap_err();
        assert_eq!(
            err.reason,
            EvalReason::NonNumericOperands {
                op: "-".to_string(),
                left: "string",
                right: "string",
            }
        );
        assert_eq!(err.expression, r#""a" - "b""#);
    }

    #[test]
    fn test_numeric_arithmetic_is_not_a_message() {
        let node = SyntaxNode::binary(BinaryOp::Mul, n(2.0), n(3.0));
        assert_eq!(
            evaluate(&node).unwrap_err().reason,
            EvalReason::NotAString("number")
        );
        assert_eq!(
            evaluate(&add(s("x"), SyntaxNode::binary(BinaryOp::Mul, n(2.0), n(3.0)))).unwrap(),
            vec!["x6"]
        );
    }

    #[test]
    fn test_constant_fields() {
        assert_eq!(
            evaluate(&add(field("SAVE", true), s("!"))).unwrap(),
            vec!["Save!"]
        );
        assert_eq!(
            evaluate(&field("label", false)).unwrap_err().reason,
            EvalReason::NonConstantField("label".to_string())
        );
        assert_eq!(
            evaluate(&field("MISSING", true)).unwrap_err().reason,
            EvalReason::UnknownConstant("MISSING".to_string())
        );
    }

    #[test]
    fn test_unary_operators() {
        let plus = SyntaxNode::new(
            NodeKind::Unary {
                op: UnaryOp::Plus,
                operand: Box::new(s("kept")),
            },
            Position::line(1),
        );
        assert_eq!(evaluate(&plus).unwrap(), vec!["kept"]);

        let not = SyntaxNode::new(
            NodeKind::Unary {
                op: UnaryOp::Not,
                operand: Box::new(s("x")),
            },
            Position::line(1),
        );
        assert_eq!(
            evaluate(&not).unwrap_err().reason,
            EvalReason::UnsupportedOperator("!".to_string())
        );
    }

    #[test]
    fn test_array_elements_become_candidates() {
        let node = SyntaxNode::new(
            NodeKind::ArrayLiteral(vec![s("One"), ternary(s("Two"), s("Three"))]),
            Position::line(1),
        );
        assert_eq!(evaluate(&node).unwrap(), vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_null_and_opaque_are_rejected() {
        let null = SyntaxNode::new(NodeKind::Literal(Literal::Null), Position::line(1));
        assert_eq!(
            evaluate(&null).unwrap_err().reason,
            EvalReason::NotAString("null")
        );
        let opaque = add(s("Hi "), SyntaxNode::opaque("name", Position::line(1)));
        assert_eq!(
            evaluate(&opaque).unwrap_err().reason,
            EvalReason::Opaque("name".to_string())
        );
    }

    #[test]
    fn test_nesting_is_capped() {
        let mut node = s("x");
        for _ in 0..=MAX_DEPTH {
            node = SyntaxNode::new(
                NodeKind::Unary {
                    op: UnaryOp::Plus,
                    operand: Box::new(node),
                },
                Position::line(1),
            );
        }
        assert_eq!(evaluate(&node).unwrap_err().reason, EvalReason::TooDeep);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_format_large_integral_numbers() {
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(-9.5e18), "-9500000000000000000");
        assert_eq!(
            evaluate(&add(s("x"), n(1e20))).unwrap(),
            vec!["x100000000000000000000"]
        );
    }

    #[test]
    fn test_candidate_explosion_is_an_error() {
        let chain = |terms: usize| {
            (0..terms)
                .map(|i| ternary(s(&format!("a{}", i)), s(&format!("b{}", i))))
                .reduce(add)
                .unwrap()
        };

        // 2^10 candidates are still folded
        assert_eq!(evaluate(&chain(10)).unwrap().len(), MAX_CANDIDATES);
        assert_eq!(
            evaluate(&chain(11)).unwrap_err().reason,
            EvalReason::TooManyCandidates
        );
    }

    #[test]
    fn test_oversized_concatenation_is_an_error() {
        let long = "a".repeat(MAX_RESULT_LEN);
        assert_eq!(
            evaluate(&add(s(&long), s("b"))).unwrap_err().reason,
            EvalReason::ResultTooLong
        );
    }
}
