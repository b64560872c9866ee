//! Type names as written in annotations, resolved to qualified names once the project
//! declaration index exists.

use swc_ecma_ast::{
    Expr, Lit, MemberProp, Pat, TsEntityName, TsKeywordTypeKind, TsType, TsTypeAnn,
};

use crate::core::syntax::ModuleNames;

pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrittenType {
    /// `string`, `number`, `boolean`, `null`.
    Keyword(&'static str),
    /// A type reference, possibly dotted (`i18n.Translator`).
    Named(String),
    Array(Box<WrittenType>),
    Unknown,
}

impl WrittenType {
    pub fn from_ts(ty: &TsType) -> Self {
        match ty {
            TsType::TsKeywordType(keyword) => match keyword.kind {
                TsKeywordTypeKind::TsStringKeyword => WrittenType::Keyword("string"),
                TsKeywordTypeKind::TsNumberKeyword => WrittenType::Keyword("number"),
                TsKeywordTypeKind::TsBooleanKeyword => WrittenType::Keyword("boolean"),
                TsKeywordTypeKind::TsNullKeyword => WrittenType::Keyword("null"),
                _ => WrittenType::Unknown,
            },
            TsType::TsArrayType(array) => {
                WrittenType::Array(Box::new(WrittenType::from_ts(&array.elem_type)))
            }
            TsType::TsTypeRef(type_ref) => WrittenType::Named(entity_name(&type_ref.type_name)),
            _ => WrittenType::Unknown,
        }
    }

    pub fn from_annotation(ann: Option<&TsTypeAnn>) -> Self {
        ann.map(|ann| WrittenType::from_ts(&ann.type_ann))
            .unwrap_or(WrittenType::Unknown)
    }

    /// Declared type of a parameter pattern; defaults infer from their initializer.
    pub fn from_pat(pat: &Pat) -> Self {
        match pat {
            Pat::Ident(ident) => WrittenType::from_annotation(ident.type_ann.as_deref()),
            Pat::Assign(assign) => match WrittenType::from_pat(&assign.left) {
                WrittenType::Unknown => WrittenType::from_initializer(&assign.right),
                declared => declared,
            },
            _ => WrittenType::Unknown,
        }
    }

    /// Type of a declaration without annotation, inferred from its initializer.
    pub fn from_initializer(expr: &Expr) -> Self {
        match expr {
            Expr::Lit(Lit::Str(_)) | Expr::Tpl(_) => WrittenType::Keyword("string"),
            Expr::Lit(Lit::Num(_)) => WrittenType::Keyword("number"),
            Expr::Lit(Lit::Bool(_)) => WrittenType::Keyword("boolean"),
            Expr::New(new) => dotted_name(&new.callee)
                .map(WrittenType::Named)
                .unwrap_or(WrittenType::Unknown),
            Expr::TsAs(ts_as) => WrittenType::from_ts(&ts_as.type_ann),
            Expr::Paren(paren) => WrittenType::from_initializer(&paren.expr),
            Expr::TsConstAssertion(assertion) => WrittenType::from_initializer(&assertion.expr),
            Expr::TsSatisfies(satisfies) => WrittenType::from_initializer(&satisfies.expr),
            _ => WrittenType::Unknown,
        }
    }

    /// Resolve against the names visible in a module.
    ///
    /// Names that resolve to nothing (library or ambient types) stay as written.
    pub fn resolve(&self, names: &ModuleNames<'_>) -> String {
        match self {
            WrittenType::Keyword(keyword) => keyword.to_string(),
            WrittenType::Named(name) => names.resolve(name).unwrap_or_else(|| name.clone()),
            WrittenType::Array(element) => format!("{}[]", element.resolve(names)),
            WrittenType::Unknown => UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, WrittenType::Unknown)
    }
}

fn entity_name(name: &TsEntityName) -> String {
    match name {
        TsEntityName::Ident(ident) => ident.sym.to_string(),
        TsEntityName::TsQualifiedName(qualified) => {
            format!("{}.{}", entity_name(&qualified.left), qualified.right.sym)
        }
    }
}

/// `a`, `a.b.c` for identifier chains; `None` for anything else.
pub fn dotted_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(prop) => {
                dotted_name(&member.obj).map(|obj| format!("{}.{}", obj, prop.sym))
            }
            _ => None,
        },
        Expr::Paren(paren) => dotted_name(&paren.expr),
        _ => None,
    }
}
