//! Second pass: lower one file into [`SyntaxNode`] sites and constant initializers.

use std::collections::HashMap;

use swc_common::{SourceMap, SourceMapper, Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BinaryOp as SwcBinaryOp, BlockStmt, CallExpr, Callee, ClassDecl, ClassExpr,
    ClassProp, Constructor, Decorator, DefaultDecl, ExportDefaultDecl, Expr, ExprOrSpread,
    Function, Lit, MemberExpr, MemberProp, NewExpr, ParamOrTsParamProp, Pat, Prop, PropOrSpread,
    TsEnumDecl, TsEnumMemberId, TsParamPropParam, Tpl, UnaryOp as SwcUnaryOp, UpdateOp, VarDecl,
    VarDeclKind,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::eval::builtins::STRING_METHODS;
use crate::core::lower::declarations::{prop_name, unwrap_transparent};
use crate::core::lower::index::ProjectIndex;
use crate::core::lower::types::{UNKNOWN, WrittenType, dotted_name};
use crate::core::syntax::{
    BinaryOp, Construction, FieldRef, Invocation, Literal, ModuleNames, NodeKind, Position,
    SyntaxNode, TagUse, UnaryOp,
    scope::{GLOBAL_OWNER, qualify},
};

const DESCRIPTION_LIMIT: usize = 40;

/// A constant initializer found in a file: `(owner, name, initializer)`.
pub type ConstantInit = (String, String, SyntaxNode);

#[derive(Debug, Clone, Default)]
struct Binding {
    ty: Option<String>,
    /// Lowered initializer of a `const` binding.
    value: Option<SyntaxNode>,
}

pub struct Lowerer<'a> {
    source_map: &'a SourceMap,
    names: ModuleNames<'a>,
    index: &'a ProjectIndex,
    scopes: Vec<HashMap<String, Binding>>,
    classes: Vec<Option<String>>,
    sites: Vec<SyntaxNode>,
    constants: Vec<ConstantInit>,
}

impl<'a> Lowerer<'a> {
    pub fn new(source_map: &'a SourceMap, names: ModuleNames<'a>, index: &'a ProjectIndex) -> Self {
        Self {
            source_map,
            names,
            index,
            scopes: Vec::new(),
            classes: Vec::new(),
            sites: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Sites in source order and the constant initializers of the file.
    pub fn finish(mut self) -> (Vec<SyntaxNode>, Vec<ConstantInit>) {
        self.sites
            .sort_by_key(|site| (site.position.line, site.position.column));
        (self.sites, self.constants)
    }

    fn position(&self, span: Span) -> Position {
        let lo = self.source_map.lookup_char_pos(span.lo);
        let hi = self.source_map.lookup_char_pos(span.hi);
        Position::new(lo.line, lo.col.0, hi.line, hi.col.0)
    }

    fn opaque(&self, span: Span) -> SyntaxNode {
        let snippet = self.source_map.span_to_snippet(span).unwrap_or_default();
        let compact = snippet.split_whitespace().collect::<Vec<_>>().join(" ");
        let description = if compact.is_empty() {
            "expression".to_string()
        } else if compact.chars().count() > DESCRIPTION_LIMIT {
            let head: String = compact.chars().take(DESCRIPTION_LIMIT).collect();
            format!("{}...", head)
        } else {
            compact
        };
        SyntaxNode::opaque(description, self.position(span))
    }

    fn current_class(&self) -> Option<&str> {
        self.classes.last().and_then(|class| class.as_deref())
    }

    fn binding(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn declare(&mut self, name: String, binding: Binding) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, binding);
        }
    }

    fn resolve_type(&self, ty: &WrittenType) -> Option<String> {
        (!ty.is_unknown()).then(|| ty.resolve(&self.names))
    }

    fn declare_pat(&mut self, pat: &Pat) {
        let name = match pat {
            Pat::Ident(binding) => binding.id.sym.to_string(),
            Pat::Assign(assign) => match &*assign.left {
                Pat::Ident(binding) => binding.id.sym.to_string(),
                _ => return,
            },
            _ => return,
        };
        let ty = self.resolve_type(&WrittenType::from_pat(pat));
        self.declare(name, Binding { ty, value: None });
    }

    /// Resolve a written path to a module-level name, unless a local binding shadows it.
    fn static_path(&self, expr: &Expr) -> Option<String> {
        let dotted = dotted_name(expr)?;
        let head = dotted.split('.').next().unwrap_or(&dotted);
        if self.binding(head).is_some() {
            return None;
        }
        self.names.resolve(&dotted)
    }

    // ---- expressions ----

    fn lower_expr(&self, expr: &Expr) -> SyntaxNode {
        let expr = unwrap_transparent(expr);
        let position = self.position(expr.span());

        match expr {
            Expr::Lit(lit) => match lit {
                Lit::Str(s) => SyntaxNode::string(s.value.to_string_lossy(), position),
                Lit::Num(n) => SyntaxNode::number(n.value, position),
                Lit::Bool(b) => SyntaxNode::new(NodeKind::Literal(Literal::Bool(b.value)), position),
                Lit::Null(_) => SyntaxNode::new(NodeKind::Literal(Literal::Null), position),
                _ => self.opaque(expr.span()),
            },
            Expr::Tpl(tpl) => self
                .lower_template(tpl)
                .unwrap_or_else(|| self.opaque(expr.span())),
            Expr::Bin(bin) => SyntaxNode::new(
                NodeKind::Binary {
                    op: binary_op(bin.op),
                    left: Box::new(self.lower_expr(&bin.left)),
                    right: Box::new(self.lower_expr(&bin.right)),
                },
                position,
            ),
            Expr::Unary(unary) => SyntaxNode::new(
                NodeKind::Unary {
                    op: unary_op(unary.op),
                    operand: Box::new(self.lower_expr(&unary.arg)),
                },
                position,
            ),
            Expr::Update(update) => {
                let op = match (update.op, update.prefix) {
                    (UpdateOp::PlusPlus, true) => UnaryOp::PreIncrement,
                    (UpdateOp::PlusPlus, false) => UnaryOp::PostIncrement,
                    (UpdateOp::MinusMinus, true) => UnaryOp::PreDecrement,
                    (UpdateOp::MinusMinus, false) => UnaryOp::PostDecrement,
                };
                SyntaxNode::new(
                    NodeKind::Unary {
                        op,
                        operand: Box::new(self.lower_expr(&update.arg)),
                    },
                    position,
                )
            }
            Expr::Cond(cond) => SyntaxNode::new(
                NodeKind::Conditional {
                    test: Box::new(self.lower_expr(&cond.test)),
                    consequent: Box::new(self.lower_expr(&cond.cons)),
                    alternate: Box::new(self.lower_expr(&cond.alt)),
                },
                position,
            ),
            Expr::Array(array) => {
                let items = array
                    .elems
                    .iter()
                    .map(|elem| match elem {
                        Some(arg) => self.lower_arg(arg),
                        None => SyntaxNode::opaque("<hole>", position),
                    })
                    .collect();
                SyntaxNode::new(NodeKind::ArrayLiteral(items), position)
            }
            Expr::Call(call) => self
                .lower_call(call)
                .unwrap_or_else(|| self.opaque(expr.span())),
            Expr::New(new) => self.lower_new(new),
            Expr::Ident(ident) => self.lower_ident(ident.sym.as_str(), position),
            Expr::Member(member) => self.lower_member(member, position),
            _ => self.opaque(expr.span()),
        }
    }

    fn lower_arg(&self, arg: &ExprOrSpread) -> SyntaxNode {
        match arg.spread {
            Some(spread) => self.opaque(spread.with_hi(arg.expr.span().hi)),
            None => self.lower_expr(&arg.expr),
        }
    }

    /// `` `a${b}c` `` becomes `"a" + b + "c"`; empty chunks after the first are dropped.
    fn lower_template(&self, tpl: &Tpl) -> Option<SyntaxNode> {
        let chunk = |index: usize| -> Option<SyntaxNode> {
            let quasi = tpl.quasis.get(index)?;
            let cooked = quasi.cooked.as_ref().and_then(|c| c.as_str())?;
            Some(SyntaxNode::string(cooked, self.position(quasi.span)))
        };

        let mut node = chunk(0)?;
        for (index, expr) in tpl.exprs.iter().enumerate() {
            node = SyntaxNode::binary(BinaryOp::Add, node, self.lower_expr(expr));
            let next = chunk(index + 1)?;
            if !matches!(&next.kind, NodeKind::Literal(Literal::Str(s)) if s.is_empty()) {
                node = SyntaxNode::binary(BinaryOp::Add, node, next);
            }
        }
        Some(node)
    }

    fn lower_ident(&self, name: &str, position: Position) -> SyntaxNode {
        if let Some(binding) = self.binding(name) {
            return binding
                .value
                .clone()
                .unwrap_or_else(|| SyntaxNode::opaque(name, position));
        }
        if let Some(resolved) = self.names.resolve(name)
            && let Some((owner, field)) = resolved.split_once('#')
            && let Some(constant) = self.index.field_kind(owner, field)
        {
            return SyntaxNode::new(
                NodeKind::FieldAccess(FieldRef {
                    owner: Some(owner.to_string()),
                    name: field.to_string(),
                    constant,
                }),
                position,
            );
        }
        SyntaxNode::opaque(name, position)
    }

    fn lower_member(&self, member: &MemberExpr, position: Position) -> SyntaxNode {
        let span = member.span;
        let Some(name) = member_name(&member.prop) else {
            return self.opaque(span);
        };
        let obj = unwrap_transparent(&member.obj);

        let field = |owner: String, constant: bool| {
            SyntaxNode::new(
                NodeKind::FieldAccess(FieldRef {
                    owner: Some(owner),
                    name: name.clone(),
                    constant,
                }),
                position,
            )
        };

        if let Expr::This(_) = obj {
            return match self.current_class() {
                Some(class) => field(class.to_string(), false),
                None => self.opaque(span),
            };
        }
        if let Some(owner) = self.static_path(obj)
            && let Some(constant) = self.index.field_kind(&owner, &name)
        {
            return field(owner, constant);
        }
        self.opaque(span)
    }

    fn lower_call(&self, call: &CallExpr) -> Option<SyntaxNode> {
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        let args: Vec<SyntaxNode> = call.args.iter().map(|arg| self.lower_arg(arg)).collect();

        let invocation = match unwrap_transparent(callee) {
            Expr::Ident(ident) => self.free_call(ident.sym.as_str(), &call.args, args),
            Expr::Member(member) => {
                let name = member_name(&member.prop)?;
                self.member_call(member, name, &call.args, args)
            }
            _ => return None,
        };
        Some(SyntaxNode::new(
            NodeKind::Invocation(invocation),
            self.position(call.span),
        ))
    }

    fn free_call(&self, name: &str, raw_args: &[ExprOrSpread], args: Vec<SyntaxNode>) -> Invocation {
        let (owner, name, declared) = if self.binding(name).is_some() {
            (None, name.to_string(), None)
        } else {
            match self.names.resolve(name) {
                Some(resolved) => match resolved.split_once('#') {
                    Some((module, function)) => (
                        Some(module.to_string()),
                        function.to_string(),
                        self.index.functions.get(&resolved),
                    ),
                    None => (None, name.to_string(), None),
                },
                None => (Some(GLOBAL_OWNER.to_string()), name.to_string(), None),
            }
        };

        Invocation {
            receiver: None,
            owner,
            name,
            is_static: false,
            param_types: self.param_types(declared.map(Vec::as_slice), raw_args),
            args,
        }
    }

    fn member_call(
        &self,
        member: &MemberExpr,
        name: String,
        raw_args: &[ExprOrSpread],
        args: Vec<SyntaxNode>,
    ) -> Invocation {
        let obj = unwrap_transparent(&member.obj);

        // `ns.fn()` on a namespace import is a free function of that module
        if let Expr::Ident(ident) = obj
            && self.binding(ident.sym.as_str()).is_none()
            && let Some(import) = self.names.import_for(ident.sym.as_str())
            && import.is_namespace()
        {
            let declared = self.index.functions.get(&qualify(&import.module, &name));
            return Invocation {
                receiver: None,
                owner: Some(import.module.clone()),
                name,
                is_static: false,
                param_types: self.param_types(declared.map(Vec::as_slice), raw_args),
                args,
            };
        }

        // `Class.method()`
        if let Some(owner) = self.static_path(obj)
            && self.index.is_type(&owner)
        {
            let declared = self
                .index
                .types
                .find_method(&owner, &name, true)
                .map(|method| method.params.as_slice());
            return Invocation {
                receiver: None,
                param_types: self.param_types(declared, raw_args),
                owner: Some(owner),
                name,
                is_static: true,
                args,
            };
        }

        let owner = self.type_of(obj);
        let declared = owner
            .as_deref()
            .and_then(|owner| self.index.types.find_method(owner, &name, false))
            .map(|method| method.params.as_slice());
        Invocation {
            receiver: Some(Box::new(self.lower_expr(obj))),
            param_types: self.param_types(declared, raw_args),
            owner,
            name,
            is_static: false,
            args,
        }
    }

    fn constructed_type(&self, new: &NewExpr) -> Option<String> {
        let written = dotted_name(unwrap_transparent(&new.callee))?;
        Some(
            self.static_path(&new.callee)
                .unwrap_or_else(|| qualify(GLOBAL_OWNER, &written)),
        )
    }

    fn lower_new(&self, new: &NewExpr) -> SyntaxNode {
        let raw_args = new.args.as_deref().unwrap_or_default();
        let type_name = self.constructed_type(new);
        let declared = type_name
            .as_deref()
            .and_then(|name| self.index.types.by_name(name))
            .and_then(|node| node.constructor.as_deref());

        SyntaxNode::new(
            NodeKind::NewObject(Construction {
                param_types: self.param_types(declared, raw_args),
                type_name,
                args: raw_args.iter().map(|arg| self.lower_arg(arg)).collect(),
            }),
            self.position(new.span),
        )
    }

    fn lower_tag(&self, decorator: &Decorator) -> Option<SyntaxNode> {
        let (name, args) = match unwrap_transparent(&decorator.expr) {
            Expr::Call(call) => match &call.callee {
                Callee::Expr(callee) => (dotted_name(callee)?, call.args.as_slice()),
                _ => return None,
            },
            other => (dotted_name(other)?, &[][..]),
        };

        let mut fields = Vec::new();
        if let Some(first) = args.first()
            && first.spread.is_none()
        {
            match unwrap_transparent(&first.expr) {
                Expr::Object(object) => {
                    for prop in &object.props {
                        let PropOrSpread::Prop(prop) = prop else {
                            continue;
                        };
                        match &**prop {
                            Prop::KeyValue(kv) => {
                                if let Some(key) = prop_name(&kv.key) {
                                    fields.push((key, self.lower_expr(&kv.value)));
                                }
                            }
                            Prop::Shorthand(ident) => fields.push((
                                ident.sym.to_string(),
                                self.lower_ident(ident.sym.as_str(), self.position(ident.span)),
                            )),
                            _ => {}
                        }
                    }
                }
                _ => fields.push(("value".to_string(), self.lower_expr(&first.expr))),
            }
        }

        Some(SyntaxNode::new(
            NodeKind::TagUse(TagUse { name, fields }),
            self.position(decorator.span),
        ))
    }

    // ---- static types ----

    /// Parameter types at a call site: the declared type per position when known,
    /// otherwise the inferred argument type.
    fn param_types(&self, declared: Option<&[String]>, raw_args: &[ExprOrSpread]) -> Vec<String> {
        raw_args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                declared
                    .and_then(|params| params.get(index))
                    .filter(|ty| ty.as_str() != UNKNOWN)
                    .cloned()
                    .unwrap_or_else(|| self.arg_type(arg))
            })
            .collect()
    }

    fn arg_type(&self, arg: &ExprOrSpread) -> String {
        if arg.spread.is_some() {
            return UNKNOWN.to_string();
        }
        self.type_of(&arg.expr)
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn type_of(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::TsAs(ts_as) => self.resolve_type(&WrittenType::from_ts(&ts_as.type_ann)),
            Expr::Paren(_)
            | Expr::TsSatisfies(_)
            | Expr::TsConstAssertion(_)
            | Expr::TsNonNull(_)
            | Expr::TsTypeAssertion(_) => self.type_of(unwrap_transparent(expr)),
            Expr::Lit(Lit::Str(_)) | Expr::Tpl(_) => Some("string".to_string()),
            Expr::Lit(Lit::Num(_)) => Some("number".to_string()),
            Expr::Lit(Lit::Bool(_)) => Some("boolean".to_string()),
            Expr::Lit(Lit::Null(_)) => Some("null".to_string()),
            Expr::Bin(bin) => match bin.op {
                SwcBinaryOp::Add => {
                    let left = self.type_of(&bin.left);
                    let right = self.type_of(&bin.right);
                    match (left.as_deref(), right.as_deref()) {
                        (Some("string"), _) | (_, Some("string")) => Some("string".to_string()),
                        (Some("number"), Some("number")) => Some("number".to_string()),
                        _ => None,
                    }
                }
                SwcBinaryOp::Sub | SwcBinaryOp::Mul | SwcBinaryOp::Div | SwcBinaryOp::Mod => {
                    Some("number".to_string())
                }
                _ => None,
            },
            Expr::Cond(cond) => {
                let consequent = self.type_of(&cond.cons)?;
                (self.type_of(&cond.alt).as_deref() == Some(consequent.as_str()))
                    .then_some(consequent)
            }
            Expr::Array(array) => {
                let mut element = None;
                for elem in &array.elems {
                    let ty = self.arg_type(elem.as_ref()?);
                    match &element {
                        None => element = Some(ty),
                        Some(existing) if *existing == ty => {}
                        Some(_) => return None,
                    }
                }
                element
                    .filter(|ty| ty != UNKNOWN)
                    .map(|ty| format!("{}[]", ty))
            }
            Expr::New(new) => self.constructed_type(new),
            Expr::This(_) => self.current_class().map(str::to_string),
            Expr::Ident(ident) => match self.binding(ident.sym.as_str()) {
                Some(binding) => binding.ty.clone(),
                None => {
                    let resolved = self.names.resolve(ident.sym.as_str())?;
                    self.index.value_type(&resolved).map(str::to_string)
                }
            },
            Expr::Member(member) => {
                let name = member_name(&member.prop)?;
                let obj = unwrap_transparent(&member.obj);
                if let Some(path) = self.static_path(obj) {
                    return self
                        .index
                        .value_type(&format!("{}.{}", path, name))
                        .or_else(|| self.index.value_type(&qualify(&path, &name)))
                        .map(str::to_string);
                }
                let owner = self.type_of(obj)?;
                self.index
                    .types
                    .find_property(&owner, &name)
                    .map(str::to_string)
            }
            Expr::Call(call) => {
                let Callee::Expr(callee) = &call.callee else {
                    return None;
                };
                let returns_string = match unwrap_transparent(callee) {
                    Expr::Member(member) => {
                        let name = member_name(&member.prop)?;
                        let receiver = self.type_of(&member.obj)?;
                        (receiver == "string" && STRING_METHODS.contains(&name.as_str()))
                            || (receiver.ends_with("[]") && name == "join")
                    }
                    Expr::Ident(ident) => {
                        let name = ident.sym.as_str();
                        matches!(name, "String" | "format")
                            && self.binding(name).is_none()
                            && self.names.resolve(name).is_none()
                    }
                    _ => false,
                };
                returns_string.then(|| "string".to_string())
            }
            _ => None,
        }
    }

    // ---- declarations ----

    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn is_module_level(&self) -> bool {
        self.scopes.is_empty()
    }

    fn module_const(&mut self, name: &str, init: &Expr) {
        let module = self.names.module.to_string();
        if let Expr::Object(object) = unwrap_transparent(init) {
            let owner = qualify(&module, name);
            for prop in &object.props {
                if let PropOrSpread::Prop(prop) = prop
                    && let Prop::KeyValue(kv) = &**prop
                    && let Some(key) = prop_name(&kv.key)
                {
                    let value = self.lower_expr(&kv.value);
                    self.constants.push((owner.clone(), key, value));
                }
            }
        }
        let value = self.lower_expr(init);
        self.constants.push((module, name.to_string(), value));
    }

    fn visit_class_body(&mut self, name: Option<String>, visit: impl FnOnce(&mut Self)) {
        let qualified = name.map(|name| qualify(self.names.module, &name));
        self.classes.push(qualified);
        visit(self);
        self.classes.pop();
    }
}

fn member_name(prop: &MemberProp) -> Option<String> {
    match prop {
        MemberProp::Ident(ident) => Some(ident.sym.to_string()),
        MemberProp::Computed(computed) => match &*computed.expr {
            Expr::Lit(Lit::Str(s)) => Some(s.value.to_string_lossy().to_string()),
            _ => None,
        },
        _ => None,
    }
}

fn binary_op(op: SwcBinaryOp) -> BinaryOp {
    match op {
        SwcBinaryOp::Add => BinaryOp::Add,
        SwcBinaryOp::Sub => BinaryOp::Sub,
        SwcBinaryOp::Mul => BinaryOp::Mul,
        SwcBinaryOp::Div => BinaryOp::Div,
        SwcBinaryOp::Mod => BinaryOp::Mod,
        SwcBinaryOp::EqEq => BinaryOp::Other("=="),
        SwcBinaryOp::NotEq => BinaryOp::Other("!="),
        SwcBinaryOp::EqEqEq => BinaryOp::Other("==="),
        SwcBinaryOp::NotEqEq => BinaryOp::Other("!=="),
        SwcBinaryOp::Lt => BinaryOp::Other("<"),
        SwcBinaryOp::LtEq => BinaryOp::Other("<="),
        SwcBinaryOp::Gt => BinaryOp::Other(">"),
        SwcBinaryOp::GtEq => BinaryOp::Other(">="),
        SwcBinaryOp::LShift => BinaryOp::Other("<<"),
        SwcBinaryOp::RShift => BinaryOp::Other(">>"),
        SwcBinaryOp::ZeroFillRShift => BinaryOp::Other(">>>"),
        SwcBinaryOp::BitOr => BinaryOp::Other("|"),
        SwcBinaryOp::BitXor => BinaryOp::Other("^"),
        SwcBinaryOp::BitAnd => BinaryOp::Other("&"),
        SwcBinaryOp::LogicalOr => BinaryOp::Other("||"),
        SwcBinaryOp::LogicalAnd => BinaryOp::Other("&&"),
        SwcBinaryOp::In => BinaryOp::Other("in"),
        SwcBinaryOp::InstanceOf => BinaryOp::Other("instanceof"),
        SwcBinaryOp::Exp => BinaryOp::Other("**"),
        SwcBinaryOp::NullishCoalescing => BinaryOp::Other("??"),
    }
}

fn unary_op(op: SwcUnaryOp) -> UnaryOp {
    match op {
        SwcUnaryOp::Plus => UnaryOp::Plus,
        SwcUnaryOp::Minus => UnaryOp::Minus,
        SwcUnaryOp::Bang => UnaryOp::Not,
        SwcUnaryOp::Tilde => UnaryOp::BitNot,
        SwcUnaryOp::TypeOf => UnaryOp::TypeOf,
        SwcUnaryOp::Void => UnaryOp::Void,
        SwcUnaryOp::Delete => UnaryOp::Delete,
    }
}

impl Visit for Lowerer<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Some(site) = self.lower_call(node) {
            self.sites.push(site);
        }
        node.visit_children_with(self);
    }

    fn visit_new_expr(&mut self, node: &NewExpr) {
        let site = self.lower_new(node);
        self.sites.push(site);
        node.visit_children_with(self);
    }

    fn visit_decorator(&mut self, node: &Decorator) {
        if let Some(site) = self.lower_tag(node) {
            self.sites.push(site);
        }
        // The decorator call itself is the tag; only its arguments hold further sites
        match unwrap_transparent(&node.expr) {
            Expr::Call(call) => {
                for arg in &call.args {
                    arg.expr.visit_with(self);
                }
            }
            other => other.visit_children_with(self),
        }
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        let name = node.ident.sym.to_string();
        self.visit_class_body(Some(name), |this| node.class.visit_with(this));
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        let name = node.ident.as_ref().map(|ident| ident.sym.to_string());
        self.visit_class_body(name, |this| node.class.visit_with(this));
    }

    fn visit_export_default_decl(&mut self, node: &ExportDefaultDecl) {
        match &node.decl {
            DefaultDecl::Class(class) => {
                let name = class
                    .ident
                    .as_ref()
                    .map(|ident| ident.sym.to_string())
                    .unwrap_or_else(|| "default".to_string());
                self.visit_class_body(Some(name), |this| class.class.visit_with(this));
            }
            _ => node.visit_children_with(self),
        }
    }

    fn visit_class_prop(&mut self, node: &ClassProp) {
        node.visit_children_with(self);

        if node.is_static
            && node.readonly
            && self.is_module_level()
            && let Some(class) = self.current_class()
            && let Some(name) = prop_name(&node.key)
            && let Some(value) = &node.value
        {
            let owner = class.to_string();
            let value = self.lower_expr(value);
            self.constants.push((owner, name, value));
        }
    }

    fn visit_function(&mut self, node: &Function) {
        self.enter_scope();
        for param in &node.params {
            self.declare_pat(&param.pat);
        }
        node.visit_children_with(self);
        self.exit_scope();
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.enter_scope();
        for param in &node.params {
            self.declare_pat(param);
        }
        node.visit_children_with(self);
        self.exit_scope();
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        self.enter_scope();
        for param in &node.params {
            match param {
                ParamOrTsParamProp::Param(param) => self.declare_pat(&param.pat),
                ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                    TsParamPropParam::Ident(binding) => {
                        let ty = self.resolve_type(&WrittenType::from_annotation(
                            binding.type_ann.as_deref(),
                        ));
                        self.declare(binding.id.sym.to_string(), Binding { ty, value: None });
                    }
                    TsParamPropParam::Assign(assign) => self.declare_pat(&assign.left),
                },
            }
        }
        node.visit_children_with(self);
        self.exit_scope();
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        self.enter_scope();
        node.visit_children_with(self);
        self.exit_scope();
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        node.visit_children_with(self);

        let constant = node.kind == VarDeclKind::Const;
        for declarator in &node.decls {
            let Pat::Ident(binding) = &declarator.name else {
                continue;
            };
            let name = binding.id.sym.to_string();
            let init = declarator.init.as_deref();

            if self.is_module_level() {
                if constant && let Some(init) = init {
                    self.module_const(&name, init);
                }
                continue;
            }

            let ty = self
                .resolve_type(&WrittenType::from_annotation(binding.type_ann.as_deref()))
                .or_else(|| init.and_then(|init| self.type_of(init)));
            let value = init
                .filter(|_| constant)
                .map(|init| self.lower_expr(init));
            self.declare(name, Binding { ty, value });
        }
    }

    fn visit_ts_enum_decl(&mut self, node: &TsEnumDecl) {
        node.visit_children_with(self);
        if !self.is_module_level() {
            return;
        }

        let owner = qualify(self.names.module, node.id.sym.as_str());
        let mut next = Some(0.0);
        for member in &node.members {
            let name = match &member.id {
                TsEnumMemberId::Ident(ident) => ident.sym.to_string(),
                TsEnumMemberId::Str(s) => s.value.to_string_lossy().to_string(),
            };
            let position = self.position(member.span);
            let value = match member.init.as_deref() {
                Some(init) => self.lower_expr(init),
                None => match next {
                    Some(n) => SyntaxNode::number(n, position),
                    None => SyntaxNode::opaque(name.clone(), position),
                },
            };
            next = match &value.kind {
                NodeKind::Literal(Literal::Num(n)) => Some(n + 1.0),
                _ => None,
            };
            self.constants.push((owner.clone(), name, value));
        }
    }
}
