//! First pass: module-level declarations of one file, with type names as written.

use std::collections::HashSet;

use swc_ecma_ast::{
    Class, ClassMember, Decl, DefaultDecl, Expr, Function, ImportDecl, ImportSpecifier,
    MethodKind, Module, ModuleDecl, ModuleExportName, ModuleItem, ParamOrTsParamProp, Pat, Prop,
    PropName, PropOrSpread, Stmt, TsEnumDecl, TsEnumMemberId, TsFnParam, TsInterfaceDecl,
    TsParamPropParam, TsTypeElement, VarDecl, VarDeclKind,
};

use crate::core::lower::types::{WrittenType, dotted_name};
use crate::core::syntax::{
    FileImports, ImportInfo,
    scope::{module_id, resolve_module_specifier},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub is_static: bool,
    pub params: Vec<WrittenType>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassDecl {
    pub name: String,
    pub superclass: Option<String>,
    pub implements: Vec<String>,
    pub methods: Vec<MethodDecl>,
    pub constructor: Option<Vec<WrittenType>>,
    /// Instance properties, including constructor parameter properties.
    pub properties: Vec<(String, WrittenType)>,
    /// `static readonly` properties.
    pub static_constants: Vec<(String, WrittenType)>,
    /// Other static properties.
    pub static_fields: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceDecl {
    pub name: String,
    pub extends: Vec<String>,
    pub methods: Vec<MethodDecl>,
    pub properties: Vec<(String, WrittenType)>,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<WrittenType>,
}

/// A module-level `const`, `let` or `var`.
#[derive(Debug, Clone)]
pub struct ValueDecl {
    pub name: String,
    pub constant: bool,
    pub ty: WrittenType,
    /// Keys of a `const` object literal initializer.
    pub members: Vec<(String, WrittenType)>,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<(String, WrittenType)>,
}

#[derive(Debug, Clone, Default)]
pub struct FileDeclarations {
    pub path: String,
    pub module: String,
    pub imports: FileImports,
    pub locals: HashSet<String>,
    pub classes: Vec<ClassDecl>,
    pub interfaces: Vec<InterfaceDecl>,
    pub functions: Vec<FunctionDecl>,
    pub values: Vec<ValueDecl>,
    pub enums: Vec<EnumDecl>,
    pub default_export: Option<String>,
}

pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string_lossy().to_string()),
        _ => None,
    }
}

pub fn function_params(function: &Function) -> Vec<WrittenType> {
    function
        .params
        .iter()
        .map(|param| WrittenType::from_pat(&param.pat))
        .collect()
}

/// Strip parentheses and TS wrappers that do not change the value.
pub fn unwrap_transparent(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_transparent(&paren.expr),
        Expr::TsAs(ts_as) => unwrap_transparent(&ts_as.expr),
        Expr::TsSatisfies(satisfies) => unwrap_transparent(&satisfies.expr),
        Expr::TsConstAssertion(assertion) => unwrap_transparent(&assertion.expr),
        Expr::TsNonNull(non_null) => unwrap_transparent(&non_null.expr),
        Expr::TsTypeAssertion(assertion) => unwrap_transparent(&assertion.expr),
        _ => expr,
    }
}

/// Scan the module-level declarations of a file.
pub fn scan_module(module: &Module, path: &str) -> FileDeclarations {
    let mut decls = FileDeclarations {
        path: path.to_string(),
        module: module_id(path),
        ..Default::default()
    };

    for item in &module.body {
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => decls.import(import),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => decls.decl(&export.decl),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl {
                DefaultDecl::Class(class) => {
                    let name = class
                        .ident
                        .as_ref()
                        .map(|ident| ident.sym.to_string())
                        .unwrap_or_else(|| "default".to_string());
                    decls.class(&name, &class.class);
                    decls.default_export = Some(name);
                }
                DefaultDecl::Fn(function) => {
                    let name = function
                        .ident
                        .as_ref()
                        .map(|ident| ident.sym.to_string())
                        .unwrap_or_else(|| "default".to_string());
                    decls.functions.push(FunctionDecl {
                        name: name.clone(),
                        params: function_params(&function.function),
                    });
                    decls.locals.insert(name.clone());
                    decls.default_export = Some(name);
                }
                DefaultDecl::TsInterfaceDecl(interface) => {
                    decls.interface(interface);
                    decls.default_export = Some(interface.id.sym.to_string());
                }
            },
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                if let Expr::Ident(ident) = unwrap_transparent(&export.expr) {
                    decls.default_export = Some(ident.sym.to_string());
                }
            }
            ModuleItem::Stmt(Stmt::Decl(decl)) => decls.decl(decl),
            _ => {}
        }
    }

    decls
}

impl FileDeclarations {
    fn import(&mut self, node: &ImportDecl) {
        let specifier = node.src.value.to_string_lossy();
        let module = resolve_module_specifier(&self.path, &specifier);

        for spec in &node.specifiers {
            let info = match spec {
                ImportSpecifier::Named(named) => {
                    let local_name = named.local.sym.to_string();
                    let imported_name = named
                        .imported
                        .as_ref()
                        .map(|i| match i {
                            ModuleExportName::Ident(ident) => ident.sym.to_string(),
                            ModuleExportName::Str(s) => s.value.to_string_lossy().to_string(),
                        })
                        .unwrap_or_else(|| local_name.clone());
                    ImportInfo {
                        local_name,
                        imported_name,
                        module: module.clone(),
                    }
                }
                ImportSpecifier::Default(default) => ImportInfo {
                    local_name: default.local.sym.to_string(),
                    imported_name: "default".to_string(),
                    module: module.clone(),
                },
                ImportSpecifier::Namespace(ns) => ImportInfo {
                    local_name: ns.local.sym.to_string(),
                    imported_name: "*".to_string(),
                    module: module.clone(),
                },
            };
            self.imports.push(info);
        }
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Class(class) => self.class(class.ident.sym.as_str(), &class.class),
            Decl::Fn(function) => {
                let name = function.ident.sym.to_string();
                self.functions.push(FunctionDecl {
                    name: name.clone(),
                    params: function_params(&function.function),
                });
                self.locals.insert(name);
            }
            Decl::Var(var) => self.var(var),
            Decl::TsInterface(interface) => self.interface(interface),
            Decl::TsEnum(decl) => self.enumeration(decl),
            _ => {}
        }
    }

    fn var(&mut self, var: &VarDecl) {
        let constant = var.kind == VarDeclKind::Const;

        for declarator in &var.decls {
            let Pat::Ident(binding) = &declarator.name else {
                continue;
            };
            let name = binding.id.sym.to_string();
            let init = declarator.init.as_deref();

            let mut ty = WrittenType::from_annotation(binding.type_ann.as_deref());
            if ty.is_unknown()
                && let Some(init) = init
            {
                ty = WrittenType::from_initializer(init);
            }

            let mut members = Vec::new();
            match init.map(unwrap_transparent) {
                Some(Expr::Arrow(arrow)) => self.functions.push(FunctionDecl {
                    name: name.clone(),
                    params: arrow.params.iter().map(WrittenType::from_pat).collect(),
                }),
                Some(Expr::Fn(function)) => self.functions.push(FunctionDecl {
                    name: name.clone(),
                    params: function_params(&function.function),
                }),
                Some(Expr::Object(object)) if constant => {
                    for prop in &object.props {
                        if let PropOrSpread::Prop(prop) = prop
                            && let Prop::KeyValue(kv) = &**prop
                            && let Some(key) = prop_name(&kv.key)
                        {
                            members.push((key, WrittenType::from_initializer(&kv.value)));
                        }
                    }
                }
                _ => {}
            }

            self.locals.insert(name.clone());
            self.values.push(ValueDecl {
                name,
                constant,
                ty,
                members,
            });
        }
    }

    fn class(&mut self, name: &str, class: &Class) {
        let mut decl = ClassDecl {
            name: name.to_string(),
            superclass: class.super_class.as_deref().and_then(dotted_name),
            implements: class
                .implements
                .iter()
                .filter_map(|i| dotted_name(&i.expr))
                .collect(),
            ..Default::default()
        };

        for member in &class.body {
            match member {
                ClassMember::Constructor(constructor) => {
                    let mut params = Vec::new();
                    for param in &constructor.params {
                        match param {
                            ParamOrTsParamProp::Param(param) => {
                                params.push(WrittenType::from_pat(&param.pat));
                            }
                            ParamOrTsParamProp::TsParamProp(prop) => {
                                let (name, ty) = match &prop.param {
                                    TsParamPropParam::Ident(binding) => (
                                        binding.id.sym.to_string(),
                                        WrittenType::from_annotation(binding.type_ann.as_deref()),
                                    ),
                                    TsParamPropParam::Assign(assign) => {
                                        let declared = WrittenType::from_pat(&assign.left);
                                        let ty = if declared.is_unknown() {
                                            WrittenType::from_initializer(&assign.right)
                                        } else {
                                            declared
                                        };
                                        match &*assign.left {
                                            Pat::Ident(binding) => (binding.id.sym.to_string(), ty),
                                            _ => continue,
                                        }
                                    }
                                };
                                params.push(ty.clone());
                                decl.properties.push((name, ty));
                            }
                        }
                    }
                    decl.constructor = Some(params);
                }
                ClassMember::Method(method) if method.kind == MethodKind::Method => {
                    if let Some(name) = prop_name(&method.key) {
                        decl.methods.push(MethodDecl {
                            name,
                            is_static: method.is_static,
                            params: function_params(&method.function),
                        });
                    }
                }
                ClassMember::ClassProp(prop) => {
                    let Some(name) = prop_name(&prop.key) else {
                        continue;
                    };
                    let mut ty = WrittenType::from_annotation(prop.type_ann.as_deref());
                    if ty.is_unknown()
                        && let Some(value) = &prop.value
                    {
                        ty = WrittenType::from_initializer(value);
                    }

                    match (prop.is_static, prop.readonly) {
                        (true, true) => decl.static_constants.push((name, ty)),
                        (true, false) => decl.static_fields.push(name),
                        (false, _) => decl.properties.push((name, ty)),
                    }
                }
                _ => {}
            }
        }

        self.locals.insert(name.to_string());
        self.classes.push(decl);
    }

    fn interface(&mut self, interface: &TsInterfaceDecl) {
        let mut decl = InterfaceDecl {
            name: interface.id.sym.to_string(),
            extends: interface
                .extends
                .iter()
                .filter_map(|e| dotted_name(&e.expr))
                .collect(),
            ..Default::default()
        };

        for element in &interface.body.body {
            match element {
                TsTypeElement::TsMethodSignature(method) => {
                    if let Expr::Ident(ident) = &*method.key {
                        decl.methods.push(MethodDecl {
                            name: ident.sym.to_string(),
                            is_static: false,
                            params: method
                                .params
                                .iter()
                                .map(|param| match param {
                                    TsFnParam::Ident(binding) => {
                                        WrittenType::from_annotation(binding.type_ann.as_deref())
                                    }
                                    _ => WrittenType::Unknown,
                                })
                                .collect(),
                        });
                    }
                }
                TsTypeElement::TsPropertySignature(prop) => {
                    if let Expr::Ident(ident) = &*prop.key {
                        decl.properties.push((
                            ident.sym.to_string(),
                            WrittenType::from_annotation(prop.type_ann.as_deref()),
                        ));
                    }
                }
                _ => {}
            }
        }

        self.locals.insert(decl.name.clone());
        self.interfaces.push(decl);
    }

    fn enumeration(&mut self, decl: &TsEnumDecl) {
        let members = decl
            .members
            .iter()
            .map(|member| {
                let name = match &member.id {
                    TsEnumMemberId::Ident(ident) => ident.sym.to_string(),
                    TsEnumMemberId::Str(s) => s.value.to_string_lossy().to_string(),
                };
                let ty = match member.init.as_deref() {
                    Some(init) => WrittenType::from_initializer(init),
                    None => WrittenType::Keyword("number"),
                };
                (name, ty)
            })
            .collect();

        let name = decl.id.sym.to_string();
        self.locals.insert(name.clone());
        self.enums.push(EnumDecl { name, members });
    }
}
