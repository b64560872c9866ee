//! Project-wide declaration index built from the first pass of every file.

use std::collections::{HashMap, HashSet};

use crate::core::lower::declarations::FileDeclarations;
use crate::core::lower::types::{UNKNOWN, WrittenType};
use crate::core::syntax::{MethodSig, ModuleNames, TypeGraph, scope::qualify};

#[derive(Debug, Default)]
pub struct ProjectIndex {
    pub types: TypeGraph,
    /// Free functions: qualified name -> declared parameter types.
    pub functions: HashMap<String, Vec<String>>,
    /// `(owner, name)` of immutable fields: module consts, members of const object literals,
    /// `static readonly` properties and enum members.
    pub constants: HashSet<(String, String)>,
    /// `(owner, name)` of mutable module variables and static properties.
    pub variables: HashSet<(String, String)>,
    /// Static type of named values, keyed by `module#name` or `owner.member`.
    pub value_types: HashMap<String, String>,
    /// Default export name per module.
    pub default_exports: HashMap<String, String>,
}

fn resolve_all(types: &[WrittenType], names: &ModuleNames<'_>) -> Vec<String> {
    types.iter().map(|ty| ty.resolve(names)).collect()
}

fn member_key(owner: &str, name: &str) -> String {
    format!("{}.{}", owner, name)
}

impl ProjectIndex {
    pub fn build(files: &[FileDeclarations]) -> Self {
        let default_exports: HashMap<String, String> = files
            .iter()
            .filter_map(|file| {
                file.default_export
                    .clone()
                    .map(|name| (file.module.clone(), name))
            })
            .collect();

        let mut types = TypeGraph::new();
        let mut functions = HashMap::new();
        let mut constants = HashSet::new();
        let mut variables = HashSet::new();
        let mut value_types = HashMap::new();

        for file in files {
            let names = ModuleNames {
                module: &file.module,
                imports: &file.imports,
                locals: &file.locals,
                default_exports: &default_exports,
            };
            let mut record_type = |key: String, ty: &WrittenType| {
                if !ty.is_unknown() {
                    value_types.insert(key, ty.resolve(&names));
                }
            };

            for class in &file.classes {
                let qualified = qualify(&file.module, &class.name);
                let id = types.intern(&qualified);

                if let Some(superclass) = &class.superclass {
                    let resolved = names
                        .resolve(superclass)
                        .unwrap_or_else(|| superclass.clone());
                    let super_id = types.intern(&resolved);
                    types.set_superclass(id, super_id);
                }
                for interface in &class.implements {
                    let resolved = names
                        .resolve(interface)
                        .unwrap_or_else(|| interface.clone());
                    let interface_id = types.intern(&resolved);
                    types.add_interface(id, interface_id);
                }

                let node = types.get_mut(id);
                node.methods.extend(class.methods.iter().map(|method| MethodSig {
                    name: method.name.clone(),
                    is_static: method.is_static,
                    params: resolve_all(&method.params, &names),
                }));
                node.constructor = class
                    .constructor
                    .as_ref()
                    .map(|params| resolve_all(params, &names));
                for (name, ty) in &class.properties {
                    let resolved = ty.resolve(&names);
                    if resolved != UNKNOWN {
                        node.properties.insert(name.clone(), resolved);
                    }
                }

                for (name, ty) in &class.static_constants {
                    constants.insert((qualified.clone(), name.clone()));
                    record_type(member_key(&qualified, name), ty);
                }
                for name in &class.static_fields {
                    variables.insert((qualified.clone(), name.clone()));
                }
            }

            for interface in &file.interfaces {
                let qualified = qualify(&file.module, &interface.name);
                let id = types.intern(&qualified);
                for parent in &interface.extends {
                    let resolved = names.resolve(parent).unwrap_or_else(|| parent.clone());
                    let parent_id = types.intern(&resolved);
                    types.add_interface(id, parent_id);
                }

                let node = types.get_mut(id);
                node.methods
                    .extend(interface.methods.iter().map(|method| MethodSig {
                        name: method.name.clone(),
                        is_static: false,
                        params: resolve_all(&method.params, &names),
                    }));
                for (name, ty) in &interface.properties {
                    let resolved = ty.resolve(&names);
                    if resolved != UNKNOWN {
                        node.properties.insert(name.clone(), resolved);
                    }
                }
            }

            for function in &file.functions {
                functions.insert(
                    qualify(&file.module, &function.name),
                    resolve_all(&function.params, &names),
                );
            }

            for value in &file.values {
                let key = (file.module.clone(), value.name.clone());
                if value.constant {
                    constants.insert(key);
                } else {
                    variables.insert(key);
                }
                let qualified = qualify(&file.module, &value.name);
                record_type(qualified.clone(), &value.ty);
                for (member, ty) in &value.members {
                    constants.insert((qualified.clone(), member.clone()));
                    record_type(member_key(&qualified, member), ty);
                }
            }

            for decl in &file.enums {
                let qualified = qualify(&file.module, &decl.name);
                for (member, ty) in &decl.members {
                    constants.insert((qualified.clone(), member.clone()));
                    record_type(member_key(&qualified, member), ty);
                }
            }
        }

        tracing::debug!(
            types = types.len(),
            constants = constants.len(),
            functions = functions.len(),
            "declaration index built"
        );

        Self {
            types,
            functions,
            constants,
            variables,
            value_types,
            default_exports,
        }
    }

    /// `Some(true)` for a constant field, `Some(false)` for a mutable one.
    pub fn field_kind(&self, owner: &str, name: &str) -> Option<bool> {
        let key = (owner.to_string(), name.to_string());
        if self.constants.contains(&key) {
            Some(true)
        } else if self.variables.contains(&key) {
            Some(false)
        } else {
            None
        }
    }

    /// Static type of a value named by a resolved path (`module#name`, `module#Class.FIELD`).
    pub fn value_type(&self, resolved: &str) -> Option<&str> {
        self.value_types.get(resolved).map(String::as_str)
    }

    /// Whether a resolved name denotes a type rather than a value.
    ///
    /// Types declared in the project are known; an unknown capitalized name that is not a
    /// known value is assumed to be an imported class.
    pub fn is_type(&self, resolved: &str) -> bool {
        if self.types.id(resolved).is_some() {
            return true;
        }
        if self.value_types.contains_key(resolved) || self.functions.contains_key(resolved) {
            return false;
        }
        let Some((owner, name)) = resolved.split_once('#') else {
            return false;
        };
        self.field_kind(owner, name).is_none()
            && !name.contains('.')
            && name.chars().next().is_some_and(char::is_uppercase)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use swc_common::{FileName, SourceMap};
    use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

    use crate::core::lower::declarations::scan_module;
    use crate::core::lower::index::*;

    fn scan(path: &str, code: &str) -> FileDeclarations {
        let source_map = SourceMap::default();
        let source_file =
            source_map.new_source_file(FileName::Real(path.into()).into(), code.to_string());
        let syntax = Syntax::Typescript(TsSyntax::default());
        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
        scan_module(&parser.parse_module().unwrap(), path)
    }

    fn index() -> ProjectIndex {
        ProjectIndex::build(&[
            scan(
                "src/i18n.ts",
                r#"
                export default class Translator {
                    tr(text: string): string { return text; }
                }
                export class Labels {
                    static readonly SAVE = "Save";
                    static current = "x";
                }
                export const PREFIX = "app.";
                export let locale = "en";
                export function plural(one: string, many: string, n: number) {}
                "#,
            ),
            scan(
                "src/app.ts",
                r#"
                import Tr from "./i18n";
                import { Base } from "@acme/base";
                export class AppTranslator extends Tr implements Base {}
                export const translator: AppTranslator = new AppTranslator();
                "#,
            ),
        ])
    }

    #[test]
    fn test_default_import_resolves_to_the_exported_class() {
        let index = index();
        assert!(
            index
                .types
                .is_subtype_of("src/app#AppTranslator", "src/i18n#Translator")
        );
        assert!(index.types.is_subtype_of("src/app#AppTranslator", "@acme/base#Base"));
        let method = index
            .types
            .find_method("src/app#AppTranslator", "tr", false)
            .unwrap();
        assert_eq!(method.params, vec!["string"]);
    }

    #[test]
    fn test_fields_and_values() {
        let index = index();
        assert_eq!(index.field_kind("src/i18n", "PREFIX"), Some(true));
        assert_eq!(index.field_kind("src/i18n", "locale"), Some(false));
        assert_eq!(index.field_kind("src/i18n#Labels", "SAVE"), Some(true));
        assert_eq!(index.field_kind("src/i18n#Labels", "current"), Some(false));
        assert_eq!(index.field_kind("src/i18n", "missing"), None);

        assert_eq!(index.value_type("src/i18n#Labels.SAVE"), Some("string"));
        assert_eq!(
            index.value_type("src/app#translator"),
            Some("src/app#AppTranslator")
        );
        assert_eq!(
            index.functions["src/i18n#plural"],
            vec!["string", "string", "number"]
        );
    }

    #[test]
    fn test_type_detection() {
        let index = index();
        assert!(index.is_type("src/i18n#Labels"));
        assert!(index.is_type("@acme/other#Widget"));
        assert!(!index.is_type("src/app#translator"));
        assert!(!index.is_type("src/i18n#PREFIX"));
    }
}
