//! Project-wide type hierarchy used by inherited rule matching.
//!
//! Types live in an arena and reference each other by [`TypeId`], so hierarchies with
//! cycles (which TypeScript rejects but a broken project may still contain) are walked
//! safely with a visited bitmap. The bitmap is allocated per walk, and only once the walk
//! leaves its start type.

use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

/// Declared method signature: parameter types in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub is_static: bool,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TypeNode {
    /// Qualified name (`module#Name`).
    pub name: String,
    pub superclass: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub methods: Vec<MethodSig>,
    pub constructor: Option<Vec<String>>,
    /// Typed instance properties (`name -> qualified type`), used for `this.prop` receivers.
    pub properties: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    index: HashMap<String, TypeId>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, creating an empty node when the type is not known yet.
    ///
    /// Supertypes declared outside the project still get a node so lookups stay cheap.
    pub fn intern(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = TypeId(self.nodes.len());
        self.nodes.push(TypeNode {
            name: name.to_string(),
            ..Default::default()
        });
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<TypeId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeNode {
        &mut self.nodes[id.0]
    }

    pub fn by_name(&self, name: &str) -> Option<&TypeNode> {
        self.id(name).map(|id| self.get(id))
    }

    pub fn set_superclass(&mut self, ty: TypeId, superclass: TypeId) {
        self.nodes[ty.0].superclass = Some(superclass);
    }

    pub fn add_interface(&mut self, ty: TypeId, interface: TypeId) {
        let node = &mut self.nodes[ty.0];
        if !node.interfaces.contains(&interface) {
            node.interfaces.push(interface);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Breadth-first walk over `start` and its superclass/interface closure.
    ///
    /// Calls `visit` for every reachable type (including `start`) until it returns true.
    /// Returns whether any visit returned true.
    pub fn walk_supertypes<'a>(
        &'a self,
        start: TypeId,
        mut visit: impl FnMut(&'a TypeNode) -> bool,
    ) -> bool {
        let root = &self.nodes[start.0];
        if visit(root) {
            return true;
        }
        if root.superclass.is_none() && root.interfaces.is_empty() {
            return false;
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        visited[start.0] = true;
        self.enqueue_supertypes(root, &mut visited, &mut queue);

        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id.0];
            if visit(node) {
                return true;
            }
            self.enqueue_supertypes(node, &mut visited, &mut queue);
        }
        false
    }

    fn enqueue_supertypes(
        &self,
        node: &TypeNode,
        visited: &mut [bool],
        queue: &mut VecDeque<TypeId>,
    ) {
        for next in node.superclass.iter().chain(node.interfaces.iter()) {
            if !visited[next.0] {
                visited[next.0] = true;
                queue.push_back(*next);
            }
        }
    }

    /// Whether `name` equals `ancestor` or reaches it through the supertype closure.
    pub fn is_subtype_of(&self, name: &str, ancestor: &str) -> bool {
        if name == ancestor {
            return true;
        }
        match self.id(name) {
            Some(start) => self.walk_supertypes(start, |node| node.name == ancestor),
            None => false,
        }
    }

    /// First method named `name` with the given staticness, searching the supertype closure.
    pub fn find_method(&self, owner: &str, name: &str, is_static: bool) -> Option<&MethodSig> {
        let start = self.id(owner)?;
        let mut found = None;
        self.walk_supertypes(start, |node| {
            found = node
                .methods
                .iter()
                .find(|m| m.name == name && m.is_static == is_static);
            found.is_some()
        });
        found
    }

    /// Type of an instance property declared on `owner` or one of its supertypes.
    pub fn find_property(&self, owner: &str, name: &str) -> Option<&str> {
        let start = self.id(owner)?;
        let mut found = None;
        self.walk_supertypes(start, |node| {
            found = node.properties.get(name).map(String::as_str);
            found.is_some()
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use crate::core::syntax::types::*;

    fn graph_with_chain() -> TypeGraph {
        // Child extends Base implements Labeled; Base implements Translatable
        let mut graph = TypeGraph::new();
        let child = graph.intern("app#Child");
        let base = graph.intern("lib#Base");
        let labeled = graph.intern("lib#Labeled");
        let translatable = graph.intern("lib#Translatable");
        graph.set_superclass(child, base);
        graph.add_interface(child, labeled);
        graph.add_interface(base, translatable);
        graph
    }

    #[test]
    fn test_exact_name_is_subtype() {
        let graph = TypeGraph::new();
        assert!(graph.is_subtype_of("lib#Base", "lib#Base"));
    }

    #[test]
    fn test_transitive_interface_is_reached() {
        let graph = graph_with_chain();
        assert!(graph.is_subtype_of("app#Child", "lib#Translatable"));
        assert!(graph.is_subtype_of("app#Child", "lib#Labeled"));
        assert!(!graph.is_subtype_of("lib#Base", "app#Child"));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = TypeGraph::new();
        let a = graph.intern("m#A");
        let b = graph.intern("m#B");
        graph.set_superclass(a, b);
        graph.set_superclass(b, a);

        assert!(!graph.is_subtype_of("m#A", "m#C"));
        assert!(graph.is_subtype_of("m#B", "m#A"));
    }

    #[test]
    fn test_walk_visits_each_type_once() {
        let mut graph = TypeGraph::new();
        let plain = graph.intern("m#Plain");
        let looped = graph.intern("m#Looped");
        graph.set_superclass(looped, looped);

        for start in [plain, looped] {
            let mut visits = 0;
            assert!(!graph.walk_supertypes(start, |_| {
                visits += 1;
                false
            }));
            assert_eq!(visits, 1);
        }
    }

    #[test]
    fn test_walk_is_breadth_first() {
        let graph = graph_with_chain();
        let start = graph.id("app#Child").unwrap();
        let mut order = Vec::new();
        graph.walk_supertypes(start, |node| {
            order.push(node.name.clone());
            false
        });
        assert_eq!(
            order,
            vec!["app#Child", "lib#Base", "lib#Labeled", "lib#Translatable"]
        );
    }

    #[test]
    fn test_find_method_in_superclass() {
        let mut graph = graph_with_chain();
        let base = graph.id("lib#Base").unwrap();
        graph.get_mut(base).methods.push(MethodSig {
            name: "tr".to_string(),
            is_static: false,
            params: vec!["string".to_string()],
        });

        let method = graph.find_method("app#Child", "tr", false).unwrap();
        assert_eq!(method.params, vec!["string"]);
        assert!(graph.find_method("app#Child", "tr", true).is_none());
    }
}
