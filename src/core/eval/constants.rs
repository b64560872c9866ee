//! Project constant table.
//!
//! Holds the lowered initializers of module `const`s, `static readonly` class properties and
//! enum members. Initializers are folded lazily on first read and memoized; a read that
//! re-enters a constant still being folded reports a cycle.

use std::{cell::RefCell, collections::HashMap};

use crate::core::{
    eval::{ConstantResolver, EvalReason, Evaluator, Folded, builtins},
    syntax::{Construction, FieldRef, Invocation, SyntaxNode},
};

type ConstantKey = (String, String);

#[derive(Debug, Default)]
pub struct ProjectConstants {
    initializers: HashMap<ConstantKey, SyntaxNode>,
    cache: RefCell<HashMap<ConstantKey, Result<Vec<Folded>, EvalReason>>>,
    in_progress: RefCell<Vec<ConstantKey>>,
}

impl ProjectConstants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constant. `owner` is a qualified type name or a module id.
    pub fn insert(&mut self, owner: impl Into<String>, name: impl Into<String>, init: SyntaxNode) {
        self.initializers.insert((owner.into(), name.into()), init);
    }

    pub fn contains(&self, owner: &str, name: &str) -> bool {
        self.initializers
            .contains_key(&(owner.to_string(), name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.initializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty()
    }
}

fn display_name(field: &FieldRef) -> String {
    match field.owner.as_deref().and_then(|o| o.split_once('#')) {
        Some((_, owner)) => format!("{}.{}", owner, field.name),
        None => field.name.clone(),
    }
}

impl ConstantResolver for ProjectConstants {
    fn read_field(&self, field: &FieldRef) -> Result<Vec<Folded>, EvalReason> {
        let key = (field.owner.clone().unwrap_or_default(), field.name.clone());

        if let Some(cached) = self.cache.borrow().get(&key) {
            return cached.clone();
        }
        if self.in_progress.borrow().contains(&key) {
            return Err(EvalReason::CyclicConstant(display_name(field)));
        }
        let Some(init) = self.initializers.get(&key) else {
            return Err(EvalReason::UnknownConstant(display_name(field)));
        };

        self.in_progress.borrow_mut().push(key.clone());
        let result = Evaluator::new(self)
            .fold(init, 0)
            .map_err(|err| err.reason);
        self.in_progress.borrow_mut().pop();

        self.cache.borrow_mut().insert(key, result.clone());
        result
    }

    fn invoke(
        &self,
        call: &Invocation,
        receiver: Option<&Folded>,
        args: &[Folded],
    ) -> Result<Folded, EvalReason> {
        builtins::invoke(call.owner.as_deref(), &call.name, receiver, args)
    }

    fn construct(&self, new: &Construction, args: &[Folded]) -> Result<Folded, EvalReason> {
        builtins::construct(new.type_name.as_deref(), args)
    }
}
