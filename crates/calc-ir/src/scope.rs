//! Lexical scopes.
//!
//! Scopes live in an arena owned by the package and refer to their parent by
//! [`ScopeId`]. The package scope is always `ScopeId(0)`; each declaration
//! owns one child scope holding its parameters and locals. Lookup walks the
//! parent chain, so a name is visible in the scope that binds it and in every
//! scope nested below it.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::object::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const PACKAGE: ScopeId = ScopeId(0);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    parent: Option<ScopeId>,
    names: IndexMap<String, SymbolId, FxBuildHasher>,
}

impl Scope {
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Bound names in the order they were introduced.
    pub fn names(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.names.iter().map(|(name, sym)| (name.as_str(), *sym))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Arena of every scope in a package.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

impl ScopeTable {
    /// A table holding only the empty package scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                names: IndexMap::default(),
            }],
        }
    }

    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            names: IndexMap::default(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// Bind `name` in `scope`. Fails with the existing symbol when the name
    /// is already bound in that same scope; outer bindings do not conflict.
    pub fn insert(&mut self, scope: ScopeId, name: &str, sym: SymbolId) -> Result<(), SymbolId> {
        let names = &mut self.scopes[scope.0 as usize].names;
        if let Some(existing) = names.get(name) {
            return Err(*existing);
        }
        names.insert(name.to_string(), sym);
        Ok(())
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.get(scope).names.get(name).copied()
    }

    /// Resolve `name` starting at `scope` and walking outwards.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.get(id);
            if let Some(sym) = s.names.get(name) {
                return Some(*sym);
            }
            current = s.parent;
        }
        None
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}
