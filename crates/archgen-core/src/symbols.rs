//! Symbol table for cross-file resolution of class and interface names

use crate::model::NodeId;
use std::collections::HashMap;

/// Maps declared symbol names to the node IDs that declare them.
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// Symbol name -> every node declaring it, in declaration order
    symbols: HashMap<String, Vec<NodeId>>,
    /// For fast file lookup: file path -> (symbol name -> node)
    file_symbols: HashMap<String, HashMap<String, NodeId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol declared in `file_path`.
    pub fn insert(&mut self, name: &str, node_id: NodeId, file_path: &str) {
        self.symbols
            .entry(name.to_string())
            .or_default()
            .push(node_id.clone());
        self.file_symbols
            .entry(file_path.to_string())
            .or_default()
            .insert(name.to_string(), node_id);
    }

    /// Look up a symbol declared in a specific file.
    pub fn lookup_in_file(&self, file_path: &str, name: &str) -> Option<&NodeId> {
        self.file_symbols.get(file_path)?.get(name)
    }

    /// Look up a symbol that is declared exactly once across the repository.
    pub fn lookup_unique(&self, name: &str) -> Option<&NodeId> {
        match self.symbols.get(name).map(Vec::as_slice) {
            Some([only]) => Some(only),
            _ => None,
        }
    }

    /// Resolve a name as seen from `file_path`: same file first, then a unique global declaration.
    pub fn resolve(&self, file_path: &str, name: &str) -> Option<&NodeId> {
        self.lookup_in_file(file_path, name)
            .or_else(|| self.lookup_unique(name))
    }

    pub fn len(&self) -> usize {
        self.symbols.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
