//! Directory tree inferred from entry paths

use std::collections::HashMap;

/// Kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Archive entry
    File,
    /// Implied by a separator in some entry path
    Directory,
}

/// Child of a directory in the archive tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Path component (no separators)
    pub name: String,
    /// File or directory
    pub kind: NodeKind,
}

impl TreeNode {
    fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Directory listing for every directory implied by an archive's entries.
///
/// Children keep the order in which their first entry appears in the file table.
#[derive(Debug, Clone)]
pub struct DirTree {
    /// Directory path ("" for the root) to its children
    children: HashMap<String, Vec<TreeNode>>,
}

impl DirTree {
    /// Create a tree holding only the root directory
    pub fn new() -> Self {
        let mut children = HashMap::new();
        children.insert(String::new(), Vec::new());
        Self { children }
    }

    /// Register a file path, creating any missing parent directories
    pub fn insert_file(&mut self, path: &str) {
        let mut parent = String::new();
        let mut components = path.split('/').filter(|c| !c.is_empty()).peekable();

        while let Some(component) = components.next() {
            let full = if parent.is_empty() {
                component.to_string()
            } else {
                format!("{parent}/{component}")
            };

            if components.peek().is_some() {
                if !self.children.contains_key(&full) {
                    self.children.insert(full.clone(), Vec::new());
                    self.children
                        .entry(parent)
                        .or_default()
                        .push(TreeNode::new(component, NodeKind::Directory));
                }
            } else {
                self.children
                    .entry(parent)
                    .or_default()
                    .push(TreeNode::new(component, NodeKind::File));
            }

            parent = full;
        }
    }

    /// Children of `dir`, or `None` if no entry implies that directory
    pub fn children(&self, dir: &str) -> Option<&[TreeNode]> {
        self.children.get(dir).map(Vec::as_slice)
    }

    /// Whether `path` is an implied directory ("" is the root)
    pub fn is_directory(&self, path: &str) -> bool {
        self.children.contains_key(path)
    }

    /// Number of directories, including the root
    pub fn directory_count(&self) -> usize {
        self.children.len()
    }
}

impl Default for DirTree {
    fn default() -> Self {
        Self::new()
    }
}
