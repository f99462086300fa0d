//! Nested view of a folder listing

use super::{Entry, File, Folder};
use crate::codec::SEPARATOR;
use indexmap::IndexMap;

/// Children keyed by name, in listing order
pub type Tree = IndexMap<String, TreeNode>;

#[derive(Debug, Clone)]
pub enum TreeNode {
    File(File),
    Folder {
        /// Marker entry, when the listing included one
        folder: Option<Folder>,
        children: Tree,
    },
}

impl TreeNode {
    fn empty_folder() -> Self {
        TreeNode::Folder {
            folder: None,
            children: Tree::new(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, TreeNode::File(_))
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            TreeNode::File(f) => Some(f),
            TreeNode::Folder { .. } => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            TreeNode::Folder { folder, .. } => folder.as_ref(),
            TreeNode::File(_) => None,
        }
    }

    /// Children of a folder node; `None` for files
    pub fn children(&self) -> Option<&Tree> {
        match self {
            TreeNode::Folder { children, .. } => Some(children),
            TreeNode::File(_) => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children().and_then(|c| c.get(name))
    }

    /// Folder node children, replacing a file that sits where a folder is needed.
    /// The replaced file is dropped from the tree.
    fn children_mut(&mut self) -> &mut Tree {
        if self.is_file() {
            *self = TreeNode::empty_folder();
        }
        match self {
            TreeNode::Folder { children, .. } => children,
            TreeNode::File(_) => unreachable!("file nodes were replaced above"),
        }
    }
}

/// Nest entries by the segments of their path below `base`.
///
/// Nodes are keyed by bare segment name, so a file `sub` and a folder
/// `sub/` in the same listing share a key. The folder always wins and the
/// file is left out of the tree, whatever the listing order; it is still
/// present in `Folder::entries`.
pub(crate) fn build(base: &str, entries: &[Entry]) -> Tree {
    let mut root = Tree::new();

    for entry in entries {
        let Some(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        let segments: Vec<&str> = relative.split(SEPARATOR).filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };

        let mut level = &mut root;
        for segment in parents {
            level = level
                .entry(segment.to_string())
                .or_insert_with(TreeNode::empty_folder)
                .children_mut();
        }

        match entry {
            Entry::File(file) => {
                if matches!(level.get(*last), Some(TreeNode::Folder { .. })) {
                    tracing::debug!("Tree omits {} in favor of a folder", file.path());
                } else {
                    level.insert(last.to_string(), TreeNode::File(file.clone()));
                }
            }
            Entry::Folder(marker) => {
                let node = level
                    .entry(last.to_string())
                    .or_insert_with(TreeNode::empty_folder);
                node.children_mut();
                if let TreeNode::Folder { folder, .. } = node {
                    *folder = Some(marker.clone());
                }
            }
        }
    }

    root
}
