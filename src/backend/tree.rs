//! Git tree editing for the versioned store.
//!
//! In Git, a tree is a directory. A document write has to rebuild every
//! tree along its path: insert the blob into the leaf tree, insert the new
//! leaf tree into its parent, and so on up to the root. This module does
//! that structural recursion once, for both inserts and removals, and
//! prunes directories that end up empty so namespaces vanish with their
//! last document.

use std::path::Path;

use git2::{FileMode, ObjectType, Oid, Repository, Tree};

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::types::DocPath;

/// a single-document change to apply to a tree
#[derive(Debug, Clone, Copy)]
pub(crate) enum TreeEdit {
    /// insert or replace the blob at the path
    Put(Oid),
    /// remove the entry at the path
    Remove,
}

/// look up the entry at a path, returning its object id and type
pub(crate) fn lookup(tree: &Tree<'_>, path: &DocPath) -> Option<(Oid, ObjectType)> {
    let entry = tree.get_path(Path::new(path.as_str())).ok()?;
    let kind = entry.kind()?;
    Some((entry.id(), kind))
}

/// Apply an edit to a tree, returning the rebuilt tree's id.
///
/// `tree` is the current tree at this level (`None` for a directory that
/// doesn't exist yet). Returns `None` when the rebuilt tree has no entries
/// left, so the caller removes it from its own parent.
pub(crate) fn apply_edit(
    repo: &Repository,
    tree: Option<&Tree<'_>>,
    segments: &[&str],
    edit: TreeEdit,
) -> BackendResult<Option<Oid>> {
    let (name, rest) = match segments.split_first() {
        Some(split) => split,
        None => return Err(BackendError::Internal("empty path in tree edit".to_string())),
    };

    let mut builder = repo.treebuilder(tree)?;

    if rest.is_empty() {
        match edit {
            TreeEdit::Put(blob) => {
                builder.insert(*name, blob, FileMode::Blob.into())?;
            }
            TreeEdit::Remove => {
                builder.remove(*name)?;
            }
        }
    } else {
        // descend into the child directory, creating it on the way down
        // for inserts
        let child = match tree.and_then(|t| t.get_name(name)) {
            Some(entry) if entry.kind() == Some(ObjectType::Tree) => {
                Some(repo.find_tree(entry.id())?)
            }
            _ => None,
        };
        let had_child = child.is_some();

        match apply_edit(repo, child.as_ref(), rest, edit)? {
            Some(subtree) => {
                builder.insert(*name, subtree, FileMode::Tree.into())?;
            }
            None => {
                // the subtree emptied out; prune it
                if had_child {
                    builder.remove(*name)?;
                }
            }
        }
    }

    if builder.len() == 0 {
        Ok(None)
    } else {
        Ok(Some(builder.write()?))
    }
}
