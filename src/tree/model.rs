// src/tree/model.rs
// =============================================================================
// This module defines the canonical bookmark tree and its pure operations.
//
// Key functionality:
// - BookmarkNode: a folder or a link (a closed enum, so every consumer
//   has to handle both cases)
// - BookmarkTree: the three named roots browsers export (bookmark bar,
//   other bookmarks, and optionally synced bookmarks)
// - traverse_links: depth-first, pre-order walk that yields every link
// - prune: returns a copy of the tree with selected links removed
//
// Rust concepts:
// - Enums with data: Folder and Link carry different fields
// - Pattern matching: match forces us to handle every variant
// - Ownership: prune clones first, so the input tree is never touched
// =============================================================================

use std::collections::HashSet;

// A single node in the bookmark tree
//
// Browsers model bookmarks as a tree where every node is either a folder
// (which only groups children) or a link (which carries a URL).
// We mirror that with a two-variant enum instead of a class hierarchy,
// so traversal and pruning can't forget a case.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkNode {
    /// A folder grouping other nodes; child order is display order
    Folder {
        id: String,
        name: String,
        children: Vec<BookmarkNode>,
    },
    /// A bookmarked URL
    ///
    /// The URL is stored as-is - it may be empty or malformed, and only
    /// the link checker cares about that later.
    Link {
        id: String,
        name: String,
        url: String,
        /// Timestamp metadata carried through from the source file.
        /// We never interpret these, we just preserve them on re-export.
        date_added: Option<String>,
        date_modified: Option<String>,
    },
}

impl BookmarkNode {
    /// Convenience constructor for a folder node
    pub fn folder(id: impl Into<String>, name: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        BookmarkNode::Folder {
            id: id.into(),
            name: name.into(),
            children,
        }
    }

    /// Convenience constructor for a link node without date metadata
    pub fn link(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        BookmarkNode::Link {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            date_added: None,
            date_modified: None,
        }
    }

    /// The node's id, regardless of variant
    pub fn id(&self) -> &str {
        match self {
            BookmarkNode::Folder { id, .. } | BookmarkNode::Link { id, .. } => id,
        }
    }

    /// The node's display name, regardless of variant
    pub fn name(&self) -> &str {
        match self {
            BookmarkNode::Folder { name, .. } | BookmarkNode::Link { name, .. } => name,
        }
    }

    /// The node's URL, if it is a link
    pub fn url(&self) -> Option<&str> {
        match self {
            BookmarkNode::Link { url, .. } => Some(url),
            BookmarkNode::Folder { .. } => None,
        }
    }

    // Depth-first, pre-order collection of link nodes
    //
    // Folders are descended into but not yielded. Links with an empty id
    // are skipped (nothing downstream could key on them), but links with
    // an empty URL ARE yielded - the checker resolves those to "skipped"
    // instead of probing them.
    fn collect_links<'a>(&'a self, out: &mut Vec<&'a BookmarkNode>) {
        match self {
            BookmarkNode::Folder { children, .. } => {
                for child in children {
                    child.collect_links(out);
                }
            }
            link @ BookmarkNode::Link { id, .. } => {
                if !id.is_empty() {
                    out.push(link);
                }
            }
        }
    }

    // Removes every link whose id is in the selection, recursively
    //
    // Folders are never removed, even when this empties them - deletion
    // scope is user-selected links only.
    fn remove_links(&mut self, ids: &HashSet<String>) {
        if let BookmarkNode::Folder { children, .. } = self {
            children.retain(|child| !matches!(child, BookmarkNode::Link { id, .. } if ids.contains(id)));
            for child in children.iter_mut() {
                child.remove_links(ids);
            }
        }
    }
}

// The canonical bookmark collection
//
// Chrome-style exports carry up to three roots. A tree is only considered
// valid when at least the bookmark bar or the "other" root is present;
// the codec enforces that at decode time.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkTree {
    pub bookmark_bar: Option<BookmarkNode>,
    pub other: Option<BookmarkNode>,
    pub synced: Option<BookmarkNode>,
    /// Format version carried through from a JSON export (1 if absent)
    pub version: u32,
}

impl BookmarkTree {
    /// An empty tree with just a version number, used by decoders as a
    /// starting point before roots are filled in
    pub fn empty() -> Self {
        BookmarkTree {
            bookmark_bar: None,
            other: None,
            synced: None,
            version: 1,
        }
    }

    /// True when the tree satisfies the root invariant
    pub fn has_roots(&self) -> bool {
        self.bookmark_bar.is_some() || self.other.is_some()
    }

    /// The present roots, always in bar -> other -> synced order
    ///
    /// This order defines document order for traversal and re-export.
    pub fn roots(&self) -> impl Iterator<Item = &BookmarkNode> {
        [
            self.bookmark_bar.as_ref(),
            self.other.as_ref(),
            self.synced.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Collects every link node, depth-first and pre-order, visiting the
    /// roots in their fixed order
    ///
    /// The result is stable with respect to child order, so two calls on
    /// the same tree always agree.
    pub fn traverse_links(&self) -> Vec<&BookmarkNode> {
        let mut links = Vec::new();
        for root in self.roots() {
            root.collect_links(&mut links);
        }
        links
    }

    /// Returns a structurally independent copy of the tree with every
    /// link whose id is in `ids` removed from its parent's children
    ///
    /// Total over all inputs: ids that don't exist in the tree are
    /// silently ignored, the empty set returns an identical copy, and
    /// folders stay in place even when emptied.
    pub fn prune(&self, ids: &HashSet<String>) -> BookmarkTree {
        // Deep copy first so the caller's tree keeps working for
        // diffing or a later recheck
        let mut pruned = self.clone();
        for root in [
            &mut pruned.bookmark_bar,
            &mut pruned.other,
            &mut pruned.synced,
        ]
        .into_iter()
        .filter_map(|slot| slot.as_mut())
        {
            root.remove_links(ids);
        }
        pruned
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why an enum instead of a Folder class and a Link class?
//    - A Rust enum is a closed set: these two variants are ALL the cases
//    - Every match over a BookmarkNode must handle both, or it won't compile
//    - With inheritance, a new subclass can silently slip past old code
//
// 2. What does #[derive(Clone)] buy us?
//    - A recursive deep copy of the whole tree, generated by the compiler
//    - prune() relies on it: clone first, then mutate the copy
//    - The clone shares nothing with the original (Strings are copied too)
//
// 3. What is retain()?
//    - Vec::retain keeps only the elements the closure says yes to
//    - It preserves order and works in place - perfect for removing
//      selected links from a children list
//
// 4. Why do collect_links and remove_links take the node apart differently?
//    - collect_links borrows (&self) - it only reads
//    - remove_links takes &mut self - it edits children in place
//    - The borrow checker keeps the two uses from ever overlapping
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // A small tree with nesting:
    //   bar: [link 2, folder 3: [link 4, link 5]]
    //   other: [link 7]
    fn sample_tree() -> BookmarkTree {
        BookmarkTree {
            bookmark_bar: Some(BookmarkNode::folder(
                "1",
                "Bookmarks bar",
                vec![
                    BookmarkNode::link("2", "Example", "https://example.com"),
                    BookmarkNode::folder(
                        "3",
                        "Reading",
                        vec![
                            BookmarkNode::link("4", "Rust", "https://www.rust-lang.org"),
                            BookmarkNode::link("5", "Docs", "https://doc.rust-lang.org"),
                        ],
                    ),
                ],
            )),
            other: Some(BookmarkNode::folder(
                "6",
                "Other bookmarks",
                vec![BookmarkNode::link("7", "News", "https://news.example.com")],
            )),
            synced: None,
            version: 1,
        }
    }

    fn link_ids(tree: &BookmarkTree) -> Vec<String> {
        tree.traverse_links()
            .iter()
            .map(|link| link.id().to_string())
            .collect()
    }

    #[test]
    fn traverse_is_preorder_across_roots() {
        let tree = sample_tree();
        assert_eq!(link_ids(&tree), vec!["2", "4", "5", "7"]);
    }

    #[test]
    fn traverse_yields_empty_url_links() {
        let mut tree = sample_tree();
        if let Some(BookmarkNode::Folder { children, .. }) = tree.other.as_mut() {
            children.push(BookmarkNode::link("8", "No address", ""));
        }
        assert_eq!(link_ids(&tree), vec!["2", "4", "5", "7", "8"]);
    }

    #[test]
    fn prune_removes_selected_links_in_order() {
        let tree = sample_tree();
        let ids: HashSet<String> = ["2", "5"].iter().map(|s| s.to_string()).collect();
        let pruned = tree.prune(&ids);
        assert_eq!(link_ids(&pruned), vec!["4", "7"]);
        // The input tree is untouched
        assert_eq!(link_ids(&tree), vec!["2", "4", "5", "7"]);
    }

    #[test]
    fn prune_with_empty_set_is_identity() {
        let tree = sample_tree();
        let pruned = tree.prune(&HashSet::new());
        assert_eq!(pruned, tree);
    }

    #[test]
    fn prune_ignores_unknown_ids() {
        let tree = sample_tree();
        let ids: HashSet<String> = ["999", "nope"].iter().map(|s| s.to_string()).collect();
        let pruned = tree.prune(&ids);
        assert_eq!(pruned, tree);
    }

    #[test]
    fn prune_everything_keeps_folders() {
        let tree = sample_tree();
        let ids: HashSet<String> = link_ids(&tree).into_iter().collect();
        let pruned = tree.prune(&ids);
        assert!(pruned.traverse_links().is_empty());
        // Folders survive even when emptied
        match pruned.bookmark_bar.as_ref().unwrap() {
            BookmarkNode::Folder { children, .. } => {
                assert_eq!(children.len(), 1);
                assert_eq!(children[0].name(), "Reading");
            }
            _ => panic!("bookmark bar root should still be a folder"),
        }
    }
}
