// src/codec/json.rs
// =============================================================================
// This module handles the Chrome-style JSON bookmark export.
//
// The wire shape is:
//
//   {
//     "roots": {
//       "bookmark_bar": { "id", "name", "type": "url"|"folder", ... },
//       "other":        { ... },
//       "synced":       { ... }          // optional
//     },
//     "version": 1
//   }
//
// Decoding is minimal-validation: the payload is accepted iff `roots`
// carries at least one of bookmark_bar/other. Encoding always emits the
// canonical field set (id, name, type, then url or children, plus the
// date fields when the source had them) - we don't try to reproduce the
// exact field order of arbitrary inputs.
//
// Rust concepts:
// - serde derive: the wire structs mirror the JSON shape 1:1
// - #[serde(rename = "type")]: `type` is a Rust keyword, so the field
//   needs a different name in the struct
// =============================================================================

use serde::{Deserialize, Serialize};

use super::CodecError;
use crate::tree::{BookmarkNode, BookmarkTree};

// The top-level export file
#[derive(Debug, Serialize, Deserialize)]
struct ExportFile {
    roots: ExportRoots,
    #[serde(default = "default_version")]
    version: u32,
}

fn default_version() -> u32 {
    1
}

// The named roots; all optional on the wire, validity is checked after
// parsing
#[derive(Debug, Serialize, Deserialize)]
struct ExportRoots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bookmark_bar: Option<ExportNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    other: Option<ExportNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    synced: Option<ExportNode>,
}

// One node of the export tree
//
// Every field except id/name/type is optional so both node kinds share
// one wire struct, the way the export format itself does.
#[derive(Debug, Serialize, Deserialize)]
struct ExportNode {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<ExportNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_added: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_modified: Option<String>,
}

// Wire node -> canonical node
//
// Anything typed "url" becomes a link; everything else is treated as a
// folder. URLs are carried over verbatim, with no validation - the
// checker deals with empty or malformed ones later.
fn to_node(node: ExportNode) -> BookmarkNode {
    if node.kind == "url" {
        BookmarkNode::Link {
            id: node.id,
            name: node.name,
            url: node.url.unwrap_or_default(),
            date_added: node.date_added,
            date_modified: node.date_modified,
        }
    } else {
        BookmarkNode::Folder {
            id: node.id,
            name: node.name,
            children: node
                .children
                .unwrap_or_default()
                .into_iter()
                .map(to_node)
                .collect(),
        }
    }
}

// Canonical node -> wire node
fn from_node(node: &BookmarkNode) -> ExportNode {
    match node {
        BookmarkNode::Folder { id, name, children } => ExportNode {
            id: id.clone(),
            name: name.clone(),
            kind: "folder".to_string(),
            url: None,
            // Folders always carry a children array, even when empty -
            // that's what the browsers emit
            children: Some(children.iter().map(from_node).collect()),
            date_added: None,
            date_modified: None,
        },
        BookmarkNode::Link {
            id,
            name,
            url,
            date_added,
            date_modified,
        } => ExportNode {
            id: id.clone(),
            name: name.clone(),
            kind: "url".to_string(),
            url: Some(url.clone()),
            children: None,
            date_added: date_added.clone(),
            date_modified: date_modified.clone(),
        },
    }
}

/// Parses a JSON export into a bookmark tree
///
/// Rejection is all-or-nothing: invalid JSON or a roots object without
/// bookmark_bar/other produces an error and no partial tree.
pub fn decode_tree(content: &str) -> Result<BookmarkTree, CodecError> {
    let export: ExportFile = serde_json::from_str(content)?;

    if export.roots.bookmark_bar.is_none() && export.roots.other.is_none() {
        return Err(CodecError::MissingRoots);
    }

    Ok(BookmarkTree {
        bookmark_bar: export.roots.bookmark_bar.map(to_node),
        other: export.roots.other.map(to_node),
        synced: export.roots.synced.map(to_node),
        version: export.version,
    })
}

/// Serializes a bookmark tree back into the JSON export shape
///
/// Uses two-space pretty printing, matching what the browsers write.
pub fn encode_tree(tree: &BookmarkTree) -> Result<String, CodecError> {
    let export = ExportFile {
        roots: ExportRoots {
            bookmark_bar: tree.bookmark_bar.as_ref().map(from_node),
            other: tree.other.as_ref().map(from_node),
            synced: tree.synced.as_ref().map(from_node),
        },
        version: tree.version,
    };

    Ok(serde_json::to_string_pretty(&export)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "roots": {
            "bookmark_bar": {
                "id": "1",
                "name": "Bar",
                "type": "folder",
                "children": [
                    {"id": "2", "name": "Example", "type": "url", "url": "https://example.com", "date_added": "13350000000000000"}
                ]
            },
            "other": {"id": "3", "name": "Other", "type": "folder", "children": []}
        },
        "version": 1
    }"#;

    #[test]
    fn decode_sample_export() {
        let tree = decode_tree(SAMPLE).unwrap();
        assert_eq!(tree.version, 1);
        let links = tree.traverse_links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id(), "2");
        assert_eq!(links[0].url(), Some("https://example.com"));
    }

    #[test]
    fn round_trip_preserves_everything() {
        let tree = decode_tree(SAMPLE).unwrap();
        let encoded = encode_tree(&tree).unwrap();
        let again = decode_tree(&encoded).unwrap();
        // Ids, names, urls, order and date metadata all survive
        assert_eq!(again, tree);
    }

    #[test]
    fn date_metadata_passes_through() {
        let tree = decode_tree(SAMPLE).unwrap();
        let encoded = encode_tree(&tree).unwrap();
        assert!(encoded.contains("13350000000000000"));
    }

    #[test]
    fn reject_non_json() {
        assert!(matches!(
            decode_tree("<html></html>"),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn reject_missing_roots() {
        let result = decode_tree(r#"{"roots": {}, "version": 1}"#);
        assert!(matches!(result, Err(CodecError::MissingRoots)));
    }

    #[test]
    fn reject_wrong_shape() {
        let result = decode_tree(r#"{"bookmarks": []}"#);
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn accept_single_root() {
        let content = r#"{"roots": {"other": {"id": "1", "name": "Other", "type": "folder", "children": []}}, "version": 1}"#;
        let tree = decode_tree(content).unwrap();
        assert!(tree.bookmark_bar.is_none());
        assert!(tree.other.is_some());
        assert!(tree.has_roots());
    }
}
