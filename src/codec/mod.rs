// src/codec/mod.rs
// =============================================================================
// This module converts between the canonical bookmark tree and the two
// exchange formats browsers actually produce:
//
// - json: the Chrome-style JSON export ({ roots: { bookmark_bar, ... } })
// - html: the Netscape bookmark file format (<DT>/<H3>/<DL>/<A> markup)
//
// This file (mod.rs) owns format detection and the decode/encode dispatch,
// plus the error type both directions share. The submodules are pure
// string-to-tree / tree-to-string functions with no I/O.
//
// Rust concepts:
// - thiserror: derive a typed error enum callers can match on
// - Enums as type-safe flags (BookmarkFormat)
// =============================================================================

mod html;
mod json;

use std::path::Path;

use thiserror::Error;

use crate::tree::BookmarkTree;

// What can go wrong while loading or saving a bookmark file
//
// Validation is all-or-nothing: a payload that fails any of these checks
// produces an error and no partial tree.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input was not parseable JSON at all
    #[error("not a valid JSON bookmark export: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON parsed, but its `roots` object has neither a
    /// `bookmark_bar` nor an `other` entry
    #[error("JSON bookmark export has no bookmark_bar or other root")]
    MissingRoots,

    /// The HTML document contains no bookmark list to walk
    #[error("HTML document contains no bookmark list")]
    NoBookmarkList,

    /// The content looks like neither supported format
    #[error("could not detect the bookmark format (expected a JSON export or a Netscape HTML file)")]
    UnknownFormat,
}

// The two supported exchange formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkFormat {
    Json,
    Html,
}

impl BookmarkFormat {
    /// The file extension conventionally used for this format
    pub fn extension(&self) -> &'static str {
        match self {
            BookmarkFormat::Json => "json",
            BookmarkFormat::Html => "html",
        }
    }

    /// Guesses the format from a file path's extension
    ///
    /// Returns None for unknown extensions - content sniffing takes over
    /// in that case.
    pub fn from_path(path: &Path) -> Option<BookmarkFormat> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(BookmarkFormat::Json),
            "html" | "htm" => Some(BookmarkFormat::Html),
            _ => None,
        }
    }

    /// Sniffs the format from the content itself
    ///
    /// A JSON export always starts with an object brace; a Netscape file
    /// starts with its doctype (or at least with markup).
    pub fn detect(content: &str) -> Option<BookmarkFormat> {
        let trimmed = content.trim_start();
        if trimmed.starts_with('{') {
            Some(BookmarkFormat::Json)
        } else if trimmed.to_ascii_lowercase().contains("netscape-bookmark-file")
            || trimmed.starts_with('<')
        {
            Some(BookmarkFormat::Html)
        } else {
            None
        }
    }
}

impl std::fmt::Display for BookmarkFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookmarkFormat::Json => write!(f, "JSON"),
            BookmarkFormat::Html => write!(f, "Netscape HTML"),
        }
    }
}

/// Decodes raw file content into a bookmark tree
///
/// When `hint` is None the format is sniffed from the content. The
/// detected format is returned alongside the tree so the caller can
/// re-export in the same format by default.
pub fn decode(
    content: &str,
    hint: Option<BookmarkFormat>,
) -> Result<(BookmarkTree, BookmarkFormat), CodecError> {
    let format = hint
        .or_else(|| BookmarkFormat::detect(content))
        .ok_or(CodecError::UnknownFormat)?;

    let tree = match format {
        BookmarkFormat::Json => json::decode_tree(content)?,
        BookmarkFormat::Html => html::decode_tree(content)?,
    };

    Ok((tree, format))
}

/// Encodes a bookmark tree into the given exchange format
pub fn encode(tree: &BookmarkTree, format: BookmarkFormat) -> Result<String, CodecError> {
    match format {
        BookmarkFormat::Json => json::encode_tree(tree),
        BookmarkFormat::Html => Ok(html::encode_tree(tree)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_json_export() {
        let content = r#"  {"roots":{"other":{"id":"1","name":"Other","type":"folder","children":[]}},"version":1}"#;
        assert_eq!(BookmarkFormat::detect(content), Some(BookmarkFormat::Json));
    }

    #[test]
    fn detect_netscape_html() {
        let content = "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n<DL><p>\n</DL><p>";
        assert_eq!(BookmarkFormat::detect(content), Some(BookmarkFormat::Html));
    }

    #[test]
    fn detect_rejects_plain_text() {
        assert_eq!(BookmarkFormat::detect("just some notes"), None);
    }

    #[test]
    fn decode_reports_unknown_format() {
        let result = decode("just some notes", None);
        assert!(matches!(result, Err(CodecError::UnknownFormat)));
    }

    #[test]
    fn hint_overrides_sniffing() {
        // Valid JSON, but the caller insists it's HTML - the decoder
        // must honor the hint rather than silently switching formats
        let content = r#"{"roots":{"other":{"id":"1","name":"Other","type":"folder","children":[]}},"version":1}"#;
        let result = decode(content, Some(BookmarkFormat::Html));
        assert!(matches!(result, Err(CodecError::NoBookmarkList)));
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            BookmarkFormat::from_path(Path::new("Bookmarks_20250101.json")),
            Some(BookmarkFormat::Json)
        );
        assert_eq!(
            BookmarkFormat::from_path(Path::new("export.HTM")),
            Some(BookmarkFormat::Html)
        );
        assert_eq!(BookmarkFormat::from_path(Path::new("export.txt")), None);
    }
}
