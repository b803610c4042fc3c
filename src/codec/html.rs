// src/codec/html.rs
// =============================================================================
// This module handles the Netscape bookmark file format - the HTML-ish
// markup every browser's "export bookmarks" button has produced since the
// 90s:
//
//   <!DOCTYPE NETSCAPE-Bookmark-file-1>
//   <DL><p>
//       <DT><H3>Bookmarks bar</H3>
//       <DL><p>
//           <DT><A HREF="https://example.com">Example</A>
//       </DL><p>
//   </DL><p>
//
// A <DT> holding an <H3> is a folder; a <DT> holding an <A> is a link.
// A folder's children live in the <DL> that follows its <DT>. Real files
// rarely close their <DT> tags, so a forgiving parser may nest that <DL>
// inside the <DT> or leave it as a sibling - the decoder accepts both.
//
// We use the `scraper` crate (html5ever underneath) so malformed markup
// and character entities are handled the same way a browser handles them.
//
// Rust concepts:
// - ElementRef: a typed reference into the parsed DOM tree
// - Recursion over the DOM mirrors recursion over our bookmark tree
// =============================================================================

use scraper::{ElementRef, Html, Selector};

use super::CodecError;
use crate::tree::{BookmarkNode, BookmarkTree};

// Synthetic ids for HTML imports count up from here, so they can't
// collide with the small integer ids a JSON-origin tree uses in the
// same session
const SYNTHETIC_ID_START: u64 = 100;

// Top-level folder names that identify the special roots, matched
// case-insensitively. The original tool shipped for two locales
// (English and Japanese), and we keep exactly that behavior.
const BAR_NAMES: &[&str] = &[
    "bookmarks bar",
    "bookmark bar",
    "ブックマーク バー",
    "ブックマークバー",
];
const OTHER_NAMES: &[&str] = &["other bookmarks", "その他のブックマーク"];
const SYNCED_NAMES: &[&str] = &["mobile bookmarks", "モバイルのブックマーク"];

// Name of the default bucket root created when an import has no folder
// matching the bookmark-bar conventions
const DEFAULT_BAR_NAME: &str = "Bookmarks bar";

// Which root a top-level entry belongs to
enum Bucket {
    Bar,
    Other,
    Synced,
    Default,
}

fn route(entry: &BookmarkNode) -> Bucket {
    match entry {
        BookmarkNode::Folder { name, .. } => {
            let lowered = name.to_lowercase();
            if BAR_NAMES.contains(&lowered.as_str()) {
                Bucket::Bar
            } else if OTHER_NAMES.contains(&lowered.as_str()) {
                Bucket::Other
            } else if SYNCED_NAMES.contains(&lowered.as_str()) {
                Bucket::Synced
            } else {
                Bucket::Default
            }
        }
        // Bare links outside any folder land in the default bucket
        BookmarkNode::Link { .. } => Bucket::Default,
    }
}

/// Parses a Netscape bookmark document into a bookmark tree
///
/// Top-level folders are routed into the named roots by their display
/// name; everything unrecognized (folders with other names, and bare
/// links) is appended to the bookmark bar. Ids do not exist in this
/// format, so fresh ones are generated.
pub fn decode_tree(content: &str) -> Result<BookmarkTree, CodecError> {
    let document = Html::parse_document(content);

    // The selector is a constant, so parse() can't fail here
    let dl_selector = Selector::parse("dl").unwrap();

    // select() walks the document in order, so the first hit is the
    // outermost description list
    let top_dl = document
        .select(&dl_selector)
        .next()
        .ok_or(CodecError::NoBookmarkList)?;

    let mut next_id = SYNTHETIC_ID_START;
    let entries = parse_dl(top_dl, &mut next_id);

    let mut tree = BookmarkTree::empty();
    let mut spill = Vec::new();

    for entry in entries {
        let slot = match route(&entry) {
            Bucket::Bar => &mut tree.bookmark_bar,
            Bucket::Other => &mut tree.other,
            Bucket::Synced => &mut tree.synced,
            Bucket::Default => {
                spill.push(entry);
                continue;
            }
        };
        if slot.is_none() {
            *slot = Some(entry);
        } else {
            // A second folder with a root name - treat it like any
            // other folder and let the default bucket have it
            spill.push(entry);
        }
    }

    // The default bucket is the bookmark bar; create it if the document
    // never named one, so the tree always satisfies the root invariant
    if !spill.is_empty() || !tree.has_roots() {
        let bar = tree.bookmark_bar.get_or_insert_with(|| {
            BookmarkNode::folder(take_id(&mut next_id), DEFAULT_BAR_NAME, Vec::new())
        });
        if let BookmarkNode::Folder { children, .. } = bar {
            children.extend(spill);
        }
    }

    Ok(tree)
}

// Parses the entries of one <DL> list
fn parse_dl(dl: ElementRef<'_>, next_id: &mut u64) -> Vec<BookmarkNode> {
    dl.children()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "dt")
        .filter_map(|dt| parse_dt(dt, next_id))
        .collect()
}

// Parses one <DT> entry into a folder or a link
//
// A heading child makes it a folder; an anchor child makes it a link;
// anything else (stray separators and such) is dropped.
fn parse_dt(dt: ElementRef<'_>, next_id: &mut u64) -> Option<BookmarkNode> {
    let mut heading = None;
    let mut anchor = None;
    let mut nested_dl = None;

    for child in dt.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "h3" => heading = Some(child),
            "a" => anchor = Some(child),
            "dl" => nested_dl = Some(child),
            _ => {}
        }
    }

    if let Some(h3) = heading {
        // Pre-order numbering: the folder takes its id before its
        // children take theirs
        let id = take_id(next_id);
        let name = text_of(h3);
        // The child list is either nested inside this <DT> (unclosed
        // tags) or the next sibling <DL> (well-formed markup)
        let children = nested_dl
            .or_else(|| following_sibling_dl(dt))
            .map(|dl| parse_dl(dl, next_id))
            .unwrap_or_default();
        Some(BookmarkNode::Folder { id, name, children })
    } else if let Some(a) = anchor {
        let id = take_id(next_id);
        Some(BookmarkNode::Link {
            id,
            name: text_of(a),
            url: a.value().attr("href").unwrap_or_default().to_string(),
            date_added: a.value().attr("add_date").map(str::to_string),
            date_modified: a.value().attr("last_modified").map(str::to_string),
        })
    } else {
        None
    }
}

// Finds the <DL> holding a folder's children when the markup closed its
// <DT> tags properly and the list ended up as a sibling
fn following_sibling_dl<'a>(dt: ElementRef<'a>) -> Option<ElementRef<'a>> {
    for sibling in dt.next_siblings().filter_map(ElementRef::wrap) {
        match sibling.value().name() {
            "dl" => return Some(sibling),
            // Hit the next entry first - this folder has no child list
            "dt" => return None,
            _ => {}
        }
    }
    None
}

fn take_id(next_id: &mut u64) -> String {
    let id = next_id.to_string();
    *next_id += 1;
    id
}

// Concatenated text content of an element, trimmed
//
// html5ever has already decoded character entities by this point, so
// "&amp;" in the file arrives here as a plain "&".
fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Renders a bookmark tree as a Netscape bookmark document
///
/// Emits one folder block per present, non-empty root in bar -> other ->
/// synced order. Round-tripping the output through decode_tree preserves
/// every (name, url) pair in order; ids are regenerated.
pub fn encode_tree(tree: &BookmarkTree) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n");
    out.push_str("<!-- This is an automatically generated file.\n");
    out.push_str("     It will be read and overwritten.\n");
    out.push_str("     DO NOT EDIT! -->\n");
    out.push_str("<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n");
    out.push_str("<TITLE>Bookmarks</TITLE>\n");
    out.push_str("<H1>Bookmarks</H1>\n");
    out.push_str("<DL><p>\n");

    for root in tree.roots() {
        if let BookmarkNode::Folder { name, children, .. } = root {
            if children.is_empty() {
                continue;
            }
            write_folder(&mut out, name, children, 1);
        }
    }

    out.push_str("</DL><p>\n");
    out
}

fn write_folder(out: &mut String, name: &str, children: &[BookmarkNode], depth: usize) {
    let indent = "    ".repeat(depth);
    out.push_str(&format!("{indent}<DT><H3>{}</H3>\n", escape(name)));
    out.push_str(&format!("{indent}<DL><p>\n"));
    for child in children {
        write_node(out, child, depth + 1);
    }
    out.push_str(&format!("{indent}</DL><p>\n"));
}

fn write_node(out: &mut String, node: &BookmarkNode, depth: usize) {
    match node {
        BookmarkNode::Folder { name, children, .. } => {
            write_folder(out, name, children, depth);
        }
        BookmarkNode::Link {
            name,
            url,
            date_added,
            date_modified,
            ..
        } => {
            let indent = "    ".repeat(depth);
            let mut attrs = format!("HREF=\"{}\"", escape(url));
            if let Some(added) = date_added {
                attrs.push_str(&format!(" ADD_DATE=\"{}\"", escape(added)));
            }
            if let Some(modified) = date_modified {
                attrs.push_str(&format!(" LAST_MODIFIED=\"{}\"", escape(modified)));
            }
            out.push_str(&format!("{indent}<DT><A {attrs}>{}</A>\n", escape(name)));
        }
    }
}

// Escapes the five reserved markup characters for element text and
// attribute values
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why parse with scraper instead of string matching?
//    - Netscape files are 90s-era HTML: unclosed tags everywhere
//    - html5ever applies the same error recovery a browser does, so we
//      read the file the way a browser would have written it
//    - It also decodes entities for us (&amp; comes out as &)
//
// 2. What is ElementRef?
//    - A reference into the parsed DOM that is guaranteed to point at an
//      element (not text or a comment)
//    - ElementRef::wrap() filters arbitrary DOM nodes down to elements
//    - .value() gets the element itself: tag name, attributes
//
// 3. Why does the decoder look for the child <DL> in two places?
//    - With unclosed <DT> tags the parser nests the list inside the <DT>
//    - With properly closed tags the list is the <DT>'s next sibling
//    - Real exports are the first kind, hand-edited files the second
//
// 4. Why escape on encode when decode tolerates entities?
//    - Encoding must never let a name like "Tom & Jerry" produce markup
//    - Decoding goes through the HTML parser, which reverses it - so an
//      encode/decode round trip is clean on content
// -----------------------------------------------------------------------------
