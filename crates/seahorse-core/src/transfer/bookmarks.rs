//! Bookmark lists in JSON or Netscape HTML.
//!
//! JSON files hold an array of bookmarks, either full records as written by
//! [`export_bookmarks`] or bare `{"url": ..., "title": ...}` objects. HTML
//! files are the `<DT><A HREF=...>` lists every browser exports; folders are
//! flattened.

use crate::error::Result;
use crate::model::Bookmark;
use crate::orchestrator::ItemOrchestrator;
use crate::store::DataStore;
use crate::taxonomy::UNCATEGORIZED;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<DT>\s*<A\s+([^>]*)>(.*?)</A>"));
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| pattern(r#"(?i)([a-z_]+)\s*=\s*"([^"]*)""#));
static MARKUP: LazyLock<Regex> = LazyLock::new(|| pattern(r"<[^>]*>"));

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("bookmark patterns are valid")
}

const NETSCAPE_DOCTYPE: &str = "<!DOCTYPE NETSCAPE-BOOKMARK";

/// Links browsers keep for their own use. They do not open anywhere else.
const SKIPPED_SCHEMES: [&str; 2] = ["place:", "javascript:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkFormat {
    Json,
    Html,
}

impl BookmarkFormat {
    /// Decides by extension (`.json`, `.html`, `.htm`), then by content.
    /// Anything unrecognized is read as JSON.
    pub fn detect(path: &Path, content: &str) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => return BookmarkFormat::Json,
            Some("html") | Some("htm") => return BookmarkFormat::Html,
            _ => {}
        }

        if content.to_ascii_uppercase().contains(NETSCAPE_DOCTYPE) || ANCHOR.is_match(content) {
            BookmarkFormat::Html
        } else {
            BookmarkFormat::Json
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BookmarkImportReport {
    pub added: usize,
    /// Entries whose id or URL was already in the library.
    pub duplicates: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonBookmark {
    Full(Bookmark),
    Link {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl From<JsonBookmark> for Bookmark {
    fn from(entry: JsonBookmark) -> Self {
        match entry {
            JsonBookmark::Full(bookmark) => bookmark,
            JsonBookmark::Link { url, title } => {
                let title = title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| url.clone());
                Bookmark::new(title, url)
            }
        }
    }
}

/// Reads a bookmark file, detecting its format.
pub fn read_bookmarks(path: &Path) -> Result<Vec<Bookmark>> {
    let content = fs::read_to_string(path)?;
    let format = BookmarkFormat::detect(path, &content);
    debug!(path = %path.display(), ?format, "Reading bookmarks");
    parse_bookmarks(&content, format)
}

pub fn parse_bookmarks(content: &str, format: BookmarkFormat) -> Result<Vec<Bookmark>> {
    match format {
        BookmarkFormat::Json => {
            let entries: Vec<JsonBookmark> = serde_json::from_str(content)?;
            Ok(entries.into_iter().map(Bookmark::from).collect())
        }
        BookmarkFormat::Html => Ok(parse_netscape(content)),
    }
}

fn parse_netscape(html: &str) -> Vec<Bookmark> {
    ANCHOR
        .captures_iter(html)
        .filter_map(|anchor| {
            let mut href = None;
            let mut added = None;
            for attr in ATTRIBUTE.captures_iter(&anchor[1]) {
                match attr[1].to_ascii_uppercase().as_str() {
                    "HREF" => href = Some(decode_entities(attr[2].trim())),
                    "ADD_DATE" => {
                        added = attr[2]
                            .trim()
                            .parse::<i64>()
                            .ok()
                            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
                    }
                    _ => {}
                }
            }

            let url = href.filter(|u| !u.is_empty())?;
            if SKIPPED_SCHEMES.iter().any(|s| url.starts_with(s)) {
                debug!(url = %url, "Skipping browser-internal link");
                return None;
            }

            let title = decode_entities(&MARKUP.replace_all(&anchor[2], ""));
            let title = match title.trim() {
                "" => url.clone(),
                trimmed => trimmed.to_string(),
            };
            let mut bookmark = Bookmark::new(title, url);
            if let Some(added) = added {
                bookmark.meta.added_date = added;
            }
            Some(bookmark)
        })
        .collect()
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Adds `bookmarks` to the library in the uncategorized category.
///
/// Entries whose id is taken, or whose URL matches a stored bookmark after
/// normalization, are counted as duplicates and skipped. Tags the library
/// does not know are dropped. Any other failure stops the import; bookmarks
/// added before it stay.
pub fn import_bookmarks<S: DataStore>(
    orch: &mut ItemOrchestrator<S>,
    bookmarks: Vec<Bookmark>,
) -> Result<BookmarkImportReport> {
    let uncategorized = orch.cache().category_by_name(UNCATEGORIZED).map(|c| c.id);
    let mut report = BookmarkImportReport::default();

    for mut bookmark in bookmarks {
        let duplicate = orch.cache().item(&bookmark.id()).is_some()
            || orch.find_bookmark_by_url(&bookmark.url).is_some();
        if duplicate {
            debug!(url = %bookmark.url, "Bookmark already in library");
            report.duplicates += 1;
            continue;
        }

        bookmark.meta.category_id = uncategorized;
        let cache = orch.cache();
        bookmark.meta.tag_ids.retain(|id| cache.tag(id).is_some());
        orch.add_bookmark(bookmark)?;
        report.added += 1;
    }

    info!(
        added = report.added,
        duplicates = report.duplicates,
        "Bookmarks imported"
    );
    Ok(report)
}

/// Writes every bookmark as a pretty-printed JSON array. Returns the count.
pub fn export_bookmarks<S: DataStore>(orch: &ItemOrchestrator<S>, path: &Path) -> Result<usize> {
    let bookmarks = orch.cache().bookmarks();
    fs::write(path, serde_json::to_vec_pretty(bookmarks)?)?;
    info!(path = %path.display(), count = bookmarks.len(), "Bookmarks exported");
    Ok(bookmarks.len())
}
