//! Text rendering for the CLI.
//!
//! Every function here returns a `String`; printing is left to the handlers.
//! JSON output bypasses this module and serializes the core types directly.

use chrono::{DateTime, Utc};
use console::{style, Style};
use seahorse_core::backup::BackupReport;
use seahorse_core::cache::{CacheStats, ItemCache};
use seahorse_core::model::{CollectionItem, ItemKind};
use seahorse_core::paths::{display_path, AssetLocation, StorageLayout};
use seahorse_core::relocate::MigrationResult;
use seahorse_core::store::Preferences;
use seahorse_core::taxonomy::{Category, Tag};
use seahorse_core::transfer::{BookmarkImportReport, ExportReport, ImportReport};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use uuid::Uuid;

const LINE_WIDTH: usize = 100;
const COL_ID: usize = 9;
const COL_KIND: usize = 2;
const COL_FAV: usize = 2;
const COL_TIME: usize = 6;
const FAVORITE_MARKER: &str = "★";

pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

fn kind_marker(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Bookmark => "🔗",
        ItemKind::Image => "🖼",
        ItemKind::Text => "📝",
    }
}

/// Cuts `text` to at most `width` display columns, ending with `…` when cut.
fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn pad_to_width(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn item_line(item: &CollectionItem, cache: &ItemCache) -> String {
    let tags: Vec<String> = cache
        .tags_for(item)
        .iter()
        .map(|t| format!("#{}", t.name))
        .collect();
    let tags_text = tags.join(" ");
    let tags_width = if tags_text.is_empty() {
        0
    } else {
        tags_text.width() + 1
    };

    let fixed = COL_ID + COL_KIND + 1 + COL_FAV + COL_TIME;
    let label_width = LINE_WIDTH.saturating_sub(fixed + tags_width);
    let label = truncate_to_width(&single_line(&item.label()), label_width);

    let favorite = if item.is_favorite() {
        style(FAVORITE_MARKER).yellow().to_string()
    } else {
        " ".to_string()
    };

    let mut line = format!(
        "{} {} {} {}",
        style(pad_to_width(&short_id(&item.id()), COL_ID - 1)).dim(),
        kind_marker(item.kind()),
        favorite,
        pad_to_width(&label, label_width),
    );
    if !tags_text.is_empty() {
        let _ = write!(line, "{} ", style(tags_text).cyan());
    }
    let _ = write!(line, "{}", style(format_time_ago(item.added_date())).dim());
    line
}

pub fn render_items(items: &[CollectionItem], cache: &ItemCache) -> String {
    if items.is_empty() {
        return format!("{}\n", style("No items.").dim());
    }
    let mut out = String::new();
    for item in items {
        out.push_str(&item_line(item, cache));
        out.push('\n');
    }
    out
}

fn field(out: &mut String, name: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{} {}", Style::new().bold().apply_to(pad_to_width(name, 9)), value);
}

pub fn render_item_detail(
    item: &CollectionItem,
    cache: &ItemCache,
    layout: &StorageLayout,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(item.label()).bold());
    field(&mut out, "id", item.id());
    field(&mut out, "kind", item.kind());

    match item {
        CollectionItem::Bookmark(b) => {
            field(&mut out, "url", &b.url);
            if let Some(description) = b.metadata.as_ref().and_then(|m| m.description.as_ref()) {
                field(&mut out, "about", single_line(description));
            }
        }
        CollectionItem::Image(i) => {
            field(&mut out, "image", asset_text(layout, &i.image_path));
            if let Some(thumb) = &i.thumbnail_path {
                field(&mut out, "thumb", asset_text(layout, thumb));
            }
            if let Some(size) = i.image_size {
                field(&mut out, "size", format!("{}x{}", size.width, size.height));
            }
        }
        CollectionItem::Text(t) => field(&mut out, "preview", t.content_preview()),
    }

    let category = match item.category_id() {
        None => "-".to_string(),
        Some(id) => cache
            .category(&id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("{} (deleted)", short_id(&id))),
    };
    field(&mut out, "category", category);

    let tags: Vec<String> = cache.tags_for(item).iter().map(|t| t.name.clone()).collect();
    if !tags.is_empty() {
        field(&mut out, "tags", tags.join(", "));
    }
    if item.is_favorite() {
        field(&mut out, "favorite", FAVORITE_MARKER);
    }
    if let Some(notes) = &item.meta().notes {
        field(&mut out, "notes", notes);
    }
    field(&mut out, "added", describe_when(item.added_date()));
    if let Some(modified) = item.meta().modified_date {
        field(&mut out, "modified", describe_when(modified));
    }
    out
}

fn asset_text(layout: &StorageLayout, stored: &str) -> String {
    match layout.resolve_asset_path(stored) {
        AssetLocation::Remote(url) => url,
        AssetLocation::Local(path) => display_path(&path),
    }
}

pub fn render_categories(categories: &[Category]) -> String {
    let mut out = String::new();
    for c in categories {
        let marker = if c.pseudo().is_some() { "*" } else { " " };
        let _ = writeln!(
            out,
            "{} {}{} {}",
            style(short_id(&c.id)).dim(),
            marker,
            c.name,
            style(&c.color_hex).dim()
        );
    }
    out
}

pub fn render_tags(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return format!("{}\n", style("No tags.").dim());
    }
    let mut out = String::new();
    for t in tags {
        let _ = writeln!(
            out,
            "{} #{} {}",
            style(short_id(&t.id)).dim(),
            t.name,
            style(&t.color_hex).dim()
        );
    }
    out
}

pub fn render_preferences(prefs: &Preferences) -> String {
    let mut out = String::new();
    for (key, value) in prefs {
        let _ = writeln!(out, "{} = {}", key, value);
    }
    out
}

pub fn render_paths(
    layout: &StorageLayout,
    scoped: bool,
    config_dir: &Path,
    stats: &CacheStats,
) -> String {
    let mut out = String::new();
    let source = if scoped { "selected location" } else { "default location" };
    let _ = writeln!(out, "root     {} ({})", display_path(layout.root()), source);
    let _ = writeln!(out, "data     {}", display_path(&layout.data_dir()));
    let _ = writeln!(out, "images   {}", display_path(&layout.assets_dir()));
    let _ = writeln!(out, "backups  {}", display_path(&layout.backups_dir()));
    let _ = writeln!(out, "config   {}", display_path(config_dir));
    let _ = writeln!(
        out,
        "{}",
        style(format!(
            "{} items ({} bookmarks, {} images, {} notes), {} categories, {} tags",
            stats.items, stats.bookmarks, stats.images, stats.texts, stats.categories, stats.tags
        ))
        .dim()
    );
    out
}

pub fn render_backup(report: &BackupReport) -> String {
    let mut out = format!("Backup written to {}\n", display_path(&report.archive));
    for pruned in &report.pruned {
        let _ = writeln!(out, "{}", style(format!("removed {}", display_path(pruned))).dim());
    }
    out
}

pub fn render_backup_list(archives: &[PathBuf]) -> String {
    if archives.is_empty() {
        return format!("{}\n", style("No backups.").dim());
    }
    archives
        .iter()
        .map(|p| format!("{}\n", display_path(p)))
        .collect()
}

pub fn render_migration(result: &MigrationResult, root: &Path) -> String {
    let mut out = format!("Library now at {}\n", display_path(root));
    if !result.migrated.is_empty() {
        let _ = writeln!(out, "copied   {}", result.migrated.join(", "));
    }
    if !result.skipped.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            style(format!("kept existing {}", result.skipped.join(", "))).yellow()
        );
    }
    for (file, error) in &result.errors {
        let _ = writeln!(out, "{}", style(format!("failed   {}: {}", file, error)).red());
    }
    out
}

pub fn render_export(report: &ExportReport) -> String {
    let mut out = format!("Library exported to {}\n", display_path(&report.directory));
    let _ = writeln!(
        out,
        "{}",
        style(format!(
            "{} items, {} categories, {} tags, {} image files",
            report.items, report.categories, report.tags, report.images
        ))
        .dim()
    );
    out
}

pub fn render_import(report: &ImportReport) -> String {
    let mut out = format!(
        "Imported {} item(s), {} categories, {} tags, {} image files\n",
        report.items_added, report.categories_added, report.tags_added, report.images_copied
    );
    if report.items_skipped + report.categories_merged + report.tags_merged > 0 {
        let _ = writeln!(
            out,
            "{}",
            style(format!(
                "already present: {} item(s), {} categories, {} tags",
                report.items_skipped, report.categories_merged, report.tags_merged
            ))
            .dim()
        );
    }
    for error in &report.errors {
        let _ = writeln!(out, "{}", style(format!("failed   {}", error)).red());
    }
    out
}

pub fn render_bookmark_import(report: &BookmarkImportReport) -> String {
    let mut out = success(&format!("Imported {} bookmark(s)", report.added));
    if report.duplicates > 0 {
        let skipped = format!("skipped {} already saved", report.duplicates);
        let _ = writeln!(out, "{}", style(skipped).dim());
    }
    out
}

pub fn success(message: &str) -> String {
    format!("{} {}\n", style("✓").green(), message)
}

fn describe_when(timestamp: DateTime<Utc>) -> String {
    let elapsed = Utc::now()
        .signed_duration_since(timestamp)
        .to_std()
        .unwrap_or_default();
    format!(
        "{} ({})",
        timestamp.format("%Y-%m-%d %H:%M"),
        timeago::Formatter::new().convert(elapsed)
    )
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let now = Utc::now();
    let secs = now.signed_duration_since(timestamp).num_seconds().max(0) as u64;

    let (value, unit) = if secs < 60 {
        (secs, 's')
    } else if secs < 3600 {
        (secs / 60, 'm')
    } else if secs < 86400 {
        (secs / 3600, 'h')
    } else if secs < 86400 * 7 {
        (secs / 86400, 'd')
    } else if secs < 86400 * 30 {
        (secs / (86400 * 7), 'w')
    } else if secs < 86400 * 365 {
        (secs / (86400 * 30), 'M')
    } else {
        (secs / (86400 * 365), 'y')
    };

    format!("{:>3}{}", value, unit)
}
