//! Command handlers for the seahorse CLI.
//!
//! Each handler resolves user-facing selectors (names, id prefixes) to core
//! values, calls the orchestrator on the [`SeahorseContext`], and prints the
//! result either as text (via [`super::render`]) or as JSON.

use super::render;
use super::setup::{AddCommands, AddOptions, KindFilter, ListArgs, PrefsAction, TaxonomyAction};
use anyhow::{anyhow, bail, Result};
use seahorse_core::backup::list_backups;
use seahorse_core::cache::ItemCache;
use seahorse_core::init::SeahorseContext;
use seahorse_core::model::{Bookmark, CollectionItem, ImageItem, ItemKind, ItemMeta, TextItem};
use seahorse_core::taxonomy::{Category, Tag};
use seahorse_core::transfer::{
    export_bookmarks, export_library, import_bookmarks, import_library, read_bookmarks,
};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    /// Prints `value` as JSON, or the text produced by `text`.
    fn emit<T: Serialize + ?Sized>(self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        match self {
            OutputMode::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputMode::Text => print!("{}", text()),
        }
        Ok(())
    }
}

// =============================================================================
// Selectors
// =============================================================================

/// Finds the single entry whose id is `selector` or starts with it.
///
/// Prefixes are matched against the hyphen-less hex form, case-insensitively.
fn find_by_id<'a, T>(
    entries: &'a [T],
    selector: &str,
    id_of: impl Fn(&T) -> Uuid,
    what: &str,
) -> Result<&'a T> {
    if let Ok(id) = Uuid::parse_str(selector) {
        return entries
            .iter()
            .find(|e| id_of(*e) == id)
            .ok_or_else(|| anyhow!("No {} with id {}", what, id));
    }

    let prefix = selector.replace('-', "").to_lowercase();
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("No {} matches '{}'", what, selector);
    }
    let mut matches = entries
        .iter()
        .filter(|e| id_of(*e).simple().to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(entry), None) => Ok(entry),
        (None, _) => bail!("No {} matches '{}'", what, selector),
        (Some(_), Some(_)) => bail!("'{}' matches more than one {}", selector, what),
    }
}

fn resolve_item(cache: &ItemCache, selector: &str) -> Result<Uuid> {
    find_by_id(cache.items(), selector, CollectionItem::id, "item").map(CollectionItem::id)
}

fn resolve_bookmark(cache: &ItemCache, selector: &str) -> Result<Uuid> {
    find_by_id(cache.bookmarks(), selector, Bookmark::id, "bookmark").map(Bookmark::id)
}

/// Categories are looked up by name first, then by id.
fn resolve_category(cache: &ItemCache, selector: &str) -> Result<Category> {
    if let Some(category) = cache.category_by_name(selector) {
        return Ok(category.clone());
    }
    find_by_id(cache.categories(), selector, |c| c.id, "category").cloned()
}

fn resolve_tag(cache: &ItemCache, selector: &str) -> Result<Tag> {
    if let Some(tag) = cache.tag_by_name(selector) {
        return Ok(tag.clone());
    }
    find_by_id(cache.tags(), selector, |t| t.id, "tag").cloned()
}

/// Resolves `selector` to a tag, creating a tag with that name when nothing
/// matches. The flag is set when the tag was created.
fn tag_or_create(ctx: &mut SeahorseContext, selector: &str) -> Result<(Tag, bool)> {
    if let Ok(tag) = resolve_tag(ctx.orchestrator.cache(), selector) {
        return Ok((tag, false));
    }
    let tag = ctx.orchestrator.new_tag(selector);
    Ok((ctx.orchestrator.add_tag(tag)?, true))
}

/// Deletes tags created for a change that did not go through.
fn discard_tags(ctx: &mut SeahorseContext, ids: &[Uuid]) {
    for id in ids {
        if let Err(e) = ctx.orchestrator.delete_tag(id) {
            warn!(tag = %id, error = %e, "Failed to remove unused tag");
        }
    }
}

// =============================================================================
// Items
// =============================================================================

/// Builds the shared fields from `options`, along with the ids of any tags
/// that had to be created for them.
fn build_meta(ctx: &mut SeahorseContext, options: &AddOptions) -> Result<(ItemMeta, Vec<Uuid>)> {
    let mut meta = ItemMeta::new();
    if let Some(selector) = &options.category {
        meta.category_id = Some(resolve_category(ctx.orchestrator.cache(), selector)?.id);
    }
    let mut created = Vec::new();
    for selector in &options.tags {
        match tag_or_create(ctx, selector) {
            Ok((tag, fresh)) => {
                if fresh {
                    created.push(tag.id);
                }
                meta.add_tag(tag.id);
            }
            Err(e) => {
                discard_tags(ctx, &created);
                return Err(e);
            }
        }
    }
    meta.is_favorite = options.favorite;
    meta.notes = options.notes.clone();
    Ok((meta, created))
}

/// Relative paths to existing files are made absolute; anything else (asset
/// file names, absolute paths, URLs) is kept as typed.
fn image_reference(raw: &str) -> String {
    let path = Path::new(raw);
    if path.is_relative() && path.is_file() {
        if let Ok(absolute) = path.canonicalize() {
            return absolute.to_string_lossy().into_owned();
        }
    }
    raw.to_string()
}

fn store_new_item(
    ctx: &mut SeahorseContext,
    what: AddCommands,
    meta: ItemMeta,
) -> Result<CollectionItem> {
    let item: CollectionItem = match what {
        AddCommands::Bookmark { url, title, .. } => {
            let mut bookmark = Bookmark::new(title.unwrap_or_else(|| url.clone()), url);
            bookmark.meta = meta;
            bookmark.into()
        }
        AddCommands::Text { content, .. } => {
            let mut text = TextItem::new(content.join(" "));
            text.meta = meta;
            text.into()
        }
        AddCommands::Image {
            path,
            thumbnail,
            ..
        } => {
            let mut image = ImageItem::new(path.as_str());
            image.thumbnail_path = thumbnail.as_deref().map(image_reference);
            image.meta = meta;
            let source = Path::new(&path);
            if source.is_file() {
                return Ok(ctx.orchestrator.add_image_file(source, image)?);
            }
            image.into()
        }
    };
    Ok(ctx.orchestrator.add_item(item)?)
}

pub fn add(ctx: &mut SeahorseContext, mode: OutputMode, what: AddCommands) -> Result<()> {
    if let AddCommands::Bookmark {
        url,
        allow_duplicate: false,
        ..
    } = &what
    {
        if let Some(existing) = ctx.orchestrator.find_bookmark_by_url(url) {
            bail!(
                "Already saved as {} ({}); use --allow-duplicate to add it again",
                render::short_id(&existing.id()),
                existing.title
            );
        }
    }

    let (meta, created_tags) = build_meta(ctx, what.options())?;
    let item = match store_new_item(ctx, what, meta) {
        Ok(item) => item,
        Err(e) => {
            discard_tags(ctx, &created_tags);
            return Err(e);
        }
    };
    mode.emit(&item, || {
        render::success(&format!(
            "Added {} {} {}",
            item.kind(),
            render::short_id(&item.id()),
            item.label()
        ))
    })
}

pub fn list(ctx: &SeahorseContext, mode: OutputMode, args: ListArgs) -> Result<()> {
    let orchestrator = &ctx.orchestrator;
    let cache = orchestrator.cache();

    let mut items: Vec<CollectionItem> = if let Some(selector) = &args.category {
        let category = resolve_category(cache, selector)?;
        orchestrator
            .fetch_bookmarks_for_category(&category)?
            .into_iter()
            .map(CollectionItem::from)
            .collect()
    } else if let Some(selector) = &args.tag {
        let tag = resolve_tag(cache, selector)?;
        orchestrator
            .fetch_bookmarks_for_tag(&tag)?
            .into_iter()
            .map(CollectionItem::from)
            .collect()
    } else {
        cache.items().to_vec()
    };

    if let Some(kind) = args.kind {
        let kind = match kind {
            KindFilter::Bookmark => ItemKind::Bookmark,
            KindFilter::Image => ItemKind::Image,
            KindFilter::Text => ItemKind::Text,
        };
        items.retain(|i| i.kind() == kind);
    }
    if args.favorites {
        items.retain(CollectionItem::is_favorite);
    }

    mode.emit(&items, || render::render_items(&items, cache))
}

pub fn show(ctx: &SeahorseContext, mode: OutputMode, selector: &str) -> Result<()> {
    let cache = ctx.orchestrator.cache();
    let id = resolve_item(cache, selector)?;
    let item = cache
        .item(&id)
        .ok_or_else(|| anyhow!("No item with id {}", id))?;
    let tags: Vec<&Tag> = cache.tags_for(item);
    let value = json!({ "item": item, "tags": tags });
    mode.emit(&value, || {
        render::render_item_detail(item, cache, ctx.orchestrator.layout())
    })
}

pub fn delete(ctx: &mut SeahorseContext, mode: OutputMode, selectors: &[String]) -> Result<()> {
    // Resolve everything first so a bad selector deletes nothing
    let ids = selectors
        .iter()
        .map(|s| resolve_item(ctx.orchestrator.cache(), s))
        .collect::<Result<Vec<_>>>()?;
    for id in &ids {
        ctx.orchestrator.delete_item(id)?;
    }
    mode.emit(&json!({ "deleted": ids }), || {
        render::success(&format!("Deleted {} item(s)", ids.len()))
    })
}

pub fn set_favorite(
    ctx: &mut SeahorseContext,
    mode: OutputMode,
    selectors: &[String],
    favorite: bool,
) -> Result<()> {
    let ids = selectors
        .iter()
        .map(|s| resolve_item(ctx.orchestrator.cache(), s))
        .collect::<Result<Vec<_>>>()?;
    let mut updated = Vec::with_capacity(ids.len());
    for id in &ids {
        updated.push(ctx.orchestrator.set_favorite(id, favorite)?);
    }
    let verb = if favorite { "Favorited" } else { "Unfavorited" };
    mode.emit(&updated, || {
        render::success(&format!("{} {} item(s)", verb, updated.len()))
    })
}

pub fn tag(
    ctx: &mut SeahorseContext,
    mode: OutputMode,
    bookmark: &str,
    tag: &str,
    toggle: bool,
) -> Result<()> {
    let bookmark_id = resolve_bookmark(ctx.orchestrator.cache(), bookmark)?;
    let (tag, created) = tag_or_create(ctx, tag)?;
    let applied = if toggle {
        ctx.orchestrator.toggle_tag_on_bookmark(&bookmark_id, &tag.id)
    } else {
        ctx.orchestrator
            .add_tag_to_bookmark(&bookmark_id, &tag.id)
            .map(|_| true)
    };
    let tagged = match applied {
        Ok(tagged) => tagged,
        Err(e) => {
            if created {
                discard_tags(ctx, &[tag.id]);
            }
            return Err(e.into());
        }
    };
    let message = if tagged {
        format!("Tagged {} with #{}", render::short_id(&bookmark_id), tag.name)
    } else {
        format!("Removed #{} from {}", tag.name, render::short_id(&bookmark_id))
    };
    mode.emit(
        &json!({ "bookmark": bookmark_id, "tag": tag, "tagged": tagged }),
        || render::success(&message),
    )
}

pub fn untag(ctx: &mut SeahorseContext, mode: OutputMode, bookmark: &str, tag: &str) -> Result<()> {
    let bookmark_id = resolve_bookmark(ctx.orchestrator.cache(), bookmark)?;
    let tag = resolve_tag(ctx.orchestrator.cache(), tag)?;
    let bookmark = ctx.orchestrator.remove_tag_from_bookmark(&bookmark_id, &tag.id)?;
    mode.emit(&bookmark, || {
        render::success(&format!(
            "Removed #{} from {}",
            tag.name,
            render::short_id(&bookmark_id)
        ))
    })
}

pub fn move_item(
    ctx: &mut SeahorseContext,
    mode: OutputMode,
    selector: &str,
    category: Option<&str>,
) -> Result<()> {
    let cache = ctx.orchestrator.cache();
    let id = resolve_item(cache, selector)?;
    let category = category.map(|c| resolve_category(cache, c)).transpose()?;
    let mut item = cache
        .item(&id)
        .cloned()
        .ok_or_else(|| anyhow!("No item with id {}", id))?;
    item.meta_mut().category_id = category.as_ref().map(|c| c.id);
    let item = ctx.orchestrator.update_item(item)?;

    let target = category.map(|c| c.name).unwrap_or_else(|| "no category".into());
    mode.emit(&item, || {
        render::success(&format!("Moved {} to {}", render::short_id(&id), target))
    })
}

// =============================================================================
// Categories and tags
// =============================================================================

pub fn categories(
    ctx: &mut SeahorseContext,
    mode: OutputMode,
    action: Option<TaxonomyAction>,
) -> Result<()> {
    let orchestrator = &mut ctx.orchestrator;
    match action.unwrap_or(TaxonomyAction::List) {
        TaxonomyAction::List => {
            let categories = orchestrator.cache().categories();
            mode.emit(categories, || render::render_categories(categories))
        }
        TaxonomyAction::Add { name, color } => {
            let mut category = orchestrator.new_category(&name);
            if let Some(color) = color {
                category = category.with_color(color);
            }
            let category = orchestrator.add_category(category)?;
            mode.emit(&category, || {
                render::success(&format!("Created category {}", category.name))
            })
        }
        TaxonomyAction::Rename { entry, name } => {
            let category = resolve_category(orchestrator.cache(), &entry)?;
            let renamed = orchestrator.rename_category(&category.id, &name)?;
            mode.emit(&renamed, || {
                render::success(&format!("Renamed {} to {}", category.name, renamed.name))
            })
        }
        TaxonomyAction::Delete { entry } => {
            let category = resolve_category(orchestrator.cache(), &entry)?;
            orchestrator.delete_category(&category.id)?;
            mode.emit(&category, || {
                render::success(&format!("Deleted category {}", category.name))
            })
        }
        TaxonomyAction::Reorder { entries } => {
            let ids = entries
                .iter()
                .map(|e| resolve_category(orchestrator.cache(), e).map(|c| c.id))
                .collect::<Result<Vec<_>>>()?;
            orchestrator.reorder_categories(&ids)?;
            let categories = orchestrator.cache().categories();
            mode.emit(categories, || render::render_categories(categories))
        }
    }
}

pub fn tags(
    ctx: &mut SeahorseContext,
    mode: OutputMode,
    action: Option<TaxonomyAction>,
) -> Result<()> {
    let orchestrator = &mut ctx.orchestrator;
    match action.unwrap_or(TaxonomyAction::List) {
        TaxonomyAction::List => {
            let tags = orchestrator.cache().tags();
            mode.emit(tags, || render::render_tags(tags))
        }
        TaxonomyAction::Add { name, color } => {
            let mut tag = orchestrator.new_tag(&name);
            if let Some(color) = color {
                tag = tag.with_color(color);
            }
            let tag = orchestrator.add_tag(tag)?;
            mode.emit(&tag, || render::success(&format!("Created tag #{}", tag.name)))
        }
        TaxonomyAction::Rename { entry, name } => {
            let tag = resolve_tag(orchestrator.cache(), &entry)?;
            let renamed = orchestrator.rename_tag(&tag.id, &name)?;
            mode.emit(&renamed, || {
                render::success(&format!("Renamed #{} to #{}", tag.name, renamed.name))
            })
        }
        TaxonomyAction::Delete { entry } => {
            let tag = resolve_tag(orchestrator.cache(), &entry)?;
            orchestrator.delete_tag(&tag.id)?;
            mode.emit(&tag, || render::success(&format!("Deleted tag #{}", tag.name)))
        }
        TaxonomyAction::Reorder { entries } => {
            let ids = entries
                .iter()
                .map(|e| resolve_tag(orchestrator.cache(), e).map(|t| t.id))
                .collect::<Result<Vec<_>>>()?;
            orchestrator.reorder_tags(&ids)?;
            let tags = orchestrator.cache().tags();
            mode.emit(tags, || render::render_tags(tags))
        }
    }
}

// =============================================================================
// Data and location
// =============================================================================

pub fn prefs(
    ctx: &mut SeahorseContext,
    mode: OutputMode,
    action: Option<PrefsAction>,
) -> Result<()> {
    let orchestrator = &mut ctx.orchestrator;
    match action.unwrap_or(PrefsAction::List) {
        PrefsAction::List => {
            let prefs = orchestrator.preferences()?;
            mode.emit(&prefs, || render::render_preferences(&prefs))
        }
        PrefsAction::Get { key } => {
            let value = orchestrator
                .preference(&key)?
                .ok_or_else(|| anyhow!("Preference '{}' is not set", key))?;
            mode.emit(&json!({ key.as_str(): value }), || format!("{}\n", value))
        }
        PrefsAction::Set { key, value } => {
            orchestrator.set_preference(&key, &value)?;
            mode.emit(&json!({ key.as_str(): value }), || {
                render::success(&format!("{} = {}", key, value))
            })
        }
        PrefsAction::Unset { key } => {
            orchestrator.delete_preference(&key)?;
            mode.emit(&json!({ "removed": key }), || {
                render::success(&format!("Removed {}", key))
            })
        }
    }
}

pub fn flush(ctx: &mut SeahorseContext, mode: OutputMode) -> Result<()> {
    ctx.orchestrator.force_save_all()?;
    mode.emit(&json!({ "flushed": true }), || {
        render::success("All collections written")
    })
}

pub fn backup(ctx: &SeahorseContext, mode: OutputMode, list: bool) -> Result<()> {
    if list {
        let archives = list_backups(ctx.layout())?;
        return mode.emit(&archives, || render::render_backup_list(&archives));
    }
    let report = ctx.backup()?;
    mode.emit(&report, || render::render_backup(&report))
}

pub fn paths(ctx: &SeahorseContext, mode: OutputMode) -> Result<()> {
    let layout = ctx.layout();
    let stats = ctx.orchestrator.cache().stats();
    let value = json!({
        "root": ctx.root(),
        "default_root": ctx.default_root(),
        "data": layout.data_dir(),
        "images": layout.assets_dir(),
        "backups": layout.backups_dir(),
        "config": ctx.config_dir(),
        "stats": stats,
    });
    mode.emit(&value, || {
        render::render_paths(layout, ctx.root().scoped, ctx.config_dir(), &stats)
    })
}

pub fn relocate(ctx: &mut SeahorseContext, mode: OutputMode, dir: &Path) -> Result<()> {
    let dir = if dir.is_relative() {
        std::env::current_dir()?.join(dir)
    } else {
        dir.to_path_buf()
    };
    let result = ctx.relocate(&dir)?;
    let root = ctx.root().path.clone();
    mode.emit(&json!({ "root": root, "migration": result }), || {
        render::render_migration(&result, &root)
    })
}

pub fn export(ctx: &SeahorseContext, mode: OutputMode, dest: &Path, bookmarks: bool) -> Result<()> {
    if bookmarks {
        let count = export_bookmarks(&ctx.orchestrator, dest)?;
        return mode.emit(&json!({ "path": dest, "bookmarks": count }), || {
            render::success(&format!("Wrote {} bookmark(s) to {}", count, dest.display()))
        });
    }
    let report = export_library(&ctx.orchestrator, dest)?;
    mode.emit(&report, || render::render_export(&report))
}

/// Folders are read as library exports, files as bookmark lists.
pub fn import(ctx: &mut SeahorseContext, mode: OutputMode, source: &Path) -> Result<()> {
    if source.is_dir() {
        let report = import_library(&mut ctx.orchestrator, source)?;
        return mode.emit(&report, || render::render_import(&report));
    }
    let bookmarks = read_bookmarks(source)?;
    let report = import_bookmarks(&mut ctx.orchestrator, bookmarks)?;
    mode.emit(&report, || render::render_bookmark_import(&report))
}

pub fn reset_location(ctx: &mut SeahorseContext, mode: OutputMode) -> Result<()> {
    let result = ctx.reset_location()?;
    let root = ctx.root().path.clone();
    mode.emit(&json!({ "root": root, "migration": result }), || {
        render::render_migration(&result, &root)
    })
}
