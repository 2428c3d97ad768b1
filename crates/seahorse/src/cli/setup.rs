use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "seahorse",
    bin_name = "seahorse",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Local collection of bookmarks, images and notes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Core(CoreCommands),

    #[command(flatten)]
    Item(ItemCommands),

    #[command(flatten)]
    Taxonomy(TaxonomyCommands),

    #[command(flatten)]
    Data(DataCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum CoreCommands {
    /// Add a bookmark, image or note
    #[command(alias = "a", display_order = 1)]
    Add {
        #[command(subcommand)]
        what: AddCommands,
    },

    /// List items
    #[command(alias = "ls", display_order = 2)]
    List(ListArgs),

    /// Show a single item
    #[command(alias = "v", display_order = 3)]
    Show {
        /// Item id or unique id prefix
        item: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only this kind of item
    #[arg(long, value_enum)]
    pub kind: Option<KindFilter>,

    /// Bookmarks in this category (name or id prefix)
    #[arg(short, long, conflicts_with_all = ["tag", "kind"])]
    pub category: Option<String>,

    /// Bookmarks carrying this tag (name or id prefix)
    #[arg(short, long, conflicts_with_all = ["category", "kind"])]
    pub tag: Option<String>,

    /// Only favorites
    #[arg(short, long)]
    pub favorites: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    Bookmark,
    Image,
    Text,
}

/// Options shared by every `add` variant.
#[derive(Args, Debug, Default)]
pub struct AddOptions {
    /// Category (name or id prefix)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Tag to attach (repeatable, name or id prefix)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Mark as favorite
    #[arg(short, long)]
    pub favorite: bool,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum AddCommands {
    /// Add a web bookmark
    Bookmark {
        url: String,

        /// Title (defaults to the URL)
        #[arg(long)]
        title: Option<String>,

        /// Add even if a bookmark with the same URL exists
        #[arg(long)]
        allow_duplicate: bool,

        #[command(flatten)]
        options: AddOptions,
    },

    /// Add a text note
    Text {
        /// Note body (words joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        content: Vec<String>,

        #[command(flatten)]
        options: AddOptions,
    },

    /// Add an image; local files are copied into the library
    Image {
        /// Image file, file name in the library, or http(s) URL
        path: String,

        /// Thumbnail path or URL
        #[arg(long)]
        thumbnail: Option<String>,

        #[command(flatten)]
        options: AddOptions,
    },
}

impl AddCommands {
    pub fn options(&self) -> &AddOptions {
        match self {
            AddCommands::Bookmark { options, .. }
            | AddCommands::Text { options, .. }
            | AddCommands::Image { options, .. } => options,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Delete items (image files in the library are removed too)
    #[command(alias = "rm", display_order = 10)]
    Delete {
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Mark items as favorite
    #[command(alias = "fav", display_order = 11)]
    Favorite {
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Remove the favorite mark
    #[command(display_order = 12)]
    Unfavorite {
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Attach a tag to a bookmark
    #[command(display_order = 13)]
    Tag {
        bookmark: String,
        tag: String,

        /// Remove the tag if the bookmark already has it
        #[arg(long)]
        toggle: bool,
    },

    /// Detach a tag from a bookmark
    #[command(display_order = 14)]
    Untag { bookmark: String, tag: String },

    /// Move an item to another category
    #[command(display_order = 15)]
    Move {
        item: String,

        /// Target category; omit to make the item uncategorized
        category: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaxonomyCommands {
    /// Manage categories
    #[command(alias = "cat", display_order = 20)]
    Categories {
        #[command(subcommand)]
        action: Option<TaxonomyAction>,
    },

    /// Manage tags
    #[command(display_order = 21)]
    Tags {
        #[command(subcommand)]
        action: Option<TaxonomyAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaxonomyAction {
    /// List entries in display order (default)
    List,

    /// Create an entry
    Add {
        name: String,

        /// Color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },

    /// Rename an entry
    Rename { entry: String, name: String },

    /// Delete an entry (items keep their references)
    #[command(alias = "rm")]
    Delete { entry: String },

    /// Set the display order; every entry must be named exactly once
    Reorder {
        #[arg(required = true, num_args = 1..)]
        entries: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Read or change stored preferences
    #[command(display_order = 30)]
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },

    /// Write every collection to disk
    #[command(display_order = 31)]
    Flush,

    /// Write a compressed backup of the collections
    #[command(display_order = 32)]
    Backup {
        /// List existing backups instead of writing one
        #[arg(long)]
        list: bool,
    },

    /// Show where the library lives
    #[command(display_order = 33)]
    Paths,

    /// Move the library into <DIR>/Seahorse
    #[command(display_order = 34)]
    Relocate { dir: PathBuf },

    /// Move the library back to the default location
    #[command(display_order = 35)]
    ResetLocation,

    /// Copy the library into <DEST>/Seahorse_Export_<date>
    #[command(display_order = 36)]
    Export {
        dest: PathBuf,

        /// Write only the bookmarks, as a JSON file at <DEST>
        #[arg(long)]
        bookmarks: bool,
    },

    /// Merge an export folder, or a bookmark file (JSON or browser HTML)
    #[command(display_order = 37)]
    Import { source: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum PrefsAction {
    /// List all preferences (default)
    List,
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Show the resolved configuration or generate a template
    #[command(display_order = 40)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate a commented seahorse.toml template
    Gen {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("seahorse").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_naked_invocation_has_no_command() {
        assert!(parse(&[]).command.is_none());
    }

    #[test]
    fn test_add_bookmark_with_options() {
        let cli = parse(&[
            "add", "bookmark", "rust-lang.org", "--title", "Rust", "-t", "lang", "-t", "docs",
            "--favorite", "--json",
        ]);
        assert!(cli.json);
        let Some(Commands::Core(CoreCommands::Add {
            what: AddCommands::Bookmark { url, title, options, .. },
        })) = cli.command
        else {
            panic!("expected add bookmark");
        };
        assert_eq!(url, "rust-lang.org");
        assert_eq!(title.as_deref(), Some("Rust"));
        assert_eq!(options.tags, vec!["lang", "docs"]);
        assert!(options.favorite);
    }

    #[test]
    fn test_add_text_joins_words() {
        let cli = parse(&["add", "text", "buy", "more", "milk"]);
        let Some(Commands::Core(CoreCommands::Add {
            what: AddCommands::Text { content, .. },
        })) = cli.command
        else {
            panic!("expected add text");
        };
        assert_eq!(content.join(" "), "buy more milk");
    }

    #[test]
    fn test_list_filters_conflict() {
        let result = Cli::try_parse_from(["seahorse", "list", "--category", "a", "--tag", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_export_bookmarks_flag() {
        let cli = parse(&["export", "out.json", "--bookmarks"]);
        let Some(Commands::Data(DataCommands::Export { dest, bookmarks })) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(dest, PathBuf::from("out.json"));
        assert!(bookmarks);
    }

    #[test]
    fn test_taxonomy_action_is_optional() {
        let cli = parse(&["tags"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Taxonomy(TaxonomyCommands::Tags { action: None }))
        ));
    }
}
