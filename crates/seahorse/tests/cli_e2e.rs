#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn seahorse_cmd(temp: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("seahorse"));
    cmd.env("SEAHORSE_DATA_DIR", temp.join("data"))
        .env("SEAHORSE_CONFIG_DIR", temp.join("config"))
        .env("NO_COLOR", "1")
        .env_remove("SEAHORSE_LOG");
    cmd
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_add_list_delete_workflow() {
    let temp = TempDir::new().unwrap();

    let added = json_output(seahorse_cmd(temp.path()).args([
        "add",
        "bookmark",
        "https://www.rust-lang.org",
        "--title",
        "Rust",
        "--tag",
        "lang",
    ]));
    assert_eq!(added["kind"], "bookmark");
    let id = added["id"].as_str().unwrap().to_string();

    seahorse_cmd(temp.path())
        .args(["add", "text", "remember", "the", "milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added text"));

    seahorse_cmd(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rust"))
        .stdout(predicate::str::contains("#lang"))
        .stdout(predicate::str::contains("remember the milk"));

    let bookmarks = json_output(seahorse_cmd(temp.path()).args(["list", "--kind", "bookmark"]));
    assert_eq!(bookmarks.as_array().unwrap().len(), 1);

    seahorse_cmd(temp.path())
        .args(["delete", &id[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 item(s)"));

    let items = json_output(seahorse_cmd(temp.path()).arg("list"));
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "text");

    assert!(temp.path().join("data/Data/items.json").exists());
}

#[test]
fn test_duplicate_category_is_an_error() {
    let temp = TempDir::new().unwrap();

    seahorse_cmd(temp.path())
        .args(["categories", "add", "Work"])
        .assert()
        .success();

    seahorse_cmd(temp.path())
        .args(["categories", "add", "work"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let categories = json_output(seahorse_cmd(temp.path()).arg("categories"));
    let names: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["All Bookmarks", "Favorites", "None", "Work"]);
}

#[test]
fn test_favorites_and_category_views() {
    let temp = TempDir::new().unwrap();
    seahorse_cmd(temp.path())
        .args(["categories", "add", "Reading"])
        .assert()
        .success();
    seahorse_cmd(temp.path())
        .args(["add", "bookmark", "https://a.example", "-c", "reading"])
        .assert()
        .success();
    seahorse_cmd(temp.path())
        .args(["add", "bookmark", "https://b.example", "--favorite"])
        .assert()
        .success();

    let reading = json_output(seahorse_cmd(temp.path()).args(["list", "-c", "Reading"]));
    assert_eq!(reading.as_array().unwrap().len(), 1);
    assert_eq!(reading[0]["url"], "https://a.example");

    let favorites = json_output(seahorse_cmd(temp.path()).args(["list", "-c", "Favorites"]));
    assert_eq!(favorites.as_array().unwrap().len(), 1);
    assert_eq!(favorites[0]["url"], "https://b.example");

    let all = json_output(seahorse_cmd(temp.path()).args(["list", "-c", "All Bookmarks"]));
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[test]
fn test_relocate_moves_library() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("elsewhere");
    fs::create_dir_all(&target).unwrap();

    seahorse_cmd(temp.path())
        .args(["add", "text", "portable"])
        .assert()
        .success();
    seahorse_cmd(temp.path())
        .args(["relocate", target.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("items.json"));

    assert!(target.join("Seahorse/Data/items.json").exists());
    assert!(temp.path().join("config/settings.json").exists());

    let items = json_output(seahorse_cmd(temp.path()).arg("list"));
    assert_eq!(items[0]["content"], "portable");

    let paths = json_output(seahorse_cmd(temp.path()).arg("paths"));
    assert_eq!(paths["root"]["scoped"], true);
}

#[test]
fn test_backup_and_prefs() {
    let temp = TempDir::new().unwrap();
    seahorse_cmd(temp.path())
        .args(["prefs", "set", "sort", "title"])
        .assert()
        .success();
    seahorse_cmd(temp.path())
        .args(["prefs", "get", "sort"])
        .assert()
        .success()
        .stdout("title\n");

    seahorse_cmd(temp.path())
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains(".tar.gz"));
    let backups = json_output(seahorse_cmd(temp.path()).args(["backup", "--list"]));
    assert_eq!(backups.as_array().unwrap().len(), 1);
}

#[test]
fn test_unknown_item_fails() {
    let temp = TempDir::new().unwrap();
    seahorse_cmd(temp.path())
        .args(["show", "deadbeef"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No item matches"));
}

#[test]
fn test_export_and_import_between_libraries() {
    let temp = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    let exports = temp.path().join("exports");
    fs::create_dir_all(&exports).unwrap();
    let picture = temp.path().join("photo.jpg");
    fs::write(&picture, b"jpeg").unwrap();

    seahorse_cmd(temp.path())
        .args(["add", "bookmark", "https://www.rust-lang.org", "-t", "lang"])
        .assert()
        .success();
    seahorse_cmd(temp.path())
        .args(["add", "image", picture.to_str().unwrap()])
        .assert()
        .success();

    let report = json_output(seahorse_cmd(temp.path()).args(["export", exports.to_str().unwrap()]));
    assert_eq!(report["items"], 2);
    assert_eq!(report["images"], 1);
    let folder = report["directory"].as_str().unwrap().to_string();

    let imported = json_output(seahorse_cmd(other.path()).args(["import", &folder]));
    assert_eq!(imported["items_added"], 2);
    assert_eq!(imported["tags_added"], 1);

    let items = json_output(seahorse_cmd(other.path()).args(["list", "--kind", "image"]));
    let stored = items[0]["image_path"].as_str().unwrap();
    assert!(other.path().join("data/Images").join(stored).is_file());

    seahorse_cmd(other.path())
        .args(["import", &folder])
        .assert()
        .success()
        .stdout(predicate::str::contains("already present: 2 item(s)"));
}

#[test]
fn test_import_browser_bookmarks_skips_duplicates() {
    let temp = TempDir::new().unwrap();
    let html = temp.path().join("bookmarks.html");
    fs::write(
        &html,
        "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
         <DL><p>\n\
         <DT><A HREF=\"https://example.com/\" ADD_DATE=\"1700000000\">Example</A>\n\
         <DT><A HREF=\"https://docs.rs/\">Docs</A>\n\
         </DL>\n",
    )
    .unwrap();

    seahorse_cmd(temp.path())
        .args(["add", "bookmark", "example.com"])
        .assert()
        .success();

    let report = json_output(seahorse_cmd(temp.path()).args(["import", html.to_str().unwrap()]));
    assert_eq!(report["added"], 1);
    assert_eq!(report["duplicates"], 1);

    let out = temp.path().join("bookmarks.json");
    seahorse_cmd(temp.path())
        .args(["export", "--bookmarks", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 bookmark(s)"));
    let written: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 2);
}
