//! Guards the public surface of this crate against accidental changes.
//!
//! Run with `COLONYCORE_UPDATE_SNAPSHOT=1` to accept an intentional change.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

const UPDATE_ENV: &str = "COLONYCORE_UPDATE_SNAPSHOT";

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn collect_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

fn paren_depth(text: &str) -> i32 {
    text.chars().fold(0, |depth, c| match c {
        '(' | '[' => depth + 1,
        ')' | ']' => depth - 1,
        _ => depth,
    })
}

/// Joins a `pub` item spread over several lines until its signature ends.
fn join_item<'a>(first: &str, rest: &mut impl Iterator<Item = &'a str>) -> String {
    let is_use = first.starts_with("pub use ");
    let mut text = first.to_string();
    loop {
        let done = if is_use {
            text.contains(';')
        } else {
            text.contains(['{', '}', ';']) || (text.ends_with(',') && paren_depth(&text) == 0)
        };
        if done {
            break;
        }
        match rest.next() {
            Some(next) => {
                text.push(' ');
                text.push_str(next.trim());
            }
            None => break,
        }
    }
    text.replace("( ", "(")
        .replace(" )", ")")
        .replace(",)", ")")
}

/// `a::{B, c::{D, E}}` becomes `a::B`, `a::c::D`, `a::c::E`.
fn expand_use(path: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (path.find('{'), path.rfind('}')) else {
        return vec![path.trim().to_string()];
    };
    let prefix = &path[..open];
    let inner = &path[open + 1..close];

    let mut names = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (index, c) in inner.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                names.push(&inner[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    names.push(&inner[start..]);

    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .flat_map(|name| expand_use(&format!("{prefix}{name}")))
        .collect()
}

/// Signatures recorded for one joined `pub` item.
fn signatures(item: &str) -> Vec<String> {
    if let Some(path) = item.strip_prefix("pub use ") {
        let path = path.split(';').next().unwrap_or(path);
        return expand_use(path)
            .into_iter()
            .map(|name| format!("pub use {name}"))
            .collect();
    }
    let end = item.find(['{', '}', ';']).unwrap_or(item.len());
    vec![item[..end].trim().trim_end_matches(',').to_string()]
}

/// One line per public item: `<relative path>: <signature>`.
fn public_surface() -> String {
    let root = crate_root();
    let mut files = Vec::new();
    collect_sources(&root.join("src"), &mut files);

    let mut lines = Vec::new();
    for file in files {
        let relative = file
            .strip_prefix(&root)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        let source = fs::read_to_string(&file).unwrap();
        let mut rest = source.lines();
        while let Some(line) = rest.next() {
            let line = line.trim();
            if !line.starts_with("pub ") {
                continue;
            }
            for signature in signatures(&join_item(line, &mut rest)) {
                lines.push(format!("{relative}: {signature}"));
            }
        }
    }
    lines.sort();
    lines.join("\n") + "\n"
}

#[test]
fn public_api_matches_snapshot() {
    let path = crate_root().join("api_snapshot.txt");
    let actual = public_surface();

    if std::env::var_os(UPDATE_ENV).is_some() {
        fs::write(&path, &actual).unwrap();
        return;
    }

    let expected = fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("missing {}; run with {UPDATE_ENV}=1", path.display()));
    assert_eq!(expected, actual);
}

// ── Surface extraction ──────────────────────────────────────────

#[test]
fn grouped_reexports_record_every_name() {
    let source = "pub use entity::{\n    ActionRef, SeverityRef,\n};";
    let mut rest = source.lines();
    let first = rest.next().unwrap();

    assert_eq!(
        signatures(&join_item(first, &mut rest)),
        vec!["pub use entity::ActionRef", "pub use entity::SeverityRef"]
    );
}

#[test]
fn dropping_a_reexport_changes_the_surface() {
    let before = signatures("pub use entity::{ActionRef, SeverityRef};");
    let after = signatures("pub use entity::{ActionRef};");

    assert!(before.contains(&"pub use entity::SeverityRef".to_string()));
    assert!(!after.contains(&"pub use entity::SeverityRef".to_string()));
}

#[test]
fn nested_groups_expand_with_their_prefix() {
    assert_eq!(
        expand_use("a::{B, c::{D, E}}"),
        vec!["a::B", "a::c::D", "a::c::E"]
    );
}

#[test]
fn multi_line_signatures_are_joined() {
    let source = "pub fn resolve(\n    slug: &str,\n    strict: bool,\n) -> Option<Ref> {\n";
    let mut rest = source.lines();
    let first = rest.next().unwrap();

    assert_eq!(
        signatures(&join_item(first, &mut rest)),
        vec!["pub fn resolve(slug: &str, strict: bool) -> Option<Ref>"]
    );
}

#[test]
fn field_lines_stop_at_their_comma() {
    let source = "pub name: String,\npub fn next() {";
    let mut rest = source.lines();
    let first = rest.next().unwrap();

    assert_eq!(signatures(&join_item(first, &mut rest)), vec!["pub name: String"]);
    assert_eq!(rest.next(), Some("pub fn next() {"));
}
