//! Integration tests for include-aware list loading.

mod support;

use deckhand_core::list::{IncludeContext, ResolvedActionSet, load, load_list};
use support::write_file;
use tempfile::TempDir;

#[test]
fn plain_list_matches_trimmed_lines() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("list.txt");
    write_file(
        &path,
        "# carrier apps\n\n  com.carrier.one  \n\t# indented comment\ncom.carrier.two\n   \n",
    );

    assert_eq!(load_list(&path), vec!["com.carrier.one", "com.carrier.two"]);
}

#[test]
fn mutual_includes_terminate_without_duplicates() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.txt");
    let b = temp.path().join("b.txt");
    write_file(&a, "a.one\n@include b.txt\na.two\n");
    write_file(&b, "b.one\n@include a.txt\nb.two\n");

    assert_eq!(load_list(&a), vec!["a.one", "b.one", "b.two", "a.two"]);
    assert_eq!(load_list(&b), vec!["b.one", "a.one", "a.two", "b.two"]);
}

#[test]
fn nested_directories_resolve_relative_to_including_file() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("lists");
    write_file(&root.join("top.txt"), "@include sub/mid.txt\ntop.pkg\n");
    write_file(&root.join("sub/mid.txt"), "@include ../leaf.txt\nmid.pkg\n");
    write_file(&root.join("leaf.txt"), "leaf.pkg\n");

    assert_eq!(
        load_list(&root.join("top.txt")),
        vec!["leaf.pkg", "mid.pkg", "top.pkg"]
    );
}

#[test]
fn shared_context_spans_several_loads() {
    let temp = TempDir::new().unwrap();
    let common = temp.path().join("common.txt");
    let first = temp.path().join("first.txt");
    let second = temp.path().join("second.txt");
    write_file(&common, "shared.pkg\n");
    write_file(&first, "@include common.txt\nfirst.pkg\n");
    write_file(&second, "@include common.txt\nsecond.pkg\n");

    let mut visited = IncludeContext::new();
    let one = load(&first, &mut visited);
    let two = load(&second, &mut visited);

    assert_eq!(one, vec!["shared.pkg", "first.pkg"]);
    assert_eq!(two, vec!["second.pkg"]);
}

#[test]
fn missing_include_contributes_nothing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("list.txt");
    write_file(&path, "before\n@include nowhere.txt\nafter\n");

    assert_eq!(load_list(&path), vec!["before", "after"]);
}

#[test]
fn duplicates_across_files_are_dropped_after_composition() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("base.txt");
    let extra = temp.path().join("extra.txt");
    write_file(&base, "x\ny\n");
    write_file(&extra, "y\nz\nx\n");

    let set = ResolvedActionSet::from_sequences([load_list(&base), load_list(&extra)]);
    assert_eq!(set.as_slice(), ["x", "y", "z"]);
}
