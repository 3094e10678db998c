//! `slidetool` command integration tests.
//!
//! Tests verify:
//! - `slide open` warns per failing file and keeps going
//! - `slide vendor` output format with one and several files
//! - `prop list` / `prop get` output and exit codes
//! - Commands share the configured tile cache

use std::path::Path;

use clap::Parser;

use fastslide::{Cli, Command, SlideError, SlideTool};

use super::test_utils::{FakeLibrary, FakeSlideSpec, SlideDir, Tracker, FAKE_VERSION};

/// Run `args` and return `(status, stdout, stderr)`.
fn run(library: &FakeLibrary, args: &[&str]) -> (u8, String, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let tool = SlideTool::new(library, cli.cache_size).unwrap();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let status = tool.run(&cli.command, &mut out, &mut err).unwrap();
    (
        status,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// =============================================================================
// slide open
// =============================================================================

#[test]
fn test_open_all_valid() {
    let dir = SlideDir::new();
    let a = dir.file("a.svs");
    let b = dir.file("b.ndpi");
    let library = FakeLibrary::new()
        .with_slide(&a, FakeSlideSpec::aperio())
        .with_slide(&b, FakeSlideSpec::aperio().with_vendor("hamamatsu"));

    let (status, out, err) = run(
        &library,
        &["slidetool", "slide", "open", path_str(&a), path_str(&b)],
    );

    assert_eq!(status, 0);
    assert!(out.is_empty());
    assert!(err.is_empty());
    assert_eq!(Tracker::get(&library.tracker().opens), 2);
    assert_eq!(Tracker::get(&library.tracker().closes), 2);
}

#[test]
fn test_open_reports_each_failure_and_continues() {
    let dir = SlideDir::new();
    let missing = dir.missing("missing.svs");
    let text = dir.file("notes.txt");
    let good = dir.file("good.svs");
    let library = FakeLibrary::new().with_slide(&good, FakeSlideSpec::aperio());

    let (status, _out, err) = run(
        &library,
        &[
            "slidetool",
            "slide",
            "open",
            path_str(&missing),
            path_str(&text),
            path_str(&good),
        ],
    );

    assert_eq!(status, 1);
    let lines: Vec<&str> = err.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("slidetool: "));
    assert!(lines[0].contains("missing.svs"));
    assert!(lines[0].contains("does not exist"));
    assert!(lines[1].contains("Unrecognized file format"));
    assert_eq!(Tracker::get(&library.tracker().opens), 1);
}

#[test]
fn test_open_reports_library_error() {
    let dir = SlideDir::new();
    let path = dir.file("corrupt.svs");
    let library = FakeLibrary::new().with_slide(
        &path,
        FakeSlideSpec::aperio().with_open_error("Can't read JPEG tile"),
    );

    let (status, _out, err) = run(&library, &["slidetool", "slide", "open", path_str(&path)]);

    assert_eq!(status, 1);
    assert_eq!(
        err.trim_end(),
        format!("slidetool: {}: Can't read JPEG tile", path.display())
    );
}

// =============================================================================
// slide vendor
// =============================================================================

#[test]
fn test_vendor_single_file() {
    let dir = SlideDir::new();
    let a = dir.file("a.svs");
    let library = FakeLibrary::new().with_slide(&a, FakeSlideSpec::aperio());

    let (status, out, err) = run(&library, &["slidetool", "slide", "vendor", path_str(&a)]);

    assert_eq!(status, 0);
    assert_eq!(out, "aperio\n");
    assert!(err.is_empty());
}

#[test]
fn test_vendor_multiple_files_with_unknown() {
    let dir = SlideDir::new();
    let a = dir.file("a.svs");
    let b = dir.file("b.unknown");
    let library = FakeLibrary::new().with_slide(&a, FakeSlideSpec::aperio());

    let (status, out, err) = run(
        &library,
        &["slidetool", "slide", "vendor", path_str(&a), path_str(&b)],
    );

    assert_eq!(status, 1);
    assert_eq!(out, format!("{}: aperio\n", a.display()));
    assert_eq!(
        err,
        format!("slidetool: {}: No vendor detected\n", b.display())
    );
}

#[test]
fn test_vendor_does_not_open_slides() {
    let dir = SlideDir::new();
    let a = dir.file("a.svs");
    let library = FakeLibrary::new().with_slide(&a, FakeSlideSpec::aperio());

    run(&library, &["slidetool", "slide", "vendor", path_str(&a)]);
    assert_eq!(Tracker::get(&library.tracker().opens), 0);
}

// =============================================================================
// slide version
// =============================================================================

#[test]
fn test_version() {
    let library = FakeLibrary::new();
    let (status, out, _err) = run(&library, &["slidetool", "slide", "version"]);

    assert_eq!(status, 0);
    assert_eq!(out, format!("{}\n", FAKE_VERSION));
}

// =============================================================================
// prop
// =============================================================================

#[test]
fn test_prop_list_text() {
    let dir = SlideDir::new();
    let a = dir.file("a.svs");
    let library = FakeLibrary::new().with_slide(&a, FakeSlideSpec::aperio());

    let (status, out, _err) = run(&library, &["slidetool", "prop", "list", path_str(&a)]);

    assert_eq!(status, 0);
    assert!(out.contains("openslide.level-count: '3'\n"));
    assert!(out.contains("openslide.comment: ''\n"));
    assert!(out.contains("aperio.AppMag: '20'\n"));

    // Sorted by name.
    let names: Vec<&str> = out.lines().map(|l| l.split(": ").next().unwrap()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn test_prop_list_json_drop_empty() {
    let dir = SlideDir::new();
    let a = dir.file("a.svs");
    let library = FakeLibrary::new().with_slide(&a, FakeSlideSpec::aperio());

    let (status, out, _err) = run(
        &library,
        &["slidetool", "prop", "list", "--json", "--drop-empty", path_str(&a)],
    );

    assert_eq!(status, 0);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["openslide.vendor"], "aperio");
    assert_eq!(value["openslide.level[1].width"], "11500");
    assert!(value.get("openslide.comment").is_none());
}

#[test]
fn test_prop_list_failure() {
    let dir = SlideDir::new();
    let missing = dir.missing("missing.svs");
    let library = FakeLibrary::new();

    let (status, out, err) = run(&library, &["slidetool", "prop", "list", path_str(&missing)]);

    assert_eq!(status, 1);
    assert!(out.is_empty());
    assert!(err.contains("does not exist"));
}

#[test]
fn test_prop_get() {
    let dir = SlideDir::new();
    let a = dir.file("a.svs");
    let library = FakeLibrary::new().with_slide(&a, FakeSlideSpec::aperio());

    let (status, out, err) = run(
        &library,
        &[
            "slidetool",
            "prop",
            "get",
            path_str(&a),
            "openslide.mpp-x",
            "no.such.key",
            "openslide.level-count",
        ],
    );

    assert_eq!(status, 1);
    assert_eq!(out, "0.499\n3\n");
    assert_eq!(err, "slidetool: no.such.key: No such property\n");
}

// =============================================================================
// Cache
// =============================================================================

#[test]
fn test_cache_size_shared_across_files() {
    let dir = SlideDir::new();
    let a = dir.file("a.svs");
    let b = dir.file("b.svs");
    let library = FakeLibrary::new()
        .with_slide(&a, FakeSlideSpec::aperio())
        .with_slide(&b, FakeSlideSpec::aperio());

    let (status, _out, _err) = run(
        &library,
        &[
            "slidetool",
            "--cache-size",
            "8388608",
            "slide",
            "open",
            path_str(&a),
            path_str(&b),
        ],
    );

    assert_eq!(status, 0);
    assert_eq!(Tracker::get(&library.tracker().caches_created), 1);
    assert_eq!(Tracker::get(&library.tracker().caches_attached), 2);
    assert_eq!(Tracker::get(&library.tracker().caches_released), 1);
}

#[test]
fn test_cache_creation_failure() {
    let library = FakeLibrary::new().failing_cache_create();
    let result = SlideTool::new(&library, Some(8 * 1024 * 1024));

    assert!(matches!(result, Err(SlideError::CacheCreation { .. })));
}

#[test]
fn test_no_cache_by_default() {
    let library = FakeLibrary::new();
    let tool = SlideTool::new(&library, None).unwrap();

    assert!(tool.cache().is_none());
    let cli = Cli::try_parse_from(["slidetool", "slide", "version"]).unwrap();
    assert!(matches!(cli.command, Command::Slide(_)));
}
