//! Tests for descriptor parsing and catalog scanning
//!
//! Covers:
//! - First-occurrence key extraction and group handling
//! - Exec field code stripping
//! - Scan ordering across directories, bounded scans, skipped failures
//! - Slot band geometry

use super::fixtures::{abc_fixture, descriptor, listing_order, write_descriptor};
use crate::catalog::{
    AppCatalog, SlotLayout, application_dirs, parse_descriptor, parse_search_path, scan,
    strip_field_codes,
};
use proptest::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_parse_minimal_descriptor_without_group() {
    let parsed = parse_descriptor("Name=Alpha\nExec=alpha\n").unwrap();
    assert_eq!(parsed.name, "Alpha");
    assert_eq!(parsed.exec, "alpha");
}

#[test]
fn test_parse_first_occurrence_wins() {
    let content = "[Desktop Entry]\nName=First\nName=Second\nExec=one\nExec=two\n";
    let parsed = parse_descriptor(content).unwrap();
    assert_eq!(parsed.name, "First");
    assert_eq!(parsed.exec, "one");
}

#[test]
fn test_parse_ignores_localized_keys_and_actions() {
    let content = "\
[Desktop Entry]
Name[de]=Netzbrowser
Name=Web Browser
Exec=firefox %u

[Desktop Action new-window]
Name=New Window
Exec=firefox --new-window
";
    let parsed = parse_descriptor(content).unwrap();
    assert_eq!(parsed.name, "Web Browser");
    assert_eq!(parsed.exec, "firefox");
}

#[test]
fn test_parse_keys_in_other_group_only() {
    let content = "[Desktop Action x]\nName=Nope\nExec=nope\n";
    assert!(parse_descriptor(content).is_none());
}

#[test]
fn test_parse_trims_whitespace_and_skips_comments() {
    let content = "# comment\n  Name = Spaced Out  \nExec =  spaced --flag \n";
    let parsed = parse_descriptor(content).unwrap();
    assert_eq!(parsed.name, "Spaced Out");
    assert_eq!(parsed.exec, "spaced --flag");
}

#[test]
fn test_parse_missing_name_or_exec() {
    assert!(parse_descriptor("Exec=alpha\n").is_none());
    assert!(parse_descriptor("Name=Alpha\n").is_none());
    assert!(parse_descriptor("Name=\nExec=alpha\n").is_none());
    assert!(parse_descriptor("not a descriptor\n").is_none());
    assert!(parse_descriptor("").is_none());
}

#[test]
fn test_parse_skips_non_applications_and_hidden() {
    assert!(parse_descriptor("Type=Link\nName=Docs\nExec=docs\n").is_none());
    assert!(parse_descriptor("Name=Gone\nExec=gone\nHidden=true\n").is_none());
    assert!(parse_descriptor("Name=Here\nExec=here\nHidden=false\n").is_some());
}

#[test]
fn test_parse_exec_only_field_codes() {
    assert!(parse_descriptor("Name=Codes\nExec=%U\n").is_none());
}

#[test]
fn test_strip_field_codes() {
    assert_eq!(strip_field_codes("gimp %U"), "gimp");
    assert_eq!(strip_field_codes("app %f --x %i %c %k"), "app  --x");
    assert_eq!(strip_field_codes("printf 100%%"), "printf 100%");
    assert_eq!(strip_field_codes("keep %z"), "keep %z");
}

#[test]
fn test_parse_search_path() {
    assert_eq!(
        parse_search_path("/usr/share::/opt/share: "),
        vec![PathBuf::from("/usr/share"), PathBuf::from("/opt/share")]
    );
    assert!(parse_search_path("").is_empty());
}

#[test]
fn test_application_dirs_appends_applications() {
    let dirs = application_dirs(&[PathBuf::from("/usr/share")]);
    assert_eq!(dirs, vec![PathBuf::from("/usr/share/applications")]);
}

#[test]
fn test_scan_fixture_keeps_descriptors_in_listing_order() {
    let temp = TempDir::new().unwrap();
    abc_fixture(temp.path());

    let entries = scan(&[temp.path()], &SlotLayout::default());

    assert_eq!(entries.len(), 2);
    let expected: Vec<&str> = listing_order(temp.path())
        .iter()
        .map(|n| if n == "A.desktop" { "alpha" } else { "beta" })
        .collect();
    let commands: Vec<&str> = entries.iter().map(|e| e.command.as_str()).collect();
    assert_eq!(commands, expected);
    assert!(entries.iter().all(|e| !e.source.ends_with("C.bad")));
}

#[test]
fn test_scan_assigns_slots_by_row_height() {
    let temp = TempDir::new().unwrap();
    abc_fixture(temp.path());

    let entries = scan(&[temp.path()], &SlotLayout::default());

    assert_eq!(entries[0].vertical_slot, 20);
    assert_eq!(entries[1].vertical_slot, 40);
}

#[test]
fn test_scan_directory_order_then_listing_order() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_descriptor(second.path(), "z.desktop", &descriptor("Zed", "zed"));
    write_descriptor(first.path(), "y.desktop", &descriptor("Why", "why"));

    let entries = scan(&[first.path(), second.path()], &SlotLayout::default());

    let names: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(names, vec!["Why", "Zed"]);
}

#[test]
fn test_scan_does_not_deduplicate_across_dirs() {
    let usr = TempDir::new().unwrap();
    let local = TempDir::new().unwrap();
    write_descriptor(usr.path(), "term.desktop", &descriptor("Terminal", "xterm"));
    write_descriptor(local.path(), "term.desktop", &descriptor("Terminal", "xterm"));

    let entries = scan(&[usr.path(), local.path()], &SlotLayout::default());

    assert_eq!(entries.len(), 2);
    assert_ne!(entries[0].vertical_slot, entries[1].vertical_slot);
}

#[test]
fn test_scan_skips_missing_and_unreadable_dirs() {
    let temp = TempDir::new().unwrap();
    let apps = temp.path().join("apps");
    write_descriptor(&apps, "a.desktop", &descriptor("Alpha", "alpha"));
    let not_a_dir = write_descriptor(temp.path(), "plain-file", "x");
    let missing = temp.path().join("missing");

    let entries = scan(&[missing, not_a_dir, apps], &SlotLayout::default());

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].display_name, "Alpha");
    assert_eq!(entries[0].vertical_slot, 20);
}

#[test]
fn test_scan_skips_descriptor_named_directory() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("weird.desktop")).unwrap();
    write_descriptor(temp.path(), "ok.desktop", &descriptor("Ok", "ok"));

    let entries = scan(&[temp.path()], &SlotLayout::default());

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].display_name, "Ok");
}

#[test]
fn test_scan_requires_suffix_at_end() {
    let temp = TempDir::new().unwrap();
    write_descriptor(temp.path(), "a.desktop.bak", &descriptor("Backup", "bak"));

    assert!(scan(&[temp.path()], &SlotLayout::default()).is_empty());
}

#[test]
fn test_scan_is_bounded_by_popup_height() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    for i in 0..30 {
        write_descriptor(
            first.path(),
            &format!("app{i}.desktop"),
            &descriptor(&format!("App {i}"), "true"),
        );
    }
    write_descriptor(second.path(), "late.desktop", &descriptor("Late", "late"));

    let entries = scan(&[first.path(), second.path()], &SlotLayout::default());

    // Slots 20..=360 fit in a 400px popup with 20px rows
    assert_eq!(entries.len(), 18);
    assert_eq!(entries.last().unwrap().vertical_slot, 360);
    assert!(entries.iter().all(|e| e.display_name != "Late"));
}

#[test]
fn test_catalog_uses_its_dirs_and_layout() {
    let temp = TempDir::new().unwrap();
    abc_fixture(temp.path());
    let layout = SlotLayout {
        first_slot: 15,
        row_height: 30,
        content_height: 200,
        band_margin: 5,
    };
    let catalog = AppCatalog::with_layout(vec![temp.path().to_path_buf()], layout);

    let entries = catalog.scan();

    let mut slots: Vec<i16> = entries.iter().map(|e| e.vertical_slot).collect();
    slots.sort_unstable();
    assert_eq!(slots, vec![15, 45]);
    assert_eq!(catalog.layout(), &layout);
    assert_eq!(catalog.dirs(), &[temp.path().to_path_buf()]);
}

#[test]
fn test_default_band_geometry() {
    let layout = SlotLayout::default();
    let band = layout.band(20);
    assert_eq!((band.start, band.end), (5, 25));
    assert!(band.contains(5));
    assert!(band.contains(24));
    assert!(!band.contains(25));
    assert!(!band.contains(4));
}

proptest! {
    #[test]
    fn prop_consecutive_bands_never_overlap(
        first_slot in 0i16..100,
        row_height in 1i16..60,
        margin_seed in 0i16..60,
        rows in 1usize..40,
    ) {
        let layout = SlotLayout {
            first_slot,
            row_height,
            content_height: i16::MAX,
            band_margin: margin_seed % row_height,
        };
        let slots: Vec<i16> = (0..rows)
            .map(|i| first_slot + row_height * i16::try_from(i).unwrap())
            .collect();

        for pair in slots.windows(2) {
            let current = layout.band(pair[0]);
            let next = layout.band(pair[1]);
            prop_assert!(current.end <= next.start);
            prop_assert!(current.start < current.end);
        }
    }
}
