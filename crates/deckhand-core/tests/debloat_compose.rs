//! Integration tests for tier and vendor composition.

mod support;

use deckhand_core::debloat::{DebloatComposer, InvalidTierError, Tier};
use support::{layout, write_file};
use tempfile::TempDir;

fn seed_tiers(layout: &deckhand_core::config::DataLayout) {
    write_file(&layout.tier_list(Tier::Light), "carrier.app1\ncarrier.app2\n");
    write_file(
        &layout.tier_list(Tier::Standard),
        "@include light.txt\nvendor.bloat.app\n",
    );
    write_file(
        &layout.tier_list(Tier::Aggressive),
        "@include standard.txt\nvendor.store\ncarrier.app1\n",
    );
}

#[test]
fn standard_tier_includes_light() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    seed_tiers(&layout);

    let set = DebloatComposer::new(&layout).compose(Tier::Standard, None, false);

    assert_eq!(
        set.as_slice(),
        ["carrier.app1", "carrier.app2", "vendor.bloat.app"]
    );
}

#[test]
fn overlay_and_supplemental_append_in_order() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    seed_tiers(&layout);
    write_file(
        &layout.vendor_overlay("xiaomi"),
        "com.miui.analytics\ncarrier.app2\n",
    );
    write_file(
        &layout.supplemental_list(),
        "com.google.android.gms\ncom.miui.analytics\n",
    );

    let set = DebloatComposer::new(&layout).compose(Tier::Aggressive, Some("Redmi"), true);

    assert_eq!(
        set.as_slice(),
        [
            "carrier.app1",
            "carrier.app2",
            "vendor.bloat.app",
            "vendor.store",
            "com.miui.analytics",
            "com.google.android.gms",
        ]
    );
}

#[test]
fn missing_overlay_and_supplemental_are_ignored() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    seed_tiers(&layout);

    let set = DebloatComposer::new(&layout).compose(Tier::Light, Some("fairphone"), true);

    assert_eq!(set.as_slice(), ["carrier.app1", "carrier.app2"]);
}

#[test]
fn legacy_list_is_used_when_tier_file_is_absent() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    write_file(&layout.legacy_list(), "legacy.one\nlegacy.two\n");

    let set = DebloatComposer::new(&layout).compose(Tier::Standard, None, false);

    assert_eq!(set.as_slice(), ["legacy.one", "legacy.two"]);
}

#[test]
fn nothing_on_disk_yields_empty_set() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());

    let set = DebloatComposer::new(&layout).compose(Tier::Light, None, false);

    assert!(set.is_empty());
}

#[test]
fn unknown_tier_name_is_rejected() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());

    let err = DebloatComposer::new(&layout)
        .compose_named("extreme", None, false)
        .unwrap_err();

    assert_eq!(err, InvalidTierError("extreme".to_string()));
}

#[test]
fn composing_twice_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let layout = layout(temp.path());
    seed_tiers(&layout);
    write_file(&layout.vendor_overlay("samsung"), "com.samsung.bixby\n");

    let composer = DebloatComposer::new(&layout);
    let first = composer.compose(Tier::Aggressive, Some("samsung"), false);
    let second = composer.compose(Tier::Aggressive, Some("samsung"), false);

    assert_eq!(first, second);
}
