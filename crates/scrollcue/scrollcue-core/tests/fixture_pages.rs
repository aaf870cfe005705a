mod common;

use common::{visible, Harness};
use scrollcue_core::{
    Config, Page, PageCommand, PageManifest, ParallaxRegistration, ScrollcueError,
};
use scrollcue_test_fixtures::pages;

fn manifest(name: &str) -> PageManifest {
    pages::load(name).unwrap_or_else(|e| panic!("fixture {name}: {e:#}"))
}

#[test]
fn saas_landing_registers_everything() {
    let mut page = Page::default();
    let handles = page.load_manifest(&manifest("saas-landing")).unwrap();
    assert_eq!(handles.reveals, 5);
    assert_eq!(handles.counters, 3);
    assert_eq!(handles.carousels.len(), 1);
    assert!(handles
        .parallax
        .iter()
        .all(|(_, r)| *r == ParallaxRegistration::Active));
}

#[test]
fn coarse_pointer_skips_tilt_only() {
    let mut config = Config::default();
    config.environment.coarse_pointer = true;
    let mut page = Page::new(config);
    let handles = page.load_manifest(&manifest("saas-landing")).unwrap();
    let lookup = |t: &str| {
        handles
            .parallax
            .iter()
            .find(|(target, _)| target == t)
            .map(|(_, r)| *r)
    };
    assert_eq!(lookup("#hero-bg"), Some(ParallaxRegistration::Active));
    assert_eq!(lookup("#hero-card"), Some(ParallaxRegistration::Skipped));
}

#[test]
fn saas_counters_finish_on_formatted_targets() {
    let mut h = Harness::new(Page::default());
    h.page.load_manifest(&manifest("saas-landing")).unwrap();
    h.step(
        0.0,
        vec![
            visible("#stat-users", 1.0),
            visible("#stat-uptime", 1.0),
            visible("#stat-requests", 1.0),
        ],
    );
    h.run_until(2100.0, 16.0);
    assert_eq!(h.dom.text["#stat-users"], "2400+");
    assert_eq!(h.dom.text["#stat-uptime"], "99.9%");
    assert_eq!(h.dom.text["#stat-requests"], "1.2M");
}

#[test]
fn saas_feature_group_is_staggered() {
    let mut h = Harness::new(Page::default());
    h.page.load_manifest(&manifest("saas-landing")).unwrap();
    let all = vec![
        visible("#feature-0", 1.0),
        visible("#feature-1", 1.0),
        visible("#feature-2", 1.0),
    ];
    h.step(0.0, all);
    h.step(99.0, Vec::new());
    assert!(!h.dom.has_class("#feature-0", "visible"));
    h.step(100.0, Vec::new());
    assert!(h.dom.has_class("#feature-0", "visible"));
    assert!(!h.dom.has_class("#feature-1", "visible"));
    h.step(300.0, Vec::new());
    assert!(h.dom.has_class("#feature-2", "visible"));
}

#[test]
fn agency_portfolio_moves_its_track() {
    let mut h = Harness::new(Page::default());
    h.page.load_manifest(&manifest("agency-landing")).unwrap();
    h.step(0.0, Vec::new());
    assert!(h.dom.has_class("#work-0", "current"));
    assert_eq!(h.dom.transforms["#portfolio-track"], "translateX(0%)");

    h.step(4000.0, Vec::new());
    assert!(h.dom.has_class("#work-1", "current"));
    assert!(!h.dom.has_class("#work-0", "current"));
    assert_eq!(h.dom.transforms["#portfolio-track"], "translateX(-100%)");
}

#[test]
fn agency_pointer_parallax_follows_pointer() {
    let mut h = Harness::new(Page::default());
    h.page.load_manifest(&manifest("agency-landing")).unwrap();
    h.step(0.0, Vec::new());
    // no pointer sample yet: pointer-sourced bindings stay untouched
    assert!(!h.dom.transforms.contains_key("#blob"));

    h.step(
        20.0,
        vec![PageCommand::PointerMove { x: 740.0, y: 400.0 }],
    );
    assert_eq!(
        h.dom.transforms["#blob"],
        "translate(5px, 0px) rotate(2deg)"
    );
}

#[test]
fn broken_manifest_reports_empty_carousel() {
    let mut page = Page::default();
    let err = page.load_manifest(&manifest("broken-carousel")).unwrap_err();
    assert!(matches!(err, ScrollcueError::EmptyCarousel { .. }));
    assert!(page.timers().is_empty());
}

#[test]
fn every_fixture_parses_as_a_manifest() {
    for key in pages::keys() {
        let json = pages::json(&key).unwrap();
        PageManifest::from_json(&json).unwrap_or_else(|e| panic!("{key}: {e}"));
    }
}
