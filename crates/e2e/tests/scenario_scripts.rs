//! Generated-script checks for the built-in and bundled scenarios
//!
//! These run without a browser: they verify that every scenario turns into a
//! script whose waits and assertions are all bounded.

use std::path::Path;

use bloglist_e2e::catalog;
use bloglist_e2e::model::SeedUser;
use bloglist_e2e::playwright::{build_script, PlaywrightConfig};
use bloglist_e2e::{Scenario, Step};

fn builtin() -> Vec<Scenario> {
    catalog::builtin(&SeedUser::primary()).expect("build built-in scenarios")
}

fn bundled_specs() -> Vec<Scenario> {
    Scenario::load_all(&Path::new(env!("CARGO_MANIFEST_DIR")).join("specs")).expect("load bundled specs")
}

#[test]
fn every_step_is_reported() {
    let config = PlaywrightConfig::default();

    for scenario in builtin().iter().chain(bundled_specs().iter()) {
        let script = build_script(&config, scenario);
        for i in 0..scenario.steps.len() {
            assert!(
                script.contains(&format!("await step({}, ", i)),
                "step {} of '{}' missing from script",
                i,
                scenario.name
            );
        }
    }
}

#[test]
fn every_wait_and_assertion_is_bounded() {
    let config = PlaywrightConfig::default();

    for scenario in builtin() {
        let script = build_script(&config, &scenario);
        for line in script.lines().filter(|l| l.contains("await expect(") || l.contains(".waitFor(")) {
            assert!(line.contains("timeout: "), "unbounded line in '{}': {}", scenario.name, line);
        }
    }
}

#[test]
fn delete_scenario_accepts_confirmation() {
    let scenario = catalog::owner_can_delete_blog(&SeedUser::primary()).expect("delete scenario");
    let script = build_script(&PlaywrightConfig::default(), &scenario);

    let handler = script.find("page.on('dialog', (dialog) => dialog.accept());").expect("dialog handler");
    let click = script.find(r#"getByRole("button", { name: "remove", exact: false }).click("#).expect("remove click");
    assert!(handler < click);
    assert!(script.contains(r#"hasText: "Removed first title""#));
}

#[test]
fn like_counters_match_exact_counts() {
    let scenario = catalog::blog_can_be_liked(&SeedUser::primary()).expect("like scenario");
    let script = build_script(&PlaywrightConfig::default(), &scenario);

    assert!(script.contains(r#"hasText: new RegExp("^\\s*first title, by first author")"#));
    assert!(script.contains(r#"hasText: new RegExp("\\blikes 2(\\D|$)")"#));
    assert!(!script.contains(r#"toContainText("likes "#));
}

#[test]
fn bundled_specs_parse() {
    let specs = bundled_specs();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].extra_users, vec![SeedUser::secondary()]);
    assert!(matches!(specs[0].steps.last(), Some(Step::ExpectHidden { .. })));
}
