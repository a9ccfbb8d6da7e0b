//! The domain files shipped under `docs/domains/` parse and plan.

use std::path::{Path, PathBuf};

use relief_core::domain::{Parameters, parse_domain_toml};
use relief_core::pop::{Planner, SearchConfig, SearchStatus};

fn workspace_root() -> PathBuf {
    // CARGO_MANIFEST_DIR is crates/relief-core; go up two levels.
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn read_domain(name: &str) -> String {
    let path = workspace_root().join("docs/domains").join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

#[test]
fn every_shipped_domain_parses() {
    let dir = workspace_root().join("docs/domains");
    let mut seen = 0;
    for entry in std::fs::read_dir(&dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        let content = std::fs::read_to_string(&path).unwrap();
        let domain = parse_domain_toml(&content)
            .unwrap_or_else(|e| panic!("{} should parse: {e}", path.display()));
        assert!(!domain.all_goals().is_empty());
        seen += 1;
    }
    assert!(seen >= 2, "expected the shipped domain files, found {seen}");
}

#[test]
fn minimal_domain_plans() {
    let domain = parse_domain_toml(&read_domain("minimal.toml")).unwrap();
    assert_eq!(domain.init().name, "start");

    let planner = Planner::new(&domain, Parameters::default(), SearchConfig::default()).unwrap();
    let report = planner.solve(&["sandbags_done"]).unwrap();
    assert_eq!(report.status(), SearchStatus::Solved);
    assert_eq!(report.stats.nodes, 3);
}

#[test]
fn cyclone_warning_goes_out_before_the_grid_is_cut() {
    let domain = parse_domain_toml(&read_domain("cyclone-shelter.toml")).unwrap();
    let params = Parameters::default().or(domain.default_parameters());
    assert_eq!(params.infrastructure_risk, Some(0.7));
    assert_eq!(params.flood_probability, None);

    let planner = Planner::new(&domain, params, SearchConfig::default()).unwrap();
    let report = planner.solve(&["shelter_ready"]).unwrap();
    assert_eq!(report.status(), SearchStatus::Solved);
    assert_eq!(report.stats.nodes, 8);

    let solution = report.solution().unwrap();
    let order: Vec<&str> = solution.linearization.iter().map(|&id| domain.name_of(id)).collect();
    assert_eq!(
        order,
        vec![
            "start",
            "broadcast_warning",
            "cut_grid_power",
            "start_generator",
            "open_shelter",
            "shelter_ready",
        ]
    );
}

#[test]
fn cyclone_low_risk_leaves_grid_goal_unreachable() {
    let domain = parse_domain_toml(&read_domain("cyclone-shelter.toml")).unwrap();
    let planner = Planner::new(&domain, Parameters::new(0.5, 0.3), SearchConfig::default()).unwrap();
    let report = planner.solve(&["shelter_ready"]).unwrap();
    assert_eq!(report.status(), SearchStatus::Exhausted);
    assert_eq!(report.stats.nodes, 5);
}
