use chrono::NaiveDate;
use covmap::config::ReportConfig;
use covmap::ingest::{CountyTable, StateTable};
use covmap::models::RegionShape;
use covmap::report::{ReportInputs, apply_latest_totals, build_hierarchy, build_report};
use covmap::color::{NEUTRAL_GRAY, RED};
use covmap::{DataSet, Observation};
use std::collections::BTreeMap;
use tempfile::tempdir;

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 4, n).unwrap()
}

fn series(cases: &[u64]) -> DataSet {
    let obs: Vec<Observation> = cases
        .iter()
        .enumerate()
        .map(|(i, &c)| Observation::new(day(i as u32 + 1), c, c / 10))
        .collect();
    DataSet::from_observations(&obs, false)
}

fn square(key: &str, x: f64, y: f64) -> RegionShape {
    RegionShape::new(
        key,
        vec![vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)]],
    )
}

fn inputs() -> ReportInputs {
    let mut states = StateTable::default();
    for (name, code, cases) in [("Florida", "12", [10, 20, 30]), ("Georgia", "13", [5, 6, 7])] {
        states.order.push(name.to_string());
        states.fips.insert(name.to_string(), code.to_string());
        states.data.insert(name.to_string(), series(&cases));
    }
    let mut counties = CountyTable::default();
    for (code, cases) in [("12086", [8, 15, 22]), ("12011", [2, 5, 8])] {
        counties.order.push(code.to_string());
        counties.states.insert(code.to_string(), "Florida".to_string());
        counties.data.insert(code.to_string(), series(&cases));
    }
    let zips = BTreeMap::from([(
        "12086".to_string(),
        BTreeMap::from([("33101".to_string(), series(&[1, 4]))]),
    )]);
    ReportInputs {
        national: series(&[15, 26, 37]),
        states,
        counties,
        zips,
        state_shapes: vec![square("Florida", 0.0, 0.0), square("Georgia", 0.0, 1.0)],
        county_shapes: vec![
            square("12086", 0.0, 0.0),
            square("12011", 1.0, 0.0),
            square("99001", 5.0, 5.0),
        ],
        zip_shapes: BTreeMap::from([(
            "12086".to_string(),
            vec![square("33101", 0.0, 0.0), square("33102", 1.0, 0.0)],
        )]),
    }
}

#[test]
fn hierarchy_drops_counties_without_a_state() {
    let h = build_hierarchy(&inputs()).unwrap();
    assert_eq!(h.counties_of("12").collect::<Vec<_>>(), ["12011", "12086"]);
    assert_eq!(h.state_of("99001"), None);
    assert_eq!(h.counties_with_zips().collect::<Vec<_>>(), ["12086"]);
}

#[test]
fn report_writes_every_output() {
    let dir = tempdir().unwrap();
    let outcome = build_report(&inputs(), &ReportConfig::default(), dir.path()).unwrap();

    for name in [
        "heatmap.png",
        "us.svg",
        "state-Florida.svg",
        "county-12086-zip.svg",
        "summary.json",
        "charts.json",
        "us-series.csv",
    ] {
        assert!(dir.path().join(name).exists(), "missing {name}");
    }
    // Georgia has no county data, so it gets no state map.
    assert!(!dir.path().join("state-Georgia.svg").exists());
    assert_eq!(outcome.files.len(), 7);

    let us = outcome.maps.iter().find(|m| m.file == "us.svg").unwrap();
    assert_eq!((us.regions, us.max_value), (2, 20));

    let nation = std::fs::read_to_string(dir.path().join("us.svg")).unwrap();
    assert!(nation.contains("document.location.href = 'Florida.html';"));
    assert!(nation.contains("showTooltip(evt, 'state_tooltip_Georgia');"));

    let state = std::fs::read_to_string(dir.path().join("state-Florida.svg")).unwrap();
    assert!(state.contains("county-12086.html"));
    assert_eq!(state.matches("<polygon").count(), 2);

    let zip = std::fs::read_to_string(dir.path().join("county-12086-zip.svg")).unwrap();
    assert!(zip.contains("'#zip33101'"));
}

#[test]
fn zip_maps_draw_every_zip_boundary() {
    let dir = tempdir().unwrap();
    let outcome = build_report(&inputs(), &ReportConfig::default(), dir.path()).unwrap();

    let zip = std::fs::read_to_string(dir.path().join("county-12086-zip.svg")).unwrap();
    assert_eq!(zip.matches("<polygon").count(), 2);
    // 33102 has no data: drawn gray, without hooks.
    assert_eq!(zip.matches(&format!("fill=\"{RED}\"")).count(), 1);
    assert_eq!(zip.matches(&format!("fill=\"{NEUTRAL_GRAY}\"")).count(), 1);
    assert!(!zip.contains("zip33102"));

    let summary = outcome
        .maps
        .iter()
        .find(|m| m.file == "county-12086-zip.svg")
        .unwrap();
    assert_eq!((summary.regions, summary.max_value), (2, 3));
}

#[test]
fn zip_boundaries_grouped_by_county_name() {
    let mut inp = inputs();
    inp.counties
        .names
        .insert("12086".to_string(), "Miami-Dade".to_string());
    let shapes = inp.zip_shapes.remove("12086").unwrap();
    inp.zip_shapes.insert("Miami-Dade".to_string(), shapes);

    let dir = tempdir().unwrap();
    build_report(&inp, &ReportConfig::default(), dir.path()).unwrap();
    let zip = std::fs::read_to_string(dir.path().join("county-12086-zip.svg")).unwrap();
    assert_eq!(zip.matches("<polygon").count(), 2);
}

#[test]
fn map_maximum_ignores_regions_without_geometry() {
    let mut states = StateTable::default();
    for (name, code, cases) in [("New York", "36", [0, 410]), ("Texas", "48", [0, 5000])] {
        states.order.push(name.to_string());
        states.fips.insert(name.to_string(), code.to_string());
        states.data.insert(name.to_string(), series(&cases));
    }
    let mut counties = CountyTable::default();
    // The city aggregate has the largest counts but no boundary.
    for (code, cases) in [("36061", [0, 10]), ("36NYC", [0, 400])] {
        counties.order.push(code.to_string());
        counties.states.insert(code.to_string(), "New York".to_string());
        counties.data.insert(code.to_string(), series(&cases));
    }
    let inp = ReportInputs {
        national: series(&[0, 5410]),
        states,
        counties,
        // Texas has data but no boundary.
        state_shapes: vec![square("New York", 0.0, 0.0)],
        // 36001 has a boundary but no data.
        county_shapes: vec![square("36061", 0.0, 0.0), square("36001", 1.0, 0.0)],
        ..ReportInputs::default()
    };

    let dir = tempdir().unwrap();
    let outcome = build_report(&inp, &ReportConfig::default(), dir.path()).unwrap();

    let us = outcome.maps.iter().find(|m| m.file == "us.svg").unwrap();
    assert_eq!((us.regions, us.max_value), (1, 410));

    let ny = outcome
        .maps
        .iter()
        .find(|m| m.file == "state-New_York.svg")
        .unwrap();
    assert_eq!((ny.regions, ny.max_value), (2, 10));

    let svg = std::fs::read_to_string(dir.path().join("state-New_York.svg")).unwrap();
    assert_eq!(svg.matches("<polygon").count(), 2);
    assert!(svg.contains(&format!("fill=\"{RED}\"")));
    assert!(svg.contains(&format!("fill=\"{NEUTRAL_GRAY}\"")));
    assert!(svg.contains("county-36061.html"));
    assert!(!svg.contains("36001.html"));
    assert!(!svg.contains("36NYC"));
}

#[test]
fn summaries_and_charts_follow_ranking() {
    let dir = tempdir().unwrap();
    build_report(&inputs(), &ReportConfig::default(), dir.path()).unwrap();

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary[0]["name"], "Florida");
    assert_eq!(summary[1]["name"], "Georgia");

    let charts: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("charts.json")).unwrap())
            .unwrap();
    assert_eq!(charts[0]["key"], "us");
    assert_eq!(charts[1]["key"], "Florida");
    assert_eq!(charts[0]["cases"]["values"][0], 15);
}

#[test]
fn latest_totals_fold_into_state_and_counties() {
    let mut inp = inputs();
    let latest = BTreeMap::from([
        ("12086".to_string(), Observation::new(day(4), 25, 3)),
        ("12011".to_string(), Observation::new(day(4), 10, 1)),
    ]);
    assert!(apply_latest_totals(
        &mut inp.states,
        &mut inp.counties,
        "Florida",
        &latest
    ));
    let fl = &inp.states.data["Florida"];
    assert_eq!((fl.case_total(), fl.death_total(), fl.len()), (35, 4, 4));
    assert_eq!(fl.cases_today(), 5);
    assert_eq!(inp.counties.data["12011"].case_total(), 10);

    // Already applied: nothing changes.
    assert!(!apply_latest_totals(
        &mut inp.states,
        &mut inp.counties,
        "Florida",
        &latest
    ));
    assert!(!apply_latest_totals(
        &mut inp.states,
        &mut inp.counties,
        "Atlantis",
        &latest
    ));
}
