use covmap::hierarchy::NYC_CODE;
use covmap::ingest::{
    ShapeKey, read_counties, read_latest_totals, read_national, read_shapes, read_states,
    read_zip_cases,
};
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let p = dir.path().join(name);
    fs::write(&p, body).unwrap();
    p
}

#[test]
fn national_rows_are_sorted_by_date() {
    let dir = tempdir().unwrap();
    let p = write(
        &dir,
        "us.csv",
        "date,cases,deaths\n2020-04-02,15,1\n2020-04-01,10,0\n",
    );
    let data = read_national(&p).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.case_total(), 15);
    assert_eq!(data.cases_today(), 5);
    assert!(!data.late_start());
}

#[test]
fn states_keep_first_seen_order_and_fips() {
    let dir = tempdir().unwrap();
    let p = write(
        &dir,
        "states.csv",
        "date,state,fips,cases,deaths\n\
         2020-04-01,Washington,53,100,5\n\
         2020-04-01,Florida,12,50,1\n\
         2020-04-02,Washington,53,130,6\n\
         2020-04-02,Florida,12,80,2\n",
    );
    let t = read_states(&p).unwrap();
    assert_eq!(t.order, ["Washington", "Florida"]);
    assert_eq!(t.fips["Florida"], "12");
    assert_eq!(t.data["Florida"].cases_today(), 30);
    assert_eq!(t.data["Washington"].deaths_today(), 1);
}

#[test]
fn counties_map_new_york_city_and_skip_unknown() {
    let dir = tempdir().unwrap();
    let p = write(
        &dir,
        "counties.csv",
        "date,county,state,fips,cases,deaths\n\
         2020-04-01,New York City,New York,,500,20\n\
         2020-04-01,Unknown,New York,,7,\n\
         2020-04-01,Albany,New York,36001,12,\n",
    );
    let t = read_counties(&p).unwrap();
    assert_eq!(t.order, [NYC_CODE, "36001"]);
    assert_eq!(t.names[NYC_CODE], "New York City");
    assert_eq!(t.states["36001"], "New York");
    assert_eq!(t.data["36001"].death_total(), 0);
}

#[test]
fn zip_series_are_late_start() {
    let dir = tempdir().unwrap();
    let p = write(
        &dir,
        "zips.csv",
        "date,fips,zip,cases\n\
         2020-04-01,12086,33101,40\n\
         2020-04-02,12086,33101,45\n\
         2020-04-02,12086,33102,\n",
    );
    let t = read_zip_cases(&p).unwrap();
    let miami = &t["12086"];
    assert!(miami["33101"].late_start());
    assert_eq!(miami["33101"].points()[0].case_increase, None);
    assert_eq!(miami["33101"].cases_today(), 5);
    assert_eq!(miami["33102"].case_total(), 0);
}

#[test]
fn latest_totals_keyed_by_county() {
    let dir = tempdir().unwrap();
    let p = write(
        &dir,
        "latest.csv",
        "date,fips,cases,deaths\n2020-04-03,12086,90,3\n2020-04-03,12011,40,1\n",
    );
    let latest = read_latest_totals(&p).unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest["12011"].cases, 40);
}

#[test]
fn malformed_rows_name_the_file() {
    let dir = tempdir().unwrap();
    let p = write(&dir, "bad.csv", "date,cases,deaths\nnot-a-date,1,1\n");
    let err = read_national(&p).unwrap_err();
    assert!(format!("{err:#}").contains("row 2"));
}

#[test]
fn shapes_keyed_by_property() {
    let dir = tempdir().unwrap();
    let p = write(
        &dir,
        "states.json",
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"NAME":"Florida"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,1],[0,0]]]}},
            {"type":"Feature","properties":{"NAME":"Nowhere"},"geometry":null}
        ]}"#,
    );
    let shapes = read_shapes(&p, &ShapeKey::Property("NAME".into())).unwrap();
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].key, "Florida");
    assert_eq!(shapes[0].rings[0].len(), 4);
}
