//! Nation → state → county → ZIP membership, built once and validated.
//!
//! County codes are five-digit FIPS codes whose first two digits are the state code.
//! The New York City aggregate uses the non-numeric code [`NYC_CODE`].

use crate::error::CoreError;
use crate::stats::DataSet;
use std::collections::{BTreeMap, BTreeSet};

pub const NYC_CODE: &str = "36NYC";

#[derive(Debug, Clone, Default)]
pub struct RegionHierarchy {
    state_names: BTreeMap<String, String>,
    counties: BTreeMap<String, BTreeSet<String>>,
    zips: BTreeMap<String, BTreeMap<String, DataSet>>,
}

impl RegionHierarchy {
    /// Build from `(state_code, state_name)` pairs and county codes.
    ///
    /// Fails on malformed codes and on counties whose state is not listed.
    pub fn build<'a>(
        states: impl IntoIterator<Item = (&'a str, &'a str)>,
        counties: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, CoreError> {
        let mut h = RegionHierarchy::default();
        for (code, name) in states {
            if !is_state_code(code) {
                return Err(CoreError::InvalidRegionCode {
                    code: code.to_string(),
                });
            }
            h.state_names.insert(code.to_string(), name.to_string());
            h.counties.entry(code.to_string()).or_default();
        }
        for county in counties {
            let state = state_code_of(county)?;
            let members = h
                .counties
                .get_mut(state)
                .ok_or_else(|| CoreError::OrphanCounty {
                    county: county.to_string(),
                    state: state.to_string(),
                })?;
            members.insert(county.to_string());
        }
        Ok(h)
    }

    /// Attach ZIP-level series to a known county.
    pub fn attach_zips(
        &mut self,
        county: &str,
        zips: BTreeMap<String, DataSet>,
    ) -> Result<(), CoreError> {
        if self.state_of(county).is_none() {
            return Err(CoreError::InvalidRegionCode {
                code: county.to_string(),
            });
        }
        self.zips.insert(county.to_string(), zips);
        Ok(())
    }

    pub fn state_codes(&self) -> impl Iterator<Item = &str> {
        self.state_names.keys().map(String::as_str)
    }

    pub fn state_name(&self, code: &str) -> Option<&str> {
        self.state_names.get(code).map(String::as_str)
    }

    /// Member counties of a state, ordered by code.
    pub fn counties_of(&self, state: &str) -> impl Iterator<Item = &str> {
        self.counties
            .get(state)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn state_of(&self, county: &str) -> Option<&str> {
        let state = state_code_of(county).ok()?;
        self.counties
            .get_key_value(state)
            .filter(|(_, members)| members.contains(county))
            .map(|(k, _)| k.as_str())
    }

    pub fn zips_of(&self, county: &str) -> Option<&BTreeMap<String, DataSet>> {
        self.zips.get(county)
    }

    /// Counties that carry ZIP-level data.
    pub fn counties_with_zips(&self) -> impl Iterator<Item = &str> {
        self.zips.keys().map(String::as_str)
    }
}

/// State code prefix of a county code.
pub fn state_code_of(county: &str) -> Result<&str, CoreError> {
    let valid = county == NYC_CODE
        || (county.len() == 5 && county.bytes().all(|b| b.is_ascii_digit()));
    if !valid {
        return Err(CoreError::InvalidRegionCode {
            code: county.to_string(),
        });
    }
    Ok(&county[..2])
}

fn is_state_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit())
}
