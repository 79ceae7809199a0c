use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::GameError;

/// Codes present in `countries.json` that are not playable and get skipped
/// at load time, alongside the `_comment` key.
const EXCLUDED_CODES: &[&str] = &["vi", "cx"];

/// One country: lowercase code, display domain (leading-dot TLD) and alias
/// names. The first alias is the canonical display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Country {
    pub code: String,
    pub domain: String,
    pub names: Vec<String>,
}

impl Country {
    /// Canonical display name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }
}

/// One `(population, country)` occurrence of a city name. Ambiguous
/// real-world city names map to several occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct CityOccurrence {
    pub population: u64,
    pub country_code: String,
}

/// Read-only game data: countries keyed by code (iteration is therefore
/// alphabetical, which the autocomplete ranking relies on), per-country city
/// lists already filtered to positive populations, and derived weights
/// precomputed once at construction.
#[derive(Debug, Default)]
pub struct Dataset {
    countries: BTreeMap<String, Country>,
    cities: HashMap<String, Vec<(String, u64)>>,
    populations: HashMap<String, u64>,
    by_city: HashMap<String, Vec<CityOccurrence>>,
}

impl Dataset {
    /// Loads `countries.json` and the per-country `cities/<code>.json` shards
    /// from `dir`.
    ///
    /// Shards load as a parallel fan-out; a shard that fails to read or parse
    /// is logged and skipped without aborting the rest. `countries.json`
    /// itself is required.
    pub fn load(dir: &Path) -> Result<Self, GameError> {
        let countries_path = dir.join("countries.json");
        let raw = fs::read_to_string(&countries_path).map_err(|source| GameError::Io {
            path: countries_path.clone(),
            source,
        })?;
        let table: BTreeMap<String, Value> =
            serde_json::from_str(&raw).map_err(|source| GameError::Parse {
                path: countries_path.clone(),
                source,
            })?;

        let mut countries = Vec::new();
        for (code, value) in table {
            if code == "_comment" || EXCLUDED_CODES.contains(&code.as_str()) {
                continue;
            }
            let Some(fields) = value.as_array() else {
                warn!(%code, "country record is not an array, skipping");
                continue;
            };
            let mut fields = fields.iter().filter_map(|v| v.as_str().map(str::to_owned));
            let Some(domain) = fields.next() else {
                warn!(%code, "country record has no domain, skipping");
                continue;
            };
            let names: Vec<String> = fields.collect();
            if names.is_empty() {
                warn!(%code, "country record has no names, skipping");
                continue;
            }
            countries.push(Country {
                code,
                domain,
                names,
            });
        }

        let shards: HashMap<String, Vec<(String, u64)>> = countries
            .par_iter()
            .filter_map(|country| {
                let path = dir.join("cities").join(format!("{}.json", country.code));
                match load_shard(&path) {
                    Ok(cities) => Some((country.code.clone(), cities)),
                    Err(error) => {
                        warn!(code = %country.code, %error, "city shard failed to load, skipping");
                        None
                    }
                }
            })
            .collect();

        Self::from_parts(countries, shards)
    }

    /// Builds a dataset from already-parsed pieces: cities with non-positive
    /// population are discarded, countries left without any eligible city are
    /// dropped, and the city-name index and per-country population totals are
    /// precomputed. Errors with [`GameError::EmptyDataset`] when nothing
    /// playable remains.
    pub fn from_parts(
        countries: Vec<Country>,
        mut shards: HashMap<String, Vec<(String, u64)>>,
    ) -> Result<Self, GameError> {
        let mut dataset = Dataset::default();
        for country in countries {
            if country.names.is_empty() {
                warn!(code = %country.code, "country has no display names, dropping");
                continue;
            }
            let cities: Vec<(String, u64)> = shards
                .remove(&country.code)
                .unwrap_or_default()
                .into_iter()
                .filter(|(_, population)| *population > 0)
                .collect();
            if cities.is_empty() {
                debug!(code = %country.code, "no eligible cities, dropping country");
                continue;
            }
            let total: u64 = cities.iter().map(|(_, population)| population).sum();
            for (name, population) in &cities {
                dataset
                    .by_city
                    .entry(name.clone())
                    .or_default()
                    .push(CityOccurrence {
                        population: *population,
                        country_code: country.code.clone(),
                    });
            }
            dataset.populations.insert(country.code.clone(), total);
            dataset.cities.insert(country.code.clone(), cities);
            dataset.countries.insert(country.code.clone(), country);
        }
        if dataset.countries.is_empty() {
            return Err(GameError::EmptyDataset);
        }
        debug!(
            countries = dataset.countries.len(),
            city_names = dataset.by_city.len(),
            "dataset ready"
        );
        Ok(dataset)
    }

    /// Countries in code order.
    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    pub fn country(&self, code: &str) -> Option<&Country> {
        self.countries.get(code)
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    /// The country's cities as `(name, population)` pairs, all positive.
    pub fn cities(&self, code: &str) -> &[(String, u64)] {
        self.cities.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total population across the country's eligible cities.
    pub fn country_population(&self, code: &str) -> u64 {
        self.populations.get(code).copied().unwrap_or(0)
    }

    /// Every `(population, country)` occurrence of a city name.
    pub fn occurrences(&self, city: &str) -> &[CityOccurrence] {
        self.by_city.get(city).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn load_shard(path: &Path) -> Result<Vec<(String, u64)>, GameError> {
    let raw = fs::read_to_string(path).map_err(|source| GameError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| GameError::Parse {
        path: path.to_owned(),
        source,
    })
}
