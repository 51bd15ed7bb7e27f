//! Deterministic starting economic stats.
//!
//! The game needs starting numbers for every country, but the pipeline has
//! no business shipping randomness: rebuilding the dataset must produce the
//! same world. Stats are therefore derived from the country code (hashed)
//! and the country's polygon area, so they are stable run-to-run and still
//! vary country-to-country.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::StartingStats;

/// Baseline population per square degree of territory.
const POPULATION_DENSITY: f64 = 2_500_000.0;

/// Minimum starting population regardless of area.
const MIN_POPULATION: f64 = 250_000.0;

/// Derive starting stats for a country.
///
/// # Arguments
///
/// * `country` - Country code used to seed per-country variation
/// * `area_sq_deg` - Planar polygon area in square degrees
pub fn derive_stats(country: &str, area_sq_deg: f64) -> StartingStats {
    let mut hasher = DefaultHasher::new();
    country.hash(&mut hasher);
    let seed = hasher.finish();

    // Per-country multiplier in [0.75, 1.25)
    let jitter = 0.75 + (seed % 10_000) as f64 / 20_000.0;

    let population = (area_sq_deg.max(0.0) * POPULATION_DENSITY * jitter).max(MIN_POPULATION) as u64;

    // GDP per capita in [2000, 32000)
    let gdp_per_capita = 2_000 + (seed >> 16) % 30_000;
    let gdp = population.saturating_mul(gdp_per_capita);

    // Stability in [0.35, 0.85)
    let stability = 0.35 + ((seed >> 32) % 1_000) as f64 / 2_000.0;

    StartingStats {
        population,
        gdp,
        stability,
    }
}
