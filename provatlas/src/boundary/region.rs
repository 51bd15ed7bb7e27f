//! Region assignment helpers for geographic coordinates.
//!
//! Suggests a continent grouping for a country from its centroid. These are
//! suggestions only; dataset authors can override the region in the written
//! boundary file.

/// Continent region used in `gameMetadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Africa: lat -35 to 37, lon -18 to 52
    Africa,
    /// Antarctica: lat -90 to -60, lon -180 to 180
    Antarctica,
    /// Asia: lat 0 to 80, lon 52 to 180 or -180 to -170
    Asia,
    /// Australia/Oceania: lat -50 to 0, lon 110 to 180
    Australia,
    /// Europe: lat 35 to 72, lon -25 to 52
    Europe,
    /// North America: lat 15 to 85, lon -170 to -50
    NorthAmerica,
    /// South America: lat -60 to 15, lon -90 to -30
    SouthAmerica,
}

impl Region {
    /// Lowercase region code stored in boundary files.
    pub fn code(&self) -> &'static str {
        match self {
            Region::Africa => "afr",
            Region::Antarctica => "ant",
            Region::Asia => "asia",
            Region::Australia => "aus",
            Region::Europe => "eur",
            Region::NorthAmerica => "na",
            Region::SouthAmerica => "sa",
        }
    }

    /// Full region name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::Antarctica => "Antarctica",
            Region::Asia => "Asia",
            Region::Australia => "Australia",
            Region::Europe => "Europe",
            Region::NorthAmerica => "North America",
            Region::SouthAmerica => "South America",
        }
    }
}

/// Suggest regions for a single coordinate.
///
/// Returns all regions the coordinate could belong to (may be multiple due
/// to overlapping boundaries, or empty in ocean/uncovered areas).
pub fn suggest_region(lat: f64, lon: f64) -> Vec<Region> {
    let mut regions = Vec::new();

    // Antarctica (check first, no longitude restriction)
    if (-90.0..-60.0).contains(&lat) {
        regions.push(Region::Antarctica);
    }

    // Africa
    if (-35.0..=37.0).contains(&lat) && (-18.0..=52.0).contains(&lon) {
        regions.push(Region::Africa);
    }

    // Asia (wraps around the dateline)
    if (0.0..=80.0).contains(&lat)
        && ((52.0..=180.0).contains(&lon) || (-180.0..=-170.0).contains(&lon))
    {
        regions.push(Region::Asia);
    }

    // Australia/Oceania
    if (-50.0..=0.0).contains(&lat) && (110.0..=180.0).contains(&lon) {
        regions.push(Region::Australia);
    }

    // Europe
    if (35.0..=72.0).contains(&lat) && (-25.0..=52.0).contains(&lon) {
        regions.push(Region::Europe);
    }

    // North America
    if (15.0..=85.0).contains(&lat) && (-170.0..=-50.0).contains(&lon) {
        regions.push(Region::NorthAmerica);
    }

    // South America
    if (-60.0..=15.0).contains(&lat) && (-90.0..=-30.0).contains(&lon) {
        regions.push(Region::SouthAmerica);
    }

    regions
}

/// Pick the single region recorded in `gameMetadata`.
///
/// On overlaps the first match in [`suggest_region`] order wins; `None`
/// means the centroid sits in ocean or uncovered area.
pub fn primary_region(lat: f64, lon: f64) -> Option<Region> {
    suggest_region(lat, lon).into_iter().next()
}
