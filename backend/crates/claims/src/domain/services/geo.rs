//! District lookup for free-text location areas

use serde::Serialize;
use std::fmt;

/// Administrative district of Kigali
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum District {
    Gasabo,
    Kicukiro,
    Nyarugenge,
}

/// Known sector / neighbourhood names per district, lowercase
///
/// The city name spans every district and is not listed.
const DISTRICT_AREAS: [(District, &[&str]); 3] = [
    (
        District::Gasabo,
        &[
            "bumbogo", "gatsata", "gikomero", "gisozi", "jabana", "jali", "kacyiru",
            "kimihurura", "kimironko", "kinyinya", "ndera", "nduba", "remera", "rusororo",
            "rutunga",
        ],
    ),
    (
        District::Kicukiro,
        &[
            "gahanga", "gatenga", "gikondo", "kagarama", "kanombe", "kicukiro", "kigarama",
            "masaka", "niboye", "nyarugunga",
        ],
    ),
    (
        District::Nyarugenge,
        &[
            "gitega", "kanyinya", "kimisagara", "mageragere", "muhima", "nyakabanda",
            "nyamirambo", "nyarugenge", "rwezamenyo",
        ],
    ),
];

impl District {
    pub const ALL: [District; 3] = [District::Gasabo, District::Kicukiro, District::Nyarugenge];

    pub const fn name(&self) -> &'static str {
        match self {
            District::Gasabo => "Gasabo",
            District::Kicukiro => "Kicukiro",
            District::Nyarugenge => "Nyarugenge",
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        if let Some(district) = Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
        {
            return Some(district);
        }
        DISTRICT_AREAS
            .iter()
            .find(|(_, areas)| areas.contains(&name))
            .map(|(district, _)| *district)
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a free-text area to its district
///
/// The whole string is tried first, then each word in order, so
/// "Kimironko market" still resolves. Unknown areas give `None`.
pub fn resolve_district(area: &str) -> Option<District> {
    let normalized = area.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    District::lookup(&normalized).or_else(|| {
        normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .find_map(District::lookup)
    })
}

/// Both areas resolve to the same known district
pub fn same_district(a: &str, b: &str) -> Option<District> {
    match (resolve_district(a), resolve_district(b)) {
        (Some(x), Some(y)) if x == y => Some(x),
        _ => None,
    }
}
