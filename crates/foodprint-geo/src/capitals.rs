//! Curated capital-city coordinates for common produce origins and destinations.

use foodprint_core::Coordinates;

/// Country (or alias) → capital city coordinates. Keys are lowercase.
const CAPITALS: &[(&str, f64, f64)] = &[
    ("spain", 40.4168, -3.7038),
    ("portugal", 38.7223, -9.1393),
    ("france", 48.8566, 2.3522),
    ("italy", 41.9028, 12.4964),
    ("germany", 52.5200, 13.4050),
    ("netherlands", 52.3676, 4.9041),
    ("belgium", 50.8503, 4.3517),
    ("united kingdom", 51.5074, -0.1278),
    ("uk", 51.5074, -0.1278),
    ("ireland", 53.3498, -6.2603),
    ("poland", 52.2297, 21.0122),
    ("greece", 37.9838, 23.7275),
    ("turkey", 39.9334, 32.8597),
    ("morocco", 34.0209, -6.8416),
    ("egypt", 30.0444, 31.2357),
    ("kenya", -1.2921, 36.8219),
    ("south africa", -25.7479, 28.2293),
    ("israel", 31.7683, 35.2137),
    ("india", 28.6139, 77.2090),
    ("china", 39.9042, 116.4074),
    ("japan", 35.6762, 139.6503),
    ("thailand", 13.7563, 100.5018),
    ("vietnam", 21.0278, 105.8342),
    ("australia", -35.2809, 149.1300),
    ("new zealand", -41.2865, 174.7762),
    ("united states", 38.9072, -77.0369),
    ("usa", 38.9072, -77.0369),
    ("canada", 45.4215, -75.6972),
    ("mexico", 19.4326, -99.1332),
    ("guatemala", 14.6349, -90.5069),
    ("costa rica", 9.9281, -84.0907),
    ("colombia", 4.7110, -74.0721),
    ("ecuador", -0.1807, -78.4678),
    ("peru", -12.0464, -77.0428),
    ("brazil", -15.7975, -47.8919),
    ("chile", -33.4489, -70.6693),
    ("argentina", -34.6037, -58.3816),
    ("uruguay", -34.9011, -56.1645),
];

/// Look up a place in the capital cache.
///
/// Matches case-insensitively. A key hits when its words appear as whole
/// words in the place (`"Valencia, Spain"` hits `spain`, `"Indiana"` does not
/// hit `india`), or when a place of four or more characters is part of a
/// longer key (`"zealand"` hits `new zealand`). When several keys match, the
/// longest wins.
#[must_use]
pub fn lookup_capital(place: &str) -> Option<Coordinates> {
    let needle = place.trim().to_lowercase();
    if needle.len() < 3 {
        return None;
    }

    CAPITALS
        .iter()
        .filter(|(key, _, _)| matches_key(&needle, key))
        .max_by_key(|(key, _, _)| key.len())
        .map(|&(_, lat, lng)| Coordinates { lat, lng })
}

fn matches_key(needle: &str, key: &str) -> bool {
    let words: Vec<&str> = needle
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if format!(" {} ", words.join(" ")).contains(&format!(" {key} ")) {
        return true;
    }
    key.len() > 3 && needle.len() > 3 && key.contains(needle)
}
