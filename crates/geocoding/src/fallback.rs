//! Approximate coordinates for well-known Brazilian cities.

use crate::resolver::GeocodeResult;

/// `(name, latitude, longitude)`.
pub const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("São Paulo", -23.5505, -46.6333),
    ("Rio de Janeiro", -22.9068, -43.1729),
    ("Belo Horizonte", -19.9167, -43.9345),
    ("Brasília", -15.7939, -47.8828),
    ("Salvador", -12.9714, -38.5014),
    ("Fortaleza", -3.7172, -38.5433),
    ("Curitiba", -25.4284, -49.2733),
    ("Manaus", -3.1190, -60.0217),
    ("Recife", -8.0476, -34.8770),
    ("Porto Alegre", -30.0346, -51.2177),
    ("Belém", -1.4558, -48.4902),
    ("Goiânia", -16.6869, -49.2648),
    ("Guarulhos", -23.4538, -46.5333),
    ("Campinas", -22.9099, -47.0626),
    ("São Luís", -2.5307, -44.3068),
    ("Maceió", -9.6498, -35.7089),
    ("Natal", -5.7945, -35.2110),
    ("Florianópolis", -27.5954, -48.5480),
    ("Vitória", -20.3155, -40.3128),
    ("João Pessoa", -7.1195, -34.8450),
    ("Cuiabá", -15.6014, -56.0979),
    ("Campo Grande", -20.4697, -54.6201),
];

/// Find a known city mentioned in `address` (case- and accent-insensitive).
///
/// When several names match, the longest one wins.
pub fn fallback_for(address: &str) -> Option<GeocodeResult> {
    let haystack = normalize(address);
    CITY_COORDINATES
        .iter()
        .filter(|(name, _, _)| haystack.contains(&normalize(name)))
        .max_by_key(|(name, _, _)| name.len())
        .map(|(name, lat, lon)| GeocodeResult {
            latitude: *lat,
            longitude: *lon,
            display_name: format!("{name}, Brasil"),
        })
}

fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_without_accents() {
        let hit = fallback_for("Av. Beira Mar, Florianopolis - SC").unwrap();
        assert_eq!(hit.display_name, "Florianópolis, Brasil");
    }

    #[test]
    fn unknown_city_has_no_fallback() {
        assert!(fallback_for("Fazenda Boa Vista, interior").is_none());
    }

    #[test]
    fn table_has_about_twenty_cities() {
        assert!(CITY_COORDINATES.len() >= 20);
    }
}
