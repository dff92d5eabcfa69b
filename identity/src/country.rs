//! Country canonicalization to ISO 3166-1 alpha-2.

/// ISO alpha-3 codes and common English names seen in provider output, mapped to alpha-2.
/// Keys are uppercase with single spaces.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("USA", "US"),
    ("UNITED STATES", "US"),
    ("UNITED STATES OF AMERICA", "US"),
    ("GBR", "GB"),
    ("UK", "GB"),
    ("UNITED KINGDOM", "GB"),
    ("GREAT BRITAIN", "GB"),
    ("NGA", "NG"),
    ("NIGERIA", "NG"),
    ("GHA", "GH"),
    ("GHANA", "GH"),
    ("KEN", "KE"),
    ("KENYA", "KE"),
    ("ZAF", "ZA"),
    ("SOUTH AFRICA", "ZA"),
    ("CAN", "CA"),
    ("CANADA", "CA"),
    ("DEU", "DE"),
    ("GERMANY", "DE"),
    ("FRA", "FR"),
    ("FRANCE", "FR"),
    ("IND", "IN"),
    ("INDIA", "IN"),
    ("IRL", "IE"),
    ("IRELAND", "IE"),
    ("NLD", "NL"),
    ("NETHERLANDS", "NL"),
    ("ESP", "ES"),
    ("SPAIN", "ES"),
    ("ITA", "IT"),
    ("ITALY", "IT"),
    ("UGA", "UG"),
    ("UGANDA", "UG"),
    ("CMR", "CM"),
    ("CAMEROON", "CM"),
    ("SEN", "SN"),
    ("SENEGAL", "SN"),
    ("PHL", "PH"),
    ("PHILIPPINES", "PH"),
    ("MEX", "MX"),
    ("MEXICO", "MX"),
    ("BRA", "BR"),
    ("BRAZIL", "BR"),
    ("ARE", "AE"),
    ("UNITED ARAB EMIRATES", "AE"),
    ("AUS", "AU"),
    ("AUSTRALIA", "AU"),
];

/// Canonicalize a country to uppercase ISO-2.
///
/// Two-letter alphabetic input is taken as already ISO-2. Anything else must be in
/// the alias table; unknown values return `None` and count as missing.
pub fn normalize_country(raw: &str) -> Option<String> {
    let key = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();
    if key.len() == 2 && key.bytes().all(|b| b.is_ascii_uppercase()) {
        return Some(key);
    }
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, iso2)| (*iso2).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso2_passthrough_uppercased() {
        assert_eq!(normalize_country("ng").as_deref(), Some("NG"));
        assert_eq!(normalize_country(" Gb ").as_deref(), Some("GB"));
    }

    #[test]
    fn aliases_map_to_iso2() {
        assert_eq!(normalize_country("United  Kingdom").as_deref(), Some("GB"));
        assert_eq!(normalize_country("usa").as_deref(), Some("US"));
        assert_eq!(normalize_country("Nigeria").as_deref(), Some("NG"));
    }

    #[test]
    fn unknown_is_none() {
        assert_eq!(normalize_country("Atlantis"), None);
        assert_eq!(normalize_country("N1"), None);
        assert_eq!(normalize_country(""), None);
    }
}
