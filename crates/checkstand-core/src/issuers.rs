//! Issuer reference table.
//!
//! Static lookup data used to resolve the issuer identification number (IIN)
//! found in an identity record header to a jurisdiction, and to map a
//! jurisdiction name to its two-letter postal abbreviation.
//!
//! The table is compiled in and never mutated. [`IssuerTable::standard`]
//! builds the lookup maps once on first use and hands out a shared
//! `&'static` reference, so any number of threads may read it without
//! synchronization.
//!
//! # Examples
//!
//! ```
//! use checkstand_core::IssuerTable;
//!
//! let table = IssuerTable::standard();
//!
//! let california = table.lookup("636014").unwrap();
//! assert_eq!(california.name, "California");
//! assert_eq!(california.country, "USA");
//!
//! assert_eq!(table.abbreviation_for("California"), Some("CA"));
//! assert!(table.lookup("999999").is_none());
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

/// Issuer identification numbers with jurisdiction name and country.
const ISSUERS: &[(&str, &str, &str)] = &[
    ("604427", "American Samoa", "USA"),
    ("604430", "Northern Mariana Islands", "USA"),
    ("604431", "Puerto Rico", "USA"),
    ("636000", "Virginia", "USA"),
    ("636001", "New York", "USA"),
    ("636002", "Massachusetts", "USA"),
    ("636003", "Maryland", "USA"),
    ("636004", "North Carolina", "USA"),
    ("636005", "South Carolina", "USA"),
    ("636006", "Connecticut", "USA"),
    ("636007", "Louisiana", "USA"),
    ("636008", "Montana", "USA"),
    ("636009", "New Mexico", "USA"),
    ("636010", "Florida", "USA"),
    ("636011", "Delaware", "USA"),
    ("636014", "California", "USA"),
    ("636015", "Texas", "USA"),
    ("636018", "Iowa", "USA"),
    ("636019", "Guam", "USA"),
    ("636020", "Colorado", "USA"),
    ("636021", "Arkansas", "USA"),
    ("636022", "Kansas", "USA"),
    ("636023", "Ohio", "USA"),
    ("636024", "Vermont", "USA"),
    ("636025", "Pennsylvania", "USA"),
    ("636026", "Arizona", "USA"),
    ("636027", "State Dept. (Diplomatic)", "USA"),
    ("636029", "Oregon", "USA"),
    ("636030", "Missouri", "USA"),
    ("636031", "Wisconsin", "USA"),
    ("636032", "Michigan", "USA"),
    ("636033", "Alabama", "USA"),
    ("636034", "North Dakota", "USA"),
    ("636035", "Illinois", "USA"),
    ("636036", "New Jersey", "USA"),
    ("636037", "Indiana", "USA"),
    ("636038", "Minnesota", "USA"),
    ("636039", "New Hampshire", "USA"),
    ("636040", "Utah", "USA"),
    ("636041", "Maine", "USA"),
    ("636042", "South Dakota", "USA"),
    ("636043", "District of Columbia", "USA"),
    ("636045", "Washington", "USA"),
    ("636046", "Kentucky", "USA"),
    ("636047", "Hawaii", "USA"),
    ("636049", "Nevada", "USA"),
    ("636050", "Idaho", "USA"),
    ("636051", "Mississippi", "USA"),
    ("636052", "Rhode Island", "USA"),
    ("636053", "Tennessee", "USA"),
    ("636054", "Nebraska", "USA"),
    ("636055", "Georgia", "USA"),
    ("636058", "Oklahoma", "USA"),
    ("636059", "Alaska", "USA"),
    ("636060", "Wyoming", "USA"),
    ("636061", "West Virginia", "USA"),
    ("636062", "U.S. Virgin Islands", "USA"),
];

/// Jurisdiction name to postal abbreviation.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
    ("Puerto Rico", "PR"),
    ("Guam", "GU"),
    ("U.S. Virgin Islands", "VI"),
    ("American Samoa", "AS"),
    ("Northern Mariana Islands", "MP"),
];

/// Postal abbreviations recognized inside single-line license codes.
///
/// States, the District of Columbia and Puerto Rico. Other territories are
/// left out because their abbreviations collide with common letter pairs.
const US_JURISDICTION_ABBREVIATIONS: [&str; 52] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI", "IA", "ID", "IL",
    "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND", "NE",
    "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA", "PR", "RI", "SC", "SD", "TN", "TX",
    "UT", "VA", "VT", "WA", "WI", "WV", "WY",
];

/// Country value used for United States jurisdictions.
pub const COUNTRY_USA: &str = "USA";

static STANDARD_TABLE: LazyLock<IssuerTable> = LazyLock::new(IssuerTable::build);

/// Jurisdiction resolved from an issuer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Jurisdiction {
    /// Jurisdiction name (e.g., "California").
    pub name: &'static str,

    /// Issuing country (e.g., "USA").
    pub country: &'static str,
}

impl Jurisdiction {
    /// Returns `true` if the jurisdiction belongs to the United States.
    #[must_use]
    pub fn is_us(&self) -> bool {
        self.country == COUNTRY_USA
    }
}

/// Read-only issuer lookup tables.
#[derive(Debug)]
pub struct IssuerTable {
    issuers: HashMap<&'static str, Jurisdiction>,
    abbreviations: HashMap<&'static str, &'static str>,
}

impl IssuerTable {
    /// Shared table built from the compiled-in reference data.
    #[must_use]
    pub fn standard() -> &'static IssuerTable {
        &STANDARD_TABLE
    }

    fn build() -> Self {
        let issuers = ISSUERS
            .iter()
            .map(|&(code, name, country)| (code, Jurisdiction { name, country }))
            .collect();

        let abbreviations = ABBREVIATIONS.iter().copied().collect();

        Self {
            issuers,
            abbreviations,
        }
    }

    /// Resolve an issuer code to its jurisdiction.
    #[must_use]
    pub fn lookup(&self, issuer_code: &str) -> Option<Jurisdiction> {
        self.issuers.get(issuer_code).copied()
    }

    /// Postal abbreviation for a jurisdiction name.
    #[must_use]
    pub fn abbreviation_for(&self, jurisdiction_name: &str) -> Option<&'static str> {
        self.abbreviations.get(jurisdiction_name).copied()
    }

    /// Expected address abbreviation for an issuer code.
    ///
    /// Combines [`lookup`](Self::lookup) and
    /// [`abbreviation_for`](Self::abbreviation_for).
    #[must_use]
    pub fn abbreviation_for_issuer(&self, issuer_code: &str) -> Option<&'static str> {
        self.lookup(issuer_code)
            .and_then(|jurisdiction| self.abbreviation_for(jurisdiction.name))
    }

    /// Number of known issuers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issuers.len()
    }

    /// Returns `true` if the table holds no issuers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}

/// Check whether a two-letter code is a US state, DC or Puerto Rico abbreviation.
///
/// # Examples
///
/// ```
/// use checkstand_core::is_us_jurisdiction_abbreviation;
///
/// assert!(is_us_jurisdiction_abbreviation("TX"));
/// assert!(!is_us_jurisdiction_abbreviation("ZZ"));
/// ```
#[must_use]
pub fn is_us_jurisdiction_abbreviation(code: &str) -> bool {
    US_JURISDICTION_ABBREVIATIONS.contains(&code)
}

/// All abbreviations accepted by [`is_us_jurisdiction_abbreviation`].
#[must_use]
pub fn us_jurisdiction_abbreviations() -> &'static [&'static str] {
    &US_JURISDICTION_ABBREVIATIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_shared() {
        let a = IssuerTable::standard();
        let b = IssuerTable::standard();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.len(), ISSUERS.len());
        assert!(!a.is_empty());
    }

    #[test]
    fn test_issuer_codes_are_unique_and_numeric() {
        let table = IssuerTable::standard();
        assert_eq!(table.len(), ISSUERS.len());
        for (code, _, _) in ISSUERS {
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_lookup_known_issuers() {
        let table = IssuerTable::standard();

        let ny = table.lookup("636001").unwrap();
        assert_eq!(ny.name, "New York");
        assert!(ny.is_us());

        let pr = table.lookup("604431").unwrap();
        assert_eq!(pr.name, "Puerto Rico");
    }

    #[test]
    fn test_every_state_issuer_has_abbreviation() {
        let table = IssuerTable::standard();
        let without: Vec<_> = ISSUERS
            .iter()
            .filter(|(code, _, _)| table.abbreviation_for_issuer(code).is_none())
            .map(|(_, name, _)| *name)
            .collect();

        // Only the diplomatic issuer has no postal abbreviation.
        assert_eq!(without, vec!["State Dept. (Diplomatic)"]);
    }

    #[test]
    fn test_abbreviation_for_issuer() {
        let table = IssuerTable::standard();
        assert_eq!(table.abbreviation_for_issuer("636015"), Some("TX"));
        assert_eq!(table.abbreviation_for_issuer("636062"), Some("VI"));
        assert_eq!(table.abbreviation_for_issuer("123456"), None);
    }

    #[test]
    fn test_us_jurisdiction_abbreviations() {
        assert!(is_us_jurisdiction_abbreviation("DC"));
        assert!(is_us_jurisdiction_abbreviation("PR"));
        assert!(!is_us_jurisdiction_abbreviation("GU"));
        assert!(!is_us_jurisdiction_abbreviation("ca"));
        assert_eq!(us_jurisdiction_abbreviations().len(), 52);
    }

    #[test]
    fn test_table_is_sync() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<IssuerTable>();
    }
}
