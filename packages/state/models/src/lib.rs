#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The fixed set of U.S. state codes shared by every dataset.
//!
//! Both input files identify states by two-letter postal abbreviation. All
//! code is parsed exactly once, at ingestion, through [`UsState::from_code`],
//! which also rewrites deprecated abbreviations to their current form. Any
//! code outside the 50 states (territories, `DC`, federal agencies) is
//! rejected with an [`UnknownStateError`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Deprecated abbreviations and the codes that replaced them.
///
/// `NB` was the Nebraska abbreviation until 1969 and still shows up in
/// older agency submissions.
pub const DEPRECATED_CODES: &[(&str, UsState)] = &[("NB", UsState::Nebraska)];

/// One of the 50 U.S. states.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum UsState {
    /// Alabama
    #[strum(serialize = "AL")]
    Alabama,
    /// Alaska
    #[strum(serialize = "AK")]
    Alaska,
    /// Arizona
    #[strum(serialize = "AZ")]
    Arizona,
    /// Arkansas
    #[strum(serialize = "AR")]
    Arkansas,
    /// California
    #[strum(serialize = "CA")]
    California,
    /// Colorado
    #[strum(serialize = "CO")]
    Colorado,
    /// Connecticut
    #[strum(serialize = "CT")]
    Connecticut,
    /// Delaware
    #[strum(serialize = "DE")]
    Delaware,
    /// Florida
    #[strum(serialize = "FL")]
    Florida,
    /// Georgia
    #[strum(serialize = "GA")]
    Georgia,
    /// Hawaii
    #[strum(serialize = "HI")]
    Hawaii,
    /// Idaho
    #[strum(serialize = "ID")]
    Idaho,
    /// Illinois
    #[strum(serialize = "IL")]
    Illinois,
    /// Indiana
    #[strum(serialize = "IN")]
    Indiana,
    /// Iowa
    #[strum(serialize = "IA")]
    Iowa,
    /// Kansas
    #[strum(serialize = "KS")]
    Kansas,
    /// Kentucky
    #[strum(serialize = "KY")]
    Kentucky,
    /// Louisiana
    #[strum(serialize = "LA")]
    Louisiana,
    /// Maine
    #[strum(serialize = "ME")]
    Maine,
    /// Maryland
    #[strum(serialize = "MD")]
    Maryland,
    /// Massachusetts
    #[strum(serialize = "MA")]
    Massachusetts,
    /// Michigan
    #[strum(serialize = "MI")]
    Michigan,
    /// Minnesota
    #[strum(serialize = "MN")]
    Minnesota,
    /// Mississippi
    #[strum(serialize = "MS")]
    Mississippi,
    /// Missouri
    #[strum(serialize = "MO")]
    Missouri,
    /// Montana
    #[strum(serialize = "MT")]
    Montana,
    /// Nebraska
    #[strum(serialize = "NE")]
    Nebraska,
    /// Nevada
    #[strum(serialize = "NV")]
    Nevada,
    /// New Hampshire
    #[strum(serialize = "NH")]
    NewHampshire,
    /// New Jersey
    #[strum(serialize = "NJ")]
    NewJersey,
    /// New Mexico
    #[strum(serialize = "NM")]
    NewMexico,
    /// New York
    #[strum(serialize = "NY")]
    NewYork,
    /// North Carolina
    #[strum(serialize = "NC")]
    NorthCarolina,
    /// North Dakota
    #[strum(serialize = "ND")]
    NorthDakota,
    /// Ohio
    #[strum(serialize = "OH")]
    Ohio,
    /// Oklahoma
    #[strum(serialize = "OK")]
    Oklahoma,
    /// Oregon
    #[strum(serialize = "OR")]
    Oregon,
    /// Pennsylvania
    #[strum(serialize = "PA")]
    Pennsylvania,
    /// Rhode Island
    #[strum(serialize = "RI")]
    RhodeIsland,
    /// South Carolina
    #[strum(serialize = "SC")]
    SouthCarolina,
    /// South Dakota
    #[strum(serialize = "SD")]
    SouthDakota,
    /// Tennessee
    #[strum(serialize = "TN")]
    Tennessee,
    /// Texas
    #[strum(serialize = "TX")]
    Texas,
    /// Utah
    #[strum(serialize = "UT")]
    Utah,
    /// Vermont
    #[strum(serialize = "VT")]
    Vermont,
    /// Virginia
    #[strum(serialize = "VA")]
    Virginia,
    /// Washington
    #[strum(serialize = "WA")]
    Washington,
    /// West Virginia
    #[strum(serialize = "WV")]
    WestVirginia,
    /// Wisconsin
    #[strum(serialize = "WI")]
    Wisconsin,
    /// Wyoming
    #[strum(serialize = "WY")]
    Wyoming,
}

impl UsState {
    /// Returns all 50 states in [`Ord`] order, which is alphabetical by
    /// full name. Every `BTreeMap<UsState, _>` iterates in this order too.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::ALL.to_vec()
    }

    /// Every state, in declaration order (alphabetical by full name).
    pub const ALL: &'static [Self] = &[
        Self::Alabama,
        Self::Alaska,
        Self::Arizona,
        Self::Arkansas,
        Self::California,
        Self::Colorado,
        Self::Connecticut,
        Self::Delaware,
        Self::Florida,
        Self::Georgia,
        Self::Hawaii,
        Self::Idaho,
        Self::Illinois,
        Self::Indiana,
        Self::Iowa,
        Self::Kansas,
        Self::Kentucky,
        Self::Louisiana,
        Self::Maine,
        Self::Maryland,
        Self::Massachusetts,
        Self::Michigan,
        Self::Minnesota,
        Self::Mississippi,
        Self::Missouri,
        Self::Montana,
        Self::Nebraska,
        Self::Nevada,
        Self::NewHampshire,
        Self::NewJersey,
        Self::NewMexico,
        Self::NewYork,
        Self::NorthCarolina,
        Self::NorthDakota,
        Self::Ohio,
        Self::Oklahoma,
        Self::Oregon,
        Self::Pennsylvania,
        Self::RhodeIsland,
        Self::SouthCarolina,
        Self::SouthDakota,
        Self::Tennessee,
        Self::Texas,
        Self::Utah,
        Self::Vermont,
        Self::Virginia,
        Self::Washington,
        Self::WestVirginia,
        Self::Wisconsin,
        Self::Wyoming,
    ];

    /// Parses a raw two-letter code, canonicalizing deprecated forms.
    ///
    /// Surrounding whitespace and letter case are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStateError`] if the code does not name one of the
    /// 50 states after canonicalization.
    pub fn from_code(code: &str) -> Result<Self, UnknownStateError> {
        let normalized = code.trim().to_ascii_uppercase();

        if let Some((_, state)) = DEPRECATED_CODES
            .iter()
            .find(|(deprecated, _)| *deprecated == normalized)
        {
            return Ok(*state);
        }

        normalized
            .parse::<Self>()
            .map_err(|_| UnknownStateError { code: normalized })
    }

    /// Returns the two-letter postal abbreviation.
    #[must_use]
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Returns the full state name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alabama => "Alabama",
            Self::Alaska => "Alaska",
            Self::Arizona => "Arizona",
            Self::Arkansas => "Arkansas",
            Self::California => "California",
            Self::Colorado => "Colorado",
            Self::Connecticut => "Connecticut",
            Self::Delaware => "Delaware",
            Self::Florida => "Florida",
            Self::Georgia => "Georgia",
            Self::Hawaii => "Hawaii",
            Self::Idaho => "Idaho",
            Self::Illinois => "Illinois",
            Self::Indiana => "Indiana",
            Self::Iowa => "Iowa",
            Self::Kansas => "Kansas",
            Self::Kentucky => "Kentucky",
            Self::Louisiana => "Louisiana",
            Self::Maine => "Maine",
            Self::Maryland => "Maryland",
            Self::Massachusetts => "Massachusetts",
            Self::Michigan => "Michigan",
            Self::Minnesota => "Minnesota",
            Self::Mississippi => "Mississippi",
            Self::Missouri => "Missouri",
            Self::Montana => "Montana",
            Self::Nebraska => "Nebraska",
            Self::Nevada => "Nevada",
            Self::NewHampshire => "New Hampshire",
            Self::NewJersey => "New Jersey",
            Self::NewMexico => "New Mexico",
            Self::NewYork => "New York",
            Self::NorthCarolina => "North Carolina",
            Self::NorthDakota => "North Dakota",
            Self::Ohio => "Ohio",
            Self::Oklahoma => "Oklahoma",
            Self::Oregon => "Oregon",
            Self::Pennsylvania => "Pennsylvania",
            Self::RhodeIsland => "Rhode Island",
            Self::SouthCarolina => "South Carolina",
            Self::SouthDakota => "South Dakota",
            Self::Tennessee => "Tennessee",
            Self::Texas => "Texas",
            Self::Utah => "Utah",
            Self::Vermont => "Vermont",
            Self::Virginia => "Virginia",
            Self::Washington => "Washington",
            Self::WestVirginia => "West Virginia",
            Self::Wisconsin => "Wisconsin",
            Self::Wyoming => "Wyoming",
        }
    }
}

impl TryFrom<String> for UsState {
    type Error = UnknownStateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value)
    }
}

/// Error returned when a code does not name one of the 50 states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStateError {
    /// The normalized (trimmed, upper-cased) code that was rejected.
    pub code: String,
}

impl std::fmt::Display for UnknownStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown state code '{}'", self.code)
    }
}

impl std::error::Error for UnknownStateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_count() {
        assert_eq!(UsState::ALL.len(), 50);
        assert_eq!(UsState::all().len(), 50);
    }

    #[test]
    fn all_follows_ord_and_name_order() {
        let states = UsState::all();
        assert!(states.windows(2).all(|w| w[0] < w[1]));
        let names: Vec<&str> = states.iter().map(|s| s.name()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(states[0], UsState::Alabama);
        assert_eq!(states[1], UsState::Alaska);
    }

    #[test]
    fn code_roundtrip() {
        for state in UsState::ALL {
            assert_eq!(UsState::from_code(state.code()), Ok(*state));
            assert_eq!(state.to_string(), state.code());
            assert_eq!(state.as_ref(), state.code());
        }
    }

    #[test]
    fn canonicalizes_deprecated_nebraska_code() {
        assert_eq!(UsState::from_code("NB"), Ok(UsState::Nebraska));
        assert_eq!(UsState::from_code("nb"), Ok(UsState::Nebraska));
        assert_eq!(UsState::Nebraska.code(), "NE");
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        assert_eq!(UsState::from_code(" ca "), Ok(UsState::California));
        assert_eq!(UsState::from_code("Md"), Ok(UsState::Maryland));
    }

    #[test]
    fn rejects_non_state_codes() {
        for code in ["DC", "PR", "GU", "FS", "", "XX"] {
            let err = UsState::from_code(code).unwrap_err();
            assert_eq!(err.code, code);
        }
    }

    #[test]
    fn serde_uses_postal_code() {
        let json = serde_json::to_string(&UsState::NewYork).unwrap();
        assert_eq!(json, "\"NY\"");
        let parsed: UsState = serde_json::from_str("\"nb\"").unwrap();
        assert_eq!(parsed, UsState::Nebraska);
        assert!(serde_json::from_str::<UsState>("\"DC\"").is_err());
    }
}
