use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Terminal rider status codes.
///
/// Declaration order is the precedence used when listing non-finishers.
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
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RiderStatus {
    /// Over time limit (pulled by the commissaire)
    #[strum(to_string = "otl", serialize = "hd")]
    #[serde(alias = "hd")]
    Otl,
    Dsq,
    /// Withdrawn
    Wd,
    Dnf,
    Dns,
}

impl RiderStatus {
    /// Parse a free comment code, returning `None` for anything outside the vocabulary.
    pub fn from_code(code: &str) -> Option<Self> {
        code.trim().parse().ok()
    }

    pub fn code(&self) -> &'static str {
        self.into()
    }

    /// Sort precedence among non-finishers.
    pub fn precedence(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for RiderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_from_code() {
        assert_eq!(RiderStatus::from_code("dnf"), Some(RiderStatus::Dnf));
        assert_eq!(RiderStatus::from_code(" DSQ "), Some(RiderStatus::Dsq));
        assert_eq!(RiderStatus::from_code("hd"), Some(RiderStatus::Otl));
        assert_eq!(RiderStatus::Otl.code(), "otl");
        assert_eq!(RiderStatus::from_code("crash"), None);
        assert_eq!(RiderStatus::from_code(""), None);
    }

    #[test]
    fn test_precedence_order() {
        let order: Vec<_> = RiderStatus::iter().map(|s| s.code()).collect();
        assert_eq!(order, ["otl", "dsq", "wd", "dnf", "dns"]);
        assert!(RiderStatus::Dsq.precedence() < RiderStatus::Dnf.precedence());
    }
}
