use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The kind of loan a product offers.
///
/// Home and vehicle loans are secured against collateral, so a simulation
/// for them needs a property value to derive the loan-to-value ratio.
///
/// # Examples
///
/// ```
/// use loan_simulator::core::loan_type::LoanType;
///
/// let kind: LoanType = "vehicle".parse().unwrap();
/// assert_eq!(kind, LoanType::Vehicle);
/// assert!(kind.requires_collateral());
/// assert!(!LoanType::Personal.requires_collateral());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Home,
    Vehicle,
    Personal,
}

impl LoanType {
    pub const ALL: [LoanType; 3] = [LoanType::Home, LoanType::Vehicle, LoanType::Personal];

    /// Whether the loan is secured and therefore needs a collateral value.
    pub fn requires_collateral(self) -> bool {
        matches!(self, LoanType::Home | LoanType::Vehicle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoanType::Home => "home",
            LoanType::Vehicle => "vehicle",
            LoanType::Personal => "personal",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown loan type '{0}' (expected home, vehicle or personal)")]
pub struct ParseLoanTypeError(String);

impl FromStr for LoanType {
    type Err = ParseLoanTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(LoanType::Home),
            "vehicle" => Ok(LoanType::Vehicle),
            "personal" => Ok(LoanType::Personal),
            _ => Err(ParseLoanTypeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collateral_requirement() {
        assert!(LoanType::Home.requires_collateral());
        assert!(LoanType::Vehicle.requires_collateral());
        assert!(!LoanType::Personal.requires_collateral());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("HOME".parse::<LoanType>().unwrap(), LoanType::Home);
        assert_eq!(" personal ".parse::<LoanType>().unwrap(), LoanType::Personal);
        assert!("boat".parse::<LoanType>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LoanType::Vehicle).unwrap();
        assert_eq!(json, "\"vehicle\"");
        let parsed: LoanType = serde_json::from_str("\"home\"").unwrap();
        assert_eq!(parsed, LoanType::Home);
    }
}
