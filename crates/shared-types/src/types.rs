use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder for a section that could not be located in an analysis
pub const NOT_SPECIFIED: &str = "Not specified";

/// Result reported for a document whose extracted text is blank
pub const EMPTY_DOCUMENT_RESULT: &str = "The uploaded PDF appears to be empty or unreadable.";

/// Document attributes every analysis is expected to report on.
///
/// The declaration order is the row order of the comparison matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Parties,
    EffectiveDate,
    Term,
    ConfidentialInformation,
    Obligations,
    Jurisdiction,
    RiskFlags,
}

impl SectionLabel {
    pub const ALL: [SectionLabel; 7] = [
        SectionLabel::Parties,
        SectionLabel::EffectiveDate,
        SectionLabel::Term,
        SectionLabel::ConfidentialInformation,
        SectionLabel::Obligations,
        SectionLabel::Jurisdiction,
        SectionLabel::RiskFlags,
    ];

    /// Heading text as it appears in model output
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionLabel::Parties => "Parties",
            SectionLabel::EffectiveDate => "Effective Date",
            SectionLabel::Term => "Term",
            SectionLabel::ConfidentialInformation => "Confidential Information",
            SectionLabel::Obligations => "Obligations",
            SectionLabel::Jurisdiction => "Jurisdiction",
            SectionLabel::RiskFlags => "Risk Flags",
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(
        "Unknown role '{0}'. Expected one of: \
         appellate_attorney, paralegal, contract_analyst, tenant"
    )]
    UnknownRole(String),

    #[error("Unknown error policy '{0}'. Expected 'best-effort' or 'fail-fast'")]
    UnknownPolicy(String),
}

/// Persona the analysis is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    AppellateAttorney,
    Paralegal,
    ContractAnalyst,
    Tenant,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::AppellateAttorney,
        Role::Paralegal,
        Role::ContractAnalyst,
        Role::Tenant,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::AppellateAttorney => "Appellate Attorney",
            Role::Paralegal => "Paralegal",
            Role::ContractAnalyst => "Contract Analyst",
            Role::Tenant => "Tenant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    /// Accepts both the API value (`contract_analyst`) and the display name
    /// (`Contract Analyst`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "appellate_attorney" => Ok(Role::AppellateAttorney),
            "paralegal" => Ok(Role::Paralegal),
            "contract_analyst" => Ok(Role::ContractAnalyst),
            "tenant" => Ok(Role::Tenant),
            _ => Err(ParseError::UnknownRole(s.to_string())),
        }
    }
}

/// How a batch reacts when one document's analysis fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Record the failure against the document and keep going
    #[default]
    BestEffort,
    /// Abort the whole batch on the first failure
    FailFast,
}

impl FromStr for ErrorPolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "best_effort" => Ok(ErrorPolicy::BestEffort),
            "fail_fast" => Ok(ErrorPolicy::FailFast),
            _ => Err(ParseError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::BestEffort => f.write_str("best-effort"),
            ErrorPolicy::FailFast => f.write_str("fail-fast"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_section_order_is_fixed() {
        let names: Vec<_> = SectionLabel::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Parties",
                "Effective Date",
                "Term",
                "Confidential Information",
                "Obligations",
                "Jurisdiction",
                "Risk Flags",
            ]
        );
    }

    #[test]
    fn test_section_label_serializes_snake_case() {
        let json = serde_json::to_string(&SectionLabel::RiskFlags).unwrap();
        assert_eq!(json, "\"risk_flags\"");
    }

    #[test]
    fn test_role_parses_api_value_and_display_name() {
        assert_eq!("contract_analyst".parse::<Role>().unwrap(), Role::ContractAnalyst);
        assert_eq!("Appellate Attorney".parse::<Role>().unwrap(), Role::AppellateAttorney);
        assert_eq!("TENANT".parse::<Role>().unwrap(), Role::Tenant);
    }

    #[test]
    fn test_role_rejects_unknown() {
        let err = "judge".parse::<Role>().unwrap_err();
        assert_eq!(err, ParseError::UnknownRole("judge".to_string()));
    }

    #[test]
    fn test_error_policy_parsing() {
        assert_eq!("best-effort".parse::<ErrorPolicy>().unwrap(), ErrorPolicy::BestEffort);
        assert_eq!("fail_fast".parse::<ErrorPolicy>().unwrap(), ErrorPolicy::FailFast);
        assert!("sometimes".parse::<ErrorPolicy>().is_err());
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::BestEffort);
    }

    #[test]
    fn test_error_policy_display_round_trips() {
        for policy in [ErrorPolicy::BestEffort, ErrorPolicy::FailFast] {
            assert_eq!(policy.to_string().parse::<ErrorPolicy>().unwrap(), policy);
        }
    }
}
