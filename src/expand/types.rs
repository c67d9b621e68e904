//! Core data types for DVN record expansion.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Name given to addresses missing from the verifier directory
pub const UNKNOWN_DVN: &str = "Unknown DVN";

/// Whether a verifier's attestation is mandatory for the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Required,
    Optional,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Required => "required",
            Role::Optional => "optional",
        }
    }

    /// Accepts `required`/`optional` and the `RequiredDVN`/`OptionalDVN` tags.
    pub fn parse(s: &str) -> Option<Role> {
        let s = s.trim().to_ascii_lowercase();
        if s.starts_with("required") {
            Some(Role::Required)
        } else if s.starts_with("optional") {
            Some(Role::Optional)
        } else {
            None
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an expanded row's fee came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeSource {
    /// Taken from the precomputed name/fee mapping
    Mapping,
    /// Taken from the flat fee array by position
    Positional,
    /// No fee could be resolved
    Missing,
}

impl fmt::Display for FeeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeSource::Mapping => write!(f, "mapping"),
            FeeSource::Positional => write!(f, "positional"),
            FeeSource::Missing => write!(f, "missing"),
        }
    }
}

/// A precomputed (verifier name, fee in wei) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub name: String,
    pub fee_wei: String,
}

impl From<(String, String)> for MappingEntry {
    fn from((name, fee_wei): (String, String)) -> Self {
        Self { name, fee_wei }
    }
}

/// One message as read from the fees export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRecord {
    /// Normalized GUID
    pub guid: String,
    pub required_addresses: Vec<String>,
    pub optional_addresses: Vec<String>,
    /// Required fees followed by optional fees, by convention
    pub fees_wei: Vec<String>,
    pub required_mapping: Vec<MappingEntry>,
    pub optional_mapping: Vec<MappingEntry>,
}

impl MessageRecord {
    pub fn addresses(&self, role: Role) -> &[String] {
        match role {
            Role::Required => &self.required_addresses,
            Role::Optional => &self.optional_addresses,
        }
    }

    pub fn mapping(&self, role: Role) -> &[MappingEntry] {
        match role {
            Role::Required => &self.required_mapping,
            Role::Optional => &self.optional_mapping,
        }
    }

    /// Rows the expander produces for a role.
    pub fn role_count(&self, role: Role) -> usize {
        self.addresses(role).len().max(self.mapping(role).len())
    }
}

/// One verifier's participation in one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedRow {
    pub guid: String,
    pub verifier_address: Option<String>,
    pub verifier_name: Option<String>,
    pub role: Role,
    pub fee_wei: Option<i128>,
    pub fee_eth: Option<Decimal>,
    pub fee_source: FeeSource,
}

/// Raised when the flat fee array cannot be trusted positionally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeAlignmentIssue {
    pub guid: String,
    pub fee_count: usize,
    pub required_count: usize,
    pub optional_count: usize,
    /// The record used both mapping and positional fees
    pub mixed_sources: bool,
}

impl fmt::Display for FeeAlignmentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "message {}: {} fees for {} required + {} optional verifiers",
            self.guid, self.fee_count, self.required_count, self.optional_count
        )?;
        if self.mixed_sources {
            write!(f, " (mapping and positional fees mixed)")?;
        }
        Ok(())
    }
}
