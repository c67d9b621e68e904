use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Top-level analysis configuration. Every section has defaults, so an
/// empty file (or no file at all) is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub columns: ColumnAliases,
    pub windows: WindowConfig,
    pub reports: ReportConfig,
}

impl AnalysisConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.columns.validate()?;
        self.windows.validate()?;

        if self.reports.top_stacks == 0 {
            return Err(ValidationError::InvalidReports(
                "top_stacks must be at least 1".to_string(),
            ));
        }
        if self.reports.top_summary == 0 {
            return Err(ValidationError::InvalidReports(
                "top_summary must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Header aliases per logical column, matched case-insensitively in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub guid: Vec<String>,
    pub required_addresses: Vec<String>,
    pub optional_addresses: Vec<String>,
    pub fees: Vec<String>,
    pub required_mapping: Vec<String>,
    pub optional_mapping: Vec<String>,
    pub source_tx: Vec<String>,
    pub latency: Vec<String>,
    pub message_status: Vec<String>,
    pub delivered: Vec<String>,
    pub source_timestamp: Vec<String>,
    pub dvn_name: Vec<String>,
    pub dvn_address: Vec<String>,
    pub role: Vec<String>,
    pub fee_eth: Vec<String>,
    pub directory_address: Vec<String>,
    pub directory_name: Vec<String>,
}

fn aliases(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            guid: aliases(&["GUID", "guid"]),
            required_addresses: aliases(&["requiredDVNs", "required_dvns", "REQUIREDDVNS"]),
            optional_addresses: aliases(&["optionalDVNs", "optional_dvns", "OPTIONALDVNS"]),
            fees: aliases(&["DVN_FEES_ARRAY", "dvn_fees_array", "dvn_fees", "fees_array", "dvnfeesarray"]),
            required_mapping: aliases(&["RequiredDVN_Mapping", "requireddvn_mapping", "requiredDvnMapping"]),
            optional_mapping: aliases(&["OptionalDVN_Mapping", "optionaldvn_mapping", "optionalDvnMapping"]),
            source_tx: aliases(&["SOURCETXHASH", "source_tx_hash", "source_tx", "source_txhash"]),
            latency: aliases(&[
                "LATENCYTODELIVERY_SECONDS",
                "latencytodelivery_seconds",
                "LATENCY_SECONDS",
                "latency",
            ]),
            message_status: aliases(&["MESSAGESTATUS", "message_status", "status"]),
            delivered: aliases(&["DELIVERED_BOOL", "delivered_bool", "delivered"]),
            source_timestamp: aliases(&["SOURCETIMESTAMP", "source_timestamp", "source_ts"]),
            dvn_name: aliases(&["DVN_NAME", "dvn_name", "DVN_Name"]),
            dvn_address: aliases(&["DVN_ADDR", "dvn_addr", "dvn_address"]),
            role: aliases(&["ROLE", "role", "DVN_Type"]),
            fee_eth: aliases(&["DVN_FEE_ETH", "dvn_fee_eth", "DVN_Fee_ETH"]),
            directory_address: aliases(&["DVN_Address", "dvn_address", "address"]),
            directory_name: aliases(&["DVN_Name", "dvn_name", "name"]),
        }
    }
}

impl ColumnAliases {
    fn validate(&self) -> Result<(), ValidationError> {
        let lists: [(&str, &Vec<String>); 17] = [
            ("guid", &self.guid),
            ("required_addresses", &self.required_addresses),
            ("optional_addresses", &self.optional_addresses),
            ("fees", &self.fees),
            ("required_mapping", &self.required_mapping),
            ("optional_mapping", &self.optional_mapping),
            ("source_tx", &self.source_tx),
            ("latency", &self.latency),
            ("message_status", &self.message_status),
            ("delivered", &self.delivered),
            ("source_timestamp", &self.source_timestamp),
            ("dvn_name", &self.dvn_name),
            ("dvn_address", &self.dvn_address),
            ("role", &self.role),
            ("fee_eth", &self.fee_eth),
            ("directory_address", &self.directory_address),
            ("directory_name", &self.directory_name),
        ];
        for (name, list) in lists {
            if list.is_empty() || list.iter().any(|a| a.trim().is_empty()) {
                return Err(ValidationError::InvalidColumns(format!(
                    "alias list '{}' must contain at least one non-empty name",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Before/during/after windows around an outage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub start: NaiveDate,
    pub outage_start: NaiveDate,
    pub outage_end: NaiveDate,
    pub end: NaiveDate,
    /// Gap left between the outage and the neighbouring windows
    #[serde(with = "humantime_serde")]
    pub gap: Duration,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 9, 26).unwrap_or_default(),
            outage_start: NaiveDate::from_ymd_opt(2025, 10, 19).unwrap_or_default(),
            outage_end: NaiveDate::from_ymd_opt(2025, 10, 21).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 10, 25).unwrap_or_default(),
            gap: Duration::from_secs(24 * 3600),
        }
    }
}

impl WindowConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.outage_start > self.outage_end {
            return Err(ValidationError::InvalidWindows(format!(
                "outage_start {} is after outage_end {}",
                self.outage_start, self.outage_end
            )));
        }
        if self.start > self.outage_start || self.outage_end > self.end {
            return Err(ValidationError::InvalidWindows(format!(
                "outage {}..{} must lie within {}..{}",
                self.outage_start, self.outage_end, self.start, self.end
            )));
        }
        if chrono::Duration::from_std(self.gap).is_err() {
            return Err(ValidationError::InvalidWindows(format!(
                "gap {:?} is out of range",
                self.gap
            )));
        }
        Ok(())
    }

    /// Midnight UTC of a configured date.
    pub fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
        date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    pub fn gap_duration(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.gap).unwrap_or_else(|_| chrono::Duration::days(1))
    }
}

/// Report sizing knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of stacks kept in the daily time series
    pub top_stacks: usize,
    /// Number of rows printed in console summaries
    pub top_summary: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_stacks: 6,
            top_summary: 20,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid column configuration: {0}")]
    InvalidColumns(String),
    #[error("Invalid window configuration: {0}")]
    InvalidWindows(String),
    #[error("Invalid report configuration: {0}")]
    InvalidReports(String),
}
