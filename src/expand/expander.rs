//! Per-message expansion into one row per (message, verifier).

use rayon::prelude::*;

use super::directory::VerifierDirectory;
use super::types::*;
use crate::utils::normalize::parse_int_lossy;
use crate::utils::units::wei_to_eth;

/// Individual alignment warnings logged before switching to a summary line
const MAX_LOGGED_ISSUES: usize = 20;

/// Expand one message into its per-verifier rows.
///
/// Required rows come first, then optional rows. For each role the row
/// count is `max(addresses, mapping entries)`. Names come from the mapping
/// when present, otherwise from the directory. Fees come from the mapping
/// when present, otherwise from the flat fee array, where optional fees
/// start after all required entries.
pub fn expand(record: &MessageRecord, directory: &VerifierDirectory) -> Vec<ExpandedRow> {
    let total = record.role_count(Role::Required) + record.role_count(Role::Optional);
    let mut rows = Vec::with_capacity(total);

    for role in [Role::Required, Role::Optional] {
        let addresses = record.addresses(role);
        let mapping = record.mapping(role);
        let offset = fee_offset(record, role);

        for i in 0..record.role_count(role) {
            let address = addresses.get(i).cloned();
            let entry = mapping.get(i);

            let verifier_name = match entry {
                Some(entry) => Some(entry.name.clone()),
                None => address.as_deref().map(|a| directory.lookup(a).to_string()),
            };

            let (raw_fee, source) = match entry {
                Some(entry) => (Some(entry.fee_wei.as_str()), FeeSource::Mapping),
                None => match record.fees_wei.get(offset + i) {
                    Some(fee) => (Some(fee.as_str()), FeeSource::Positional),
                    None => (None, FeeSource::Missing),
                },
            };
            let fee_wei = raw_fee.and_then(parse_int_lossy);
            let fee_source = if fee_wei.is_some() { source } else { FeeSource::Missing };

            rows.push(ExpandedRow {
                guid: record.guid.clone(),
                verifier_address: address,
                verifier_name,
                role,
                fee_wei,
                fee_eth: fee_wei.and_then(wei_to_eth),
                fee_source,
            });
        }
    }

    rows
}

/// Start of a role's fees inside the flat fee array.
fn fee_offset(record: &MessageRecord, role: Role) -> usize {
    match role {
        Role::Required => 0,
        Role::Optional => record.role_count(Role::Required),
    }
}

/// Check the required-then-optional fee convention for records that rely on it.
///
/// Returns `None` when every fee comes from a mapping, or when the fee array
/// length matches the verifier count and no mapping is mixed in.
pub fn check_fee_alignment(record: &MessageRecord) -> Option<FeeAlignmentIssue> {
    let uses_positional = [Role::Required, Role::Optional]
        .iter()
        .any(|&role| record.addresses(role).len() > record.mapping(role).len());
    if !uses_positional {
        return None;
    }

    let required_count = record.role_count(Role::Required);
    let optional_count = record.role_count(Role::Optional);
    let mixed_sources = !record.required_mapping.is_empty() || !record.optional_mapping.is_empty();
    let length_mismatch = record.fees_wei.len() != required_count + optional_count;

    if length_mismatch || mixed_sources {
        Some(FeeAlignmentIssue {
            guid: record.guid.clone(),
            fee_count: record.fees_wei.len(),
            required_count,
            optional_count,
            mixed_sources,
        })
    } else {
        None
    }
}

/// Result of expanding a whole table.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub rows: Vec<ExpandedRow>,
    pub issues: Vec<FeeAlignmentIssue>,
    pub records: usize,
}

impl Expansion {
    /// Messages whose positional fees may be mis-assigned
    pub fn ambiguous_records(&self) -> usize {
        self.issues.len()
    }
}

/// Expand every record on the rayon pool. Output order follows input order.
pub fn expand_all(records: &[MessageRecord], directory: &VerifierDirectory) -> Expansion {
    let per_record: Vec<(Vec<ExpandedRow>, Option<FeeAlignmentIssue>)> = records
        .par_iter()
        .map(|record| (expand(record, directory), check_fee_alignment(record)))
        .collect();

    let mut expansion = Expansion {
        records: records.len(),
        ..Default::default()
    };
    for (rows, issue) in per_record {
        expansion.rows.extend(rows);
        if let Some(issue) = issue {
            if expansion.issues.len() < MAX_LOGGED_ISSUES {
                log::warn!("Positional fee fallback is ambiguous for {}", issue);
            }
            expansion.issues.push(issue);
        }
    }

    if expansion.issues.len() > MAX_LOGGED_ISSUES {
        log::warn!(
            "{} more messages with ambiguous fee alignment (not logged individually)",
            expansion.issues.len() - MAX_LOGGED_ISSUES
        );
    }
    log::info!(
        "Expanded {} messages into {} verifier rows",
        expansion.records,
        expansion.rows.len()
    );
    expansion
}
