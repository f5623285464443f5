//! Mapping promoter `start` entries to unit names

use std::sync::OnceLock;

use regex::Regex;

use crate::systemd;

/// `ocf:<vendor>:<agent> <instance> [args...]`
const OCF_PATTERN: &str = r"^ocf:(\S+?):(\S+)\s+(\S+)";

static OCF_ENTRY: OnceLock<Regex> = OnceLock::new();

fn ocf_entry() -> &'static Regex {
    OCF_ENTRY.get_or_init(|| Regex::new(OCF_PATTERN).expect("OCF_PATTERN is a valid regex"))
}

/// Unit started for one `start` entry of `resource`.
///
/// Plain entries are unit names already. OCF entries map to the
/// `ocf.ra@` instance unit; `None` means the OCF entry carries no
/// instance name and cannot be mapped.
pub fn unit_for_start_entry(entry: &str, resource: &str) -> Option<String> {
    let entry = entry.trim();
    if !entry.starts_with("ocf:") {
        return Some(entry.to_string());
    }

    ocf_entry()
        .captures(entry)
        .map(|caps| systemd::ocf_service(&caps[3], resource))
}
