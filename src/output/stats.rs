//! Hostname tallying and rip statistics
//!
//! This module turns the raw hostname events of a rip into the per-host
//! counts, and formats a short human-readable summary for the CLI.

use crate::output::RipResult;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Counts occurrences of each hostname
///
/// Grouping is by exact string: no case folding, no trailing-dot removal.
/// The empty hostname of a relative link is counted like any other.
///
/// # Examples
///
/// ```
/// use link_ripper::output::tally_hostnames;
///
/// let hosts = vec!["a.com".to_string(), "a.com".to_string(), "b.com".to_string()];
/// let tally = tally_hostnames(&hosts);
/// assert_eq!(tally.get("a.com"), Some(&2));
/// assert_eq!(tally.get("b.com"), Some(&1));
/// ```
pub fn tally_hostnames(hostnames: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for hostname in hostnames {
        *counts.entry(hostname.clone()).or_insert(0) += 1;
    }
    counts
}

/// Summary numbers for one rip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RipStatistics {
    /// Number of links found, repeats included
    pub total_links: usize,

    /// Number of distinct hostnames
    pub unique_hostnames: usize,

    /// Links whose href had no hostname (relative links)
    pub relative_links: usize,

    /// Hostnames ordered by count, most frequent first, ties by name
    pub top_hostnames: Vec<(String, usize)>,
}

impl RipStatistics {
    pub fn from_result(result: &RipResult) -> Self {
        let mut top_hostnames: Vec<(String, usize)> = result
            .hostnames
            .iter()
            .filter(|(host, _)| !host.is_empty())
            .map(|(host, count)| (host.clone(), *count))
            .collect();
        top_hostnames.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            total_links: result.links.len(),
            unique_hostnames: top_hostnames.len(),
            relative_links: result.hostnames.get("").copied().unwrap_or(0),
            top_hostnames,
        }
    }
}

/// Formats statistics for display
///
/// # Arguments
///
/// * `target` - The ripped URL, for the heading
/// * `stats` - The statistics to display
pub fn format_statistics(target: &str, stats: &RipStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Rip Statistics: {} ===\n", target);
    let _ = writeln!(out, "  Total links found: {}", stats.total_links);
    let _ = writeln!(out, "  Unique hostnames: {}", stats.unique_hostnames);
    let _ = writeln!(out, "  Relative links: {}", stats.relative_links);

    if !stats.top_hostnames.is_empty() {
        let _ = writeln!(out, "\nHostnames:");
        for (host, count) in &stats.top_hostnames {
            let percentage = if stats.total_links > 0 {
                (*count as f64 / stats.total_links as f64) * 100.0
            } else {
                0.0
            };
            let _ = writeln!(out, "  {}: {} ({:.1}%)", host, count, percentage);
        }
    }

    out
}
