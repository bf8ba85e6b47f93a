//! Output module for rip results
//!
//! This module handles:
//! - The result set a rip produces (links and hostname tally)
//! - JSON rendering for the CLI and the HTTP API
//! - Human-readable statistics

pub mod stats;

pub use stats::{format_statistics, tally_hostnames, RipStatistics};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The links and hostname tally of one rip
///
/// Links keep document order and are never deduplicated. The tally groups
/// hostnames by exact string, so `A.com` and `a.com` are counted apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RipResult {
    pub links: Vec<String>,
    pub hostnames: BTreeMap<String, usize>,
}

impl RipResult {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.hostnames.is_empty()
    }
}

/// Renders a result as JSON
///
/// # Arguments
///
/// * `result` - The rip result
/// * `pretty` - Indent the output
///
/// # Example
///
/// ```
/// use link_ripper::output::{render_json, RipResult};
///
/// let json = render_json(&RipResult::default(), false).unwrap();
/// assert_eq!(json, r#"{"links":[],"hostnames":{}}"#);
/// ```
pub fn render_json(result: &RipResult, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
}
