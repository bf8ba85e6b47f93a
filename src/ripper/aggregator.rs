//! Caller-side aggregation of rip events

use crate::output::{tally_hostnames, RipResult};
use crate::ripper::{RipOutcome, RipReceivers, Termination};

/// Collects link and hostname events until the rip completes
///
/// Links keep their arrival order. Hostnames are tallied on their own,
/// without pairing them to links. Events already queued when completion
/// arrives were sent before it and are kept; nothing is sent after it.
///
/// A completion sender dropped without a value means the worker died
/// before reporting; that is treated as completion with
/// [`Termination::Aborted`].
pub async fn aggregate(receivers: RipReceivers) -> (RipResult, RipOutcome) {
    let RipReceivers {
        mut links,
        mut hostnames,
        mut done,
    } = receivers;

    let mut found_links = Vec::new();
    let mut found_hostnames = Vec::new();

    let outcome = loop {
        tokio::select! {
            Some(link) = links.recv() => found_links.push(link),
            Some(hostname) = hostnames.recv() => found_hostnames.push(hostname),
            completion = &mut done => {
                break completion.unwrap_or(RipOutcome::Finished {
                    termination: Termination::Aborted,
                });
            }
        }
    };

    while let Ok(link) = links.try_recv() {
        found_links.push(link);
    }
    while let Ok(hostname) = hostnames.try_recv() {
        found_hostnames.push(hostname);
    }

    let result = RipResult {
        hostnames: tally_hostnames(&found_hostnames),
        links: found_links,
    };

    (result, outcome)
}
