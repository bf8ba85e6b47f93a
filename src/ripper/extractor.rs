//! Link extraction from a streaming HTML body
//!
//! Body chunks are handed to an [`AnchorScanner`] running on a blocking
//! thread, since html5ever's buffers cannot move between tasks. For each
//! anchor with a usable href the scanner side sends a hostname event (when
//! the href parses as a request URI) followed by a link event.
//!
//! # Preserved quirks
//!
//! - Only the first usable `href` attribute of an anchor counts. The
//!   tokenizer already drops repeated attributes, so in practice this is
//!   the first `href` unless it is exactly `/` or `#`.
//! - Relative hrefs are rewritten with [`path_join`], a lexical path join of
//!   the target's full URL string and the href. This is not RFC 3986
//!   resolution: `https://example.com/x/` joined with `/y` gives
//!   `https:/example.com/x/y`.

use crate::ripper::html::{AnchorScanner, Attribute, ScanError};
use crate::ripper::{EventSender, Termination};
use crate::url::{parse_request_uri, path_join};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use tokio::sync::mpsc;
use url::Url;

/// A link found on the page, and the hostname event it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// The href, rewritten against the target if it was relative
    pub link: String,
    /// Hostname of the href as written; `None` if it did not parse
    pub hostname: Option<String>,
}

/// Returns the first `href` value that is not exactly `/` or `#`
pub fn first_href(attributes: &[Attribute]) -> Option<&str> {
    attributes
        .iter()
        .find(|a| a.key == "href" && a.value != "/" && a.value != "#")
        .map(|a| a.value.as_str())
}

/// Applies the href policy to one href value
///
/// # Rules
///
/// | href | hostname | link |
/// |------|----------|------|
/// | parses, absolute | its hostname | unchanged |
/// | parses, relative | `""` | `path_join(target, href)` |
/// | does not parse | none | unchanged |
///
/// # Examples
///
/// ```
/// use link_ripper::ripper::resolve_href;
/// use url::Url;
///
/// let target = Url::parse("https://example.com/page").unwrap();
///
/// let found = resolve_href(&target, "/about");
/// assert_eq!(found.link, "https:/example.com/page/about");
/// assert_eq!(found.hostname.as_deref(), Some(""));
///
/// let found = resolve_href(&target, "about.html");
/// assert_eq!(found.link, "about.html");
/// assert_eq!(found.hostname, None);
/// ```
pub fn resolve_href(target: &Url, href: &str) -> DiscoveredLink {
    match parse_request_uri(href) {
        Ok(reference) => {
            let hostname = reference.hostname().to_string();
            let link = if reference.is_absolute() {
                href.to_string()
            } else {
                path_join(&[target.as_str(), href])
            };
            DiscoveredLink {
                link,
                hostname: Some(hostname),
            }
        }
        Err(e) => {
            tracing::trace!("Unparseable href {:?}: {}", href, e);
            DiscoveredLink {
                link: href.to_string(),
                hostname: None,
            }
        }
    }
}

/// Extracts links from `body`, sending events as each anchor is found
///
/// Runs until the body ends, fails to read, or the scan stops on a token
/// over the size limit, or until the receiving side goes away. The body is
/// dropped before this returns.
///
/// # Arguments
///
/// * `target` - The page URL, used to rewrite relative hrefs
/// * `body` - The response body stream
/// * `events` - Where link and hostname events are sent
/// * `max_token_bytes` - Optional cap on a single token's size
///
/// # Returns
///
/// How the token sequence ended
pub async fn extract<S, E>(
    target: &Url,
    mut body: S,
    events: &EventSender,
    max_token_bytes: Option<usize>,
) -> Termination
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let (chunks_tx, chunks_rx) = mpsc::channel::<Bytes>(1);
    let scan_target = target.clone();
    let scan_events = events.clone();

    let scanner = tokio::task::spawn_blocking(move || {
        scan_chunks(chunks_rx, &scan_target, &scan_events, max_token_bytes)
    });

    let mut read_error = None;
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(chunk) => {
                // The scanner hung up early; its result says why
                if chunks_tx.send(chunk).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                read_error = Some(e.to_string());
                break;
            }
        }
    }
    drop(chunks_tx);
    drop(body);

    let scanned = match scanner.await {
        Ok(scanned) => scanned,
        Err(e) => {
            tracing::error!("Anchor scan of {} failed: {}", target, e);
            return Termination::Aborted;
        }
    };

    match (scanned, read_error) {
        (Termination::Abandoned, _) => Termination::Abandoned,
        (_, Some(reason)) => Termination::ReadError(reason),
        (scanned, None) => scanned,
    }
}

/// Scans chunks as they arrive and sends the events for each anchor
///
/// Runs on a blocking thread. Returns when the chunk channel closes, the
/// scan stops early, or an event cannot be delivered.
fn scan_chunks(
    mut chunks: mpsc::Receiver<Bytes>,
    target: &Url,
    events: &EventSender,
    max_token_bytes: Option<usize>,
) -> Termination {
    let mut scanner = AnchorScanner::new(max_token_bytes);

    while let Some(chunk) = chunks.blocking_recv() {
        scanner.feed(&chunk);
        if !deliver(&mut scanner, target, events) {
            return Termination::Abandoned;
        }
        if let Some(err) = scanner.error() {
            return termination_for(err);
        }
    }

    scanner.finish();
    if !deliver(&mut scanner, target, events) {
        return Termination::Abandoned;
    }

    match scanner.error() {
        Some(err) => termination_for(err),
        None => Termination::EndOfStream,
    }
}

/// Sends the events of every anchor found so far; false if nobody listens
fn deliver(scanner: &mut AnchorScanner, target: &Url, events: &EventSender) -> bool {
    for attributes in scanner.take_anchors() {
        let Some(href) = first_href(&attributes) else {
            continue;
        };

        let found = resolve_href(target, href);

        if let Some(hostname) = found.hostname {
            if events.hostnames.blocking_send(hostname).is_err() {
                return false;
            }
        }

        if events.links.blocking_send(found.link).is_err() {
            return false;
        }
    }

    true
}

fn termination_for(err: ScanError) -> Termination {
    Termination::Malformed(err.to_string())
}
