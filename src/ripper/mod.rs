//! Ripper module: the fetch, tokenize, extract and aggregate pipeline
//!
//! A rip runs in two halves connected only by channels:
//! - A worker task fetches the target and extracts links from the body,
//!   sending a hostname event and a link event per anchor
//! - The caller aggregates those events until the one-shot completion
//!   signal arrives
//!
//! Completion is sent by a drop guard, so it fires exactly once on every
//! path out of the worker: success, fetch failure, malformed markup, or a
//! panic.

mod aggregator;
mod extractor;
mod fetcher;
mod html;

pub use aggregator::aggregate;
pub use extractor::{extract, first_href, resolve_href, DiscoveredLink};
pub use fetcher::{build_http_client, ByteStream, FetchError, Fetcher};
pub use html::{AnchorScanner, Attribute, ScanError};

use crate::config::FetcherConfig;
use crate::output::RipResult;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use url::Url;

/// How the token sequence of a fetched body ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The body was read to the end
    EndOfStream,
    /// Markup was cut off at the end of the body or a token exceeded the
    /// size limit
    Malformed(String),
    /// The body stream failed partway through
    ReadError(String),
    /// The aggregating side stopped listening
    Abandoned,
    /// The worker stopped without reaching a normal exit
    Aborted,
}

/// The value carried by the completion signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RipOutcome {
    /// A body was fetched and extraction ran until `termination`
    Finished { termination: Termination },
    /// No body could be fetched; no events were sent
    FetchFailed { reason: String },
}

impl RipOutcome {
    /// Returns true if a body was fetched and extraction ended normally
    ///
    /// Malformed markup and truncated bodies still count: their partial
    /// results are valid.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Finished { termination } => !matches!(
                termination,
                Termination::Abandoned | Termination::Aborted
            ),
            Self::FetchFailed { .. } => false,
        }
    }
}

/// Producer half of the link and hostname channels
#[derive(Clone)]
pub struct EventSender {
    pub links: mpsc::Sender<String>,
    pub hostnames: mpsc::Sender<String>,
}

/// Everything the worker side of a rip sends on
pub struct RipSender {
    pub events: EventSender,
    pub done: oneshot::Sender<RipOutcome>,
}

/// Everything the aggregating side of a rip receives on
pub struct RipReceivers {
    pub links: mpsc::Receiver<String>,
    pub hostnames: mpsc::Receiver<String>,
    pub done: oneshot::Receiver<RipOutcome>,
}

/// Allocates the three channels of one rip
///
/// Link and hostname channels hold a single event each, so the worker can
/// never run more than one event ahead of the aggregator.
pub fn rip_channels() -> (RipSender, RipReceivers) {
    let (links_tx, links_rx) = mpsc::channel(1);
    let (hostnames_tx, hostnames_rx) = mpsc::channel(1);
    let (done_tx, done_rx) = oneshot::channel();

    let sender = RipSender {
        events: EventSender {
            links: links_tx,
            hostnames: hostnames_tx,
        },
        done: done_tx,
    };
    let receivers = RipReceivers {
        links: links_rx,
        hostnames: hostnames_rx,
        done: done_rx,
    };

    (sender, receivers)
}

/// Sends the completion signal when dropped
///
/// The outcome starts as [`Termination::Aborted`] and is replaced with
/// [`CompletionGuard::complete`] on normal exits.
pub struct CompletionGuard {
    done: Option<oneshot::Sender<RipOutcome>>,
    outcome: RipOutcome,
}

impl CompletionGuard {
    pub fn new(done: oneshot::Sender<RipOutcome>) -> Self {
        Self {
            done: Some(done),
            outcome: RipOutcome::Finished {
                termination: Termination::Aborted,
            },
        }
    }

    /// Records the outcome to send
    pub fn complete(&mut self, outcome: RipOutcome) {
        self.outcome = outcome;
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(done) = self.done.take() {
            let outcome = std::mem::replace(
                &mut self.outcome,
                RipOutcome::Finished {
                    termination: Termination::Aborted,
                },
            );
            // The receiver may already be gone; nothing is waiting then
            let _ = done.send(outcome);
        }
    }
}

/// Notified after each rip whose body was fetched and extracted
pub trait RipObserver: Send + Sync {
    fn on_rip_completed(&self, report: &RipReport);
}

/// Everything a finished rip produced
#[derive(Debug, Clone)]
pub struct RipReport {
    pub target: Url,
    pub result: RipResult,
    pub outcome: RipOutcome,
}

/// Runs rips against single pages
#[derive(Clone)]
pub struct Ripper {
    fetcher: Arc<Fetcher>,
    max_token_bytes: Option<usize>,
    observer: Option<Arc<dyn RipObserver>>,
}

impl Ripper {
    /// Creates a ripper whose fetcher is built from `config`
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let fetcher = Fetcher::new(config)?;
        Ok(Self::with_fetcher(fetcher).with_max_token_bytes(config.max_token_bytes))
    }

    pub fn with_fetcher(fetcher: Fetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            max_token_bytes: None,
            observer: None,
        }
    }

    pub fn with_max_token_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_token_bytes = limit;
        self
    }

    /// Registers the hook called after each successful rip
    pub fn with_observer(mut self, observer: Arc<dyn RipObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Starts the worker half of a rip on its own task
    ///
    /// Exactly one completion is sent on `sender.done`, whatever happens.
    pub fn spawn(&self, target: Url, sender: RipSender) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let max_token_bytes = self.max_token_bytes;

        tokio::spawn(async move {
            run_worker(&fetcher, &target, sender, max_token_bytes).await;
        })
    }

    /// Rips `target` and returns the aggregated result
    ///
    /// Fetch failures are not errors here: they produce an empty result
    /// with a [`RipOutcome::FetchFailed`] outcome.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use link_ripper::config::FetcherConfig;
    /// use link_ripper::Ripper;
    /// use url::Url;
    ///
    /// # async fn run() {
    /// let ripper = Ripper::new(&FetcherConfig::default()).unwrap();
    /// let report = ripper.rip(Url::parse("https://example.com/").unwrap()).await;
    /// println!("{} links", report.result.links.len());
    /// # }
    /// ```
    pub async fn rip(&self, target: Url) -> RipReport {
        let (sender, receivers) = rip_channels();
        let worker = self.spawn(target.clone(), sender);

        let (result, outcome) = aggregate(receivers).await;

        if let Err(e) = worker.await {
            tracing::error!("Rip worker for {} failed: {}", target, e);
        }

        tracing::info!(
            "Rip of {} finished: {} links, {} hostnames ({:?})",
            target,
            result.links.len(),
            result.hostnames.len(),
            outcome
        );

        let report = RipReport {
            target,
            result,
            outcome,
        };

        if report.outcome.is_success() {
            if let Some(observer) = &self.observer {
                observer.on_rip_completed(&report);
            }
        }

        report
    }
}

/// Fetches `target` and extracts its links, signalling completion on exit
async fn run_worker(
    fetcher: &Fetcher,
    target: &Url,
    sender: RipSender,
    max_token_bytes: Option<usize>,
) {
    let RipSender { events, done } = sender;
    let mut guard = CompletionGuard::new(done);

    tracing::debug!("Rip of {} started", target);

    let body = match fetcher.fetch(target).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Fetch failed, completing with no results: {}", e);
            guard.complete(RipOutcome::FetchFailed {
                reason: e.to_string(),
            });
            return;
        }
    };

    let termination = extract(target, body, &events, max_token_bytes).await;
    match &termination {
        Termination::EndOfStream => {}
        other => tracing::debug!("Extraction from {} ended early: {:?}", target, other),
    }

    guard.complete(RipOutcome::Finished { termination });
}
