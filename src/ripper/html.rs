//! Incremental anchor scanning on top of the html5ever tokenizer
//!
//! Body chunks are fed to the tokenizer as they arrive. The sink keeps the
//! attributes of every `<a>` start tag in document order and switches the
//! tokenizer into raw-text mode after `script`, `style` and the other
//! elements whose content is not markup, so anchors written inside them are
//! not reported.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use thiserror::Error;

/// One attribute of an anchor, name lowercased and value entity-decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// Why scanning stopped before the end of the document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Token exceeds {0} bytes")]
    TokenTooLarge(usize),

    #[error("Markup cut off at end of input: {0}")]
    Truncated(String),
}

/// Maps elements whose content is not tokenized as markup to their raw mode
fn raw_kind(name: &str) -> Option<RawKind> {
    match name {
        "script" => Some(RawKind::ScriptData),
        "title" | "textarea" => Some(RawKind::Rcdata),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            Some(RawKind::Rawtext)
        }
        _ => None,
    }
}

fn tag_len(tag: &Tag) -> usize {
    tag.name.len()
        + tag
            .attrs
            .iter()
            .map(|a| a.name.local.len() + a.value.len())
            .sum::<usize>()
}

struct AnchorSink {
    anchors: Vec<Vec<Attribute>>,
    max_token_bytes: Option<usize>,
    tokens_seen: u64,
    oversized: Option<usize>,
    finishing: bool,
    truncated: Option<String>,
}

impl AnchorSink {
    fn exceeds_limit(&mut self, len: usize) -> bool {
        match self.max_token_bytes {
            Some(limit) if len > limit => {
                self.oversized = Some(limit);
                true
            }
            _ => false,
        }
    }
}

impl TokenSink for AnchorSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        if self.oversized.is_some() {
            return TokenSinkResult::Continue;
        }

        match token {
            Token::TagToken(tag) => {
                self.tokens_seen += 1;
                if self.exceeds_limit(tag_len(&tag)) || tag.kind != TagKind::StartTag {
                    return TokenSinkResult::Continue;
                }

                if &*tag.name == "a" {
                    self.anchors.push(
                        tag.attrs
                            .iter()
                            .map(|a| Attribute {
                                key: a.name.local.to_string(),
                                value: a.value.to_string(),
                            })
                            .collect(),
                    );
                }

                if let Some(kind) = raw_kind(&tag.name) {
                    return TokenSinkResult::RawData(kind);
                }
            }
            Token::CommentToken(text) => {
                self.tokens_seen += 1;
                self.exceeds_limit(text.len());
            }
            Token::ParseError(reason) => {
                if self.finishing && self.truncated.is_none() {
                    self.truncated = Some(reason.into_owned());
                }
            }
            Token::EOFToken => {}
            _ => self.tokens_seen += 1,
        }

        TokenSinkResult::Continue
    }
}

/// Streaming anchor scanner
///
/// Bytes go in with [`feed`](Self::feed), anchors come out with
/// [`take_anchors`](Self::take_anchors). UTF-8 sequences split across chunks
/// are carried over; invalid bytes become U+FFFD.
///
/// With a token limit set, a tag or comment longer than the limit, or more
/// than the limit of input fed without any token completing, stops the
/// scan. Anchors found before that point are kept.
pub struct AnchorScanner {
    tokenizer: Tokenizer<AnchorSink>,
    input: BufferQueue,
    carry: Vec<u8>,
    pending_bytes: usize,
}

impl AnchorScanner {
    pub fn new(max_token_bytes: Option<usize>) -> Self {
        let sink = AnchorSink {
            anchors: Vec::new(),
            max_token_bytes,
            tokens_seen: 0,
            oversized: None,
            finishing: false,
            truncated: None,
        };

        Self {
            tokenizer: Tokenizer::new(sink, TokenizerOpts::default()),
            input: BufferQueue::new(),
            carry: Vec::new(),
            pending_bytes: 0,
        }
    }

    /// Tokenizes one chunk of the body
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.error().is_some() {
            return;
        }

        self.carry.extend_from_slice(chunk);
        let text = self.take_decodable();
        if text.is_empty() {
            return;
        }

        let seen = self.tokenizer.sink.tokens_seen;
        self.input.push_back(StrTendril::from_slice(&text));
        let _ = self.tokenizer.feed(&mut self.input);

        if self.tokenizer.sink.tokens_seen == seen {
            self.pending_bytes += text.len();
        } else {
            self.pending_bytes = 0;
        }

        let pending = self.pending_bytes;
        self.tokenizer.sink.exceeds_limit(pending);
    }

    /// Signals end of input, flushing anything still buffered
    pub fn finish(&mut self) {
        if self.error().is_some() {
            return;
        }

        if !self.carry.is_empty() {
            let rest = String::from_utf8_lossy(&self.carry).into_owned();
            self.carry.clear();
            self.input.push_back(StrTendril::from_slice(&rest));
            let _ = self.tokenizer.feed(&mut self.input);
        }

        self.tokenizer.sink.finishing = true;
        self.tokenizer.end();
    }

    /// Returns the attributes of anchors found since the last call
    pub fn take_anchors(&mut self) -> Vec<Vec<Attribute>> {
        std::mem::take(&mut self.tokenizer.sink.anchors)
    }

    /// Returns why the scan stopped early, if it did
    pub fn error(&self) -> Option<ScanError> {
        let sink = &self.tokenizer.sink;
        if let Some(limit) = sink.oversized {
            return Some(ScanError::TokenTooLarge(limit));
        }
        sink.truncated.clone().map(ScanError::Truncated)
    }

    /// Removes the longest decodable prefix of the carried bytes
    fn take_decodable(&mut self) -> String {
        let mut text = String::new();

        loop {
            match std::str::from_utf8(&self.carry) {
                Ok(valid) => {
                    text.push_str(valid);
                    self.carry.clear();
                    return text;
                }
                Err(e) => {
                    let valid_len = e.valid_up_to();
                    // Valid by construction
                    text.push_str(&String::from_utf8_lossy(&self.carry[..valid_len]));

                    match e.error_len() {
                        // Incomplete sequence at the end; wait for more bytes
                        None => {
                            self.carry.drain(..valid_len);
                            return text;
                        }
                        Some(bad) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.carry.drain(..valid_len + bad);
                        }
                    }
                }
            }
        }
    }
}
