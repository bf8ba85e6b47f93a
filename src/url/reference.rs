use crate::{UrlError, UrlResult};

/// An href parsed under request-URI rules
///
/// Request-URI rules are stricter than general reference resolution: a
/// reference without a scheme must be a rooted path (`/about` parses,
/// `about.html` does not), and `#` has no special meaning. Hosts keep
/// their original case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUri {
    scheme: Option<String>,
    opaque: Option<String>,
    userinfo: Option<String>,
    host: String,
    path: String,
    query: Option<String>,
}

impl RequestUri {
    /// Returns true if the reference carries a scheme
    pub fn is_absolute(&self) -> bool {
        self.scheme.is_some()
    }

    /// The lowercased scheme, if any
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Opaque data following `scheme:` when no `/` comes next (`mailto:a@b`)
    pub fn opaque(&self) -> Option<&str> {
        self.opaque.as_deref()
    }

    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    /// The authority host including any port, empty when absent
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The host with any valid port and IPv6 brackets removed
    ///
    /// # Examples
    ///
    /// ```
    /// use link_ripper::url::parse_request_uri;
    ///
    /// let uri = parse_request_uri("https://Example.com:8443/x").unwrap();
    /// assert_eq!(uri.hostname(), "Example.com");
    ///
    /// let uri = parse_request_uri("http://[::1]:80/").unwrap();
    /// assert_eq!(uri.hostname(), "::1");
    ///
    /// let uri = parse_request_uri("/about").unwrap();
    /// assert_eq!(uri.hostname(), "");
    /// ```
    pub fn hostname(&self) -> &str {
        let mut host = self.host.as_str();

        if let Some(colon) = host.rfind(':') {
            if valid_optional_port(&host[colon..]) {
                host = &host[..colon];
            }
        }

        if host.starts_with('[') && host.ends_with(']') && host.len() >= 2 {
            host = &host[1..host.len() - 1];
        }

        host
    }
}

/// Parses a string as a request URI
///
/// # Parsing Steps
///
/// 1. Reject empty input and ASCII control characters
/// 2. Split off a scheme (`[A-Za-z][A-Za-z0-9+.-]*:`); a leading `:` is an error
/// 3. Split off the query at the first `?`
/// 4. Without a leading `/`: opaque data if a scheme was found, otherwise an error
/// 5. With a scheme and a leading `//`: parse the authority (userinfo, host, port)
/// 6. Validate `%` escapes in the remaining path
///
/// # Arguments
///
/// * `raw` - The href or target string
///
/// # Returns
///
/// * `Ok(RequestUri)` - The parsed reference
/// * `Err(UrlError)` - The string is not a valid request URI
pub fn parse_request_uri(raw: &str) -> UrlResult<RequestUri> {
    if raw.bytes().any(|b| b < 0x20 || b == 0x7f) {
        return Err(UrlError::ControlCharacter);
    }

    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    let (scheme, rest) = split_scheme(raw)?;
    let scheme = scheme.map(|s| s.to_ascii_lowercase());

    let (rest, query) = match rest.split_once('?') {
        Some((before, after)) => (before, Some(after.to_string())),
        None => (rest, None),
    };

    let mut uri = RequestUri {
        scheme,
        opaque: None,
        userinfo: None,
        host: String::new(),
        path: String::new(),
        query,
    };

    if !rest.starts_with('/') {
        if uri.scheme.is_some() {
            uri.opaque = Some(rest.to_string());
            return Ok(uri);
        }
        return Err(UrlError::NotRequestUri(raw.to_string()));
    }

    let mut path = rest;
    if uri.scheme.is_some() && rest.starts_with("//") {
        let after_slashes = &rest[2..];
        let (authority, remainder) = match after_slashes.find('/') {
            Some(i) => after_slashes.split_at(i),
            None => (after_slashes, ""),
        };
        let (userinfo, host) = parse_authority(authority)?;
        uri.userinfo = userinfo;
        uri.host = host;
        path = remainder;
    }

    check_escapes(path)?;
    uri.path = path.to_string();

    Ok(uri)
}

/// Splits a leading scheme from the input, if one is present
fn split_scheme(raw: &str) -> UrlResult<(Option<&str>, &str)> {
    for (i, b) in raw.bytes().enumerate() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' => {}
            b'0'..=b'9' | b'+' | b'-' | b'.' => {
                if i == 0 {
                    return Ok((None, raw));
                }
            }
            b':' => {
                if i == 0 {
                    return Err(UrlError::MissingScheme);
                }
                return Ok((Some(&raw[..i]), &raw[i + 1..]));
            }
            _ => return Ok((None, raw)),
        }
    }

    Ok((None, raw))
}

fn parse_authority(authority: &str) -> UrlResult<(Option<String>, String)> {
    let (userinfo, host) = match authority.rfind('@') {
        Some(i) => (Some(&authority[..i]), &authority[i + 1..]),
        None => (None, authority),
    };

    if let Some(info) = userinfo {
        if !info.bytes().all(valid_userinfo_byte) {
            return Err(UrlError::InvalidUserinfo);
        }
        check_escapes(info)?;
    }

    let host = parse_host(host)?;

    Ok((userinfo.map(str::to_string), host))
}

fn parse_host(host: &str) -> UrlResult<String> {
    if host.starts_with('[') {
        let close = host
            .rfind(']')
            .ok_or_else(|| UrlError::InvalidHost(format!("missing ']' in host {}", host)))?;
        let port = &host[close + 1..];
        if !valid_optional_port(port) {
            return Err(UrlError::InvalidPort(port.to_string()));
        }
    } else if let Some(colon) = host.rfind(':') {
        let port = &host[colon..];
        if !valid_optional_port(port) {
            return Err(UrlError::InvalidPort(port.to_string()));
        }
    }

    let bytes = host.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                if !has_hex_pair(&bytes[i + 1..]) {
                    return Err(UrlError::InvalidEscape(host.to_string()));
                }
                i += 3;
                continue;
            }
            b if b < 0x80 && !valid_host_byte(b) => {
                return Err(UrlError::InvalidHost(host.to_string()));
            }
            _ => {}
        }
        i += 1;
    }

    Ok(host.to_string())
}

/// Returns true for an empty string or `:` followed only by digits
fn valid_optional_port(port: &str) -> bool {
    if port.is_empty() {
        return true;
    }

    match port.strip_prefix(':') {
        Some(digits) => digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn valid_host_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b':'
                | b'['
                | b']'
                | b'<'
                | b'>'
                | b'"'
                | b'-'
                | b'_'
                | b'.'
                | b'~'
        )
}

fn valid_userinfo_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'.'
                | b'_'
                | b':'
                | b'~'
                | b'!'
                | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b'%'
                | b'@'
        )
}

/// Checks that every `%` is followed by two hex digits
fn check_escapes(s: &str) -> UrlResult<()> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if !has_hex_pair(&bytes[i + 1..]) {
                let end = (i + 3).min(bytes.len());
                return Err(UrlError::InvalidEscape(
                    String::from_utf8_lossy(&bytes[i..end]).into_owned(),
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn has_hex_pair(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0].is_ascii_hexdigit() && bytes[1].is_ascii_hexdigit()
}
