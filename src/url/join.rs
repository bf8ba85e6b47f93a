/// Joins path elements and lexically cleans the result
///
/// Empty elements are ignored, the rest are joined with `/` and passed
/// through [`clean_path`]. This is a plain path operation: it knows nothing
/// about schemes, hosts, queries or fragments, so applying it to a full URL
/// collapses the `//` after the scheme (`https://a.com` becomes
/// `https:/a.com`). Relative links are rewritten with exactly this
/// behavior, and consumers of rip results rely on it.
///
/// # Examples
///
/// ```
/// use link_ripper::url::path_join;
///
/// assert_eq!(
///     path_join(&["https://example.com/x/", "/y"]),
///     "https:/example.com/x/y"
/// );
/// assert_eq!(path_join(&["", ""]), "");
/// ```
pub fn path_join(elements: &[&str]) -> String {
    let joined = elements
        .iter()
        .filter(|e| !e.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        return String::new();
    }

    clean_path(&joined)
}

/// Returns the shortest lexically equivalent path
///
/// # Rules
///
/// 1. Replace multiple slashes with a single slash
/// 2. Drop `.` segments
/// 3. Drop each `..` together with the non-`..` segment before it
/// 4. Drop `..` segments that begin a rooted path
/// 5. Drop any trailing slash
///
/// An empty result becomes `.` (or `/` for a rooted path).
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ => {
                    if !rooted {
                        segments.push("..");
                    }
                }
            },
            _ => segments.push(segment),
        }
    }

    let body = segments.join("/");

    match (rooted, body.is_empty()) {
        (true, _) => format!("/{}", body),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
