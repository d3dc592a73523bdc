//! URL to site identifier normalization.
//!
//! A site identifier is the origin of a URL with the `https://` prefix
//! removed. Other schemes keep their prefix so `http://example.com` and
//! `example.com` are tracked separately. Path, query, fragment, user info,
//! and default ports are discarded; internationalized hosts are converted to
//! their ASCII (punycode) form. Parsing follows the WHATWG URL standard, so
//! surrounding whitespace and embedded tabs or newlines are ignored.

use tracing::debug;
use url::{Origin, Url};

/// Normalize a full URL into a site identifier.
///
/// Returns `None` for empty input, unparseable URLs, and schemes without a
/// network origin (`file:`, `chrome:`, `about:` ...). Callers should treat
/// `None` as "do not start a session".
///
/// # Examples
///
/// ```
/// use sitetime::tracker::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://mail.google.com/mail/u/0/#inbox").as_deref(),
///     Some("mail.google.com")
/// );
/// assert_eq!(normalize_url("not a url"), None);
/// ```
#[must_use]
pub fn normalize_url(url: &str) -> Option<String> {
    let normalized = site_origin(url);
    if normalized.is_none() {
        debug!(url, "no site identifier for url");
    }
    normalized
}

fn site_origin(url: &str) -> Option<String> {
    let origin = match Url::parse(url).ok()?.origin() {
        Origin::Opaque(_) => return None,
        tuple @ Origin::Tuple(..) => tuple.ascii_serialization(),
    };

    Some(match origin.strip_prefix("https://") {
        Some(host) => host.to_string(),
        None => origin,
    })
}
