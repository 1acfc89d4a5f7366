//! Image address normalization.
//!
//! Turns whatever the page carries in `src` into one canonical form:
//! absolute, fragment-free.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use scanfill_core::ScanfillError;

/// An address that already names a scheme is left untouched.
static SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// Absolutize a raw image address against the page URL and strip any
/// trailing fragment.
///
/// Rules, in order: scheme present → unchanged; root-relative → page
/// origin; `./`-relative and bare-relative → the page's current directory.
pub fn absolutize(raw: &str, page_url: &str) -> Result<String, ScanfillError> {
    let resolved = if SCHEME_RE.is_match(raw) {
        raw.to_string()
    } else {
        let page = Url::parse(page_url)
            .map_err(|e| ScanfillError::Page(format!("unparsable page URL {page_url}: {e}")))?;
        let origin = page.origin().ascii_serialization();
        if let Some(rest) = raw.strip_prefix('/') {
            format!("{origin}/{rest}")
        } else {
            let rest = raw.strip_prefix("./").unwrap_or(raw);
            format!("{origin}{}{rest}", directory_of(&page))
        }
    };

    Ok(resolved.split('#').next().unwrap_or_default().to_string())
}

/// The page path up to and including the last `/`.
fn directory_of(page: &Url) -> String {
    let path = page.path();
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}
