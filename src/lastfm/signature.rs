//! Last.fm request signing.
//!
//! Last.fm authenticates write calls with an `api_sig` parameter: the MD5
//! digest of every other parameter, sorted by key and concatenated as
//! `key` + `value` with no separators, followed by the shared secret.
//! `format` and `callback` are never part of the signed set.

/// Computes the `api_sig` value for a parameter set.
///
/// Keys are sorted by their raw bytes, so `"Z"` sorts before `"a"`. The
/// caller's sequence is only read; the wire order of the request body is
/// independent of the canonical order used here.
///
/// # Example
///
/// ```
/// use scrobble_relay::lastfm::api_signature;
///
/// let sig = api_signature([("method", "auth.getToken"), ("api_key", "k")], "s");
/// assert_eq!(sig.len(), 32);
/// ```
#[must_use]
pub fn api_signature<'a, I>(params: I, secret: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut sorted: Vec<(&str, &str)> = params.into_iter().collect();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut canonical = String::new();
    for (key, value) in sorted {
        canonical.push_str(key);
        canonical.push_str(value);
    }
    canonical.push_str(secret);

    format!("{:x}", md5::compute(canonical.as_bytes()))
}
