//! Request signing for the app wire protocol.
//!
//! The signature is a digest over the canonicalized request fields:
//! 1. collect the non-empty fields among `app`, `version`, `timestamp`,
//!    `content`, `method`, `token`;
//! 2. sort field names bytewise ascending;
//! 3. form-urlencode the sorted pairs into one string `s`;
//! 4. md5(`s` + secret), lowercase hex.
//!
//! The same inputs always produce the same signature; an absent field is
//! genuinely absent from the canonical string, not signed as empty. The
//! receiving service recomputes the digest from the decoded form fields.

use std::collections::BTreeMap;

use md5::{Digest, Md5};
use url::form_urlencoded;

/// Wire protocol version, sent and signed as `version`.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Compute the request signature over the canonical field set.
///
/// `method` is omitted from the signed set when empty; `token` is omitted
/// when `None` or empty.
pub fn sign(
    version: &str,
    app_key: &str,
    method: &str,
    timestamp: &str,
    content: &str,
    secret: &str,
    token: Option<&str>,
) -> String {
    let mut fields = BTreeMap::new();
    for (name, value) in [
        ("app", app_key),
        ("version", version),
        ("timestamp", timestamp),
        ("content", content),
        ("method", method),
        ("token", token.unwrap_or("")),
    ] {
        if !value.is_empty() {
            fields.insert(name, value);
        }
    }

    let mut encoder = form_urlencoded::Serializer::new(String::new());
    for (name, value) in &fields {
        encoder.append_pair(name, value);
    }
    let canonical = encoder.finish();

    let digest = Md5::digest(format!("{canonical}{secret}").as_bytes());
    hex::encode(digest)
}
