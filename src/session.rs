//! Kernel session WebSocket URLs.

use crate::{naming, ColchartError, Result};
use url::form_urlencoded;
use url::Url;

/// WebSocket endpoint of a kernel session served under `base`
///
/// `https` bases map to `wss`, anything else to `ws`. The page's query
/// string is carried over with `session_id` set, replacing an existing value
/// in place.
pub fn ws_url(base: &Url, page_query: &str, session_id: &str) -> Result<Url> {
    let mut url = base.clone();

    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme).map_err(|_| {
        ColchartError::ConfigError(format!("Cannot derive a WebSocket URL from '{}'", base))
    })?;

    let path = format!("{}/ws", base.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (key, value) in form_urlencoded::parse(page_query.trim_start_matches('?').as_bytes()) {
        if key == naming::SESSION_ID_PARAM {
            if !replaced {
                pairs.push((key.into_owned(), session_id.to_string()));
                replaced = true;
            }
            continue;
        }
        pairs.push((key.into_owned(), value.into_owned()));
    }
    if !replaced {
        pairs.push((naming::SESSION_ID_PARAM.to_string(), session_id.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    tracing::trace!(%url, "built session url");
    Ok(url)
}
