//! Authorization server endpoints and authorize-URL rewriting

use serde::{Deserialize, Serialize};
use url::Url;

use crate::callback::CALLBACK_PATH;
use crate::error::{AuthError, AuthResult};
use crate::state_map::StateMap;

pub const DEFAULT_AUTHORIZE_URL: &str = "https://api.vehicle.ford.com/fcon-public/v1/auth/init";
pub const DEFAULT_TOKEN_URL: &str = "https://api.vehicle.ford.com/dah2vb2cprod.onmicrosoft.com/oauth2/v2.0/token?p=B2C_1A_FCON_AUTHORIZE";

/// OAuth2 endpoints of the vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationServer {
    pub authorize_url: String,
    pub token_url: String,
}

impl Default for AuthorizationServer {
    fn default() -> Self {
        Self {
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

/// Rewrite a generated authorize URL for the vendor's length limit.
///
/// The `state` query parameter is replaced by a short token registered in
/// `states`, and the `redirect_uri` is pointed at [`CALLBACK_PATH`] on the
/// same host. Every other query parameter is preserved in order.
pub fn shorten_authorize_url(states: &StateMap, authorize_url: &str) -> AuthResult<Url> {
    let mut url = Url::parse(authorize_url)?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let full_state = query_value(&pairs, "state").ok_or(AuthError::MissingQueryParameter("state"))?;
    let redirect_uri =
        query_value(&pairs, "redirect_uri").ok_or(AuthError::MissingQueryParameter("redirect_uri"))?;

    let mut callback = Url::parse(redirect_uri)?;
    callback.set_path(CALLBACK_PATH);
    callback.set_query(None);

    let short = states.insert(full_state);

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &pairs {
            match key.as_str() {
                "state" => query.append_pair(key, &short),
                "redirect_uri" => query.append_pair(key, callback.as_str()),
                _ => query.append_pair(key, value),
            };
        }
    }

    Ok(url)
}

pub(crate) fn query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
