//! OAuth authorize and callback routes
//!
//! `GET /api/ford-oauth/authorize?...` takes the parameters of a generated
//! authorization request, appends them to the vendor authorize URL, swaps
//! the long `state` for a short token and redirects the user to the vendor.
//!
//! `GET /api/ford-oauth/callback?state=<short>&code=...` restores the full
//! state from the [`StateMap`] and redirects to the completion URL of the
//! token manager with every other query parameter intact. An unknown state
//! is rejected with 400 and leaves the map untouched.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use url::Url;

use crate::authorize::{query_value, shorten_authorize_url, AuthorizationServer};
use crate::error::{ApiError, AuthError};
use crate::state_map::StateMap;

/// Route the vendor redirects back to
pub const CALLBACK_PATH: &str = "/api/ford-oauth/callback";

/// Route that starts an authorization
pub const AUTHORIZE_PATH: &str = "/api/ford-oauth/authorize";

/// State shared by the OAuth handlers
#[derive(Clone)]
pub struct CallbackState {
    pub states: Arc<StateMap>,
    /// Where the restored callback is forwarded
    pub completion_url: Url,
    pub authorization: AuthorizationServer,
}

impl CallbackState {
    pub fn new(states: Arc<StateMap>, completion_url: Url) -> Self {
        Self {
            states,
            completion_url,
            authorization: AuthorizationServer::default(),
        }
    }

    pub fn with_authorization_server(mut self, authorization: AuthorizationServer) -> Self {
        self.authorization = authorization;
        self
    }
}

/// Router exposing [`AUTHORIZE_PATH`] and [`CALLBACK_PATH`]
pub fn callback_router(state: CallbackState) -> Router {
    Router::new()
        .route(AUTHORIZE_PATH, get(oauth_authorize))
        .route(CALLBACK_PATH, get(oauth_callback))
        .with_state(state)
}

/// GET /api/ford-oauth/authorize
pub async fn oauth_authorize(
    State(state): State<CallbackState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Redirect, ApiError> {
    let mut generated = Url::parse(&state.authorization.authorize_url).map_err(|e| {
        ApiError::Internal(format!(
            "Invalid authorize URL {}: {}",
            state.authorization.authorize_url, e
        ))
    })?;
    generated.query_pairs_mut().extend_pairs(pairs.iter());

    let shortened = shorten_authorize_url(&state.states, generated.as_str())?;

    tracing::info!(
        pending = state.states.len(),
        "Redirecting to vendor authorization"
    );
    Ok(Redirect::temporary(shortened.as_str()))
}

/// GET /api/ford-oauth/callback
pub async fn oauth_callback(
    State(state): State<CallbackState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Redirect, ApiError> {
    let short_state =
        query_value(&pairs, "state").ok_or(AuthError::MissingQueryParameter("state"))?;

    let Some(full_state) = state.states.take(short_state) else {
        tracing::error!(state = %short_state, "State not found in state map");
        return Err(AuthError::UnknownState(short_state.to_string()).into());
    };

    let mut target = state.completion_url.clone();
    {
        let mut query = target.query_pairs_mut();
        for (key, value) in &pairs {
            if key == "state" {
                query.append_pair(key, &full_state);
            } else {
                query.append_pair(key, value);
            }
        }
    }

    tracing::info!(target_url = %state.completion_url, "Forwarding OAuth callback");
    Ok(Redirect::temporary(target.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> CallbackState {
        CallbackState::new(
            Arc::new(StateMap::new()),
            Url::parse("http://localhost:8123/auth/external/callback").unwrap(),
        )
    }

    async fn call(state: &CallbackState, uri: &str) -> axum::response::Response {
        callback_router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &axum::response::Response) -> Url {
        Url::parse(response.headers()[header::LOCATION].to_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_known_state_redirects_with_full_state() {
        let state = test_state();
        let short = state.states.insert("full-state-value");

        let response = call(
            &state,
            &format!("{}?code=abc&state={}", CALLBACK_PATH, short),
        )
        .await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(
            location,
            "http://localhost:8123/auth/external/callback?code=abc&state=full-state-value"
        );
        assert!(state.states.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_state_is_rejected() {
        let state = test_state();
        let pending = state.states.insert("pending");

        let response = call(&state, &format!("{}?code=abc&state=bogus", CALLBACK_PATH)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "bad_request");
        assert_eq!(json["message"], "Invalid state parameter: bogus");
        assert_eq!(state.states.len(), 1);
        assert!(state.states.contains(&pending));
    }

    #[tokio::test]
    async fn test_missing_state_is_rejected() {
        let state = test_state();
        let response = call(&state, &format!("{}?code=abc", CALLBACK_PATH)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_state_is_single_use() {
        let state = test_state();
        let short = state.states.insert("once");
        let uri = format!("{}?state={}", CALLBACK_PATH, short);

        assert_eq!(call(&state, &uri).await.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(call(&state, &uri).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_authorize_then_callback_restores_state() {
        let state = test_state().with_authorization_server(AuthorizationServer {
            authorize_url: "https://vendor.example/auth/init".to_string(),
            token_url: "https://vendor.example/token".to_string(),
        });
        let full_state = "s".repeat(500);

        let mut authorize = Url::parse("http://bridge.local").unwrap();
        authorize.set_path(AUTHORIZE_PATH);
        authorize
            .query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", "client-1")
            .append_pair("redirect_uri", "https://my.home/auth/external/callback")
            .append_pair("state", &full_state);
        let uri = format!("{}?{}", AUTHORIZE_PATH, authorize.query().unwrap());

        let response = call(&state, &uri).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let vendor = location(&response);
        assert_eq!(vendor.host_str(), Some("vendor.example"));
        assert_eq!(vendor.path(), "/auth/init");
        let pairs: Vec<(String, String)> = vendor
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(query_value(&pairs, "client_id"), Some("client-1"));
        assert_eq!(
            query_value(&pairs, "redirect_uri"),
            Some("https://my.home/api/ford-oauth/callback")
        );
        let short = query_value(&pairs, "state").unwrap().to_string();
        assert_ne!(short, full_state);
        assert_eq!(state.states.len(), 1);

        let response = call(&state, &format!("{}?code=xyz&state={}", CALLBACK_PATH, short)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let completion = location(&response);
        let restored: Vec<(String, String)> = completion
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(query_value(&restored, "state"), Some(full_state.as_str()));
        assert_eq!(query_value(&restored, "code"), Some("xyz"));
        assert!(state.states.is_empty());
    }

    #[tokio::test]
    async fn test_authorize_without_state_is_rejected() {
        let state = test_state();
        let response = call(
            &state,
            &format!(
                "{}?redirect_uri=https%3A%2F%2Fmy.home%2Fcb&client_id=c",
                AUTHORIZE_PATH
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.states.is_empty());
    }
}
