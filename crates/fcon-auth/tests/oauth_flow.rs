//! Authorize-URL shortening followed by the vendor redirect back

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use fcon_auth::{callback_router, shorten_authorize_url, CallbackState, StateMap};
use tower::ServiceExt;
use url::Url;

#[tokio::test]
async fn test_round_trip_restores_original_state() {
    let states = Arc::new(StateMap::new());
    let full_state = "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.".to_string() + &"a".repeat(400);

    let mut generated = Url::parse(fcon_auth::DEFAULT_AUTHORIZE_URL).unwrap();
    generated
        .query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", "https://home.example/auth/external/callback")
        .append_pair("state", &full_state);

    let shortened = shorten_authorize_url(&states, generated.as_str()).unwrap();
    assert!(shortened.as_str().len() < generated.as_str().len());

    let short = shortened
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let router = callback_router(CallbackState::new(
        states.clone(),
        Url::parse("https://home.example/auth/external/callback").unwrap(),
    ));
    let response = router
        .oneshot(
            Request::builder()
                .uri(format!("/api/ford-oauth/callback?state={}&code=xyz", short))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = Url::parse(response.headers()[header::LOCATION].to_str().unwrap()).unwrap();
    let restored = location
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned());
    assert_eq!(restored, Some(full_state));
    assert!(states.is_empty());
}
