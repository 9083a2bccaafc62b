//! fcon-auth - OAuth plumbing for the FordConnect bridge
//!
//! - [`TokenProvider`]: the "give me a valid bearer token" capability the
//!   coordinator depends on. Refreshing is somebody else's job.
//! - [`StateMap`] and [`shorten_authorize_url`]: replace the long OAuth
//!   `state` with a short token before sending the user to the vendor.
//! - [`callback_router`]: the authorize entry point and the route the vendor
//!   redirects back to.

pub mod authorize;
pub mod callback;
pub mod error;
pub mod state_map;
pub mod token;

pub use authorize::{
    shorten_authorize_url, AuthorizationServer, DEFAULT_AUTHORIZE_URL, DEFAULT_TOKEN_URL,
};
pub use callback::{callback_router, CallbackState, AUTHORIZE_PATH, CALLBACK_PATH};
pub use error::{ApiError, AuthError, AuthResult};
pub use state_map::{StateMap, DEFAULT_STATE_TTL};
pub use token::{FileTokenProvider, StaticToken, StoredToken, TokenProvider};
