//! OAuth 2.0 session for the Yahoo Fantasy Sports API
//!
//! - `token`: the persisted token and the token-endpoint response
//! - `session`: authorization-code exchange, refresh and request authorization

pub mod session;
pub mod token;


pub use session::{OAuthEndpoints, OAuthSession, REFRESH_MARGIN_SECS};
pub use token::{Token, TokenResponse, TokenStore};
