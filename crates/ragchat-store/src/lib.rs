//! Remote session store client for ragchat.
//!
//! - [`http_store::HttpSessionStore`] — the HTTP implementation of
//!   [`ragchat_core::store::SessionStore`].

pub mod http_store;

pub use http_store::HttpSessionStore;
