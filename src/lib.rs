//! Photo Magic: a thin gateway in front of the Google Photos Library API.
//!
//! [`auth`] runs the OAuth authorization code flow and holds the single
//! active credential, [`photos`] lists media items with it, and [`server`]
//! exposes both over HTTP.

pub mod auth;
pub mod config;
pub mod logging;
pub mod photos;
pub mod server;
