// Podium - a front-controller web framework with a five-phase request
// lifecycle, path-walking dispatch, pluggable sessions and admin auth.

// Re-export core functionality
pub use podium_core::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use podium_config;

#[cfg(feature = "session")]
pub use podium_session;

#[cfg(feature = "cache")]
pub use podium_cache;

#[cfg(feature = "auth")]
pub use podium_auth;

// Logging is always available
pub use podium_log;
