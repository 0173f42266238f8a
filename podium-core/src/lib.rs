// Core library for the Podium framework
// Path resolution, the five-phase request lifecycle, and controller dispatch

pub mod application;
pub mod context;
pub mod controller;
pub mod error;
pub mod hooks;
pub mod http;
pub mod ignition;
pub mod route;
pub mod runtime;
pub mod status;

// Re-export commonly used types
pub use application::*;
pub use context::*;
pub use controller::*;
pub use error::*;
pub use hooks::*;
pub use http::*;
pub use ignition::*;
pub use route::*;
pub use runtime::*;
pub use status::*;
