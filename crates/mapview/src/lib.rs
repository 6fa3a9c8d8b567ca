pub mod backend;
pub mod config;
pub mod credential;
pub mod error;
pub mod session;

pub use backend::{BackendKind, MapBackend, MapViewport, PlatformBackend, create_backend};
pub use config::*;
pub use credential::*;
pub use error::MapError;
pub use session::*;
