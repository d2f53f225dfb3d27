pub mod container_config;
pub mod loader;
pub mod manifest;

// Re-export commonly used types
pub use container_config::ContainerConfig;
pub use loader::{ManifestLoader, SHARED_BY_DEFAULT_ENV};
pub use manifest::ContainerManifest;
