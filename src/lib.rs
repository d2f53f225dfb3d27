//! 以字符串为键的服务容器
//!
//! 条目可以是现成的实例、工厂或提供者，键之间可以声明多跳别名，
//! 实例是否缓存（共享）可按键单独设置，也可以使用容器级默认值。
//!
//! ```
//! use keyed_container::{Container, FactoryError};
//!
//! let container = Container::new();
//! container.service("db.url", "postgres://localhost/app".to_string())?;
//! container.factory("db", |c: &Container| {
//!     let url = c.get_as::<String>("db.url")?;
//!     Ok::<_, FactoryError>(format!("connection to {url}"))
//! })?;
//! container.alias("database", "db")?;
//!
//! let db = container.get_as::<String>("database")?;
//! assert_eq!(db.as_str(), "connection to postgres://localhost/app");
//! # Ok::<(), keyed_container::ContainerError>(())
//! ```

pub mod config;
pub mod container;
pub mod errors;
pub mod logging;

// Re-export commonly used items for convenience
pub use config::{ContainerConfig, ContainerManifest, ManifestLoader};
pub use container::{Container, ContainerStats, FactoryError, FactoryProvider, Provider, ServiceInstance};
pub use errors::{ConfigError, ContainerError};
