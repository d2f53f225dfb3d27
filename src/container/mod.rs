//! 服务容器
//!
//! - `store`：实例、提供者、共享标志三张表
//! - `alias`：别名图与终端键解析
//! - `registry`：容器门面与检索逻辑
//! - `provider`：提供者trait与闭包适配器

pub(crate) mod alias;
pub mod provider;
mod registry;
mod store;

use std::any::Any;
use std::sync::Arc;

/// 类型擦除后的服务实例，容器按原样保存和返回
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

pub use provider::{FactoryError, FactoryProvider, Provider};
pub use registry::{Container, ContainerStats};
