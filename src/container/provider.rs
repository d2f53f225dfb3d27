//! 服务提供者
//!
//! 提供者只有一个操作：在拿到容器只读视图的前提下产出实例。
//! 按约定它不应在产出过程中注册新条目。

use super::{Container, ServiceInstance};
use crate::errors::ContainerError;
use std::sync::Arc;

/// 服务提供者trait
pub trait Provider: Send + Sync {
    /// 产出服务实例，可通过 `container.get` 解析自身依赖
    fn provide(&self, container: &Container) -> Result<ServiceInstance, ContainerError>;
}

/// 装箱的工厂错误
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

/// 函数式提供者 - 把普通闭包包装成 [`Provider`]
pub struct FactoryProvider<F, T> {
    key: String,
    factory_fn: F,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<F, T> FactoryProvider<F, T>
where
    F: Fn(&Container) -> Result<T, FactoryError> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new(key: impl Into<String>, factory_fn: F) -> Self {
        Self {
            key: key.into(),
            factory_fn,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<F, T> Provider for FactoryProvider<F, T>
where
    F: Fn(&Container) -> Result<T, FactoryError> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn provide(&self, container: &Container) -> Result<ServiceInstance, ContainerError> {
        let service = (self.factory_fn)(container).map_err(|source| {
            // 容器自身的错误原样透传
            match source.downcast::<ContainerError>() {
                Ok(inner) => *inner,
                Err(source) => ContainerError::ProviderFailed {
                    key: self.key.clone(),
                    source,
                },
            }
        })?;
        Ok(Arc::new(service))
    }
}
