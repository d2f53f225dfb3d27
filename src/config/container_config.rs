//! 配置批次
//!
//! 一个批次就是一袋声明：服务实例、工厂、提供者、别名、共享标志与默认共享标志，
//! 由 [`Container::configure`](crate::Container::configure) 按固定顺序应用。

use crate::container::provider::{FactoryError, FactoryProvider, Provider};
use crate::container::{Container, ServiceInstance};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct ContainerConfig {
    pub(crate) services: HashMap<String, ServiceInstance>,
    pub(crate) factories: HashMap<String, Arc<dyn Provider>>,
    pub(crate) providers: HashMap<String, Arc<dyn Provider>>,
    pub(crate) aliases: HashMap<String, String>,
    pub(crate) shared: HashMap<String, bool>,
    pub(crate) shared_by_default: Option<bool>,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册现成的服务实例
    pub fn service<T>(self, key: impl Into<String>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.service_instance(key, Arc::new(value))
    }

    /// 注册已经类型擦除的实例，实例按原样保存
    pub fn service_instance(mut self, key: impl Into<String>, value: ServiceInstance) -> Self {
        self.services.insert(key.into(), value);
        self
    }

    /// 注册工厂闭包，应用时包装成提供者
    pub fn factory<T, F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Container) -> Result<T, FactoryError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let key = key.into();
        let provider = FactoryProvider::new(key.clone(), factory);
        self.factories.insert(key, Arc::new(provider));
        self
    }

    pub fn provider(mut self, key: impl Into<String>, provider: Arc<dyn Provider>) -> Self {
        self.providers.insert(key.into(), provider);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    pub fn shared(mut self, key: impl Into<String>, flag: bool) -> Self {
        self.shared.insert(key.into(), flag);
        self
    }

    pub fn shared_by_default(mut self, flag: bool) -> Self {
        self.shared_by_default = Some(flag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
            && self.factories.is_empty()
            && self.providers.is_empty()
            && self.aliases.is_empty()
            && self.shared.is_empty()
            && self.shared_by_default.is_none()
    }
}

impl std::fmt::Debug for ContainerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut services: Vec<&String> = self.services.keys().collect();
        services.sort();
        let mut factories: Vec<&String> = self.factories.keys().collect();
        factories.sort();
        let mut providers: Vec<&String> = self.providers.keys().collect();
        providers.sort();

        f.debug_struct("ContainerConfig")
            .field("services", &services)
            .field("factories", &factories)
            .field("providers", &providers)
            .field("aliases", &self.aliases)
            .field("shared", &self.shared)
            .field("shared_by_default", &self.shared_by_default)
            .finish()
    }
}
