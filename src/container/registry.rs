//! 容器门面与检索逻辑
//!
//! 所有存储与别名图的修改都在同一把 `RwLock` 下完成；调用提供者时不持有该锁，
//! 因为提供者会回调 [`Container::get`] 解析自身依赖。同一个终端键的提供者调用
//! 通过按键的可重入互斥量串行化，后到的线程在拿到互斥量后复用已缓存的实例。

use super::alias::AliasGraph;
use super::provider::{FactoryError, Provider};
use super::store::EntryStores;
use super::ServiceInstance;
use crate::config::ContainerConfig;
use crate::errors::ContainerError;
use dashmap::DashMap;
use parking_lot::{ReentrantMutex, RwLock};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct ContainerState {
    stores: EntryStores,
    aliases: AliasGraph,
    shared_by_default: bool,
    /// 是否已经应用过配置批次
    configured: bool,
}

impl ContainerState {
    fn is_shared(&self, key: &str) -> bool {
        self.stores
            .shared_flag(key)
            .unwrap_or(self.shared_by_default)
    }
}

/// 单个键的调用互斥量，内部标志表示当前线程正在为该键调用提供者
type KeyGuard = Arc<ReentrantMutex<Cell<bool>>>;

/// 内部容器统计信息（原子计数器）
#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    provider_invocations: AtomicUsize,
}

/// 一次检索在进入提供者阶段前做出的决定
struct Resolution {
    final_key: String,
    is_alias: bool,
    is_key_shared: bool,
    is_requested_key_shared: bool,
    provider: Arc<dyn Provider>,
}

/// 以字符串为键的服务容器
#[derive(Clone)]
pub struct Container {
    state: Arc<RwLock<ContainerState>>,
    in_flight: Arc<DashMap<String, KeyGuard>>,
    stats: Arc<InnerStats>,
}

impl Container {
    /// 创建空容器，默认共享
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ContainerState {
                stores: EntryStores::default(),
                aliases: AliasGraph::default(),
                shared_by_default: true,
                configured: false,
            })),
            in_flight: Arc::new(DashMap::new()),
            stats: Arc::new(InnerStats::default()),
        }
    }

    /// 创建容器并应用首个配置批次
    pub fn with_config(config: ContainerConfig) -> Result<Self, ContainerError> {
        let container = Self::new();
        container.configure(config)?;
        Ok(container)
    }

    /// 应用一个配置批次
    ///
    /// 顺序：服务实例、工厂、提供者、别名、共享标志、默认共享标志。
    /// 批次不是事务性的，出错前已处理的条目会保留。
    pub fn configure(&self, config: ContainerConfig) -> Result<(), ContainerError> {
        let ContainerConfig {
            services,
            factories,
            providers,
            aliases,
            shared,
            shared_by_default,
        } = config;

        let mut state = self.state.write();
        let first_pass = !state.configured;
        state.configured = true;

        for (key, value) in services {
            state.stores.set_service(key, value)?;
        }
        for (key, provider) in factories {
            state.stores.set_provider(key, provider)?;
        }
        for (key, provider) in providers {
            state.stores.set_provider(key, provider)?;
        }

        if !aliases.is_empty() {
            let mut redeclared = false;
            for (alias, target) in &aliases {
                state.stores.ensure_vacant(alias)?;
                redeclared |= state.aliases.declare(alias.clone(), target.clone());
            }
            state.aliases.refresh(&aliases, first_pass, redeclared)?;
        }

        for (key, flag) in shared {
            state.stores.set_shared(key, flag);
        }
        if let Some(flag) = shared_by_default {
            state.shared_by_default = flag;
        }

        tracing::debug!(
            first_pass,
            aliases = aliases.len(),
            shared_by_default = state.shared_by_default,
            "Applied container configuration"
        );
        Ok(())
    }

    /// 注册服务实例
    pub fn service<T>(&self, key: impl Into<String>, value: T) -> Result<(), ContainerError>
    where
        T: Send + Sync + 'static,
    {
        self.configure(ContainerConfig::new().service(key, value))
    }

    /// 注册工厂闭包
    pub fn factory<T, F>(&self, key: impl Into<String>, factory: F) -> Result<(), ContainerError>
    where
        F: Fn(&Container) -> Result<T, FactoryError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.configure(ContainerConfig::new().factory(key, factory))
    }

    pub fn provider(
        &self,
        key: impl Into<String>,
        provider: Arc<dyn Provider>,
    ) -> Result<(), ContainerError> {
        self.configure(ContainerConfig::new().provider(key, provider))
    }

    pub fn alias(
        &self,
        alias: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<(), ContainerError> {
        self.configure(ContainerConfig::new().alias(alias, target))
    }

    pub fn set_shared(&self, key: impl Into<String>, flag: bool) -> Result<(), ContainerError> {
        self.configure(ContainerConfig::new().shared(key, flag))
    }

    pub fn shared_by_default(&self) -> bool {
        self.state.read().shared_by_default
    }

    pub fn set_shared_by_default(&self, flag: bool) {
        self.state.write().shared_by_default = flag;
    }

    /// 键的实际共享行为：单独设置的标志优先，否则取默认值
    pub fn is_shared(&self, key: &str) -> bool {
        self.state.read().is_shared(key)
    }

    /// 检索条目
    pub fn get(&self, key: &str) -> Result<ServiceInstance, ContainerError> {
        self.stats.total_resolutions.fetch_add(1, Ordering::Relaxed);

        let resolution = {
            let state = self.state.read();

            if let Some(instance) = state.stores.service(key) {
                self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key, "Cached instance hit");
                return Ok(instance.clone());
            }

            let final_key = state.aliases.terminal(key)?.into_owned();
            let is_alias = final_key != key;
            let is_key_shared = state.is_shared(&final_key);
            let is_requested_key_shared = state.is_shared(key);

            // 别名指向已缓存的目标：不再调用提供者
            if let Some(instance) = state.stores.service(&final_key) {
                let instance = instance.clone();
                drop(state);
                self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key, final_key = %final_key, cache_alias = is_requested_key_shared, "Alias resolved to cached instance");
                if is_requested_key_shared {
                    return Ok(self.state.write().stores.cache(key, instance));
                }
                return Ok(instance);
            }

            let provider = state
                .stores
                .provider(&final_key)
                .cloned()
                .ok_or_else(|| ContainerError::EntryNotFound {
                    key: final_key.clone(),
                })?;

            Resolution {
                final_key,
                is_alias,
                is_key_shared,
                is_requested_key_shared,
                provider,
            }
        };

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        self.provide(key, resolution)
    }

    /// 检索并转换为具体类型
    pub fn get_as<T>(&self, key: &str) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        self.get(key)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// 解析后的键上是否存在实例或提供者，不会触发实例化
    pub fn has(&self, key: &str) -> bool {
        let state = self.state.read();
        match state.aliases.terminal(key) {
            Ok(final_key) => state.stores.contains(&final_key),
            Err(e) => {
                tracing::debug!(key, error = %e, "Alias resolution failed during lookup");
                false
            }
        }
    }

    /// 所有实例键与提供者键
    pub fn keys(&self) -> Vec<String> {
        self.state.read().stores.keys()
    }

    /// 已解析的别名（别名, 终端键）
    pub fn aliases(&self) -> Vec<(String, String)> {
        self.state.read().aliases.resolved_pairs()
    }

    fn provide(&self, requested: &str, resolution: Resolution) -> Result<ServiceInstance, ContainerError> {
        let Resolution {
            final_key,
            is_alias,
            is_key_shared,
            is_requested_key_shared,
            provider,
        } = resolution;

        let guard = self.key_guard(&final_key);
        let in_progress = guard.lock();
        if in_progress.get() {
            return Err(ContainerError::CircularDependency { key: final_key });
        }

        // 等待期间其他线程可能已经完成创建
        let cache_requested = is_alias && is_requested_key_shared;
        if cache_requested {
            if let Some(instance) = self.state.read().stores.service(requested).cloned() {
                return Ok(instance);
            }
        }
        if is_key_shared {
            let cached = self.state.read().stores.service(&final_key).cloned();
            if let Some(instance) = cached {
                if cache_requested {
                    return Ok(self.state.write().stores.cache(requested, instance));
                }
                return Ok(instance);
            }
        }

        let instance = {
            let _marker = InProgress::enter(&in_progress);
            tracing::debug!(key = requested, final_key = %final_key, is_key_shared, "Invoking provider");
            provider.provide(self)?
        };
        self.stats.provider_invocations.fetch_add(1, Ordering::Relaxed);

        let mut state = self.state.write();
        let instance = if is_key_shared {
            state.stores.cache(&final_key, instance)
        } else {
            instance
        };
        if cache_requested {
            return Ok(state.stores.cache(requested, instance));
        }

        Ok(instance)
    }

    fn key_guard(&self, key: &str) -> KeyGuard {
        self.in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(ReentrantMutex::new(Cell::new(false))))
            .clone()
    }

    /// 获取容器统计信息
    pub fn get_stats(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.stats.cache_misses.load(Ordering::Relaxed),
            provider_invocations: self.stats.provider_invocations.load(Ordering::Relaxed),
        }
    }

    /// 获取缓存命中率
    pub fn get_cache_hit_rate(&self) -> f64 {
        self.get_stats().hit_rate()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("keys", &self.keys())
            .field("aliases", &self.aliases())
            .field("shared_by_default", &self.shared_by_default())
            .finish()
    }
}

/// 提供者调用期间置位，退出（包括 panic 展开）时复位
struct InProgress<'a>(&'a Cell<bool>);

impl<'a> InProgress<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStats {
    pub total_resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub provider_invocations: usize,
}

impl ContainerStats {
    /// 获取总解析次数
    pub fn total(&self) -> usize {
        self.total_resolutions
    }

    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}
