//! 条目存储：服务实例、提供者与共享标志三张独立的表

use super::provider::Provider;
use super::ServiceInstance;
use crate::errors::ContainerError;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct EntryStores {
    services: HashMap<String, ServiceInstance>,
    providers: HashMap<String, Arc<dyn Provider>>,
    shared: HashMap<String, bool>,
}

impl EntryStores {
    /// 已持有实例的键拒绝覆盖
    pub fn ensure_vacant(&self, key: &str) -> Result<(), ContainerError> {
        if self.services.contains_key(key) {
            tracing::warn!(key, "Rejected registration against a key holding an instance");
            return Err(ContainerError::DuplicateInstance {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_service(&mut self, key: String, value: ServiceInstance) -> Result<(), ContainerError> {
        self.ensure_vacant(&key)?;
        self.services.insert(key, value);
        Ok(())
    }

    pub fn set_provider(
        &mut self,
        key: String,
        provider: Arc<dyn Provider>,
    ) -> Result<(), ContainerError> {
        self.ensure_vacant(&key)?;
        self.providers.insert(key, provider);
        Ok(())
    }

    pub fn set_shared(&mut self, key: String, flag: bool) {
        self.shared.insert(key, flag);
    }

    /// 检索过程中的缓存写入；键上已有实例时保留原实例并返回它
    pub fn cache(&mut self, key: &str, value: ServiceInstance) -> ServiceInstance {
        self.services
            .entry(key.to_string())
            .or_insert(value)
            .clone()
    }

    pub fn service(&self, key: &str) -> Option<&ServiceInstance> {
        self.services.get(key)
    }

    pub fn provider(&self, key: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.get(key)
    }

    pub fn shared_flag(&self, key: &str) -> Option<bool> {
        self.shared.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.services.contains_key(key) || self.providers.contains_key(key)
    }

    /// 实例键与提供者键的并集（已排序、去重）
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .services
            .keys()
            .chain(self.providers.keys())
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(value: i32) -> ServiceInstance {
        Arc::new(value)
    }

    #[test]
    fn test_service_key_is_write_once() {
        let mut stores = EntryStores::default();
        stores.set_service("x".to_string(), instance(1)).unwrap();

        let err = stores.set_service("x".to_string(), instance(2)).unwrap_err();
        assert!(matches!(err, ContainerError::DuplicateInstance { ref key } if key == "x"));
        assert_eq!(stores.service("x").unwrap().downcast_ref::<i32>(), Some(&1));
    }

    #[test]
    fn test_shared_flag_overwrites() {
        let mut stores = EntryStores::default();
        assert_eq!(stores.shared_flag("x"), None);

        stores.set_shared("x".to_string(), false);
        stores.set_shared("x".to_string(), true);
        assert_eq!(stores.shared_flag("x"), Some(true));
    }

    #[test]
    fn test_cache_keeps_first_writer() {
        let mut stores = EntryStores::default();
        let first = stores.cache("k", instance(1));
        let second = stores.cache("k", instance(2));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.downcast_ref::<i32>(), Some(&1));
    }

    #[test]
    fn test_keys_merge_instances_and_providers() {
        let mut stores = EntryStores::default();
        stores.set_service("b".to_string(), instance(1)).unwrap();
        stores.set_service("a".to_string(), instance(2)).unwrap();

        assert_eq!(stores.keys(), vec!["a".to_string(), "b".to_string()]);
        assert!(stores.contains("a"));
        assert!(!stores.contains("c"));
    }
}
