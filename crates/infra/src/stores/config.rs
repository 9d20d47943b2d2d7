//! Per-tenant engine configuration storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use solvendo_core::{DomainResult, TenantId};
use solvendo_dunning::{ConfigPatch, DunningConfig};

pub trait ConfigStore: Send + Sync {
    /// Current config for the tenant; defaults apply until a tenant writes.
    fn get(&self, tenant_id: TenantId) -> DomainResult<DunningConfig>;

    /// Validated partial merge; returns the stored result.
    fn update(&self, tenant_id: TenantId, patch: ConfigPatch) -> DomainResult<DunningConfig>;
}

/// In-memory config store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    configs: RwLock<HashMap<TenantId, DunningConfig>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get(&self, tenant_id: TenantId) -> DomainResult<DunningConfig> {
        let configs = self.configs.read().unwrap();
        Ok(configs.get(&tenant_id).cloned().unwrap_or_default())
    }

    fn update(&self, tenant_id: TenantId, patch: ConfigPatch) -> DomainResult<DunningConfig> {
        let mut configs = self.configs.write().unwrap();
        let current = configs.get(&tenant_id).cloned().unwrap_or_default();
        let next = current.merged(patch)?;
        configs.insert(tenant_id, next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_until_first_write() {
        let store = InMemoryConfigStore::new();
        let tenant = TenantId::new();
        assert_eq!(store.get(tenant).unwrap(), DunningConfig::default());

        let patch = ConfigPatch {
            max_retries: Some(3),
            ..Default::default()
        };
        let updated = store.update(tenant, patch).unwrap();
        assert_eq!(updated.max_retries, 3);
        assert_eq!(store.get(tenant).unwrap().max_retries, 3);
    }

    #[test]
    fn invalid_patch_leaves_config_untouched() {
        let store = InMemoryConfigStore::new();
        let tenant = TenantId::new();
        let patch = ConfigPatch {
            retry_intervals: Some(vec![]),
            ..Default::default()
        };
        assert!(store.update(tenant, patch).is_err());
        assert_eq!(store.get(tenant).unwrap(), DunningConfig::default());
    }

    #[test]
    fn configs_are_per_tenant() {
        let store = InMemoryConfigStore::new();
        let a = TenantId::new();
        let patch = ConfigPatch {
            enabled: Some(false),
            ..Default::default()
        };
        store.update(a, patch).unwrap();
        assert!(store.get(TenantId::new()).unwrap().enabled);
    }
}
