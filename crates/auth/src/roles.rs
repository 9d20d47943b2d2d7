use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// Roles carried in tokens are opaque strings at this layer; mapping them to
/// permissions happens in the policy layer. The two roles the dunning service
/// recognizes today are named here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Full access within the tenant.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));

    /// Day-to-day dunning operations: segments, DLQ, config.
    pub const DUNNING_OPERATOR: Role = Role(Cow::Borrowed("dunning_operator"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
