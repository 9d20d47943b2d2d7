use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are dotted strings scoping a surface and an action. The dunning
/// surfaces are named here so callers and policy code agree on the spelling.
/// The wildcard `"*"` grants everything within the tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Grant-all within the active tenant.
    pub const ALL: Permission = Permission(Cow::Borrowed("*"));

    /// Create and update dunning segments.
    pub const SEGMENTS_WRITE: Permission = Permission(Cow::Borrowed("dunning.segments.write"));

    /// Add, retry, resolve, and requeue DLQ messages.
    pub const DLQ_WRITE: Permission = Permission(Cow::Borrowed("dunning.dlq.write"));

    /// Update the tenant dunning configuration.
    pub const CONFIG_WRITE: Permission = Permission(Cow::Borrowed("dunning.config.write"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }

    /// Whether holding `self` satisfies `required`.
    pub fn grants(&self, required: &Permission) -> bool {
        self.is_wildcard() || self == required
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
