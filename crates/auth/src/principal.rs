use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solvendo_core::{TenantId, impl_uuid_newtype};

use crate::{Permission, Role};

/// Identity of an authenticated principal (human user, service account, etc).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl_uuid_newtype!(PrincipalId, "PrincipalId");

/// A principal's standing within one tenant: the roles the token carried and
/// the permissions the policy layer resolved from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantMembership {
    pub tenant_id: TenantId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl TenantMembership {
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}
