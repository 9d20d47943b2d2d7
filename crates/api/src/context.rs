use solvendo_auth::{PrincipalId, Role};
use solvendo_core::TenantId;

/// Authenticated request context: tenant boundary plus principal identity.
///
/// Inserted by the auth middleware; must be present for all domain routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    tenant_id: TenantId,
    principal_id: PrincipalId,
    roles: Vec<Role>,
}

impl RequestContext {
    pub fn new(tenant_id: TenantId, principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        Self {
            tenant_id,
            principal_id,
            roles,
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
