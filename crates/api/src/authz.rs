//! API-side authorization guard.
//!
//! Enforces permissions at the route boundary, keeping domain and infra
//! auth-agnostic.

use solvendo_auth::{AuthzError, Permission, Principal, Role, TenantMembership, authorize};

use crate::context::RequestContext;

/// Check a single required permission in the current request context.
pub fn require(ctx: &RequestContext, permission: &Permission) -> Result<(), AuthzError> {
    let membership = TenantMembership {
        tenant_id: ctx.tenant_id(),
        roles: ctx.roles().to_vec(),
        permissions: permissions_from_roles(ctx.roles()),
    };

    let principal = Principal {
        principal_id: ctx.principal_id(),
        active_tenant_id: ctx.tenant_id(),
        membership,
    };

    authorize(&principal, permission)
}

/// Minimal role→permission mapping.
///
/// This is intentionally simple until a real policy source exists (e.g.
/// DB-backed).
fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.contains(&Role::ADMIN) {
        return vec![Permission::ALL];
    }

    let mut permissions = Vec::new();
    if roles.contains(&Role::DUNNING_OPERATOR) {
        permissions.extend([
            Permission::SEGMENTS_WRITE,
            Permission::DLQ_WRITE,
            Permission::CONFIG_WRITE,
        ]);
    }
    permissions
}

#[cfg(test)]
mod tests {
    use super::*;
    use solvendo_auth::PrincipalId;
    use solvendo_core::TenantId;

    fn ctx(roles: Vec<&str>) -> RequestContext {
        RequestContext::new(
            TenantId::new(),
            PrincipalId::new(),
            roles.into_iter().map(|r| Role::new(r.to_string())).collect(),
        )
    }

    #[test]
    fn admin_can_do_anything() {
        let ctx = ctx(vec!["admin"]);
        assert!(require(&ctx, &Permission::CONFIG_WRITE).is_ok());
    }

    #[test]
    fn operator_covers_dunning_surfaces_only() {
        let ctx = ctx(vec!["dunning_operator"]);
        assert!(require(&ctx, &Permission::DLQ_WRITE).is_ok());
        assert!(require(&ctx, &Permission::new("ledger.post")).is_err());
    }

    #[test]
    fn unknown_role_gets_nothing() {
        let ctx = ctx(vec!["viewer"]);
        assert!(require(&ctx, &Permission::SEGMENTS_WRITE).is_err());
    }
}
