//! Requesting user and the permission rules applied to every resource.

use anyhow::Result;
use bifrost_base::error::BifrostError;
use bifrost_base::permissions::{PermissionAction, Permissions};
use chrono::{DateTime, Utc};
use infra_utils::infra::cache::MokaCacheImpl;
use model::{CoreGroup, CoreUser};
use std::sync::Arc;

/// which organizations' rows a requester may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationScope {
    All,
    Only(i64),
    /// user without organization
    Nothing,
}

impl OrganizationScope {
    pub fn contains(&self, organization_id: Option<i64>) -> bool {
        match self {
            OrganizationScope::All => true,
            OrganizationScope::Only(id) => organization_id == Some(*id),
            OrganizationScope::Nothing => false,
        }
    }
}

/// authenticated user with the groups it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Requester {
    pub user: CoreUser,
    pub groups: Vec<CoreGroup>,
}

impl Requester {
    pub fn new(user: CoreUser, groups: Vec<CoreGroup>) -> Self {
        Self { user, groups }
    }

    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn is_superuser(&self) -> bool {
        self.user.data.is_superuser
    }

    pub fn organization_id(&self) -> Option<i64> {
        self.user.data.organization_id
    }

    pub fn scope(&self) -> OrganizationScope {
        if self.is_superuser() {
            OrganizationScope::All
        } else {
            match self.organization_id() {
                Some(id) => OrganizationScope::Only(id),
                None => OrganizationScope::Nothing,
            }
        }
    }

    /// superuser, or an org-level / global group granting the action
    pub fn has_permission(&self, action: PermissionAction) -> bool {
        self.is_superuser()
            || self
                .groups
                .iter()
                .filter(|g| g.data.is_org_level || g.data.is_global)
                .any(|g| Permissions::from_value(g.data.permissions).has(action))
    }

    pub fn authorize(&self, action: PermissionAction) -> Result<()> {
        if self.has_permission(action) {
            Ok(())
        } else {
            Err(BifrostError::PermissionDenied(
                "You do not have permission to perform this action.".to_string(),
            )
            .into())
        }
    }

    /// organization to store a new row in: the requested one must be the
    /// requester's own unless superuser
    pub fn resolve_organization(&self, requested: Option<i64>) -> Result<Option<i64>> {
        match (self.is_superuser(), requested) {
            (true, r) => Ok(r),
            (false, None) => Ok(self.organization_id()),
            (false, Some(r)) if Some(r) == self.organization_id() => Ok(Some(r)),
            (false, Some(_)) => Err(BifrostError::PermissionDenied(
                "Cannot use another organization.".to_string(),
            )
            .into()),
        }
    }
}

/// resolved bearer token (cached until the token expires or the cache ttl)
#[derive(Debug, Clone)]
pub struct AuthenticatedToken {
    pub requester: Requester,
    pub expires: DateTime<Utc>,
}

/// Resolved bearer tokens keyed by token. One instance is shared by the
/// apps resolving tokens and the apps changing users or groups.
pub type TokenCache = MokaCacheImpl<Arc<String>, AuthenticatedToken>;

pub trait UseTokenCache {
    fn token_cache(&self) -> &TokenCache;

    /// drop every resolved token (after user or group changes)
    fn clear_token_cache(&self) {
        self.token_cache().cache().invalidate_all();
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use bifrost_base::permissions::{PERMISSIONS_ORG_ADMIN, PERMISSIONS_VIEW_ONLY};
    use chrono::Utc;
    use model::{CoreGroupData, CoreUserData};
    use uuid::Uuid;

    pub fn user(organization_id: Option<i64>, is_superuser: bool) -> CoreUser {
        let now = Utc::now();
        CoreUser {
            id: 1,
            core_user_uuid: Uuid::new_v4(),
            data: CoreUserData {
                username: "requester".to_string(),
                organization_id,
                is_superuser,
                is_active: true,
                ..Default::default()
            },
            password: String::new(),
            core_groups: vec![],
            last_login: None,
            date_joined: now,
            create_date: now,
            edit_date: now,
        }
    }

    pub fn group(permissions: i32, is_org_level: bool, is_global: bool) -> CoreGroup {
        let now = Utc::now();
        CoreGroup {
            id: 10,
            uuid: Uuid::new_v4(),
            data: CoreGroupData {
                name: "g".to_string(),
                organization_id: Some(100),
                is_global,
                is_org_level,
                permissions,
            },
            workflowlevel1s: vec![],
            workflowlevel2s: vec![],
            create_date: now,
            edit_date: now,
        }
    }

    #[test]
    fn test_permission_from_groups() {
        let viewer = Requester::new(
            user(Some(100), false),
            vec![group(PERMISSIONS_VIEW_ONLY, true, false)],
        );
        assert!(viewer.has_permission(PermissionAction::Read));
        assert!(!viewer.has_permission(PermissionAction::Create));
        assert!(viewer.authorize(PermissionAction::Delete).is_err());

        // groups neither org level nor global grant nothing
        let plain = Requester::new(
            user(Some(100), false),
            vec![group(PERMISSIONS_ORG_ADMIN, false, false)],
        );
        assert!(!plain.has_permission(PermissionAction::Read));

        let global = Requester::new(
            user(Some(100), false),
            vec![group(PERMISSIONS_ORG_ADMIN, false, true)],
        );
        assert!(global.has_permission(PermissionAction::Delete));

        let superuser = Requester::new(user(None, true), vec![]);
        assert!(superuser.authorize(PermissionAction::Delete).is_ok());
    }

    #[test]
    fn test_scope() {
        assert_eq!(
            Requester::new(user(Some(5), false), vec![]).scope(),
            OrganizationScope::Only(5)
        );
        assert_eq!(
            Requester::new(user(None, false), vec![]).scope(),
            OrganizationScope::Nothing
        );
        let all = Requester::new(user(Some(5), true), vec![]).scope();
        assert_eq!(all, OrganizationScope::All);
        assert!(all.contains(None));
        assert!(OrganizationScope::Only(5).contains(Some(5)));
        assert!(!OrganizationScope::Only(5).contains(Some(6)));
        assert!(!OrganizationScope::Nothing.contains(None));
    }

    #[test]
    fn test_resolve_organization() -> Result<()> {
        let member = Requester::new(user(Some(5), false), vec![]);
        assert_eq!(member.resolve_organization(None)?, Some(5));
        assert_eq!(member.resolve_organization(Some(5))?, Some(5));
        assert!(member.resolve_organization(Some(6)).is_err());
        let superuser = Requester::new(user(None, true), vec![]);
        assert_eq!(superuser.resolve_organization(Some(6))?, Some(6));
        Ok(())
    }
}
