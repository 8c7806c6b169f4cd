//! Core users: registration, invitations, password reset and scoped CRUD.

use super::auth::{OrganizationScope, Requester, TokenCache, UseTokenCache};
use super::email::{EmailApp, EmailAppImpl, UseEmailApp};
use super::hook::UseHookApp;
use super::organization::{OrganizationApp, OrganizationAppImpl, UseOrganizationApp};
use super::password::{make_password, validate_password};
use super::workflow::WorkflowCascade;
use super::token::{
    decode_invitation_token, encode_invitation_token, PasswordResetTokenGenerator, TOKEN_NOT_VALID,
};
use super::{is_valid_email, unique_violation_to_validation, url_join, UseSettings};
use anyhow::Result;
use async_trait::async_trait;
use bifrost_base::error::{BifrostError, ValidationErrors};
use bifrost_base::limits::{MAX_INVITATION_EMAILS, MAX_PASSWORD_LENGTH, MIN_INVITATION_EMAILS};
use bifrost_base::permissions::{PermissionAction, PERMISSIONS_ORG_ADMIN};
use bifrost_base::settings::Settings;
use command_utils::util::datetime;
use command_utils::util::token::{urlsafe_base64_decode, urlsafe_base64_encode};
use infra::infra::core_group::rdb::{CoreGroupRepository, UseCoreGroupRepository};
use infra::infra::core_group::rows::CoreGroupRow;
use infra::infra::core_user::rdb::{CoreUserRepository, UseCoreUserRepository};
use infra::infra::module::{RdbRepositoryModule, UseRdbRepositoryModule};
use infra::infra::organization::rdb::{OrganizationRepository, UseOrganizationRepository};
use infra_utils::infra::rdb::UseRdbPool;
use model::{CoreUser, CoreUserData, EmailTemplateType};
use serde_json::json;
use std::sync::Arc;

const BLANK_MESSAGE: &str = "This field may not be blank.";
const INVALID_EMAIL_MESSAGE: &str = "Enter a valid email address.";
const INVALID_VALUE_MESSAGE: &str = "Invalid value";
const USERNAME_EXISTS_MESSAGE: &str = "A user with that username already exists.";

/// registration input
#[derive(Debug, Clone, Default)]
pub struct CoreUserCreate {
    pub data: CoreUserData,
    pub password: String,
    pub organization_name: String,
    pub core_groups: Vec<i64>,
    pub invitation_token: Option<String>,
}

/// partial update (None keeps the current value)
#[derive(Debug, Clone, Default)]
pub struct CoreUserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub title: Option<String>,
    pub contact_info: Option<String>,
    pub privacy_disclaimer_accepted: Option<bool>,
    pub password: Option<String>,
    pub organization_name: Option<String>,
    pub core_groups: Option<Vec<i64>>,
}

fn validate_user_data(data: &CoreUserData, errors: &mut ValidationErrors) {
    if data.username.trim().is_empty() {
        errors.add("username", BLANK_MESSAGE);
    }
    if !data.email.is_empty() && !is_valid_email(&data.email) {
        errors.add("email", INVALID_EMAIL_MESSAGE);
    }
}

/// global groups or groups of the user's organization
fn assignable_group(group: Option<&CoreGroupRow>, organization_id: Option<i64>) -> bool {
    group.is_some_and(|g| {
        g.is_global || g.organization_id.is_none() || g.organization_id == organization_id
    })
}

fn invalid_group_error(group_id: i64) -> BifrostError {
    BifrostError::validation_field(
        "core_groups",
        format!("Invalid pk \"{}\" - object does not exist.", group_id),
    )
}

fn max_length_error(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.chars().count() > MAX_PASSWORD_LENGTH {
        errors.add(
            field,
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_PASSWORD_LENGTH
            ),
        );
    }
}

#[async_trait]
pub trait CoreUserApp:
    UseCoreUserRepository
    + UseCoreGroupRepository
    + UseOrganizationRepository
    + UseOrganizationApp
    + UseEmailApp
    + UseSettings
    + UseTokenCache
    + WorkflowCascade
    + Send
    + Sync
{
    /// the token must be valid for the submitted email and unused
    async fn validate_invitation_token(&self, token: &str, email: &str) -> Result<()> {
        let claims = decode_invitation_token(&self.settings().secret_key, token)
            .map_err(|e| BifrostError::validation_field("invitation_token", e.message()))?;
        if claims.email != email || self.core_user_repository().exists_by_email(&claims.email).await? {
            return Err(BifrostError::validation_field("invitation_token", TOKEN_NOT_VALID).into());
        }
        Ok(())
    }

    /// Register a user into the organization named by `organization_name`
    /// (created if missing). The user is active only if the organization is
    /// new (and becomes its admin) or an invitation token was given.
    async fn register(&self, input: &CoreUserCreate) -> Result<CoreUser> {
        let mut errors = ValidationErrors::new();
        validate_user_data(&input.data, &mut errors);
        if input.password.is_empty() {
            errors.add("password", BLANK_MESSAGE);
        }
        if input.organization_name.trim().is_empty() {
            errors.add("organization_name", BLANK_MESSAGE);
        }
        errors.into_result()?;
        if let Some(token) = input.invitation_token.as_deref() {
            self.validate_invitation_token(token, &input.data.email).await?;
        }

        let repo = self.core_user_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let (organization, is_new_org) = self
            .organization_app()
            .get_or_create_organization_tx(&mut tx, &input.organization_name)
            .await?;
        let data = CoreUserData {
            is_active: is_new_org || input.invitation_token.is_some(),
            is_staff: false,
            is_superuser: false,
            organization_id: Some(organization.id),
            ..input.data.clone()
        };
        let password = make_password(&input.password, self.settings().password_hash_iterations);
        let user = repo
            .create(&mut tx, &data, &password)
            .await
            .map_err(|e| unique_violation_to_validation(e, "username", USERNAME_EXISTS_MESSAGE))?;
        if is_new_org {
            let admin = self
                .core_group_repository()
                .find_org_level_row_tx(&mut *tx, organization.id, PERMISSIONS_ORG_ADMIN)
                .await?
                .ok_or_else(|| {
                    BifrostError::NotFound(format!(
                        "admin group of organization {} not found",
                        organization.id
                    ))
                })?;
            repo.add_core_group(&mut *tx, user.id, admin.id).await?;
        }
        for group_id in input.core_groups.iter() {
            let group = self
                .core_group_repository()
                .find_row_tx(&mut *tx, *group_id)
                .await?;
            if !assignable_group(group.as_ref(), Some(organization.id)) {
                return Err(invalid_group_error(*group_id).into());
            }
            repo.add_core_group(&mut *tx, user.id, *group_id).await?;
        }
        let created = repo
            .find_in_tx(&mut tx, user.id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("core_user not found: id = {}", user.id)))?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        tracing::info!(
            "registered user {} (organization: {}, new: {})",
            &created.data.username,
            &organization.data.name,
            is_new_org
        );
        Ok(created)
    }

    /// active staff superuser in `organization_name` (created if missing)
    async fn create_superuser(
        &self,
        username: &str,
        email: &str,
        password: &str,
        organization_name: &str,
    ) -> Result<CoreUser> {
        let data = CoreUserData {
            username: username.to_string(),
            email: email.to_string(),
            is_active: true,
            is_staff: true,
            is_superuser: true,
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        validate_user_data(&data, &mut errors);
        if password.is_empty() {
            errors.add("password", BLANK_MESSAGE);
        }
        errors.into_result()?;

        let repo = self.core_user_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        let (organization, _) = self
            .organization_app()
            .get_or_create_organization_tx(&mut tx, organization_name)
            .await?;
        let data = CoreUserData {
            organization_id: Some(organization.id),
            ..data
        };
        let password = make_password(password, self.settings().password_hash_iterations);
        let user = repo
            .create(&mut tx, &data, &password)
            .await
            .map_err(|e| unique_violation_to_validation(e, "username", USERNAME_EXISTS_MESSAGE))?;
        let created = repo
            .find_in_tx(&mut tx, user.id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("core_user not found: id = {}", user.id)))?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        tracing::info!("created superuser {}", &created.data.username);
        Ok(created)
    }

    /// Users may always update themselves; other users need the update
    /// permission. Activation and group changes always need it and only
    /// superusers may move a user to another organization.
    async fn update_core_user(
        &self,
        requester: &Requester,
        id: i64,
        update: &CoreUserUpdate,
    ) -> Result<CoreUser> {
        let current = self
            .find_core_user(requester, id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("core_user not found: id = {}", id)))?;
        if requester.id() != id || update.is_active.is_some() || update.core_groups.is_some() {
            requester.authorize(PermissionAction::Update)?;
        }
        let mut data = current.data.clone();
        if let Some(v) = &update.username {
            data.username = v.clone();
        }
        if let Some(v) = &update.email {
            data.email = v.clone();
        }
        if let Some(v) = &update.first_name {
            data.first_name = v.clone();
        }
        if let Some(v) = &update.last_name {
            data.last_name = v.clone();
        }
        if let Some(v) = update.is_active {
            data.is_active = v;
        }
        if let Some(v) = &update.title {
            data.title = Some(v.clone());
        }
        if let Some(v) = &update.contact_info {
            data.contact_info = Some(v.clone());
        }
        if let Some(v) = update.privacy_disclaimer_accepted {
            data.privacy_disclaimer_accepted = v;
        }
        let mut errors = ValidationErrors::new();
        validate_user_data(&data, &mut errors);
        if matches!(update.password.as_deref(), Some("")) {
            errors.add("password", BLANK_MESSAGE);
        }
        errors.into_result()?;

        let repo = self.core_user_repository();
        let mut tx = repo.db_pool().begin().await.map_err(BifrostError::DBError)?;
        if let Some(name) = update.organization_name.as_deref() {
            let organization = if requester.is_superuser() {
                self.organization_app()
                    .get_or_create_organization_tx(&mut tx, name)
                    .await?
                    .0
            } else {
                self.organization_repository()
                    .find_by_name_tx(&mut *tx, name)
                    .await?
                    .filter(|o| Some(o.id) == data.organization_id)
                    .ok_or_else(|| {
                        BifrostError::PermissionDenied("Cannot use another organization.".to_string())
                    })?
            };
            data.organization_id = Some(organization.id);
        }
        repo.update(&mut tx, id, &data)
            .await
            .map_err(|e| unique_violation_to_validation(e, "username", USERNAME_EXISTS_MESSAGE))?;
        if let Some(password) = update.password.as_deref() {
            let hashed = make_password(password, self.settings().password_hash_iterations);
            repo.update_password(&mut *tx, id, &hashed).await?;
        }
        if let Some(groups) = update.core_groups.as_ref() {
            for group_id in groups.iter() {
                let group = self
                    .core_group_repository()
                    .find_row_tx(&mut *tx, *group_id)
                    .await?;
                let assignable = match group.as_ref() {
                    Some(_) if requester.is_superuser() => true,
                    g => assignable_group(g, data.organization_id),
                };
                if !assignable {
                    return Err(invalid_group_error(*group_id).into());
                }
            }
            repo.set_core_groups(&mut tx, id, groups).await?;
        }
        let updated = repo
            .find_in_tx(&mut tx, id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("core_user not found: id = {}", id)))?;
        tx.commit().await.map_err(BifrostError::DBError)?;
        self.clear_token_cache();
        Ok(updated)
    }

    async fn delete_core_user(&self, requester: &Requester, id: i64) -> Result<bool> {
        requester.authorize(PermissionAction::Delete)?;
        if self.find_core_user(requester, id).await?.is_none() {
            return Ok(false);
        }
        // tokens and team memberships of the user are removed by the foreign keys
        let cascaded = self.find_user_cascade(id).await?;
        let deleted = self.core_user_repository().delete(id).await?;
        self.clear_token_cache();
        if deleted {
            cascaded
                .fire_removed(self.organization_app().hook_app())
                .await;
        }
        Ok(deleted)
    }

    /// the requester itself, or a user of a readable organization
    async fn find_core_user(&self, requester: &Requester, id: i64) -> Result<Option<CoreUser>> {
        let found = self.core_user_repository().find(id).await?;
        Ok(found.filter(|u| {
            u.id == requester.id()
                || (requester.has_permission(PermissionAction::Read)
                    && requester.scope().contains(u.data.organization_id))
        }))
    }

    async fn find_core_user_list(
        &self,
        requester: &Requester,
        limit: Option<&i32>,
        offset: Option<&i64>,
    ) -> Result<Vec<CoreUser>> {
        requester.authorize(PermissionAction::Read)?;
        match requester.scope() {
            OrganizationScope::All => {
                self.core_user_repository()
                    .find_list(None, limit, offset)
                    .await
            }
            OrganizationScope::Only(id) => {
                self.core_user_repository()
                    .find_list(Some(id), limit, offset)
                    .await
            }
            OrganizationScope::Nothing => Ok(vec![]),
        }
    }

    async fn count_core_users(&self, requester: &Requester) -> Result<i64> {
        requester.authorize(PermissionAction::Read)?;
        let db = self.core_user_repository().db_pool();
        match requester.scope() {
            OrganizationScope::All => self.core_user_repository().count_list_tx(db, None).await,
            OrganizationScope::Only(id) => {
                self.core_user_repository()
                    .count_list_tx(db, Some(id))
                    .await
            }
            OrganizationScope::Nothing => Ok(0),
        }
    }

    /// user with its groups (None for unknown users)
    async fn find_requester(&self, user_id: i64) -> Result<Option<Requester>> {
        match self.core_user_repository().find(user_id).await? {
            Some(user) => {
                let groups = self.core_group_repository().find_by_user(user.id).await?;
                Ok(Some(Requester::new(user, groups)))
            }
            None => Ok(None),
        }
    }

    /// Email a registration link carrying a signed invitation token to each
    /// address. Returns the number of sent emails.
    async fn invite(&self, requester: &Requester, emails: &[String]) -> Result<usize> {
        let mut errors = ValidationErrors::new();
        if emails.len() < MIN_INVITATION_EMAILS {
            errors.add(
                "emails",
                format!("Ensure this field has at least {} elements.", MIN_INVITATION_EMAILS),
            );
        } else if emails.len() > MAX_INVITATION_EMAILS {
            errors.add(
                "emails",
                format!(
                    "Ensure this field has no more than {} elements.",
                    MAX_INVITATION_EMAILS
                ),
            );
        }
        if emails.iter().any(|e| !is_valid_email(e)) {
            errors.add("emails", INVALID_EMAIL_MESSAGE);
        }
        errors.into_result()?;

        let organization = match requester.organization_id() {
            Some(id) => self.organization_repository().find(id).await?,
            None => None,
        }
        .ok_or_else(|| {
            BifrostError::validation_non_field("The requesting user does not belong to an organization.")
        })?;
        let settings = self.settings();
        let registration_url = url_join(&settings.frontend_url, &settings.registration_url_path);
        let now = datetime::now();
        let mut count = 0;
        for email in emails.iter() {
            let token = encode_invitation_token(
                &settings.secret_key,
                email,
                &organization.organization_uuid,
                settings.invitation_expiration_hours,
                &now,
            )?;
            let context = json!({
                "registration_link": format!("{}{}", registration_url, token),
                "organization_name": &organization.data.name,
                "email": email,
            });
            count += self
                .email_app()
                .send_templated_email(
                    email,
                    Some(organization.id),
                    EmailTemplateType::Invitation,
                    &context,
                )
                .await?;
        }
        tracing::info!(
            "sent {} invitations for organization {}",
            count,
            &organization.data.name
        );
        Ok(count)
    }

    /// Email a reset link to every active user with the address. Unknown
    /// addresses send nothing.
    async fn reset_password(&self, email: &str) -> Result<usize> {
        if !is_valid_email(email) {
            return Err(BifrostError::validation_field("email", INVALID_EMAIL_MESSAGE).into());
        }
        let settings = self.settings();
        let reset_url = url_join(&settings.frontend_url, &settings.resetpass_confirm_url_path);
        let generator =
            PasswordResetTokenGenerator::new(&settings.secret_key, settings.password_reset_timeout_days);
        let mut count = 0;
        for user in self.core_user_repository().find_active_by_email(email).await? {
            let uid = urlsafe_base64_encode(user.id.to_string().as_bytes());
            let token = generator.make_token(&user)?;
            let context = json!({
                "password_reset_link": format!("{}{}/{}/", reset_url, uid, token),
                "user": {
                    "username": &user.data.username,
                    "email": &user.data.email,
                    "first_name": &user.data.first_name,
                    "last_name": &user.data.last_name,
                },
            });
            count += self
                .email_app()
                .send_templated_email(
                    email,
                    user.data.organization_id,
                    EmailTemplateType::ResetPassword,
                    &context,
                )
                .await?;
        }
        Ok(count)
    }

    /// the user the (uid, token) pair was issued for
    async fn reset_password_check(&self, uid: &str, token: &str) -> Result<CoreUser> {
        let user_id = urlsafe_base64_decode(uid)
            .and_then(|b| String::from_utf8(b).ok())
            .and_then(|s| s.parse::<i64>().ok());
        let user = match user_id {
            Some(id) => self.core_user_repository().find(id).await?,
            None => None,
        }
        .ok_or_else(|| BifrostError::validation_field("uid", INVALID_VALUE_MESSAGE))?;
        let settings = self.settings();
        let generator =
            PasswordResetTokenGenerator::new(&settings.secret_key, settings.password_reset_timeout_days);
        if !generator.check_token(&user, token) {
            return Err(BifrostError::validation_field("token", INVALID_VALUE_MESSAGE).into());
        }
        Ok(user)
    }

    async fn reset_password_confirm(
        &self,
        uid: &str,
        token: &str,
        new_password1: &str,
        new_password2: &str,
    ) -> Result<CoreUser> {
        let mut errors = ValidationErrors::new();
        max_length_error("new_password1", new_password1, &mut errors);
        max_length_error("new_password2", new_password2, &mut errors);
        errors.into_result()?;
        let user = self.reset_password_check(uid, token).await?;
        if new_password1 != new_password2 {
            return Err(
                BifrostError::validation_non_field("The two password fields didn't match.").into(),
            );
        }
        let mut errors = ValidationErrors::new();
        for message in validate_password(new_password2, Some(&user.data)) {
            errors.add(ValidationErrors::NON_FIELD_ERRORS, message);
        }
        errors.into_result()?;
        let hashed = make_password(new_password1, self.settings().password_hash_iterations);
        let repo = self.core_user_repository();
        repo.update_password(repo.db_pool(), user.id, &hashed).await?;
        self.clear_token_cache();
        repo.find(user.id)
            .await?
            .ok_or_else(|| BifrostError::NotFound(format!("core_user not found: id = {}", user.id)).into())
    }
}

#[derive(Debug, Clone)]
pub struct CoreUserAppImpl {
    settings: Arc<Settings>,
    repositories: Arc<RdbRepositoryModule>,
    organization_app: Arc<OrganizationAppImpl>,
    email_app: Arc<EmailAppImpl>,
    token_cache: TokenCache,
}

impl CoreUserAppImpl {
    pub fn new(
        settings: Arc<Settings>,
        repositories: Arc<RdbRepositoryModule>,
        organization_app: Arc<OrganizationAppImpl>,
        email_app: Arc<EmailAppImpl>,
        token_cache: TokenCache,
    ) -> Self {
        Self {
            settings,
            repositories,
            organization_app,
            email_app,
            token_cache,
        }
    }
}

impl UseTokenCache for CoreUserAppImpl {
    fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }
}

impl UseRdbRepositoryModule for CoreUserAppImpl {
    fn rdb_repository_module(&self) -> &RdbRepositoryModule {
        &self.repositories
    }
}

impl UseSettings for CoreUserAppImpl {
    fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl UseOrganizationApp for CoreUserAppImpl {
    fn organization_app(&self) -> &OrganizationAppImpl {
        &self.organization_app
    }
}

impl UseEmailApp for CoreUserAppImpl {
    fn email_app(&self) -> &EmailAppImpl {
        &self.email_app
    }
}

impl CoreUserApp for CoreUserAppImpl {}

pub trait UseCoreUserApp {
    fn core_user_app(&self) -> &CoreUserAppImpl;
}
