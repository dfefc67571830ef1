use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::store::PortalStore;
use crate::features::audit::models::AuditAction;
use crate::features::audit::AuditLog;
use crate::features::auth::password::{check_password_length, hash_password};
use crate::features::auth::{CredentialHasher, RequestContext, RequestGuard};
use crate::features::users::dtos::CreateUserDto;
use crate::features::users::models::{NewUser, User, UserOverview};

/// Portal accounts: identity, role, active status and credentials
pub struct UserDirectory {
    store: Arc<dyn PortalStore>,
    guard: Arc<RequestGuard>,
    audit: Arc<AuditLog>,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserDirectory {
    pub fn new(
        store: Arc<dyn PortalStore>,
        guard: Arc<RequestGuard>,
        audit: Arc<AuditLog>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            store,
            guard,
            audit,
            hasher,
        }
    }

    pub async fn find(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }

    /// Every user with access and download counters (admin overview)
    pub async fn list_users(&self, ctx: &RequestContext) -> Result<Vec<UserOverview>> {
        self.guard.require_admin(ctx)?;
        self.store.list_user_overviews().await
    }

    /// Active non-admin users, the candidates for explicit grants
    pub async fn list_active_regular_users(&self, ctx: &RequestContext) -> Result<Vec<User>> {
        self.guard.require_admin(ctx)?;
        self.store.list_active_regular_users().await
    }

    /// Create an active account; username, email and employee id must be unused
    pub async fn create_user(&self, ctx: &RequestContext, dto: CreateUserDto) -> Result<User> {
        self.guard.require_admin_mutation(ctx)?;

        let dto = dto.normalized();
        if dto.username.is_empty()
            || dto.email.is_empty()
            || dto.full_name.is_empty()
            || dto.password.is_empty()
        {
            return Err(AppError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        check_password_length(&dto.password)?;
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = hash_password(&self.hasher, dto.password).await?;
        let new_user = NewUser {
            username: dto.username,
            email: dto.email,
            full_name: dto.full_name,
            employee_id: dto.employee_id,
            role: dto.role,
            password_hash,
        };

        let user = self.store.insert_user(&new_user).await?.ok_or_else(|| {
            AppError::Validation("Username or email already exists".to_string())
        })?;

        tracing::info!("Created {} account {} ({})", user.role, user.username, user.id);
        self.audit
            .record_for(
                ctx,
                AuditAction::UserCreated,
                format!("Created user: {} ({})", user.username, user.full_name),
            )
            .await;

        Ok(user)
    }

    /// Replace a user's password digest
    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        new_password: String,
    ) -> Result<User> {
        self.guard.require_admin_mutation(ctx)?;

        if new_password.is_empty() {
            return Err(AppError::Validation("New password is required".to_string()));
        }
        check_password_length(&new_password)?;

        let user = self.find(user_id).await?;
        let digest = hash_password(&self.hasher, new_password).await?;
        if !self.store.set_password_hash(user_id, &digest).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }

        tracing::info!("Password reset for user {} ({})", user.username, user.id);
        self.audit
            .record_for(
                ctx,
                AuditAction::PasswordReset,
                format!("Password reset for user: {}", user.username),
            )
            .await;

        Ok(user)
    }

    pub async fn set_active(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        active: bool,
    ) -> Result<User> {
        self.guard.require_admin_mutation(ctx)?;

        if user_id == ctx.user_id() && !active {
            return Err(AppError::Validation(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        let mut user = self.find(user_id).await?;

        if !self.store.set_user_active(user_id, active).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }
        user.is_active = active;

        let verb = if active { "Activated" } else { "Deactivated" };
        tracing::info!("{} user {} ({})", verb, user.username, user.id);
        self.audit
            .record_for(
                ctx,
                AuditAction::UserStatusChanged,
                format!("{} user: {} ({})", verb, user.full_name, user.username),
            )
            .await;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{
        context_for, context_without_csrf, test_csrf_store, test_hasher, MemoryStore, PlainHasher,
    };

    fn setup() -> (Arc<MemoryStore>, UserDirectory) {
        let store = Arc::new(MemoryStore::new());
        let guard = Arc::new(RequestGuard::new(test_csrf_store()));
        let audit = Arc::new(AuditLog::new(store.clone(), guard.clone()));
        (
            store.clone(),
            UserDirectory::new(store, guard, audit, test_hasher()),
        )
    }

    fn new_account(username: &str, email: &str) -> CreateUserDto {
        CreateUserDto {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Jane Doe".to_string(),
            employee_id: Some("EMP0042".to_string()),
            role: UserRole::User,
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_stores_digest_and_records_event() {
        let (store, directory) = setup();
        let admin = store.add_user(UserRole::Admin, true);

        let user = directory
            .create_user(&context_for(&admin), new_account(" jdoe ", "jdoe@example.com"))
            .await
            .unwrap();

        assert_eq!(user.username, "jdoe");
        assert_eq!(user.role, UserRole::User);
        assert!(user.is_active);
        assert_eq!(
            store.password_hash(user.id).as_deref(),
            Some(PlainHasher::digest("secret1").as_str())
        );

        let entries = store.audit_entries_for(AuditAction::UserCreated);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, Some(admin.id));
        assert_eq!(entries[0].description, "Created user: jdoe (Jane Doe)");
    }

    #[tokio::test]
    async fn test_create_user_rejects_taken_identity() {
        let (store, directory) = setup();
        let admin = store.add_user(UserRole::Admin, true);
        let ctx = context_for(&admin);
        directory
            .create_user(&ctx, new_account("jdoe", "jdoe@example.com"))
            .await
            .unwrap();

        for dto in [
            CreateUserDto {
                employee_id: None,
                ..new_account("jdoe", "other@example.com")
            },
            CreateUserDto {
                employee_id: None,
                ..new_account("other", "jdoe@example.com")
            },
        ] {
            let err = directory.create_user(&ctx, dto).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m.contains("already exists")));
        }
        assert_eq!(store.audit_entries_for(AuditAction::UserCreated).len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_validates_before_writing() {
        let (store, directory) = setup();
        let admin = store.add_user(UserRole::Admin, true);
        let ctx = context_for(&admin);

        let short = CreateUserDto {
            password: "12345".to_string(),
            ..new_account("jdoe", "jdoe@example.com")
        };
        let blank = CreateUserDto {
            full_name: "   ".to_string(),
            ..new_account("jdoe", "jdoe@example.com")
        };
        let bad_email = new_account("jdoe", "jdoe-at-example");

        for dto in [short, blank, bad_email] {
            let err = directory.create_user(&ctx, dto).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }

        let err = directory
            .create_user(
                &context_without_csrf(&admin),
                new_account("jdoe", "jdoe@example.com"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        assert!(store.find_by_username("jdoe").is_none());
        assert!(store.audit_entries().is_empty());
    }

    #[tokio::test]
    async fn test_create_user_is_admin_only() {
        let (store, directory) = setup();
        let user = store.add_user(UserRole::User, true);
        let err = directory
            .create_user(&context_for(&user), new_account("jdoe", "jdoe@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(store.find_by_username("jdoe").is_none());
    }

    #[tokio::test]
    async fn test_reset_password_replaces_digest() {
        let (store, directory) = setup();
        let admin = store.add_user(UserRole::Admin, true);
        let user = store.add_user(UserRole::User, true);
        store.set_password_hash(user.id, &PlainHasher::digest("old-password"));

        directory
            .reset_password(&context_for(&admin), user.id, "new-password".to_string())
            .await
            .unwrap();

        assert_eq!(
            store.password_hash(user.id),
            Some(PlainHasher::digest("new-password"))
        );
        let entries = store.audit_entries_for(AuditAction::PasswordReset);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].description,
            format!("Password reset for user: {}", user.username)
        );
    }

    #[tokio::test]
    async fn test_reset_password_rejections() {
        let (store, directory) = setup();
        let admin = store.add_user(UserRole::Admin, true);
        let user = store.add_user(UserRole::User, true);
        let ctx = context_for(&admin);

        let err = directory
            .reset_password(&ctx, user.id, "short".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = directory
            .reset_password(&ctx, Uuid::now_v7(), "long-enough".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = directory
            .reset_password(&context_without_csrf(&admin), user.id, "long-enough".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        assert_eq!(store.password_hash(user.id), None);
        assert!(store.audit_entries().is_empty());
    }

    #[tokio::test]
    async fn test_set_active_records_status_change() {
        let (store, directory) = setup();
        let admin = store.add_user(UserRole::Admin, true);
        let user = store.add_user(UserRole::User, true);

        let updated = directory
            .set_active(&context_for(&admin), user.id, false)
            .await
            .unwrap();

        assert!(!updated.is_active);
        assert!(!directory.find(user.id).await.unwrap().is_active);
        let entries = store.audit_entries_for(AuditAction::UserStatusChanged);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id, Some(admin.id));
        assert!(entries[0].description.starts_with("Deactivated"));
    }

    #[tokio::test]
    async fn test_admin_cannot_deactivate_self() {
        let (store, directory) = setup();
        let admin = store.add_user(UserRole::Admin, true);
        let err = directory
            .set_active(&context_for(&admin), admin.id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(directory.find(admin.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_set_active_requires_csrf_and_existing_user() {
        let (store, directory) = setup();
        let admin = store.add_user(UserRole::Admin, true);
        let user = store.add_user(UserRole::User, true);

        let err = directory
            .set_active(&context_without_csrf(&admin), user.id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = directory
            .set_active(&context_for(&admin), Uuid::now_v7(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.audit_entries().is_empty());
    }

    #[tokio::test]
    async fn test_regular_users_sorted_by_name() {
        let (store, directory) = setup();
        let admin = store.add_named_user("Aaron Admin", UserRole::Admin, true);
        store.add_named_user("Zoe Zed", UserRole::User, true);
        store.add_named_user("Adam Ant", UserRole::User, true);
        store.add_named_user("Ian Inactive", UserRole::User, false);

        let users = directory
            .list_active_regular_users(&context_for(&admin))
            .await
            .unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.full_name.as_str()).collect();
        assert_eq!(names, vec!["Adam Ant", "Zoe Zed"]);
    }

    #[tokio::test]
    async fn test_listing_is_admin_only() {
        let (store, directory) = setup();
        let user = store.add_user(UserRole::User, true);
        assert!(directory.list_users(&context_for(&user)).await.is_err());
    }
}
