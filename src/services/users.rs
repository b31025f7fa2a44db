//! User administration service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        user::{CreateUser, NewUser, UpdateUser, User, UserQuery},
        Role, UserClaims, UserStatus,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, claims: &UserClaims, query: &UserQuery) -> AppResult<Vec<User>> {
        claims.require_admin()?;
        self.repository.users.list(query).await
    }

    /// Admins see anyone; everybody else only themselves
    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<User> {
        if !claims.is_admin() && claims.user_id != id {
            return Err(AppError::Authorization(
                "Not authorized to view this user".to_string(),
            ));
        }
        self.find(id).await
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateUser) -> AppResult<User> {
        claims.require_admin()?;
        data.validate()?;

        let username = data.username.trim().to_string();
        let email = data.email.trim().to_lowercase();
        if self
            .repository
            .users
            .find_by_identity(&username, &email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username or email already in use".to_string()));
        }

        let new_user = NewUser {
            name: data.name,
            username,
            email,
            password_hash: Some(hash_password(&data.password)?),
            phone: data.phone,
            address: data.address,
            department: data.department,
            specialty: data.specialty,
            role: data.role.unwrap_or(Role::User),
        };
        let user = self.repository.users.create(&new_user).await?;
        tracing::info!("User {} '{}' created with role {}", user.id, user.username, user.role);
        Ok(user)
    }

    pub async fn update(&self, claims: &UserClaims, id: i32, data: UpdateUser) -> AppResult<User> {
        claims.require_admin()?;
        data.validate()?;

        let mut user = self.find(id).await?;
        user.apply_update(&data);
        if let Some(ref password) = data.password {
            user.password = Some(hash_password(password)?);
        }
        self.repository.users.save(&user).await
    }

    /// Soft delete; the record stays resolvable for references
    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        if claims.user_id == id {
            return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
        }
        let mut user = self.find(id).await?;
        if user.is_deleted {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        user.is_deleted = true;
        user.status = UserStatus::Suspended;
        self.repository.users.save(&user).await?;
        tracing::info!("User {} deleted", id);
        Ok(())
    }

    pub async fn restore(&self, claims: &UserClaims, id: i32) -> AppResult<User> {
        claims.require_admin()?;
        let mut user = self.find(id).await?;
        if !user.is_deleted {
            return Ok(user);
        }
        user.is_deleted = false;
        user.status = UserStatus::Active;
        let user = self.repository.users.save(&user).await?;
        tracing::info!("User {} restored", id);
        Ok(user)
    }

    async fn find(&self, id: i32) -> AppResult<User> {
        self.repository
            .users
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    fn admin() -> UserClaims {
        UserClaims::new(999, "root", "Root", Role::Admin, 1)
    }

    fn create_user(username: &str, email: &str) -> CreateUser {
        CreateUser {
            name: "Tina Tech".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            phone: None,
            address: None,
            department: None,
            specialty: Some("Laptops".to_string()),
            role: Some(Role::Technician),
        }
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_a_conflict() {
        let service = UsersService::new(Repository::in_memory());
        let user = service.create(&admin(), create_user("tina", "tina@example.com")).await.unwrap();
        assert_eq!(user.role, Role::Technician);

        let stored = user.password.clone().unwrap();
        let parsed = PasswordHash::new(&stored).unwrap();
        assert!(Argon2::default().verify_password(b"secret123", &parsed).is_ok());

        let err = service
            .create(&admin(), create_user("TINA", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service
            .create(&admin(), create_user("someone", "Tina@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn soft_delete_and_restore() {
        let service = UsersService::new(Repository::in_memory());
        let user = service.create(&admin(), create_user("tina", "tina@example.com")).await.unwrap();

        service.delete(&admin(), user.id).await.unwrap();
        let stored = service.repository.users.get(user.id).await.unwrap().unwrap();
        assert!(stored.is_deleted);
        assert_eq!(stored.status, UserStatus::Suspended);

        let listed = service.list(&admin(), &UserQuery::default()).await.unwrap();
        assert!(listed.is_empty());

        let with_deleted = UserQuery {
            deleted: Some(true),
            ..UserQuery::default()
        };
        assert_eq!(service.list(&admin(), &with_deleted).await.unwrap().len(), 1);

        let restored = service.restore(&admin(), user.id).await.unwrap();
        assert!(!restored.is_deleted);
        assert_eq!(restored.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn non_admins_only_see_themselves() {
        let service = UsersService::new(Repository::in_memory());
        let user = service.create(&admin(), create_user("tina", "tina@example.com")).await.unwrap();

        let me = UserClaims::new(user.id, "tina", "Tina", Role::Technician, 1);
        assert_eq!(service.get(&me, user.id).await.unwrap().id, user.id);

        let other = UserClaims::new(user.id + 1, "x", "X", Role::User, 1);
        assert!(matches!(service.get(&other, user.id).await, Err(AppError::Authorization(_))));
        assert!(service.list(&other, &UserQuery::default()).await.is_err());
    }
}
