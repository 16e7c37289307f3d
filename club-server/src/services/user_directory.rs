//! 登录账户目录
//!
//! 只保存 argon2 哈希。未提供密码时生成一次性临时密码，仅在创建响应中返回一次。

use std::sync::Arc;

use shared::models::{Member, User, UserCreate, UserCreated, UserRole};
use shared::util::{non_blank, now_millis, prefixed_id};

use crate::auth::password::{generate_temporary_password, hash_password, verify_password};
use crate::db::{RepoError, Repository, UserFilter};
use crate::utils::validation::{
    MAX_NAME_LEN, missing_fields, validate_email, validate_optional_text, validate_password,
};
use crate::utils::{AppError, AppResult, ErrorCode};

fn user_not_found(id: &str) -> AppError {
    AppError::new(ErrorCode::UserNotFound).with_detail("id", id)
}

fn hash_error(e: argon2::password_hash::Error) -> AppError {
    AppError::internal(format!("Password hashing failed: {}", e))
}

#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn Repository<User>>,
    members: Arc<dyn Repository<Member>>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn Repository<User>>, members: Arc<dyn Repository<Member>>) -> Self {
        Self { users, members }
    }

    pub async fn create(&self, input: UserCreate) -> AppResult<UserCreated> {
        let username = non_blank(input.username.as_deref());
        let email = non_blank(input.email.as_deref());

        let mut missing = Vec::new();
        if username.is_none() {
            missing.push("username");
        }
        if email.is_none() {
            missing.push("email");
        }
        if input.role.is_none() {
            missing.push("role");
        }
        let (Some(username), Some(email), Some(role)) = (username, email, input.role) else {
            return Err(missing_fields(ErrorCode::RequiredField, &missing));
        };

        validate_optional_text(&Some(username.clone()), "username", MAX_NAME_LEN)?;
        validate_email(&email)?;

        let member_id = non_blank(input.member_id.as_deref());
        if let Some(member_id) = &member_id
            && self.members.find_by_id(member_id).await?.is_none()
        {
            return Err(AppError::new(ErrorCode::UserMemberLinkInvalid)
                .with_detail("memberId", member_id.as_str()));
        }

        let (password, temporary_password) = match input.password {
            Some(password) => {
                validate_password(&password)?;
                (password, None)
            }
            None => {
                let generated = generate_temporary_password();
                (generated.clone(), Some(generated))
            }
        };

        let user = User {
            id: prefixed_id("usr"),
            username,
            email,
            role,
            member_id,
            password_hash: hash_password(&password).map_err(hash_error)?,
            created_at: now_millis(),
        };
        let user = self.users.insert(user).await?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            role = %user.role,
            generated_password = temporary_password.is_some(),
            "User created"
        );
        Ok(UserCreated {
            user,
            temporary_password,
        })
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.find_many(&UserFilter::default()).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    /// Replace the stored hash; the current password is not checked
    pub async fn update_password(&self, id: &str, new_password: &str) -> AppResult<()> {
        let mut user = self.get(id).await?;
        user.password_hash = hash_password(new_password).map_err(hash_error)?;

        match self.users.update(user).await {
            Ok(_) => {
                tracing::info!(user_id = %id, "Password updated");
                Ok(())
            }
            Err(RepoError::NotFound(_)) => Err(user_not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify a username-or-email and password pair
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<User> {
        let filter = UserFilter {
            login: non_blank(Some(login)),
        };
        if filter.login.is_none() {
            return Err(AppError::invalid_credentials());
        }

        let candidates = self.users.find_many(&filter).await?;
        for user in candidates {
            match verify_password(password, &user.password_hash) {
                Ok(true) => return Ok(user),
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(user_id = %user.id, error = %e, "Stored password hash is malformed");
                }
            }
        }
        Err(AppError::invalid_credentials())
    }

    /// Create the first ADMIN when no user exists yet
    pub async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<User>> {
        if !self.list().await?.is_empty() {
            return Ok(None);
        }

        let created = self
            .create(UserCreate {
                username: Some(username.to_string()),
                email: Some(format!("{}@club.local", username)),
                role: Some(UserRole::Admin),
                member_id: None,
                password: Some(password.to_string()),
            })
            .await?;
        tracing::info!(username = %created.user.username, "Bootstrap admin created");
        Ok(Some(created.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Stores;
    use http::StatusCode;

    fn directory() -> (UserDirectory, Stores) {
        let stores = Stores::memory();
        (
            UserDirectory::new(stores.users.clone(), stores.members.clone()),
            stores,
        )
    }

    fn input(username: &str, password: Option<&str>) -> UserCreate {
        UserCreate {
            username: Some(username.to_string()),
            email: Some(format!("{}@example.com", username)),
            role: Some(UserRole::Member),
            member_id: None,
            password: password.map(str::to_string),
        }
    }

    fn member(id: &str) -> Member {
        Member {
            id: id.to_string(),
            first_name: "Ama".to_string(),
            last_name: "Mensah".to_string(),
            email: None,
            phone: None,
            date_of_birth: None,
            gender: None,
            national_id: None,
            residential_address: None,
            region: None,
            occupation: None,
            nationality: None,
            level: None,
            category: None,
            status: Default::default(),
            passport_picture_url: None,
            outstanding_balance: 0.0,
            created_at: 1,
        }
    }

    #[tokio::test]
    async fn test_create_with_password_stores_hash_only() {
        let (dir, _) = directory();
        let created = dir.create(input("kwame", Some("secret1"))).await.unwrap();

        assert!(created.temporary_password.is_none());
        assert!(created.user.id.starts_with("usr_"));
        assert_ne!(created.user.password_hash, "secret1");
        assert!(verify_password("secret1", &created.user.password_hash).unwrap());

        let json = serde_json::to_value(&created).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("temporaryPassword").is_none());
        assert_eq!(json["username"], "kwame");
    }

    #[tokio::test]
    async fn test_create_without_password_generates_temporary() {
        let (dir, _) = directory();
        let created = dir.create(input("kwame", None)).await.unwrap();

        let temp = created.temporary_password.clone().unwrap();
        assert!(temp.len() >= 6);
        dir.authenticate("kwame", &temp).await.unwrap();

        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["temporaryPassword"], temp.as_str());
        assert!(json.get("passwordHash").is_none());

        // only the create response carries it
        let listed = serde_json::to_value(dir.list().await.unwrap()).unwrap();
        assert!(listed[0].get("temporaryPassword").is_none());
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (dir, _) = directory();

        let err = dir.create(UserCreate::default()).await.unwrap_err();
        assert_eq!(err.message, "Missing required fields: username, email, role");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);

        let err = dir.create(input("kwame", Some("123"))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PasswordTooShort);

        let mut bad_email = input("kwame", Some("secret1"));
        bad_email.email = Some("kwame-at-example".to_string());
        assert_eq!(
            dir.create(bad_email).await.unwrap_err().code,
            ErrorCode::InvalidFormat
        );
        assert!(dir.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let (dir, _) = directory();
        dir.create(input("kwame", Some("secret1"))).await.unwrap();

        let err = dir.create(input("kwame", Some("secret2"))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UsernameExists);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert_eq!(dir.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_member_link_must_exist() {
        let (dir, stores) = directory();

        let mut linked = input("ama", Some("secret1"));
        linked.member_id = Some("mem_1".to_string());
        let err = dir.create(linked.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserMemberLinkInvalid);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);

        stores.members.insert(member("mem_1")).await.unwrap();
        let created = dir.create(linked).await.unwrap();
        assert_eq!(created.user.member_id.as_deref(), Some("mem_1"));
    }

    #[tokio::test]
    async fn test_update_password() {
        let (dir, _) = directory();
        let user = dir.create(input("kwame", Some("secret1"))).await.unwrap().user;

        dir.update_password(&user.id, "rotated-pass").await.unwrap();
        assert!(dir.authenticate("kwame", "secret1").await.is_err());
        assert_eq!(
            dir.authenticate("kwame", "rotated-pass").await.unwrap().id,
            user.id
        );

        let err = dir.update_password("usr_missing", "whatever").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn test_authenticate_by_username_or_email() {
        let (dir, _) = directory();
        let user = dir.create(input("kwame", Some("secret1"))).await.unwrap().user;

        assert_eq!(dir.authenticate("kwame", "secret1").await.unwrap().id, user.id);
        assert_eq!(
            dir.authenticate("KWAME@example.com", "secret1").await.unwrap().id,
            user.id
        );

        let wrong = dir.authenticate("kwame", "nope").await.unwrap_err();
        let unknown = dir.authenticate("ghost", "secret1").await.unwrap_err();
        assert_eq!(wrong.code, ErrorCode::InvalidCredentials);
        assert_eq!(wrong.code, unknown.code);
        assert_eq!(wrong.message, unknown.message);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_only_when_empty() {
        let (dir, _) = directory();
        let admin = dir
            .ensure_bootstrap_admin("admin", "admin-pass")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);

        assert!(dir
            .ensure_bootstrap_admin("admin2", "admin-pass")
            .await
            .unwrap()
            .is_none());
        assert_eq!(dir.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let (dir, _) = directory();
        assert_eq!(
            dir.get("usr_nope").await.unwrap_err().http_status(),
            StatusCode::NOT_FOUND
        );
    }
}
