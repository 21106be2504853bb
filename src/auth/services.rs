use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing::{info, warn};
use validator::Validate;

use super::{
    dto::{AuthResponse, ChangePasswordRequest, LoginRequest, PublicUser, RegisterRequest},
    jwt::JwtKeys,
    password::{self, PasswordError},
    repo::UserStore,
    repo_types::NewUser,
};
use crate::{
    db::with_deadline,
    error::{AppError, AppResult},
};

/// Registration, login and password change over a `UserStore`.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
    deadline: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys, deadline: Duration) -> Self {
        Self {
            users,
            keys,
            deadline,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthResponse> {
        req.validate()?;

        let taken = with_deadline(self.deadline, self.users.email_exists(&req.email)).await?;
        if taken {
            warn!(email = %req.email, "email already registered");
            return Err(email_taken());
        }

        let password_hash = hash_blocking(req.password).await?;
        let user = with_deadline(
            self.deadline,
            self.users.create(NewUser {
                email: req.email,
                password_hash,
                name: req.name,
            }),
        )
        .await
        .map_err(|e| match e {
            // lost the race against a concurrent registration
            AppError::Conflict(_) => email_taken(),
            other => other,
        })?;

        let token = self.keys.issue(user.id)?;
        info!(user_id = user.id, "user registered");
        Ok(AuthResponse {
            token,
            user: PublicUser::from(user),
        })
    }

    pub async fn login(&self, req: LoginRequest) -> AppResult<AuthResponse> {
        req.validate()?;

        let Some(user) = with_deadline(self.deadline, self.users.find_by_email(&req.email)).await?
        else {
            warn!(email = %req.email, "login unknown email");
            return Err(invalid_credentials());
        };

        if !verify_blocking(req.password, user.password_hash.clone()).await? {
            warn!(user_id = user.id, "login invalid password");
            return Err(invalid_credentials());
        }

        let token = self.keys.issue(user.id)?;
        info!(user_id = user.id, "user logged in");
        Ok(AuthResponse {
            token,
            user: PublicUser::from(user),
        })
    }

    pub async fn change_password(&self, user_id: i64, req: ChangePasswordRequest) -> AppResult<()> {
        req.validate()?;

        let Some(user) = with_deadline(self.deadline, self.users.find_by_id(user_id)).await? else {
            warn!(user_id, "token subject has no user");
            return Err(AppError::unauthorized("user not found"));
        };

        if !verify_blocking(req.old_password, user.password_hash).await? {
            warn!(user_id, "change password with wrong old password");
            return Err(AppError::unauthorized("old password is incorrect"));
        }

        let new_hash = hash_blocking(req.new_password).await?;
        let updated =
            with_deadline(self.deadline, self.users.update_password(user_id, &new_hash)).await?;
        if !updated {
            return Err(AppError::unauthorized("user not found"));
        }
        info!(user_id, "password changed");
        Ok(())
    }
}

fn email_taken() -> AppError {
    AppError::Conflict("email already registered".into())
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("invalid credentials")
}

async fn hash_blocking(plain: String) -> AppResult<String> {
    let res = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .context("hash task")?;
    match res {
        Ok(hash) => Ok(hash),
        Err(PasswordError::TooLong) => Err(AppError::validation(PasswordError::TooLong.to_string())),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

async fn verify_blocking(plain: String, hash: String) -> AppResult<bool> {
    let ok = tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
        .await
        .context("verify task")?
        .context("verify password")?;
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::MemoryUserStore;

    fn service() -> (AuthService, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::default());
        let keys = JwtKeys::new(b"test-secret", Duration::from_secs(24 * 3600));
        (
            AuthService::new(store.clone(), keys, Duration::from_secs(3)),
            store,
        )
    }

    fn register_req(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            name: "A".into(),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let (svc, store) = service();
        let registered = svc.register(register_req("a@x.com", "secret1")).await.unwrap();
        assert!(!registered.token.is_empty());

        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret1");

        let logged_in = svc.login(login_req("a@x.com", "secret1")).await.unwrap();
        assert_eq!(logged_in.user, registered.user);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (svc, store) = service();
        svc.register(register_req("a@x.com", "secret1")).await.unwrap();
        let err = svc
            .register(register_req("a@x.com", "another1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.find_by_id(2).await.unwrap().map(|u| u.id), None);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (svc, _) = service();
        svc.register(register_req("a@x.com", "secret1")).await.unwrap();

        let wrong = svc.login(login_req("a@x.com", "wrong12")).await.unwrap_err();
        let unknown = svc.login(login_req("b@x.com", "secret1")).await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn change_password_flow() {
        let (svc, _) = service();
        let user = svc
            .register(register_req("a@x.com", "secret1"))
            .await
            .unwrap()
            .user;

        let err = svc
            .change_password(
                user.id,
                ChangePasswordRequest {
                    old_password: "nope123".into(),
                    new_password: "secret2".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "old password is incorrect"));

        svc.change_password(
            user.id,
            ChangePasswordRequest {
                old_password: "secret1".into(),
                new_password: "secret2".into(),
            },
        )
        .await
        .unwrap();

        assert!(svc.login(login_req("a@x.com", "secret1")).await.is_err());
        assert!(svc.login(login_req("a@x.com", "secret2")).await.is_ok());
    }

    #[tokio::test]
    async fn multibyte_password_over_ceiling_is_rejected() {
        let (svc, _) = service();
        // 40 chars passes the length check but is 80 bytes
        let err = svc
            .register(register_req("a@x.com", &"é".repeat(40)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
