use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use uuid::Uuid;

use super::{
    auth::{self, Permissions, UserAuthData},
    crypto, AppState,
};
use crate::{
    db::{self, OwnerFilter, Page},
    dto::{AuthUserResponse, LoginUserRequest, NewUserDto},
    errors::AppError,
    models::{PublicUser, Role, User},
};

/// Registers a resident (or, when an admin asks, any role).
///
/// `caller` is the authenticated user issuing the request, if any.
pub async fn create(
    state: &AppState,
    dto: NewUserDto,
    caller: Option<&UserAuthData>,
) -> Result<PublicUser, AppError> {
    state.delay().await;
    let NewUserDto {
        name,
        email,
        pwd,
        pwd_confirm,
        role,
        condominium_id,
        unit,
    } = dto;
    let email = email.trim().to_string();
    if name.trim().is_empty() || !email.contains('@') {
        return Err(AppError::validation("a name and a valid email are required"));
    }
    if pwd.is_empty() {
        return Err(AppError::validation("password must not be empty"));
    }
    if pwd != pwd_confirm {
        return Err(AppError::validation("passwords do not match"));
    }
    let role = match role {
        None | Some(Role::Resident) => Role::Resident,
        Some(other) => {
            caller
                .ok_or(AppError::Forbidden)?
                .require(Permissions::MANAGE_USERS)?;
            other
        }
    };

    let user = User {
        id: Uuid::new_v4(),
        name: name.trim().to_string(),
        email,
        role,
        condominium_id,
        unit,
        password_hash: crypto::get_sha3_256_hash(&pwd),
        created_at: Utc::now(),
    };
    let candidate_email = user.email.clone();
    let user = state
        .store
        .users
        .insert_checked(user, |existing| {
            if existing
                .iter()
                .any(|u| u.email.eq_ignore_ascii_case(&candidate_email))
            {
                Err(AppError::validation("email is already registered"))
            } else {
                Ok(())
            }
        })
        .await
        .map_err(|err| {
            warn!("registration of {} rejected: {}", candidate_email, err);
            err
        })?;
    info!("user {} registered as {:?}", user.id, user.role);
    Ok(user.into())
}

pub async fn login(state: &AppState, req: LoginUserRequest) -> Result<AuthUserResponse, AppError> {
    state.delay().await;
    let user = db::user::find_by_email(&state.store.users, &req.email)
        .await
        .filter(|user| crypto::verify(&req.pwd, &user.password_hash))
        .ok_or_else(|| {
            warn!("failed login for {}", req.email);
            AppError::Unauthorized
        })?;
    let access_token = auth::jwt::create(&state.jwt, &user).map_err(|err| {
        log::error!("[{:} : {:}] token encoding failed: {:?}", file!(), line!(), err);
        AppError::Internal
    })?;
    info!("user {} logged in", user.id);
    Ok(AuthUserResponse {
        access_token,
        user: user.into(),
    })
}

pub async fn get_all(
    state: &AppState,
    filter: &OwnerFilter,
    page: usize,
    limit: usize,
) -> Page<PublicUser> {
    state.delay().await;
    state
        .store
        .users
        .list(filter, page, limit)
        .await
        .map(PublicUser::from)
}

pub async fn get_by_id(state: &AppState, id: Uuid) -> Result<PublicUser, AppError> {
    state.delay().await;
    state.store.users.get(id).await.map(PublicUser::from)
}

/// Profile patch. Credentials cannot be changed through it and only an
/// admin may change a role.
pub async fn update(
    state: &AppState,
    caller: &UserAuthData,
    id: Uuid,
    patch: Value,
) -> Result<PublicUser, AppError> {
    state.delay().await;
    if caller.user_id != id {
        caller.require(Permissions::MANAGE_USERS)?;
    }
    if let Value::Object(fields) = &patch {
        if fields.contains_key("passwordHash") {
            return Err(AppError::validation("password cannot be patched"));
        }
        if fields.contains_key("role") {
            caller.require(Permissions::MANAGE_USERS)?;
        }
    }
    let user = state
        .store
        .users
        .update_checked(id, patch, |user, existing| {
            let taken = existing
                .iter()
                .any(|other| other.id != user.id && other.email.eq_ignore_ascii_case(&user.email));
            if taken {
                return Err(AppError::validation("email is already registered"));
            }
            Ok(())
        })
        .await?;
    info!("user {} updated", user.id);
    Ok(user.into())
}

pub async fn delete(state: &AppState, caller: &UserAuthData, id: Uuid) -> Result<(), AppError> {
    state.delay().await;
    caller.require(Permissions::MANAGE_USERS)?;
    state.store.users.delete(id).await?;
    info!("user {} deleted by {}", id, caller.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::{config::Config, db::Store};

    async fn state() -> AppState {
        let vars = HashMap::from([("JWT_ACCESS_TOKEN".to_string(), "s".to_string())]);
        let config = Config::from_vars(&vars).unwrap();
        AppState::new(Store::in_memory().await.unwrap(), &config)
    }

    async fn register(state: &AppState, name: &str, email: &str) -> PublicUser {
        let dto = NewUserDto {
            name: name.into(),
            email: email.into(),
            pwd: "pwd".into(),
            pwd_confirm: "pwd".into(),
            role: None,
            condominium_id: None,
            unit: None,
        };
        create(state, dto, None).await.unwrap()
    }

    fn as_self(user: &PublicUser) -> UserAuthData {
        UserAuthData {
            user_id: user.id,
            username: user.name.clone(),
            role: user.role,
        }
    }

    #[tokio::test]
    async fn update_keeps_emails_unique() {
        let state = state().await;
        register(&state, "Ana", "ana@example.com").await;
        let bruno = register(&state, "Bruno", "bruno@example.com").await;
        let caller = as_self(&bruno);

        let err = update(&state, &caller, bruno.id, json!({ "email": "ANA@example.com" }))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::validation("email is already registered"));
        assert_eq!(
            get_by_id(&state, bruno.id).await.unwrap().email,
            "bruno@example.com"
        );

        let same = update(&state, &caller, bruno.id, json!({ "email": "BRUNO@example.com" }))
            .await
            .unwrap();
        assert_eq!(same.email, "BRUNO@example.com");
    }

    #[tokio::test]
    async fn residents_cannot_promote_themselves() {
        let state = state().await;
        let ana = register(&state, "Ana", "ana@example.com").await;
        let err = update(&state, &as_self(&ana), ana.id, json!({ "role": "ADMIN" }))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Forbidden);
        let err = update(&state, &as_self(&ana), ana.id, json!({ "passwordHash": "x" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
