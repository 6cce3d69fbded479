use std::future::{ready, Ready};
use std::time::Duration;

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    FromRequest, HttpMessage, HttpRequest,
};
use bitflags::bitflags;
use futures_util::future::LocalBoxFuture;
use log::debug;
use uuid::Uuid;

use crate::{errors::AppError, models::Role};

bitflags! {
    /// What a role may do once its route is reached.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u32 {
        const BOOK = 1;
        const MANAGE_EVENTS = 1 << 1;
        const MANAGE_CONDOS = 1 << 2;
        const MANAGE_USERS = 1 << 3;
        const MANAGE_RECORDS = 1 << 4;
    }
}

impl Role {
    pub fn permissions(self) -> Permissions {
        match self {
            Role::Admin => Permissions::all(),
            Role::Syndic => {
                Permissions::BOOK
                    | Permissions::MANAGE_EVENTS
                    | Permissions::MANAGE_CONDOS
                    | Permissions::MANAGE_RECORDS
            }
            Role::Support => Permissions::BOOK | Permissions::MANAGE_RECORDS,
            Role::Resident => Permissions::BOOK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuthData {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl UserAuthData {
    pub fn require(&self, needed: Permissions) -> Result<(), AppError> {
        if self.role.permissions().contains(needed) {
            Ok(())
        } else {
            debug!("{} ({:?}) lacks {:?}", self.username, self.role, needed);
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequest for UserAuthData {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserAuthData>()
                .cloned()
                .ok_or(AppError::Unauthorized),
        )
    }
}

#[derive(Clone)]
pub struct JwtSettings {
    secret: String,
    pub ttl: Duration,
}

impl JwtSettings {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        JwtSettings {
            secret: secret.to_string(),
            ttl,
        }
    }
}

/// Decodes the bearer token, when there is one, and leaves a
/// [`UserAuthData`] in the request extensions. Routes decide for themselves
/// whether they need it.
pub struct AuthMiddleware {
    pub jwt: JwtSettings,
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt: self.jwt.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt: JwtSettings,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Ok(token) = jwt::parse_request(&req, "Bearer") {
            match jwt::decode_claims(&self.jwt, &token) {
                Ok(claims) => {
                    req.extensions_mut().insert(UserAuthData {
                        user_id: claims.user_id,
                        username: claims.username,
                        role: claims.role,
                    });
                }
                Err(err) => debug!("rejected bearer token: {}", err),
            }
        }
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}

pub mod jwt {
    use actix_web::dev::ServiceRequest;
    use chrono::Utc;
    use jsonwebtoken::{
        decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, Validation,
    };

    use super::JwtSettings;
    use crate::{dto::Claims, errors::AppError, models::User};

    pub fn create(settings: &JwtSettings, user: &User) -> Result<String, Error> {
        let exp = Utc::now().timestamp() as usize + settings.ttl.as_secs() as usize;
        let claims = Claims::new(&user.id, &user.name, user.role, exp);
        let key = EncodingKey::from_secret(settings.secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
    }

    /// Fails on a bad signature or an expired token.
    pub fn decode_claims(settings: &JwtSettings, token: &str) -> Result<Claims, Error> {
        let key = DecodingKey::from_secret(settings.secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &key, &validation).map(|data| data.claims)
    }

    pub fn parse_request(req: &ServiceRequest, prefix: &str) -> Result<String, AppError> {
        if let Some(auth_header) = req.headers().get("Authorization") {
            if let Ok(auth_value) = auth_header.to_str() {
                if let Some(token) = auth_value.strip_prefix(prefix) {
                    return Ok(token.trim().to_string());
                }
            }
        }
        Err(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> crate::models::User {
        crate::models::User {
            id: Uuid::new_v4(),
            name: "Carla".into(),
            email: "carla@example.com".into(),
            role,
            condominium_id: None,
            unit: None,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tokens_round_trip_with_the_same_secret() {
        let settings = JwtSettings::new("secret", Duration::from_secs(60));
        let user = user(Role::Syndic);
        let token = jwt::create(&settings, &user).unwrap();
        let claims = jwt::decode_claims(&settings, &token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.role, Role::Syndic);

        let other = JwtSettings::new("other", Duration::from_secs(60));
        assert!(jwt::decode_claims(&other, &token).is_err());
    }

    #[test]
    fn only_managers_may_manage_events() {
        let auth = |role| UserAuthData {
            user_id: Uuid::nil(),
            username: "x".into(),
            role,
        };
        assert!(auth(Role::Admin).require(Permissions::MANAGE_EVENTS).is_ok());
        assert!(auth(Role::Syndic).require(Permissions::MANAGE_EVENTS).is_ok());
        assert_eq!(
            auth(Role::Resident).require(Permissions::MANAGE_EVENTS),
            Err(AppError::Forbidden)
        );
        assert!(auth(Role::Resident).require(Permissions::BOOK).is_ok());
        assert!(auth(Role::Syndic).require(Permissions::MANAGE_USERS).is_err());
    }
}
