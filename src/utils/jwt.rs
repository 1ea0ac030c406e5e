use jsonwebtoken::{decode, Validation, DecodingKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use log::debug;

use actix_web::dev::{Payload, ServiceRequest};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures_util::future::{ready, Ready};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id of the token holder.
    pub sub: String,
    pub exp: usize,
}

/// HS256 verification key for the tokens issued by the identity provider.
/// Shared with the handlers through `web::Data`. This service never signs.
#[derive(Clone)]
pub struct JwtKeys {
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        JwtKeys {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validates a JWT token and returns the claims if valid.
    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::new(jsonwebtoken::Algorithm::HS256))
            .map(|data| data.claims)
    }
}

/// Validator function for the `HttpAuthentication::with_fn` middleware.
/// A missing or malformed header arrives as `None` so the 401 carries the
/// usual JSON error body. Valid claims are stored in the request extensions
/// for [`CurrentUser`].
pub async fn validator(
    req: ServiceRequest,
    credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let credentials = match credentials {
        Some(credentials) => credentials,
        None => return Err((AppError::Unauthorized("Unauthorized".to_string()).into(), req)),
    };

    let keys = match req.app_data::<web::Data<JwtKeys>>().cloned() {
        Some(keys) => keys,
        None => {
            return Err((
                AppError::InternalServerError("Authentication is not configured".to_string()).into(),
                req,
            ))
        }
    };

    match keys.validate_token(credentials.token()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(err) => {
            debug!("Rejected bearer token: {}", err);
            Err((AppError::Unauthorized("Invalid token".to_string()).into(), req))
        }
    }
}

/// Identity of the authenticated caller. Every data handler takes one, so a
/// request without valid claims never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<Claims>()
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
            .and_then(|claims| {
                Uuid::parse_str(&claims.sub)
                    .map(|user_id| CurrentUser { user_id })
                    .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
            });
        ready(user)
    }
}
