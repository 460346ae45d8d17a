use crate::server::controller::error::ApiError;
use crate::server::model::UserId;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Header the authentication layer in front of the server fills with the signed-in user
pub(crate) const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user making the request
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Caller(pub UserId);

impl Caller {
    /// Only the owner may touch resources under `/user/{id}`.
    pub fn ensure_is(&self, user_id: UserId) -> Result<(), ApiError> {
        if self.0 == user_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl FromRequest for Caller {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let caller = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<UserId>().ok())
            .map(Caller)
            .ok_or(ApiError::Unauthorized);
        ready(caller)
    }
}
