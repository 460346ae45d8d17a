use crate::server::database::store::StoreError;
use crate::server::model::MessageResponse;
use actix_web::http::StatusCode;
use actix_web::{error, HttpResponse};
use derive_more::{Display, Error};

/// Every failure a handler can answer with; rendered as `{"message": ...}`
#[derive(Debug, Display, Error, PartialEq)]
pub(crate) enum ApiError {
    #[display("{_0}")]
    BadRequest(#[error(not(source))] String),
    #[display("authentication required")]
    Unauthorized,
    #[display("access denied")]
    Forbidden,
    #[display("resource not found")]
    NotFound,
    #[display("{_0}")]
    Conflict(#[error(not(source))] String),
    #[display("server is busy")]
    ServerIsBusy,
    #[display("database error")]
    DbError,
    #[display("payment provider error")]
    PaymentProvider,
    #[display("webhook error")]
    Webhook,
    #[display("timeout occurred")]
    Timeout,
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServerIsBusy | ApiError::DbError | ApiError::Webhook => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::PaymentProvider => StatusCode::BAD_GATEWAY,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(MessageResponse::new(self.to_string()))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Busy => ApiError::ServerIsBusy,
            StoreError::Conflict(message) => ApiError::Conflict(message),
            StoreError::Db(_) => ApiError::DbError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    #[actix_web::test]
    async fn internal_detail_is_not_rendered() {
        let err = ApiError::from(StoreError::Db("relation \"order\" does not exist".to_string()));
        let res = err.error_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(res.into_body()).await.unwrap();
        assert_eq!(&body[..], br#"{"message":"database error"}"#);
    }

    #[test]
    fn conflicts_keep_their_message() {
        let err = ApiError::from(StoreError::Conflict("Email already exist".to_string()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Email already exist");
    }
}
