use rocket::data::{Data, FromData, Limits, Outcome};
use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::{Json, serde_json};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::RequestBody;
use rocket_okapi::request::OpenApiFromData;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::ops::Deref;
use tracing::warn;

const BODY_PREVIEW_CHARS: usize = 500;

/// JSON request body that answers 400 when the payload does not deserialize
/// and logs where parsing stopped.
///
/// A malformed field is a client validation error, distinct from the 422
/// reserved for an ineligible instructor.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T> Deref for JsonBody<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Parse failure message left for the 400 catcher.
#[derive(Debug, Clone)]
pub struct RejectedBody(pub String);

fn preview(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.chars().count() > BODY_PREVIEW_CHARS {
        format!("{}...", text.chars().take(BODY_PREVIEW_CHARS).collect::<String>())
    } else {
        text.into_owned()
    }
}

#[rocket::async_trait]
impl<'r, T: DeserializeOwned> FromData<'r> for JsonBody<T> {
    type Error = serde_json::Error;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        let limit = req.limits().get("json").unwrap_or(Limits::JSON);

        let bytes = match data.open(limit).into_bytes().await {
            Ok(bytes) if bytes.is_complete() => bytes.into_inner(),
            Ok(_) => {
                warn!(method = %req.method(), uri = %req.uri(), limit = %limit, "JSON payload exceeded size limit");
                return Outcome::Error((Status::PayloadTooLarge, serde_json::Error::io(std::io::Error::other("payload too large"))));
            }
            Err(e) => {
                warn!(method = %req.method(), uri = %req.uri(), error = %e, "failed to read request body");
                return Outcome::Error((Status::BadRequest, serde_json::Error::io(e)));
            }
        };

        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => Outcome::Success(JsonBody(value)),
            Err(e) => {
                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    error_message = %e,
                    error_line = e.line(),
                    error_column = e.column(),
                    error_category = ?e.classify(),
                    request_body = %preview(&bytes),
                    "failed to parse JSON request body"
                );
                let message = format!("Invalid request body: {e}");
                req.local_cache(|| Some(RejectedBody(message)));
                Outcome::Error((Status::BadRequest, e))
            }
        }
    }
}

impl<'r, T: DeserializeOwned + JsonSchema> OpenApiFromData<'r> for JsonBody<T> {
    fn request_body(generator: &mut OpenApiGenerator) -> rocket_okapi::Result<RequestBody> {
        Json::<T>::request_body(generator)
    }
}
