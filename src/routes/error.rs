use crate::error::json::RejectedBody;
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Error {
    pub message: String,
}

#[catch(400)]
pub fn bad_request(req: &Request) -> Json<Error> {
    let message = req
        .local_cache(|| None::<RejectedBody>)
        .as_ref()
        .map(|rejected| rejected.0.clone())
        .unwrap_or_else(|| "Bad request".to_string());
    Json(Error { message })
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<Error> {
    Json(Error {
        message: format!("Route {} not found", req.uri()),
    })
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<Error> {
    Json(Error {
        message: "Conflict".to_string(),
    })
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<Error> {
    Json(Error {
        message: "Invalid field in request".to_string(),
    })
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<Error> {
    Json(Error {
        message: "Internal server error".to_string(),
    })
}
