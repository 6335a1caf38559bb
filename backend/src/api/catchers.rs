//! Every status Rocket produces on its own (unmatched route, unparsable body, panicking
//! handler) gets the same problem document as the errors our handlers return.

use rocket::{http::Status, Request};

use crate::errors::PeducServeError;

#[catch(400)]
pub fn bad_request(req: &Request) -> PeducServeError {
    PeducServeError::new(Status::BadRequest, format!("Malformed request to {}", req.uri()))
}

#[catch(404)]
pub fn not_found(req: &Request) -> PeducServeError {
    PeducServeError::new(Status::NotFound, format!("No route for {} {}", req.method(), req.uri()))
}

#[catch(422)]
pub fn unprocessable(req: &Request) -> PeducServeError {
    PeducServeError::new(
        Status::BadRequest,
        format!("Request to {} could not be deserialized", req.uri()),
    )
}

#[catch(default)]
pub fn default(status: Status, req: &Request) -> PeducServeError {
    log::warn!(status = status.code; "unhandled status for {}", req.uri());
    PeducServeError::new(status, status.reason_lossy().to_string())
}
