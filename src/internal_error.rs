use rusqlite;
use std::error::Error;

use std::fmt;
use std::sync::PoisonError;

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};

#[derive(Debug)]
pub struct InternalError {
    what: String,
    status: Status,
}

impl Error for InternalError {}
impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Generic internal error: {}", self.what)
    }
}

impl<T> From<PoisonError<T>> for InternalError {
    fn from(e: PoisonError<T>) -> InternalError {
        InternalError {
            what: e.to_string(),
            status: Status::InternalServerError,
        }
    }
}

impl From<rusqlite::Error> for InternalError {
    fn from(e: rusqlite::Error) -> InternalError {
        let status = match e {
            rusqlite::Error::QueryReturnedNoRows => Status::NotFound,
            _ => Status::InternalServerError,
        };

        InternalError {
            what: e.to_string(),
            status,
        }
    }
}

impl From<chrono::ParseError> for InternalError {
    fn from(e: chrono::ParseError) -> InternalError {
        InternalError {
            what: e.to_string(),
            status: Status::InternalServerError,
        }
    }
}

impl From<&str> for InternalError {
    fn from(s: &str) -> InternalError {
        InternalError {
            what: s.to_string(),
            status: Status::BadRequest,
        }
    }
}

impl<'r> Responder<'r, 'static> for InternalError {
    fn respond_to(self, _request: &'r Request<'_>) -> response::Result<'static> {
        if self.status == Status::InternalServerError {
            log::warn!("request failed: {}", self.what);
        }
        Err(self.status)
    }
}

pub type InternalResult<T> = Result<T, InternalError>;
