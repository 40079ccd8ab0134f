use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

use crate::error::StoreError;

/// JSON error body shared by every failing route and catcher: `{"error": ..., "status": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub error: String,

    pub detail: Option<String>,

    #[schema(value_type = Object)]
    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            error: "Internal server error.".to_string(),
            detail: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new(status: Status, error: impl ToString) -> Problem {
        Problem {
            status,
            error: error.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert<V: Serialize>(&mut self, key: impl ToString, value: V) -> &mut Problem {
        if let Ok(value) = serde_json::to_value(value) {
            self.body.insert(key.to_string(), value);
        }
        self
    }

    pub fn to_json(&self) -> String {
        let mut body = self.body.clone();

        body.insert(String::from("error"), Value::from(self.error.clone()));
        body.insert(String::from("status"), Value::from(self.status.code));
        if let Some(detail) = &self.detail {
            body.insert(String::from("detail"), Value::from(detail.clone()));
        }

        Value::Object(body).to_string()
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.error)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let body_string = self.to_json();

        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn missing_body() -> Problem {
        Problem::new(Status::BadRequest, "Request data is required.")
    }

    #[inline]
    pub fn bad_body(e: serde_json::Error) -> Problem {
        Problem::new(Status::BadRequest, "Request data is invalid.")
            .detail(e)
            .to_owned()
    }

    #[inline]
    pub fn not_found(what: impl ToString) -> Problem {
        Problem::new(Status::NotFound, what)
    }
}

impl From<StoreError> for Problem {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(message) => Problem::new(Status::BadRequest, message),
            StoreError::NotFound { entity, id } => {
                Problem::new(Status::NotFound, format!("The {} doesn't exist.", entity))
                    .insert(entity, id)
                    .to_owned()
            }
            other => {
                tracing::error!("storage failure while handling request: {}", other);
                Problem::new(
                    Status::InternalServerError,
                    "Storage failed while processing request.",
                )
                .detail(other)
                .to_owned()
            }
        }
    }
}

impl From<serde_json::Error> for Problem {
    fn from(e: serde_json::Error) -> Self {
        tracing::error!("unable to serialize response data: {}", e);
        Problem::new(
            Status::InternalServerError,
            "An error occurred while processing JSON data.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(problem: &Problem) -> Map<String, Value> {
        match serde_json::from_str(&problem.to_json()).unwrap() {
            Value::Object(map) => map,
            other => panic!("unexpected problem body: {}", other),
        }
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let problem = Problem::from(StoreError::validation("class name cannot be blank"));
        assert_eq!(problem.status, Status::BadRequest);

        let body = parsed(&problem);
        assert_eq!(body["error"], "class name cannot be blank");
        assert_eq!(body["status"], 400);
    }

    #[test]
    fn not_found_names_the_entity() {
        let problem = Problem::from(StoreError::not_found("student", 5));
        assert_eq!(problem.status, Status::NotFound);

        let body = parsed(&problem);
        assert_eq!(body["student"], 5);
        assert!(body["error"].as_str().unwrap().contains("student"));
    }

    #[test]
    fn database_failure_is_internal() {
        let problem = Problem::from(StoreError::Database(rusqlite::Error::InvalidQuery));
        assert_eq!(problem.status, Status::InternalServerError);
        assert!(parsed(&problem).contains_key("detail"));
    }
}
