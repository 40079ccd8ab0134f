use std::collections::BTreeMap;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket, Route};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub mod class;
pub mod files;
pub mod pages;
pub mod relationship;
pub mod student;

use class::*;
use files::*;
use pages::*;
use relationship::*;
use student::*;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    data::{class as cd, relationship as rd, student as sd},
    resp::problem::{problems, Problem},
};

/// JSON body as received. Handlers check it is present and non-empty before decoding it.
pub type Body = Option<Json<Map<String, Value>>>;

#[derive(OpenApi)]
#[openapi(
    paths(
        class_list,
        class_create,
        class_get,
        class_update,
        class_delete,
        class_students,
        student_create,
        student_get,
        student_update,
        student_delete,
        weekly_form_get,
        weekly_form_update,
        class_relationships,
        relationship_upsert,
        class_reset
    ),
    components(schemas(
        cd::Class,
        cd::ClassCreateData,
        cd::ClassUpdateData,
        sd::Student,
        sd::StudentDetail,
        sd::StudentCreateData,
        sd::StudentUpdateData,
        rd::Relationship,
        rd::RelationshipUpsertData,
        ResetResponse,
        Problem
    )),
    modifiers(&API_PREFIX)
)]
pub struct ApiDoc;

pub struct PathPrefix(pub &'static str);
static API_PREFIX: PathPrefix = PathPrefix("/api");

impl utoipa::Modify for PathPrefix {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut new_paths = BTreeMap::new();

        for (path, item) in std::mem::take(&mut openapi.paths.paths) {
            new_paths.insert(self.0.to_string() + path.as_ref(), item);
        }

        openapi.paths.paths = new_paths;
    }
}

/// Checks that a body was sent and is a non-empty JSON object.
pub fn require_body(body: Body) -> Result<Map<String, Value>, Problem> {
    match body {
        Some(Json(map)) if !map.is_empty() => Ok(map),
        _ => Err(problems::missing_body()),
    }
}

/// [`require_body`], then decodes the object into `T`.
pub fn parse_body<T: DeserializeOwned>(body: Body) -> Result<T, Problem> {
    let map = require_body(body)?;
    serde_json::from_value(Value::Object(map)).map_err(problems::bad_body)
}

/// Renders unhandled errors as JSON problems.
///
/// Request bodies are decoded by hand, so a 422 can only come from a path segment that failed to
/// parse (`/api/classes/abc`). No such resource exists, so it is reported as a 404.
#[catch(default)]
pub fn default_catcher(status: Status, request: &Request<'_>) -> Problem {
    let status = match status {
        s if s == Status::UnprocessableEntity => Status::NotFound,
        other => other,
    };
    let error = match status.code {
        404 => "Resource not found.",
        500 => "Internal server error.",
        _ => status.reason().unwrap_or("Request failed."),
    };
    tracing::debug!("{} {} -> {}", request.method(), request.uri(), status);

    Problem::new(status, error)
}

pub fn api() -> Vec<Route> {
    routes![
        class_list,
        class_create,
        class_get,
        class_update,
        class_delete,
        class_students,
        student_create,
        student_get,
        student_update,
        student_delete,
        weekly_form_get,
        weekly_form_update,
        class_relationships,
        relationship_upsert,
        class_reset
    ]
}

pub fn pages() -> Vec<Route> {
    routes![
        index_page,
        classes_page,
        relationships_page,
        class_student_page,
        student_page,
        static_file
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/api", api())
        .mount(
            "/",
            SwaggerUi::new("/swagger-ui/<_..>").url("/api/openapi.json", ApiDoc::openapi()),
        )
        .mount("/", pages())
        .register("/", catchers![default_catcher])
}
