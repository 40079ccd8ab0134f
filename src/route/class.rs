use crate::data::class::{Class, ClassCreateData, ClassUpdateData};
use crate::data::Storage;
use crate::resp::problem::Problem;
use crate::route::{parse_body, Body};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

/// List all classes
#[utoipa::path(
    responses(
        (status = 200, description = "Every class with its student count", body = Vec<Class>),
    )
)]
#[get("/classes")]
#[tracing::instrument(skip(db))]
pub async fn class_list(db: &State<Storage>) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(db.list_classes().await?))
}

/// Create a class
#[utoipa::path(
    request_body = ClassCreateData,
    responses(
        (status = 200, description = "Created class", body = Class),
        (status = 400, description = "Missing or invalid name", body = Problem),
    )
)]
#[post("/classes", data = "<data>")]
#[tracing::instrument(skip(db))]
pub async fn class_create(data: Body, db: &State<Storage>) -> Result<Json<Class>, Problem> {
    let data: ClassCreateData = parse_body(data)?;
    Ok(Json(db.create_class(data).await?))
}

/// Get class information
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Information about the class", body = Class),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
    )
)]
#[get("/classes/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_get(id: i64, db: &State<Storage>) -> Result<Json<Class>, Problem> {
    Ok(Json(db.get_class(id).await?))
}

/// Update a class; only supplied fields change
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    request_body = ClassUpdateData,
    responses(
        (status = 200, description = "Updated class", body = Class),
        (status = 400, description = "Missing or invalid data", body = Problem),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
    )
)]
#[put("/classes/<id>", data = "<data>")]
#[tracing::instrument(skip(db))]
pub async fn class_update(id: i64, data: Body, db: &State<Storage>) -> Result<Json<Class>, Problem> {
    db.get_class(id).await?;
    let data: ClassUpdateData = parse_body(data)?;
    Ok(Json(db.update_class(id, data).await?))
}

/// Delete a class along with its students and their relationships
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
    )
)]
#[delete("/classes/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_delete(id: i64, db: &State<Storage>) -> Result<Status, Problem> {
    db.delete_class(id).await?;
    Ok(Status::NoContent)
}

///////////////////////
//       TESTS
///////////////////////
