use crate::data::student::{Student, StudentCreateData, StudentDetail, StudentUpdateData};
use crate::data::weekly_form::WeeklyForm;
use crate::data::Storage;
use crate::resp::problem::Problem;
use crate::route::{parse_body, require_body, Body};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

/// List the students of a class (without weekly forms)
#[utoipa::path(
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Students in the class", body = Vec<Student>),
    )
)]
#[get("/classes/<id>/students")]
#[tracing::instrument(skip(db))]
pub async fn class_students(id: i64, db: &State<Storage>) -> Result<Json<Vec<Student>>, Problem> {
    Ok(Json(db.list_students(id).await?))
}

/// Add a student to a class
#[utoipa::path(
    request_body = StudentCreateData,
    responses(
        (status = 200, description = "Created student", body = Student),
        (status = 400, description = "Missing fields or unknown class", body = Problem),
    )
)]
#[post("/students", data = "<data>")]
#[tracing::instrument(skip(db))]
pub async fn student_create(data: Body, db: &State<Storage>) -> Result<Json<Student>, Problem> {
    let data: StudentCreateData = parse_body(data)?;
    Ok(Json(db.create_student(data).await?))
}

/// Get a student with their weekly form
#[utoipa::path(
    params(
        ("id", description = "student ID")
    ),
    responses(
        (status = 200, description = "The student", body = StudentDetail),
        (status = 404, description = "Queried student doesn't exist", body = Problem),
    )
)]
#[get("/students/<id>")]
#[tracing::instrument(skip(db))]
pub async fn student_get(id: i64, db: &State<Storage>) -> Result<Json<StudentDetail>, Problem> {
    Ok(Json(db.get_student(id).await?))
}

/// Rename a student
#[utoipa::path(
    params(
        ("id", description = "student ID")
    ),
    request_body = StudentUpdateData,
    responses(
        (status = 200, description = "Updated student", body = Student),
        (status = 400, description = "Missing or invalid data", body = Problem),
        (status = 404, description = "Queried student doesn't exist", body = Problem),
    )
)]
#[put("/students/<id>", data = "<data>")]
#[tracing::instrument(skip(db))]
pub async fn student_update(
    id: i64,
    data: Body,
    db: &State<Storage>,
) -> Result<Json<Student>, Problem> {
    db.get_student(id).await?;
    let data: StudentUpdateData = parse_body(data)?;
    Ok(Json(db.update_student(id, data).await?))
}

/// Delete a student and every relationship they take part in
#[utoipa::path(
    params(
        ("id", description = "student ID")
    ),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Queried student doesn't exist", body = Problem),
    )
)]
#[delete("/students/<id>")]
#[tracing::instrument(skip(db))]
pub async fn student_delete(id: i64, db: &State<Storage>) -> Result<Status, Problem> {
    db.delete_student(id).await?;
    Ok(Status::NoContent)
}

/// Get a student's weekly form
#[utoipa::path(
    params(
        ("id", description = "student ID")
    ),
    responses(
        (status = 200, description = "Stored answers keyed by question"),
        (status = 404, description = "Queried student doesn't exist", body = Problem),
    )
)]
#[get("/students/<id>/weekly-form")]
#[tracing::instrument(skip(db))]
pub async fn weekly_form_get(id: i64, db: &State<Storage>) -> Result<Json<WeeklyForm>, Problem> {
    Ok(Json(db.get_weekly_form(id).await?))
}

/// Merge answers into a student's weekly form
///
/// Only keys starting with `additional_question_` are stored; the rest are ignored.
#[utoipa::path(
    params(
        ("id", description = "student ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "The merged weekly form"),
        (status = 400, description = "Missing data", body = Problem),
        (status = 404, description = "Queried student doesn't exist", body = Problem),
    )
)]
#[put("/students/<id>/weekly-form", data = "<data>")]
#[tracing::instrument(skip(db))]
pub async fn weekly_form_update(
    id: i64,
    data: Body,
    db: &State<Storage>,
) -> Result<Json<WeeklyForm>, Problem> {
    db.get_weekly_form(id).await?;
    let data = require_body(data)?;
    Ok(Json(db.update_weekly_form(id, data).await?))
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod student_endpoints {
    use crate::route::testing::*;
    use rocket::http::Status;
    use serde_json::json;

    #[rocket::async_test]
    async fn created_student_is_listed_once() {
        let client = client().await;
        let class_id = create_class(&client, "3-A").await;
        let other_class = create_class(&client, "3-B").await;
        let student = create_student(&client, class_id, "Alice").await;
        create_student(&client, other_class, "Bob").await;

        let listed = json(
            client
                .get(format!("/api/classes/{}/students", class_id))
                .dispatch()
                .await,
        )
        .await;
        let listed = listed.as_array().unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], student);
        assert_eq!(listed[0]["class_id"], class_id);
        assert!(listed[0].get("weekly_form").is_none());
    }

    #[rocket::async_test]
    async fn listing_unknown_class_is_empty() {
        let client = client().await;

        let listed = json(client.get("/api/classes/77/students").dispatch().await).await;
        assert_eq!(listed, json!([]));
    }

    #[rocket::async_test]
    async fn create_validates_input() {
        let client = client().await;
        let class_id = create_class(&client, "3-A").await;

        for body in [
            json!({"name": "Alice"}),
            json!({"class_id": class_id}),
            json!({"name": "Alice", "class_id": class_id + 1}),
            json!({"name": "Alice", "class_id": "not a number"}),
        ] {
            let response = client.post("/api/students").json(&body).dispatch().await;
            assert_eq!(response.status(), Status::BadRequest, "{}", body);
        }
    }

    #[rocket::async_test]
    async fn get_includes_weekly_form() {
        let client = client().await;
        let class_id = create_class(&client, "3-A").await;
        let id = create_student(&client, class_id, "Alice").await;

        let student = json(client.get(format!("/api/students/{}", id)).dispatch().await).await;
        assert_eq!(student["name"], "Alice");
        assert_eq!(student["weekly_form"], json!({}));
    }

    #[rocket::async_test]
    async fn update_renames() {
        let client = client().await;
        let class_id = create_class(&client, "3-A").await;
        let id = create_student(&client, class_id, "Alice").await;

        let response = client
            .put(format!("/api/students/{}", id))
            .json(&json!({"name": "Alicia"}))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(json(response).await["name"], "Alicia");

        let response = client
            .put(format!("/api/students/{}", id))
            .json(&json!({}))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn missing_student_is_not_found() {
        let client = client().await;

        for uri in ["/api/students/9", "/api/students/9/weekly-form"] {
            let response = client.get(uri).dispatch().await;
            assert_eq!(response.status(), Status::NotFound, "{}", uri);
            assert!(json(response).await["error"].is_string());
        }

        let response = client.delete("/api/students/9").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn update_missing_student_without_data_is_not_found() {
        let client = client().await;

        for uri in ["/api/students/404", "/api/students/404/weekly-form"] {
            let response = client.put(uri).json(&json!({})).dispatch().await;
            assert_eq!(response.status(), Status::NotFound, "{}", uri);

            let response = client.put(uri).dispatch().await;
            assert_eq!(response.status(), Status::NotFound, "{}", uri);
        }
    }

    #[rocket::async_test]
    async fn delete_cascades_relationships() {
        let client = client().await;
        let class_id = create_class(&client, "3-A").await;
        let alice = create_student(&client, class_id, "Alice").await;
        let bob = create_student(&client, class_id, "Bob").await;
        let carol = create_student(&client, class_id, "Carol").await;

        for (from, to) in [(alice, bob), (bob, alice), (carol, alice), (bob, carol)] {
            post_json(
                &client,
                "/api/relationships",
                json!({"student_id": from, "friend_id": to, "relationship_type": "friend"}),
            )
            .await;
        }

        let response = client.delete(format!("/api/students/{}", alice)).dispatch().await;
        assert_eq!(response.status(), Status::NoContent);

        let relationships = json(
            client
                .get(format!("/api/classes/{}/relationships", class_id))
                .dispatch()
                .await,
        )
        .await;
        let relationships = relationships.as_array().unwrap();

        assert_eq!(relationships.len(), 1);
        assert!(relationships
            .iter()
            .all(|r| r["student_id"] != alice && r["friend_id"] != alice));
    }

    #[rocket::async_test]
    async fn weekly_form_keeps_only_question_keys() {
        let client = client().await;
        let class_id = create_class(&client, "3-A").await;
        let id = create_student(&client, class_id, "Alice").await;
        let uri = format!("/api/students/{}/weekly-form", id);

        let response = client
            .put(uri.clone())
            .json(&json!({"additional_question_1": "x", "unrelated_key": "y"}))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(json(response).await, json!({"additional_question_1": "x"}));

        let stored = json(client.get(uri.clone()).dispatch().await).await;
        assert_eq!(stored, json!({"additional_question_1": "x"}));

        let response = client
            .put(uri.clone())
            .json(&json!({"additional_question_2": [1, 2]}))
            .dispatch()
            .await;
        assert_eq!(
            json(response).await,
            json!({"additional_question_1": "x", "additional_question_2": [1, 2]})
        );

        let student = json(client.get(format!("/api/students/{}", id)).dispatch().await).await;
        assert_eq!(student["weekly_form"]["additional_question_2"], json!([1, 2]));
    }

    #[rocket::async_test]
    async fn weekly_form_requires_body() {
        let client = client().await;
        let class_id = create_class(&client, "3-A").await;
        let id = create_student(&client, class_id, "Alice").await;
        let uri = format!("/api/students/{}/weekly-form", id);

        let response = client.put(uri.clone()).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client.put(uri).json(&json!({})).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
    }
}
