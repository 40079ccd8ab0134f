use rocket::State;
use serde::Serialize;

use crate::data::class::{db as class_db, Class};
use crate::data::relationship::{db as relationship_db, Relationship};
use crate::data::student::{db as student_db, Student};
use crate::data::Storage;
use crate::error::StoreResult;
use crate::resp::page::Page;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Serialize)]
pub struct ClassesPage {
    pub classes: Vec<Class>,
}

#[derive(Debug, Serialize)]
pub struct RelationshipsPage {
    pub class_: Class,
}

#[derive(Debug, Serialize)]
pub struct StudentPage {
    pub student: Student,
    pub class_: Class,
    pub other_students: Vec<Student>,
    pub relationships: Vec<Relationship>,
}

impl StudentPage {
    fn load(conn: &rusqlite::Connection, student: Student) -> StoreResult<StudentPage> {
        let class_ = class_db::get(conn, student.class_id)?;
        let other_students = student_db::list_classmates(conn, class_.id, student.id)?;
        let relationships = relationship_db::list_by_student(conn, student.id)?;

        Ok(StudentPage {
            student,
            class_,
            other_students,
            relationships,
        })
    }
}

async fn classes_overview(db: &Storage) -> Result<Page, Problem> {
    let classes = db.list_classes().await?;
    Ok(Page::new("classes", ClassesPage { classes })?)
}

#[get("/")]
#[tracing::instrument(skip(db))]
pub async fn index_page(db: &State<Storage>) -> Result<Page, Problem> {
    classes_overview(db).await
}

#[get("/classes")]
#[tracing::instrument(skip(db))]
pub async fn classes_page(db: &State<Storage>) -> Result<Page, Problem> {
    classes_overview(db).await
}

#[get("/relationships/<class_id>")]
#[tracing::instrument(skip(db))]
pub async fn relationships_page(class_id: i64, db: &State<Storage>) -> Result<Page, Problem> {
    let class_ = db.get_class(class_id).await?;
    Ok(Page::new("index", RelationshipsPage { class_ })?)
}

#[get("/relationships/<class_id>/student/<student_id>")]
#[tracing::instrument(skip(db))]
pub async fn class_student_page(
    class_id: i64,
    student_id: i64,
    db: &State<Storage>,
) -> Result<Page, Problem> {
    let context = db
        .read(move |conn| {
            let student = student_db::get(conn, student_id)?;
            if student.class_id != class_id {
                return Ok(None);
            }
            StudentPage::load(conn, student).map(Some)
        })
        .await?
        .ok_or_else(|| problems::not_found("The student is not in this class."))?;

    Ok(Page::new("student", context)?)
}

#[get("/student/<student_id>")]
#[tracing::instrument(skip(db))]
pub async fn student_page(student_id: i64, db: &State<Storage>) -> Result<Page, Problem> {
    let context = db
        .read(move |conn| StudentPage::load(conn, student_db::get(conn, student_id)?))
        .await?;

    Ok(Page::new("student", context)?)
}

///////////////////////
//       TESTS
///////////////////////
