use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::weekly_form::{self, WeeklyForm};

pub mod db;

pub const NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub class_id: i64,

    /// Raw serialized weekly form, parsed on demand by [`Student::into_detail`].
    #[serde(skip)]
    pub(crate) weekly_form_json: Option<String>,
}

impl Student {
    pub fn weekly_form(&self) -> WeeklyForm {
        weekly_form::parse(self.id, self.weekly_form_json.as_deref())
    }

    pub fn into_detail(self) -> StudentDetail {
        let weekly_form = self.weekly_form();
        StudentDetail {
            id: self.id,
            name: self.name,
            class_id: self.class_id,
            weekly_form,
        }
    }
}

/// A student together with their parsed weekly form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentDetail {
    pub id: i64,
    pub name: String,
    pub class_id: i64,
    #[schema(value_type = Object)]
    pub weekly_form: WeeklyForm,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StudentCreateData {
    pub name: String,
    pub class_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StudentUpdateData {
    #[serde(default)]
    pub name: Option<String>,
}
