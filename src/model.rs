use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full session collection: one record per student, keyed by student id.
pub type AssessmentMap = BTreeMap<i64, AssessmentData>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub username: String,
    pub name: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub no: u32,
    pub prefix: String,
    pub first_name: String,
    pub last_name: String,
    pub room: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.prefix, self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: u32,
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Comments {
    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub development: String,
}

/// One assessment record. `teacher_name` and `date` are stamped by the
/// daemon at save time from the active session; incoming submissions may
/// omit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentData {
    pub student_id: i64,
    pub scores: BTreeMap<u32, u8>,
    #[serde(default)]
    pub comments: Comments,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub date: String,
}
