use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::AssessmentData;
use crate::roster;
use chrono::Utc;
use serde_json::json;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assessments.init" => Some(handle_init(state, req)),
        "assessments.save" => Some(handle_save(state, req)),
        "assessments.summary" => Some(handle_summary(state, req)),
        _ => None,
    }
}

fn handle_init(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(repo) = state.repo.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let outcome = repo.initialize();
    ok(
        &req.id,
        json!({
            "assessments": repo.assessments(),
            "source": outcome.source.as_str(),
            "offlineNotice": outcome.offline_notice,
        }),
    )
}

fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(repo) = state.repo.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(teacher) = repo.session().cloned() else {
        return err(&req.id, "no_session", "log in before saving", None);
    };

    let Some(raw) = req.params.get("assessment") else {
        return err(&req.id, "bad_params", "missing params.assessment", None);
    };
    let mut record: AssessmentData = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "bad_params",
                format!("invalid assessment payload: {}", e),
                None,
            )
        }
    };

    let Some(student) = roster::find_student(record.student_id) else {
        return err(
            &req.id,
            "unknown_student",
            format!("student {} is not on the roster", record.student_id),
            None,
        );
    };
    if student.room != teacher.room {
        return err(
            &req.id,
            "wrong_room",
            format!(
                "student {} belongs to room {}, session room is {}",
                student.id, student.room, teacher.room
            ),
            None,
        );
    }

    // Submission gate: incomplete or out-of-range input is rejected here,
    // before any collection or snapshot mutation.
    if let Err(e) = calc::validate_submission(&record.scores) {
        let details = match &e {
            calc::SubmissionError::Incomplete { answered, required } => Some(json!({
                "answered": answered,
                "required": required,
            })),
            _ => None,
        };
        return err(&req.id, e.code(), e.message(), details);
    }

    record.teacher_name = teacher.name.clone();
    record.date = Utc::now().to_rfc3339();

    let summary = calc::score_summary(&record.scores);
    match repo.save(&student, record.clone()) {
        Ok(outcome) => ok(
            &req.id,
            json!({
                "outcome": outcome.as_str(),
                "assessment": record,
                "summary": summary,
            }),
        ),
        Err(e) => err(&req.id, "local_write_failed", e.to_string(), None),
    }
}

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(repo) = state.repo.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(teacher) = repo.session() else {
        return err(&req.id, "no_session", "log in first", None);
    };

    let students = roster::students_in_room(&teacher.room);
    let mut assessed = 0usize;
    let rows: Vec<serde_json::Value> = students
        .iter()
        .map(|student| match repo.get(student.id) {
            Some(record) => {
                assessed += 1;
                let summary = calc::score_summary(&record.scores);
                json!({
                    "studentId": student.id,
                    "no": student.no,
                    "name": student.full_name(),
                    "assessed": true,
                    "total": summary.total,
                    "percent": summary.percent,
                    "date": record.date,
                })
            }
            None => json!({
                "studentId": student.id,
                "no": student.no,
                "name": student.full_name(),
                "assessed": false,
            }),
        })
        .collect();

    ok(
        &req.id,
        json!({
            "room": teacher.room,
            "rows": rows,
            "counts": {
                "assessed": assessed,
                "pending": students.len() - assessed,
                "total": students.len(),
            },
        }),
    )
}
