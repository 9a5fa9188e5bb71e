use crate::calc;
use crate::model::{AssessmentMap, Teacher};
use crate::roster;

const STATUS_ASSESSED: &str = "assessed";
const STATUS_PENDING: &str = "not yet assessed";

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Class report, one row per rostered student in the teacher's room:
/// number, full name, one column per question (score or "-"), total out of
/// 90, percent to two decimals, both comments, and a status label.
pub fn class_report_csv(teacher: &Teacher, assessments: &AssessmentMap) -> String {
    let question_ids = roster::question_ids();

    let mut csv = String::from("no,student_name");
    for qid in &question_ids {
        csv.push_str(&format!(",q{}", qid));
    }
    csv.push_str(&format!(
        ",total_{},percent,strength,development,status\n",
        calc::max_total()
    ));

    for student in roster::students_in_room(&teacher.room) {
        csv.push_str(&format!(
            "{},{}",
            student.no,
            csv_quote(&student.full_name())
        ));
        match assessments.get(&student.id) {
            Some(record) => {
                for qid in &question_ids {
                    match record.scores.get(qid) {
                        Some(score) => csv.push_str(&format!(",{}", score)),
                        None => csv.push_str(",-"),
                    }
                }
                let summary = calc::score_summary(&record.scores);
                csv.push_str(&format!(
                    ",{},{:.2},{},{},{}\n",
                    summary.total,
                    summary.percent,
                    csv_quote(&record.comments.strength),
                    csv_quote(&record.comments.development),
                    STATUS_ASSESSED
                ));
            }
            None => {
                for _ in &question_ids {
                    csv.push_str(",-");
                }
                csv.push_str(&format!(",-,-,,,{}\n", STATUS_PENDING));
            }
        }
    }

    csv
}
