//! Static configuration: student roster, rubric definition, and the
//! teacher credential table. These mirror the school's published lists and
//! are compiled in; nothing here is mutated at runtime.

use crate::model::{Indicator, Question, Student, Teacher};

fn q(id: u32, text: &str) -> Question {
    Question {
        id,
        text: text.to_string(),
    }
}

/// The fixed life-skills rubric: 30 questions grouped into four indicators,
/// each scored 0-3.
pub fn indicators() -> Vec<Indicator> {
    vec![
        Indicator {
            id: 1,
            title: "Self-awareness and self-esteem".to_string(),
            questions: vec![
                q(1, "Recognises own strengths and weaknesses"),
                q(2, "Accepts praise and criticism appropriately"),
                q(3, "Shows confidence when presenting to the class"),
                q(4, "Takes responsibility for own belongings and work"),
                q(5, "Sets personal goals and follows them up"),
                q(6, "Expresses own opinions while respecting others"),
                q(7, "Shows pride in own achievements without boasting"),
                q(8, "Adapts behaviour to different situations"),
            ],
        },
        Indicator {
            id: 2,
            title: "Communication and interpersonal relationships".to_string(),
            questions: vec![
                q(9, "Listens attentively when others are speaking"),
                q(10, "Uses polite language with teachers and peers"),
                q(11, "Works cooperatively in group activities"),
                q(12, "Offers help to classmates who are struggling"),
                q(13, "Resolves disagreements without aggression"),
                q(14, "Shares materials and takes turns fairly"),
                q(15, "Communicates needs and feelings clearly"),
                q(16, "Builds and maintains friendships"),
            ],
        },
        Indicator {
            id: 3,
            title: "Decision making and problem solving".to_string(),
            questions: vec![
                q(17, "Thinks before acting in new situations"),
                q(18, "Considers consequences when making choices"),
                q(19, "Breaks larger tasks into manageable steps"),
                q(20, "Seeks information before reaching conclusions"),
                q(21, "Asks for help when a problem is beyond them"),
                q(22, "Evaluates more than one solution to a problem"),
                q(23, "Learns from mistakes rather than repeating them"),
            ],
        },
        Indicator {
            id: 4,
            title: "Coping with emotions and stress".to_string(),
            questions: vec![
                q(24, "Recognises and names own emotions"),
                q(25, "Stays calm when plans change unexpectedly"),
                q(26, "Manages frustration during difficult tasks"),
                q(27, "Uses appropriate outlets for strong feelings"),
                q(28, "Recovers from setbacks within a reasonable time"),
                q(29, "Avoids taking stress out on other people"),
                q(30, "Knows when and where to seek emotional support"),
            ],
        },
    ]
}

/// Flat list of the defined question ids, in rubric order.
pub fn question_ids() -> Vec<u32> {
    indicators()
        .iter()
        .flat_map(|ind| ind.questions.iter().map(|qu| qu.id))
        .collect()
}

fn s(id: i64, no: u32, prefix: &str, first: &str, last: &str, room: &str) -> Student {
    Student {
        id,
        no,
        prefix: prefix.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        room: room.to_string(),
    }
}

pub fn students() -> Vec<Student> {
    vec![
        s(1, 1, "Master", "Anan", "Srisuwan", "m1a"),
        s(2, 2, "Miss", "Benjawan", "Kitti", "m1a"),
        s(3, 3, "Master", "Chai", "Phongpan", "m1a"),
        s(4, 4, "Miss", "Duangjai", "Meesuk", "m1a"),
        s(5, 5, "Master", "Ekachai", "Wongsa", "m1a"),
        s(6, 1, "Miss", "Fonthip", "Chaiyo", "m1b"),
        s(7, 2, "Master", "Gan", "Suksai", "m1b"),
        s(8, 3, "Miss", "Hansa", "Rattana", "m1b"),
        s(9, 1, "Master", "Itthi", "Boonmee", "m2a"),
        s(10, 2, "Miss", "Jintana", "Sawat", "m2a"),
        s(11, 3, "Master", "Krit", "Thongdee", "m2a"),
        s(12, 1, "Miss", "Lalita", "Prasert", "m3a"),
        s(13, 2, "Master", "Mongkut", "Intharat", "m3a"),
    ]
}

pub fn students_in_room(room: &str) -> Vec<Student> {
    students().into_iter().filter(|st| st.room == room).collect()
}

pub fn find_student(id: i64) -> Option<Student> {
    students().into_iter().find(|st| st.id == id)
}

fn t(username: &str, name: &str, room: &str) -> Teacher {
    Teacher {
        username: username.to_string(),
        name: name.to_string(),
        room: room.to_string(),
    }
}

pub fn teachers() -> Vec<Teacher> {
    vec![
        t("teacherm1a", "Mrs. Siriporn Chanthra", "m1a"),
        t("teacherm1b", "Mr. Prasit Wongchai", "m1b"),
        t("teacherm2a", "Mrs. Kanda Suwannarat", "m2a"),
        t("teacherm3a", "Mr. Somchai Boonruang", "m3a"),
    ]
}

/// Placeholder credential scheme carried over from the source system:
/// a login succeeds when the password equals the username. Not a security
/// boundary.
pub fn authenticate(username: &str, password: &str) -> Option<Teacher> {
    if username.is_empty() || password != username {
        return None;
    }
    teachers().into_iter().find(|te| te.username == username)
}
