//! Demo seed data: a small helper roster and two resolved cases so the
//! similarity search has something to match against on a fresh start.

use crate::store::CaseStore;
use oracle_common::rpc::Submission;
use tracing::info;

pub fn seed_demo_data(store: &mut CaseStore) {
    store.add_helper(
        "Alice Chen",
        vec![
            "Data Structures".into(),
            "Trees".into(),
            "Red-Black Trees".into(),
            "AVL Trees".into(),
        ],
    );
    store.add_helper(
        "Bob Smith",
        vec![
            "Systems".into(),
            "C Programming".into(),
            "Pointers".into(),
            "Memory Management".into(),
        ],
    );
    store.add_helper(
        "Charlie Davis",
        vec![
            "Algorithms".into(),
            "Dynamic Programming".into(),
            "Graph Algorithms".into(),
        ],
    );
    store.add_helper(
        "Diana Wu",
        vec![
            "Debugging".into(),
            "Testing".into(),
            "Python".into(),
            "General CS".into(),
        ],
    );

    let r1 = store.add_request(&Submission {
        student_name: "Past Student".into(),
        course: "CS 400".into(),
        question_text: "How do I fix rotations in red-black tree deletion?".into(),
        code_snippet: None,
        preferred_helper_id: None,
    });
    store
        .add_knowledge_entry(
            r1,
            "Red-Black Tree Deletion",
            vec![
                "trees".into(),
                "red-black".into(),
                "deletion".into(),
                "rotations".into(),
            ],
            "Student struggling with case 3 of RB tree deletion fixup",
            "1. Identify the case (sibling color, nephew colors)\n2. Apply rotation\n3. Recolor nodes\n4. Recurse if needed",
        )
        .expect("seed request exists");

    let r2 = store.add_request(&Submission {
        student_name: "Past Student".into(),
        course: "CS 354".into(),
        question_text: "Segfault when dereferencing pointer in malloc'd struct".into(),
        code_snippet: Some("char *ptr = malloc(sizeof(MyStruct));".into()),
        preferred_helper_id: None,
    });
    store
        .add_knowledge_entry(
            r2,
            "Memory Allocation Error",
            vec![
                "c".into(),
                "pointers".into(),
                "malloc".into(),
                "segfault".into(),
            ],
            "Incorrect pointer arithmetic after malloc",
            "1. Check malloc return value\n2. Verify sizeof() usage\n3. Check pointer arithmetic\n4. Use valgrind to detect issues",
        )
        .expect("seed request exists");

    info!(
        helpers = store.active_roster().len(),
        knowledge_entries = store.knowledge_len(),
        "Seeded demo data"
    );
}
