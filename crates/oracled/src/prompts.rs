//! Stage prompt building for the generation gateway.
//!
//! Each stage has a fixed system instruction demanding machine-parseable
//! JSON only, plus a user prompt assembled from structured input. The
//! backend does the semantic work; these prompts only shape it.

use oracle_common::rpc::{RosterEntry, Submission};
use oracle_common::types::{ExtractedMetadata, HelperId, KnowledgeEntry};

pub const EXTRACTION_SYSTEM: &str = r#"You are the question analyzer for a CS office-hours routing system.

Your job: analyze a student question and extract structured metadata.

Output ONLY valid JSON with this exact schema:
{
  "category": "string - specific topic like 'Red-Black Tree Deletion' or 'Segfault in C Pointers'",
  "difficulty": "LOW | MEDIUM | HIGH",
  "estimated_minutes": integer between 5 and 30,
  "tags": ["list", "of", "relevant", "keywords"],
  "summary": "1-2 sentence description of the core problem"
}

Rules:
- Be specific with category (not just "Data Structures" but "AVL Tree Rotations")
- estimated_minutes: LOW=5-10, MEDIUM=10-20, HIGH=20-30
- tags: 3-7 keywords that would help match to helper expertise
- If code is provided, incorporate it into your analysis
- Output MUST be valid JSON only, no markdown, no explanation"#;

pub const RANKING_SYSTEM: &str = r#"You are the helper matcher for a CS office-hours routing system.

Your job: match a question to the best available staff helper based on expertise and current queue load.

Output ONLY valid JSON with this exact schema:
{
  "recommended_helper_id": integer,
  "alternate_helper_ids": [list of integer helper IDs],
  "priority_score": float between 0 and 100,
  "rationale": "brief explanation of why this helper is best"
}

Matching criteria (in order of importance):
1. Expertise match (question tags overlap with helper expertise)
2. Current queue length (prefer helpers with shorter queues)
3. Estimated difficulty vs helper specialization depth
4. Student preference (a bias, not an override)

Rules:
- recommended_helper_id MUST be one of the listed helper IDs
- alternate_helper_ids: 1-2 backup options
- priority_score: higher = better match (100 = perfect expert with no queue)
- Output MUST be valid JSON only, no markdown"#;

pub const SYNTHESIS_SYSTEM: &str = r#"You are the guidance synthesizer for a CS office-hours routing system.

Your job: relate the current question to similar past cases and produce teaching guidance.

Output ONLY valid JSON with this exact schema:
{
  "similar_entry_ids": [list of integer knowledge-base IDs],
  "similarity_explanation": "why these past cases are relevant",
  "answer_outline": "bullet-point teaching plan for the helper (3-5 steps)",
  "student_hint": "non-spoiler hint for the student while they wait"
}

Rules:
- similar_entry_ids: only IDs taken from the knowledge-base entries provided
- answer_outline: step-by-step teaching approach, not a full solution
- student_hint: point the student in the right direction without giving away the answer
- Output MUST be valid JSON only, no markdown"#;

/// User prompt for the extraction stage.
pub fn extraction_prompt(submission: &Submission) -> String {
    let mut prompt = format!(
        "Student: {}\nCourse: {}\nQuestion: {}",
        submission.student_name, submission.course, submission.question_text
    );
    if let Some(code) = &submission.code_snippet {
        prompt.push_str("\n\nCode:\n");
        prompt.push_str(code);
    }
    prompt
}

/// User prompt for the ranking stage.
pub fn ranking_prompt(
    metadata: &ExtractedMetadata,
    roster: &[RosterEntry],
    preferred: Option<HelperId>,
) -> String {
    let roster_info: Vec<String> = roster
        .iter()
        .map(|h| {
            format!(
                "Helper {}: {} | Expertise: {} | Queue: {} students",
                h.id,
                h.name,
                h.expertise_tags.join(", "),
                h.queue_count
            )
        })
        .collect();

    let mut prompt = format!(
        "Question analysis:\nCategory: {}\nDifficulty: {}\nEstimated time: {} minutes\nTags: {}\nSummary: {}\n\nAvailable helpers:\n{}",
        metadata.category,
        metadata.difficulty,
        metadata.estimated_minutes,
        metadata.tags.join(", "),
        metadata.summary,
        roster_info.join("\n")
    );

    if let Some(id) = preferred {
        prompt.push_str(&format!("\n\nStudent prefers helper ID: {}", id));
    }
    prompt
}

/// User prompt for the synthesis stage.
///
/// An empty shortlist is a normal outcome; the prompt says so explicitly
/// rather than leaving the section out.
pub fn synthesis_prompt(
    question_text: &str,
    metadata: &ExtractedMetadata,
    candidates: &[KnowledgeEntry],
) -> String {
    let kb_info = if candidates.is_empty() {
        "No similar questions in the knowledge base yet.".to_string()
    } else {
        candidates
            .iter()
            .map(|e| {
                format!(
                    "KB entry {}:\nCategory: {}\nTags: {}\nSummary: {}\nOutline: {}",
                    e.id,
                    e.category,
                    e.tags.join(", "),
                    e.summary,
                    e.solution_outline
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        "Current question:\nText: {}\nCategory: {}\nTags: {}\nSummary: {}\n\nSimilar past questions:\n{}",
        question_text,
        metadata.category,
        metadata.tags.join(", "),
        metadata.summary,
        kb_info
    )
}
