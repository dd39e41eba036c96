//! Instructions sent to the vision model.
//!
//! Both prompts are parameterised only by the question count. Keeping them
//! here lets tests inspect the exact text without building a request.

/// System instruction: output contract for the question array.
///
/// The model is told to emit a single-line JSON array whose objects carry
/// exactly the keys decoded by [`crate::Question`].
pub fn system_prompt(question_count: u32) -> String {
    format!(
        "Generate {question_count} questions about the given image(s), each with 4 options \
and an answer and an explanation as to why the answer is correct. Output the result as a \
JSON array without spaces or line breaks. Also don't reference the image(s), the questions \
should be self explanatory. Use the format: \
[{{\"id\":question number starting from zero,\"question\":\"question text\",\
\"options\":{{\"A\":\"option1\",\"B\":\"option2\",\"C\":\"option3\",\"D\":\"option4\"}},\
\"answer\":\"option\",\"hint\":\"explanation\"}}]"
    )
}

/// User instruction accompanying the page images.
pub fn user_prompt(question_count: u32) -> String {
    format!("Generate {question_count} questions from the given image(s).")
}
