// Shared prompt fragments. Each service that calls the model keeps its own
// prompts.rs alongside it; only cross-cutting wording lives here.

/// Appended to every prompt whose output is shown to the user verbatim.
pub const PLAIN_TEXT_ONLY: &str = "説明や前置き、マークダウン記法は付けずに、結果のみを返してください。";
