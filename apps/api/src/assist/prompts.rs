// Prompt templates for the assist service.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::PLAIN_TEXT_ONLY;

/// Proofreading prompt. Replace `{text}` before sending.
pub const PROOFREAD_PROMPT_TEMPLATE: &str = "以下の文章を校正してください。誤字脱字、文法の間違いを修正してください。\
大きな意味の変更や大幅な文字の削減はしないでください。校正後の文章のみを返してください。\
{plain}\n\n文章:\n{text}";

/// Interview-question prompt. Replace `{self_pr}` before sending.
pub const QUESTIONS_PROMPT_TEMPLATE: &str = "以下の自己PRの内容を読んで、面接で聞かれそうな深掘りできる質問を2つ生成してください。
質問は簡潔に1文で作成し、具体的で回答者の経験や考えを引き出せるものにしてください。
質問のみを改行区切りで返してください。説明や番号は不要です。{plain}

自己PR:
{self_pr}";

pub fn proofread_prompt(text: &str) -> String {
    PROOFREAD_PROMPT_TEMPLATE
        .replace("{plain}", PLAIN_TEXT_ONLY)
        .replace("{text}", text)
}

pub fn questions_prompt(self_pr: &str) -> String {
    QUESTIONS_PROMPT_TEMPLATE
        .replace("{plain}", PLAIN_TEXT_ONLY)
        .replace("{self_pr}", self_pr)
}
