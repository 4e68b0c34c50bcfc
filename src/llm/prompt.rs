//! Prompt construction for per-file summaries and the combined commit message.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::summarize::FileSummaries;

/// Maximum characters of file content included in a per-file prompt.
pub const MAX_CONTENT_LENGTH: usize = 30_000;

/// Separator between file summaries in the combined prompt.
pub const SUMMARY_SEPARATOR_WIDTH: usize = 40;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("Invalid regex"));

const EMOJI_INSTRUCTIONS: &str = r#"
Add 2-3 relevant emojis at the end of the commit message based on the type of changes (e.g. ✨ for new features, 🐛 for bug fixes,
📝 for documentation, 🎨 for style/UI, ♻️ for refactor, 🔧 for configuration, 🚀 for performance, 🧪 for tests).

Examples of commit messages with emojis:
- feat: add user authentication system ✨ 🔒
- fix: resolve memory leak in data processing 🐛 🚀
- docs: update API documentation 📝 📚
- style: improve dashboard layout 🎨 ✨
"#;

/// Build the prompt asking for a summary of one file's change.
///
/// An empty `previous` is presented as a new file.
pub fn build_file_prompt(path: &str, previous: &str, current: &str) -> String {
    let mut prompt = format!(
        "Please analyze the following file change and provide a concise summary of the modifications:\n\nFile: {path}\n"
    );

    if previous.is_empty() {
        prompt.push_str("Status: New File\n");
    } else {
        prompt.push_str("Old content:\n```\n");
        prompt.push_str(&sanitize_content(previous, MAX_CONTENT_LENGTH));
        prompt.push_str("\n```\n");
    }

    prompt.push_str("New content:\n```\n");
    prompt.push_str(&sanitize_content(current, MAX_CONTENT_LENGTH));
    prompt.push_str("\n```\n");

    prompt.push_str("\nPlease provide a focused summary of the changes in this file.");
    prompt
}

/// Build the prompt asking for one commit message covering every file summary.
pub fn build_combined_prompt(summaries: &FileSummaries, use_emoji: bool) -> String {
    let mut prompt = String::from(
        "Based on the following file change summaries, please generate a comprehensive git commit message that covers all changes.",
    );
    if use_emoji {
        prompt.push_str(EMOJI_INSTRUCTIONS);
    }
    prompt.push_str("\n\nFile summaries to analyze:");

    let separator = "-".repeat(SUMMARY_SEPARATOR_WIDTH);
    for (path, summary) in summaries.iter() {
        prompt.push_str(&format!("\nFile: {path}\nSummary: {summary}\n{separator}\n"));
    }

    prompt.push_str(
        "\nPlease create a commit message that effectively summarizes all these changes together. ",
    );
    prompt.push_str("Follow git commit message best practices");
    if use_emoji {
        prompt.push_str(" and include relevant emojis at the end.");
    } else {
        prompt.push('.');
    }

    prompt
}

/// Sanitize file content for inclusion in a fenced prompt block.
///
/// - Removes control characters (except newlines and tabs)
/// - Removes ANSI escape sequences
/// - Neutralizes code fences so content cannot close the block early
/// - Truncates to `max_len` bytes on a char boundary, with a marker
pub fn sanitize_content(text: &str, max_len: usize) -> String {
    let without_ansi = ANSI_ESCAPE.replace_all(text, "");

    let mut result: String = without_ansi
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .replace("```", "'''");

    if result.len() > max_len {
        let mut end = max_len;
        while end > 0 && !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
        result.push_str("\n[... content truncated ...]");
    }

    result
}
