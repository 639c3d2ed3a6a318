//! Prompt templates for every model call the engine makes
//!
//! All prompt text lives here so the stages stay free of string
//! assembly details and the templates can be reviewed in one place.

use crate::types::ConversationMessage;

/// System prompt for message classification
pub const CLASSIFY_SYSTEM: &str = "\
You are a message classifier for a research assistant. Classify the user's \
message into exactly one category and answer with only the category name on \
the first line:

- research: complex questions that need multi-step investigation, analysis, \
comparison, or synthesis of information
- tool_agent: simple lookups a single tool can answer (weather, maps, a \
quick web search)
- direct_response: greetings, chit-chat, opinions, or anything answerable \
from general knowledge

Answer with one of: research, tool_agent, direct_response.";

/// System prompt for the clarification decision
pub const CLARIFY_SYSTEM: &str = "\
You decide whether a research request is specific enough to act on. \
Respond with a JSON object and nothing else:
{\"need_clarification\": bool, \"question\": string, \"verification\": string}

Set need_clarification to true only when the request is genuinely ambiguous \
or under-specified; in that case put exactly one clarifying question in \
\"question\". When the request is actionable, set it to false and put a \
short acknowledgement of what will be researched in \"verification\".";

/// System prompt for research brief extraction
pub const BRIEF_SYSTEM: &str = "\
You turn a conversation into a self-contained research goal statement. \
Write at least one full paragraph covering the research goal, its scope, \
and any constraints the user stated. The statement must make sense without \
the conversation attached. Output only the statement.";

/// System prompt for the supervisor's continue/stop decision
pub const SUPERVISOR_SYSTEM: &str = "\
You supervise an ongoing research effort. Given the research brief and the \
notes collected so far, decide whether more research is needed. If more is \
needed, name the research topics still missing. If the collected notes are \
sufficient to answer the brief, say the research is complete.";

/// System prompt for new-topic generation
pub const TOPICS_SYSTEM: &str = "\
You plan the next round of research. Given the research brief and the most \
recent notes, propose 2-3 new research topics that fill the remaining gaps. \
Output one topic per line with no numbering and no commentary.";

/// System prompt for search query generation
pub const QUERIES_SYSTEM: &str = "\
You generate web search queries for a research topic. Propose 3-5 concrete \
queries, one per line, with no numbering and no commentary. Do not repeat \
ground already covered by the existing findings.";

/// System prompt for per-topic compression
pub const COMPRESSION_SYSTEM: &str = "\
You compress raw research findings into one coherent summary. Structure the \
summary as: a two-sentence executive summary; key findings grouped by \
theme; supporting detail worth keeping; a one-paragraph conclusion. Keep \
concrete facts, numbers, and source names.";

/// System prompt for final report synthesis
pub const SYNTHESIS_SYSTEM: &str = "\
You write the final research report. Use exactly this structure, as \
markdown headings: Executive Summary; Introduction; Key Findings (every \
claim cited against the provided research notes); Analysis; Implications; \
Conclusion; Sources. Base the report only on the provided research \
content. Write for a reader who has not seen the notes.";

/// System prompt for phrasing a tool result as an answer
pub const TOOL_ANSWER_SYSTEM: &str = "\
You answer a user's question from a tool result. Present the actual data \
clearly and concisely. If the result does not answer the question, say so.";

/// Canned reply used when classification and its fallbacks decide nothing
/// better is possible.
pub const DIRECT_FALLBACK_REPLY: &str = "\
I wasn't able to work out what you need from that message. Could you \
rephrase it, or tell me what you'd like me to look into?";

/// Verification text used when the clarification stage falls back
pub const CLARIFY_FALLBACK_VERIFICATION: &str =
    "Proceeding with research based on the conversation so far.";

/// Placeholder inserted when synthesis has no research content at all
pub const NO_RESEARCH_CONTENT: &str = "\
No research content was collected for this request. State clearly that no \
research data is available and suggest how the user could narrow or rephrase \
the request.";

/// Deterministic compression output for a topic with zero findings
#[must_use]
pub fn no_findings_summary(topic: &str) -> String {
    format!("No findings available for topic: {}", topic)
}

/// Render a conversation history for inclusion in a prompt
#[must_use]
pub fn render_history(history: &[ConversationMessage]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt for message classification
#[must_use]
pub fn classification_prompt(message: &str) -> String {
    format!("Classify this message:\n\n{}", message)
}

/// User prompt for the clarification decision
#[must_use]
pub fn clarification_prompt(history: &[ConversationMessage], current_date: &str) -> String {
    format!(
        "Today's date: {}\n\nConversation so far:\n{}\n\nDecide whether \
         clarification is needed before researching the latest request.",
        current_date,
        render_history(history)
    )
}

/// User prompt for research brief extraction
#[must_use]
pub fn brief_prompt(history: &[ConversationMessage]) -> String {
    format!(
        "Conversation:\n{}\n\nWrite the research goal statement.",
        render_history(history)
    )
}

/// User prompt for the supervisor decision
#[must_use]
pub fn supervisor_prompt(brief: &str, notes: &[String], raw_notes: &[String]) -> String {
    let notes_block = if notes.is_empty() {
        "(none yet)".to_string()
    } else {
        notes.join("\n---\n")
    };
    let raw_block = if raw_notes.is_empty() {
        "(none yet)".to_string()
    } else {
        raw_notes.join("\n")
    };
    format!(
        "Research brief:\n{}\n\nProcessed notes ({}):\n{}\n\nRecent raw notes:\n{}\n\n\
         Is more research needed?",
        brief,
        notes.len(),
        notes_block,
        raw_block
    )
}

/// User prompt for new-topic generation
#[must_use]
pub fn topics_prompt(brief: &str, recent_notes: &[String]) -> String {
    let notes_block = if recent_notes.is_empty() {
        "(no notes yet)".to_string()
    } else {
        recent_notes.join("\n---\n")
    };
    format!(
        "Research brief:\n{}\n\nMost recent notes:\n{}\n\nPropose the next topics.",
        brief, notes_block
    )
}

/// User prompt for search query generation
#[must_use]
pub fn queries_prompt(topic: &str, findings: &[String]) -> String {
    if findings.is_empty() {
        format!("Research topic:\n{}\n\nPropose the search queries.", topic)
    } else {
        format!(
            "Research topic:\n{}\n\nExisting findings:\n{}\n\nPropose search \
             queries that cover what is still missing.",
            topic,
            findings.join("\n---\n")
        )
    }
}

/// User prompt for per-topic compression
#[must_use]
pub fn compression_prompt(topic: &str, findings: &[String]) -> String {
    format!(
        "Topic: {}\n\nFindings:\n{}\n\nWrite the summary.",
        topic,
        findings.join("\n\n")
    )
}

/// User prompt for final report synthesis
#[must_use]
pub fn synthesis_prompt(brief: &str, content: &str) -> String {
    format!(
        "Original Research Request:\n{}\n\nResearch content:\n{}\n\nWrite the report.",
        brief, content
    )
}

/// User prompt for phrasing a tool result
#[must_use]
pub fn tool_answer_prompt(question: &str, tool_name: &str, result: &str) -> String {
    format!(
        "Question:\n{}\n\nResult from tool '{}':\n{}\n\nAnswer the question.",
        question, tool_name, result
    )
}

/// User prompt for a direct response, optionally folding in memory context
#[must_use]
pub fn direct_response_prompt(message: &str, memory_context: Option<&str>) -> String {
    match memory_context {
        Some(memory) if !memory.trim().is_empty() => format!(
            "Context you remember about this user:\n{}\n\nUser message:\n{}",
            memory, message
        ),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_history() {
        let history = vec![
            ConversationMessage::user("hello"),
            ConversationMessage::assistant("hi"),
        ];
        let rendered = render_history(&history);
        assert_eq!(rendered, "user: hello\nassistant: hi");
    }

    #[test]
    fn test_synthesis_prompt_contains_request_section() {
        let prompt = synthesis_prompt("study ferrets", "notes here");
        assert!(prompt.contains("Original Research Request:\nstudy ferrets"));
        assert!(prompt.contains("notes here"));
    }

    #[test]
    fn test_direct_response_prompt_memory_folding() {
        let with = direct_response_prompt("hi", Some("likes rust"));
        assert!(with.contains("likes rust"));

        let without = direct_response_prompt("hi", Some("   "));
        assert_eq!(without, "hi");
        assert_eq!(direct_response_prompt("hi", None), "hi");
    }

    #[test]
    fn test_no_findings_summary_is_deterministic() {
        assert_eq!(
            no_findings_summary("x"),
            no_findings_summary("x"),
        );
        assert!(no_findings_summary("quantum").contains("quantum"));
    }
}
