//! Formatting turn output for the terminal and for `--json`.

use realtor::{Message, PendingInterrupt, TurnOutcome};

/// Truncates to at most `max` chars, ending in "..." when cut. UTF-8 safe.
pub(crate) fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= SUFFIX.len() {
        return s.chars().take(max).collect();
    }
    let head: String = s.chars().take(max - SUFFIX.len()).collect();
    format!("{}{}", head, SUFFIX)
}

/// One line per message, for `/history` and verbose output.
pub(crate) fn format_message(m: &Message, max: usize) -> String {
    match m {
        Message::Assistant { content, tool_calls } if !tool_calls.is_empty() => {
            let calls: Vec<String> = tool_calls
                .iter()
                .map(|c| format!("{}({})", c.name, truncate_display(&c.arguments.to_string(), max)))
                .collect();
            format!(
                "assistant: {} -> {}",
                truncate_display(content, max),
                calls.join(", ")
            )
        }
        Message::Tool {
            name,
            content,
            is_error,
            ..
        } => format!(
            "tool {}{}: {}",
            name,
            if *is_error { " (error)" } else { "" },
            truncate_display(content, max)
        ),
        other => format!("{}: {}", other.role(), truncate_display(other.content(), max)),
    }
}

/// Approval prompt for a suspended turn.
pub(crate) fn approval_prompt(pending: &PendingInterrupt) -> String {
    let calls: Vec<String> = pending.value["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .map(|c| {
                    format!(
                        "  - {} {}",
                        c["name"].as_str().unwrap_or("?"),
                        c["arguments"]
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    format!(
        "Approval needed before running:\n{}\nApprove with /approve (or --approve), or reply to decline.",
        calls.join("\n")
    )
}

/// Assistant text produced by the turn, in order.
pub(crate) fn assistant_text(outcome: &TurnOutcome) -> Vec<&str> {
    outcome
        .messages
        .iter()
        .filter(|m| matches!(m, Message::Assistant { .. }) && !m.content().is_empty())
        .map(Message::content)
        .collect()
}

pub(crate) fn outcome_json(thread_id: &str, outcome: &TurnOutcome) -> serde_json::Value {
    serde_json::json!({
        "thread_id": thread_id,
        "reply": outcome.reply(),
        "messages": outcome.messages,
        "suspended": outcome.suspended,
        "pending": outcome.pending,
        "search_criteria": outcome.search_criteria,
        "visited": outcome.visited,
    })
}
