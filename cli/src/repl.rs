//! Interactive REPL: read a line, run a turn, print the reply, repeat.
//!
//! Used with `-i/--interactive`. Commands: `/approve` continues a suspended turn,
//! `/history` prints the stored conversation, `quit`/`exit`/`/quit` or EOF leave.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use realtor::Conversation;

use crate::display::format_message;
use crate::print_outcome;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    Approve,
    History,
    Message(String),
}

fn parse_input(line: &str) -> Option<Input> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match trimmed.to_lowercase().as_str() {
        "quit" | "exit" | "/quit" => Input::Quit,
        "/approve" => Input::Approve,
        "/history" => Input::History,
        _ => Input::Message(trimmed.to_string()),
    })
}

/// Runs the loop. Turn errors are printed and the loop continues.
pub async fn run_repl_loop(
    conversation: &Conversation,
    thread_id: &str,
    max_len: usize,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = reader.next_line().await? else {
            break;
        };
        let (message, approve) = match parse_input(&line) {
            None => continue,
            Some(Input::Quit) => break,
            Some(Input::History) => {
                for m in conversation.history(thread_id).await? {
                    println!("{}", format_message(&m, max_len));
                }
                continue;
            }
            Some(Input::Approve) => (None, true),
            Some(Input::Message(text)) => (Some(text), false),
        };

        match conversation.turn(thread_id, message, approve).await {
            Ok(outcome) => print_outcome(thread_id, &outcome, json, false)?,
            Err(e) => eprintln!("error: {}", e),
        }
    }

    println!("Bye.");
    Ok(())
}
