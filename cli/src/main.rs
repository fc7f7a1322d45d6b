//! Realtor CLI: chat with the real-estate assistant from the command line.
//!
//! One-shot: `realtor -m "homes in Austin under 500k" --thread-id t1`, then
//! `realtor --thread-id t1 --approve` to continue a turn waiting for approval.
//! Interactive: `realtor -i`.

mod display;
mod repl;
mod setup;

use clap::Parser;

use realtor::{RealtorSettings, TurnOutcome};

use display::{approval_prompt, assistant_text, format_message, outcome_json, truncate_display};
use repl::run_repl_loop;
use setup::build_conversation;

/// Max chars per message line in verbose and history output.
const DISPLAY_MAX_LEN: usize = 200;

#[derive(Parser, Debug)]
#[command(name = "realtor")]
#[command(about = "Realtor: search listings and book viewings from the command line")]
struct Args {
    /// User message (or pass as positional arguments)
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Positional args: user message when -m/--message is not used
    #[arg(trailing_var_arg = true)]
    rest: Vec<String>,

    /// Conversation id; reuse it to continue a conversation (needs REALTOR_CHECKPOINT_DB
    /// across runs)
    #[arg(long, value_name = "ID")]
    thread_id: Option<String>,

    /// Approve the action the conversation is waiting on
    #[arg(long)]
    approve: bool,

    /// Interactive REPL (/approve, /history, quit)
    #[arg(short, long)]
    interactive: bool,

    /// Verbose: debug logs and every message of the turn on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print each turn as one JSON object
    #[arg(long)]
    json: bool,
}

/// Prints a turn: JSON, or assistant text plus an approval prompt when suspended.
pub(crate) fn print_outcome(
    thread_id: &str,
    outcome: &TurnOutcome,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(&outcome_json(thread_id, outcome))?);
        return Ok(());
    }
    if verbose {
        for m in &outcome.messages {
            eprintln!("{}", format_message(m, DISPLAY_MAX_LEN));
        }
    }
    for text in assistant_text(outcome) {
        println!("{}", text.trim_end());
    }
    if let Some(pending) = &outcome.pending {
        println!("{}", approval_prompt(pending));
    }
    Ok(())
}

fn new_thread_id() -> String {
    format!("thread-{}", uuid::Uuid::new_v4())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let settings = RealtorSettings::load()?;
    let _guard = config::init_tracing(if args.verbose { "debug" } else { "warn" })?;

    let message = args
        .message
        .clone()
        .or_else(|| (!args.rest.is_empty()).then(|| args.rest.join(" ")));
    if !args.interactive && message.is_none() && !args.approve {
        eprintln!("realtor: provide a message via -m/--message or positional args, or --approve");
        std::process::exit(2);
    }

    let conversation = match build_conversation(&settings).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("realtor: {}", e);
            std::process::exit(1);
        }
    };
    let thread_id = args.thread_id.clone().unwrap_or_else(new_thread_id);
    if args.thread_id.is_none() && !args.json {
        eprintln!("thread: {}", thread_id);
    }
    tracing::debug!(
        thread_id = %thread_id,
        message = %truncate_display(message.as_deref().unwrap_or_default(), DISPLAY_MAX_LEN),
        approve = args.approve,
        "starting"
    );

    if message.is_some() || args.approve {
        match conversation.turn(&thread_id, message, args.approve).await {
            Ok(outcome) => print_outcome(&thread_id, &outcome, args.json, args.verbose)?,
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
    if args.interactive {
        run_repl_loop(&conversation, &thread_id, DISPLAY_MAX_LEN, args.json).await?;
    }
    Ok(())
}
