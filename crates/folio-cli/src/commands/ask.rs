//! Ask command implementation.

use crate::cli::AskArgs;
use crate::error::Result;
use crate::output::Formatter;
use folio_domain::SessionId;
use folio_engine::{QaEngine, Reply};

/// Ask one question and print the answer
///
/// Without `--session` the question starts a fresh session.
pub async fn execute_ask(args: AskArgs, engine: &QaEngine, formatter: &Formatter) -> Result<Reply> {
    let question = args.question.join(" ");
    let session_id = args
        .session
        .map(SessionId::from)
        .unwrap_or_else(SessionId::generate);

    let reply = engine.ask(&session_id, &question).await?;
    println!("{}", formatter.format_reply(&reply)?);

    Ok(reply)
}
