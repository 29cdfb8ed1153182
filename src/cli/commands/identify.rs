//! Identification commands: one-shot and line-based listen mode.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Runtime;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ResultExt;
use crate::recognition::{Pipeline, Reply};

/// Identify the song behind the first link in `text`
pub fn cmd_identify(rt: &Runtime, config: &Config, text: &str, caller: &str) -> anyhow::Result<()> {
    // Tool checks block, so they run before the runtime takes over
    let pipeline = Pipeline::from_config(config)?;
    rt.block_on(identify(&pipeline, text, caller))
}

async fn identify(pipeline: &Pipeline, text: &str, caller: &str) -> anyhow::Result<()> {
    match route(pipeline, caller, text).await {
        Some(reply) => println!("{}", reply),
        None => eprintln!("No link found in message, nothing to do."),
    }
    Ok(())
}

/// Answer `<caller_id> <message>` lines from stdin until EOF or Ctrl+C
pub fn cmd_listen(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    let pipeline = Arc::new(Pipeline::from_config(config)?);
    rt.block_on(listen(pipeline))
}

async fn listen(pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();

    info!("Listening on stdin (format: <caller_id> <message>)");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.with_context("Reading stdin")? else { break };
                let Some((caller, text)) = parse_line(&line) else {
                    continue;
                };
                let pipeline = pipeline.clone();
                tasks.spawn(async move {
                    if let Some(reply) = route(&pipeline, &caller, &text).await {
                        println!("--> {}\n{}\n", caller, reply);
                    }
                });
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    warn!("Request task failed: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, finishing {} pending request(s)", tasks.len());
                break;
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!("Request task failed: {}", e);
        }
    }
    Ok(())
}

/// Split a listen-mode line into caller id and message text.
fn parse_line(line: &str) -> Option<(String, String)> {
    let (caller, text) = line.trim().split_once(char::is_whitespace)?;
    let text = text.trim();
    if caller.is_empty() || text.is_empty() {
        return None;
    }
    Some((caller.to_string(), text.to_string()))
}

/// Reply to one chat message, or `None` when there is nothing to say.
///
/// The static commands never touch the pipeline.
async fn route(pipeline: &Pipeline, caller: &str, text: &str) -> Option<Reply> {
    match text.trim() {
        "/start" => Some(Reply::start()),
        "/support" => Some(Reply::support()),
        _ => pipeline
            .handle(caller, text)
            .await
            .map(|outcome| Reply::from_outcome(&outcome)),
    }
}
