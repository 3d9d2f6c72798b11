//! Confirmation gate
//!
//! Nothing is deleted until the operator says yes, or passed `--force`.

use super::plan::DeletionPlan;
use crate::error::DeleteError;
use async_trait::async_trait;
use std::io::{self, IsTerminal};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

/// Answers that are neither yes nor no are re-asked this many times in total
const MAX_ATTEMPTS: usize = 3;

/// Where confirmation answers come from
#[async_trait]
pub trait Prompt: Send {
    /// Whether an operator can answer at all
    fn is_interactive(&self) -> bool;

    /// Show `question` and read one line; `None` at end of input
    async fn ask(&mut self, question: &str) -> io::Result<Option<String>>;
}

/// Line-based prompt over an async reader/writer pair
pub struct TerminalPrompt<R, W> {
    reader: R,
    writer: W,
    interactive: bool,
}

impl TerminalPrompt<BufReader<Stdin>, Stdout> {
    /// Prompt on stdin/stdout; never interactive when stdin is not a terminal
    pub fn stdio(non_interactive: bool) -> Self {
        let interactive = !non_interactive && io::stdin().is_terminal();
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), interactive)
    }
}

impl<R, W> TerminalPrompt<R, W> {
    pub fn new(reader: R, writer: W, interactive: bool) -> Self {
        Self {
            reader,
            writer,
            interactive,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> Prompt for TerminalPrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.writer.write_all(question.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Listing of the functions a plan deletes
///
/// Schedules and topics go with their function and are not listed.
pub fn render_summary(plan: &DeletionPlan) -> String {
    let list = plan
        .functions
        .iter()
        .map(|func| format!("\t{}", func.label()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are about to delete the following Cloud Functions:\n{}\n  Are you sure?",
        list
    )
}

/// y/yes and n/no in any case; an empty answer means no
fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ask for confirmation of `plan` unless `force` is set
pub async fn confirm(
    plan: &DeletionPlan,
    force: bool,
    prompt: &mut dyn Prompt,
) -> Result<bool, DeleteError> {
    if force {
        tracing::info!("Confirmation skipped (--force)");
        return Ok(true);
    }

    if !prompt.is_interactive() {
        return Err(DeleteError::ConfirmationRequired);
    }

    let mut question = format!("{} (y/N) ", render_summary(plan));
    for _ in 0..MAX_ATTEMPTS {
        let Some(line) = prompt.ask(&question).await? else {
            tracing::info!("No answer before end of input, treating as no");
            return Ok(false);
        };
        if let Some(answer) = parse_answer(&line) {
            tracing::info!("Operator answered {}", if answer { "yes" } else { "no" });
            return Ok(answer);
        }
        question = "Please answer y or n. (y/N) ".to_string();
    }

    Ok(false)
}
