//! Local execution of fenced code blocks found in agent messages.
//!
//! Blocks run one after another inside the configured work directory; the
//! first non-zero exit stops the batch.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use sha2::{Digest, Sha256};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::Result;

/// Where and how long generated code may run.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeExecutionConfig {
    pub work_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for CodeExecutionConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("coding"),
            timeout: Duration::from_secs(60),
        }
    }
}

impl CodeExecutionConfig {
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A fenced block: ```` ```lang\ncode\n``` ````.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

/// Result of running a batch of blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub exit_code: i32,
    pub output: String,
}

impl ExecutionOutcome {
    /// Reply text sent back to the agent that wrote the code.
    pub fn to_reply(&self) -> String {
        let status = if self.exit_code == 0 { "execution succeeded" } else { "execution failed" };
        format!("exitcode: {} ({status})\nCode output: {}", self.exit_code, self.output)
    }
}

fn code_block_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*([\w+-]*)[ \t]*\r?\n(.*?)\r?\n[ \t]*```")
            .expect("code block pattern is valid")
    })
}

/// Extract fenced code blocks in order of appearance.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    code_block_regex()
        .captures_iter(text)
        .map(|caps| CodeBlock {
            language: caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default(),
            code: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
        .collect()
}

/// Interpreter and file extension for a block language.
fn interpreter(language: &str) -> Option<(&'static str, &'static str)> {
    match language {
        "" | "python" | "py" | "python3" => Some(("python3", "py")),
        "sh" | "bash" | "shell" => Some(("sh", "sh")),
        _ => None,
    }
}

/// Run `blocks` sequentially in the configured work directory.
pub async fn execute_code_blocks(config: &CodeExecutionConfig, blocks: &[CodeBlock]) -> Result<ExecutionOutcome> {
    tokio::fs::create_dir_all(&config.work_dir).await?;

    let mut output = String::new();
    for block in blocks {
        let Some((program, extension)) = interpreter(&block.language) else {
            output.push_str(&format!("unknown language {}", block.language));
            return Ok(ExecutionOutcome { exit_code: 1, output });
        };

        let file_name = script_file_name(&block.code, extension);
        tokio::fs::write(config.work_dir.join(&file_name), &block.code).await?;
        debug!(language = %block.language, file = %file_name, "Executing code block");

        let (exit_code, block_output) = run_script(program, &file_name, &config.work_dir, config.timeout).await?;
        output.push_str(&block_output);
        if exit_code != 0 {
            warn!(exit_code, "Code block failed");
            return Ok(ExecutionOutcome { exit_code, output });
        }
    }

    Ok(ExecutionOutcome { exit_code: 0, output })
}

fn script_file_name(code: &str, extension: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(code.as_bytes()));
    format!("tmp_code_{}.{extension}", &digest[..16])
}

async fn run_script(program: &str, file_name: &str, work_dir: &Path, timeout: Duration) -> Result<(i32, String)> {
    let child = Command::new(program)
        .arg(file_name)
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => {
            let out = result?;
            let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&out.stderr));
            Ok((out.status.code().unwrap_or(1), text))
        }
        Err(_) => Ok((1, format!("Timeout after {}s", timeout.as_secs()))),
    }
}
