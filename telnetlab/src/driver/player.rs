//! Running scripts over a session.

use log::{debug, warn};
use regex::bytes::Regex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;

use super::response::{Response, ScriptReport};
use super::script::{Script, ScriptStep};
use super::session::{MASK, Session};
use crate::error::{DriverError, Result};

/// Interactive answers allowed per step before giving up.
const MAX_REPLIES_PER_STEP: usize = 4;

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Play `script` step by step.
    ///
    /// The first step that does not reach its prompt stops the script with
    /// [`DriverError::StepFailed`]; later steps are not sent.
    pub async fn run_script(&mut self, script: &Script) -> Result<ScriptReport> {
        let start = Instant::now();
        let mut steps = Vec::with_capacity(script.len());

        for (index, step) in script.steps().iter().enumerate() {
            match self.run_step(step).await {
                Ok(response) => {
                    if let Some(marker) = &response.failure_message {
                        warn!(
                            "[{}] step {} ('{}') reported '{}'",
                            self.device(),
                            index,
                            response.command,
                            marker
                        );
                    }
                    steps.push(response);
                }
                Err(source) => {
                    return Err(DriverError::StepFailed {
                        index,
                        command: step.display_input().to_string(),
                        source: Box::new(source),
                    }
                    .into());
                }
            }
        }

        debug!(
            "[{}] script finished: {} steps in {:?}",
            self.device(),
            steps.len(),
            start.elapsed()
        );
        Ok(ScriptReport::new(self.device(), steps, start.elapsed()))
    }

    /// Send one step and wait for its prompt, answering questions on the way.
    pub async fn run_step(&mut self, step: &ScriptStep) -> Result<Response> {
        // Index 0 is the prompt, the replies follow in order
        let mut patterns: Vec<Regex> = Vec::with_capacity(1 + step.replies.len());
        patterns.push(step.expect.compile(self.hostname())?);
        for reply in &step.replies {
            patterns.push(reply.compile()?);
        }

        let timeout = step.timeout.unwrap_or(self.timeout());
        let start = Instant::now();

        if step.hidden {
            self.send_secret(&step.input).await?;
        } else {
            self.send(&step.input).await?;
        }

        let mut raw = String::new();
        let mut replies = 0;
        let prompt = loop {
            let remaining = timeout.saturating_sub(start.elapsed());
            let found = self.expect(&patterns, remaining).await?;
            raw.push_str(&found.before);
            raw.push_str(&found.matched);

            if found.index == 0 {
                break found.matched;
            }

            replies += 1;
            if replies > MAX_REPLIES_PER_STEP {
                return Err(DriverError::TooManyReplies {
                    limit: MAX_REPLIES_PER_STEP,
                }
                .into());
            }

            let reply = &step.replies[found.index - 1];
            debug!("[{}] answering {:?}", self.device(), reply.question);
            if reply.hidden {
                self.send_secret(&reply.answer).await?;
            } else {
                self.send(&reply.answer).await?;
            }
        };

        let mut result = normalize_output(&raw, &step.input, &prompt);
        if step.hidden && !step.input.is_empty() {
            result = result.replace(&step.input, MASK);
            raw = raw.replace(&step.input, MASK);
        }

        let mut response = Response::new(
            step.display_input(),
            result,
            raw,
            prompt.trim(),
            start.elapsed(),
        )
        .with_replies(replies);

        if let Some(marker) = self.platform().detect_failure(&response.result) {
            response = response.with_failure(marker);
        }

        Ok(response)
    }
}

/// Strip the command echo and the trailing prompt from raw step output.
pub(crate) fn normalize_output(raw: &str, command: &str, prompt: &str) -> String {
    let body = raw.strip_suffix(prompt).unwrap_or(raw);
    let body = body.trim_start_matches(['\r', '\n']);
    let body = if command.is_empty() {
        body
    } else {
        body.strip_prefix(command).unwrap_or(body)
    };
    body.trim().to_string()
}
