//! Results of script steps.

use std::time::Duration;

/// Response to one script step.
#[derive(Debug, Clone)]
pub struct Response {
    /// The input that was sent (masked if hidden).
    pub command: String,

    /// The output (normalized - command echo and trailing prompt removed).
    pub result: String,

    /// The raw output before normalization.
    pub raw_result: String,

    /// The prompt that ended the step.
    pub prompt: String,

    /// Time taken by the step, interactive answers included.
    pub elapsed: Duration,

    /// Interactive questions answered during the step.
    pub replies: usize,

    /// Failure marker found in the output. The step still reached its
    /// prompt, so this is a warning.
    pub failure_message: Option<String>,
}

impl Response {
    /// Create a new successful response.
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            replies: 0,
            failure_message: None,
        }
    }

    /// Record the number of interactive answers.
    pub fn with_replies(mut self, replies: usize) -> Self {
        self.replies = replies;
        self
    }

    /// Record a failure marker.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    /// Check if the output carried no failure marker.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

/// Outcome of a script that reached its last step.
#[derive(Debug, Clone)]
pub struct ScriptReport {
    /// Device the script ran on.
    pub device: String,

    /// One response per step, in order.
    pub steps: Vec<Response>,

    /// Total time for the script.
    pub elapsed: Duration,
}

impl ScriptReport {
    pub fn new(device: impl Into<String>, steps: Vec<Response>, elapsed: Duration) -> Self {
        Self {
            device: device.into(),
            steps,
            elapsed,
        }
    }

    /// Steps whose output carried a failure marker.
    pub fn warnings(&self) -> impl Iterator<Item = &Response> {
        self.steps.iter().filter(|s| !s.is_success())
    }

    /// Get all outputs concatenated.
    pub fn full_output(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.result.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_filter() {
        let steps = vec![
            Response::new("hostname R1", "", "hostname R1\r\n", "R1(config)#", Duration::ZERO),
            Response::new("shutdwn", "% Invalid input", "", "R1(config-if)#", Duration::ZERO)
                .with_failure("% Invalid input"),
        ];
        let report = ScriptReport::new("R1", steps, Duration::from_millis(5));

        let warnings: Vec<&str> = report.warnings().map(|r| r.command.as_str()).collect();
        assert_eq!(warnings, ["shutdwn"]);
        assert_eq!(report.full_output(), "\n% Invalid input");
    }
}
