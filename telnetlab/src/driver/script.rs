//! Command scripts: ordered steps of input and expected prompt.
//!
//! A step sends one line and waits for its expected prompt. While waiting,
//! interactive questions such as `Password:` or `[yes/no]` are answered
//! from the step's replies.
//!
//! Scripts are plain data. Nothing is compiled or sent until the script is
//! played over a session, which keeps script generation pure and testable.

use std::fmt;
use std::time::Duration;

use regex::bytes::Regex;

use super::session::MASK;
use crate::channel::{any_prompt, compile_literal};
use crate::error::ChannelError;
use crate::platform::CliMode;

/// What a step waits for after sending its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expect {
    /// The mode's prompt for the session's hostname, e.g. `R1(config-if)#`.
    Mode(CliMode),

    /// The mode's prompt for any hostname.
    AnyHost(CliMode),

    /// Any prompt of any mode ending in one of these characters.
    AnyPrompt(&'static str),

    /// A literal text.
    Literal(String),
}

impl Expect {
    /// Compile the pattern for a session whose prompts carry `hostname`.
    pub fn compile(&self, hostname: &str) -> Result<Regex, ChannelError> {
        let regex = match self {
            Expect::Mode(mode) => mode.pattern(hostname)?,
            Expect::AnyHost(mode) => mode.any_host_pattern()?,
            Expect::AnyPrompt(terminators) => any_prompt(terminators)?,
            Expect::Literal(text) => compile_literal(text, false)?,
        };
        Ok(regex)
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expect::Mode(mode) => write!(f, "{mode} prompt"),
            Expect::AnyHost(mode) => write!(f, "{mode} prompt of any host"),
            Expect::AnyPrompt(terminators) => write!(f, "any prompt ending in [{terminators}]"),
            Expect::Literal(text) => write!(f, "{text:?}"),
        }
    }
}

/// An answer to an interactive question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Literal question text, e.g. `Password:`.
    pub question: String,

    /// Line sent back.
    pub answer: String,

    /// Mask the answer in logs.
    pub hidden: bool,
}

impl Reply {
    pub(crate) fn compile(&self) -> Result<Regex, ChannelError> {
        Ok(compile_literal(&self.question, false)?)
    }
}

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    /// The line to send.
    pub input: String,

    /// What to wait for afterwards.
    pub expect: Expect,

    /// Questions answered while waiting, in priority order.
    pub replies: Vec<Reply>,

    /// Optional timeout override for this step.
    pub timeout: Option<Duration>,

    /// Whether the input is a secret.
    pub hidden: bool,
}

impl ScriptStep {
    /// Create a step sending `input` and waiting for `expect`.
    pub fn new(input: impl Into<String>, expect: Expect) -> Self {
        Self {
            input: input.into(),
            expect,
            replies: Vec::new(),
            timeout: None,
            hidden: false,
        }
    }

    /// The input as it may appear in logs and reports.
    pub fn display_input(&self) -> &str {
        if self.hidden { MASK } else { &self.input }
    }
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: ScriptStep) {
        self.steps.push(step);
    }

    /// Append every step of `other`.
    pub fn append(&mut self, other: Script) {
        self.steps.extend(other.steps);
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// The raw inputs, in order.
    pub fn commands(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.input.as_str()).collect()
    }

    /// Position of the first step sending exactly `input`.
    pub fn position(&self, input: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.input == input)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl IntoIterator for Script {
    type Item = ScriptStep;
    type IntoIter = std::vec::IntoIter<ScriptStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

/// Builder for scripts.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use telnetlab::driver::ScriptBuilder;
/// use telnetlab::platform::CliMode;
///
/// let script = ScriptBuilder::new()
///     .send("enable")
///     .reply_hidden("Password:", "cisco")
///     .expect_any_prompt("#")
///     .send("configure terminal")
///     .expect_any_host(CliMode::GlobalConfig)
///     .send("crypto key generate rsa")
///     .reply("[yes/no]", "yes")
///     .expect_literal("How many bits in the modulus")
///     .send("1024")
///     .with_timeout(Duration::from_secs(60))
///     .expect_mode(CliMode::GlobalConfig)
///     .build();
///
/// assert_eq!(script.len(), 4);
/// ```
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    script: Script,
}

impl ScriptBuilder {
    /// Create a new script builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input to send.
    ///
    /// Must be followed by one of the `expect_*` methods.
    pub fn send(self, input: impl Into<String>) -> StepBuilder {
        StepBuilder {
            builder: self,
            input: input.into(),
            hidden: false,
            timeout: None,
            replies: Vec::new(),
        }
    }

    /// Add a secret input (password lines).
    pub fn send_hidden(self, input: impl Into<String>) -> StepBuilder {
        StepBuilder {
            hidden: true,
            ..self.send(input)
        }
    }

    /// Append a prebuilt script.
    pub fn extend(mut self, script: Script) -> Self {
        self.script.append(script);
        self
    }

    /// Build the script.
    pub fn build(self) -> Script {
        self.script
    }
}

/// Intermediate state for the builder after `send()` is called.
#[derive(Debug)]
pub struct StepBuilder {
    builder: ScriptBuilder,
    input: String,
    hidden: bool,
    timeout: Option<Duration>,
    replies: Vec<Reply>,
}

impl StepBuilder {
    /// Answer `question` with `answer` while waiting.
    pub fn reply(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.replies.push(Reply {
            question: question.into(),
            answer: answer.into(),
            hidden: false,
        });
        self
    }

    /// Answer `question` with a secret.
    pub fn reply_hidden(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.replies.push(Reply {
            question: question.into(),
            answer: answer.into(),
            hidden: true,
        });
        self
    }

    /// Set a custom timeout for this step.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Finish the step with what it waits for.
    pub fn expect(mut self, expect: Expect) -> ScriptBuilder {
        self.builder.script.push(ScriptStep {
            input: self.input,
            expect,
            replies: self.replies,
            timeout: self.timeout,
            hidden: self.hidden,
        });
        self.builder
    }

    /// Wait for the mode's prompt with the session hostname.
    pub fn expect_mode(self, mode: CliMode) -> ScriptBuilder {
        self.expect(Expect::Mode(mode))
    }

    /// Wait for the mode's prompt with any hostname.
    pub fn expect_any_host(self, mode: CliMode) -> ScriptBuilder {
        self.expect(Expect::AnyHost(mode))
    }

    /// Wait for any prompt ending in one of `terminators`.
    pub fn expect_any_prompt(self, terminators: &'static str) -> ScriptBuilder {
        self.expect(Expect::AnyPrompt(terminators))
    }

    /// Wait for a literal text.
    pub fn expect_literal(self, text: impl Into<String>) -> ScriptBuilder {
        self.expect(Expect::Literal(text.into()))
    }
}
