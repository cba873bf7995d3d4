//! Device sessions and command scripts.
//!
//! A [`Session`] talks to one device over Telnet. A [`Script`] is an ordered
//! list of steps played over a session with [`Session::run_script`].

mod builder;
mod player;
mod response;
mod script;
mod session;

pub use builder::SessionBuilder;
pub use response::{Response, ScriptReport};
pub use script::{Expect, Reply, Script, ScriptBuilder, ScriptStep, StepBuilder};
pub use session::{Collected, MASK, Session};
