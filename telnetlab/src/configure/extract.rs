//! Running-configuration capture.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::driver::{ScriptBuilder, Session};
use crate::error::{ChannelError, Error, Result};
use crate::platform::CliMode;

/// A captured running configuration and where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDump {
    pub path: PathBuf,
    pub text: String,
}

/// File name of a dump for `hostname`.
pub fn dump_file_name(hostname: &str) -> String {
    format!("{hostname}_config.txt")
}

/// Leave configuration mode, dump the running configuration and write it
/// to `<output_dir>/<hostname>_config.txt`.
///
/// Meant for a session in global configuration mode, as left by a
/// configuration script. Calling it again from privileged exec repeats the
/// capture without leaving the EXEC session.
pub async fn extract_configuration<S>(
    session: &mut Session<S>,
    output_dir: &Path,
    capture: Duration,
) -> Result<ConfigDump>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let platform = session.platform().clone();
    let mut builder = ScriptBuilder::new();
    if let Some(leave) = leave_command(session.current_mode()) {
        builder = builder.send(leave).expect_mode(CliMode::PrivilegedExec);
    }
    let script = builder
        .send(platform.disable_paging.as_str())
        .expect_mode(CliMode::PrivilegedExec)
        .build();
    session.run_script(&script).await?;

    session.send(&platform.show_config).await?;
    let prompt = CliMode::PrivilegedExec
        .pattern(session.hostname())
        .map_err(ChannelError::from)?;
    let collected = session.read_until_or_deadline(&prompt, capture).await?;
    if !collected.pattern_seen {
        debug!(
            "[{}] capture window elapsed before the prompt returned",
            session.device()
        );
    }

    let mut text = collected.text;
    text.push_str(&session.read_available().await?);

    let path = output_dir.join(dump_file_name(session.hostname()));
    write_dump(&path, &text).await?;
    info!(
        "[{}] running configuration saved to {}",
        session.device(),
        path.display()
    );

    Ok(ConfigDump { path, text })
}

/// Command returning to privileged exec from `mode`. In privileged exec
/// itself `exit` would end the EXEC session, so nothing is sent.
fn leave_command(mode: Option<CliMode>) -> Option<&'static str> {
    match mode {
        Some(CliMode::PrivilegedExec) => None,
        Some(mode) if mode.is_config() && mode != CliMode::GlobalConfig => Some("end"),
        _ => Some("exit"),
    }
}

async fn write_dump(path: &Path, text: &str) -> Result<()> {
    let to_error = |source| Error::Extract {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(to_error)?;
    }
    tokio::fs::write(path, text).await.map_err(to_error)
}
