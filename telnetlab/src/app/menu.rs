//! Operator menu.

use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::App;
use crate::error::MenuError;

pub const MENU: &str = "\nMenu for topology configuration:\n\
    0. Exit\n\
    1. Configure all of the devices\n\
    2. Test connectivity between PCs and routers\n\n";

pub const PROMPT: &str = "Choose one option: ";

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    ConfigureAll,
    TestConnectivity,
}

impl FromStr for MenuChoice {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = |reason: String| MenuError::InvalidSelection {
            input: input.to_string(),
            reason,
        };

        match input.parse::<u32>().map_err(|e| invalid(e.to_string()))? {
            0 => Ok(MenuChoice::Exit),
            1 => Ok(MenuChoice::ConfigureAll),
            2 => Ok(MenuChoice::TestConnectivity),
            n => Err(invalid(format!("no option {n}"))),
        }
    }
}

/// Show the menu and run choices until the operator exits or input ends.
pub async fn run_menu<R, W>(app: &App, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(MENU.as_bytes()).await?;

        let choice = loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                return Ok(());
            };
            match line.parse::<MenuChoice>() {
                Ok(choice) => break choice,
                Err(e) => output.write_all(format!("{e}\n").as_bytes()).await?,
            }
        };

        let text = match choice {
            MenuChoice::Exit => return Ok(()),
            MenuChoice::ConfigureAll => app.configure_all().await.to_string(),
            MenuChoice::TestConnectivity => app.verify_connectivity().await.to_string(),
        };
        output.write_all(format!("{text}\n").as_bytes()).await?;
        output.flush().await?;
    }
}
