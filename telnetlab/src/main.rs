use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::io::BufReader;

use telnetlab::{App, Settings, Testbed, Timings, run_menu};

#[derive(Parser, Debug)]
#[command(
    name = "telnetlab",
    version,
    about = "Configure a Cisco-style lab over Telnet and check PC-to-router connectivity"
)]
struct Args {
    /// Testbed YAML file
    #[arg(default_value = "testbed.yaml")]
    testbed: PathBuf,

    /// Directory receiving the running-configuration dumps
    #[arg(short, long, default_value = "configs")]
    output_dir: PathBuf,

    /// Run one action and exit instead of showing the menu
    #[arg(long, value_enum)]
    run: Option<Action>,

    /// Text marking a successful ping
    #[arg(long, default_value = "bytes from")]
    success_marker: String,

    /// Text confirming a DHCP lease on a PC
    #[arg(long, default_value = "DORA IP")]
    lease_marker: String,

    /// Command requesting a DHCP lease on a PC
    #[arg(long, default_value = "dhcp")]
    lease_command: String,

    /// TCP connect timeout in seconds
    #[arg(long, default_value = "10")]
    connect_timeout: u64,

    /// Prompt wait per command in seconds
    #[arg(long, default_value = "10")]
    prompt_timeout: u64,

    /// Prompt wait after RSA key generation in seconds
    #[arg(long, default_value = "60")]
    key_timeout: u64,

    /// Upper bound for one ping in seconds
    #[arg(long, default_value = "6")]
    probe_settle: u64,

    /// DHCP lease wait in seconds
    #[arg(long, default_value = "10")]
    lease_timeout: u64,

    /// Wait for the prompt after interrupting a ping, in seconds
    #[arg(long, default_value = "5")]
    interrupt_timeout: u64,

    /// Upper bound for `show running-config` to finish, in seconds
    #[arg(long, default_value = "6")]
    capture_timeout: u64,

    /// Pause between two configured devices in seconds
    #[arg(long, default_value = "3")]
    device_pause: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Action {
    Configure,
    Connectivity,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            timings: Timings {
                connect: Duration::from_secs(self.connect_timeout),
                prompt: Duration::from_secs(self.prompt_timeout),
                key_generation: Duration::from_secs(self.key_timeout),
                probe_settle: Duration::from_secs(self.probe_settle),
                lease: Duration::from_secs(self.lease_timeout),
                interrupt: Duration::from_secs(self.interrupt_timeout),
                capture: Duration::from_secs(self.capture_timeout),
                device_pause: Duration::from_secs(self.device_pause),
            },
            testbed: self.testbed.clone(),
            output_dir: self.output_dir.clone(),
            success_marker: self.success_marker.clone(),
            lease_marker: self.lease_marker.clone(),
            lease_command: self.lease_command.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG=debug for session-level output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = args.settings();

    let testbed = Testbed::load(&settings.testbed)?;
    log::info!(
        "Loaded {} devices from {}",
        testbed.len(),
        settings.testbed.display()
    );
    let app = App::new(testbed, settings);

    match args.run {
        Some(Action::Configure) => println!("{}", app.configure_all().await),
        Some(Action::Connectivity) => println!("{}", app.verify_connectivity().await),
        None => run_menu(&app, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_timings() {
        let settings = Args::parse_from(["telnetlab"]).settings();
        assert_eq!(settings.timings, Timings::default());
    }

    #[test]
    fn test_interrupt_and_capture_timeouts() {
        let args = Args::parse_from([
            "telnetlab",
            "--interrupt-timeout",
            "2",
            "--capture-timeout",
            "9",
        ]);
        let timings = args.settings().timings;
        assert_eq!(timings.interrupt, Duration::from_secs(2));
        assert_eq!(timings.capture, Duration::from_secs(9));
        assert_eq!(timings.prompt, Duration::from_secs(10));
    }
}
