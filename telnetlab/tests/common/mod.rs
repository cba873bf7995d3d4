//! Fake lab devices listening on loopback.
//!
//! `FakeIos` tracks the CLI mode of a console session closely enough for
//! configuration scripts to run against it; `FakeVpcs` answers `dhcp` and
//! `ping` the way a virtual PC does.

#![allow(dead_code)]

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use indexmap::IndexSet;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use telnetlab::config::{Settings, Timings};

/// Settings with waits short enough for loopback servers.
pub fn fast_settings(output_dir: &std::path::Path) -> Settings {
    Settings {
        timings: Timings {
            connect: Duration::from_secs(2),
            prompt: Duration::from_millis(500),
            key_generation: Duration::from_millis(800),
            probe_settle: Duration::from_millis(300),
            lease: Duration::from_millis(500),
            interrupt: Duration::from_millis(500),
            capture: Duration::from_millis(800),
            device_pause: Duration::ZERO,
        },
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    User,
    Privileged,
    Global,
    Interface,
    Subinterface,
    Vlan,
    Router,
    Line,
    Dhcp,
}

impl Mode {
    fn marker(self) -> &'static str {
        match self {
            Mode::User => ">",
            Mode::Privileged => "#",
            Mode::Global => "(config)#",
            Mode::Interface => "(config-if)#",
            Mode::Subinterface => "(config-subif)#",
            Mode::Vlan => "(config-vlan)#",
            Mode::Router => "(config-router)#",
            Mode::Line => "(config-line)#",
            Mode::Dhcp => "(dhcp-config)#",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    /// Locked console waiting for its password.
    ConsolePassword,
    EnablePassword,
    ReplaceKeys,
    ModulusBits,
}

/// Device state that survives reconnects.
#[derive(Debug)]
pub struct IosState {
    pub hostname: String,
    pub console_password: Option<String>,
    pub enable_secret: Option<String>,
    pub has_keys: bool,
    /// Configuration lines in the order first entered.
    pub running: IndexSet<String>,
    /// Every line received, across connections.
    pub received: Vec<String>,
    /// Commands answered with an IOS syntax error.
    pub reject: HashSet<String>,
    /// A command that never gets an answer.
    pub hang_on: Option<String>,
}

impl IosState {
    fn new() -> Self {
        Self {
            hostname: "Router".to_string(),
            console_password: None,
            enable_secret: None,
            has_keys: false,
            running: IndexSet::new(),
            received: Vec::new(),
            reject: HashSet::new(),
            hang_on: None,
        }
    }
}

struct Console {
    mode: Mode,
    locked: bool,
    pending: Option<Pending>,
    line: String,
}

pub struct FakeIos {
    pub port: u16,
    pub state: Arc<Mutex<IosState>>,
}

impl FakeIos {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(setup: impl FnOnce(&mut IosState)) -> Self {
        let mut state = IosState::new();
        setup(&mut state);
        let state = Arc::new(Mutex::new(state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let shared = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve_ios(stream, shared.clone()));
            }
        });

        Self { port, state }
    }

    pub fn received(&self) -> Vec<String> {
        self.state.lock().unwrap().received.clone()
    }
}

async fn serve_ios(mut stream: TcpStream, state: Arc<Mutex<IosState>>) {
    let locked = state.lock().unwrap().console_password.is_some();
    let mut console = Console {
        mode: Mode::User,
        locked,
        pending: None,
        line: String::new(),
    };
    let mut line = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        for &byte in &chunk[..n] {
            match byte {
                b'\n' => {
                    let text = String::from_utf8_lossy(&line).trim_end_matches('\r').to_string();
                    line.clear();
                    let reply = {
                        let mut state = state.lock().unwrap();
                        ios_line(&mut state, &mut console, &text)
                    };
                    if let Some(reply) = reply {
                        if stream.write_all(reply.as_bytes()).await.is_err() {
                            return;
                        }
                    }
                }
                _ => line.push(byte),
            }
        }
    }
}

fn ios_line(state: &mut IosState, console: &mut Console, input: &str) -> Option<String> {
    state.received.push(input.to_string());

    if state.hang_on.as_deref() == Some(input) {
        return None;
    }

    if let Some(pending) = console.pending.take() {
        return Some(match pending {
            Pending::ConsolePassword => {
                console.locked = false;
                prompt(state, console)
            }
            Pending::EnablePassword => {
                console.mode = Mode::Privileged;
                prompt(state, console)
            }
            Pending::ReplaceKeys => modulus_question(state, console),
            Pending::ModulusBits => {
                state.has_keys = true;
                format!(
                    "% Generating {input} bit RSA keys, keys will be non-exportable...\r\n\
                     [OK] (elapsed time was 1 seconds)\r\n\r\n{}",
                    prompt_text(state, console)
                )
            }
        });
    }

    if console.locked {
        console.pending = Some(Pending::ConsolePassword);
        return Some("\r\nUser Access Verification\r\n\r\nPassword: ".to_string());
    }

    if state.reject.contains(input) {
        return Some(format!(
            "\r\n% Invalid input detected at '^' marker.\r\n\r\n{}",
            prompt_text(state, console)
        ));
    }

    match console.mode {
        Mode::User => match input {
            "enable" if state.enable_secret.is_some() => {
                console.pending = Some(Pending::EnablePassword);
                Some("Password: ".to_string())
            }
            "enable" => {
                console.mode = Mode::Privileged;
                Some(prompt(state, console))
            }
            _ => Some(prompt(state, console)),
        },
        Mode::Privileged => match input {
            "configure terminal" => {
                console.mode = Mode::Global;
                Some(format!(
                    "Enter configuration commands, one per line.  End with CNTL/Z.\r\n{}",
                    prompt_text(state, console)
                ))
            }
            "show running-config" => Some(running_config(state, console)),
            "disable" => {
                console.mode = Mode::User;
                Some(prompt(state, console))
            }
            _ => Some(prompt(state, console)),
        },
        Mode::Global => Some(global_line(state, console, input)),
        _ => Some(submode_line(state, console, input)),
    }
}

fn global_line(state: &mut IosState, console: &mut Console, input: &str) -> String {
    if input == "exit" || input == "end" {
        console.mode = Mode::Privileged;
        return prompt(state, console);
    }
    if input == "crypto key generate rsa" {
        let name = format!("{}.local", state.hostname);
        if state.has_keys {
            console.pending = Some(Pending::ReplaceKeys);
            return format!(
                "% You already have RSA keys defined named {name}.\r\n\
                 % Do you really want to replace them? [yes/no]: "
            );
        }
        return modulus_question(state, console);
    }

    state.running.insert(input.to_string());

    if let Some(hostname) = input.strip_prefix("hostname ") {
        state.hostname = hostname.to_string();
    } else if let Some(secret) = input.strip_prefix("enable secret ") {
        state.enable_secret = Some(secret.to_string());
    } else if let Some(name) = input.strip_prefix("interface ") {
        console.mode = if name.contains('.') {
            Mode::Subinterface
        } else {
            Mode::Interface
        };
    } else if input.starts_with("ip dhcp pool ") {
        console.mode = Mode::Dhcp;
    } else if input.starts_with("router ") {
        console.mode = Mode::Router;
    } else if input.starts_with("vlan ") {
        console.mode = Mode::Vlan;
    } else if let Some(line) = input.strip_prefix("line ") {
        console.mode = Mode::Line;
        console.line = line.to_string();
    }
    prompt(state, console)
}

fn submode_line(state: &mut IosState, console: &mut Console, input: &str) -> String {
    if input == "exit" {
        console.mode = Mode::Global;
        return prompt(state, console);
    }
    if input == "end" {
        console.mode = Mode::Privileged;
        return prompt(state, console);
    }
    if console.mode == Mode::Line && console.line == "console 0" {
        if let Some(password) = input.strip_prefix("password ") {
            state.console_password = Some(password.to_string());
        }
    }
    state.running.insert(format!(" {input}"));
    prompt(state, console)
}

fn modulus_question(state: &IosState, console: &mut Console) -> String {
    console.pending = Some(Pending::ModulusBits);
    format!(
        "The name for the keys will be: {}.local\r\n\
         Choose the size of the key modulus in the range of 360 to 4096 for your\r\n  \
         General Purpose Keys. Choosing a key modulus greater than 512 may take\r\n  \
         a few minutes.\r\n\r\nHow many bits in the modulus [512]: ",
        state.hostname
    )
}

fn running_config(state: &IosState, console: &Console) -> String {
    let mut body = String::from("!\r\nversion 15.2\r\n");
    for line in &state.running {
        body.push_str(line);
        body.push_str("\r\n");
    }
    body.push_str("end\r\n");
    format!(
        "Building configuration...\r\n\r\nCurrent configuration : {} bytes\r\n{}\r\n{}",
        body.len(),
        body,
        prompt_text(state, console)
    )
}

fn prompt_text(state: &IosState, console: &Console) -> String {
    format!("{}{}", state.hostname, console.mode.marker())
}

fn prompt(state: &IosState, console: &Console) -> String {
    format!("\r\n{}", prompt_text(state, console))
}

/// A virtual PC answering `dhcp` and `ping`.
pub struct FakeVpcs {
    pub port: u16,
    pub received: Arc<Mutex<Vec<String>>>,
}

impl FakeVpcs {
    /// `reachable` lists the addresses whose pings get replies.
    pub async fn start(name: &str, reachable: &[Ipv4Addr], lease: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));

        let name = name.to_string();
        let reachable: HashSet<Ipv4Addr> = reachable.iter().copied().collect();
        let log = received.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve_vpcs(
                    stream,
                    name.clone(),
                    reachable.clone(),
                    lease,
                    log.clone(),
                ));
            }
        });

        Self { port, received }
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

async fn serve_vpcs(
    mut stream: TcpStream,
    name: String,
    reachable: HashSet<Ipv4Addr>,
    lease: bool,
    received: Arc<Mutex<Vec<String>>>,
) {
    let prompt = format!("\r\n{name}> ");
    let mut line = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        for &byte in &chunk[..n] {
            let reply = match byte {
                0x03 => {
                    received.lock().unwrap().push("^C".to_string());
                    Some(prompt.clone())
                }
                b'\n' => {
                    let text = String::from_utf8_lossy(&line).trim_end_matches('\r').to_string();
                    line.clear();
                    received.lock().unwrap().push(text.clone());
                    Some(vpcs_line(&text, &reachable, lease, &prompt))
                }
                _ => {
                    line.push(byte);
                    None
                }
            };
            if let Some(reply) = reply.filter(|r| !r.is_empty()) {
                if stream.write_all(reply.as_bytes()).await.is_err() {
                    return;
                }
            }
        }
    }
}

fn vpcs_line(input: &str, reachable: &HashSet<Ipv4Addr>, lease: bool, prompt: &str) -> String {
    if input == "dhcp" {
        return if lease {
            format!("DDORA IP 10.0.10.11/24 GW 10.0.10.1\r\n{prompt}")
        } else {
            "DDD".to_string()
        };
    }
    if let Some(target) = input.strip_prefix("ping ") {
        return match target.parse::<Ipv4Addr>() {
            Ok(address) if reachable.contains(&address) => {
                let mut out = String::new();
                for seq in 1..=3 {
                    out.push_str(&format!(
                        "84 bytes from {address} icmp_seq={seq} ttl=255 time=1.{seq} ms\r\n"
                    ));
                }
                out.push_str(prompt);
                out
            }
            // Unanswered pings keep printing until interrupted
            Ok(address) => format!("{address} icmp_seq=1 timeout\r\n{address} icmp_seq=2 timeout\r\n"),
            Err(_) => format!("Invalid address\r\n{prompt}"),
        };
    }
    prompt.to_string()
}
