//! PC-to-router connectivity checks.
//!
//! Every PC requests a DHCP lease, then pings every addressed interface of
//! every router. A ping counts as successful when the success marker shows
//! up near the end of its output.

mod classify;
mod report;
mod tally;

use log::{debug, info, warn};
use regex::bytes::Regex;
use tokio::io::{AsyncRead, AsyncWrite};

pub use classify::{TAIL_LINES, is_reachable};
pub use report::{ConnectivityReport, PcReport, ProbeOutcome, Target};
pub use tally::ConnectivityTally;

use crate::channel::compile_literal;
use crate::config::Settings;
use crate::driver::{Session, SessionBuilder};
use crate::error::{ChannelError, Result};
use crate::platform::CliMode;
use crate::topology::{Device, Testbed};

/// Every addressed interface of every router, in testbed order.
pub fn router_targets(testbed: &Testbed) -> Vec<Target> {
    testbed
        .routers()
        .flat_map(|router| {
            router.addressed_interfaces().filter_map(move |interface| {
                interface.address().map(|address| Target {
                    router: router.name.clone(),
                    interface: interface.name.clone(),
                    address,
                })
            })
        })
        .collect()
}

/// Runs the connectivity check over a testbed.
pub struct Prober<'a> {
    testbed: &'a Testbed,
    settings: &'a Settings,
}

impl<'a> Prober<'a> {
    pub fn new(testbed: &'a Testbed, settings: &'a Settings) -> Self {
        Self { testbed, settings }
    }

    /// Probe from every PC with a Telnet endpoint, one after the other.
    pub async fn run(&self) -> ConnectivityReport {
        let targets = router_targets(self.testbed);
        let mut report = ConnectivityReport::default();

        for pc in self.testbed.pcs() {
            if pc.telnet.is_none() {
                debug!("Skipping {}: no telnet connection", pc.name);
                continue;
            }
            let pc_report = self.probe_pc(pc, &targets, &mut report.tally).await;
            report.pcs.push(pc_report);
        }

        report
    }

    async fn probe_pc(
        &self,
        pc: &Device,
        targets: &[Target],
        tally: &mut ConnectivityTally,
    ) -> PcReport {
        let mut pc_report = PcReport::new(&pc.name);

        let opened = async {
            let mut session = SessionBuilder::for_device(pc, &self.settings.timings)?.build()?;
            session.open().await?;
            Ok::<_, crate::Error>(session)
        }
        .await;

        let mut session = match opened {
            Ok(session) => session,
            Err(e) => {
                warn!("Cannot reach {}: {}", pc.name, e);
                pc_report.error = Some(e.to_string());
                return pc_report;
            }
        };

        if let Err(e) = probe_session(&mut session, targets, self.settings, tally, &mut pc_report).await
        {
            warn!("Probing from {} stopped: {}", pc.name, e);
            pc_report.error = Some(e.to_string());
            return pc_report;
        }

        if let Err(e) = session.close().await {
            debug!("Closing {} failed: {}", pc.name, e);
        }
        pc_report
    }
}

/// Lease, then ping each target over an open PC session.
///
/// Outcomes are pushed onto `pc_report` and counted in `tally` as they
/// happen, so both stay accurate when an error ends the run early.
pub async fn probe_session<S>(
    session: &mut Session<S>,
    targets: &[Target],
    settings: &Settings,
    tally: &mut ConnectivityTally,
    pc_report: &mut PcReport,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let timings = &settings.timings;
    let prompt = CliMode::UserExec
        .pattern(session.hostname())
        .map_err(ChannelError::from)?;
    let lease_marker = compile_literal(&settings.lease_marker, false).map_err(ChannelError::from)?;

    session.send(&settings.lease_command).await?;
    match session.expect(&[lease_marker], timings.lease).await {
        Ok(_) => {
            pc_report.lease_acquired = true;
            info!("[{}] lease acquired", session.device());
        }
        Err(e) if e.is_prompt_timeout() => {
            warn!("[{}] no lease confirmation within {:?}", session.device(), timings.lease);
        }
        Err(e) => return Err(e),
    }
    settle(session, &prompt, timings.lease).await?;

    for target in targets {
        info!("[{}] pinging {}", session.device(), target);
        session.send(&format!("ping {}", target.address)).await?;

        let collected = session
            .read_until_or_deadline(&prompt, timings.probe_settle)
            .await?;
        let mut output = collected.text;
        output.push_str(&session.read_available().await?);

        let reachable = is_reachable(&output, &settings.success_marker);
        if reachable {
            info!("[{}] {} reachable", session.device(), target);
        } else {
            info!("[{}] {} unreachable", session.device(), target);
            session.interrupt().await?;
            match session.expect(std::slice::from_ref(&prompt), timings.interrupt).await {
                Ok(_) => {}
                Err(e) if e.is_prompt_timeout() => {
                    warn!(
                        "[{}] prompt did not return after interrupt",
                        session.device()
                    );
                }
                Err(e) => return Err(e),
            }
            session.read_available().await?;
        }

        tally.record(reachable);
        pc_report.probes.push(ProbeOutcome {
            target: target.clone(),
            reachable,
        });
    }

    Ok(())
}

/// Let the PC finish printing and discard everything up to its prompt.
async fn settle<S>(session: &mut Session<S>, prompt: &Regex, max: std::time::Duration) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let collected = session.read_until_or_deadline(prompt, max).await?;
    if !collected.pattern_seen {
        debug!("[{}] prompt not seen while settling", session.device());
    }
    session.read_available().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Timings;

    fn settings() -> Settings {
        Settings {
            timings: Timings {
                lease: Duration::from_millis(200),
                probe_settle: Duration::from_millis(200),
                interrupt: Duration::from_millis(200),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn target(address: [u8; 4]) -> Target {
        Target {
            router: "R1".into(),
            interface: "Gi0/0".into(),
            address: address.into(),
        }
    }

    fn session_with(mock: tokio_test::io::Mock) -> Session<tokio_test::io::Mock> {
        let mut session = SessionBuilder::new("127.0.0.1")
            .device("PC1")
            .drain_idle(Duration::from_millis(20))
            .build_with::<tokio_test::io::Mock>()
            .unwrap();
        session.attach(mock).unwrap();
        session
    }

    #[test]
    fn test_router_targets_skip_unaddressed() {
        let testbed = Testbed::from_yaml_str(
            r#"
devices:
  R1: { type: router }
  SW1: { type: switch }
  R2: { type: router }
topology:
  R1:
    interfaces:
      Gi0/0: { ipv4: 10.0.0.1/24 }
      Gi0/1: {}
  SW1:
    interfaces:
      Vlan10: { type: svi, ipv4: 10.0.10.2/24 }
  R2:
    interfaces:
      Gi0/0: { ipv4: 10.0.0.2/24 }
"#,
        )
        .unwrap();

        let targets = router_targets(&testbed);
        let addresses: Vec<String> = targets.iter().map(|t| t.address.to_string()).collect();
        assert_eq!(addresses, ["10.0.0.1", "10.0.0.2"]);
    }

    #[tokio::test]
    async fn test_probe_success_and_failure() {
        let mock = tokio_test::io::Builder::new()
            .write(b"dhcp\r\n")
            .read(b"DDORA IP 10.0.10.11/24 GW 10.0.10.1\r\n\r\nPC1> ")
            .write(b"ping 10.0.0.1\r\n")
            .read(b"84 bytes from 10.0.0.1 icmp_seq=1 ttl=255 time=1.0 ms\r\n\r\nPC1> ")
            .write(b"ping 10.0.0.9\r\n")
            .read(b"10.0.0.9 icmp_seq=1 timeout\r\n")
            .wait(Duration::from_millis(300))
            .write(&[0x03])
            .read(b"\r\nPC1> ")
            .build();
        let mut session = session_with(mock);

        let targets = [target([10, 0, 0, 1]), target([10, 0, 0, 9])];
        let mut tally = ConnectivityTally::new();
        let mut report = PcReport::new("PC1");
        probe_session(&mut session, &targets, &settings(), &mut tally, &mut report)
            .await
            .unwrap();

        assert!(report.lease_acquired);
        assert_eq!(
            report.probes.iter().map(|p| p.reachable).collect::<Vec<_>>(),
            [true, false]
        );
        assert_eq!(tally.attempted(), 2);
        assert_eq!(tally.succeeded(), 1);
        assert_eq!(tally.percentage(), Some(50.0));
    }

    #[tokio::test]
    async fn test_missing_lease_does_not_stop_probing() {
        let mock = tokio_test::io::Builder::new()
            .write(b"dhcp\r\n")
            .read(b"DDD")
            .wait(Duration::from_millis(500))
            .write(b"ping 10.0.0.1\r\n")
            .read(b"84 bytes from 10.0.0.1 icmp_seq=1\r\nPC1> ")
            .build();
        let mut session = session_with(mock);

        let mut tally = ConnectivityTally::new();
        let mut report = PcReport::new("PC1");
        probe_session(
            &mut session,
            &[target([10, 0, 0, 1])],
            &settings(),
            &mut tally,
            &mut report,
        )
        .await
        .unwrap();

        assert!(!report.lease_acquired);
        assert_eq!(tally.succeeded(), 1);
    }
}
