//! SMTP mailbox verification. One RCPT probe per candidate, plus a
//! second RCPT for a random address on the same connection to detect
//! catch-all domains.

use std::net::ToSocketAddrs;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::transport::smtp::client::SmtpConnection;
use lettre::transport::smtp::commands::{Ehlo, Mail, Rcpt};
use lettre::transport::smtp::extension::ClientId;
use lettre::transport::smtp::response::Severity;
use lettre::Address;
use rand::Rng;

use crate::domain::MxResolver;
use crate::models::{RcptProbe, SmtpVerdict};

const HELO_DOMAIN: &str = "lead-enrich.local";
const SENDER_ADDRESS: &str = "verify@lead-enrich.local";

/// Phrases that identify a transport-level error string as a permanent
/// RCPT rejection rather than a broken session.
const REJECTION_PHRASES: &[&str] = &[
    "unknown",
    "no such",
    "unavailable",
    "rejected",
    "doesn't exist",
    "does not exist",
    "disabled",
    "invalid address",
    "recipient not found",
    "user unknown",
    "mailbox unavailable",
    "no mailbox",
    "invalid recipient",
];

/// Seam for the raw RCPT conversation so the verdict logic can be
/// tested without a live mail server.
#[async_trait]
pub trait SmtpProber: Send + Sync {
    /// Probes `target` on `mx_host`, then probes `random_probe` on the
    /// same session to assess catch-all behavior.
    async fn rcpt_probe(&self, mx_host: &str, target: &str, random_probe: &str) -> RcptProbe;
}

/// Live prober speaking plain SMTP on port 25 via lettre's blocking
/// connection, run on the blocking pool.
pub struct LettreSmtpProber {
    timeout: Duration,
}

impl LettreSmtpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl SmtpProber for LettreSmtpProber {
    async fn rcpt_probe(&self, mx_host: &str, target: &str, random_probe: &str) -> RcptProbe {
        let timeout = self.timeout;
        let mx_host = mx_host.to_string();
        let target = target.to_string();
        let random_probe = random_probe.to_string();

        let outcome = tokio::task::spawn_blocking(move || {
            probe_blocking(&mx_host, &target, &random_probe, timeout)
        })
        .await;

        match outcome {
            Ok(probe) => probe,
            Err(e) => RcptProbe::SessionFailed(format!("SMTP probe task failed: {}", e)),
        }
    }
}

fn probe_blocking(
    mx_host: &str,
    target: &str,
    random_probe: &str,
    timeout: Duration,
) -> RcptProbe {
    let target_address = match Address::from_str(target) {
        Ok(addr) => addr,
        Err(e) => return RcptProbe::SessionFailed(format!("Invalid recipient {}: {}", target, e)),
    };
    let random_address = match Address::from_str(random_probe) {
        Ok(addr) => addr,
        Err(e) => return RcptProbe::SessionFailed(format!("Invalid probe address: {}", e)),
    };
    let sender_address = match Address::from_str(SENDER_ADDRESS) {
        Ok(addr) => addr,
        Err(e) => return RcptProbe::SessionFailed(format!("Invalid sender address: {}", e)),
    };

    let socket_addr = match (mx_host, 25_u16).to_socket_addrs() {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => addr,
            None => {
                return RcptProbe::SessionFailed(format!(
                    "No address for mail server {}",
                    mx_host
                ))
            }
        },
        Err(e) => {
            return RcptProbe::SessionFailed(format!(
                "Could not resolve mail server {}: {}",
                mx_host, e
            ))
        }
    };

    let helo = ClientId::Domain(HELO_DOMAIN.to_string());
    let mut conn = match SmtpConnection::connect(socket_addr, Some(timeout), &helo, None, None) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!("SMTP connect to {} failed: {}", mx_host, e);
            return RcptProbe::SessionFailed(format!("Connect failed: {}", e));
        }
    };

    if let Err(e) = conn.command(Ehlo::new(helo.clone())) {
        conn.quit().ok();
        return RcptProbe::SessionFailed(format!("EHLO failed: {}", e));
    }
    if let Err(e) = conn.command(Mail::new(Some(sender_address), vec![])) {
        conn.quit().ok();
        return RcptProbe::SessionFailed(format!("MAIL FROM failed: {}", e));
    }

    let target_accepted = match rcpt_accepted(&mut conn, target_address) {
        Ok(accepted) => accepted,
        Err(message) => {
            conn.quit().ok();
            return RcptProbe::SessionFailed(message);
        }
    };

    // A failed catch-all probe is ignored rather than voiding the
    // session; the target answer already stands on its own.
    tracing::debug!("Catch-all check on {} with RCPT TO:<{}>", mx_host, random_probe);
    let random_accepted = rcpt_accepted(&mut conn, random_address).unwrap_or(false);

    conn.quit().ok();
    RcptProbe::Answered {
        target_accepted,
        random_accepted,
    }
}

/// `Ok(true)` on 2xx, `Ok(false)` on any permanent 5xx (a policy
/// rejection still tells us the server will not deliver to this
/// address), `Err` only when the session cannot decide, such as a 4xx
/// greylisting deferral.
fn rcpt_accepted(conn: &mut SmtpConnection, address: Address) -> Result<bool, String> {
    match conn.command(Rcpt::new(address, vec![])) {
        Ok(response) => match response.code().severity {
            Severity::PositiveCompletion => Ok(true),
            Severity::PermanentNegativeCompletion => {
                let message = response.message().collect::<Vec<&str>>().join(" ");
                tracing::debug!("RCPT permanently rejected: {} {}", response.code(), message);
                Ok(false)
            }
            _ => Err(format!(
                "RCPT inconclusive response: {}",
                response.code()
            )),
        },
        Err(e) => {
            // lettre surfaces some permanent rejections as transport
            // errors; classify those by code or wording.
            let err_string = e.to_string();
            if rejection_is_permanent(&err_string) {
                Ok(false)
            } else {
                Err(format!("RCPT failed: {}", err_string))
            }
        }
    }
}

fn rejection_is_permanent(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["550", "551", "552", "553", "554"]
        .iter()
        .any(|c| message.contains(c))
        || REJECTION_PHRASES.iter().any(|p| lower.contains(p))
}

/// Runs the full MX-then-RCPT check for one candidate and scores the
/// signal quality.
pub struct SmtpVerifier {
    resolver: Arc<dyn MxResolver>,
    prober: Arc<dyn SmtpProber>,
}

impl SmtpVerifier {
    pub fn new(resolver: Arc<dyn MxResolver>, prober: Arc<dyn SmtpProber>) -> Self {
        Self { resolver, prober }
    }

    /// Verdict scoring: no MX means the domain cannot receive mail at
    /// all and scores 0. With MX present the verdict starts at 10,
    /// earns 80 when the mailbox is confirmed, drops to at most 50
    /// when the domain accepts everything, and lands at 30 when the
    /// session could not answer.
    pub async fn verify(&self, address: &str) -> SmtpVerdict {
        let Some(domain) = address.split('@').nth(1).filter(|d| !d.is_empty()) else {
            return SmtpVerdict::default();
        };

        let mx_records = match self.resolver.lookup_mx(domain).await {
            Ok(records) if !records.is_empty() => records,
            Ok(_) => {
                tracing::debug!("No MX records for {}, scoring 0", domain);
                return SmtpVerdict::default();
            }
            Err(e) => {
                tracing::debug!("MX lookup failed for {}: {}", domain, e);
                return SmtpVerdict::default();
            }
        };

        let mx_host = mx_records
            .iter()
            .min_by_key(|r| r.preference)
            .map(|r| r.host.clone())
            .unwrap_or_else(|| mx_records[0].host.clone());

        let random_probe = format!(
            "zzz-does-not-exist-{:x}@{}",
            rand::thread_rng().gen::<u64>(),
            domain
        );

        let mut verdict = SmtpVerdict {
            exists: false,
            accept_all: false,
            score: 10,
        };

        match self.prober.rcpt_probe(&mx_host, address, &random_probe).await {
            RcptProbe::Answered {
                target_accepted,
                random_accepted,
            } => {
                if target_accepted {
                    verdict.exists = true;
                    verdict.score += 80;
                }
                if random_accepted {
                    verdict.accept_all = true;
                    verdict.score = verdict.score.saturating_sub(40).max(30);
                }
            }
            RcptProbe::SessionFailed(reason) => {
                tracing::debug!("SMTP session for {} inconclusive: {}", address, reason);
                verdict.score += 20;
            }
        }

        verdict
    }
}
