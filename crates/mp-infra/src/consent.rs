//! Consent adapters.

use std::io::BufRead;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use mp_core::ports::ConsentPort;
use mp_core::ConsentDecision;

/// Replies with a fixed decision. Used for unattended runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedConsent {
    decision: ConsentDecision,
}

impl ScriptedConsent {
    pub fn new(decision: ConsentDecision) -> Self {
        Self { decision }
    }

    pub fn granted() -> Self {
        Self::new(ConsentDecision::Answered { consented: true })
    }

    pub fn declined() -> Self {
        Self::new(ConsentDecision::Answered { consented: false })
    }
}

#[async_trait]
impl ConsentPort for ScriptedConsent {
    async fn request_consent(&self) -> oneshot::Receiver<ConsentDecision> {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(self.decision);
        rx
    }
}

/// Asks on the terminal. `y`/`yes` consents, any other answer declines and
/// end of input cancels.
#[derive(Debug, Clone)]
pub struct TerminalConsent {
    prompt: String,
}

impl TerminalConsent {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for TerminalConsent {
    fn default() -> Self {
        Self::new("Set up a work profile managed by your organization? [y/N] ")
    }
}

#[async_trait]
impl ConsentPort for TerminalConsent {
    async fn request_consent(&self) -> oneshot::Receiver<ConsentDecision> {
        let (tx, rx) = oneshot::channel();
        let prompt = self.prompt.clone();
        tokio::task::spawn_blocking(move || {
            eprint!("{prompt}");
            let stdin = std::io::stdin();
            let decision = read_decision(&mut stdin.lock());
            debug!(?decision, "terminal consent answered");
            if tx.send(decision).is_err() {
                warn!("consent answer arrived after the flow stopped waiting");
            }
        });
        rx
    }
}

fn read_decision(input: &mut impl BufRead) -> ConsentDecision {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => ConsentDecision::Cancelled,
        Ok(_) => {
            let answer = line.trim().to_ascii_lowercase();
            ConsentDecision::Answered {
                consented: answer == "y" || answer == "yes",
            }
        }
        Err(err) => {
            warn!(error = %err, "failed to read consent answer");
            ConsentDecision::Cancelled
        }
    }
}
