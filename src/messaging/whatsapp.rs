use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

// ============================================================================
// WhatsApp Notification Gateway
// ============================================================================
//
// Delivers a rendered text message to a normalized phone number and reports
// the outcome. Callers must pass already-normalized numbers; the engine
// rejects anything else before reaching this layer.
//
// The gateway never raises toward the engine: every outcome, including a
// fast failure while the delivery gate is cooling down, is folded into a
// SendReceipt.
//
// ============================================================================

/// Provider-side cap on a single message body.
const MAX_MESSAGE_CHARS: usize = 4096;

const GATE_TRIP_THRESHOLD: u32 = 5;
const GATE_COOLDOWN: Duration = Duration::from_secs(30);

/// Outcome of a single send attempt.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    pub succeeded: bool,
    /// Provider acknowledgment or error text, kept for the audit trail.
    pub provider_response: String,
}

impl SendReceipt {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            provider_response: response.into(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            provider_response: reason.into(),
        }
    }
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, phone_number: &str, text: &str) -> SendReceipt;
}

/// Fail-fast guard in front of the provider. After enough consecutive
/// rejections the gate closes for a cooldown window; the first send after
/// the window acts as the recovery probe. Every fast failure still lands on
/// the order as an ordinary unsuccessful send, so nothing is lost - the
/// selector re-offers the notification later.
struct DeliveryGate {
    state: Mutex<GateState>,
}

struct GateState {
    consecutive_failures: u32,
    closed_at: Option<Instant>,
}

impl DeliveryGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                consecutive_failures: 0,
                closed_at: None,
            }),
        }
    }

    /// May a send go to the provider right now?
    async fn permits_send(&self) -> bool {
        let state = self.state.lock().await;
        match state.closed_at {
            Some(closed_at) => closed_at.elapsed() >= GATE_COOLDOWN,
            None => true,
        }
    }

    async fn record_outcome(&self, succeeded: bool) {
        let mut state = self.state.lock().await;
        if succeeded {
            if state.closed_at.is_some() {
                tracing::info!("Delivery gate reopened after successful probe");
            }
            state.consecutive_failures = 0;
            state.closed_at = None;
            return;
        }

        state.consecutive_failures += 1;
        if state.consecutive_failures >= GATE_TRIP_THRESHOLD {
            if state.closed_at.is_none() {
                tracing::warn!(
                    failures = state.consecutive_failures,
                    cooldown_secs = GATE_COOLDOWN.as_secs(),
                    "Delivery gate closed, failing sends fast"
                );
            }
            // A failed recovery probe restarts the cooldown from now.
            state.closed_at = Some(Instant::now());
        }
    }
}

/// Gateway to the WhatsApp provider. The provider interaction itself is a
/// logging stub that enforces the provider's message constraints; the
/// backend service owning the real API credentials is an external
/// collaborator.
pub struct WhatsAppGateway {
    gate: DeliveryGate,
}

impl WhatsAppGateway {
    pub fn new() -> Self {
        Self {
            gate: DeliveryGate::new(),
        }
    }

    async fn submit(&self, phone_number: &str, text: &str) -> anyhow::Result<String> {
        if text.trim().is_empty() {
            anyhow::bail!("provider rejected empty message body");
        }
        let chars = text.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            anyhow::bail!(
                "provider rejected message: {} chars exceeds the {} limit",
                chars,
                MAX_MESSAGE_CHARS
            );
        }

        let message_id = Uuid::new_v4();
        tracing::debug!(
            recipient = %phone_number,
            message_id = %message_id,
            chars = chars,
            "Submitting message to WhatsApp provider"
        );
        Ok(format!("message {} accepted", message_id))
    }
}

impl Default for WhatsAppGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSender for WhatsAppGateway {
    async fn send(&self, phone_number: &str, text: &str) -> SendReceipt {
        if !self.gate.permits_send().await {
            tracing::warn!(
                recipient = %phone_number,
                "Send rejected, delivery gate is cooling down"
            );
            return SendReceipt::failure("delivery gate cooling down after repeated failures");
        }

        let result = self.submit(phone_number, text).await;
        self.gate.record_outcome(result.is_ok()).await;

        match result {
            Ok(response) => {
                tracing::info!(recipient = %phone_number, "Message delivered to provider");
                SendReceipt::success(response)
            }
            Err(err) => {
                tracing::warn!(recipient = %phone_number, error = %err, "Message send failed");
                SendReceipt::failure(err.to_string())
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
