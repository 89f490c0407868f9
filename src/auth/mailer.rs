use std::sync::Mutex;

/// Outbound mail for account verification.
pub trait Mailer: Send + Sync {
    fn send_verification(&self, email: &str, doctor_name: &str, token: &str);
}

/// Writes the verification link to the log instead of sending mail.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_verification(&self, email: &str, doctor_name: &str, token: &str) {
        tracing::info!(email, doctor_name, token, "Verification email (log delivery)");
    }
}

/// Captures sent tokens; for tests and local development.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent token sent to `email`.
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent.lock().ok().and_then(|sent| {
            sent.iter()
                .rev()
                .find(|(to, _)| to == email)
                .map(|(_, token)| token.clone())
        })
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Mailer for RecordingMailer {
    fn send_verification(&self, email: &str, _doctor_name: &str, token: &str) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((email.to_string(), token.to_string()));
        }
    }
}
