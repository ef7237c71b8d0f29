use std::fmt;

/// Longest transport error description kept in a failure message.
pub const MAX_ERROR_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// HTTP 401. Ends the whole run.
    AuthExpired,
    Http(u16),
    Timeout,
    Transport(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::AuthExpired => write!(f, "Auth expired"),
            FailureReason::Http(status) => write!(f, "HTTP {}", status),
            FailureReason::Timeout => write!(f, "Timeout"),
            FailureReason::Transport(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Indexed,
    Failed(FailureReason),
}

impl SubmitOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            200 | 201 => SubmitOutcome::Indexed,
            401 => SubmitOutcome::Failed(FailureReason::AuthExpired),
            other => SubmitOutcome::Failed(FailureReason::Http(other)),
        }
    }

    pub fn transport_error(description: &str) -> Self {
        SubmitOutcome::Failed(FailureReason::Transport(truncate_chars(
            description,
            MAX_ERROR_CHARS,
        )))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Indexed)
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, SubmitOutcome::Failed(FailureReason::AuthExpired))
    }

    /// Short status text: "OK" on success, otherwise the failure reason.
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Indexed => "OK".to_string(),
            SubmitOutcome::Failed(reason) => reason.to_string(),
        }
    }
}

pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
