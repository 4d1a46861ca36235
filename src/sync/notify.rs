use tracing::{error, info};

/// An advisory message for the person using the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNotice {
    /// Something failed; state has already been put right.
    Error(String),
    Info(String),
}

impl UserNotice {
    pub fn error(message: impl Into<String>) -> Self {
        UserNotice::Error(message.into())
    }

    pub fn info(message: impl Into<String>) -> Self {
        UserNotice::Info(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            UserNotice::Error(message) | UserNotice::Info(message) => message,
        }
    }
}

/// Where notices go: a toast layer, a status bar, a log.
///
/// Notices are advisory only. The engine has already handled the condition
/// (rolled back, refreshed) by the time one is emitted, so implementations
/// must not block or try to recover anything.
pub trait Notifier {
    fn notify(&self, notice: UserNotice);
}

/// Routes notices to the log. The default when no UI channel exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: UserNotice) {
        match notice {
            UserNotice::Error(message) => error!("{message}"),
            UserNotice::Info(message) => info!("{message}"),
        }
    }
}
