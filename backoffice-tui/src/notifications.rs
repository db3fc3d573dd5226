//! Notification system for the console.

use crate::nav::View;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "SUCCESS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// Re-run the failed refresh of this screen.
    Retry(View),
    Dismiss,
}

impl NotificationAction {
    pub fn hint(&self) -> &'static str {
        match self {
            NotificationAction::Retry(_) => "[r] retry",
            NotificationAction::Dismiss => "[Esc] dismiss",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub action: Option<NotificationAction>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            action: None,
            created_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message).with_action(NotificationAction::Dismiss)
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Footer text: level, message and the action hint.
    pub fn render_text(&self) -> String {
        match &self.action {
            Some(action) => format!("{}: {}  {}", self.level.label(), self.message, action.hint()),
            None => format!("{}: {}", self.level.label(), self.message),
        }
    }
}
