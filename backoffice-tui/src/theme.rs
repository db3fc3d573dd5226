//! Console themes and color utilities.

use crate::notifications::NotificationLevel;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl Theme {
    /// Theme by configured name; unknown names fall back to SynthBrute.
    pub fn named(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Self::classic(),
            _ => Self::synthbrute(),
        }
    }

    pub fn synthbrute() -> Self {
        Self {
            bg: Color::Rgb(10, 10, 10),
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            primary_dim: Color::Rgb(0, 136, 136),
            secondary: Color::Rgb(255, 0, 255),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }

    /// Sixteen-color palette for terminals without truecolor.
    pub fn classic() -> Self {
        Self {
            bg: Color::Reset,
            bg_highlight: Color::DarkGray,
            primary: Color::Blue,
            primary_dim: Color::Cyan,
            secondary: Color::Magenta,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            text: Color::Reset,
            text_dim: Color::Gray,
            border: Color::Gray,
            border_focus: Color::Blue,
        }
    }
}

pub fn notification_color(level: NotificationLevel, theme: &Theme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

/// Attendance entry status.
pub fn attendance_status_color(status: &str, theme: &Theme) -> Color {
    match status.trim().to_ascii_lowercase().as_str() {
        "present" => theme.success,
        "absent" => theme.error,
        "late" => theme.warning,
        _ => theme.text_dim,
    }
}

pub fn role_color(role: &str, theme: &Theme) -> Color {
    match role.trim().to_ascii_lowercase().as_str() {
        "admin" => theme.secondary,
        "mentor" => theme.warning,
        "student" => theme.primary,
        _ => theme.text_dim,
    }
}
