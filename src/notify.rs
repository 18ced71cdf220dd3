//! Alert delivery: console line, durable log entry, and a best-effort
//! desktop notification via notify-send (Linux) or osascript (macOS).

use std::process::Command;

use crate::history::{AlertEntry, AlertLog};

/// Accepts one (title, message) alert. Never fails: transport problems are
/// reported to stderr and swallowed so a bad notification cannot take down
/// a tick.
pub trait NotificationSink {
    fn notify(&self, title: &str, message: &str);
}

pub struct DesktopNotifier {
    app_name: String,
    desktop: bool,
    log: AlertLog,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>, desktop: bool, log: AlertLog) -> Self {
        Self {
            app_name: app_name.into(),
            desktop,
            log,
        }
    }
}

impl NotificationSink for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        let entry = AlertEntry::new(message);
        println!("[{}] {}", entry.timestamp.to_rfc3339(), entry.message);

        if let Err(e) = self.log.append(&entry) {
            eprintln!("Failed to write alert log: {}", e);
        }

        if self.desktop {
            if let Err(e) = send_desktop_notification(&self.app_name, title, message) {
                eprintln!("Desktop notification failed: {}", e);
            }
        }
    }
}

fn send_desktop_notification(app_name: &str, title: &str, body: &str) -> Result<(), String> {
    if cfg!(target_os = "macos") {
        send_macos_notification(title, body)
    } else {
        send_linux_notification(app_name, title, body)
    }
}

fn send_linux_notification(app_name: &str, title: &str, body: &str) -> Result<(), String> {
    Command::new("notify-send")
        .arg(format!("--app-name={}", app_name))
        .arg(title)
        .arg(body)
        .output()
        .map_err(|e| format!("notify-send failed: {}", e))
        .and_then(|output| {
            if output.status.success() {
                Ok(())
            } else {
                Err(format!("notify-send exited with: {}", output.status))
            }
        })
}

fn send_macos_notification(title: &str, body: &str) -> Result<(), String> {
    let script = format!(
        r#"display notification "{}" with title "{}""#,
        escape_applescript_string(body),
        escape_applescript_string(title)
    );

    Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .output()
        .map_err(|e| format!("osascript failed: {}", e))
        .and_then(|output| {
            if output.status.success() {
                Ok(())
            } else {
                Err(format!("osascript exited with: {}", output.status))
            }
        })
}

fn escape_applescript_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
