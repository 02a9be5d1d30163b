//! Desktop notifications through an external command
//!
//! The command is invoked as
//! `<program> --app-name=<title> --expire-time=<ms> <title> <message>`,
//! which is the interface of `notify-send`. The child is spawned and never
//! awaited.

use crate::config::NotificationConfig;
use crate::notify::NOTIFICATION_TITLE;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Program looked up on `PATH` when no command is configured
pub const DEFAULT_NOTIFY_PROGRAM: &str = "notify-send";

/// Shows notifications with a desktop notification program
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: PathBuf,
    expire_time: Duration,
}

impl CommandNotifier {
    pub fn new(program: impl Into<PathBuf>, expire_time: Duration) -> Self {
        Self {
            program: program.into(),
            expire_time,
        }
    }

    /// Picks the notification program from configuration
    ///
    /// * no `command` - probe `PATH` for `notify-send`
    /// * `command = ""` - native notifications disabled
    /// * any other value - use that program as-is
    pub fn from_config(config: &NotificationConfig) -> Option<Self> {
        match config.command.as_deref() {
            None => Self::probe(config.display_time()),
            Some("") => None,
            Some(program) => Some(Self::new(program, config.display_time())),
        }
    }

    /// Finds `notify-send` on `PATH`
    pub fn probe(expire_time: Duration) -> Option<Self> {
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join(DEFAULT_NOTIFY_PROGRAM))
            .find(|candidate| is_executable(candidate))
            .map(|program| Self::new(program, expire_time))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Spawns the notification program for one message
    ///
    /// Fails when no tokio runtime is available or the program cannot be
    /// started; the caller is expected to fall back to a banner.
    pub fn show(&self, message: &str) -> std::io::Result<()> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no async runtime available to spawn the notification command",
            ));
        }

        Command::new(&self.program)
            .arg(format!("--app-name={}", NOTIFICATION_TITLE))
            .arg(format!("--expire-time={}", self.expire_time.as_millis()))
            .arg(NOTIFICATION_TITLE)
            .arg(message)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()?;

        Ok(())
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_disabled() {
        let config = NotificationConfig {
            display_time: 5000,
            command: Some(String::new()),
        };
        assert!(CommandNotifier::from_config(&config).is_none());
    }

    #[test]
    fn test_from_config_explicit_program() {
        let config = NotificationConfig {
            display_time: 2000,
            command: Some("/usr/local/bin/my-notify".to_string()),
        };
        let notifier = CommandNotifier::from_config(&config).unwrap();
        assert_eq!(notifier.program(), Path::new("/usr/local/bin/my-notify"));
    }

    #[test]
    fn test_show_without_runtime_fails() {
        let notifier = CommandNotifier::new("notify-send", Duration::from_secs(5));
        assert!(notifier.show("hello").is_err());
    }

    #[tokio::test]
    async fn test_show_missing_program_fails() {
        let notifier = CommandNotifier::new(
            "/nonexistent/definitely-not-a-notifier",
            Duration::from_secs(5),
        );
        assert!(notifier.show("hello").is_err());
    }

    #[test]
    fn test_is_executable_rejects_missing_and_dirs() {
        assert!(!is_executable(Path::new("/nonexistent/notify-send")));
        assert!(!is_executable(&std::env::temp_dir()));
    }
}
