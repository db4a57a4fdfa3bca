//! Starts the host server through its own command-line tool.

use async_trait::async_trait;
use tether_core::{ServerConfig, ServerLauncher, TetherError, transport};
use tokio::process::Command;
use tracing::{debug, info};

/// Runs `<program> -P <port> start-server` when nothing answers on the
/// configured port.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: String,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ServerLauncher for ProcessLauncher {
    async fn ensure_running(&self, config: &ServerConfig) -> tether_core::Result<()> {
        if transport::connect(config).await.is_ok() {
            debug!(addr = %config.address(), "host server already running");
            return Ok(());
        }

        info!(program = %self.program, port = config.port, "starting host server");
        let status = Command::new(&self.program)
            .arg("-P")
            .arg(config.port.to_string())
            .arg("start-server")
            .status()
            .await
            .map_err(|e| TetherError::Launch(format!("{}: {e}", self.program)))?;

        if !status.success() {
            return Err(TetherError::Launch(format!(
                "{} exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::ErrorKind;

    #[tokio::test]
    async fn skips_launch_when_server_answers() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // A program that cannot exist proves nothing was spawned.
        let launcher = ProcessLauncher::new("/nonexistent/adb");
        launcher
            .ensure_running(&ServerConfig::new("127.0.0.1", port))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let launcher = ProcessLauncher::new("/nonexistent/adb");
        let err = launcher
            .ensure_running(&ServerConfig::new("127.0.0.1", port))
            .await
            .unwrap_err();
        assert!(matches!(err, TetherError::Launch(_)));
        assert_eq!(err.kind(), ErrorKind::Connection);
    }
}
