//! LIRC `irsend` transmitter.
//!
//! Each token becomes one `irsend SEND_ONCE <remote> <token>` process. The
//! process runs on its own tokio task; its exit status is reported through
//! the returned [`Delivery`].

use std::process::Stdio;

use tokio::process::Command;
use tokio::runtime::Handle;

use crate::commands::CommandToken;
use crate::config::IrConfig;
use crate::traits::{Delivery, TransmitError, Transmitter};

/// Default LIRC client binary.
pub const DEFAULT_PROGRAM: &str = "irsend";

/// Remote definition for the LEGO Power Functions single-output receiver.
pub const DEFAULT_REMOTE: &str = "LEGO_Single_Output";

/// Transmitter that shells out to `irsend` for every token.
#[derive(Clone, Debug)]
pub struct IrSendTransmitter {
    program: String,
    remote: String,
}

impl Default for IrSendTransmitter {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_REMOTE)
    }
}

impl IrSendTransmitter {
    /// Creates a transmitter for the given program and remote name.
    pub fn new(program: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            remote: remote.into(),
        }
    }

    /// Create from shared IrConfig
    pub fn from_config(config: &IrConfig) -> Self {
        Self::new(config.program.as_str(), config.remote.as_str())
    }

    /// Program that will be executed.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Remote definition name.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Arguments passed to the program for `token`.
    pub fn argv<'a>(&'a self, token: &'a CommandToken) -> [&'a str; 3] {
        ["SEND_ONCE", self.remote.as_str(), token.as_str()]
    }

    /// Full command line, for logging.
    pub fn command_line(&self, token: &CommandToken) -> String {
        let mut line = self.program.clone();
        for arg in self.argv(token) {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Transmitter for IrSendTransmitter {
    fn send(&self, token: CommandToken) -> Delivery {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => return Delivery::ready(Err(TransmitError::Spawn(e.to_string()))),
        };

        log::info!("calling: {}", self.command_line(&token));

        let mut cmd = Command::new(&self.program);
        cmd.args(self.argv(&token));
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let (tx, delivery) = Delivery::channel();
        handle.spawn(async move {
            let result = match cmd.output().await {
                Err(e) => Err(TransmitError::Spawn(e.to_string())),
                Ok(output) if output.status.success() => Ok(()),
                Ok(output) => Err(TransmitError::Exit {
                    code: output.status.code(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }),
            };
            let _ = tx.send(result);
        });

        delivery
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{encode_speed, encode_stop, Channel, Speed};

    #[test]
    fn default_command_line() {
        let tx = IrSendTransmitter::default();
        let token = encode_speed(Channel::TwoR, Speed::new(-3).unwrap());
        assert_eq!(
            tx.command_line(&token),
            "irsend SEND_ONCE LEGO_Single_Output 2R_M3"
        );
        assert_eq!(tx.argv(&token), ["SEND_ONCE", "LEGO_Single_Output", "2R_M3"]);
    }

    #[test]
    fn from_config_uses_configured_names() {
        let config = IrConfig::default()
            .with_program("/usr/local/bin/irsend")
            .with_remote("LEGO_Combo_PWM");
        let tx = IrSendTransmitter::from_config(&config);
        assert_eq!(tx.program(), "/usr/local/bin/irsend");
        assert_eq!(tx.remote(), "LEGO_Combo_PWM");
    }

    #[test]
    fn send_outside_runtime_reports_spawn_error() {
        let tx = IrSendTransmitter::default();
        let mut delivery = tx.send(encode_stop(Channel::OneB));
        assert!(matches!(
            delivery.try_result(),
            Some(Err(TransmitError::Spawn(_)))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_process_resolves_ok() {
        let tx = IrSendTransmitter::new("true", DEFAULT_REMOTE);
        let delivery = tx.send(encode_stop(Channel::OneB));
        assert_eq!(delivery.wait().await, Ok(()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_process_reports_exit_code() {
        let tx = IrSendTransmitter::new("false", DEFAULT_REMOTE);
        let delivery = tx.send(encode_stop(Channel::OneB));
        assert!(matches!(
            delivery.wait().await,
            Err(TransmitError::Exit { code: Some(1), .. })
        ));
    }

    #[tokio::test]
    async fn missing_program_reports_spawn_error() {
        let tx = IrSendTransmitter::new("/nonexistent/ir-trainz-irsend", DEFAULT_REMOTE);
        let delivery = tx.send(encode_stop(Channel::OneB));
        assert!(matches!(
            delivery.wait().await,
            Err(TransmitError::Spawn(_))
        ));
    }
}
