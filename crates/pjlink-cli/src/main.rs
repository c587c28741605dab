//! PJLink emulator binary.
//!
//! Emulates one projector or display on TCP port 4352 until interrupted.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pjlink_core::DeviceClass;
use pjlink_core::constants::{DEFAULT_BIND_ADDR, DEFAULT_MAX_LINE_LENGTH};
use pjlink_emulator::{Device, DeviceProfile, SharedDevice};
use pjlink_network::{TcpServer, TcpServerConfig};

/// PJLink class 1 projector/display emulator
#[derive(Parser, Debug)]
#[command(name = "pjlink-emulator")]
#[command(about = "Emulates a PJLink projector or display over TCP")]
#[command(version)]
pub struct Args {
    /// Emulate a lamp-less display instead of a projector
    #[arg(long)]
    pub display: bool,

    /// Address to listen on
    #[arg(short, long, default_value = DEFAULT_BIND_ADDR)]
    pub bind: SocketAddr,

    /// Device name reported by NAME (random if omitted)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Warm-up delay in seconds (0 for instant power-on)
    #[arg(long)]
    pub warmup_secs: Option<u64>,

    /// Cool-down delay in seconds (0 for instant power-off)
    #[arg(long)]
    pub cooldown_secs: Option<u64>,

    /// Protocol class reported by CLSS (1 or 2; preset default if omitted)
    #[arg(long)]
    pub class: Option<u8>,

    /// Longest accepted request line in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn profile(&self) -> DeviceProfile {
        if self.display {
            DeviceProfile::Display
        } else {
            DeviceProfile::Projector
        }
    }

    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        if self.max_line_length == 0 {
            return Err(anyhow::anyhow!("Max line length must be positive"));
        }

        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                self.log_level
            )),
        }
    }

    /// Build the emulated device from the preset plus overrides.
    ///
    /// # Errors
    /// Returns an error if `--class` is not 1 or 2.
    pub fn build_device(&self) -> Result<Device> {
        let mut builder = Device::builder(self.profile());

        if let Some(name) = &self.name {
            builder = builder.with_name(name.clone());
        }
        if let Some(secs) = self.warmup_secs {
            builder = builder.with_warmup(Duration::from_secs(secs));
        }
        if let Some(secs) = self.cooldown_secs {
            builder = builder.with_cooldown(Duration::from_secs(secs));
        }
        if let Some(class) = self.class {
            let class = DeviceClass::from_u8(class).context("Invalid --class")?;
            builder = builder.with_class(class);
        }

        Ok(builder.build())
    }

    pub fn server_config(&self) -> TcpServerConfig {
        TcpServerConfig {
            bind_addr: self.bind,
            max_line_length: self.max_line_length,
        }
    }
}

/// Initialize tracing/logging with the specified log level
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.to_lowercase())),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.validate().context("Invalid arguments")?;

    init_tracing(&args.log_level);

    let mut device = args.build_device()?;
    let snapshot = device.snapshot_at(device.created_at());
    info!(
        version = pjlink_core::VERSION,
        profile = %args.profile(),
        state = %serde_json::to_string(&snapshot).context("Failed to serialize device state")?,
        "Emulating {}",
        snapshot.name
    );

    let device = SharedDevice::new(device);
    let server = TcpServer::bind(args.server_config(), device)
        .await
        .with_context(|| format!("Failed to start server on {}", args.bind))?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Server failed")?;

    info!("Emulator stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pjlink_core::PowerState;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pjlink-emulator").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.profile(), DeviceProfile::Projector);
        assert_eq!(args.bind, "0.0.0.0:4352".parse().unwrap());
        assert_eq!(args.max_line_length, 1024);
        assert!(args.validate().is_ok());

        let device = args.build_device().unwrap();
        assert!(device.name().starts_with("Projector Emulator "));
        assert_eq!(device.warmup(), Duration::from_secs(6));
        assert_eq!(device.power(), PowerState::Off);
    }

    #[test]
    fn test_display_with_overrides() {
        let args = parse(&[
            "--display",
            "--bind",
            "127.0.0.1:14352",
            "--name",
            "Lobby",
            "--warmup-secs",
            "2",
        ]);

        let device = args.build_device().unwrap();
        assert_eq!(device.name(), "Lobby");
        assert_eq!(device.class(), DeviceClass::One);
        assert_eq!(device.warmup(), Duration::from_secs(2));
        assert!(device.cooldown().is_zero());
        assert_eq!(args.server_config().bind_addr.port(), 14352);
    }

    #[test]
    fn test_class_override() {
        let device = parse(&["--class", "1"]).build_device().unwrap();
        assert_eq!(device.class(), DeviceClass::One);

        let device = parse(&["--display", "--class", "2"]).build_device().unwrap();
        assert_eq!(device.class(), DeviceClass::Two);
    }

    #[test]
    fn test_invalid_class_rejected() {
        assert!(parse(&["--class", "3"]).build_device().is_err());
        assert!(parse(&["--class", "0"]).build_device().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let args = parse(&["--log-level", "loud"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_invalid_bind_address() {
        let result = Args::try_parse_from(["pjlink-emulator", "--bind", "not-an-address"]);
        assert!(result.is_err());
    }
}
