//! CLI definition for the agent binary

use clap::Parser;

/// Polling time-reporting client
#[derive(Debug, Parser)]
#[command(name = "timebroker-agent", about = "Polling client that reports its system time", version)]
pub struct Cli {
    /// Broker host
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Broker port
    #[arg(long, default_value_t = 7777)]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["timebroker-agent"]);
        assert_eq!(cli.host, "localhost");
        assert_eq!(cli.port, 7777);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from(["timebroker-agent", "--host", "broker.local", "--port", "9000"]);
        assert_eq!(cli.host, "broker.local");
        assert_eq!(cli.port, 9000);
    }
}
