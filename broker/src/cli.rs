//! CLI definition for the broker binary

use clap::Parser;

/// Long-poll command broker
#[derive(Debug, Parser)]
#[command(name = "timebroker", about = "Long-poll command broker for poll-only clients", version)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 7777)]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        let cli = Cli::parse_from(["timebroker"]);
        assert_eq!(cli.port, 7777);
    }

    #[test]
    fn test_port_override() {
        let cli = Cli::parse_from(["timebroker", "--port", "8080"]);
        assert_eq!(cli.port, 8080);
    }
}
