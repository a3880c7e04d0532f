//! Server configuration, loaded from environment variables.

use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Address to listen on.
    pub listen_addr: SocketAddr,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            listen_addr: "0.0.0.0:3000".parse().unwrap(),
        }
    }
}

impl SignalConfig {
    /// Loads configuration from the environment. Unset or unparseable values
    /// fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("SIGNAL_LISTEN_ADDR") {
            if let Ok(parsed) = addr.parse() {
                config.listen_addr = parsed;
            }
        }

        config
    }
}
