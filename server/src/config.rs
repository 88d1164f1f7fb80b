use clap::Parser;

/// livepoll presence & poll server
#[derive(Parser, Clone, Debug)]
#[command(name = "livepoll-server", version, about = "Live presence and poll server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "LIVEPOLL_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Emit structured JSON logs
    #[arg(long, env = "LIVEPOLL_JSON_LOGS")]
    pub json_logs: bool,

    /// Expose POST /api/reset, which wipes all names and votes
    #[arg(long, env = "LIVEPOLL_ALLOW_RESET")]
    pub allow_reset: bool,
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
