use clap::{Parser, Subcommand};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3001;
const BOT_OPTIONS: [&str; 3] = ["A", "B", "C"];

#[derive(Parser)]
#[command(name = "livepoll-combined")]
#[command(about = "livepoll - Combined server and client launcher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server, some voting bots and an interactive client
    Both {
        /// Number of demo bots to start
        #[arg(short, long, default_value = "2")]
        bots: u32,
        /// Port for the server
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Run only the server
    Server {
        /// Port for the server
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Run only the interactive client
    Client {
        /// Port the server listens on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Both { bots, port } => {
            run_both(bots, port);
        }
        Commands::Server { port } => {
            run_server(port);
        }
        Commands::Client { port } => {
            run_client(port);
        }
    }
}

fn ws_url(port: u16) -> String {
    format!("ws://127.0.0.1:{port}/ws")
}

fn run_both(bots: u32, port: u16) {
    println!("🚀 Starting livepoll server + {} bots on port {}", bots, port);

    let server_handle = thread::spawn(move || {
        run_server(port);
    });

    // Wait a moment for server to start
    thread::sleep(Duration::from_millis(1500));

    let mut bot_handles = Vec::new();
    for i in 1..=bots {
        println!("🤖 Starting bot {}...", i);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300 * i as u64)); // Stagger bot starts
            run_bot(i, port);
        });
        bot_handles.push(handle);
    }

    println!("✅ Server and bots started. Press Ctrl+C to stop.");
    run_client(port);

    for handle in bot_handles {
        let _ = handle.join();
    }
    let _ = server_handle.join();
}

fn run_server(port: u16) {
    run_cargo(&["run", "-p", "livepoll-server", "--"], &[("PORT", port.to_string())], "Server");
}

fn run_client(port: u16) {
    let url = ws_url(port);
    run_cargo(&["run", "--bin", "cli_client", "--", "--url", url.as_str()], &[], "Client");
}

fn run_bot(index: u32, port: u16) {
    let url = ws_url(port);
    let name = format!("Bot{index}");
    let option = BOT_OPTIONS[(index as usize - 1) % BOT_OPTIONS.len()];
    run_cargo(
        &["run", "--bin", "demo_cli", "--", name.as_str(), "--option", option, "--url", url.as_str()],
        &[],
        "Bot",
    );
}

fn run_cargo(args: &[&str], envs: &[(&str, String)], what: &str) {
    let mut command = Command::new("cargo");
    command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    for (key, value) in envs {
        command.env(key, value);
    }

    match command.status() {
        Ok(exit_status) => {
            if !exit_status.success() {
                eprintln!("❌ {} exited with error: {}", what, exit_status);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to start {}: {}", what.to_lowercase(), e);
            std::process::exit(1);
        }
    }
}
