use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use livepoll_protocol::{ClientToServer, OptionId, ServerToClient};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Interactive terminal client for a livepoll server
#[derive(Parser)]
struct Args {
    /// Server WebSocket URL
    #[arg(long, default_value = "ws://127.0.0.1:3001/ws")]
    url: String,
    /// Display name; prompted for when omitted
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("🗳️  livepoll CLI Client");
    println!("======================");

    let player_name = match args.name {
        Some(name) => name.trim().to_string(),
        None => {
            print!("Enter your name: ");
            io::stdout().flush()?;
            let mut name = String::new();
            io::stdin().read_line(&mut name)?;
            name.trim().to_string()
        }
    };

    if player_name.is_empty() {
        println!("❌ Name cannot be empty");
        return Ok(());
    }

    println!("🔗 Connecting to {}...", args.url);
    let (ws_stream, _) = connect_async(args.url.as_str()).await?;
    println!("✅ Connected to server!");

    let (mut write, mut read) = ws_stream.split();

    let join_msg = ClientToServer::Join {
        name: player_name.clone(),
    };
    write.send(Message::Text(serde_json::to_string(&join_msg)?)).await?;
    println!("🚪 Joining as '{}'...", player_name);

    tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Ok(server_msg) = serde_json::from_str::<ServerToClient>(&text) {
                        handle_server_message(server_msg);
                    }
                }
                Ok(Message::Close(_)) => {
                    println!("🔌 Connection closed by server");
                    break;
                }
                Err(e) => {
                    println!("❌ WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    println!("\n📋 Commands available:");
    println!("  a | b | c   - Vote for an option (again to withdraw)");
    println!("  unvote      - Withdraw your vote");
    println!("  quit        - Exit");
    println!("\nType commands and press Enter:");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();

        if line == "quit" {
            break;
        }

        if let Some(msg) = parse_command(line) {
            let json = serde_json::to_string(&msg)?;
            write.send(Message::Text(json)).await?;
        } else if !line.is_empty() {
            println!("❓ Unknown command: {}", line);
        }
    }

    let _ = write.send(Message::Close(None)).await;
    println!("👋 Goodbye!");
    Ok(())
}

fn handle_server_message(msg: ServerToClient) {
    match msg {
        ServerToClient::Presence { online } => {
            println!("👥 Online ({}): {}", online.len(), online.join(", "));
        }
        ServerToClient::Counts { counts } => {
            let total = counts.total();
            println!("📊 Votes ({} total)", total);
            for option in OptionId::ALL {
                let count = counts.get(option);
                let bar = "█".repeat(count.min(40) as usize);
                println!("  {}: {:>3} {}", option, count, bar);
            }
        }
        ServerToClient::UserVote { option_id } => match option_id {
            Some(option) => println!("✅ Your vote: {}", option),
            None => println!("⬜ You have not voted"),
        },
        ServerToClient::Error { message } => {
            println!("❌ Error: {}", message);
        }
    }
}

fn parse_command(input: &str) -> Option<ClientToServer> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let first = parts.first()?;

    match first.to_lowercase().as_str() {
        "unvote" | "remove" => Some(ClientToServer::RemoveVote),
        "vote" => parse_option(parts.get(1)?).map(|option_id| ClientToServer::Vote { option_id }),
        other => parse_option(other).map(|option_id| ClientToServer::Vote { option_id }),
    }
}

fn parse_option(raw: &str) -> Option<OptionId> {
    raw.to_uppercase().parse().ok()
}
