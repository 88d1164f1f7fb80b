use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use livepoll_protocol::{ClientToServer, OptionId, ServerToClient};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Scripted voter: joins, casts one vote, then prints updates until closed
#[derive(Parser)]
struct Args {
    /// Display name to join with
    name: Option<String>,
    /// Option to vote for
    #[arg(long, default_value = "A")]
    option: OptionId,
    /// Server WebSocket URL
    #[arg(long, default_value = "ws://127.0.0.1:3001/ws")]
    url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let player_name = args
        .name
        .unwrap_or_else(|| format!("Voter{}", std::process::id()));

    println!("🤖 livepoll demo voter: {}", player_name);
    println!("🔗 Connecting to {}...", args.url);

    let (ws_stream, _) = connect_async(args.url.as_str()).await?;
    let (mut write, mut read) = ws_stream.split();

    let join_msg = ClientToServer::Join {
        name: player_name.clone(),
    };
    write.send(Message::Text(serde_json::to_string(&join_msg)?)).await?;

    tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
    let vote_msg = ClientToServer::Vote {
        option_id: args.option,
    };
    write.send(Message::Text(serde_json::to_string(&vote_msg)?)).await?;
    println!("🗳️  {} voted {}", player_name, args.option);

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Ok(server_msg) = serde_json::from_str::<ServerToClient>(&text) {
                    print_update(&player_name, &server_msg);
                }
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                println!("❌ [{}] WebSocket error: {}", player_name, e);
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

fn print_update(player_name: &str, msg: &ServerToClient) {
    match msg {
        ServerToClient::Presence { online } => {
            println!("[{}] online: {:?}", player_name, online);
        }
        ServerToClient::Counts { counts } => {
            println!("[{}] counts A={} B={} C={}", player_name, counts.a, counts.b, counts.c);
        }
        ServerToClient::UserVote { option_id } => {
            println!("[{}] my vote: {:?}", player_name, option_id);
        }
        ServerToClient::Error { message } => {
            println!("[{}] ❌ {}", player_name, message);
        }
    }
}
