//! Simple IRC client example
//!
//! Connects, joins a channel after welcome and answers a couple of
//! commands. Server, nick and channel come from the command line:
//!
//!   cargo run --example simple_client -- irc.libera.chat mybot "#test"
//!
//! Set `RUST_LOG=slirc_client=trace` to see every line on the wire.

use slirc_client::{default_flow, Client, ClientConfig, Event, Flow, Session};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn on_event(session: &mut Session, event: &Event) -> Flow {
    match event {
        Event::Connected => info!("registered as {}", session.nick()),
        Event::ChannelJoined { channel } => {
            info!("joined {}", channel);
            session.send_message(channel, "hello from slirc-client");
        }
        Event::Privmsg(msg) => match msg.message.trim() {
            "!users" => {
                let users: Vec<String> = session.channel_users(&msg.reply_to).into_iter().collect();
                session.reply(event, &users.join(" "));
            }
            "!topic" => {
                let topic = session.channel_topic(&msg.reply_to).to_owned();
                session.reply(event, &topic);
            }
            "!bans" => {
                let channel = msg.reply_to.clone();
                session.request_ban_list(&msg.reply_to, move |bans| {
                    info!("{} has {} bans", channel, bans.len());
                });
            }
            "!quit" => session.quit("bye"),
            _ => {}
        },
        Event::ModeChanged { target, modes, .. } => {
            for op in modes {
                info!("{} {}", target, op);
            }
        }
        _ => {}
    }
    default_flow(event)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1);
    let server = args.next().unwrap_or_else(|| "irc.libera.chat".to_string());
    let nick = args.next().unwrap_or_else(|| "slirc_example".to_string());
    let channel = args.next().unwrap_or_else(|| "#slirc-test".to_string());

    let config = ClientConfig::new(server, nick).with_channel(channel);
    let client = match Client::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!("bad configuration: {}", e);
            return;
        }
    };

    if let Err(e) = client.run(on_event).await {
        error!("client stopped: {}", e);
    }
}
