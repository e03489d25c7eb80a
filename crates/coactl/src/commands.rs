//! Command implementations for coactl.

use crate::assistant::{classify_intent, Assistant, Conversation};
use crate::config::ClientConfig;
use crate::display;
use crate::notify::{AlertWatcher, NotificationRegistry};
use crate::stream::{EventKind, ReconnectPolicy, StreamClient, StreamEvent};
use anyhow::{bail, Context, Result};
use coa_shared::message::AssistantMessage;
use coa_shared::MetricsSnapshot;
use owo_colors::OwoColorize;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// How long `ask` waits for a live snapshot
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

fn alert_watcher(config: &ClientConfig, registry: NotificationRegistry) -> AlertWatcher {
    AlertWatcher::new(
        registry,
        config.recipients.clone(),
        config.assistant.processing.clone(),
    )
}

async fn print_raised(watcher: &mut AlertWatcher, snapshot: &MetricsSnapshot) {
    for n in watcher.observe(snapshot).await {
        println!("{}", display::notification(&n));
    }
}

/// Stream snapshots until `count` is reached or Ctrl-C
pub async fn watch(config: &ClientConfig, url: Option<String>, count: Option<usize>) -> Result<()> {
    let url = url.unwrap_or_else(|| config.server_url.clone());
    let policy = config.reconnect_policy();
    let mut watcher = alert_watcher(config, NotificationRegistry::new());

    let mut client = StreamClient::new(url.as_str());
    let (_, mut events) = client.subscribe();
    let mut received = 0usize;

    println!("{} {}", "Watching".bold(), url);
    println!("{}", display::separator());

    loop {
        client.connect();

        loop {
            let event = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    client.close();
                    client.wait_closed().await;
                    return Ok(());
                }
                event = events.recv() => event,
            };

            match event {
                Some(StreamEvent::Open) => println!("{}", "connected".green()),
                Some(StreamEvent::Data(snapshot)) => {
                    println!("{}", display::snapshot_line(&snapshot));
                    print_raised(&mut watcher, &snapshot).await;
                    received += 1;
                    if count.is_some_and(|n| received >= n) {
                        client.close();
                        client.wait_closed().await;
                        return Ok(());
                    }
                }
                Some(StreamEvent::Error(e)) => eprintln!("{} {}", "error:".red(), e),
                Some(StreamEvent::Close) => break,
                None => bail!("Event channel closed"),
            }
        }

        println!(
            "{}",
            format!("disconnected, retrying in {}s", policy.delay.as_secs()).yellow()
        );
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            _ = policy.wait() => {}
        }
    }
}

/// Connect, wait for the first valid snapshot, then close
pub async fn first_snapshot(url: &str, timeout: Duration) -> Result<MetricsSnapshot> {
    let mut client = StreamClient::new(url);
    let (_, mut events) = client.subscribe();
    client.connect();

    let wait = async {
        let mut last_error = None;
        while let Some(event) = events.recv().await {
            match event {
                StreamEvent::Data(snapshot) => return Ok(snapshot),
                StreamEvent::Error(e) => {
                    debug!("Ignoring stream error while fetching: {}", e);
                    last_error = Some(e);
                }
                StreamEvent::Close => break,
                StreamEvent::Open => {}
            }
        }
        match last_error {
            Some(e) => Err(anyhow::Error::new(e)),
            None => bail!("Stream closed before any snapshot"),
        }
    };

    let result = tokio::time::timeout(timeout, wait)
        .await
        .with_context(|| format!("No snapshot from {} within {:?}", url, timeout))?;

    client.close();
    client.wait_closed().await;
    result
}

/// Answer one question. Falls back to baseline metrics when the stream is
/// unreachable.
pub async fn ask(
    config: &ClientConfig,
    question: Vec<String>,
    url: Option<String>,
    offline: bool,
) -> Result<()> {
    let input = question.join(" ");
    if input.trim().is_empty() {
        bail!("Usage: coactl ask <question>, the question must not be blank");
    }
    let snapshot = if offline {
        MetricsSnapshot::baseline()
    } else {
        let url = url.unwrap_or_else(|| config.server_url.clone());
        match first_snapshot(&url, FETCH_TIMEOUT).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                eprintln!(
                    "{} {:#}; using baseline metrics",
                    "warning:".yellow(),
                    e
                );
                MetricsSnapshot::baseline()
            }
        }
    };

    let assistant = Assistant::new(config.assistant.clone());
    if classify_intent(&input).reads_metrics() {
        println!("{}", "thinking...".dimmed());
    }
    let body = assistant.respond(&input, &snapshot).await;
    println!("{}", display::message(&AssistantMessage::assistant(body)));
    Ok(())
}

/// Keep one stream alive for the chat session, reconnecting after each close
async fn keep_streaming(
    mut client: StreamClient,
    mut events: mpsc::UnboundedReceiver<StreamEvent>,
    policy: ReconnectPolicy,
    mut watcher: AlertWatcher,
) {
    loop {
        client.connect();
        while let Some(event) = events.recv().await {
            match event {
                StreamEvent::Data(snapshot) => {
                    for n in watcher.observe(&snapshot).await {
                        debug!("Raised notification {}", n.id);
                    }
                }
                StreamEvent::Error(e) => warn!("Stream error: {}", e),
                StreamEvent::Close => break,
                StreamEvent::Open => {}
            }
        }
        policy.wait().await;
    }
}

const CHAT_HELP: &str = "Commands:\n\
  /notifications   list notifications\n\
  /read <id>       mark a notification read\n\
  /expand <id>     show or hide a message's details\n\
  /history         reprint the conversation\n\
  /quit            leave";

/// Interactive assistant session
pub async fn chat(config: &ClientConfig, url: Option<String>, offline: bool) -> Result<()> {
    let registry = NotificationRegistry::new();
    let (snapshot_tx, snapshot_rx) = watch::channel(MetricsSnapshot::baseline());

    let streamer = if offline {
        None
    } else {
        let url = url.unwrap_or_else(|| config.server_url.clone());
        let client = StreamClient::new(url.as_str());
        client.on(EventKind::Data, move |event| {
            if let StreamEvent::Data(snapshot) = event {
                snapshot_tx.send_replace(snapshot.clone());
            }
        });
        let (_, events) = client.subscribe();
        println!("{} {}", "Streaming from".dimmed(), url);
        Some(tokio::spawn(keep_streaming(
            client,
            events,
            config.reconnect_policy(),
            alert_watcher(config, registry.clone()),
        )))
    };

    let mut conversation = Conversation::new(Assistant::new(config.assistant.clone()));
    for msg in conversation.messages() {
        println!("{}\n", display::message(msg));
    }
    println!("{}", "Type /help for commands.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&registry).await;
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(c, a)| (c, a.trim())) {
            ("/quit" | "/exit", _) => break,
            ("/help", _) => println!("{}", CHAT_HELP),
            ("/notifications", _) => {
                let log = registry.notifications().await;
                if log.is_empty() {
                    println!("{}", "no notifications".dimmed());
                }
                for n in &log {
                    println!("{}", display::notification(n));
                }
            }
            ("/read", prefix) => {
                let log = registry.notifications().await;
                match unique_prefix(log.iter().map(|n| n.id.as_str()), prefix) {
                    Some(id) => {
                        registry.mark_as_read(id).await;
                    }
                    None => println!("{}", "no unique notification with that id".yellow()),
                }
            }
            ("/expand", prefix) => {
                let id = conversation.find(prefix).map(|m| m.id.clone());
                match id.and_then(|id| conversation.toggle_expanded(&id).map(|_| id)) {
                    Some(id) => {
                        if let Some(msg) = conversation.find(&id) {
                            println!("{}", display::message(msg));
                        }
                    }
                    None => println!("{}", "no unique message with that id".yellow()),
                }
            }
            ("/history", _) => {
                for msg in conversation.messages() {
                    println!("{}\n", display::message(msg));
                }
            }
            (cmd, _) if cmd.starts_with('/') => {
                println!("{} {}", "unknown command".yellow(), cmd);
            }
            _ => {
                if classify_intent(line).reads_metrics() {
                    println!("{}", "thinking...".dimmed());
                }
                let snapshot = snapshot_rx.borrow().clone();
                if let Some(reply) = conversation.send(line, &snapshot).await {
                    println!("{}", display::message(reply));
                }
            }
        }
    }

    if let Some(task) = streamer {
        // Dropping the client inside closes the connection
        task.abort();
    }
    Ok(())
}

async fn print_prompt(registry: &NotificationRegistry) {
    use std::io::Write;

    let unread = registry.unread_count().await;
    if unread > 0 {
        print!("{} ", format!("[{} unread]", unread).yellow());
    }
    print!("{} ", ">".bold());
    let _ = std::io::stdout().flush();
}

/// The single id starting with `prefix`
fn unique_prefix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let mut matches = ids.filter(|id| id.starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

pub fn sample(json: bool) -> Result<()> {
    let snapshot = MetricsSnapshot::baseline();
    if json {
        println!("{}", snapshot.to_json()?);
    } else {
        print!("{}", display::snapshot_block(&snapshot));
    }
    Ok(())
}
