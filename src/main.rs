use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use voicebridge::{
    list_input_devices, AudioFile, ChatClient, ChunkStatus, Config, CpalMicrophone,
    RecordingController, SessionTransport, StopReason,
};

#[derive(Parser)]
#[command(
    name = "voicebridge",
    about = "Voice chat client that streams microphone audio to a recognition backend"
)]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/voicebridge")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat with voice recording (default)
    Run,
    /// Transcribe a WAV file through the recognition backend
    Transcribe {
        file: PathBuf,
        /// Also post the transcript to the chat room
        #[arg(long)]
        post: bool,
    },
    /// List available audio input devices
    Devices,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(cfg).await,
        Command::Transcribe { file, post } => transcribe(cfg, file, post).await,
        Command::Devices => devices(),
    }
}

async fn run(cfg: Config) -> Result<()> {
    let transport = Arc::new(SessionTransport::new(&cfg.backend.base_url)?);
    let chat = Arc::new(ChatClient::new(&cfg.chat)?);

    let (events_tx, mut events_rx) = mpsc::channel(16);
    let source = Box::new(CpalMicrophone::new(cfg.audio.device.clone()));
    let mut controller =
        RecordingController::new(source, Arc::clone(&transport), Arc::clone(&chat), events_tx);

    match chat.fetch_messages().await {
        Ok(messages) => {
            for message in &messages {
                println!("[{}] {}", message.client_type, message.text);
            }
        }
        Err(e) => warn!("Could not load message history: {e:#}"),
    }

    println!("/rec toggles recording, /quit exits; anything else is sent as a chat message");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match line.trim() {
                    "" => {}
                    "/rec" => {
                        if let Err(e) = controller.toggle().await {
                            error!("{e:#}");
                        } else if controller.is_recording() {
                            println!("(recording... /rec to stop)");
                        }
                    }
                    "/quit" => break,
                    text => match chat.post_message(text).await {
                        Ok(Some(reply)) => println!("< {reply}"),
                        Ok(None) => {}
                        Err(e) => error!("Failed to send message: {e:#}"),
                    },
                }
            }
            Some(event) = events_rx.recv() => {
                println!("> {}", event.text);
                if let Some(reply) = controller.handle_transcript(event).await {
                    println!("< {reply}");
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    controller.stop(StopReason::Shutdown).await;
    Ok(())
}

async fn transcribe(cfg: Config, file: PathBuf, post: bool) -> Result<()> {
    let audio = AudioFile::open(&file)?;

    let transport = SessionTransport::new(&cfg.backend.base_url)?;
    let mut session = transport.open_session().await?;

    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let status = transport
        .upload_file(&mut session, audio.file_name(), bytes)
        .await?;

    match status {
        ChunkStatus::Finished { text: Some(text) } if !text.is_empty() => {
            println!("{text}");
            if post {
                let chat = ChatClient::new(&cfg.chat)?;
                if let Some(reply) = chat.post_message(&text).await? {
                    println!("< {reply}");
                }
            }
        }
        other => warn!(?other, "Backend did not return a transcript"),
    }

    Ok(())
}

fn devices() -> Result<()> {
    let devices = list_input_devices()?;
    if devices.is_empty() {
        println!("No audio input devices found");
    } else {
        for name in devices {
            println!("{name}");
        }
    }
    Ok(())
}

/// Resolves when the process is asked to go away. Interrupt, terminate,
/// and hangup all run the same recording cleanup as an explicit stop.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate()).ok();
        let mut hangup = signal(SignalKind::hangup()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = recv_or_pending(&mut terminate) => {}
            _ = recv_or_pending(&mut hangup) => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(unix)]
async fn recv_or_pending(sig: &mut Option<tokio::signal::unix::Signal>) {
    match sig {
        Some(sig) => {
            sig.recv().await;
        }
        None => std::future::pending().await,
    }
}
