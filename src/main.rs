// MRZ scanner command line
// Replays OCR text through the scanner or a full scan session

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info};
use mrzscan::{
    models::ScannerConfig, Admission, ErrorKind, Frame, FrameOutcome, MrzScanner,
    PassthroughRecognizer, ResultListener, ScanError, ScanSession, ValidatedMrz,
};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Extract a validated MRZ from OCR text
#[derive(Parser)]
#[command(name = "mrzscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one OCR snapshot from a file or stdin
    Parse {
        /// Text file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Replay recorded OCR frames through a scan session
    Stream {
        /// Text file holding one frame after another
        file: PathBuf,

        /// Line that separates frames
        #[arg(long, default_value = "---")]
        delimiter: String,

        /// Pause between submitted frames
        #[arg(long, default_value_t = 50)]
        frame_interval_ms: u64,
    },

    /// Validate a typed DOCUMENTNUMBER,YYMMDD,YYMMDD entry
    Manual { entry: String },
}

enum SessionEvent {
    Success(ValidatedMrz),
    Error(ErrorKind, String),
}

struct ChannelListener(mpsc::UnboundedSender<SessionEvent>);

impl ResultListener for ChannelListener {
    fn on_success(&self, mrz: ValidatedMrz) {
        let _ = self.0.send(SessionEvent::Success(mrz));
    }

    fn on_error(&self, kind: ErrorKind, message: String) {
        let _ = self.0.send(SessionEvent::Error(kind, message));
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// `Ok(false)` means the input held no acceptable MRZ.
async fn run(cli: Cli) -> Result<bool, ScanError> {
    let config = ScannerConfig::load(cli.config.as_deref())?;
    debug!("Using config {:?}", config);
    let scanner = MrzScanner::new(config.rules());

    match cli.command {
        Commands::Parse { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut raw = String::new();
                    std::io::stdin().read_to_string(&mut raw)?;
                    raw
                }
            };
            parse(&scanner, &raw)
        }
        Commands::Stream {
            file,
            delimiter,
            frame_interval_ms,
        } => {
            let raw = std::fs::read_to_string(file)?;
            let frames = split_frames(&raw, &delimiter);
            stream(
                scanner,
                config.commit_delay(),
                frames,
                Duration::from_millis(frame_interval_ms),
            )
            .await
        }
        Commands::Manual { entry } => {
            let mrz = scanner.manual_entry(&entry)?;
            print_result(&mrz)?;
            Ok(true)
        }
    }
}

fn parse(scanner: &MrzScanner, raw: &str) -> Result<bool, ScanError> {
    match scanner.process(raw) {
        FrameOutcome::Accepted(mrz) => {
            print_result(&mrz)?;
            Ok(true)
        }
        FrameOutcome::NoFormat => {
            println!("No MRZ found");
            Ok(false)
        }
        FrameOutcome::NoMatch => {
            println!("MRZ marker found but no line matched");
            Ok(false)
        }
        FrameOutcome::Rejected(format, rejection) => {
            println!("{} MRZ rejected: {}", format, rejection);
            Ok(false)
        }
        FrameOutcome::Fault(message) => Err(ScanError::Extraction(message)),
    }
}

async fn stream(
    scanner: MrzScanner,
    commit_delay: Duration,
    frames: Vec<String>,
    interval: Duration,
) -> Result<bool, ScanError> {
    let (tx, mut events) = mpsc::unbounded_channel();
    let session = ScanSession::new(
        PassthroughRecognizer,
        scanner,
        Arc::new(ChannelListener(tx)),
        commit_delay,
    )?;

    info!("Replaying {} frame(s)", frames.len());
    let mut submitted = 0;
    for (index, frame) in frames.iter().enumerate() {
        match session.submit(Frame::from_text(frame)) {
            Admission::Accepted => submitted += 1,
            Admission::Throttled => debug!("Frame {} dropped, recognizer busy", index),
            Admission::Closed => break,
        }
        tokio::time::sleep(interval).await;
    }
    info!("Submitted {} of {} frame(s)", submitted, frames.len());

    // Let the last frame finish and any committed result wait out its delay
    let grace = commit_delay + interval + Duration::from_millis(500);
    let event = tokio::time::timeout(grace, events.recv()).await.ok().flatten();
    session.stop();

    match event {
        Some(SessionEvent::Success(mrz)) => {
            print_result(&mrz)?;
            Ok(true)
        }
        Some(SessionEvent::Error(kind, message)) => {
            Err(ScanError::Runtime(format!("session failed ({:?}): {}", kind, message)))
        }
        None => {
            println!("No MRZ found in {} frame(s)", frames.len());
            Ok(false)
        }
    }
}

fn split_frames(raw: &str, delimiter: &str) -> Vec<String> {
    let mut frames = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if line.trim() == delimiter {
            frames.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    frames.push(current.join("\n"));

    frames.retain(|frame| !frame.trim().is_empty());
    frames
}

fn print_result(mrz: &ValidatedMrz) -> Result<(), ScanError> {
    let json = serde_json::to_string_pretty(mrz)
        .map_err(|e| ScanError::Runtime(format!("Failed to serialize result: {}", e)))?;
    println!("{}", json);
    Ok(())
}
