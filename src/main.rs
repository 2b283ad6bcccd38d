//! `syslog-tap`: read length-prefixed frames from stdin and write them to
//! syslog, or to stdout as text.
//!
//! This binary owns the process lifecycle. Outputs report how their run loop
//! ended and the exit status is derived here: a terminate signal exits `0`, a
//! failed transport reopen prints a message to stderr and exits `1`, and any
//! other failure exits `1`.

use std::{
    io::{self, Read},
    path::PathBuf,
    process,
    thread,
};

use clap::{Parser, ValueEnum};
use syslog_tap::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_TAG, FrameSender, JsonFormatter, LogTransport, Output,
    OutputConfig, OutputError, QuietFormatter, SelectedOutput, SharedFormatter, Sink, Supervisor,
    SyslogConfig, WriterTransport, read_frame, signals,
};
use tracing::{error, info, level_filters::LevelFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputKind {
    Syslog,
    Stdout,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatKind {
    Quiet,
    Json,
}

impl FormatKind {
    fn formatter(self) -> SharedFormatter {
        match self {
            FormatKind::Quiet => SharedFormatter::new(QuietFormatter),
            FormatKind::Json => SharedFormatter::new(JsonFormatter),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "syslog-tap", version, about = "Write captured events to syslog")]
struct Cli {
    /// Destination for formatted events.
    #[arg(long, value_enum, default_value_t = OutputKind::Syslog)]
    output: OutputKind,
    /// Text format applied to each event.
    #[arg(long, value_enum, default_value_t = FormatKind::Quiet)]
    format: FormatKind,
    /// Frames buffered per queue before producers block.
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    capacity: usize,
    /// Syslog socket path; may be repeated. Defaults to the usual locations.
    #[arg(long = "socket")]
    sockets: Vec<PathBuf>,
    /// Tag attached to every syslog record.
    #[arg(long, default_value = DEFAULT_TAG)]
    tag: String,
    /// Increase diagnostic output on stderr.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn output_config(&self) -> OutputConfig {
        let mut syslog = SyslogConfig {
            tag: self.tag.clone(),
            ..SyslogConfig::default()
        };
        if !self.sockets.is_empty() {
            syslog.sockets = self.sockets.clone();
        }
        OutputConfig {
            capacity: self.capacity,
            syslog,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

/// Feed frames from `input` until end of stream, then close the queue.
fn pump<R: Read>(mut input: R, sender: FrameSender) {
    loop {
        match read_frame(&mut input) {
            Ok(Some(frame)) => {
                if sender.send(frame).is_err() {
                    info!("output queue closed; stop reading input");
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                error!("failed reading frame from input: {err}");
                break;
            }
        }
    }
    sender.close();
}

fn run(cli: &Cli) -> Result<(), OutputError> {
    let config = cli.output_config();
    config.validate()?;
    let formatter = cli.format.formatter();

    // Signal handlers are only installed for syslog output; stdout output
    // keeps the default signal dispositions.
    let mut os_signals = None;
    let mut output = match cli.output {
        OutputKind::Syslog => {
            let (listener, sources) = signals::install().map_err(OutputError::Spawn)?;
            os_signals = Some(listener);
            SelectedOutput::Syslog(Supervisor::syslog(formatter, sources, &config)?)
        }
        OutputKind::Stdout => {
            let opener = || -> io::Result<Box<dyn LogTransport>> {
                Ok(Box::new(WriterTransport::new(io::stdout())))
            };
            SelectedOutput::Stream(Sink::open(formatter, &opener, config.capacity)?)
        }
    };

    let sender = output.channel();
    thread::Builder::new()
        .name("stdin-reader".to_owned())
        .spawn(move || pump(io::stdin().lock(), sender))
        .map_err(OutputError::Spawn)?;

    let outcome = output.run();
    drop(os_signals);
    outcome
}

fn exit_code(err: &OutputError) -> i32 {
    match err {
        OutputError::Terminated => info!("terminated by signal"),
        OutputError::TransportOpen(cause) => {
            eprintln!("dnstap: Error: Syslog open failed {cause}");
        }
        other => error!("{other}"),
    }
    err.exit_code()
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let code = match run(&cli) {
        Ok(()) => 0,
        Err(err) => exit_code(&err),
    };
    process::exit(code);
}
