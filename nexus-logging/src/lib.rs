//! Tracing subscriber setup shared by the nexus-publisher binaries.
//!
//! Everything is driven by environment variables so that the same binary can
//! log human-readable output on a terminal and JSON inside a container:
//!
//! | Variable        | Values                                  | Default                     |
//! |-----------------|-----------------------------------------|-----------------------------|
//! | `LOG_LEVEL`     | any `EnvFilter` directive               | `info`                      |
//! | `LOG_FORMAT`    | `human`, `json`                         | `human`                     |
//! | `LOG_OUTPUT`    | `console`, `file`, `both`, `none`       | `console`                   |
//! | `LOG_FILE_PATH` | path of the rolling log file            | `/tmp/nexus-publisher.log`  |
//!
//! `RUST_LOG`, when set, takes precedence over `LOG_LEVEL`.

use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::MakeWriter, prelude::*, registry, EnvFilter};

/// Targets that are too chatty at `info` and below.
const QUIET_TARGETS: &str = "tokio=warn,hyper=warn,hyper_util=warn,reqwest=warn";

const DEFAULT_LOG_FILE: &str = "/tmp/nexus-publisher.log";

// --- Custom "Tee" Writer ---
struct Tee<A, B> {
    a: A,
    b: B,
}

impl<A, B> Write for Tee<A, B>
where
    A: Write,
    B: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let res_a = self.a.write(buf);
        let res_b = self.b.write(buf);
        res_a.or(res_b)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.a.flush()?;
        self.b.flush()
    }
}

#[derive(Clone)]
struct MakeTee<A, B> {
    make_a: A,
    make_b: B,
}

impl<'a, A, B, W1, W2> MakeWriter<'a> for MakeTee<A, B>
where
    A: MakeWriter<'a, Writer = W1>,
    B: MakeWriter<'a, Writer = W2>,
    W1: Write + 'a,
    W2: Write + 'a,
{
    type Writer = Tee<W1, W2>;
    fn make_writer(&'a self) -> Self::Writer {
        Tee {
            a: self.make_a.make_writer(),
            b: self.make_b.make_writer(),
        }
    }
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    None,
}

impl LogOutput {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => LogOutput::File,
            "both" => LogOutput::Both,
            "none" | "off" => LogOutput::None,
            _ => LogOutput::Console,
        }
    }
}

/// Line format of the `fmt` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Human
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Full `EnvFilter` directive string, quiet targets included.
    pub directives: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub file_path: PathBuf,
}

impl LogSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let level = non_empty("RUST_LOG")
            .or_else(|| non_empty("LOG_LEVEL"))
            .unwrap_or_else(|| "info".to_string());

        LogSettings {
            directives: format!("{QUIET_TARGETS},{}", level.trim()),
            format: non_empty("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(LogFormat::Human),
            output: non_empty("LOG_OUTPUT")
                .map(|v| LogOutput::parse(&v))
                .unwrap_or(LogOutput::Console),
            file_path: non_empty("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

/// Initializes the global tracing subscriber based on environment variables.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_subscriber() -> Option<WorkerGuard> {
    init_with(&LogSettings::from_env())
}

/// Initializes the global tracing subscriber from explicit settings.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init_with(settings: &LogSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::new(&settings.directives);

    match settings.output {
        LogOutput::Console => {
            install(filter, io::stdout, settings.format);
            None
        }
        LogOutput::File => {
            let (writer, guard) = file_writer(&settings.file_path);
            install(filter, writer, settings.format);
            Some(guard)
        }
        LogOutput::Both => {
            let (writer, guard) = file_writer(&settings.file_path);
            let tee = MakeTee {
                make_a: io::stdout,
                make_b: writer,
            };
            install(filter, tee, settings.format);
            Some(guard)
        }
        LogOutput::None => {
            let _ = registry().with(filter).try_init();
            None
        }
    }
}

fn file_writer(path: &Path) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let log_dir = path.parent().unwrap_or_else(|| Path::new("/tmp"));
    let log_filename = path
        .file_name()
        .unwrap_or_else(|| "nexus-publisher.log".as_ref());
    let file_appender = tracing_appender::rolling::daily(log_dir, log_filename);
    tracing_appender::non_blocking(file_appender)
}

fn install<W>(filter: EnvFilter, writer: W, format: LogFormat)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let subscriber = registry().with(filter);
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(writer);

    let result = match format {
        LogFormat::Json => subscriber.with(fmt_layer.json()).try_init(),
        LogFormat::Human => subscriber.with(fmt_layer.pretty()).try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> LogSettings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let s = settings(&[]);
        assert_eq!(s.format, LogFormat::Human);
        assert_eq!(s.output, LogOutput::Console);
        assert_eq!(s.file_path, PathBuf::from(DEFAULT_LOG_FILE));
        assert!(s.directives.ends_with(",info"));
        assert!(s.directives.starts_with(QUIET_TARGETS));
    }

    #[test]
    fn rust_log_wins_over_log_level() {
        let s = settings(&[("LOG_LEVEL", "debug"), ("RUST_LOG", "nexus_publisher=trace")]);
        assert!(s.directives.ends_with(",nexus_publisher=trace"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let s = settings(&[("LOG_LEVEL", "  "), ("LOG_OUTPUT", "")]);
        assert!(s.directives.ends_with(",info"));
        assert_eq!(s.output, LogOutput::Console);
    }

    #[test]
    fn parses_format_and_output() {
        let s = settings(&[
            ("LOG_FORMAT", "JSON"),
            ("LOG_OUTPUT", "both"),
            ("LOG_FILE_PATH", "/var/log/np.log"),
        ]);
        assert_eq!(s.format, LogFormat::Json);
        assert_eq!(s.output, LogOutput::Both);
        assert_eq!(s.file_path, PathBuf::from("/var/log/np.log"));

        assert_eq!(LogOutput::parse("off"), LogOutput::None);
        assert_eq!(LogOutput::parse("file"), LogOutput::File);
        assert_eq!(LogOutput::parse("whatever"), LogOutput::Console);
    }
}
