// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

/// Default destination when the caller names none
pub const DEFAULT_OUTPUT: &str = "video.mp4";

/// Default directory for intermediate artifacts
pub const DEFAULT_WORKING_DIR: &str = "/tmp";

/// Media input for one invocation - a single file or an ordered list of files
#[derive(Debug, Clone, PartialEq)]
pub enum MediaInput {
    Single(String),
    Many(Vec<String>),
}

impl MediaInput {
    /// All input paths in order
    pub fn paths(&self) -> &[String] {
        match self {
            MediaInput::Single(path) => std::slice::from_ref(path),
            MediaInput::Many(paths) => paths,
        }
    }

    /// First input path, if any
    pub fn primary(&self) -> Option<&str> {
        self.paths().first().map(String::as_str)
    }
}

impl From<&str> for MediaInput {
    fn from(path: &str) -> Self {
        MediaInput::Single(path.to_string())
    }
}

impl From<String> for MediaInput {
    fn from(path: String) -> Self {
        MediaInput::Single(path)
    }
}

impl From<Vec<String>> for MediaInput {
    fn from(paths: Vec<String>) -> Self {
        MediaInput::Many(paths)
    }
}

/// Session context - built once per invocation and not mutated afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    input: MediaInput,
    output: String,
    working_dir: PathBuf,
    debug: bool,
}

impl Session {
    /// Create a session with the default output and working directory
    pub fn new(input: impl Into<MediaInput>) -> Self {
        Self {
            input: input.into(),
            output: DEFAULT_OUTPUT.to_string(),
            working_dir: PathBuf::from(DEFAULT_WORKING_DIR),
            debug: false,
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn input(&self) -> &MediaInput {
        &self.input
    }

    /// First input path, or an empty string when the session has no input
    pub fn input_path(&self) -> &str {
        self.input.primary().unwrap_or("")
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

/// An external command line: program plus argument vector.
///
/// Executed without a shell. The `Display` form is the POSIX-quoted
/// string shown in dry-run mode and in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an argument only when `condition` holds
    pub fn arg_if(self, condition: bool, arg: impl Into<String>) -> Self {
        if condition {
            self.arg(arg)
        } else {
            self
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Build a `std::process::Command` for this line
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Quote a word for a POSIX shell, leaving safe words untouched
pub fn shell_quote(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }
    if word.bytes().all(|b| {
        matches!(b,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' |
            b'_' | b'-' | b'.' | b'/' | b':' | b'@' | b'%' | b'+' | b'=' | b',')
    }) {
        return word.to_string();
    }
    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('\'');
    for ch in word.chars() {
        if ch == '\'' {
            quoted.push_str("'\"'\"'");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Total seconds reported by a media-inspection tool.
///
/// Colon-form durations are whole seconds; `<float> s` forms keep their fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationSeconds {
    Whole(u64),
    Fractional(f64),
}

impl DurationSeconds {
    pub fn as_secs_f64(&self) -> f64 {
        match *self {
            DurationSeconds::Whole(secs) => secs as f64,
            DurationSeconds::Fractional(secs) => secs,
        }
    }
}

impl fmt::Display for DurationSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationSeconds::Whole(secs) => write!(f, "{}", secs),
            DurationSeconds::Fractional(secs) => write!(f, "{}", secs),
        }
    }
}

/// Program names of the external collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    /// Media transcoder and filter tool
    pub transcoder: String,
    /// Older flag-compatible transcoder, used by trim and grab_image
    pub legacy_transcoder: String,
    /// Stream prober
    pub prober: String,
    /// Media metadata reader
    pub metadata_reader: String,
    /// Full-screen video player
    pub player: String,
    /// Lightweight preview player
    pub previewer: String,
    /// Screen recorder writing an animated GIF, used by screencast
    pub recorder: String,
    /// Video-hosting downloader
    pub downloader: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            transcoder: "ffmpeg".to_string(),
            legacy_transcoder: "avconv".to_string(),
            prober: "ffprobe".to_string(),
            metadata_reader: "exiftool".to_string(),
            player: "mplayer".to_string(),
            previewer: "ffplay".to_string(),
            recorder: "byzanz-record".to_string(),
            downloader: "youtube-dl".to_string(),
        }
    }
}

/// Result of running one operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Dry-run: the command that would have been executed
    DryRun(String),
    /// The command ran and exited successfully
    Completed { command: String },
    /// Duration reported by the metadata reader
    Duration(DurationSeconds),
    /// Raw report text from the stream prober
    Report(String),
}
