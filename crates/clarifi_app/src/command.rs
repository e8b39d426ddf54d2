use std::path::{Path, PathBuf};

use clarifi_core::{InputMode, PDF_MEDIA_TYPE};

pub const HELP: &str = "\
Commands:
  :login <name>     sign in (required before analyzing)
  :logout           sign out
  :paste            paste document text; finish with a line containing only '.'
  :open <path>      choose a PDF file to analyze
  :mode text|pdf    switch between pasted text and the chosen file
  :analyze          analyze the current input
  :ask <question>   ask about the analyzed document (plain lines work too)
  :save [path]      save the report (default legal-document-analysis.txt)
  :copy             print the report exactly as the service returned it
  :new              discard this document and start over
  :help             show this help
  :quit             exit";

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(String),
    Logout,
    Paste,
    Open(PathBuf),
    Mode(InputMode),
    Analyze,
    Ask(String),
    Save(Option<PathBuf>),
    Copy,
    New,
    Help,
    Quit,
}

impl Command {
    /// Commands that must run even while a request is outstanding.
    pub fn interrupts(&self) -> bool {
        matches!(self, Command::New | Command::Open(_) | Command::Quit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command :{0} (try :help)")]
    Unknown(String),
    #[error(":{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("unknown mode {0:?}; use text or pdf")]
    InvalidMode(String),
}

pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Some(Command::Ask(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let required = |label: &'static str| {
        if arg.is_empty() {
            Err(CommandError::MissingArgument(label))
        } else {
            Ok(arg.to_string())
        }
    };

    let command = match name {
        "login" => Command::Login(required("login")?),
        "logout" => Command::Logout,
        "paste" => Command::Paste,
        "open" => Command::Open(PathBuf::from(required("open")?)),
        "mode" => match arg {
            "text" => Command::Mode(InputMode::Text),
            "pdf" | "upload" => Command::Mode(InputMode::Upload),
            other => return Err(CommandError::InvalidMode(other.to_string())),
        },
        "analyze" => Command::Analyze,
        "ask" => Command::Ask(required("ask")?),
        "save" => Command::Save((!arg.is_empty()).then(|| PathBuf::from(arg))),
        "copy" => Command::Copy,
        "new" => Command::New,
        "help" => Command::Help,
        "quit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Declared media type of a file, from its extension.
pub fn media_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("txt") => "text/plain",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("rtf") => "application/rtf",
        _ => "application/octet-stream",
    }
}
