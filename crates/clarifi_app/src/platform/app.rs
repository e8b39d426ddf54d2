use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clarifi_core::{update, AppState, InputMode, InputProblem, Msg};
use clarifi_engine::EngineHandle;
use engine_logging::{engine_info, engine_warn};

use crate::command::{media_type_for, parse_command, Command, HELP};
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::render::Renderer;

const TICK: Duration = Duration::from_millis(75);

/// Line-level input from the reader thread.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UserInput {
    Command(Command),
    Pasted(String),
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let engine = EngineHandle::new(config.endpoints.clone()).context("starting engine")?;
    engine_info!(
        "Engine started; analysis={} question={}",
        config.endpoints.analysis_url,
        config.endpoints.question_url
    );

    let (input_tx, input_rx) = mpsc::channel();
    thread::spawn(move || read_input(io::stdin().lock(), input_tx));

    let mut app = App::new(AppState::with_rules(config.rules), EffectRunner::new(engine));
    println!("{HELP}");
    app.dispatch(Msg::UserChanged(config.user));
    app.flush();

    let mut deferred: VecDeque<UserInput> = VecDeque::new();
    let mut input_open = true;
    loop {
        while let Some(msg) = app.runner.poll() {
            app.dispatch(msg);
        }

        if app.release_deferred(&mut deferred) == Flow::Quit {
            return Ok(());
        }

        if input_open {
            match input_rx.recv_timeout(TICK) {
                Ok(input) => {
                    let interrupts = match &input {
                        UserInput::Command(command) => command.interrupts(),
                        UserInput::Pasted(_) => false,
                        UserInput::Invalid(_) => true,
                    };
                    if app.busy() && !interrupts {
                        engine_info!("Deferring input until the current request finishes");
                        deferred.push_back(input);
                    } else if app.handle(input) == Flow::Quit {
                        app.flush();
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Timeout) => app.dispatch(Msg::Tick),
                Err(RecvTimeoutError::Disconnected) => {
                    engine_info!("Input closed");
                    input_open = false;
                }
            }
        } else {
            if !app.busy() && deferred.is_empty() {
                app.flush();
                return Ok(());
            }
            let msg = app.runner.wait(TICK).unwrap_or(Msg::Tick);
            app.dispatch(msg);
        }

        app.flush();
    }
}

struct App {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
}

impl App {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            renderer: Renderer::new(),
        }
    }

    fn busy(&self) -> bool {
        self.state.phase().is_in_flight()
    }

    /// Handles inputs held back while a request was outstanding, stopping
    /// early if a new request starts. Output is flushed before quitting.
    fn release_deferred(&mut self, deferred: &mut VecDeque<UserInput>) -> Flow {
        while !self.busy() {
            let Some(input) = deferred.pop_front() else {
                break;
            };
            if self.handle(input) == Flow::Quit {
                self.flush();
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// Runs `msg` through `update`, feeding back any messages produced by
    /// effects that complete synchronously.
    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            queue.extend(self.runner.run(effects));
        }
    }

    fn flush(&mut self) {
        if self.state.consume_dirty() {
            for line in self.renderer.render(&self.state.view()) {
                println!("{line}");
            }
        }
    }

    fn handle(&mut self, input: UserInput) -> Flow {
        match input {
            UserInput::Command(command) => return self.handle_command(command),
            UserInput::Pasted(text) => {
                self.dispatch(Msg::InputModeChanged(InputMode::Text));
                self.dispatch(Msg::TextChanged(text));
            }
            UserInput::Invalid(message) => println!("{message}"),
        }
        Flow::Continue
    }

    fn handle_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Login(name) => self.dispatch(Msg::UserChanged(Some(name))),
            Command::Logout => self.dispatch(Msg::UserChanged(None)),
            // Paste bodies are collected by the reader and arrive as `Pasted`.
            Command::Paste => {}
            Command::Open(path) => match load_file(&path) {
                Ok(msg) => self.dispatch(msg),
                Err(err) => {
                    engine_warn!("Could not read {:?}: {}", path, err);
                    println!("Could not read {}: {err}", path.display());
                }
            },
            Command::Mode(mode) => self.dispatch(Msg::InputModeChanged(mode)),
            Command::Analyze => self.dispatch(Msg::SubmitClicked),
            Command::Ask(question) => {
                self.dispatch(Msg::QuestionChanged(question));
                self.dispatch(Msg::AskClicked);
            }
            Command::Save(path) => self.dispatch(Msg::ExportClicked { path }),
            Command::Copy => match self.state.session().raw_report() {
                Some(raw) => println!("{raw}"),
                None => println!("{}", InputProblem::NoReport),
            },
            Command::New => self.dispatch(Msg::ResetClicked),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }
}

fn load_file(path: &Path) -> io::Result<Msg> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Msg::FileSelected {
        name,
        media_type: media_type_for(path).to_string(),
        bytes: Arc::from(bytes),
    })
}

/// Parses lines from `reader` until it closes or the receiver goes away.
/// `:paste` switches to collecting raw lines until one holding only `.`.
fn read_input(reader: impl BufRead, tx: mpsc::Sender<UserInput>) {
    let mut paste: Option<Vec<String>> = None;
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };

        if let Some(buffer) = paste.as_mut() {
            if line.trim_end() == "." {
                let text = buffer.join("\n");
                paste = None;
                if tx.send(UserInput::Pasted(text)).is_err() {
                    return;
                }
            } else {
                buffer.push(line);
            }
            continue;
        }

        let input = match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Paste)) => {
                println!("Paste the document text; end with a line containing only '.'");
                paste = Some(Vec::new());
                continue;
            }
            Ok(Some(command)) => UserInput::Command(command),
            Err(err) => UserInput::Invalid(err.to_string()),
        };
        if tx.send(input).is_err() {
            return;
        }
    }

    // Input ended mid-paste; keep what was typed.
    if let Some(buffer) = paste {
        let _ = tx.send(UserInput::Pasted(buffer.join("\n")));
    }
}
