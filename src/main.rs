//! CLI entry point for lchat.

mod cli;

use clap::Parser;
use lchat::build_info;
use lchat::chat::{executable_filter, AppendFile, PatternFile, TranscriptSource, TranscriptStream};
use lchat::config::{load_config, Config};
use lchat::error::{LchatError, SessionError};
use lchat::logging::{self, LogConfig};
use lchat::repl::{ChatSession, SessionEnd, SessionOptions};
use lchat::tui::{spawn_signal_watcher, RawModeGuard, TerminalColumns};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::os::fd::AsFd;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = cli::Args::parse();
    let config = match load_config(&args.overrides()) {
        Ok(config) => config,
        Err(err) => return fail(err.into()),
    };
    // Dropped last so the background writer flushes every event below.
    let _log_guard = match logging::init(&LogConfig {
        file: config.log_file.clone(),
        filter: None,
    }) {
        Ok(guard) => guard,
        Err(err) => return fail(err.into()),
    };
    tracing::info!(build = %build_info::startup_metadata_line(), "starting lchat");

    match run(&config) {
        Ok(end) => {
            tracing::info!(?end, "exiting");
            ExitCode::SUCCESS
        }
        Err(err) => fail(err),
    }
}

fn fail(err: LchatError) -> ExitCode {
    tracing::error!(%err, "fatal");
    eprintln!("lchat: {err}");
    ExitCode::FAILURE
}

/// Set up the terminal, run the session, and tear down.
///
/// The raw-mode guard is dropped before this returns, so the caller prints
/// errors onto a terminal that is back in its original mode.
fn run(config: &Config) -> Result<SessionEnd, LchatError> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(SessionError::NotATerminal.into());
    }
    // Unbuffered handle on fd 0: a buffered reader would hide bytes from poll.
    let mut keyboard = File::from(
        stdin
            .as_fd()
            .try_clone_to_owned()
            .map_err(SessionError::Terminal)?,
    );

    let mut transcript =
        TranscriptStream::spawn(&transcript_source(config)).map_err(SessionError::Transcript)?;

    let guard = RawModeGuard::acquire(&keyboard).map_err(SessionError::Terminal)?;
    let columns = TerminalColumns::detect();
    let killer = transcript.killer();
    spawn_signal_watcher(columns.clone(), guard.restorer(), move || {
        killer.kill();
    })
    .map_err(SessionError::Terminal)?;

    let mut session = ChatSession::new(
        session_options(config),
        columns,
        io::stdout().lock(),
        AppendFile::new(&config.in_file),
        PatternFile::new(&config.bell_file),
    );
    session.start(config.title.as_deref())?;
    let end = session.run(&mut keyboard, &mut transcript);

    drop(session);
    drop(guard);
    Ok(end?)
}

fn transcript_source(config: &Config) -> TranscriptSource {
    TranscriptSource {
        out_file: config.out_file.clone(),
        history_lines: config.history_lines,
        filter: executable_filter(&config.filter_file),
    }
}

fn session_options(config: &Config) -> SessionOptions {
    SessionOptions {
        prompt: config.prompt.clone(),
        allow_empty_submit: config.empty_lines,
        bell_enabled: config.bell,
        line_capacity: config.line_capacity,
    }
}
