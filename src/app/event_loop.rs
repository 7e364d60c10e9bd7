use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::app::input::{Command, HELP, parse_command};
use crate::app::timers::SaveStatus;
use crate::app::view::{status_label, write_active, write_tabs};
use crate::app::{Message, Model, update};
use crate::storage::KeyValueStore;

const PROMPT: &str = "twinpad> ";

/// Read `input` line by line on a background thread.
///
/// The receiver disconnects at end of input or after the first read error,
/// which is delivered as the last item.
pub fn spawn_line_reader<R>(input: R) -> Receiver<io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in input.lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// Drive the model from a line-oriented input.
///
/// See [`drive_session`]; this spawns the reader thread for `input`.
///
/// # Errors
/// Returns an error only if reading input or writing output fails.
pub fn run_session<S, R, W, C>(
    model: Model<S>,
    input: R,
    out: &mut W,
    clock: C,
) -> io::Result<Model<S>>
where
    S: KeyValueStore,
    R: BufRead + Send + 'static,
    W: Write,
    C: FnMut() -> u64,
{
    let lines = spawn_line_reader(input);
    drive_session(model, &lines, out, clock)
}

/// Drive the model from lines arriving on `lines`.
///
/// While waiting for input the loop wakes at the model's next deadline and
/// sends a [`Message::Tick`] from `clock`, so an idle edit is still
/// auto-saved and the status indicator still reverts. Every command is
/// also preceded by a tick. A disconnected channel is end of input; it and
/// `quit` both save everything via [`Message::WindowClose`].
///
/// # Errors
/// Returns an error only if reading input or writing output fails.
pub fn drive_session<S, W, C>(
    mut model: Model<S>,
    lines: &Receiver<io::Result<String>>,
    out: &mut W,
    mut clock: C,
) -> io::Result<Model<S>>
where
    S: KeyValueStore,
    W: Write,
    C: FnMut() -> u64,
{
    let mut shown = model.status();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let received = loop {
            let Some(deadline) = model.next_deadline() else {
                break lines.recv().ok();
            };
            let wait = Duration::from_millis(deadline.saturating_sub(model.now_ms()));
            match lines.recv_timeout(wait) {
                Ok(line) => break Some(line),
                Err(RecvTimeoutError::Disconnected) => break None,
                Err(RecvTimeoutError::Timeout) => {
                    model = update(model, Message::Tick(clock()));
                    if model.status().is_some_and(|status| shown != Some(status)) {
                        writeln!(out)?;
                    }
                    if report_status(out, &mut shown, model.status(), false)? {
                        write!(out, "{PROMPT}")?;
                        out.flush()?;
                    }
                }
            }
        };
        let Some(line) = received.transpose()? else {
            writeln!(out)?;
            break;
        };

        model = update(model, Message::Tick(clock()));
        report_status(out, &mut shown, model.status(), false)?;

        let command = match parse_command(&line, &model) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };
        debug!(?command, "shell command");

        match command {
            Command::Update(msg) => {
                let forced = matches!(msg, Message::SaveAll);
                model = update(model, msg);
                report_status(out, &mut shown, model.status(), forced)?;
            }
            Command::ConfirmDelete(id) => {
                let title = model
                    .store()
                    .tab(id)
                    .map(|tab| tab.title.clone())
                    .unwrap_or_default();
                write!(out, "delete \"{title}\"? [y/N] ")?;
                out.flush()?;
                let answer = match lines.recv() {
                    Ok(line) => line?,
                    Err(_) => String::new(),
                };
                let confirmed = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
                model = update(model, Message::DeleteTab { id, confirmed });
                if confirmed {
                    writeln!(out, "deleted {id}")?;
                } else {
                    writeln!(out, "kept {id}")?;
                }
                report_status(out, &mut shown, model.status(), false)?;
            }
            Command::ListTabs => write_tabs(out, model.store())?,
            Command::ShowActive => write_active(out, &model)?,
            Command::Preview(pane) => writeln!(out, "{}", model.preview_html(pane))?,
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => break,
        }
    }

    model = update(model, Message::Tick(clock()));
    model = update(model, Message::WindowClose);
    report_status(out, &mut shown, model.status(), true)?;
    Ok(model)
}

/// Print the status when it changes, or always when `forced`.
///
/// Returns true if a line was printed.
fn report_status(
    out: &mut impl Write,
    shown: &mut Option<SaveStatus>,
    current: Option<SaveStatus>,
    forced: bool,
) -> io::Result<bool> {
    let mut printed = false;
    if let Some(status) = current
        && (forced || *shown != current)
    {
        writeln!(out, "[{}]", status_label(status))?;
        printed = true;
    }
    *shown = current;
    Ok(printed)
}
