//! Interactive counting screen shared by `scan` and `validate`.
//!
//! On a terminal, keys are read in raw mode: typed characters go to the
//! manual entry debouncer, Enter submits at once, Tab toggles the mode,
//! Ctrl-E exports. With piped stdin (or `--line-mode`) every line is
//! either an identifier, submitted immediately, or a `:command`.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, queue, terminal};
use futures::StreamExt;
use tabled::Tabled;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use stockscan_core::{
    Bucket, BucketLine, CoreError, Debouncer, Notification, NotificationLevel, ScanSession,
};

use crate::cli::{GlobalOpts, ScanArgs, ScanMode, SessionArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{util, validate};

// ── Entry point ─────────────────────────────────────────────────────

pub async fn handle(
    args: ScanArgs,
    mut session_config: stockscan_core::SessionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    config::apply_session_args(&mut session_config, &args.session);
    let start = match args.mode {
        ScanMode::Entries => Bucket::Entries,
        ScanMode::Exits => Bucket::Exits,
    };
    let session = ScanSession::new(session_config, start)?;

    run(&session, &args.session, global).await?;

    let left = session.snapshot();
    let pending: Vec<String> = [Bucket::Entries, Bucket::Exits]
        .into_iter()
        .filter(|b| !left.lines(*b).is_empty())
        .map(|b| format!("{b}: {} units", total(left.lines(b))))
        .collect();
    if !pending.is_empty() {
        warn!(?pending, "session closed with unexported scans");
        util::note(
            global,
            &format!("! Unexported scans discarded ({})", pending.join(", ")),
        );
    }
    Ok(())
}

/// Start `session`, drive it from the keyboard or stdin until the operator
/// quits, then shut it down.
pub(crate) async fn run(
    session: &ScanSession,
    args: &SessionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut notifications = session.notifications();
    session.start().await?;

    let interactive = !args.line_mode && io::stdin().is_terminal();
    let screen = Screen {
        raw: interactive,
        color: output::should_color(&global.color),
        quiet: global.quiet,
    };

    let result = if interactive {
        key_loop(session, &mut notifications, &screen).await
    } else {
        line_loop(session, &mut notifications, &screen).await
    };

    session.shutdown().await;
    while let Ok(n) = notifications.try_recv() {
        screen.notify(&n);
    }
    result
}

// ── Actions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Submit(String),
    Toggle,
    Export,
    Show,
    Reload,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

async fn perform(session: &ScanSession, action: Action, screen: &Screen) -> Flow {
    let result = match action {
        Action::Quit => return Flow::Quit,
        Action::Show => {
            screen.block(&counts_view(session));
            return Flow::Continue;
        }
        Action::Submit(code) => session.submit(code).await.map(drop),
        Action::Toggle => session.toggle_mode().await.map(drop),
        Action::Export => match session.export().await {
            Ok(report) => {
                debug!(path = %report.path.display(), rows = report.rows, "export finished");
                Ok(())
            }
            // The session has already told the operator.
            Err(e) if !matches!(e, CoreError::SessionClosed) => {
                debug!(error = %e, "export failed");
                Ok(())
            }
            Err(e) => Err(e),
        },
        Action::Reload => match session.refresh_catalog().await {
            Ok(products) => {
                screen.notify(&Notification {
                    level: NotificationLevel::Info,
                    message: format!("Inventaire rechargé : {products} produits."),
                });
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "catalog reload failed");
                Ok(())
            }
        },
    };

    match result {
        Ok(()) => Flow::Continue,
        Err(CoreError::SessionClosed) => Flow::Quit,
        Err(e) => {
            screen.notify(&Notification {
                level: NotificationLevel::Error,
                message: e.to_string(),
            });
            Flow::Continue
        }
    }
}

fn on_notification(received: Result<Notification, RecvError>, screen: &Screen) -> Flow {
    match received {
        Ok(n) => {
            screen.notify(&n);
            Flow::Continue
        }
        Err(RecvError::Lagged(skipped)) => {
            warn!(skipped, "notifications dropped");
            Flow::Continue
        }
        Err(RecvError::Closed) => Flow::Quit,
    }
}

// ── Line mode ───────────────────────────────────────────────────────

/// One line of piped input.
fn parse_line(line: &str) -> Result<Option<Action>, String> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Ok((!line.is_empty()).then(|| Action::Submit(line.to_owned())));
    };
    match command.trim().to_ascii_lowercase().as_str() {
        "toggle" | "t" => Ok(Some(Action::Toggle)),
        "export" | "e" => Ok(Some(Action::Export)),
        "show" | "s" => Ok(Some(Action::Show)),
        "reload" | "r" => Ok(Some(Action::Reload)),
        "quit" | "q" => Ok(Some(Action::Quit)),
        other => Err(format!(
            "Commande inconnue \":{other}\" (:toggle, :export, :show, :reload, :quit)."
        )),
    }
}

/// Read stdin on a plain thread; a read blocked on an idle terminal must
/// not hold up runtime shutdown.
fn stdin_lines() -> mpsc::UnboundedReceiver<io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn line_loop(
    session: &ScanSession,
    notifications: &mut broadcast::Receiver<Notification>,
    screen: &Screen,
) -> Result<(), CliError> {
    let mut lines = stdin_lines();

    loop {
        let flow = tokio::select! {
            biased;
            received = notifications.recv() => on_notification(received, screen),
            line = lines.recv() => {
                let Some(line) = line else { break };
                match parse_line(&line?) {
                    Ok(Some(action)) => perform(session, action, screen).await,
                    Ok(None) => Flow::Continue,
                    Err(message) => {
                        screen.notify(&Notification { level: NotificationLevel::Warning, message });
                        Flow::Continue
                    }
                }
            }
        };
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}

// ── Key mode ────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum KeyInput {
    Push(char),
    Backspace,
    SubmitNow,
    Act(Action),
    Ignore,
}

/// Map a key press. Validation sessions have no mode to toggle, so Tab
/// is ignored there and the field is left alone.
fn key_input(key: &KeyEvent, validation: bool) -> KeyInput {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => KeyInput::Act(Action::Quit),
        KeyCode::Char('c' | 'd') if ctrl => KeyInput::Act(Action::Quit),
        KeyCode::Char('e') if ctrl => KeyInput::Act(Action::Export),
        KeyCode::Char('l') if ctrl => KeyInput::Act(Action::Show),
        KeyCode::Char('r') if ctrl => KeyInput::Act(Action::Reload),
        KeyCode::Char(c) if !ctrl => KeyInput::Push(c),
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Enter => KeyInput::SubmitNow,
        KeyCode::Tab | KeyCode::BackTab if !validation => KeyInput::Act(Action::Toggle),
        _ => KeyInput::Ignore,
    }
}

/// Raw terminal mode for as long as this lives.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = writeln!(io::stderr());
    }
}

async fn key_loop(
    session: &ScanSession,
    notifications: &mut broadcast::Receiver<Notification>,
    screen: &Screen,
) -> Result<(), CliError> {
    let _raw = RawMode::enable()?;
    let (mut debouncer, mut submissions) = Debouncer::new(session.config().debounce);
    let validation = session.is_validation();
    let mut events = EventStream::new();

    screen.block(&key_help(validation));
    screen.prompt(session.snapshot().active, debouncer.text());

    loop {
        let flow = tokio::select! {
            received = notifications.recv() => on_notification(received, screen),

            Some(value) = submissions.recv() => {
                settle_field(&mut debouncer, &value);
                perform(session, Action::Submit(value), screen).await
            }

            event = events.next() => {
                let Some(event) = event else { break };
                let input = match event? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => key_input(&key, validation),
                    _ => KeyInput::Ignore,
                };
                match input {
                    KeyInput::Push(c) => {
                        debouncer.push(c);
                        Flow::Continue
                    }
                    KeyInput::Backspace => {
                        debouncer.backspace();
                        Flow::Continue
                    }
                    KeyInput::SubmitNow => {
                        debouncer.submit_now();
                        Flow::Continue
                    }
                    KeyInput::Act(action) => {
                        if action == Action::Toggle {
                            debouncer.clear();
                        }
                        perform(session, action, screen).await
                    }
                    KeyInput::Ignore => Flow::Continue,
                }
            }
        };
        if flow == Flow::Quit {
            break;
        }
        screen.prompt(session.snapshot().active, debouncer.text());
    }
    Ok(())
}

/// Empty the field after the debouncer sent `submitted`, unless the
/// operator has typed more since the timer fired.
fn settle_field(debouncer: &mut Debouncer, submitted: &str) {
    if debouncer.text().trim() == submitted {
        debouncer.clear();
    }
}

fn key_help(validation: bool) -> String {
    let toggle = if validation { "" } else { "Tab entries/exits · " };
    format!("Enter submit · {toggle}Ctrl-E export · Ctrl-L show · Ctrl-R reload · Esc quit")
}

// ── Rendering ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Count")]
    count: u32,
}

impl From<&BucketLine> for CountRow {
    fn from(line: &BucketLine) -> Self {
        Self {
            id: line.product_id.clone(),
            name: line.display_name.clone(),
            count: line.count,
        }
    }
}

fn total(lines: &[BucketLine]) -> u64 {
    lines.iter().map(|l| u64::from(l.count)).sum()
}

fn counts_view(session: &ScanSession) -> String {
    if session.is_validation() {
        return validate::reconciliation_table(&session.reconciliation());
    }
    let snapshot = session.snapshot();
    let lines = snapshot.active_lines();
    let rows: Vec<CountRow> = lines.iter().map(CountRow::from).collect();
    let other = snapshot.active.toggled().map_or(0, |b| total(snapshot.lines(b)));
    format!(
        "Mode: {} ({} units, {} in the other mode)\n{}",
        snapshot.active.label(),
        total(lines),
        other,
        output::render_table(&rows)
    )
}

/// Where the session talks to the operator. Everything goes to stderr so
/// stdout stays free for command output.
struct Screen {
    raw: bool,
    color: bool,
    quiet: bool,
}

impl Screen {
    fn write(&self, text: &str) {
        let mut err = io::stderr().lock();
        if self.raw {
            let _ = queue!(
                err,
                cursor::MoveToColumn(0),
                terminal::Clear(terminal::ClearType::CurrentLine)
            );
            let _ = write!(err, "{}\r\n", text.replace('\n', "\r\n"));
        } else {
            let _ = writeln!(err, "{text}");
        }
        let _ = err.flush();
    }

    fn notify(&self, n: &Notification) {
        if self.quiet && n.level != NotificationLevel::Error {
            return;
        }
        self.write(&output::format_notification(n, self.color));
    }

    fn block(&self, text: &str) {
        if !self.quiet {
            self.write(text);
        }
    }

    fn prompt(&self, active: Bucket, text: &str) {
        if !self.raw {
            return;
        }
        let mut err = io::stderr().lock();
        let _ = queue!(
            err,
            cursor::MoveToColumn(0),
            terminal::Clear(terminal::ClearType::CurrentLine)
        );
        let _ = write!(err, "[{}] > {text}", active.label());
        let _ = err.flush();
    }
}
