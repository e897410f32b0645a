use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::app_config::Config;
use crate::errors::SessionError;
use crate::handoff::{Handoff, NavigationParams};
use crate::intake::IntakeController;
use crate::model::{Brief, ScriptLine};
use crate::providers::ScriptService;
use crate::providers::http::HttpScriptService;
use crate::render::{render_art_direction, render_session};
use crate::session::{RefineOutcome, ResultSession, SkipReason};

// @module: Application controller wiring the intake form, handoff and result session

const SHELL_HELP: &str = "Commands:
  show              Show the script and art direction
  select <n>        Select line n (selecting it again deselects it)
  feedback <text>   Feedback for the selected line
  refine            Regenerate the selected line using the feedback
  art               Show the art direction only
  location          Print the results location for the current script
  help              Show this help
  quit              Leave the results view";

/// A command typed into the refine shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Show,
    /// 1-based line number
    Select(usize),
    Feedback(String),
    Refine,
    Art,
    Location,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (trimmed, ""),
        };

        match verb.to_lowercase().as_str() {
            "show" | "s" => Ok(Self::Show),
            "select" | "sel" => {
                let number: usize = rest
                    .parse()
                    .map_err(|_| anyhow!("Expected a line number, got '{}'", rest))?;
                if number == 0 {
                    return Err(anyhow!("Line numbers start at 1"));
                }
                Ok(Self::Select(number))
            }
            "feedback" | "fb" => Ok(Self::Feedback(rest.to_string())),
            "refine" | "r" => Ok(Self::Refine),
            "art" => Ok(Self::Art),
            "location" | "loc" => Ok(Self::Location),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(anyhow!("Unknown command: {}", verb)),
        }
    }
}

/// What the shell loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellFlow {
    Continue,
    Refine,
    Quit,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Script service shared by the intake form and result sessions
    service: Arc<dyn ScriptService>,
}

impl Controller {
    // @method: Create a controller talking to the configured HTTP service
    pub fn with_config(config: Config) -> Result<Self> {
        let service = HttpScriptService::from_config(&config.service)
            .context("Failed to create script service client")?;
        Ok(Self::with_service(config, Arc::new(service)))
    }

    /// Create a controller using the given service implementation
    pub fn with_service(config: Config, service: Arc<dyn ScriptService>) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check that the script service is reachable
    pub async fn check_health(&self) -> Result<()> {
        self.service
            .test_connection()
            .await
            .with_context(|| format!("Script service at {} is not healthy", self.config.service.endpoint))?;
        info!("Script service at {} is healthy", self.config.service.endpoint);
        Ok(())
    }

    // =========================================================================
    // Intake
    // =========================================================================

    /// Submit a brief through a fresh intake form, showing a spinner while generating
    pub async fn generate(&self, brief: Brief) -> Result<Handoff> {
        let intake = IntakeController::new(Arc::clone(&self.service));
        let start_time = Instant::now();
        let progress_bar = spinner();

        let submission = intake.submit(brief);
        tokio::pin!(submission);
        let mut ticker = tokio::time::interval(Duration::from_millis(120));
        let result = loop {
            tokio::select! {
                biased;
                result = &mut submission => break result,
                _ = ticker.tick() => {
                    progress_bar.set_message(intake.submit_label());
                    progress_bar.tick();
                }
            }
        };
        progress_bar.finish_and_clear();

        let handoff = result?;
        info!("Script ready in {}", Self::format_duration(start_time.elapsed()));
        Ok(handoff)
    }

    /// Results location for a handoff
    pub fn location_for(&self, handoff: &Handoff) -> Result<String> {
        handoff
            .to_location(&self.config.results_path)
            .context("Failed to encode script data")
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Open a results view from a location or query string
    pub fn open(&self, location: &str) -> ResultSession {
        ResultSession::load(Arc::clone(&self.service), &NavigationParams::parse(location))
    }

    /// Open a results view directly from a handoff
    pub fn open_handoff(&self, handoff: Handoff) -> ResultSession {
        ResultSession::from_handoff(Arc::clone(&self.service), handoff)
    }

    /// Select a line (1-based), attach feedback and refine it in one go
    pub async fn refine_line(&self, session: &ResultSession, line_number: usize, feedback: &str) -> Result<ScriptLine> {
        let index = line_number
            .checked_sub(1)
            .ok_or_else(|| anyhow!("Line numbers start at 1"))?;

        if session.selection().index() != Some(index) {
            session.select_line(index).map_err(|e| match e {
                SessionError::LineOutOfRange { len, .. } => {
                    anyhow!("Line {} does not exist (script has {} lines)", line_number, len)
                }
                other => anyhow::Error::from(other),
            })?;
        }
        session.set_feedback(feedback);

        let progress_bar = spinner();
        let refine = session.refine_selected();
        tokio::pin!(refine);
        let mut ticker = tokio::time::interval(Duration::from_millis(120));
        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut refine => break outcome,
                _ = ticker.tick() => {
                    progress_bar.set_message(session.refine_label());
                    progress_bar.tick();
                }
            }
        };
        progress_bar.finish_and_clear();

        match outcome {
            RefineOutcome::Applied { line, .. } => Ok(line),
            RefineOutcome::Failed(e) => Err(e.into()),
            RefineOutcome::Skipped(reason) => Err(anyhow!(skip_message(reason))),
            RefineOutcome::Discarded => Err(anyhow!("The results view was closed before the refinement finished")),
        }
    }

    /// Interactive refine loop over a results view.
    ///
    /// While a refinement is outstanding the shell keeps reading commands, so the
    /// selection can change; the refinement still lands on the line it was started for.
    /// The session is disposed when the shell exits.
    pub async fn run_shell<R, W>(&self, session: &ResultSession, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let result = self.shell_loop(session, input, out).await;
        session.dispose();
        debug!("Refine shell closed");
        result
    }

    async fn shell_loop<R, W>(&self, session: &ResultSession, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        write!(out, "{}", render_session(session))?;
        writeln!(out, "Type 'help' for commands.")?;

        while let Some(line) = lines.next_line().await? {
            match self.apply_line(session, &line, out)? {
                ShellFlow::Continue => {}
                ShellFlow::Quit => break,
                ShellFlow::Refine => {
                    writeln!(out, "{}", session_refine_status(session))?;
                    let refine = session.refine_selected();
                    tokio::pin!(refine);

                    let outcome = 'waiting: loop {
                        tokio::select! {
                            biased;
                            outcome = &mut refine => break 'waiting Some(outcome),
                            line = lines.next_line() => {
                                let Some(line) = line? else { break 'waiting None };
                                match self.apply_line(session, &line, out)? {
                                    ShellFlow::Continue => {}
                                    ShellFlow::Quit => break 'waiting None,
                                    ShellFlow::Refine => {
                                        let extra = session.refine_selected().await;
                                        self.report(session, extra, out)?;
                                    }
                                }
                            }
                        }
                    };

                    match outcome {
                        Some(outcome) => self.report(session, outcome, out)?,
                        None => break,
                    }
                }
            }
        }

        Ok(())
    }

    fn apply_line<W: Write>(&self, session: &ResultSession, line: &str, out: &mut W) -> Result<ShellFlow> {
        if line.trim().is_empty() {
            return Ok(ShellFlow::Continue);
        }

        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{} (type 'help' for commands)", e)?;
                return Ok(ShellFlow::Continue);
            }
        };

        match command {
            ShellCommand::Show => write!(out, "{}", render_session(session))?,
            ShellCommand::Select(number) => match session.select_line(number - 1) {
                Ok(selection) if selection.index().is_some() => {
                    writeln!(out, "Line {} selected. Add feedback with: feedback <text>", number)?
                }
                Ok(_) => writeln!(out, "Line {} deselected", number)?,
                Err(SessionError::LineOutOfRange { len, .. }) => {
                    writeln!(out, "Error: Line {} does not exist (script has {} lines)", number, len)?
                }
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            ShellCommand::Feedback(text) => {
                if session.set_feedback(text) {
                    writeln!(out, "Feedback saved")?;
                } else {
                    writeln!(out, "{}", skip_message(SkipReason::NoSelection))?;
                }
            }
            ShellCommand::Refine => return Ok(ShellFlow::Refine),
            ShellCommand::Art => match session.art_direction() {
                Some(art) => write!(out, "{}", render_art_direction(&art))?,
                None => writeln!(out, "No script data available")?,
            },
            ShellCommand::Location => match session.handoff() {
                Some(handoff) => writeln!(out, "{}", self.location_for(&handoff)?)?,
                None => writeln!(out, "No script data available")?,
            },
            ShellCommand::Help => writeln!(out, "{}", SHELL_HELP)?,
            ShellCommand::Quit => return Ok(ShellFlow::Quit),
        }
        Ok(ShellFlow::Continue)
    }

    fn report<W: Write>(&self, session: &ResultSession, outcome: RefineOutcome, out: &mut W) -> Result<()> {
        match outcome {
            RefineOutcome::Applied { index, line } => {
                writeln!(out, "Line {} refined: {}", index + 1, line.text)?;
                write!(out, "{}", render_session(session))?;
            }
            RefineOutcome::Failed(e) => {
                writeln!(out, "Error: {}", e)?;
                writeln!(out, "Your selection and feedback were kept; type 'refine' to retry.")?;
            }
            RefineOutcome::Skipped(reason) => writeln!(out, "{}", skip_message(reason))?,
            RefineOutcome::Discarded => writeln!(out, "Refinement discarded")?,
        }
        Ok(())
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

fn session_refine_status(session: &ResultSession) -> String {
    match session.selection().index() {
        Some(index) => format!("Refining line {}...", index + 1),
        None => "Refining...".to_string(),
    }
}

fn skip_message(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NotLoaded => "No script data available",
        SkipReason::NoSelection => "Select a line first",
        SkipReason::EmptyFeedback => "Enter feedback for the selected line first",
        SkipReason::Busy => "A refinement is already in progress",
        SkipReason::Disposed => "The results view has been closed",
    }
}

fn spinner() -> ProgressBar {
    let progress_bar = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    progress_bar.set_style(style);
    progress_bar
}
