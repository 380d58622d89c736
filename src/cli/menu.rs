//! Interactive text menu.
//!
//! Reads one selection per line and runs exactly one session operation per
//! selection. Results and errors are printed; an error never ends the loop.

use crate::session::{NetplanError, SessionManager};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Menu entries in display order
pub const MENU_ITEMS: &[(char, &str)] = &[
    ('P', "Configuration Path"),
    ('G', "Get Configuration"),
    ('S', "Set Configuration"),
    ('T', "Try Configuration"),
    ('A', "Apply Configuration"),
    ('C', "Cancel Configuration"),
    ('N', "New Session"),
    ('Q', "Quit"),
];

pub struct Menu<R, W> {
    input: R,
    output: W,
    default_try_timeout: u32,
    running: bool,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, default_try_timeout: u32) -> Self {
        Self {
            input,
            output,
            default_try_timeout,
            running: false,
        }
    }

    /// Consume the menu, returning its writer
    pub fn into_output(self) -> W {
        self.output
    }

    /// Loop until `Q` is selected or input ends
    pub async fn run(&mut self, manager: &mut SessionManager) -> io::Result<()> {
        self.running = true;
        while self.running {
            self.print_menu()?;
            match self.read_line()? {
                Some(line) => {
                    if let Some(selection) = line.chars().next() {
                        self.dispatch(selection.to_ascii_uppercase(), manager).await?;
                    }
                }
                None => self.running = false,
            }
        }
        writeln!(self.output)?;
        self.output.flush()
    }

    fn print_menu(&mut self) -> io::Result<()> {
        write!(self.output, "\n------------MENU-------------\n")?;
        for (key, label) in MENU_ITEMS {
            write!(self.output, "\n{} \t {}", key, label)?;
        }
        write!(self.output, "\nPlease Enter Your Selection: ")?;
        self.output.flush()
    }

    async fn dispatch(&mut self, selection: char, manager: &mut SessionManager) -> io::Result<()> {
        debug!("Menu selection: {}", selection);
        match selection {
            'P' => match manager.configuration_path().await {
                Ok(path) => write!(self.output, "\n\t\tConfiguration Path: {}", path),
                Err(e) => self.print_error(&e),
            },
            'G' => self.print_configuration(manager).await,
            'S' => self.set_menu(manager).await,
            'T' => self.try_menu(manager).await,
            'A' => {
                let outcome = manager.apply_configuration().await;
                self.print_outcome("Apply", outcome)
            }
            'C' => {
                let outcome = manager.cancel_configuration().await;
                self.print_outcome("Cancel", outcome)
            }
            'N' => {
                manager.reset_session();
                write!(self.output, "\n\tNew session on next operation")
            }
            'Q' => {
                self.running = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn print_configuration(&mut self, manager: &mut SessionManager) -> io::Result<()> {
        match manager.get_configuration().await {
            Ok(configuration) => write!(self.output, "\nConfiguration\n{}\n", configuration),
            Err(e) => self.print_error(&e),
        }
    }

    async fn set_menu(&mut self, manager: &mut SessionManager) -> io::Result<()> {
        write!(self.output, "\n------------------")?;
        self.print_configuration(manager).await?;
        write!(self.output, "\n\tSet Configuration")?;

        let Some(target) = self.prompt_token("\n\tEnter the configuration target: ")? else {
            return Ok(());
        };
        let Some(value) = self.prompt_token("\n\tEnter the configuration value: ")? else {
            return Ok(());
        };

        let outcome = manager.set_configuration(&target, &value).await;
        self.print_outcome("Set", outcome)
    }

    async fn try_menu(&mut self, manager: &mut SessionManager) -> io::Result<()> {
        let prompt = format!(
            "\n\tEnter the timeout in seconds [{}]: ",
            self.default_try_timeout
        );
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let timeout = match self.read_line()? {
            None => return Ok(()),
            Some(line) if line.is_empty() => self.default_try_timeout,
            Some(line) => match line.parse::<u32>() {
                Ok(timeout) => timeout,
                Err(_) => {
                    return write!(self.output, "\n\tInvalid timeout: {}", line);
                }
            },
        };

        let outcome = manager.try_configuration(timeout).await;
        self.print_outcome("Try", outcome)
    }

    /// Prompt until a non-empty token is entered; `None` on end of input
    fn prompt_token(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
            match self.read_line()? {
                None => return Ok(None),
                Some(line) => {
                    if let Some(token) = line.split_whitespace().next() {
                        return Ok(Some(token.to_string()));
                    }
                }
            }
        }
    }

    /// Next input line without surrounding whitespace; `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_outcome(
        &mut self,
        action: &str,
        outcome: Result<bool, NetplanError>,
    ) -> io::Result<()> {
        match outcome {
            Ok(true) => write!(self.output, "\n\t{}: succeeded", action),
            Ok(false) => write!(self.output, "\n\t{}: not confirmed", action),
            Err(e) => self.print_error(&e),
        }
    }

    fn print_error(&mut self, err: &NetplanError) -> io::Result<()> {
        write!(self.output, "{}", render_error(err))
    }
}

/// Human-readable form of an error, including the D-Bus error name
pub fn render_error(err: &NetplanError) -> String {
    match err {
        NetplanError::RemoteCall {
            method,
            name,
            message,
        } => format!(
            "ERROR \n\tMethod: {} \n\tDBus Error: {} \n\tMessage: {}\n",
            method, name, message
        ),
        other => format!("ERROR \n\t{}\n", other),
    }
}
