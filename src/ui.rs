// UI layer: progress messages, the SMS prompt and rendering of the
// consumption report. Everything the user sees goes through here so the
// dry run and the live run share one output path.

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::{self, Write as _};
use std::io::{BufRead, IsTerminal};
use std::time::Duration;

use crate::models::{DataConsumptionReport, DataPass};

const RULE_WIDTH: usize = 50;
const NA: &str = "N/A";

/// Output settings derived from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ui {
    /// Raw JSON on stdout; all chatter suppressed.
    pub json: bool,
    /// Suppress informational messages (pretty mode only).
    pub quiet: bool,
}

impl Ui {
    pub fn new(json: bool, quiet: bool) -> Self {
        Ui { json, quiet }
    }

    /// Informational line, hidden by `--quiet` and `--json`.
    pub fn info(&self, message: &str) {
        if !self.json && !self.quiet {
            println!("{message}");
        }
    }

    /// Start a spinner for a network step. Hidden in JSON mode; login
    /// progress still shows with `--quiet`.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Spinner for informational steps; hidden by `--quiet` as well.
    pub fn info_spinner(&self, message: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        self.spinner(message)
    }

    /// Ask for the SMS code. In JSON mode, or when stdin is not a terminal,
    /// a bare line is read from stdin so the code can be piped in.
    pub fn prompt_sms_code(&self) -> Result<String> {
        let stdin = std::io::stdin();
        let code = if self.json || !stdin.is_terminal() {
            let mut line = String::new();
            stdin
                .lock()
                .read_line(&mut line)
                .context("Failed to read SMS code from stdin")?;
            line
        } else {
            Input::<String>::new()
                .with_prompt("Enter SMS code")
                .interact_text()
                .context("Failed to read SMS code")?
        };
        let code = code.trim().to_string();
        anyhow::ensure!(!code.is_empty(), "No SMS code entered");
        Ok(code)
    }

    /// Print the report in the selected format.
    pub fn print_report(&self, report: &DataConsumptionReport) -> Result<()> {
        if self.json {
            println!("{}", to_json(report)?);
        } else {
            let text = render_consumption(report, &Local, std::io::stdout().is_terminal())
                .context("Failed to render report")?;
            print!("{text}");
        }
        Ok(())
    }
}

/// Pretty JSON, exactly the fields the server sent.
pub fn to_json(report: &DataConsumptionReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report")
}

/// Render the report as a human readable block. Timestamps are shown in
/// `tz`; `color` toggles terminal styling.
pub fn render_consumption<Tz>(
    report: &DataConsumptionReport,
    tz: &Tz,
    color: bool,
) -> Result<String, fmt::Error>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let title = "📱 FRAENK DATA CONSUMPTION";
    let customer = report.customer.as_ref();

    let mut out = String::new();
    writeln!(out, "\n{heavy}")?;
    if color {
        writeln!(out, "{}", title.bold())?;
    } else {
        writeln!(out, "{title}")?;
    }
    writeln!(out, "{heavy}")?;
    writeln!(
        out,
        "Phone: {}",
        customer.and_then(|c| c.msisdn.as_deref()).unwrap_or(NA)
    )?;
    writeln!(
        out,
        "Contract: {}",
        customer.and_then(|c| c.contract_type.as_deref()).unwrap_or(NA)
    )?;
    writeln!(out, "\n{light}")?;

    for pass in &report.passes {
        render_pass(&mut out, pass, tz, color)?;
    }

    writeln!(out, "\n{heavy}")?;
    Ok(out)
}

fn render_pass<Tz>(out: &mut String, pass: &DataPass, tz: &Tz, color: bool) -> fmt::Result
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    writeln!(out, "\n📊 {}", pass.pass_name.as_deref().unwrap_or("Unknown"))?;
    writeln!(
        out,
        "   Used: {} / {}",
        pass.used_volume.as_deref().unwrap_or(NA),
        pass.initial_volume.as_deref().unwrap_or(NA)
    )?;

    let usage = match &pass.percentage_consumption {
        Some(n) => format!("{n}%"),
        None => "0%".to_string(),
    };
    if color {
        let percent = pass.percentage();
        let styled = if percent >= 90.0 {
            usage.red()
        } else if percent >= 75.0 {
            usage.yellow()
        } else {
            usage.green()
        };
        writeln!(out, "   Usage: {styled}")?;
    } else {
        writeln!(out, "   Usage: {usage}")?;
    }

    if let Some(expected) = &pass.expected_consumption {
        writeln!(out, "   Expected: {expected}")?;
    }
    if let Some(expiry) = pass.expiry_timestamp.and_then(|ms| format_millis(ms, tz)) {
        writeln!(out, "   Expires: {expiry}")?;
    }
    if let Some(updated) = pass.last_update_timestamp.and_then(|ms| format_millis(ms, tz)) {
        writeln!(out, "   Updated: {updated}")?;
    }

    let enabled: Vec<&str> = pass.flags().filter(|(_, on)| *on).map(|(k, _)| k).collect();
    if !enabled.is_empty() {
        writeln!(out, "   Features: {}", enabled.join(", "))?;
    }
    Ok(())
}

/// Epoch milliseconds as `YYYY-MM-DD HH:MM` in `tz`.
pub fn format_millis<Tz>(millis: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
}
