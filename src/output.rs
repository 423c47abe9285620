//! User-facing console lines.
//! Colors are enabled only when stdout is a TTY; logs go through tracing instead.

use owo_colors::OwoColorize;

use crate::events::{Phase, ProgressEvent, ProgressSink};

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain line (no prefix) for output users may script against.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

/// Renders progress events as status lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&mut self, event: ProgressEvent) {
        match event.phase {
            Phase::Started => print_info(&event.detail),
            Phase::Progress => print_user(&format!("  {}", event.detail)),
            Phase::Succeeded => print_success(&event.detail),
            Phase::Failed => print_error(&event.detail),
        }
    }
}
