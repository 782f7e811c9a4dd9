//! Status lines for the terminal.
//!
//! Plain notices (`info`, `success`, `warning`, `error`) plus the navigation
//! events the simulator reports while walking: leaving the route, getting a
//! new one and arriving.

use owo_colors::OwoColorize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
    OffRoute,
    Reroute,
}

impl Level {
    fn marker(self) -> &'static str {
        match self {
            Level::Info => "ℹ️ ",
            Level::Success => "✅ ",
            Level::Warning => "⚠️ ",
            Level::Error => "❌ ",
            Level::OffRoute => "🚶 ",
            Level::Reroute => "↻ ",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Level::Error)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Style {
    pub emoji: bool,
    pub color: bool,
}

impl Default for Style {
    fn default() -> Self {
        // NO_COLOR wins over a TTY.
        let color = atty::is(atty::Stream::Stdout) && std::env::var_os("NO_COLOR").is_none();
        Self { emoji: true, color }
    }
}

pub fn info(msg: impl AsRef<str>) {
    print_line(Level::Info, msg.as_ref(), Style::default());
}

pub fn success(msg: impl AsRef<str>) {
    print_line(Level::Success, msg.as_ref(), Style::default());
}

pub fn warning(msg: impl AsRef<str>) {
    print_line(Level::Warning, msg.as_ref(), Style::default());
}

pub fn error(msg: impl AsRef<str>) {
    print_line(Level::Error, msg.as_ref(), Style::default());
}

/// The walker left the route; `distance` is already formatted.
pub fn off_route(distance: &str, style: Style) {
    print_line(
        Level::OffRoute,
        &format!("off route ({distance} from route)"),
        style,
    );
}

pub fn back_on_route(style: Style) {
    print_line(Level::Success, "back on route", style);
}

pub fn rerouted(count: u32, style: Style) {
    print_line(Level::Reroute, &format!("new route (reroute #{count})"), style);
}

pub fn reroute_failed(style: Style) {
    print_line(
        Level::Warning,
        "could not get a new route, keeping the current one",
        style,
    );
}

pub fn print_line(level: Level, msg: &str, style: Style) {
    let line = render_line(level, msg, style);
    if level.to_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

pub fn render_line(level: Level, msg: &str, style: Style) -> String {
    let prefix = if style.emoji { level.marker() } else { "" };
    let line = format!("{prefix}{msg}");
    if !style.color {
        return line;
    }
    match level {
        Level::Info => line,
        Level::Success => line.green().to_string(),
        Level::Warning | Level::Reroute => line.yellow().to_string(),
        Level::Error | Level::OffRoute => line.red().to_string(),
    }
}
