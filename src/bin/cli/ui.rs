use indicatif::{ProgressBar, ProgressStyle};
use nu_ansi_term::{Color, Style};
use std::fmt::Display;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum Theme {
    Auto,
    Light,
    Dark,
    Plain,
}

#[derive(Clone, Copy)]
enum Level {
    Info,
    Success,
    Warn,
    Error,
}

impl Level {
    fn marker(self) -> &'static str {
        match self {
            Level::Info => "ℹ",
            Level::Success => "✔",
            Level::Warn => "⚠",
            Level::Error => "✖",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Level::Warn | Level::Error)
    }
}

/// Accent colours; everything else is printed unstyled.
#[derive(Clone, Copy)]
struct Accents {
    title: Color,
    label: Color,
    good: Color,
    bad: Color,
    note: Color,
}

impl Accents {
    fn for_theme(theme: Theme) -> Option<Self> {
        match theme {
            Theme::Plain => None,
            Theme::Light => Some(Self {
                title: Color::Blue,
                label: Color::Black,
                good: Color::Green,
                bad: Color::Red,
                note: Color::Purple,
            }),
            Theme::Dark | Theme::Auto => Some(Self {
                title: Color::Purple,
                label: Color::LightBlue,
                good: Color::LightGreen,
                bad: Color::LightRed,
                note: Color::LightCyan,
            }),
        }
    }

    fn level(self, level: Level) -> Style {
        let color = match level {
            Level::Info => self.note,
            Level::Success => self.good,
            Level::Warn => Color::Yellow,
            Level::Error => self.bad,
        };
        color.bold()
    }
}

/// Terminal output for the text format. `quiet` drops markers and spinners
/// so the output can be piped.
pub struct Ui {
    accents: Option<Accents>,
    quiet: bool,
}

impl Ui {
    pub fn new(theme: Theme, quiet: bool) -> Self {
        let paint = !quiet && std::io::stdout().is_terminal();

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        Self {
            accents: Accents::for_theme(theme).filter(|_| paint),
            quiet,
        }
    }

    pub fn spacer(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// Right-aligned `key: value` pairs under a heading.
    pub fn section<'a, I, V>(&self, title: &str, rows: I)
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Display,
    {
        let rows: Vec<(&str, String)> = rows
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        if rows.is_empty() {
            return;
        }
        self.heading(title);
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in rows {
            let key = format!("{key:>width$}:");
            println!("  {} {value}", self.label(key));
        }
    }

    /// Left-aligned columns under a header row.
    pub fn table(&self, title: &str, header: &[&str], rows: &[Vec<String>]) {
        self.heading(title);
        if rows.is_empty() {
            println!("  (none)");
            return;
        }
        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        println!("  {}", self.label(padded(header.iter().copied(), &widths)));
        for row in rows {
            println!("  {}", padded(row.iter().map(String::as_str), &widths));
        }
    }

    pub fn list<I>(&self, title: &str, entries: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries = entries.into_iter().peekable();
        if entries.peek().is_none() {
            return;
        }
        self.heading(title);
        for entry in entries {
            println!("  - {entry}");
        }
    }

    pub fn info(&self, message: &str) {
        self.status(Level::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.status(Level::Success, message);
    }

    pub fn warn(&self, message: &str) {
        self.status(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.status(Level::Error, message);
    }

    /// Spinner on stderr while a batch runs; silent when quiet.
    pub fn task(&self, label: impl Into<String>) -> Task {
        let spinner = (!self.quiet).then(|| {
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            let pb = ProgressBar::new_spinner().with_style(style).with_message(label.into());
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        });
        Task {
            started: Instant::now(),
            spinner,
        }
    }

    fn status(&self, level: Level, message: &str) {
        let line = if self.quiet && !matches!(level, Level::Error) {
            message.to_string()
        } else {
            let marker = match self.accents {
                Some(accents) => accents.level(level).paint(level.marker()).to_string(),
                None => level.marker().to_string(),
            };
            format!("{marker} {message}")
        };
        if level.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn heading(&self, title: &str) {
        match self.accents {
            _ if self.quiet => println!("{title}"),
            Some(accents) => println!("{}", accents.title.bold().paint(format!("▸ {title}"))),
            None => println!("▸ {title}"),
        }
    }

    fn label(&self, text: String) -> String {
        match self.accents {
            Some(accents) => accents.label.bold().paint(text).to_string(),
            None => text,
        }
    }
}

fn padded<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let cells: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    cells.join("  ").trim_end().to_string()
}

/// Running batch; [`Task::finish`] clears the spinner and reports the time taken.
pub struct Task {
    started: Instant,
    spinner: Option<ProgressBar>,
}

impl Task {
    pub fn finish(self) -> Duration {
        if let Some(pb) = &self.spinner {
            pb.finish_and_clear();
        }
        self.started.elapsed()
    }
}

/// Milliseconds below a second, seconds with two decimals above.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{secs:.2}s")
    }
}

/// Bytes as B/KB/MB/GB/TB with two decimals above a kilobyte.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.2} {unit}")
}
