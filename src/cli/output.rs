//! Shared CLI output formatting with colors, symbols, and structured display.

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // Respect NO_COLOR env (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("AGORA_NO_COLOR").is_ok() {
        return false;
    }
    // Default: enable color if stdout is a terminal
    atty_stdout()
}

/// Check if stdout is a TTY.
fn atty_stdout() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

#[cfg(unix)]
extern "C" {
    fn isatty(fd: std::os::raw::c_int) -> std::os::raw::c_int;
}

#[cfg(unix)]
unsafe fn libc_isatty(fd: i32) -> i32 {
    unsafe { isatty(fd) }
}

#[cfg(not(unix))]
unsafe fn libc_isatty(_fd: i32) -> i32 {
    0
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    #[cfg(test)]
    fn plain() -> Self {
        Self { use_color: false }
    }

    /// Yellow warning symbol.
    pub fn warn_sym(&self) -> &str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    pub fn yellow(&self, s: &str) -> String {
        if self.use_color {
            format!("{YELLOW}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn cyan(&self, s: &str) -> String {
        if self.use_color {
            format!("{CYAN}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn dim(&self, s: &str) -> String {
        if self.use_color {
            format!("{DIM}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn bold(&self, s: &str) -> String {
        if self.use_color {
            format!("{BOLD}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    /// A filled bar visualizing an intensity in [0, 1], colored by level.
    pub fn intensity_bar(&self, intensity: f32, width: usize) -> String {
        let clamped = intensity.clamp(0.0, 1.0);
        let filled = (clamped * width as f32) as usize;
        let bar: String =
            "\u{2588}".repeat(filled.min(width)) + &"\u{2591}".repeat(width - filled.min(width));

        let colored = if !self.use_color {
            bar
        } else if clamped >= 0.7 {
            format!("{GREEN}{bar}{RESET}")
        } else if clamped >= 0.4 {
            format!("{YELLOW}{bar}{RESET}")
        } else {
            format!("{RED}{bar}{RESET}")
        };
        format!("{colored} {clamped:.2}")
    }
}

/// Print a section header for CLI output.
pub fn print_header(s: &Styled, title: &str) {
    println!();
    println!("  {}", s.bold(title));
    println!("  {}", s.dim(&"\u{2500}".repeat(60)));
}
