//! Status messages on stderr.
//!
//! Command results go to stdout undecorated so they can be piped; everything
//! printed here is for humans.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::{OwoColorize, Style};

static COLORS: AtomicBool = AtomicBool::new(false);

/// Enable colors unless disabled by flag, `NO_COLOR` or a non-terminal stderr.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

/// Respects `NO_COLOR` and `FORCE_COLOR`, then falls back to terminal
/// detection.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

fn paint(text: &str, style: Style) -> String {
    if COLORS.load(Ordering::Relaxed) {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

pub fn success(message: &str) {
    eprintln!("{} {}", paint("✓", Style::new().green().bold()), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", paint("ℹ", Style::new().blue().bold()), message);
}

pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        paint("⚠", Style::new().yellow().bold()),
        paint(message, Style::new().yellow())
    );
}

pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        paint("✗", Style::new().red().bold()),
        paint(message, Style::new().red())
    );
}

/// Dimmed text for secondary details.
pub fn dim(text: &str) -> String {
    paint(text, Style::new().dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_is_plain_when_colors_are_off() {
        init_colors(true);
        assert_eq!(paint("ok", Style::new().green()), "ok");
        assert_eq!(dim("detail"), "detail");
    }

    #[test]
    fn no_color_env_disables_colors() {
        // SAFETY: no other test in this binary reads or writes NO_COLOR
        unsafe {
            std::env::set_var("NO_COLOR", "1");
        }
        assert!(!should_use_color());
        init_colors(false);
        assert_eq!(paint("ok", Style::new().red()), "ok");
    }
}
