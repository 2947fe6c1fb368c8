//! Console verdict lines and the closing summary.

use colored::{Color, ColoredString, Colorize};

use super::{RunSummary, Verdict};
use crate::config::Palette;

/// Width the file name and verdict are padded to.
const LINE_WIDTH: usize = 50;

/// Prints one verdict line per file, cycling background colours.
pub struct Console {
    palette: Palette,
    lines_printed: usize,
}

impl Console {
    pub fn new(palette: Palette) -> Self {
        Self { palette, lines_printed: 0 }
    }

    pub fn print_header(&self) {
        println!("Processing: ");
    }

    pub fn print_file(&mut self, file_name: &str, verdict: Verdict) {
        println!("{}", self.file_line(file_name, verdict));
        self.lines_printed += 1;
    }

    pub fn print_summary(&self, summary: &RunSummary) {
        println!();
        println!("Summary");
        println!("__________________");
        match summary.percentages() {
            Some(pct) => {
                println!("{}", paint(&format!("PASS: {}%", pct.pass), self.palette.pass, None));
                println!("{}", paint(&format!("WARN: {}%", pct.warn), self.palette.warn, None));
                println!("{}", paint(&format!("FAIL: {}%", pct.fail), self.palette.fail, None));
            }
            None => println!("No files matched the configured file endings"),
        }
    }

    /// The padded, coloured line for one file.
    pub fn file_line(&self, file_name: &str, verdict: Verdict) -> String {
        let background = self.background();
        let label = verdict.as_str();
        let padding = " ".repeat(LINE_WIDTH.saturating_sub(file_name.chars().count() + label.len()));
        let text_color = match verdict {
            Verdict::Pass => self.palette.pass,
            Verdict::Warn => self.palette.warn,
            Verdict::Fail => self.palette.fail,
        };

        format!(
            "{}{}",
            paint(&format!("{}{}", file_name, padding), None, background),
            paint(label, text_color, background)
        )
    }

    fn background(&self) -> Option<Color> {
        if self.palette.backgrounds.is_empty() {
            None
        } else {
            Some(self.palette.backgrounds[self.lines_printed % self.palette.backgrounds.len()])
        }
    }
}

fn paint(text: &str, foreground: Option<Color>, background: Option<Color>) -> ColoredString {
    let mut styled = ColoredString::from(text);
    if let Some(color) = foreground {
        styled = styled.color(color);
    }
    if let Some(color) = background {
        styled = styled.on_color(color);
    }
    styled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Palette {
        Palette { pass: None, warn: None, fail: None, backgrounds: Vec::new() }
    }

    #[test]
    fn test_file_line_is_padded_to_width() {
        colored::control::set_override(false);
        let console = Console::new(plain());
        let line = console.file_line("boron.xlsx", Verdict::Warn);
        assert_eq!(line.len(), LINE_WIDTH);
        assert!(line.ends_with("WARN"));
    }

    #[test]
    fn test_file_line_pads_by_characters() {
        colored::control::set_override(false);
        let console = Console::new(plain());
        let line = console.file_line("Müller_Şahin_2021.xlsx", Verdict::Pass);
        assert_eq!(line.chars().count(), LINE_WIDTH);
        assert!(line.ends_with("PASS"));
    }

    #[test]
    fn test_backgrounds_cycle() {
        let mut console = Console::new(Palette {
            backgrounds: vec![Color::Black, Color::BrightBlack],
            ..plain()
        });
        assert_eq!(console.background(), Some(Color::Black));
        console.lines_printed += 1;
        assert_eq!(console.background(), Some(Color::BrightBlack));
        console.lines_printed += 1;
        assert_eq!(console.background(), Some(Color::Black));
    }
}
