//! Terminal styling for progress and status lines.
//!
//! Errors go to stderr, everything else to stdout.

use owo_colors::OwoColorize;

// Pastel palette
const MINT: (u8, u8, u8) = (152, 225, 152);
const CORAL: (u8, u8, u8) = (255, 160, 160);
const CREAM: (u8, u8, u8) = (255, 230, 160);
const SKY: (u8, u8, u8) = (160, 200, 255);
const LAVENDER: (u8, u8, u8) = (181, 174, 254);
const TEAL: (u8, u8, u8) = (120, 180, 195);
const GREY: (u8, u8, u8) = (160, 160, 160);

fn glyph(symbol: &str, (r, g, b): (u8, u8, u8)) -> String {
    symbol.truecolor(r, g, b).bold().to_string()
}

fn grey(text: &str) -> String {
    let (r, g, b) = GREY;
    text.truecolor(r, g, b).to_string()
}

/// Print a success message with a green checkmark
pub fn success(message: &str) {
    println!("{} {}", glyph("✓", MINT), message.bright_white());
}

/// Print an error message with a red X
pub fn error(message: &str) {
    eprintln!("{} {}", glyph("✗", CORAL), message.bright_white());
}

/// Print a warning message with a yellow warning symbol
pub fn warning(message: &str) {
    println!("{} {}", glyph("⚠", CREAM), message.bright_white());
}

/// Print an info message with a blue info symbol
pub fn info(message: &str) {
    println!("{} {}", glyph("ℹ", SKY), message.bright_white());
}

/// Print a section header with a separator line
pub fn section(title: &str) {
    let (r, g, b) = LAVENDER;
    println!("\n{}", title.truecolor(r, g, b).bold());
    println!("{}", grey(&"─".repeat(50)));
}

/// Print a small section header without separator
pub fn subsection(title: &str) {
    let (r, g, b) = TEAL;
    println!("\n{}", title.truecolor(r, g, b));
    println!("{}", grey(&"·".repeat(30)));
}

/// Print a key-value pair with styled key and value
pub fn key_value(key: &str, value: &str) {
    println!("  {} {}", grey(&format!("{}:", key)), value.bright_white());
}

/// Print a dimmed/muted message
pub fn dimmed(message: &str) {
    println!("{}", grey(message));
}

/// Print a blank line for spacing
pub fn blank() {
    println!();
}
