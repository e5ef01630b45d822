use owo_colors::OwoColorize;

/// Standard output formatting for the CLI
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    /// Print a banner across the full report width
    pub fn banner(&self, title: &str) {
        println!();
        println!("{}", "═".repeat(70).dimmed());
        println!("{}", title.bright_white().bold());
        println!("{}", "═".repeat(70).dimmed());
    }

    /// Print a system/status message (indented)
    pub fn status(&self, message: &str) {
        println!("  {}", message.dimmed());
    }

    /// Print an info message (indented)
    pub fn info(&self, label: &str, value: &str) {
        println!("  {} {}", label.bright_blue(), value);
    }

    /// Print a success message (indented)
    pub fn success(&self, message: &str) {
        println!("  {} {}", "✓".bright_green(), message);
    }

    /// Print an error message (indented)
    pub fn error(&self, message: &str) {
        println!("  {} {}", "✗".bright_red(), message);
    }

    /// Print a warning message (indented)
    pub fn warning(&self, message: &str) {
        println!("  {} {}", "⚠".yellow(), message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", title.bright_cyan().bold());
        println!("{}", "─".repeat(70).dimmed());
    }

    /// Section header in the colour of a confidence bucket
    pub fn bucket(&self, title: &str, alarm: bool) {
        println!();
        if alarm {
            println!("{}", title.bright_red().bold());
        } else {
            println!("{}", title.yellow().bold());
        }
        println!("{}", "─".repeat(70).dimmed());
    }

    /// Print a list item (already indented)
    pub fn list_item(&self, item: &str) {
        println!("    • {}", item);
    }

    /// Numbered entry with indented detail lines
    pub fn numbered(&self, index: usize, title: &str, details: &[String]) {
        println!("{}. {}", index, title.bold());
        for line in details {
            println!("   {}", line.dimmed());
        }
        println!();
    }

    /// Print a key-value pair (indented)
    pub fn kv(&self, key: &str, value: &str) {
        println!("  {} {}", format!("{}:", key).dimmed(), value);
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
