//! ANSI coloring for prompts and messages. Escapes appear only when enabled.

const GREEN: &str = "92";
const CYAN: &str = "96";
const YELLOW: &str = "1;33";
const RED: &str = "91";
const MAGENTA: &str = "95";

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Palette {
        Palette { enabled }
    }

    pub fn plain() -> Palette {
        Palette::new(false)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_owned()
        }
    }

    pub fn ok(&self, text: &str) -> String {
        self.paint(text, GREEN)
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(text, CYAN)
    }

    pub fn subject(&self, text: &str) -> String {
        self.paint(text, YELLOW)
    }

    pub fn fail(&self, text: &str) -> String {
        self.paint(text, RED)
    }

    pub fn header(&self, text: &str) -> String {
        self.paint(text, MAGENTA)
    }
}
