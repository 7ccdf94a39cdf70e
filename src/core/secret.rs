// Rolling-buffer matcher over a key-event stream.

/// Watches a stream of key names for a fixed code, case-insensitively.
///
/// The buffer is bounded at the code length and left-trimmed on every push,
/// so a mismatch can never lock the detector out. On a match the buffer is
/// cleared: a repeated trailing character cannot re-fire without the full
/// sequence being typed again.
pub struct SecretCodeDetector {
    code: Vec<char>,
    buffer: Vec<char>,
}

impl SecretCodeDetector {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.chars().map(|c| c.to_ascii_lowercase()).collect(),
            buffer: Vec::new(),
        }
    }

    /// Feed one key event; returns true when the code just completed.
    /// Multi-character key names ("Shift", "ArrowUp", ...) are ignored.
    pub fn push(&mut self, key: &str) -> bool {
        let mut chars = key.chars();
        let c = match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_ascii_lowercase(),
            _ => return false,
        };
        self.buffer.push(c);
        if self.buffer.len() > self.code.len() {
            self.buffer.remove(0);
        }
        if self.buffer == self.code {
            self.buffer.clear();
            true
        } else {
            false
        }
    }
}
