//! Clipboard via OSC 52
//!
//! The terminal emulator owns the system clipboard; writing the escape
//! sequence asks it to set the selection. Works over SSH and inside tmux
//! (with `set-clipboard on`).

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::io::{self, Write};

/// Escape sequence that sets the clipboard to `text`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

/// Write `text` to the terminal clipboard through `out`
pub fn copy_to_clipboard<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(osc52_sequence(text).as_bytes())?;
    out.flush()?;
    tracing::debug!(chars = text.chars().count(), "Copied to clipboard");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_encodes_utf8() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
        let seq = osc52_sequence("動画");
        let payload = &seq[7..seq.len() - 1];
        assert_eq!(STANDARD.decode(payload).unwrap(), "動画".as_bytes());
    }

    #[test]
    fn test_copy_writes_sequence() {
        let mut out = Vec::new();
        copy_to_clipboard(&mut out, "x").unwrap();
        assert_eq!(out, osc52_sequence("x").into_bytes());
    }
}
