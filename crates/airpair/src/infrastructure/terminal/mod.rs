//! Terminal output of the pairing credential.
//!
//! The credential is shown as a QR code made of Unicode half-block characters
//! (two QR modules per character cell vertically), centred in the terminal on
//! the alternate screen.  The phone's "Pair device with QR code" scanner reads
//! it straight off the screen.
//!
//! Colours are inverted (light modules drawn as blocks) because most terminals
//! use a dark background; the quiet zone then renders as a bright frame that
//! scanners lock onto.  Its width in modules is configurable (`--qr-border`);
//! one module is enough for phone scanners and keeps the code small.

use std::io::{stdout, Write};

use airpair_core::PairingCredential;
use crossterm::{
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use qrcode::{Color, QrCode};
use thiserror::Error;
use tracing::debug;

/// Default quiet-zone width around the QR code, in modules.
pub const DEFAULT_QR_BORDER: u32 = 1;

/// Terminal size assumed when the real size cannot be queried.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Error type for credential display.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The payload could not be encoded as a QR code.
    #[error("failed to encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// Writing to the terminal failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders `payload` as a Unicode QR code surrounded by `border` light
/// modules.
///
/// Each character cell holds two module rows.  Light modules are drawn, dark
/// ones are left as terminal background.
///
/// # Errors
///
/// Returns [`DisplayError::Encode`] if the payload does not fit in a QR code.
pub fn render_qr(payload: &str, border: u32) -> Result<String, DisplayError> {
    let code = QrCode::new(payload.as_bytes())?;
    let width = code.width();
    let colors = code.to_colors();
    let border = border as usize;
    let side = width + 2 * border;

    let is_light = |x: usize, y: usize| -> bool {
        if y >= side {
            return false;
        }
        if x < border || y < border || x >= border + width || y >= border + width {
            return true;
        }
        colors[(y - border) * width + (x - border)] == Color::Light
    };

    let mut out = String::with_capacity((side + 1) * side.div_ceil(2) * 3);
    for y in (0..side).step_by(2) {
        for x in 0..side {
            out.push(match (is_light(x, y), is_light(x, y + 1)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
    }
    Ok(out)
}

/// Pads `text` so it sits in the middle of a `cols` x `rows` terminal.
///
/// Text wider or taller than the terminal is left-aligned or top-aligned.
pub fn center(text: &str, cols: u16, rows: u16) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let top = (rows as usize).saturating_sub(lines.len()) / 2;

    let mut out = "\n".repeat(top);
    for line in lines {
        let left = (cols as usize).saturating_sub(line.chars().count()) / 2;
        out.push_str(&" ".repeat(left));
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Shows the credential on stdout.
///
/// With `show_qr` the QR code, framed by `qr_border` light modules, is
/// centred in the terminal; otherwise the raw payload and the two credential
/// fields are printed for manual entry.
///
/// # Errors
///
/// Returns [`DisplayError`] if encoding or writing fails.
pub fn show_pairing_code(
    credential: &PairingCredential,
    show_qr: bool,
    qr_border: u32,
) -> Result<(), DisplayError> {
    let mut out = stdout().lock();

    if show_qr {
        let (cols, rows) = terminal::size().unwrap_or(FALLBACK_SIZE);
        debug!(cols, rows, "terminal size");
        let qr = render_qr(&credential.qr_payload(), qr_border)?;
        write!(out, "{}", center(&qr, cols, rows))?;
    } else {
        writeln!(out, "{}", credential.qr_payload())?;
        writeln!(out, "network: {}", credential.network_name())?;
        writeln!(out, "password: {}", credential.password())?;
    }

    out.flush()?;
    Ok(())
}

/// Keeps the terminal on the alternate screen until dropped.
pub struct AlternateScreen {
    _private: (),
}

impl AlternateScreen {
    /// Switches to the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Io`] if the escape sequence cannot be written.
    pub fn enter() -> Result<Self, DisplayError> {
        stdout().execute(EnterAlternateScreen)?;
        Ok(Self { _private: () })
    }
}

impl Drop for AlternateScreen {
    fn drop(&mut self) {
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_qr_produces_block_characters() {
        // Arrange
        let payload = "WIFI:T:ADB;S:ADB_WIFI_abcDE;P:fGhIj;;";

        // Act
        let qr = render_qr(payload, DEFAULT_QR_BORDER).expect("short payload encodes");

        // Assert
        assert!(qr.lines().count() > 10);
        assert!(qr.chars().any(|c| matches!(c, '█' | '▀' | '▄')));
    }

    #[test]
    fn test_rendered_rows_have_equal_width() {
        let qr = render_qr("WIFI:T:ADB;S:ADB_WIFI_abcDE;P:fGhIj;;", DEFAULT_QR_BORDER).unwrap();
        let widths: Vec<usize> = qr.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_oversized_payload_is_an_encode_error() {
        let payload = "A".repeat(8000);
        assert!(matches!(render_qr(&payload, 1), Err(DisplayError::Encode(_))));
    }

    #[test]
    fn test_border_widens_the_code_by_two_modules_per_step() {
        // Arrange
        let payload = "WIFI:T:ADB;S:ADB_WIFI_abcDE;P:fGhIj;;";

        // Act
        let narrow = render_qr(payload, 1).unwrap();
        let wide = render_qr(payload, 3).unwrap();

        // Assert
        let width = |qr: &str| qr.lines().next().unwrap().chars().count();
        assert_eq!(width(&wide), width(&narrow) + 4);
    }

    #[test]
    fn test_border_rows_are_fully_light() {
        let qr = render_qr("WIFI:T:ADB;S:ADB_WIFI_abcDE;P:fGhIj;;", 2).unwrap();
        let first = qr.lines().next().unwrap();
        assert!(first.chars().all(|c| c == '█'));
    }

    #[test]
    fn test_zero_border_starts_with_dark_finder_corner() {
        // The top-left module of every QR code belongs to a dark finder pattern.
        let qr = render_qr("WIFI:T:ADB;S:ADB_WIFI_abcDE;P:fGhIj;;", 0).unwrap();
        assert_eq!(qr.chars().next(), Some(' '));
    }

    #[test]
    fn test_center_pads_horizontally_and_vertically() {
        // Arrange
        let text = "ab\ncd";

        // Act
        let centered = center(text, 10, 6);

        // Assert
        assert_eq!(centered, "\n\n    ab\n    cd\n");
    }

    #[test]
    fn test_center_never_pads_text_larger_than_terminal() {
        let text = "abcdefghij\nabcdefghij\nabcdefghij";
        let centered = center(text, 4, 2);
        assert_eq!(centered, "abcdefghij\nabcdefghij\nabcdefghij\n");
    }

    #[test]
    fn test_center_counts_characters_not_bytes() {
        let centered = center("██", 6, 1);
        assert_eq!(centered, "  ██\n");
    }
}
