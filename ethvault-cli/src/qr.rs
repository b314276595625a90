//! Terminal QR code rendering for addresses.

use qrcode::types::QrError;
use qrcode::{Color, QrCode};

/// Modules of blank border around the code.
const QUIET_ZONE: usize = 2;

const INDENT: &str = "      ";

/// Render `data` as a QR code made of half-block characters.
///
/// Two module rows share one text line, which keeps the code roughly square
/// in a terminal.
///
/// # Errors
///
/// Returns the encoder error if `data` does not fit in a QR code.
pub fn render(data: &str) -> Result<String, QrError> {
    let code = QrCode::new(data)?;
    let colors = code.to_colors();
    let width = code.width();
    let total = width + QUIET_ZONE * 2;

    let dark = |x: usize, y: usize| -> bool {
        if x < QUIET_ZONE || y < QUIET_ZONE {
            return false;
        }
        let (x, y) = (x - QUIET_ZONE, y - QUIET_ZONE);
        x < width && y < width && colors[y * width + x] == Color::Dark
    };

    let mut out = String::new();
    for y in (0..total).step_by(2) {
        out.push_str(INDENT);
        for x in 0..total {
            out.push(match (dark(x, y), dark(x, y + 1)) {
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

/// Print a QR code for `data`, or a warning if it cannot be encoded.
pub fn render_to_terminal(data: &str) {
    match render(data) {
        Ok(code) => println!("\n{code}"),
        Err(e) => tracing::warn!("failed to generate QR code: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_address() {
        let out = render("0x9858EfFD232B4033E47d90003D41EC34EcaEda94").unwrap();
        let lines: Vec<&str> = out.lines().collect();

        let width = lines[0].chars().count() - INDENT.len();
        assert!(width > QUIET_ZONE * 2);
        assert_eq!(lines.len(), (width + 1) / 2);
        assert!(out.contains('█'));
        assert!(lines.iter().all(|l| l.starts_with(INDENT)));
    }

    #[test]
    fn test_quiet_zone_is_blank() {
        let out = render("0x00").unwrap();
        let first = out.lines().next().unwrap();
        assert!(first.trim().is_empty());
    }

    #[test]
    fn test_too_long_is_an_error() {
        assert!(render(&"x".repeat(8000)).is_err());
    }
}
