//! Textual progress bar
//!
//! ```text
//! \r/ |=========================>                         |  50.00 %
//! ```
//!
//! Frames are redrawn in place with a leading carriage return. When
//! `value == max` a fixed completion line is printed instead and left on
//! screen.

use parking_lot::Mutex;
use std::io::{self, Write};

/// Columns covered by fill + padding; the `>` marker is drawn in addition.
pub const BAR_WIDTH: usize = 50;

pub const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

pub fn spinner_frame(value: u64) -> char {
    SPINNER_FRAMES[(value % 4) as usize]
}

pub fn percent(value: u64, max: u64) -> f64 {
    value as f64 * 100.0 / max as f64
}

/// `floor(percent / 2)`, clamped to the bar width.
pub fn filled_columns(percent: f64) -> usize {
    let cols = (percent / 2.0).floor();
    if cols <= 0.0 {
        0
    } else {
        (cols as usize).min(BAR_WIDTH)
    }
}

pub fn completion_line() -> String {
    format!("\r* |{}>| 100.00 %\n\n", "=".repeat(BAR_WIDTH))
}

/// Render one frame. `None` when `max` is zero.
pub fn render(value: u64, max: u64) -> Option<String> {
    if max == 0 {
        return None;
    }
    if value == max {
        return Some(completion_line());
    }

    let pct = percent(value, max);
    let fill = filled_columns(pct);
    Some(format!(
        "\r{} |{}>{}| {:6.2} %",
        spinner_frame(value),
        "=".repeat(fill),
        " ".repeat(BAR_WIDTH - fill),
        pct
    ))
}

/// Writes frames to the diagnostic stream, flushing after each one.
pub struct ProgressRenderer {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::stderr()
    }
}

impl ProgressRenderer {
    /// Progress goes to stderr so redirected stdout stays clean.
    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn draw(&self, value: u64, max: u64) {
        let Some(frame) = render(value, max) else {
            log::warn!("progress called with max == 0 (value {value}), ignoring");
            return;
        };

        let mut out = self.out.lock();
        // Output errors are swallowed; progress must never take the process down.
        let _ = out.write_all(frame.as_bytes());
        let _ = out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Text between the bar's pipes; skips "\r<frame> " since the frame may be '|'.
    fn bar_of(frame: &str) -> &str {
        let rest = &frame[3..];
        let start = rest.find('|').unwrap() + 1;
        let end = rest.rfind('|').unwrap();
        &rest[start..end]
    }

    #[test]
    fn test_scenario_frames() {
        let zero = render(0, 200).unwrap();
        assert_eq!(zero, format!("\r| |>{}|   0.00 %", " ".repeat(50)));

        let half = render(100, 200).unwrap();
        assert_eq!(
            half,
            format!("\r| |{}>{}|  50.00 %", "=".repeat(25), " ".repeat(25))
        );

        assert_eq!(render(200, 200).unwrap(), completion_line());
    }

    #[test]
    fn test_completion_line_is_exact() {
        assert_eq!(
            completion_line(),
            "\r* |==================================================>| 100.00 %\n\n"
        );
        assert_eq!(render(1, 1).unwrap(), completion_line());
        assert_eq!(render(u32::MAX as u64, u32::MAX as u64).unwrap(), completion_line());
    }

    #[test]
    fn test_bar_width_is_constant() {
        for max in [1u64, 3, 7, 100, 200, 1_000, 65_535] {
            for value in 0..max.min(400) {
                let frame = render(value, max).unwrap();
                let bar = bar_of(&frame);
                assert_eq!(bar.chars().count(), BAR_WIDTH + 1, "value={value} max={max}");
                assert_eq!(bar.chars().filter(|c| *c == '>').count(), 1);
            }
        }
    }

    #[test]
    fn test_percent_is_monotonic() {
        let max = 997;
        let mut last = -1.0;
        let mut last_fill = 0;
        for value in 0..=max {
            let pct = percent(value, max);
            assert!(pct >= last);
            let fill = filled_columns(pct);
            assert!(fill >= last_fill);
            last = pct;
            last_fill = fill;
        }
    }

    #[test]
    fn test_spinner_cycles_in_order() {
        let frames: Vec<char> = (0..8).map(spinner_frame).collect();
        assert_eq!(frames, vec!['|', '/', '-', '\\', '|', '/', '-', '\\']);
        for value in 0..20u64 {
            let frame = render(value, 20).unwrap();
            assert_eq!(frame.chars().nth(1), Some(spinner_frame(value)));
        }
    }

    #[test]
    fn test_fill_is_clamped_past_max() {
        assert_eq!(filled_columns(250.0), BAR_WIDTH);
        assert_eq!(filled_columns(-3.0), 0);
        let over = render(300, 200).unwrap();
        assert_eq!(bar_of(&over).chars().count(), BAR_WIDTH + 1);
    }

    #[test]
    fn test_zero_max_renders_nothing() {
        assert!(render(0, 0).is_none());
        assert!(render(5, 0).is_none());
    }

    #[derive(Clone, Default)]
    struct Shared(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_renderer_writes_frames() {
        let sink = Shared::default();
        let renderer = ProgressRenderer::new(Box::new(sink.clone()));
        renderer.draw(1, 2);
        renderer.draw(0, 0);
        renderer.draw(2, 2);

        let written = String::from_utf8(sink.0.lock().clone()).unwrap();
        assert_eq!(
            written,
            format!("{}{}", render(1, 2).unwrap(), completion_line())
        );
    }
}
