//! Pen input report and the rectangular demo motion path.

/// Report id carried in byte 0 of every input report.
pub const REPORT_ID: u8 = 6;
/// Encoded input report size in bytes.
pub const REPORT_SIZE: usize = 8;

/// Margin kept between the path and the active-area edges.
pub const BORDER: u16 = 2000;
/// Active-area width (matches the report descriptor's X logical maximum).
pub const MAX_X: u16 = 16000;
/// Active-area height (matches the report descriptor's Y logical maximum).
pub const MAX_Y: u16 = 9000;
/// Distance moved per tick.
pub const STEP: u16 = 100;

/// One pen input report: six switches plus absolute position and pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenReport {
    pub tip: bool,
    pub barrel: bool,
    pub eraser: bool,
    pub invert: bool,
    pub in_range: bool,
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
}

impl PenReport {
    /// A hovering pen (in range, nothing pressed) at the given position.
    pub fn hovering(x: u16, y: u16) -> Self {
        Self {
            tip: false,
            barrel: false,
            eraser: false,
            invert: false,
            in_range: true,
            x,
            y,
            pressure: 0,
        }
    }

    /// Serialize to the fixed 8-byte wire form.
    ///
    /// Byte 1 packs the switches: bit 0 tip, bit 1 barrel, bit 2 eraser,
    /// bit 3 invert, bit 4 constant pad, bit 5 in-range; bits 6–7 are the
    /// report descriptor's two constant filler bits.
    pub fn encode(&self) -> [u8; REPORT_SIZE] {
        let mut switches = 0u8;
        if self.tip {
            switches |= 1 << 0;
        }
        if self.barrel {
            switches |= 1 << 1;
        }
        if self.eraser {
            switches |= 1 << 2;
        }
        if self.invert {
            switches |= 1 << 3;
        }
        if self.in_range {
            switches |= 1 << 5;
        }
        let [x0, x1] = self.x.to_le_bytes();
        let [y0, y1] = self.y.to_le_bytes();
        let [p0, p1] = self.pressure.to_le_bytes();
        [REPORT_ID, switches, x0, x1, y0, y1, p0, p1]
    }
}

/// Which edge of the rectangle the pen is currently tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionPhase {
    #[default]
    Right,
    Down,
    Left,
    Up,
}

/// Closed rectangular path just inside the active-area perimeter.
///
/// Starts at (BORDER, BORDER) moving right; each [`step`](Self::step)
/// advances one STEP along the current edge and turns the corner when the
/// edge limit is reached. The walk is exactly periodic: it returns to its
/// start state after a full lap.
#[derive(Debug, Clone, Copy)]
pub struct PenPath {
    report: PenReport,
    phase: MotionPhase,
}

impl PenPath {
    /// Path at its canonical start: top-left corner, heading right.
    pub fn new() -> Self {
        Self {
            report: PenReport::hovering(BORDER, BORDER),
            phase: MotionPhase::Right,
        }
    }

    /// Current report state (position of the last step).
    pub fn report(&self) -> PenReport {
        self.report
    }

    /// Current motion phase.
    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// Advance one tick and return the report to emit.
    pub fn step(&mut self) -> PenReport {
        match self.phase {
            MotionPhase::Right => {
                self.report.x += STEP;
                if self.report.x >= MAX_X - BORDER {
                    self.phase = MotionPhase::Down;
                }
            }
            MotionPhase::Down => {
                self.report.y += STEP;
                if self.report.y >= MAX_Y - BORDER {
                    self.phase = MotionPhase::Left;
                }
            }
            MotionPhase::Left => {
                self.report.x -= STEP;
                if self.report.x <= BORDER {
                    self.phase = MotionPhase::Up;
                }
            }
            MotionPhase::Up => {
                self.report.y -= STEP;
                if self.report.y <= BORDER {
                    self.phase = MotionPhase::Right;
                }
            }
        }
        self.report
    }
}

impl Default for PenPath {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_8_bytes_little_endian() {
        let report = PenReport {
            tip: true,
            barrel: false,
            eraser: false,
            invert: false,
            in_range: true,
            x: 0x1234,
            y: 0x0567,
            pressure: 0x03FF,
        };
        assert_eq!(
            report.encode(),
            [6, 0b0010_0001, 0x34, 0x12, 0x67, 0x05, 0xFF, 0x03]
        );
    }

    #[test]
    fn hovering_report_sets_only_in_range() {
        let bytes = PenReport::hovering(2000, 2000).encode();
        assert_eq!(bytes[0], REPORT_ID);
        assert_eq!(bytes[1], 0b0010_0000);
    }

    #[test]
    fn first_step_moves_right_from_start() {
        let mut path = PenPath::new();
        let report = path.step();
        assert_eq!((report.x, report.y), (BORDER + STEP, BORDER));
        assert_eq!(path.phase(), MotionPhase::Right);
    }

    #[test]
    fn full_lap_returns_to_start_state() {
        let mut path = PenPath::new();
        let start = (path.report().x, path.report().y, path.phase());
        // Perimeter: two horizontal edges of (MAX_X - 2*BORDER) and two
        // vertical edges of (MAX_Y - 2*BORDER), STEP units per tick.
        let lap = 2 * ((MAX_X - 2 * BORDER) / STEP + (MAX_Y - 2 * BORDER) / STEP) as usize;
        for _ in 0..lap {
            path.step();
        }
        assert_eq!((path.report().x, path.report().y, path.phase()), start);
    }

    #[test]
    fn corners_turn_in_order() {
        let mut path = PenPath::new();
        let mut phases = vec![path.phase()];
        for _ in 0..400 {
            path.step();
            if *phases.last().unwrap() != path.phase() {
                phases.push(path.phase());
            }
        }
        assert_eq!(
            &phases[..5],
            &[
                MotionPhase::Right,
                MotionPhase::Down,
                MotionPhase::Left,
                MotionPhase::Up,
                MotionPhase::Right,
            ]
        );
    }
}
