//! Property-based tests for the pen protocol crate.
//!
//! Uses proptest to verify motion-path containment, descriptor-builder
//! capacity behavior, and report encoding invariants.

use hid_pen_protocol::report::{BORDER, MAX_X, MAX_Y, REPORT_SIZE};
use hid_pen_protocol::{DescriptorSet, PenPath, PenProtocolError, PenReport};
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    // -- Motion path ----------------------------------------------------------

    /// The pen never leaves [BORDER, MAX - BORDER] on either axis, for any
    /// number of ticks.
    #[test]
    fn prop_path_stays_inside_border(ticks in 0usize..2000) {
        let mut path = PenPath::new();
        for _ in 0..ticks {
            let report = path.step();
            prop_assert!(report.x >= BORDER && report.x <= MAX_X - BORDER,
                "x={} out of bounds", report.x);
            prop_assert!(report.y >= BORDER && report.y <= MAX_Y - BORDER,
                "y={} out of bounds", report.y);
        }
    }

    /// The path is exactly periodic: any multiple of a full lap lands back
    /// on the start state.
    #[test]
    fn prop_path_is_periodic(laps in 1usize..5) {
        let lap = 340; // perimeter / STEP
        let mut path = PenPath::new();
        for _ in 0..laps * lap {
            path.step();
        }
        let report = path.report();
        prop_assert_eq!((report.x, report.y), (BORDER, BORDER));
    }

    // -- Report encoding ------------------------------------------------------

    /// Position and pressure always round-trip through the wire bytes at
    /// their fixed offsets.
    #[test]
    fn prop_report_fields_land_at_fixed_offsets(x: u16, y: u16, pressure: u16) {
        let bytes = PenReport { x, y, pressure, ..PenReport::hovering(0, 0) }.encode();
        prop_assert_eq!(bytes.len(), REPORT_SIZE);
        prop_assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), x);
        prop_assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), y);
        prop_assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), pressure);
    }

    /// The two filler bits above in-range are always clear.
    #[test]
    fn prop_report_padding_bits_clear(tip: bool, barrel: bool, eraser: bool, invert: bool) {
        let report = PenReport {
            tip, barrel, eraser, invert,
            ..PenReport::hovering(0, 0)
        };
        prop_assert_eq!(report.encode()[1] & 0b1101_0000, 0);
    }

    // -- Configuration chain builder ------------------------------------------

    /// The builder fails with BufferTooSmall exactly when capacity is below
    /// the chain size, and the patched total never depends on capacity.
    #[test]
    fn prop_builder_capacity_boundary(capacity in 0usize..128) {
        let set = DescriptorSet::tablet();
        let mut storage = vec![0u8; capacity];
        match set.build_configuration(&mut storage) {
            Ok(total) => {
                prop_assert!(capacity >= DescriptorSet::CONFIGURATION_CHAIN_SIZE);
                prop_assert_eq!(total, DescriptorSet::CONFIGURATION_CHAIN_SIZE);
                let patched = u16::from_le_bytes([storage[2], storage[3]]);
                prop_assert_eq!(patched as usize, total);
            }
            Err(PenProtocolError::BufferTooSmall { .. }) => {
                prop_assert!(capacity < DescriptorSet::CONFIGURATION_CHAIN_SIZE);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
