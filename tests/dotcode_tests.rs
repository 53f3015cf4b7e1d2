use dotcode::{DotCode, Module};

/// Structural invariants every built symbol must satisfy: legal odd-parity
/// dimensions, data confined to the checkerboard, six reserved corner cells
/// and at least one printed dot on each edge.
fn assert_valid(symbol: &DotCode) {
    let (h, w) = (symbol.height(), symbol.width());
    assert!((5..=200).contains(&h), "height {h}");
    assert!((5..=200).contains(&w), "width {w}");
    assert_eq!((h + w) % 2, 1, "dimension parity {h}x{w}");
    assert!(*symbol.mask() < 8);

    let mut corners = 0;
    for r in 0..h {
        for c in 0..w {
            match symbol.get(r, c) {
                Module::Void => assert_eq!((r + c) % 2, 1, "dot off checkerboard at ({r},{c})"),
                Module::Dot(_) => assert_eq!((r + c) % 2, 0, "dot off checkerboard at ({r},{c})"),
                Module::Corner(_) => {
                    assert_eq!((r + c) % 2, 0, "corner off checkerboard at ({r},{c})");
                    corners += 1;
                }
            }
        }
    }
    assert_eq!(corners, 6);

    assert!((0..w).any(|c| symbol.get(0, c).is_dark()), "empty top edge");
    assert!((0..w).any(|c| symbol.get(h - 1, c).is_dark()), "empty bottom edge");
    assert!((0..h).any(|r| symbol.get(r, 0).is_dark()), "empty left edge");
    assert!((0..h).any(|r| symbol.get(r, w - 1).is_dark()), "empty right edge");
}

#[cfg(test)]
mod dotcode_proptests {

    use prop::string::string_regex;
    use proptest::prelude::*;

    use dotcode::DotCodeBuilder;

    use crate::assert_valid;

    proptest! {
        #[test]
        fn proptest_any_bytes(data in prop::collection::vec(any::<u8>(), 0..400)) {
            let symbol = DotCodeBuilder::new(&data).build().unwrap();
            assert_valid(&symbol);
        }

        #[test]
        fn proptest_numeric(data in string_regex("[0-9]{1,300}").unwrap()) {
            let symbol = DotCodeBuilder::new(data.as_bytes()).build().unwrap();
            assert_valid(&symbol);
        }

        #[test]
        fn proptest_printable_text(data in string_regex("[ -~]{1,200}").unwrap()) {
            let symbol = DotCodeBuilder::new(data.as_bytes()).build().unwrap();
            assert_valid(&symbol);
        }

        #[test]
        fn proptest_gs1(data in string_regex(r"[0-9]{2,4}(\x1d[0-9A-Z]{1,20}){0,3}").unwrap()) {
            let symbol = DotCodeBuilder::new(data.as_bytes()).gs1(true).build().unwrap();
            assert_valid(&symbol);
        }

        #[test]
        fn proptest_fixed_width(
            data in prop::collection::vec(any::<u8>(), 0..60),
            width in 20usize..=60,
        ) {
            let symbol = DotCodeBuilder::new(&data).width(width).build().unwrap();
            prop_assert_eq!(symbol.width(), width);
            assert_valid(&symbol);
        }

        #[test]
        fn proptest_deterministic(data in prop::collection::vec(any::<u8>(), 0..150)) {
            let a = DotCodeBuilder::new(&data).build().unwrap();
            let b = DotCodeBuilder::new(&data).build().unwrap();
            prop_assert_eq!(*a.mask(), *b.mask());
            prop_assert_eq!(a.grid(), b.grid());
        }
    }
}

#[cfg(test)]
mod dotcode_tests {
    use test_case::test_case;

    use dotcode::{Axis, DotCodeBuilder, DotCodeError, Segment, Warning};

    use crate::assert_valid;

    #[test_case(b"" as &[u8], 7, 10; "empty message")]
    #[test_case(b"123456789012" as &[u8], 12, 19; "numeric pairs")]
    #[test_case(b"ABCDEFGHIJKL" as &[u8], 16, 25; "text latch")]
    fn test_auto_size(data: &[u8], height: usize, width: usize) {
        let symbol = DotCodeBuilder::new(data).build().unwrap();
        assert_eq!(symbol.height(), height);
        assert_eq!(symbol.width(), width);
        assert_valid(&symbol);
    }

    #[test]
    fn test_numeric_beats_text_for_same_length() {
        let digits = DotCodeBuilder::new(b"123456789012").build().unwrap();
        let letters = DotCodeBuilder::new(b"ABCDEFGHIJKL").build().unwrap();
        assert!(digits.height() * digits.width() < letters.height() * letters.width());
    }

    #[test_case(5; "narrowest")]
    #[test_case(40; "mid")]
    #[test_case(200; "widest")]
    fn test_fixed_width_is_honored(width: usize) {
        let symbol = DotCodeBuilder::new(b"fixed shape").width(width).build().unwrap();
        assert_eq!(symbol.width(), width);
        assert_valid(&symbol);
    }

    #[test]
    fn test_mask_override() {
        for mask in 0..8u8 {
            let symbol = DotCodeBuilder::new(b"mask me").mask(mask).build().unwrap();
            assert_eq!(*symbol.mask(), mask);
            assert_valid(&symbol);
        }
    }

    #[test]
    fn test_multi_segment_eci() {
        let mut builder = DotCodeBuilder::new(b"latin ");
        builder.eci(3).add_segment(Segment::with_eci("кириллица".as_bytes(), 7));
        let symbol = builder.build().unwrap();
        assert_valid(&symbol);
    }

    #[test]
    fn test_structured_append_parts_differ() {
        let first = DotCodeBuilder::new(b"payload").structured_append(1, 3).build().unwrap();
        let second = DotCodeBuilder::new(b"payload").structured_append(2, 3).build().unwrap();
        assert_ne!(first.grid(), second.grid());
        assert_valid(&first);
        assert_valid(&second);
    }

    #[test]
    fn test_macro_message() {
        let symbol = DotCodeBuilder::new(b"[)>\x1e05\x1dPAYLOAD\x1e\x04").build().unwrap();
        assert_valid(&symbol);
    }

    #[test]
    fn test_gs1_with_eci_warns_but_builds() {
        let symbol = DotCodeBuilder::new(b"0104912345123459").gs1(true).eci(26).build().unwrap();
        assert_eq!(symbol.warnings(), [Warning::EciWithGs1]);
        assert_valid(&symbol);
    }

    #[test]
    fn test_width_out_of_range_fails_fast() {
        let err = DotCodeBuilder::new(b"data").width(4).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidWidth(4));
        let err = DotCodeBuilder::new(b"data").width(201).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidWidth(201));
    }

    #[test]
    fn test_structured_append_index_beyond_count() {
        let err = DotCodeBuilder::new(b"data").structured_append(9, 4).build().unwrap_err();
        assert_eq!(err, DotCodeError::InvalidStructuredAppend { index: 9, count: 4 });
    }

    #[test]
    fn test_oversized_message_exceeds_capacity() {
        let data = vec![0xAAu8; 6000];
        let err = DotCodeBuilder::new(&data).build().unwrap_err();
        assert!(matches!(err, DotCodeError::CapacityExceeded { .. }));
    }

    #[test]
    fn test_narrow_width_exceeds_height() {
        let data = vec![b'7'; 800];
        let err = DotCodeBuilder::new(&data).width(5).build().unwrap_err();
        assert!(matches!(err, DotCodeError::CapacityExceeded { axis: Axis::Height, .. }));
    }
}
