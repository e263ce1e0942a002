//! Integration tests for grouping glyph boxes into lines.

use deduff::geometry::Rect;
use deduff::layout::{group_into_lines, LineGroupingParams};
use deduff::RecoveryConfig;
use proptest::prelude::*;

fn glyph(x: f32, y: f32) -> Rect {
    Rect::new(x, y, 8.0, 10.0)
}

#[test]
fn test_two_lines_of_text() {
    let boxes = vec![
        glyph(0.0, 100.0),
        glyph(9.0, 100.0),
        glyph(18.0, 101.0),
        glyph(0.0, 80.0),
        glyph(9.0, 80.0),
    ];
    let lines = group_into_lines(&boxes, &LineGroupingParams::default());
    assert_eq!(lines, vec![vec![0, 1, 2], vec![3, 4]]);
}

#[test]
fn test_wide_gap_splits_line() {
    let boxes = vec![glyph(0.0, 0.0), glyph(9.0, 0.0), glyph(60.0, 0.0)];
    let lines = group_into_lines(&boxes, &LineGroupingParams::default());
    assert_eq!(lines, vec![vec![0, 1], vec![2]]);

    let loose = LineGroupingParams::new(8.0, 0.5);
    assert_eq!(group_into_lines(&boxes, &loose), vec![vec![0, 1, 2]]);
}

#[test]
fn test_stacked_glyph_stays_on_line() {
    // A subjoined glyph drawn under the previous one, overlapping it.
    let boxes = vec![glyph(0.0, 0.0), glyph(9.0, 0.0), Rect::new(10.0, -4.0, 6.0, 10.0)];
    let lines = group_into_lines(&boxes, &LineGroupingParams::default());
    assert_eq!(lines, vec![vec![0, 1, 2]]);
}

#[test]
fn test_left_margin_controls_backward_steps() {
    let boxes = vec![glyph(0.0, 0.0), glyph(9.0, 0.0), glyph(18.0, 0.0), glyph(15.0, 0.0)];

    let symmetric = LineGroupingParams::default();
    assert_eq!(group_into_lines(&boxes, &symmetric), vec![vec![0, 1, 2, 3]]);

    let strict_left = LineGroupingParams::default().with_char_margin_left(0.5);
    assert_eq!(group_into_lines(&boxes, &strict_left), vec![vec![0, 1, 2], vec![3]]);
}

#[test]
fn test_params_from_config_json() {
    let config = RecoveryConfig::from_json_str(
        r#"{
            "primary_table": "p.csv",
            "line_grouping": { "char_margin": 3.0, "char_margin_left": 0.25, "line_overlap": 0.4 }
        }"#,
    )
    .unwrap();
    assert_eq!(
        config.line_grouping,
        LineGroupingParams::new(3.0, 0.4).with_char_margin_left(0.25)
    );

    let negative = r#"{
        "primary_table": "p.csv",
        "line_grouping": { "char_margin": -1.0, "char_margin_left": 0.5, "line_overlap": 0.5 }
    }"#;
    assert!(RecoveryConfig::from_json_str(negative).is_err());
}

proptest! {
    #[test]
    fn test_grouping_partitions_input_in_order(
        boxes in prop::collection::vec(
            (0f32..500.0, 0f32..500.0, 1f32..20.0, 1f32..20.0),
            0..64,
        ),
        margin in 0f32..4.0,
        overlap in 0f32..1.0,
    ) {
        let rects: Vec<Rect> = boxes
            .iter()
            .map(|&(x, y, w, h)| Rect::new(x, y, w, h))
            .collect();
        let lines = group_into_lines(&rects, &LineGroupingParams::new(margin, overlap));

        let flattened: Vec<usize> = lines.iter().flatten().copied().collect();
        prop_assert_eq!(flattened, (0..rects.len()).collect::<Vec<_>>());
        prop_assert!(lines.iter().all(|line| !line.is_empty()));
    }
}
