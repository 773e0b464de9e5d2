use super::*;

parameterized_test! {can_detect_window_intersection, (left, right, expected), {
    assert_eq!(TimeWindow::new(left.0, left.1).intersects(&TimeWindow::new(right.0, right.1)), expected);
}}

can_detect_window_intersection! {
    case01_overlapping: ((0., 10.), (5., 15.), true),
    case02_touching: ((0., 10.), (10., 20.), true),
    case03_disjoint: ((0., 10.), (11., 20.), false),
    case04_contained: ((0., 10.), (2., 3.), true),
    case05_reversed: ((11., 20.), (0., 10.), false),
}

#[test]
fn can_check_window_contains() {
    let window = TimeWindow::new(5., 10.);

    assert!(window.contains(5.));
    assert!(window.contains(7.));
    assert!(window.contains(10.));
    assert!(!window.contains(4.));
    assert!(!window.contains(11.));
}

#[test]
fn can_get_window_duration() {
    assert_eq!(TimeWindow::new(100., 350.).duration(), 250.);
}
