mod common;

use common::fixtures::*;
use common::{TestResult, build_tree, child};
use serde_json::json;
use trellis::Direction;

#[test]
fn test_absolute_child_uses_leading_offsets() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(
        json!({}),
        vec![node(json!({
            "positionType": "absolute",
            "position": { "left": 10, "top": 20 },
            "width": 30,
            "height": 30
        }))],
    ))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    assert_frame!(tree, child(&tree, root, 0)?, (10.0, 20.0, 30.0, 30.0));
    Ok(())
}

#[test]
fn test_absolute_child_anchors_to_trailing_offsets() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(
        json!({}),
        vec![node(json!({
            "positionType": "absolute",
            "position": { "right": 10, "bottom": 10 },
            "width": 20,
            "height": 20
        }))],
    ))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    assert_frame!(tree, child(&tree, root, 0)?, (70.0, 70.0, 20.0, 20.0));
    Ok(())
}

#[test]
fn test_absolute_child_stretches_between_opposite_offsets() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(
        json!({}),
        vec![json!({ "css": "position: absolute; position-left: 10; position-right: 10; height: 10" })],
    ))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    assert_frame!(tree, child(&tree, root, 0)?, (10.0, 0.0, 80.0, 10.0));
    Ok(())
}

#[test]
fn test_absolute_child_follows_container_alignment() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(
        json!({ "justifyContent": "center", "alignItems": "center" }),
        vec![node(json!({ "positionType": "absolute", "width": 20, "height": 20 }))],
    ))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    assert_frame!(tree, child(&tree, root, 0)?, (40.0, 40.0, 20.0, 20.0));
    Ok(())
}

#[test]
fn test_absolute_child_does_not_take_flow_space() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(
        json!({ "flexDirection": "row" }),
        vec![
            node(json!({ "positionType": "absolute", "width": 50, "height": 50 })),
            node(json!({ "width": 10 })),
        ],
    ))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    assert_frame!(tree, child(&tree, root, 0)?, (0.0, 0.0, 50.0, 50.0));
    assert_frame!(tree, child(&tree, root, 1)?, (0.0, 0.0, 10.0, 100.0));
    Ok(())
}

#[test]
fn test_absolute_child_percentages_use_the_container() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(container(
        json!({ "width": 200, "height": 100 }),
        vec![node(json!({
            "positionType": "absolute",
            "position": { "left": "10%", "top": "10%" },
            "width": "50%",
            "height": "50%"
        }))],
    ))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    assert_frame!(tree, child(&tree, root, 0)?, (20.0, 10.0, 100.0, 50.0));
    Ok(())
}
