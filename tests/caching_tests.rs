mod common;

use common::fixtures::*;
use common::{TestResult, build_into, build_tree, child};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use trellis::{
    CloneNodeFunc, DirtiedFunc, Direction, LayoutConfig, LayoutTree, MeasureFunc, MeasureMode,
    Node, NodeId, Size, Value,
};

fn counting_measure(calls: &Rc<Cell<usize>>) -> MeasureFunc {
    let calls = Rc::clone(calls);
    Rc::new(
        move |_: &Node, width: f32, width_mode: MeasureMode, _: f32, _: MeasureMode| {
            calls.set(calls.get() + 1);
            let width = match width_mode {
                MeasureMode::Undefined => 40.0,
                _ => width.min(40.0),
            };
            Size::new(width, 10.0)
        },
    )
}

#[test]
fn test_unchanged_tree_is_served_from_cache() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(
        json!({ "flexDirection": "row" }),
        vec![node(json!({ "flexGrow": 1 })), sized(20.0, 20.0)],
    ))?;
    let first = tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert!(first.root_revisited);
    assert!(first.nodes_visited > 0);

    let second = tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert!(!second.root_revisited);
    assert_eq!(second.nodes_visited, 0);
    assert_eq!(second.cache_hits, 1);
    assert_frame!(tree, child(&tree, root, 0)?, (0.0, 0.0, 80.0, 100.0));
    Ok(())
}

#[test]
fn test_changed_direction_forces_a_new_pass() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(
        json!({ "flexDirection": "row" }),
        vec![node(json!({ "width": 10 }))],
    ))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert_frame!(tree, child(&tree, root, 0)?, (0.0, 0.0, 10.0, 100.0));

    let stats = tree.calculate_layout(root, None, None, Direction::Rtl)?;
    assert!(stats.root_revisited);
    assert_frame!(tree, child(&tree, root, 0)?, (90.0, 0.0, 10.0, 100.0));
    Ok(())
}

#[test]
fn test_measure_results_are_reused_until_marked_dirty() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let calls = Rc::new(Cell::new(0));
    let mut tree = LayoutTree::new();
    let root = build_into(&mut tree, square_root(json!({ "alignItems": "flex-start" }), vec![]))?;
    let leaf = tree.new_node();
    tree.set_measure_func(leaf, Some(counting_measure(&calls)))?;
    tree.add_child(root, leaf)?;

    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    let after_first = calls.get();
    assert!(after_first > 0);
    assert_frame!(tree, leaf, (0.0, 0.0, 40.0, 10.0));

    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert_eq!(calls.get(), after_first);

    tree.mark_dirty(leaf)?;
    assert!(tree.is_dirty(root)?);
    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert!(calls.get() > after_first);
    assert!(!tree.is_dirty(leaf)?);
    Ok(())
}

#[test]
fn test_mark_dirty_needs_a_measure_function() -> TestResult {
    let mut tree = LayoutTree::new();
    let node = tree.new_node();
    assert!(tree.mark_dirty(node).is_err());
    Ok(())
}

#[test]
fn test_style_changes_dirty_ancestors_only_when_different() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(json!({}), vec![sized(10.0, 10.0)]))?;
    let leaf = child(&tree, root, 0)?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert!(!tree.is_dirty(root)?);

    tree.update_style(leaf, |style| style.width = Value::point(10.0))?;
    assert!(!tree.is_dirty(root)?);

    tree.update_style(leaf, |style| style.width = Value::point(30.0))?;
    assert!(tree.is_dirty(leaf)?);
    assert!(tree.is_dirty(root)?);

    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert!(!tree.is_dirty(root)?);
    assert_frame!(tree, leaf, (0.0, 0.0, 30.0, 10.0));
    Ok(())
}

#[test]
fn test_has_new_layout_is_left_for_the_caller_to_clear() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(json!({}), vec![sized(10.0, 10.0)]))?;
    let leaf = child(&tree, root, 0)?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert!(tree.has_new_layout(root)?);
    assert!(tree.has_new_layout(leaf)?);

    tree.set_has_new_layout(root, false)?;
    tree.set_has_new_layout(leaf, false)?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    // Only the root is revisited on a cache hit.
    assert!(tree.has_new_layout(root)?);
    assert!(!tree.has_new_layout(leaf)?);
    Ok(())
}

#[test]
fn test_dirtied_callback_fires_once_per_transition() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let calls = Rc::new(Cell::new(0));
    let dirtied_calls = Rc::new(Cell::new(0));
    let mut tree = LayoutTree::new();
    let root = build_into(&mut tree, square_root(json!({}), vec![]))?;
    let leaf = tree.new_node();
    tree.set_measure_func(leaf, Some(counting_measure(&calls)))?;
    let counter = Rc::clone(&dirtied_calls);
    let dirtied: DirtiedFunc = Rc::new(move |_: &Node| counter.set(counter.get() + 1));
    tree.set_dirtied_func(leaf, Some(dirtied))?;
    tree.add_child(root, leaf)?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    tree.mark_dirty(leaf)?;
    tree.mark_dirty(leaf)?;
    assert_eq!(dirtied_calls.get(), 1);

    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    tree.mark_dirty(leaf)?;
    assert_eq!(dirtied_calls.get(), 2);
    Ok(())
}

#[test]
fn test_cloned_root_copies_shared_children_on_layout() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(json!({}), vec![node(json!({ "flexGrow": 1 }))]))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    let original_child = child(&tree, root, 0)?;

    let clone = tree.clone_node(root)?;
    assert_eq!(tree.children(clone)?, tree.children(root)?);
    tree.update_style(clone, |style| style.width = Value::point(200.0))?;
    tree.calculate_layout(clone, None, None, Direction::Ltr)?;

    let cloned_child = child(&tree, clone, 0)?;
    assert_ne!(cloned_child, original_child);
    assert_eq!(tree.parent(cloned_child)?, Some(clone));
    assert_eq!(tree.parent(original_child)?, Some(root));
    assert_frame!(tree, cloned_child, (0.0, 0.0, 200.0, 100.0));
    assert_frame!(tree, original_child, (0.0, 0.0, 100.0, 100.0));
    Ok(())
}

#[test]
fn test_removed_child_no_longer_takes_space() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(container(
        json!({ "flexDirection": "row" }),
        vec![sized(10.0, 10.0), sized(20.0, 10.0)],
    ))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert_frame!(tree, root, (0.0, 0.0, 30.0, 10.0));

    let first = child(&tree, root, 0)?;
    tree.remove_child(root, first)?;
    assert!(tree.is_dirty(root)?);
    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert_frame!(tree, root, (0.0, 0.0, 20.0, 10.0));
    assert_frame!(tree, child(&tree, root, 0)?, (0.0, 0.0, 20.0, 10.0));
    Ok(())
}

#[test]
fn test_clean_sibling_subtree_keeps_its_layout_flags() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let calls = Rc::new(Cell::new(0));
    let mut tree = LayoutTree::new();
    let root = build_into(
        &mut tree,
        square_root(
            json!({ "flexDirection": "row", "alignItems": "flex-start" }),
            vec![container(json!({ "width": 30, "height": 30 }), vec![sized(10.0, 10.0)])],
        ),
    )?;
    let sibling = child(&tree, root, 0)?;
    let nested = child(&tree, sibling, 0)?;
    let leaf = tree.new_node();
    tree.set_measure_func(leaf, Some(counting_measure(&calls)))?;
    tree.insert_child(root, leaf, 0)?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    for id in [root, leaf, sibling, nested] {
        tree.set_has_new_layout(id, false)?;
    }
    tree.mark_dirty(leaf)?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;

    assert!(tree.has_new_layout(leaf)?);
    assert!(!tree.has_new_layout(nested)?);
    assert_frame!(tree, sibling, (40.0, 0.0, 30.0, 30.0));
    Ok(())
}

#[test]
fn test_clone_callback_sees_each_shared_child() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let seen: Rc<RefCell<Vec<(NodeId, usize, bool)>>> = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&seen);
    let on_clone: CloneNodeFunc = Rc::new(move |original: &Node, copy: &Node, owner: NodeId, index: usize| {
        record
            .borrow_mut()
            .push((owner, index, original.style() == copy.style()));
    });
    let mut tree = LayoutTree::with_config(LayoutConfig::default().with_clone_node_func(Some(on_clone)));
    let root = build_into(
        &mut tree,
        square_root(
            json!({ "flexDirection": "row" }),
            vec![sized(10.0, 10.0), sized(20.0, 10.0)],
        ),
    )?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert!(seen.borrow().is_empty());

    let clone = tree.clone_node(root)?;
    tree.update_style(clone, |style| style.height = Value::point(50.0))?;
    tree.calculate_layout(clone, None, None, Direction::Ltr)?;

    assert_eq!(*seen.borrow(), vec![(clone, 0, true), (clone, 1, true)]);
    assert_frame!(tree, child(&tree, clone, 1)?, (10.0, 0.0, 20.0, 10.0));

    tree.calculate_layout(clone, None, None, Direction::Ltr)?;
    assert_eq!(seen.borrow().len(), 2);
    Ok(())
}

#[test]
fn test_reassigning_a_nan_point_keeps_the_tree_clean() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut tree, root) = build_tree(square_root(json!({}), vec![sized(10.0, 10.0)]))?;
    let leaf = child(&tree, root, 0)?;
    tree.update_style(leaf, |style| style.width = Value::Point(f32::NAN))?;
    tree.calculate_layout(root, None, None, Direction::Ltr)?;
    assert!(!tree.is_dirty(root)?);

    tree.update_style(leaf, |style| style.width = Value::Point(f32::NAN))?;
    assert!(!tree.is_dirty(leaf)?);
    assert!(!tree.is_dirty(root)?);
    Ok(())
}
