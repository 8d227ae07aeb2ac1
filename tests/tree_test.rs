//! Tests for the forest state machine and its propagation rules

use rstest::{fixture, rstest};

use treehouse::domain::{
    Animation, CheckOptions, Expansion, Interaction, NodeDescription, NodeId, NodeKey, Tree,
    TreeOptions,
};
use treehouse::util::testing::{init_test_setup, sample_forest};

#[fixture]
fn chain() -> Tree {
    init_test_setup();
    let mut tree = Tree::default();
    tree.build(&[NodeDescription::new("root").with_id("root").with_nodes(vec![
        NodeDescription::new("A").with_id("a").with_nodes(vec![NodeDescription::new("B")
            .with_id("b")
            .with_nodes(vec![NodeDescription::new("leaf").with_id("leaf")])]),
    ])]);
    tree.settle().unwrap();
    tree
}

fn key(tree: &Tree, id: impl Into<NodeId>) -> NodeKey {
    tree.require(&id.into()).unwrap()
}

fn checked(tree: &Tree, id: impl Into<NodeId>) -> bool {
    tree.get(&id.into()).unwrap().is_checked()
}

fn built(options: TreeOptions, description: &[NodeDescription]) -> Tree {
    init_test_setup();
    let mut tree = Tree::new(options);
    tree.build(description);
    tree.settle().unwrap();
    tree
}

// ============================================================
// Construction and queries
// ============================================================

#[test]
fn given_empty_description_when_building_then_forest_is_empty() {
    let tree = built(TreeOptions::default(), &[]);

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.iter().count(), 0);
    assert!(tree.get(&"anything".into()).is_none());
    assert!(tree.to_serializable().is_empty());
}

#[test]
fn given_single_node_when_building_then_one_root_without_children() {
    let tree = built(
        TreeOptions::default(),
        &[NodeDescription::new("only").with_id(7i64)],
    );

    let nodes: Vec<_> = tree.nodes().collect();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].label(), "only");
    assert!(!nodes[0].has_children());
    assert!(nodes[0].parent().is_none());
}

#[test]
fn given_sample_forest_when_iterating_then_pre_order_in_input_order() {
    let tree = built(TreeOptions::default(), &sample_forest());

    let labels: Vec<&str> = tree.iter().map(|n| n.label()).collect();
    assert_eq!(
        labels,
        vec!["Fruit", "Apple", "Citrus", "Lemon", "Lime", "Heading", "Tools"]
    );

    let mut visited = Vec::new();
    tree.each(|n| visited.push(n.label().to_string()));
    assert_eq!(visited, labels);

    let joined = tree.reduce(String::new(), |acc, n| acc + &n.label()[..1]);
    assert_eq!(joined, "FACLLHT");
}

#[test]
fn given_node_when_walking_subtree_then_starts_at_node() {
    let tree = built(TreeOptions::default(), &sample_forest());
    let citrus = tree.get(&"citrus".into()).unwrap();

    let labels: Vec<&str> = citrus.iter().map(|n| n.label()).collect();
    assert_eq!(labels, vec!["Citrus", "Lemon", "Lime"]);
    assert_eq!(citrus.reduce(0, |acc, _| acc + 1), 3);
    assert_eq!(citrus.parent().unwrap().label(), "Fruit");
    assert!(citrus.get(&"apple".into()).is_none());
}

#[rstest]
#[case(NodeId::from("fruit"), "Fruit", 0)]
#[case(NodeId::from("citrus"), "Citrus", 1)]
#[case(NodeId::from(2i64), "Lime", 2)]
#[case(NodeId::from("tools"), "Tools", 1)]
fn given_existing_id_when_getting_then_returns_node_at_any_depth(
    #[case] id: NodeId,
    #[case] label: &str,
    #[case] depth: usize,
) {
    let tree = built(TreeOptions::default(), &sample_forest());

    let node = tree.get(&id).unwrap();
    assert_eq!(node.label(), label);
    assert_eq!(node.depth(), depth);
    assert_eq!(node.id(), Some(&id));
}

#[rstest]
#[case(NodeId::from("missing"))]
#[case(NodeId::from("1"))]
#[case(NodeId::from(42i64))]
fn given_unknown_id_when_getting_then_none(#[case] id: NodeId) {
    let tree = built(TreeOptions::default(), &sample_forest());

    assert!(tree.get(&id).is_none());
    assert!(tree.require(&id).is_err());
}

#[test]
fn given_duplicate_ids_when_getting_then_first_in_pre_order() {
    let tree = built(
        TreeOptions::default(),
        &[
            NodeDescription::new("first")
                .with_id("dup")
                .with_nodes(vec![NodeDescription::new("nested").with_id("dup")]),
            NodeDescription::new("second").with_id("dup"),
        ],
    );

    assert_eq!(tree.get(&"dup".into()).unwrap().label(), "first");
}

// ============================================================
// Propagation
// ============================================================

#[rstest]
fn given_chain_when_checking_leaf_then_all_ancestors_checked(mut chain: Tree) {
    let leaf = key(&chain, "leaf");

    chain.check(leaf, CheckOptions::default()).unwrap();

    for id in ["leaf", "b", "a", "root"] {
        assert!(checked(&chain, id), "{} should be checked", id);
    }
}

#[test]
fn given_child_updates_parent_off_when_checking_leaf_then_ancestors_untouched() {
    let options = TreeOptions {
        child_updates_parent: false,
        ..TreeOptions::default()
    };
    let mut tree = built(options, &sample_forest());

    tree.check(key(&tree, 1i64), CheckOptions::default()).unwrap();

    assert!(checked(&tree, 1i64));
    assert!(!checked(&tree, "citrus"));
    assert!(!checked(&tree, "fruit"));
}

#[test]
fn given_three_children_when_checking_parent_then_all_children_checked_recursively() {
    let mut tree = built(
        TreeOptions::default(),
        &[NodeDescription::new("parent").with_id("p").with_nodes(vec![
            NodeDescription::new("c1")
                .with_id("c1")
                .with_checked(true)
                .with_nodes(vec![
                    NodeDescription::new("g1").with_id("g1"),
                    NodeDescription::new("g2").with_id("g2"),
                ]),
            NodeDescription::new("c2").with_id("c2"),
            NodeDescription::new("c3").with_id("c3"),
        ])],
    );

    tree.check(key(&tree, "p"), CheckOptions::default()).unwrap();

    for id in ["p", "c1", "c2", "c3", "g1", "g2"] {
        assert!(checked(&tree, id), "{} should be checked", id);
    }
}

#[test]
fn given_checked_parent_when_unchecking_then_descendants_unchecked() {
    let mut tree = built(TreeOptions::default(), &sample_forest());
    let fruit = key(&tree, "fruit");
    tree.check(fruit, CheckOptions::default()).unwrap();

    tree.uncheck(fruit, CheckOptions::default()).unwrap();

    assert!(tree.iter().take(5).all(|n| !n.is_checked()));
}

#[test]
fn given_only_checked_child_when_unchecking_then_parent_repaired() {
    let mut tree = built(
        TreeOptions::default(),
        &[NodeDescription::new("parent")
            .with_id("p")
            .with_nodes(vec![NodeDescription::new("child").with_id("c")])],
    );
    tree.check(key(&tree, "p"), CheckOptions::default()).unwrap();
    assert!(checked(&tree, "c"));

    tree.uncheck(key(&tree, "c"), CheckOptions::default()).unwrap();

    assert!(!checked(&tree, "p"));
    assert!(!checked(&tree, "c"));
}

#[test]
fn given_sibling_still_checked_when_unchecking_child_then_parent_stays_checked() {
    let mut tree = built(TreeOptions::default(), &sample_forest());
    tree.check(key(&tree, "citrus"), CheckOptions::default()).unwrap();

    tree.uncheck(key(&tree, 1i64), CheckOptions::default()).unwrap();

    assert!(checked(&tree, "citrus"));
    assert!(checked(&tree, 2i64));
    assert!(!checked(&tree, 1i64));
}

#[test]
fn given_repair_disabled_when_unchecking_last_child_then_parent_stays_checked() {
    let options = TreeOptions {
        checked_parent_must_have_checked_children: false,
        ..TreeOptions::default()
    };
    let mut tree = built(
        options,
        &[NodeDescription::new("parent")
            .with_id("p")
            .with_nodes(vec![NodeDescription::new("child").with_id("c")])],
    );
    tree.check(key(&tree, "c"), CheckOptions::default()).unwrap();

    tree.uncheck(key(&tree, "c"), CheckOptions::default()).unwrap();

    assert!(checked(&tree, "p"));
}

#[test]
fn given_independent_options_when_checking_parent_then_only_parent_changes() {
    let mut tree = built(TreeOptions::independent(), &sample_forest());

    tree.check(key(&tree, "citrus"), CheckOptions::default()).unwrap();

    assert!(checked(&tree, "citrus"));
    assert!(!checked(&tree, 1i64));
    assert!(!checked(&tree, "fruit"));
}

#[test]
fn given_node_when_toggling_twice_then_back_to_start() {
    let mut tree = built(TreeOptions::independent(), &sample_forest());
    let apple = key(&tree, "apple");

    tree.toggle(apple, CheckOptions::default()).unwrap();
    assert!(!checked(&tree, "apple"));
    tree.toggle(apple, CheckOptions::default()).unwrap();
    assert!(checked(&tree, "apple"));
}

#[test]
fn given_silent_check_when_applied_then_state_changes_without_cascade() {
    let mut tree = built(TreeOptions::default(), &sample_forest());

    tree.check(key(&tree, "citrus"), CheckOptions::SILENT).unwrap();

    assert!(checked(&tree, "citrus"));
    assert!(!checked(&tree, 1i64));
    assert!(!checked(&tree, "fruit"));
}

#[test]
fn given_handle_when_chaining_operations_then_each_runs_its_cascade() {
    let mut tree = built(TreeOptions::default(), &sample_forest());
    let lemon = key(&tree, 1i64);

    tree.node_mut(lemon)
        .unwrap()
        .check(CheckOptions::default())
        .unwrap()
        .uncheck(CheckOptions::default())
        .unwrap();

    assert!(!checked(&tree, 1i64));
    // citrus lost its only checked child
    assert!(!checked(&tree, "citrus"));
    // fruit still has apple
    assert!(checked(&tree, "fruit"));
}

// ============================================================
// Expand / collapse
// ============================================================

#[test]
fn given_description_when_settled_then_expansion_follows_description_and_default() {
    let tree = built(TreeOptions::default(), &sample_forest());

    assert_eq!(tree.get(&"fruit".into()).unwrap().expansion(), Expansion::Expanded);
    assert_eq!(tree.get(&"citrus".into()).unwrap().expansion(), Expansion::Collapsed);
}

#[test]
fn given_default_collapsed_when_settled_then_unspecified_nodes_collapse() {
    let options = TreeOptions {
        expanded: false,
        ..TreeOptions::default()
    };
    let tree = built(options, &sample_forest());

    assert!(!tree.get(&"fruit".into()).unwrap().is_expanded());
}

#[test]
fn given_leaf_when_expanding_then_no_op() {
    let mut tree = built(TreeOptions::default(), &sample_forest());
    let apple = key(&tree, "apple");
    let before = tree.get(&"apple".into()).unwrap().expansion();

    tree.expand(apple, Animation::Animated).unwrap();
    tree.collapse(apple, Animation::Animated).unwrap();

    assert_eq!(tree.get(&"apple".into()).unwrap().expansion(), before);
}

#[test]
fn given_collapsed_node_when_expanding_then_expanded() {
    let mut tree = built(TreeOptions::default(), &sample_forest());
    let citrus = key(&tree, "citrus");

    tree.expand(citrus, Animation::Immediate).unwrap();
    assert!(tree.get(&"citrus".into()).unwrap().is_expanded());

    tree.collapse(citrus, Animation::Immediate).unwrap();
    assert!(!tree.get(&"citrus".into()).unwrap().is_expanded());
}

// ============================================================
// Interaction signals
// ============================================================

#[test]
fn given_parent_when_label_clicked_then_expansion_toggles() {
    let mut tree = built(TreeOptions::default(), &sample_forest());
    let citrus = key(&tree, "citrus");

    tree.interact(citrus, Interaction::LabelClicked).unwrap();

    assert!(tree.get(&"citrus".into()).unwrap().is_expanded());
    assert!(!checked(&tree, "citrus"));
}

#[test]
fn given_leaf_when_label_clicked_then_check_toggles() {
    let mut tree = built(TreeOptions::default(), &sample_forest());

    tree.interact(key(&tree, 2i64), Interaction::LabelClicked).unwrap();

    assert!(checked(&tree, 2i64));
    assert!(checked(&tree, "citrus"));
}

#[test]
fn given_click_to_expand_off_when_parent_label_clicked_then_check_toggles() {
    let options = TreeOptions {
        click_to_expand: false,
        ..TreeOptions::default()
    };
    let mut tree = built(options, &sample_forest());

    tree.interact(key(&tree, "citrus"), Interaction::LabelClicked)
        .unwrap();

    assert!(checked(&tree, "citrus"));
    assert!(!tree.get(&"citrus".into()).unwrap().is_expanded());
}

#[test]
fn given_both_click_switches_off_when_leaf_clicked_then_nothing_changes() {
    let options = TreeOptions {
        click_to_expand: false,
        click_to_check: false,
        ..TreeOptions::default()
    };
    let mut tree = built(options, &sample_forest());

    tree.interact(key(&tree, 2i64), Interaction::LabelClicked).unwrap();

    assert!(!checked(&tree, 2i64));
}

#[test]
fn given_leaf_without_id_when_label_clicked_then_leaf_and_parent_unchanged() {
    let mut tree = built(
        TreeOptions::default(),
        &[NodeDescription::new("p").with_id("p").with_nodes(vec![
            NodeDescription::new("hidden"),
            NodeDescription::new("c").with_id("c"),
        ])],
    );
    let hidden = tree.get(&"p".into()).unwrap().children().next().unwrap().key();

    tree.interact(hidden, Interaction::LabelClicked).unwrap();

    assert!(!tree.node(hidden).unwrap().is_checked());
    assert!(!checked(&tree, "p"));
    assert!(!checked(&tree, "c"));
}

#[test]
fn given_checkbox_change_when_delivered_then_checks_and_unchecks() {
    let mut tree = built(TreeOptions::independent(), &sample_forest());
    let lime = key(&tree, 2i64);

    tree.interact(lime, Interaction::CheckboxChanged(true)).unwrap();
    assert!(checked(&tree, 2i64));
    tree.interact(lime, Interaction::CheckboxChanged(false)).unwrap();
    assert!(!checked(&tree, 2i64));
}

#[test]
fn given_node_without_id_when_checkbox_changed_then_ignored() {
    let mut tree = built(TreeOptions::default(), &sample_forest());
    let heading = tree.nodes().nth(1).unwrap().key();

    tree.interact(heading, Interaction::CheckboxChanged(true)).unwrap();

    assert!(!tree.node(heading).unwrap().is_checked());
}

#[test]
fn given_expand_and_collapse_clicks_when_delivered_then_expansion_follows() {
    let mut tree = built(TreeOptions::default(), &sample_forest());
    let fruit = key(&tree, "fruit");

    tree.interact(fruit, Interaction::CollapseClicked).unwrap();
    assert!(!tree.node(fruit).unwrap().is_expanded());
    tree.interact(fruit, Interaction::ExpandClicked).unwrap();
    assert!(tree.node(fruit).unwrap().is_expanded());
}
