//! Text presentation of a forest
//!
//! Draws each node as `<affordance> [x] label` using termtree; children of
//! collapsed nodes are hidden, leaves get a blank affordance.

use termtree::Tree as TextTree;

use crate::domain::{Node, Tree, TreeOptions};

pub fn to_text_trees(tree: &Tree) -> Vec<TextTree<String>> {
    let options = tree.options();
    let gutter = tree.gutter_width().unwrap_or_else(|| affordance_width(options));
    tree.nodes()
        .map(|node| node_to_text_tree(node, options, gutter))
        .collect()
}

/// Whole forest as one string, top-level trees in order.
pub fn render_forest(tree: &Tree) -> String {
    to_text_trees(tree)
        .iter()
        .map(|text_tree| text_tree.to_string())
        .collect()
}

fn node_to_text_tree(node: Node<'_>, options: &TreeOptions, gutter: usize) -> TextTree<String> {
    let line = node_line(node, options, gutter);
    if node.has_children() && node.effective_expanded() {
        let leaves: Vec<_> = node
            .children()
            .map(|child| node_to_text_tree(child, options, gutter))
            .collect();
        TextTree::new(line).with_leaves(leaves)
    } else {
        TextTree::new(line)
    }
}

pub fn node_line(node: Node<'_>, options: &TreeOptions, gutter: usize) -> String {
    let affordance = if !node.has_children() {
        ""
    } else if node.effective_expanded() {
        options.collapse_icon.as_str()
    } else {
        options.expand_icon.as_str()
    };
    let checkbox = match (node.is_checkable(), node.is_checked()) {
        (false, _) => "",
        (true, true) => "[x] ",
        (true, false) => "[ ] ",
    };
    format!("{:<gutter$} {}{}", affordance, checkbox, node.label(), gutter = gutter)
}

fn affordance_width(options: &TreeOptions) -> usize {
    options
        .expand_icon
        .chars()
        .count()
        .max(options.collapse_icon.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeDescription;

    fn forest() -> Vec<NodeDescription> {
        vec![NodeDescription::new("Fruit")
            .with_id("fruit")
            .with_nodes(vec![
                NodeDescription::new("Apple").with_id("apple").with_checked(true),
                NodeDescription::new("Pear").with_id("pear"),
            ])]
    }

    #[test]
    fn given_expanded_parent_when_rendering_then_shows_children() {
        let mut tree = Tree::default();
        tree.build(&forest());
        tree.settle().unwrap();

        let text = render_forest(&tree);

        assert!(text.contains("- [ ] Fruit"), "{}", text);
        assert!(text.contains("[x] Apple"), "{}", text);
        assert!(text.contains("[ ] Pear"), "{}", text);
    }

    #[test]
    fn given_collapsed_parent_when_rendering_then_hides_children() {
        let mut tree = Tree::default();
        tree.build(&[forest().remove(0).with_expanded(false)]);
        tree.settle().unwrap();

        let text = render_forest(&tree);

        assert!(text.contains("+ [ ] Fruit"), "{}", text);
        assert!(!text.contains("Apple"), "{}", text);
    }

    #[test]
    fn given_node_without_id_when_rendering_then_no_checkbox() {
        let mut tree = Tree::default();
        tree.build(&[NodeDescription::new("Heading")]);

        let text = render_forest(&tree);

        assert_eq!(text.trim_end(), "  Heading");
    }
}
