//! Domain-agnostic traversal over a borrowed [`DocumentNode`] tree.
//!
//! All walks are depth-first, pre-order, in `children` array order.

use crate::core::types::DocumentNode;

/// First node, in pre-order, for which `predicate` holds.
pub fn find_first<'a, P>(root: &'a DocumentNode, predicate: P) -> Option<&'a DocumentNode>
where
    P: Fn(&DocumentNode) -> bool,
{
    fn visit<'a, P>(node: &'a DocumentNode, predicate: &P) -> Option<&'a DocumentNode>
    where
        P: Fn(&DocumentNode) -> bool,
    {
        if predicate(node) {
            return Some(node);
        }
        node.children
            .iter()
            .find_map(|child| visit(child, predicate))
    }

    visit(root, &predicate)
}

/// The node whose direct children include `target_id`. `None` when the
/// target is the root itself or absent from the tree.
pub fn find_parent<'a>(root: &'a DocumentNode, target_id: &str) -> Option<&'a DocumentNode> {
    if root.children.iter().any(|child| child.id == target_id) {
        return Some(root);
    }
    root.children
        .iter()
        .find_map(|child| find_parent(child, target_id))
}

/// Calls `visitor(node, depth)` for every node down to `max_depth`
/// (the root is depth 0). Nodes below that depth are silently skipped.
pub fn walk_with_depth_limit<'a, V>(root: &'a DocumentNode, max_depth: usize, mut visitor: V)
where
    V: FnMut(&'a DocumentNode, usize),
{
    fn visit<'a, V>(node: &'a DocumentNode, depth: usize, max_depth: usize, visitor: &mut V)
    where
        V: FnMut(&'a DocumentNode, usize),
    {
        visitor(node, depth);
        if depth >= max_depth {
            return;
        }
        for child in &node.children {
            visit(child, depth + 1, max_depth, visitor);
        }
    }

    visit(root, 0, max_depth, &mut visitor);
}

/// Full walk with no depth cap.
pub fn walk<'a, V>(root: &'a DocumentNode, visitor: V)
where
    V: FnMut(&'a DocumentNode, usize),
{
    walk_with_depth_limit(root, usize::MAX, visitor);
}
