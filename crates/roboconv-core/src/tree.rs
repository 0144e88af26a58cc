//! Kinematic tree reconstruction
//!
//! A [`Body`] stores joints as a flat parent/child edge list, but
//! tree-structured output formats need a rooted nested tree. This module
//! determines the root set, rebuilds the nested tree with an explicit
//! visited-set cycle guard, and derives the filtered link/joint lists and
//! joint index map consumed by tree-shaped writers.

use std::collections::{HashMap, HashSet};

use crate::model::{Body, Joint, JointType, Link, WORLD_LINK};

/// A node of the reconstructed kinematic tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// The joint entering this node (synthetic Fixed joint at the root)
    pub joint: Joint,
    /// The child link record; absent when the link was filtered out of the
    /// Body's link list (e.g. carries no visual geometry)
    pub link: Option<Link>,
    pub children: Vec<TreeNode>,
}

/// Find root link candidates from parent/child relationships
///
/// Counts, per link name, how many joints name it as parent (world-attached
/// edges excluded), then drops every name that appears as a child. The
/// survivors are sorted by descending parent-edge count; ties keep
/// discovery order. A single connected tree yields exactly one candidate,
/// disconnected sub-trees yield one per component.
pub fn find_roots(body: &Body) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for joint in &body.joints {
        if joint.parent == WORLD_LINK {
            continue;
        }
        let count = counts.entry(joint.parent.as_str()).or_insert_with(|| {
            order.push(joint.parent.as_str());
            0
        });
        *count += 1;
    }
    for joint in &body.joints {
        counts.remove(joint.child.as_str());
    }

    let mut roots: Vec<(&str, usize)> = order
        .into_iter()
        .filter_map(|name| counts.get(name).map(|&c| (name, c)))
        .collect();
    // Stable sort keeps discovery order among equal counts
    roots.sort_by_key(|&(_, count)| std::cmp::Reverse(count));
    roots.into_iter().map(|(name, _)| name.to_string()).collect()
}

/// Joints whose parent is the given link, in joint-list order
pub fn children_of<'a>(body: &'a Body, link: &str) -> Vec<&'a Joint> {
    body.joints.iter().filter(|j| j.parent == link).collect()
}

/// Reconstruct the nested tree rooted at the detected root
///
/// Falls back to `default_root` when root detection yields no candidate
/// (fully cyclic or empty joint list), synthesizing a placeholder link and
/// a Fixed root joint so the emitted tree always has a single entry point.
/// Closed-loop edges are never traversed; an ordinary tree edge pointing
/// back at a visited link is a [`TreeError::CycleDetected`].
pub fn build_tree(body: &Body, default_root: &str) -> Result<TreeNode, TreeError> {
    let roots = find_roots(body);
    let (root, link) = match roots.first() {
        Some(root) => (root.clone(), body.find_link(root).cloned()),
        None => (
            default_root.to_string(),
            body.find_link(default_root)
                .cloned()
                .or_else(|| Some(Link::new(default_root))),
        ),
    };

    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(root.clone());

    Ok(TreeNode {
        joint: Joint::new(root.clone(), WORLD_LINK, root.clone(), JointType::Fixed),
        link,
        children: convert_children(body, &root, &mut visited)?,
    })
}

fn convert_children(
    body: &Body,
    link: &str,
    visited: &mut HashSet<String>,
) -> Result<Vec<TreeNode>, TreeError> {
    let mut children = Vec::new();
    for joint in children_of(body, link) {
        if !visited.insert(joint.child.clone()) {
            return Err(TreeError::CycleDetected(joint.child.clone()));
        }
        children.push(TreeNode {
            joint: joint.clone(),
            // Tolerated: the child may have been elided from the link list
            link: body.find_link(&joint.child).cloned(),
            children: convert_children(body, &joint.child, visited)?,
        });
    }
    Ok(children)
}

/// Everything a tree-shaped writer needs: the nested tree plus the filtered
/// link and joint name lists and the stable joint index map.
#[derive(Debug, Clone)]
pub struct TreePlan {
    /// Chosen root link name
    pub root: String,
    /// All root candidates, chosen root first
    pub roots: Vec<String>,
    pub tree: TreeNode,
    /// Links with visual geometry, secondary roots pruned
    pub links: Vec<String>,
    /// Joints surfacing in the output, same pruning
    pub joints: Vec<String>,
    /// Name -> sequence number, root first
    pub joint_index: HashMap<String, usize>,
}

impl TreePlan {
    pub fn build(body: &Body, default_root: &str) -> Result<Self, TreeError> {
        let tree = build_tree(body, default_root)?;
        let roots = find_roots(body);
        let root = tree.joint.name.clone();

        // Links of the secondary roots stay in the Body for lookup but are
        // excluded from the emitted lists.
        let pruned: &[String] = if roots.is_empty() { &[] } else { &roots[1..] };

        let links: Vec<String> = body
            .links
            .iter()
            .filter(|l| l.has_visuals() && !pruned.contains(&l.name))
            .map(|l| l.name.clone())
            .collect();

        let mut joints: Vec<String> = body
            .joints
            .iter()
            .filter(|j| links.contains(&j.child) && !pruned.contains(&j.parent))
            .map(|j| j.name.clone())
            .collect();
        if joints.is_empty() {
            joints = vec![root.clone()];
        }

        let mut joint_index: HashMap<String, usize> = HashMap::new();
        joint_index.insert(root.clone(), 0);
        for joint in &body.joints {
            joint_index.entry(joint.name.clone()).or_insert(0);
        }
        let mut seq = 1;
        for name in &joints {
            if name != &root {
                joint_index.insert(name.clone(), seq);
                seq += 1;
            }
        }

        Ok(Self {
            root,
            roots,
            tree,
            links,
            joints,
            joint_index,
        })
    }
}

/// Tree reconstruction errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum TreeError {
    #[error("joint edge revisits link '{0}'")]
    CycleDetected(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Shape, ShapeData, SphereData};

    fn link_with_visual(name: &str) -> Link {
        let mut link = Link::new(name);
        link.visuals.push(Shape::new(
            format!("{name}-vis"),
            ShapeData::Sphere(SphereData {
                radius: 0.05,
                material: None,
            }),
        ));
        link
    }

    fn chain_body(edges: &[(&str, &str)]) -> Body {
        let mut body = Body::new("test");
        let mut seen = HashSet::new();
        for &(parent, child) in edges {
            for name in [parent, child] {
                if name != WORLD_LINK && seen.insert(name.to_string()) {
                    body.links.push(link_with_visual(name));
                }
            }
            body.joints.push(Joint::new(
                format!("{parent}_{child}"),
                parent,
                child,
                JointType::Revolute,
            ));
        }
        body
    }

    #[test]
    fn test_find_roots_single_tree() {
        let body = chain_body(&[("pelvis", "torso"), ("pelvis", "l_leg"), ("torso", "head")]);
        assert_eq!(find_roots(&body), vec!["pelvis"]);
    }

    #[test]
    fn test_world_anchored_chain_has_no_root_candidate() {
        // The child-removal pass considers every edge, so a world-attached
        // chain leaves no survivor and the default root takes over.
        let body = chain_body(&[("world", "base"), ("base", "arm")]);
        assert_eq!(find_roots(&body), Vec::<String>::new());

        let tree = build_tree(&body, "base").unwrap();
        assert_eq!(tree.joint.name, "base");
        assert_eq!(tree.joint.joint_type, JointType::Fixed);
        // The existing link record is reused, not replaced by a placeholder
        assert!(tree.link.as_ref().is_some_and(|l| l.has_visuals()));
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].joint.child, "arm");
    }

    #[test]
    fn test_find_roots_forest_one_per_component() {
        let body = chain_body(&[("a", "b"), ("a", "c"), ("x", "y")]);
        let roots = find_roots(&body);
        assert_eq!(roots, vec!["a", "x"]);
        // No candidate is a child in any edge
        for root in &roots {
            assert!(body.joints.iter().all(|j| &j.child != root));
        }
    }

    #[test]
    fn test_find_roots_sorted_by_fanout() {
        // "x" discovered first but "a" has higher fan-out
        let body = chain_body(&[("x", "y"), ("a", "b"), ("a", "c")]);
        assert_eq!(find_roots(&body), vec!["a", "x"]);
    }

    #[test]
    fn test_children_of_keeps_joint_order() {
        let body = chain_body(&[("a", "c"), ("a", "b")]);
        let children: Vec<&str> = children_of(&body, "a")
            .iter()
            .map(|j| j.child.as_str())
            .collect();
        assert_eq!(children, vec!["c", "b"]);
    }

    #[test]
    fn test_build_tree_nests_edges() {
        let body = chain_body(&[("a", "b"), ("b", "c")]);
        let tree = build_tree(&body, "base").unwrap();
        assert_eq!(tree.joint.name, "a");
        assert_eq!(tree.joint.joint_type, JointType::Fixed);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].joint.child, "b");
        assert_eq!(tree.children[0].children[0].joint.child, "c");
    }

    #[test]
    fn test_round_trip_preserves_edges() {
        let body = chain_body(&[("a", "b"), ("a", "c"), ("c", "d")]);
        let tree = build_tree(&body, "base").unwrap();

        let mut pairs = Vec::new();
        collect_pairs(&tree, &mut pairs);
        let expected: HashSet<(String, String)> = body
            .joints
            .iter()
            .map(|j| (j.parent.clone(), j.child.clone()))
            .collect();
        assert_eq!(pairs.into_iter().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn test_cycle_detected() {
        let body = chain_body(&[("a", "b"), ("b", "c"), ("c", "a")]);
        // a->b->c->a has no root; fallback root still walks into the cycle
        let result = build_tree(&body, "a");
        assert!(matches!(result, Err(TreeError::CycleDetected(_))));
    }

    #[test]
    fn test_root_fallback_uses_default_name() {
        let body = chain_body(&[("a", "b"), ("b", "a")]);
        let result = build_tree(&body, "base");
        // Two-link cycle: traversal from "base" finds no outgoing joints
        let tree = result.unwrap();
        assert_eq!(tree.joint.name, "base");
        assert_eq!(tree.joint.joint_type, JointType::Fixed);
        assert_eq!(tree.link.as_ref().unwrap().name, "base");
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_missing_child_link_tolerated() {
        let mut body = chain_body(&[("a", "b")]);
        // Edge to a link that was elided from the link list
        body.joints
            .push(Joint::new("b_ghost", "b", "ghost", JointType::Fixed));
        let tree = build_tree(&body, "base").unwrap();
        let ghost = &tree.children[0].children[0];
        assert_eq!(ghost.joint.child, "ghost");
        assert!(ghost.link.is_none());
    }

    #[test]
    fn test_closed_loops_not_traversed() {
        let mut body = chain_body(&[("a", "b"), ("b", "c"), ("a", "d")]);
        // Closing edge of a four-bar linkage
        body.closed_loops
            .push(Joint::new("loop", "c", "d", JointType::Revolute));
        let tree = build_tree(&body, "base").unwrap();
        let mut pairs = Vec::new();
        collect_pairs(&tree, &mut pairs);
        assert!(!pairs.contains(&("c".to_string(), "d".to_string())));
    }

    #[test]
    fn test_plan_filters_empty_links_and_secondary_roots() {
        let mut body = chain_body(&[("a", "b"), ("x", "y")]);
        // Strip visuals from "b": stays in the Body, drops from the lists
        if let Some(link) = body.links.iter_mut().find(|l| l.name == "b") {
            link.visuals.clear();
        }
        let plan = TreePlan::build(&body, "base").unwrap();
        assert_eq!(plan.root, "a");
        assert!(!plan.links.contains(&"b".to_string()));
        assert!(!plan.links.contains(&"x".to_string()));
        assert!(body.find_link("b").is_some());
    }

    #[test]
    fn test_plan_joint_index_root_first() {
        let body = chain_body(&[("a", "b"), ("b", "c")]);
        let plan = TreePlan::build(&body, "base").unwrap();
        assert_eq!(plan.joint_index["a"], 0);
        assert_eq!(plan.joint_index["a_b"], 1);
        assert_eq!(plan.joint_index["b_c"], 2);
    }

    #[test]
    fn test_plan_empty_joint_list_falls_back_to_root() {
        let mut body = Body::new("solo");
        body.links.push(link_with_visual("only"));
        body.joints
            .push(Joint::new("anchor", "only", "only2", JointType::Fixed));
        body.links.push(Link::new("only2"));
        // only2 has no visuals, so no joint survives filtering
        let plan = TreePlan::build(&body, "base").unwrap();
        assert_eq!(plan.joints, vec![plan.root.clone()]);
    }

    fn collect_pairs(node: &TreeNode, out: &mut Vec<(String, String)>) {
        for child in &node.children {
            out.push((child.joint.parent.clone(), child.joint.child.clone()));
            collect_pairs(child, out);
        }
    }
}
