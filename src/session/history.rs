use crate::model::Luma;

/// One generation result in the evolve history, linked to the node it grew
/// from.
#[derive(Debug, Clone)]
pub struct LumaNode {
    pub prompt: String,
    pub luma: Luma,
    pub parent: Option<usize>,
}

/// Parent-pointer arena over generation results.
///
/// Nodes are addressed by insertion index and a node's parent is always an
/// earlier index, so traversal never cycles.
#[derive(Debug, Clone, Default)]
pub struct History {
    nodes: Vec<LumaNode>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Discard everything and start over with a single root node.
    /// Returns the root's index (always 0).
    pub fn reset(&mut self, prompt: String, luma: Luma) -> usize {
        self.nodes.clear();
        self.nodes.push(LumaNode {
            prompt,
            luma,
            parent: None,
        });
        0
    }

    /// Append a node evolved from `parent`. A parent index that does not
    /// exist is recorded as a root; the arena never panics on bad indices.
    pub fn evolve(&mut self, parent: usize, prompt: String, luma: Luma) -> usize {
        let parent = (parent < self.nodes.len()).then_some(parent);
        self.nodes.push(LumaNode {
            prompt,
            luma,
            parent,
        });
        self.nodes.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&LumaNode> {
        self.nodes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut LumaNode> {
        self.nodes.get_mut(index)
    }

    /// The most recently inserted node, if any.
    pub fn latest(&self) -> Option<(usize, &LumaNode)> {
        self.nodes
            .last()
            .map(|node| (self.nodes.len() - 1, node))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &LumaNode)> {
        self.nodes.iter().enumerate()
    }

    /// Indices from `index` back to its root, nearest ancestor first.
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = self.nodes.get(index).and_then(|n| n.parent);
        while let Some(i) = cursor {
            out.push(i);
            cursor = self.nodes.get(i).and_then(|n| n.parent);
        }
        out
    }

    /// Direct children of `index`, in insertion order.
    pub fn children(&self, index: usize) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent == Some(index))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luma(label: &str) -> Luma {
        Luma {
            label: label.to_string(),
            ..Luma::default()
        }
    }

    #[test]
    fn reset_starts_a_fresh_arena() {
        let mut history = History::new();
        history.reset("dawn".into(), luma("Dawn"));
        history.evolve(0, "dusk".into(), luma("Dusk"));
        assert_eq!(history.len(), 2);

        let root = history.reset("tide".into(), luma("Tide"));
        assert_eq!(root, 0);
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(0).unwrap().luma.label, "Tide");
        assert!(history.get(0).unwrap().parent.is_none());
    }

    #[test]
    fn evolve_links_to_parent() {
        let mut history = History::new();
        history.reset("dawn".into(), luma("Dawn"));
        let child = history.evolve(0, "deeper reds".into(), luma("Ember"));
        let grandchild = history.evolve(child, "now at night".into(), luma("Night Ember"));

        assert_eq!(history.get(child).unwrap().parent, Some(0));
        assert_eq!(history.get(grandchild).unwrap().parent, Some(child));
        assert_eq!(history.ancestors(grandchild), vec![child, 0]);
        assert_eq!(history.children(0), vec![child]);
    }

    #[test]
    fn evolve_from_missing_parent_becomes_root() {
        let mut history = History::new();
        history.reset("dawn".into(), luma("Dawn"));
        let index = history.evolve(99, "from nowhere".into(), luma("Stray"));
        assert!(history.get(index).unwrap().parent.is_none());
    }

    #[test]
    fn branching_keeps_all_children() {
        let mut history = History::new();
        history.reset("dawn".into(), luma("Dawn"));
        let a = history.evolve(0, "warmer".into(), luma("A"));
        let b = history.evolve(0, "cooler".into(), luma("B"));
        assert_eq!(history.children(0), vec![a, b]);
        assert_eq!(history.latest().unwrap().0, b);
    }
}
