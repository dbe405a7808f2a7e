use super::{FlatTree, NodeIndex};
use std::collections::HashSet;

impl FlatTree {
    /// Flip the collapsed flag of the node with `id`.
    ///
    /// Only the node's subtree (ancestor-collapsed flags) and its ancestor
    /// chain (visible counts) are touched. Returns `false` without changing
    /// anything if `id` is unknown, which is expected for ids captured before
    /// the data was replaced.
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            log::debug!("toggle ignored, no node with id {id:?}");
            return false;
        };

        let node = &mut self.nodes[index];
        node.is_collapsed = !node.is_collapsed;
        log::trace!("node {id:?} collapsed = {}", node.is_collapsed);

        self.propagate_parent_collapsed(index);
        self.refresh_open_rows(index);
        true
    }

    /// Collapse every node that has children.
    pub fn collapse_all(&mut self) {
        for node in &mut self.nodes {
            node.is_collapsed = !node.children.is_empty();
        }
        self.recompute_flags();
    }

    pub fn expand_all(&mut self) {
        for node in &mut self.nodes {
            node.is_collapsed = false;
        }
        self.recompute_flags();
    }

    /// Ids of all collapsed nodes.
    pub fn collapsed_ids(&self) -> HashSet<String> {
        self.nodes
            .iter()
            .filter(|node| node.is_collapsed)
            .map(|node| node.id.clone())
            .collect()
    }

    /// Replace every node's collapsed flag with membership in `ids`.
    pub fn restore_collapsed(&mut self, ids: &HashSet<String>) {
        for node in &mut self.nodes {
            node.is_collapsed = ids.contains(&node.id);
        }
        self.recompute_flags();
    }

    /// Rows contributed by the subtree of `index`, from its children's counts.
    pub(super) fn open_rows_of(&self, index: NodeIndex) -> usize {
        let node = &self.nodes[index];
        if node.is_collapsed {
            return 0;
        }
        node.children
            .iter()
            .map(|&child| 1 + self.nodes[child].open_rows)
            .sum()
    }

    fn propagate_parent_collapsed(&mut self, index: NodeIndex) {
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            let hiding = self.nodes[current].is_hiding();
            for position in 0..self.nodes[current].children.len() {
                let child = self.nodes[current].children[position];
                self.nodes[child].is_parent_collapsed = hiding;
                stack.push(child);
            }
        }
    }

    fn refresh_open_rows(&mut self, index: NodeIndex) {
        let before = self.nodes[index].open_rows;
        let after = self.open_rows_of(index);
        self.nodes[index].open_rows = after;

        let delta = after as isize - before as isize;
        if delta == 0 {
            return;
        }

        let mut next = self.nodes[index].parent;
        while let Some(ancestor) = next {
            let node = &mut self.nodes[ancestor];
            // A collapsed ancestor contributes nothing, neither does anything above it.
            if node.is_collapsed {
                break;
            }
            node.open_rows = node.open_rows.saturating_add_signed(delta);
            next = node.parent;
        }
    }

    /// Rebuild every derived flag. Parents precede children in pre-order, so
    /// one forward pass fixes ancestor flags and one backward pass the counts.
    fn recompute_flags(&mut self) {
        for index in 0..self.nodes.len() {
            let hidden = self.nodes[index]
                .parent
                .is_some_and(|parent| self.nodes[parent].is_hiding());
            self.nodes[index].is_parent_collapsed = hidden;
        }
        for index in (0..self.nodes.len()).rev() {
            self.nodes[index].open_rows = self.open_rows_of(index);
        }
    }
}
