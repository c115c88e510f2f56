/// Chooses which child to descend into during selection.
///
/// Implementations are read-only scoring functions. Children are supplied in action
/// enumeration order, and ties must resolve to the earliest child.
pub trait SelectionPolicy {
    /// Returns the position of the selected child, or `None` when there are no children.
    fn select_child<I>(&self, parent_visits: u32, children: I) -> Option<usize>
    where
        I: Iterator<Item = EdgeInfo>;
}

/// Read-only statistics of a child used for selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeInfo {
    pub visits: u32,
    pub reward: f32,
}
