/// Read-only degree access shared by graphs and hypergraphs.
///
/// This is the only shape of access degree-distribution consumers need:
/// iterate node positions and read each degree.
pub trait DegreeView {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Degree of the node stored at `index`. Panics when out of range.
    fn degree_of(&self, index: usize) -> u64;

    /// Iterates over all degrees in node order.
    fn degree_iter(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        Box::new((0..self.node_count()).map(move |index| self.degree_of(index)))
    }
}
