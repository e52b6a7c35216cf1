use crate::types::TypeTag;

/// Anything with a parent chain and a tag list.
pub trait Hierarchy: Sized {
    fn parent(&self) -> Option<Self>;
    fn is_a(&self, tag: TypeTag) -> bool;
}

/// Walk the parent chain of `node` (excluding `node` itself) and return the
/// first ancestor carrying `tag`. Returns `None` when no ancestor qualifies.
pub fn first_ancestor_of_type<N: Hierarchy>(node: &N, tag: TypeTag) -> Option<N> {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if ancestor.is_a(tag) {
            return Some(ancestor);
        }
        current = ancestor.parent();
    }
    None
}

/// Number of ancestors above `node`.
pub fn depth<N: Hierarchy>(node: &N) -> usize {
    let mut count = 0;
    let mut current = node.parent();
    while let Some(ancestor) = current {
        count += 1;
        current = ancestor.parent();
    }
    count
}
