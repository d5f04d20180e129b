//! Arena-backed element forest for one API version.
//!
//! Nodes own their children through the arena; parents are stored as plain
//! handles, so parent lookup is O(1) and there are no reference cycles.
//! Sibling sets are kept sorted by the payload's natural order and never
//! contain two equal payloads.

use super::api::Archive;
use super::element::{ApiSide, Element, ElementId};
use std::fmt;

#[derive(Debug, Clone)]
struct Node<E> {
    data: E,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    archive: Option<usize>,
    detached: bool,
}

/// Ordered forest of elements produced by an archive analyzer.
#[derive(Debug, Clone)]
pub struct ElementForest<E> {
    side: ApiSide,
    archives: Vec<Archive>,
    nodes: Vec<Node<E>>,
    roots: Vec<ElementId>,
}

impl<E: Element> ElementForest<E> {
    /// Create an empty forest for one side of the comparison
    #[must_use]
    pub const fn new(side: ApiSide) -> Self {
        Self {
            side,
            archives: Vec::new(),
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// API version this forest describes
    #[must_use]
    pub const fn side(&self) -> ApiSide {
        self.side
    }

    /// Register an archive elements can be attributed to, returning its index
    pub fn add_archive(&mut self, archive: Archive) -> usize {
        if let Some(pos) = self.archives.iter().position(|a| *a == archive) {
            return pos;
        }
        self.archives.push(archive);
        self.archives.len() - 1
    }

    /// Insert a root element.
    ///
    /// If an equal root already exists its handle is returned and `data` is dropped.
    pub fn insert_root(&mut self, data: E) -> ElementId {
        self.insert(None, data)
    }

    /// Insert a child of `parent`.
    ///
    /// If an equal sibling already exists its handle is returned and `data` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not issued by this forest.
    pub fn insert_child(&mut self, parent: ElementId, data: E) -> ElementId {
        assert!(
            parent.0 < self.nodes.len(),
            "parent {parent} does not belong to this forest"
        );
        self.insert(Some(parent), data)
    }

    fn insert(&mut self, parent: Option<ElementId>, data: E) -> ElementId {
        let siblings = match parent {
            Some(p) => &self.nodes[p.0].children,
            None => &self.roots,
        };
        match siblings.binary_search_by(|id| self.nodes[id.0].data.cmp(&data)) {
            Ok(existing) => siblings[existing],
            Err(pos) => {
                let id = ElementId(self.nodes.len());
                let archive = parent.and_then(|p| self.nodes[p.0].archive);
                self.nodes.push(Node {
                    data,
                    parent,
                    children: Vec::new(),
                    archive,
                    detached: false,
                });
                match parent {
                    Some(p) => self.nodes[p.0].children.insert(pos, id),
                    None => self.roots.insert(pos, id),
                }
                id
            }
        }
    }

    /// Attribute an element to a registered archive; returns false for unknown handles.
    ///
    /// Children inserted afterwards inherit the archive of their parent.
    pub fn set_archive(&mut self, id: ElementId, archive: usize) -> bool {
        if archive >= self.archives.len() {
            return false;
        }
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.archive = Some(archive);
                true
            }
            None => false,
        }
    }

    /// Look up a live element
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<ElementRef<'_, E>> {
        self.nodes
            .get(id.0)
            .filter(|n| !n.detached)
            .map(|_| ElementRef { forest: self, id })
    }

    /// Root elements in sibling order
    pub fn roots(&self) -> impl ExactSizeIterator<Item = ElementRef<'_, E>> + '_ {
        self.roots.iter().map(move |&id| ElementRef { forest: self, id })
    }

    /// Depth-first, pre-order walk over every live element
    #[must_use]
    pub fn walk(&self) -> Walk<'_, E> {
        let mut stack: Vec<ElementId> = self.roots.clone();
        stack.reverse();
        Walk {
            forest: self,
            stack,
        }
    }

    /// Number of live elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.detached).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Remove an element and its whole subtree from the forest.
    ///
    /// Handles of removed elements stay allocated but no longer resolve.
    /// Returns false if the element was unknown or already removed.
    pub fn detach(&mut self, id: ElementId) -> bool {
        match self.nodes.get(id.0) {
            Some(node) if !node.detached => {}
            _ => return false,
        }
        match self.nodes[id.0].parent {
            Some(p) => self.nodes[p.0].children.retain(|c| *c != id),
            None => self.roots.retain(|c| *c != id),
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let node = &mut self.nodes[next.0];
            node.detached = true;
            pending.extend(node.children.iter().copied());
        }
        true
    }

    /// Detach every element for which `keep` returns false, top-down.
    ///
    /// Returns the number of subtrees removed.
    pub fn retain(&mut self, mut keep: impl FnMut(ElementRef<'_, E>) -> bool) -> usize {
        let doomed: Vec<ElementId> = {
            let mut doomed = Vec::new();
            let mut stack: Vec<ElementId> = self.roots.clone();
            while let Some(id) = stack.pop() {
                if keep(ElementRef { forest: self, id }) {
                    stack.extend(self.nodes[id.0].children.iter().copied());
                } else {
                    doomed.push(id);
                }
            }
            doomed
        };
        doomed.into_iter().filter(|id| self.detach(*id)).count()
    }
}

/// Pre-order iterator over a forest
pub struct Walk<'f, E> {
    forest: &'f ElementForest<E>,
    stack: Vec<ElementId>,
}

impl<'f, E> Iterator for Walk<'f, E> {
    type Item = ElementRef<'f, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.forest.nodes[id.0].children.iter().rev().copied());
        Some(ElementRef {
            forest: self.forest,
            id,
        })
    }
}

// ============================================================================
// Element reference
// ============================================================================

/// Borrowed view of one element together with its forest.
pub struct ElementRef<'f, E> {
    forest: &'f ElementForest<E>,
    id: ElementId,
}

impl<E> Clone for ElementRef<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ElementRef<'_, E> {}

impl<E> PartialEq for ElementRef<'_, E> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.forest, other.forest) && self.id == other.id
    }
}

impl<E> Eq for ElementRef<'_, E> {}

impl<E: fmt::Debug> fmt::Debug for ElementRef<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("side", &self.forest.side)
            .field("id", &self.id)
            .field("data", &self.forest.nodes[self.id.0].data)
            .finish()
    }
}

impl<'f, E> ElementRef<'f, E> {
    fn node(&self) -> &'f Node<E> {
        &self.forest.nodes[self.id.0]
    }

    #[must_use]
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// The analyzer payload
    #[must_use]
    pub fn data(&self) -> &'f E {
        &self.node().data
    }

    /// API version the element belongs to
    #[must_use]
    pub const fn side(&self) -> ApiSide {
        self.forest.side
    }

    #[must_use]
    pub const fn forest(&self) -> &'f ElementForest<E> {
        self.forest
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|id| Self {
            forest: self.forest,
            id,
        })
    }

    /// Children in natural sibling order
    pub fn children(&self) -> impl ExactSizeIterator<Item = ElementRef<'f, E>> + use<'f, E> {
        let forest = self.forest;
        self.node()
            .children
            .iter()
            .map(move |&id| ElementRef { forest, id })
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.node().children.is_empty()
    }

    /// Archive the element was extracted from, if known
    #[must_use]
    pub fn archive(&self) -> Option<&'f Archive> {
        self.node().archive.map(|i| &self.forest.archives[i])
    }

    /// Number of ancestors
    #[must_use]
    pub fn depth(&self) -> usize {
        std::iter::successors(self.parent(), ElementRef::parent).count()
    }
}
