//! Class hierarchy queries.
//!
//! Hierarchies can be deep and wide, so every traversal is an explicit
//! worklist rather than recursion.

use super::ProgramGraph;
use crate::{ClassId, FunctionId};

impl ProgramGraph {
    /// Whether `ancestor` is `descendant` itself or one of its ancestors,
    /// following both `parent` and `implements` edges.
    pub fn is_parent_of(&self, ancestor: ClassId, descendant: ClassId) -> bool {
        let mut pending = vec![descendant];
        let mut seen = vec![false; self.classes.len()];
        while let Some(id) = pending.pop() {
            if id == ancestor {
                return true;
            }
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            let class = self.class(id);
            pending.extend(class.parent.iter().chain(&class.implements));
        }
        false
    }

    /// Every transitive inheritor of `root`, parents before children.
    ///
    /// Not deduplicated: a class reachable along two paths (say, through two
    /// interfaces sharing a base) appears once per path, which lets callers
    /// detect and report such diamonds.
    pub fn all_inheritors(&self, root: ClassId) -> Vec<ClassId> {
        let mut out = Vec::new();
        let mut pending: Vec<ClassId> = self.class(root).derived.iter().rev().copied().collect();
        while let Some(id) = pending.pop() {
            out.push(id);
            pending.extend(self.class(id).derived.iter().rev());
        }
        out
    }

    /// Ancestors along the `parent` chain, nearest first. Interfaces are not
    /// included.
    pub fn parent_chain(&self, class: ClassId) -> Vec<ClassId> {
        let mut out = Vec::new();
        let mut current = self.class(class).parent;
        while let Some(id) = current {
            if out.contains(&id) {
                break;
            }
            out.push(id);
            current = self.class(id).parent;
        }
        out
    }

    /// Most-derived implementation of `local_name` visible from `class`:
    /// its own method, else the nearest ancestor's.
    pub fn resolve_method(
        &self,
        class: ClassId,
        local_name: &str,
        is_static: bool,
    ) -> Option<FunctionId> {
        std::iter::once(class)
            .chain(self.parent_chain(class))
            .find_map(|id| self.class(id).own_method(local_name, is_static))
    }

    /// Ancestors (parent chain plus every interface reached from it), each
    /// reported once, nearest first.
    pub fn all_ancestors(&self, class: ClassId) -> Vec<ClassId> {
        let mut out: Vec<ClassId> = Vec::new();
        let start = self.class(class);
        let mut pending: Vec<ClassId> = start.parent.iter().chain(&start.implements).copied().collect();
        pending.reverse();
        while let Some(id) = pending.pop() {
            if out.contains(&id) {
                continue;
            }
            out.push(id);
            let base = self.class(id);
            pending.extend(base.implements.iter().rev());
            pending.extend(base.parent.iter());
        }
        out
    }
}
