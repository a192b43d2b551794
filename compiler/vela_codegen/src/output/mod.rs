//! Generated translation units and the sink that collects them.
//!
//! A unit is recorded as a [`WriterData`]: where it goes, what it includes,
//! and its payload. In [`GenMode::Hashes`] the payload is only a content
//! hash, which is enough to tell whether a file changed since the previous
//! build. [`GenMode::Contents`] keeps the full text and the documentation
//! comments attached to it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use vela_ir::stable_hash;

use crate::commands::CodeGenRootCmd;

/// What a generation run records for each file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum GenMode {
    #[default]
    Hashes,
    Contents,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum UnitKind {
    Header,
    Source,
    Text,
}

impl UnitKind {
    pub fn from_file_name(file_name: &str) -> Self {
        match file_name.rsplit_once('.').map(|(_, ext)| ext) {
            Some("h" | "hpp" | "inl") => UnitKind::Header,
            Some("cpp" | "cc") => UnitKind::Source,
            _ => UnitKind::Text,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Payload {
    Hash(u64),
    Contents { text: String, comments: Vec<String> },
}

/// One emitted file.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct WriterData {
    pub kind: UnitKind,
    /// Empty for files at the root of the output tree.
    pub subdir: String,
    pub file_name: String,
    pub payload: Payload,
    /// Internal headers this unit includes.
    pub includes: Vec<String>,
    /// Static library headers this unit includes.
    pub lib_includes: Vec<String>,
    /// Classes declared ahead of use.
    pub forward_declarations: Vec<String>,
}

impl WriterData {
    /// Path relative to the output root.
    pub fn path(&self) -> String {
        if self.subdir.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.subdir, self.file_name)
        }
    }

    pub fn content_hash(&self) -> u64 {
        match &self.payload {
            Payload::Hash(hash) => *hash,
            Payload::Contents { text, .. } => stable_hash(text.as_bytes()),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Hash(_) => None,
            Payload::Contents { text, .. } => Some(text),
        }
    }
}

/// Shared destination of every task's units.
///
/// Units arrive in scheduling order; [`OutputSink::drain_sorted`] restores
/// a deterministic order. The sink also remembers which command produced
/// each path so a changed file can be regenerated in contents mode.
#[derive(Default)]
pub struct OutputSink {
    units: Mutex<Vec<WriterData>>,
    origins: Mutex<FxHashMap<String, Arc<dyn CodeGenRootCmd>>>,
}

impl OutputSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn extend(&self, command: &Arc<dyn CodeGenRootCmd>, units: Vec<WriterData>) {
        {
            let mut origins = self.origins.lock();
            for unit in &units {
                origins.insert(unit.path(), Arc::clone(command));
            }
        }
        self.units.lock().extend(units);
    }

    pub fn len(&self) -> usize {
        self.units.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every recorded unit, sorted by path.
    pub fn drain_sorted(&self) -> Vec<WriterData> {
        let mut units = std::mem::take(&mut *self.units.lock());
        units.sort_by_key(WriterData::path);
        units
    }

    /// Commands that produced any of `paths`, each listed once, in the
    /// order their first path appears.
    pub fn commands_for<'p>(&self, paths: impl IntoIterator<Item = &'p str>) -> Vec<Arc<dyn CodeGenRootCmd>> {
        let origins = self.origins.lock();
        let mut out: Vec<Arc<dyn CodeGenRootCmd>> = Vec::new();
        for path in paths {
            let Some(command) = origins.get(path) else {
                tracing::warn!(path, "no command recorded for path");
                continue;
            };
            if !out.iter().any(|seen| Arc::ptr_eq(seen, command)) {
                out.push(Arc::clone(command));
            }
        }
        out
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink")
            .field("units", &self.units.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
