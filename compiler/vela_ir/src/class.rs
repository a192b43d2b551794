use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{stable_hash, ClassId, FunctionId, TypeData};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
}

/// 32-bit identity of a concrete class, the key of a dispatch table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassHash(pub u32);

impl ClassHash {
    pub fn of_name(name: &str) -> Self {
        let h = stable_hash(name.as_bytes());
        #[expect(clippy::cast_possible_truncation, reason = "folding 64 bits into 32")]
        let folded = (h ^ (h >> 32)) as u32;
        ClassHash(folded)
    }
}

impl fmt::Display for ClassHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct FieldData {
    pub name: String,
    pub type_data: TypeData,
}

/// Where a class's declaration lands in the output tree.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClassFiles {
    /// Bucket directory, e.g. `o_17`.
    pub subdir: String,
    /// e.g. `C@Zoo@Dog.h`
    pub header_name: String,
}

impl ClassFiles {
    pub fn header_path(&self) -> String {
        format!("{}/{}", self.subdir, self.header_name)
    }
}

/// A class or interface as resolved by the front-end.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct ClassData {
    /// Fully qualified, with `\` namespace separators.
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub is_abstract: bool,
    /// Provided by the runtime; never declared by generated code.
    #[serde(default)]
    pub is_builtin: bool,
    #[serde(default)]
    pub parent: Option<ClassId>,
    /// Implemented interfaces, or extended interfaces for an interface.
    #[serde(default)]
    pub implements: Vec<ClassId>,
    /// Direct subclasses and implementors. Rebuilt from `parent` and
    /// `implements` whenever the graph links its hierarchy.
    #[serde(skip)]
    pub derived: Vec<ClassId>,
    /// Own instance methods by local name.
    #[serde(default)]
    pub instance_methods: BTreeMap<String, FunctionId>,
    #[serde(default)]
    pub static_methods: BTreeMap<String, FunctionId>,
    #[serde(default)]
    pub construct_function: Option<FunctionId>,
    #[serde(default)]
    pub has_custom_constructor: bool,
    #[serde(default)]
    pub fields: Vec<FieldData>,
    /// Short name of the defining source file.
    #[serde(default)]
    pub file: String,
    #[serde(skip)]
    pub files: Option<ClassFiles>,
}

impl ClassData {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        ClassData {
            name: name.into(),
            kind,
            is_abstract: kind == ClassKind::Interface,
            is_builtin: false,
            parent: None,
            implements: Vec::new(),
            derived: Vec::new(),
            instance_methods: BTreeMap::new(),
            static_methods: BTreeMap::new(),
            construct_function: None,
            has_custom_constructor: false,
            fields: Vec::new(),
            file: String::new(),
            files: None,
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn hash(&self) -> ClassHash {
        ClassHash::of_name(&self.name)
    }

    /// Identifier used in generated code: `Zoo\Dog` becomes `C$Zoo$Dog`.
    pub fn cpp_name(&self) -> String {
        format!("C${}", self.name.replace('\\', "$"))
    }

    /// Declared own method of the given kind.
    pub fn own_method(&self, local_name: &str, is_static: bool) -> Option<FunctionId> {
        let table = if is_static {
            &self.static_methods
        } else {
            &self.instance_methods
        };
        table.get(local_name).copied()
    }
}
