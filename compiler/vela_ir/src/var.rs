use serde::{Deserialize, Serialize};

use crate::TypeData;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarKind {
    #[default]
    Local,
    Global,
    /// Function-level `static`, stored like a global.
    Static,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct VarData {
    pub name: String,
    #[serde(default)]
    pub kind: VarKind,
    pub type_data: TypeData,
}

impl VarData {
    pub fn new(name: impl Into<String>, kind: VarKind, type_data: TypeData) -> Self {
        VarData {
            name: name.into(),
            kind,
            type_data,
        }
    }

    /// Identifier used in generated code.
    pub fn cpp_name(&self) -> String {
        format!("v${}", self.name.replace('\\', "$"))
    }

    /// Lives for the whole request, so it needs reset and memory accounting.
    pub fn is_global_storage(&self) -> bool {
        matches!(self.kind, VarKind::Global | VarKind::Static)
    }
}
