//! Function descriptors, bodies and dispatch tables.

use serde::{Deserialize, Serialize};

use crate::{ClassHash, ClassId, FunctionId, LibId, TypeData, TypeHint, VarId};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Ordinary function or method defined in the program.
    #[default]
    Local,
    /// Implemented by the runtime; only its declaration is known.
    Extern,
    /// Synthetic per-class holder for field initializers; never emitted.
    ClassHolder,
    /// Top-level code of the entry script.
    Main,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub type_hint: Option<TypeHint>,
    /// Inferred type; `None` until inference resolved it.
    #[serde(default)]
    pub type_data: Option<TypeData>,
    #[serde(default)]
    pub has_default: bool,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            type_hint: None,
            type_data: None,
            has_default: false,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: TypeHint) -> Self {
        self.type_data = hint.to_type_data();
        self.type_hint = Some(hint);
        self
    }

    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// Expressions of the lowered body IR.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    /// Stored as IEEE-754 bits so the IR stays `Eq + Hash`.
    Float(u64),
    Str(String),
    Var(VarId),
    /// Positional parameter of the enclosing function.
    Param(u32),
    Call {
        callee: FunctionId,
        #[serde(default)]
        args: Vec<Expr>,
    },
    New(ClassId),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Expr(Expr),
    Assign { var: VarId, value: Expr },
    Return(Option<Expr>),
}

/// One branch of a synthesized virtual dispatch.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DispatchCase {
    pub class_hash: ClassHash,
    pub class: ClassId,
    pub target: FunctionId,
}

/// Virtual dispatch reified as a lookup from receiver class hash to the
/// concrete implementation, with a fatal default branch.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DispatchTable {
    pub cases: Vec<DispatchCase>,
    /// Message of the fatal default, e.g. `call method(Animal::speak) on null object`.
    pub default_message: String,
}

impl DispatchTable {
    pub fn lookup(&self, hash: ClassHash) -> Option<&DispatchCase> {
        self.cases.iter().find(|case| case.class_hash == hash)
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionBody {
    /// Abstract or declared only.
    #[default]
    Empty,
    Statements(Vec<Stmt>),
    /// Produced by virtual method synthesis; never read from input.
    #[serde(skip)]
    Dispatch(DispatchTable),
}

impl FunctionBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, FunctionBody::Empty)
    }
}

/// Where a function's declaration and definition land in the output tree.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionFiles {
    /// Bucket directory, e.g. `o_42`.
    pub subdir: String,
    /// e.g. `Dog@@speak.h`
    pub header_name: String,
    /// `None` for inline functions, whose body lives in the header.
    pub src_name: Option<String>,
    /// Path used in `#include`: library headers dir for imported
    /// functions, `subdir/header_name` otherwise.
    pub header_full_name: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct FunctionData {
    /// Unique name; methods are `Class$$method`.
    pub name: String,
    /// Name within the class, equal to `name` for free functions.
    #[serde(default)]
    pub local_name: String,
    #[serde(default)]
    pub class_id: Option<ClassId>,
    /// Short name of the defining source file.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub kind: FunctionKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_inline: bool,
    /// Reachable from the entry point; unreachable overriders are not
    /// signature-checked.
    #[serde(default = "default_true")]
    pub is_required: bool,
    /// Wrapper whose real body lives in `<local_name>$$self`.
    #[serde(default)]
    pub is_virtual_method: bool,
    #[serde(default)]
    pub imported_from_lib: Option<LibId>,
    /// Exported by a static library build.
    #[serde(default)]
    pub lib_export: bool,
    #[serde(default)]
    pub needs_tl_common_h: bool,
    /// Instance methods carry the receiver at index 0.
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type_hint: Option<TypeHint>,
    #[serde(default = "TypeData::void")]
    pub return_type: TypeData,
    #[serde(default)]
    pub body: FunctionBody,
    #[serde(default)]
    pub dep: Vec<FunctionId>,
    #[serde(default)]
    pub class_dep: Vec<ClassId>,
    #[serde(default)]
    pub local_vars: Vec<VarId>,
    #[serde(default)]
    pub global_vars: Vec<VarId>,
    #[serde(default)]
    pub static_vars: Vec<VarId>,
    #[serde(default)]
    pub doc_comment: Option<String>,
    #[serde(skip)]
    pub files: Option<FunctionFiles>,
}

fn default_true() -> bool {
    true
}

impl FunctionData {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        FunctionData {
            local_name: name.clone(),
            name,
            class_id: None,
            file: String::new(),
            kind: FunctionKind::Local,
            is_abstract: false,
            is_static: false,
            is_inline: false,
            is_required: true,
            is_virtual_method: false,
            imported_from_lib: None,
            lib_export: false,
            needs_tl_common_h: false,
            params: Vec::new(),
            return_type_hint: None,
            return_type: TypeData::void(),
            body: FunctionBody::Empty,
            dep: Vec::new(),
            class_dep: Vec::new(),
            local_vars: Vec::new(),
            global_vars: Vec::new(),
            static_vars: Vec::new(),
            doc_comment: None,
            files: None,
        }
    }

    pub fn is_extern(&self) -> bool {
        self.kind == FunctionKind::Extern
    }

    pub fn is_main(&self) -> bool {
        self.kind == FunctionKind::Main
    }

    pub fn is_constructor(&self) -> bool {
        self.class_id.is_some() && self.local_name == "__construct"
    }

    pub fn is_instance_method(&self) -> bool {
        self.class_id.is_some() && !self.is_static
    }

    /// Leading parameters without a default value.
    pub fn min_argn(&self) -> usize {
        self.params.iter().take_while(|p| !p.has_default).count()
    }

    /// Local name of the implementation behind a virtual wrapper.
    pub fn self_method_name(&self) -> String {
        format!("{}$$self", self.local_name)
    }

    /// Identifier used in generated code: `Dog$$speak` becomes `f$Dog$$speak`.
    pub fn cpp_name(&self) -> String {
        format!("f${}", self.name.replace('\\', "$"))
    }

    /// File-system safe base name: `$` becomes `@`.
    pub fn file_stem(&self) -> String {
        self.name.replace(['$', '\\'], "@")
    }
}
