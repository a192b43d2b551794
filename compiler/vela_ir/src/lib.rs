//! Vela IR - the resolved program graph consumed by the code generator.
//!
//! The front-end and type inference hand over a finished whole-program
//! graph: classes with their hierarchy links, functions with dependency
//! sets and inferred types, and variables. This crate holds that model:
//!
//! - Dense ids (`ClassId`, `FunctionId`, `VarId`, `LibId`) indexing the graph
//! - Declared type hints (`TypeHint`) and inferred types (`TypeData`)
//! - Class and function descriptors, including the file placement that the
//!   preparation pass assigns exactly once
//! - Hierarchy queries as iterative worklists
//! - [`CompilationContext`]: graph plus [`Settings`], frozen behind an `Arc`
//!   once preparation finishes
//!
//! The graph can be built in code or deserialized from JSON
//! ([`ProgramGraph::from_json`]).

mod class;
mod context;
mod function;
mod graph;
mod hash;
mod ids;
mod types;
mod var;

pub use class::{ClassData, ClassFiles, ClassHash, ClassKind, FieldData};
pub use context::{CompilationContext, Settings};
pub use function::{
    DispatchCase, DispatchTable, Expr, FunctionBody, FunctionData, FunctionFiles, FunctionKind,
    Param, Stmt,
};
pub use graph::{LibData, LoadError, ProgramGraph};
pub use hash::stable_hash;
pub use ids::{ClassId, FunctionId, LibId, VarId};
pub use types::{PrimitiveType, TypeData, TypeHint, TypeKind};
pub use var::{VarData, VarKind};
