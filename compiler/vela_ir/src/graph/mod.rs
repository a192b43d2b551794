//! The whole-program graph.
//!
//! Tables are indexed by the dense ids from [`crate::ids`]. Builders keep
//! the `derived` back-links in sync; a graph read from JSON gets them
//! rebuilt by [`ProgramGraph::link_hierarchy`].

mod hierarchy;

use serde::{Deserialize, Serialize};

use crate::{ClassData, ClassId, FunctionData, FunctionId, LibId, VarData, VarId, VarKind};

/// A prebuilt static library whose functions may be imported.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct LibData {
    pub name: String,
    /// Directory holding the library's exported headers.
    pub headers_dir: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("malformed program graph: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{owner} refers to missing {what} #{index}")]
    Dangling {
        owner: String,
        what: &'static str,
        index: u32,
    },
    #[error("class `{0}` is its own ancestor")]
    CyclicHierarchy(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramGraph {
    #[serde(default)]
    classes: Vec<ClassData>,
    #[serde(default)]
    functions: Vec<FunctionData>,
    #[serde(default)]
    vars: Vec<VarData>,
    #[serde(default)]
    libs: Vec<LibData>,
    #[serde(default)]
    main_function: Option<FunctionId>,
}

impl ProgramGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse, validate and link a graph produced by the front-end.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let mut graph: ProgramGraph = serde_json::from_str(text)?;
        graph.validate()?;
        graph.register_methods();
        graph.link_hierarchy();
        graph.check_acyclic()?;
        tracing::debug!(
            classes = graph.classes.len(),
            functions = graph.functions.len(),
            vars = graph.vars.len(),
            "program graph loaded"
        );
        Ok(graph)
    }

    pub fn add_class(&mut self, class: ClassData) -> ClassId {
        let id = ClassId::new(index_u32(self.classes.len()));
        let bases: Vec<ClassId> = class.parent.iter().chain(&class.implements).copied().collect();
        self.classes.push(class);
        for base in bases {
            self.classes[base.index()].derived.push(id);
        }
        id
    }

    /// Add a function, registering it as a method of its class if it has one.
    pub fn add_function(&mut self, function: FunctionData) -> FunctionId {
        let id = FunctionId::new(index_u32(self.functions.len()));
        if let Some(class) = function.class_id {
            let class = &mut self.classes[class.index()];
            if function.is_constructor() {
                class.construct_function = Some(id);
            }
            let table = if function.is_static {
                &mut class.static_methods
            } else {
                &mut class.instance_methods
            };
            table.insert(function.local_name.clone(), id);
        }
        if function.is_main() {
            self.main_function = Some(id);
        }
        self.functions.push(function);
        id
    }

    pub fn add_var(&mut self, var: VarData) -> VarId {
        let id = VarId::new(index_u32(self.vars.len()));
        self.vars.push(var);
        id
    }

    pub fn add_lib(&mut self, lib: LibData) -> LibId {
        let id = LibId::new(index_u32(self.libs.len()));
        self.libs.push(lib);
        id
    }

    #[inline]
    pub fn class(&self, id: ClassId) -> &ClassData {
        &self.classes[id.index()]
    }

    #[inline]
    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassData {
        &mut self.classes[id.index()]
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &FunctionData {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionData {
        &mut self.functions[id.index()]
    }

    #[inline]
    pub fn var(&self, id: VarId) -> &VarData {
        &self.vars[id.index()]
    }

    #[inline]
    pub fn lib(&self, id: LibId) -> &LibData {
        &self.libs[id.index()]
    }

    pub fn main_function(&self) -> Option<FunctionId> {
        self.main_function
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len()).map(|i| ClassId::new(index_u32(i)))
    }

    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> + '_ {
        (0..self.functions.len()).map(|i| FunctionId::new(index_u32(i)))
    }

    pub fn var_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.vars.len()).map(|i| VarId::new(index_u32(i)))
    }

    /// Global and function-static variables, in id order.
    pub fn global_storage_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.var_ids().filter(|id| self.var(*id).is_global_storage())
    }

    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.class_ids().find(|id| self.class(*id).name == name)
    }

    pub fn find_function(&self, name: &str) -> Option<FunctionId> {
        self.function_ids().find(|id| self.function(*id).name == name)
    }

    /// `Class::method` for methods, the plain name otherwise.
    pub fn human_readable_name(&self, id: FunctionId) -> String {
        let function = self.function(id);
        match function.class_id {
            Some(class) => format!("{}::{}", self.class(class).name, function.local_name),
            None => function.name.clone(),
        }
    }

    /// Fill class method tables and the entry point from the functions'
    /// own `class_id`/`kind`, for graphs that only record one side.
    fn register_methods(&mut self) {
        for function in &mut self.functions {
            if function.local_name.is_empty() {
                let local = function.name.rsplit("$$").next().unwrap_or_default();
                function.local_name = local.to_string();
            }
        }
        for (index, function) in self.functions.iter().enumerate() {
            let id = FunctionId::new(index_u32(index));
            if function.is_main() && self.main_function.is_none() {
                self.main_function = Some(id);
            }
            let Some(class) = function.class_id else {
                continue;
            };
            let class = &mut self.classes[class.index()];
            if function.is_constructor() {
                class.construct_function.get_or_insert(id);
            }
            let table = if function.is_static {
                &mut class.static_methods
            } else {
                &mut class.instance_methods
            };
            table.entry(function.local_name.clone()).or_insert(id);
        }
    }

    /// Recompute every class's `derived` list from `parent`/`implements`.
    pub fn link_hierarchy(&mut self) {
        for class in &mut self.classes {
            class.derived.clear();
        }
        for id in 0..self.classes.len() {
            let child = ClassId::new(index_u32(id));
            let bases: Vec<ClassId> = self.classes[id]
                .parent
                .iter()
                .chain(&self.classes[id].implements)
                .copied()
                .collect();
            for base in bases {
                self.classes[base.index()].derived.push(child);
            }
        }
    }

    fn validate(&self) -> Result<(), LoadError> {
        let check = |owner: &str, what: &'static str, index: usize, len: usize| {
            if index < len {
                Ok(())
            } else {
                Err(LoadError::Dangling {
                    owner: owner.to_string(),
                    what,
                    index: index_u32(index),
                })
            }
        };
        let (n_classes, n_functions, n_vars, n_libs) = (
            self.classes.len(),
            self.functions.len(),
            self.vars.len(),
            self.libs.len(),
        );
        for class in &self.classes {
            for base in class.parent.iter().chain(&class.implements) {
                check(&class.name, "class", base.index(), n_classes)?;
            }
            for method in class
                .instance_methods
                .values()
                .chain(class.static_methods.values())
                .chain(&class.construct_function)
            {
                check(&class.name, "function", method.index(), n_functions)?;
            }
        }
        for function in &self.functions {
            let owner = function.name.as_str();
            for callee in &function.dep {
                check(owner, "function", callee.index(), n_functions)?;
            }
            for class in function.class_dep.iter().chain(&function.class_id) {
                check(owner, "class", class.index(), n_classes)?;
            }
            for var in function
                .local_vars
                .iter()
                .chain(&function.global_vars)
                .chain(&function.static_vars)
            {
                check(owner, "var", var.index(), n_vars)?;
            }
            if let Some(lib) = function.imported_from_lib {
                check(owner, "lib", lib.index(), n_libs)?;
            }
        }
        if let Some(main) = self.main_function {
            check("program", "function", main.index(), n_functions)?;
        }
        Ok(())
    }

    fn check_acyclic(&self) -> Result<(), LoadError> {
        for id in self.class_ids() {
            let class = self.class(id);
            let mut pending: Vec<ClassId> =
                class.parent.iter().chain(&class.implements).copied().collect();
            let mut seen = vec![false; self.classes.len()];
            while let Some(next) = pending.pop() {
                if next == id {
                    return Err(LoadError::CyclicHierarchy(class.name.clone()));
                }
                if std::mem::replace(&mut seen[next.index()], true) {
                    continue;
                }
                let base = self.class(next);
                pending.extend(base.parent.iter().chain(&base.implements));
            }
        }
        Ok(())
    }

    /// Variables of one storage kind, in id order.
    pub fn vars_of_kind(&self, kind: VarKind) -> Vec<VarId> {
        self.var_ids().filter(|id| self.var(*id).kind == kind).collect()
    }
}

#[inline]
fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}
