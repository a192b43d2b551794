use std::collections::BTreeSet;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::{ClassData, ClassFiles, ClassId};

use super::types::{cpp_type, escape};
use super::CodeGenRootCmd;
use crate::generator::CodeGenerator;
use crate::includes::IncludesCollector;

/// Struct declaration of a class: bases, fields, identity accessors.
#[derive(Debug)]
pub struct ClassDeclaration {
    pub class: ClassId,
}

impl CodeGenRootCmd for ClassDeclaration {
    fn description(&self) -> String {
        format!("ClassDeclaration({})", self.class.raw())
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let graph = gen.graph();
        let class = graph.class(self.class);
        let Some(files) = class_files(gen, class) else {
            return;
        };
        open_header(gen, files);

        let mut includes = IncludesCollector::new(graph, gen.settings(), gen.diagnostics());
        includes.add_base_classes_include(self.class);
        // fields only hold instances by handle, a declaration is enough
        let mut field_classes = BTreeSet::new();
        for field in &class.fields {
            field.type_data.collect_classes(&mut field_classes);
        }
        for field_class in field_classes {
            if field_class != self.class {
                includes.add_class_forward_declaration(field_class);
            }
        }
        gen.write_includes(&includes.compile());
        gen.newline();

        let bases: Vec<String> = class
            .parent
            .iter()
            .chain(&class.implements)
            .map(|&base| format!("public {}", graph.class(base).cpp_name()))
            .collect();
        let bases = if bases.is_empty() {
            format!("public refcountable_php_classes<{}>", class.cpp_name())
        } else {
            bases.join(", ")
        };
        let is_final = !class.is_abstract && class.derived.is_empty();
        let polymorphic = class.parent.is_some() || !class.implements.is_empty();
        let (prefix, suffix) = if polymorphic {
            ("", " override")
        } else if class.derived.is_empty() {
            ("", "")
        } else {
            ("virtual ", "")
        };

        let header = format!(
            "struct {}{} : {bases}",
            class.cpp_name(),
            if is_final { " final" } else { "" }
        );
        gen.open_block(&header);
        for field in &class.fields {
            gen.writeln(&format!("{} v${};", cpp_type(&field.type_data, graph), field.name));
        }
        if !class.fields.is_empty() {
            gen.newline();
        }
        gen.writeln(&format!(
            "{prefix}const char *get_class() const noexcept{suffix} {{ return \"{}\"; }}",
            escape(&class.name)
        ));
        gen.writeln(&format!(
            "{prefix}int32_t get_hash() const noexcept{suffix} {{ return static_cast<int32_t>({}U); }}",
            class.hash()
        ));
        gen.close_block(";");
        gen.close_file();
    }
}

/// Abstract struct of an interface; the identity accessors are pure.
#[derive(Debug)]
pub struct InterfaceDeclaration {
    pub interface: ClassId,
}

impl CodeGenRootCmd for InterfaceDeclaration {
    fn description(&self) -> String {
        format!("InterfaceDeclaration({})", self.interface.raw())
    }

    fn compile(&self, gen: &mut CodeGenerator<'_>) {
        let graph = gen.graph();
        let interface = graph.class(self.interface);
        let Some(files) = class_files(gen, interface) else {
            return;
        };
        open_header(gen, files);

        let mut includes = IncludesCollector::new(graph, gen.settings(), gen.diagnostics());
        includes.add_base_classes_include(self.interface);
        gen.write_includes(&includes.compile());
        gen.newline();

        let bases: Vec<String> = interface
            .implements
            .iter()
            .map(|&base| format!("public virtual {}", graph.class(base).cpp_name()))
            .collect();
        let bases = if bases.is_empty() {
            "public virtual abstract_refcountable_php_interface".to_string()
        } else {
            bases.join(", ")
        };
        gen.open_block(&format!("struct {} : {bases}", interface.cpp_name()));
        gen.writeln("virtual const char *get_class() const noexcept = 0;");
        gen.writeln("virtual int32_t get_hash() const noexcept = 0;");
        gen.newline();
        gen.writeln(&format!("virtual ~{}() = default;", interface.cpp_name()));
        gen.close_block(";");
        gen.close_file();
    }
}

fn class_files<'g>(gen: &CodeGenerator<'g>, class: &'g ClassData) -> Option<&'g ClassFiles> {
    let files = class.files.as_ref();
    if files.is_none() {
        gen.diagnostics().emit(
            Diagnostic::error(ErrorCode::E9001)
                .with_message(format!("class `{}` reached code generation without a header", class.name))
                .with_label(&class.name, "not prepared"),
        );
    }
    files
}

fn open_header(gen: &mut CodeGenerator<'_>, files: &ClassFiles) {
    gen.open_file(files.subdir.clone(), files.header_name.clone());
    gen.writeln("#pragma once");
    gen.include_runtime();
}
