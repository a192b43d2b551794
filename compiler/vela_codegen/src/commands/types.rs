//! Inferred types and literals as they appear in generated code.

use vela_ir::{PrimitiveType, ProgramGraph, TypeData, TypeKind};

/// Generated type for an inferred type.
///
/// `?T` and `T|false` become `Optional<T>`; `mixed` and class instances
/// already hold null, so they stay as they are.
pub fn cpp_type(type_data: &TypeData, graph: &ProgramGraph) -> String {
    let base = match &type_data.kind {
        TypeKind::Primitive(p) => primitive(*p).to_string(),
        TypeKind::Array(inner) => format!("array<{}>", cpp_type(inner, graph)),
        TypeKind::Instance(class) => format!("class_instance<{}>", graph.class(*class).cpp_name()),
        TypeKind::Tuple(items) => {
            let items: Vec<_> = items.iter().map(|t| cpp_type(t, graph)).collect();
            format!("std::tuple<{}>", items.join(", "))
        }
    };
    let nullable_already = matches!(
        type_data.kind,
        TypeKind::Instance(_) | TypeKind::Primitive(PrimitiveType::Mixed | PrimitiveType::Any)
    );
    let wrap = type_data.or_false || (type_data.or_null && !nullable_already);
    if wrap && !matches!(type_data.kind, TypeKind::Primitive(PrimitiveType::Mixed | PrimitiveType::Any)) {
        format!("Optional<{base}>")
    } else {
        base
    }
}

fn primitive(p: PrimitiveType) -> &'static str {
    match p {
        PrimitiveType::Any | PrimitiveType::Null | PrimitiveType::Mixed => "mixed",
        PrimitiveType::False | PrimitiveType::Bool => "bool",
        PrimitiveType::Int => "int64_t",
        PrimitiveType::Float => "double",
        PrimitiveType::String => "string",
        PrimitiveType::Void => "void",
    }
}

/// `string("...", len)` with C escapes; `len` counts bytes.
pub fn cpp_string_literal(s: &str) -> String {
    format!("string(\"{}\", {})", escape(s), s.len())
}

/// Escape for a C string literal.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\000"),
            c => out.push(c),
        }
    }
    out
}
