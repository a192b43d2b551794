//! Type-hint variance between an interface method and its override.
//!
//! Returns are covariant (the override may be more specific), parameters
//! contravariant (the override may be more general). `int` is not treated
//! as a subtype of `float` here: an override returning `int` where the base
//! promises `float` is rejected.

use vela_ir::{PrimitiveType, ProgramGraph, TypeHint, TypeKind};

/// Whether `derived` may stand where `base` is declared as a return type.
pub fn return_hints_compatible(
    base: Option<&TypeHint>,
    derived: Option<&TypeHint>,
    graph: &ProgramGraph,
) -> bool {
    let Some(base) = base else {
        return true;
    };
    let Some(derived) = derived else {
        return false;
    };
    if base == derived {
        return true;
    }

    // A `void` base accepts any override return.
    if base.is_void() {
        return true;
    }

    if let (TypeHint::Array(base_inner), TypeHint::Array(derived_inner)) = (base, derived) {
        return return_hints_compatible(Some(base_inner), Some(derived_inner), graph);
    }

    if let TypeHint::Optional {
        inner: base_inner,
        or_null,
        or_false,
    } = base
    {
        let base_is_nullable = *or_null && !*or_false;
        if let TypeHint::Optional {
            inner: derived_inner,
            or_null: derived_or_null,
            or_false: derived_or_false,
        } = derived
        {
            return base_is_nullable
                && *derived_or_null
                && !*derived_or_false
                && return_hints_compatible(Some(base_inner), Some(derived_inner), graph);
        }
        if base_is_nullable {
            // `?T` accepts a plain `T`, not the other way around
            return return_hints_compatible(Some(base_inner), Some(derived), graph);
        }
        // or-false bases fall through to the type lattice
    }

    if let (TypeHint::Instance(base_class), TypeHint::Instance(derived_class)) = (base, derived) {
        return graph.is_parent_of(*base_class, *derived_class);
    }

    if base.is_typedata_constexpr() && derived.is_typedata_constexpr() {
        let (Some(base_data), Some(derived_data)) = (base.to_type_data(), derived.to_type_data())
        else {
            return false;
        };
        if base_data.kind == TypeKind::Primitive(PrimitiveType::Float)
            && derived_data.kind == TypeKind::Primitive(PrimitiveType::Int)
        {
            return false;
        }
        return derived_data.is_less_or_equal(&base_data, graph);
    }

    false
}

/// Whether `derived` may stand where `base` is declared as a parameter type.
pub fn param_hints_compatible(
    base: Option<&TypeHint>,
    derived: Option<&TypeHint>,
    graph: &ProgramGraph,
) -> bool {
    return_hints_compatible(derived, base, graph)
}

/// Human-readable rendering of an optional hint.
pub(crate) fn describe(hint: Option<&TypeHint>, graph: &ProgramGraph) -> String {
    hint.map_or_else(|| "NONE".to_string(), |h| h.display(graph))
}

#[cfg(test)]
mod tests;
