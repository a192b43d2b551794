use vela_ir::{ClassData, ClassId, ClassKind, PrimitiveType, ProgramGraph, TypeHint};

use super::*;

struct Zoo {
    graph: ProgramGraph,
    animal: ClassId,
    dog: ClassId,
    car: ClassId,
}

fn zoo() -> Zoo {
    let mut graph = ProgramGraph::new();
    let animal = graph.add_class(ClassData::new("Animal", ClassKind::Class));
    let mut dog = ClassData::new("Dog", ClassKind::Class);
    dog.parent = Some(animal);
    let dog = graph.add_class(dog);
    let car = graph.add_class(ClassData::new("Car", ClassKind::Class));
    Zoo {
        graph,
        animal,
        dog,
        car,
    }
}

fn prim(p: PrimitiveType) -> TypeHint {
    TypeHint::Primitive(p)
}

fn ret(base: &TypeHint, derived: &TypeHint, graph: &ProgramGraph) -> bool {
    return_hints_compatible(Some(base), Some(derived), graph)
}

#[test]
fn missing_hints() {
    let z = zoo();
    let int = prim(PrimitiveType::Int);
    assert!(return_hints_compatible(None, Some(&int), &z.graph));
    assert!(return_hints_compatible(None, None, &z.graph));
    assert!(!return_hints_compatible(Some(&int), None, &z.graph));
}

#[test]
fn void_base_accepts_anything() {
    let z = zoo();
    let void = prim(PrimitiveType::Void);
    assert!(ret(&void, &prim(PrimitiveType::String), &z.graph));
    assert!(ret(&void, &TypeHint::Instance(z.car), &z.graph));
}

#[test]
fn covariant_instances() {
    let z = zoo();
    let animal = TypeHint::Instance(z.animal);
    assert!(ret(&animal, &TypeHint::Instance(z.dog), &z.graph));
    assert!(ret(&animal, &animal, &z.graph));
    assert!(!ret(&animal, &TypeHint::Instance(z.car), &z.graph));
    assert!(!ret(&TypeHint::Instance(z.dog), &animal, &z.graph));
}

#[test]
fn nullable_base() {
    let z = zoo();
    let maybe_animal = TypeHint::optional(TypeHint::Instance(z.animal), true, false);
    let dog = TypeHint::Instance(z.dog);
    assert!(ret(&maybe_animal, &dog, &z.graph));
    assert!(ret(
        &maybe_animal,
        &TypeHint::optional(dog.clone(), true, false),
        &z.graph
    ));
    assert!(!ret(
        &maybe_animal,
        &TypeHint::optional(dog.clone(), false, true),
        &z.graph
    ));
    // a nullable override cannot satisfy a non-nullable base
    assert!(!ret(
        &TypeHint::Instance(z.animal),
        &TypeHint::optional(dog, true, false),
        &z.graph
    ));
}

#[test]
fn or_false_base_uses_type_lattice() {
    let z = zoo();
    let string_or_false = TypeHint::optional(prim(PrimitiveType::String), false, true);
    assert!(ret(&string_or_false, &prim(PrimitiveType::String), &z.graph));
    assert!(ret(&string_or_false, &prim(PrimitiveType::False), &z.graph));
    assert!(!ret(&string_or_false, &prim(PrimitiveType::Int), &z.graph));
}

#[test]
fn arrays_compare_elements() {
    let z = zoo();
    let animals = TypeHint::array(TypeHint::Instance(z.animal));
    assert!(ret(&animals, &TypeHint::array(TypeHint::Instance(z.dog)), &z.graph));
    assert!(!ret(&animals, &TypeHint::array(TypeHint::Instance(z.car)), &z.graph));
}

#[test]
fn scalars() {
    let z = zoo();
    let int = prim(PrimitiveType::Int);
    let float = prim(PrimitiveType::Float);
    assert!(!ret(&float, &int, &z.graph));
    assert!(!ret(&int, &float, &z.graph));
    assert!(ret(&prim(PrimitiveType::Mixed), &int, &z.graph));
    assert!(ret(&prim(PrimitiveType::Bool), &prim(PrimitiveType::False), &z.graph));
    assert!(!ret(
        &TypeHint::array(float),
        &TypeHint::array(int),
        &z.graph
    ));
}

#[test]
fn callables_are_not_constant() {
    let z = zoo();
    assert!(ret(&TypeHint::Callable, &TypeHint::Callable, &z.graph));
    assert!(!ret(&prim(PrimitiveType::Int), &TypeHint::Callable, &z.graph));
}

#[test]
fn params_are_contravariant() {
    let z = zoo();
    let animal = TypeHint::Instance(z.animal);
    let dog = TypeHint::Instance(z.dog);
    assert!(param_hints_compatible(Some(&dog), Some(&animal), &z.graph));
    assert!(!param_hints_compatible(Some(&animal), Some(&dog), &z.graph));
    // an untyped override parameter accepts anything
    assert!(param_hints_compatible(Some(&animal), None, &z.graph));
    assert!(!param_hints_compatible(None, Some(&animal), &z.graph));
}

#[test]
fn describe_renders_missing_hint() {
    let z = zoo();
    assert_eq!(describe(None, &z.graph), "NONE");
    assert_eq!(describe(Some(&TypeHint::Instance(z.dog)), &z.graph), "Dog");
}
