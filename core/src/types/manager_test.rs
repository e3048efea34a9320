use super::manager::TypeManager;
use super::{Type, is_assignable};
use bumpalo::Bump;

#[test]
fn test_primitives_are_static() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    assert!(core::ptr::eq(manager.int(), manager.int()));
    assert!(core::ptr::eq(manager.bool(), manager.bool()));
    assert!(core::ptr::eq(manager.str(), manager.str()));
    assert!(core::ptr::eq(manager.bytes(), manager.bytes()));
}

#[test]
fn test_union_is_flattened_and_deduplicated() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let int_or_str = manager.union(&[manager.int(), manager.str()]);
    let nested = manager.union(&[int_or_str, manager.int(), manager.unit()]);

    let Type::Union(members) = nested else {
        panic!("expected union, got {}", nested);
    };
    assert_eq!(members.len(), 3);
    assert!(members.iter().all(|m| !m.is_union()));
}

#[test]
fn test_union_is_order_independent() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let a = manager.union(&[manager.int(), manager.str(), manager.unit()]);
    let b = manager.union(&[manager.unit(), manager.int(), manager.str()]);
    assert_eq!(a, b);
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn test_singleton_union_collapses() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    assert_eq!(manager.union(&[manager.int(), manager.int()]), manager.int());
    assert_eq!(manager.union(&[manager.int(), manager.nothing()]), manager.int());
    assert_eq!(manager.union(&[]), manager.nothing());
}

#[test]
fn test_join_absorbs_empty_list() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let empty = manager.list(manager.nothing());
    let ints = manager.list(manager.int());
    assert_eq!(manager.join(empty, ints), ints);
    assert_eq!(manager.join(ints, empty), ints);
}

#[test]
fn test_without_removes_members() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let optional = manager.optional(manager.int());
    assert_eq!(manager.without(optional, &[manager.unit()]), manager.int());
    assert_eq!(
        manager.without(manager.int(), &[manager.int()]),
        manager.nothing()
    );
}

#[test]
fn test_assignability() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let optional = manager.optional(manager.int());
    assert!(is_assignable(manager.int(), optional));
    assert!(is_assignable(manager.unit(), optional));
    assert!(!is_assignable(optional, manager.int()));
    assert!(is_assignable(manager.nothing(), manager.str()));
    assert!(!is_assignable(manager.int(), manager.str()));

    // No numeric widening and no structural struct subtyping.
    assert!(!is_assignable(manager.bool(), manager.int()));
    assert!(!is_assignable(
        manager.std().write_set,
        manager.std().transfer_set
    ));

    // Lists are covariant.
    let ints = manager.list(manager.int());
    let optionals = manager.list(optional);
    assert!(is_assignable(ints, optionals));
    assert!(!is_assignable(optionals, ints));
    assert!(is_assignable(manager.list(manager.nothing()), ints));
}

#[test]
fn test_display_names() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    assert_eq!(manager.list(manager.bytes()).to_string(), "List[ByteVector]");
    assert_eq!(manager.std().address.to_string(), "Address");
    assert_eq!(
        manager.optional(manager.bool()).to_string(),
        "Unit|Boolean"
    );
}

#[test]
fn test_named_types() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    assert_eq!(manager.named("Int"), Some(manager.int()));
    assert_eq!(manager.named("Boolean"), Some(manager.bool()));
    assert_eq!(manager.named("Invocation"), Some(manager.std().invocation));
    assert_eq!(manager.named("Transaction"), Some(manager.std().transaction));
    assert_eq!(manager.named("Float"), None);
}

#[test]
fn test_action_results() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);
    let std = manager.std();

    assert!(std.is_action_result(std.write_set));
    assert!(std.is_action_result(manager.union(&[std.write_set, std.transfer_set])));
    assert!(std.is_action_result(manager.nothing()));
    assert!(!std.is_action_result(manager.bool()));
    assert!(!std.is_action_result(manager.union(&[std.write_set, manager.unit()])));
}
