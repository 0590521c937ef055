//! Reduces wrapper types to the type they stand for.
//!
//! `Option<T>` and the standard smart pointers are always transparent; other types opt in
//! through [`crate::registry::register_wrapping`].

use crate::registry;
use crate::type_identity::TypeIdentity;

/// Pointer types documented as their pointee
const TRANSPARENT_POINTERS: &[(&str, &str)] = &[
    ("alloc::boxed", "Box"),
    ("alloc::sync", "Arc"),
    ("alloc::rc", "Rc"),
    ("alloc::borrow", "Cow"),
];

pub fn is_transparent_pointer(identity: &TypeIdentity) -> bool {
    TRANSPARENT_POINTERS
        .iter()
        .any(|(module, name)| identity.module == *module && identity.name == *name)
}

/// The type directly wrapped by `identity`, if any
pub fn wrapped_type(identity: &TypeIdentity) -> Option<TypeIdentity> {
    if identity.is_optional() || is_transparent_pointer(identity) {
        return identity.first_type_parameter().cloned();
    }
    registry::wrapped_type(identity)
}

/// Unwrap layer by layer until a type that wraps nothing is reached.
///
/// Wrapping chains that loop back on themselves stop at the last type before the loop.
pub fn leaf_type(identity: &TypeIdentity) -> TypeIdentity {
    let mut history: Vec<TypeIdentity> = Vec::new();
    let mut current = identity.clone();
    while let Some(next) = wrapped_type(&current) {
        history.push(current.clone());
        if history.contains(&next) {
            break;
        }
        current = next;
    }
    current
}

/// Remove one optional layer
pub fn strip_optional(identity: &TypeIdentity) -> TypeIdentity {
    if identity.is_optional() {
        if let Some(wrapped) = identity.first_type_parameter() {
            return wrapped.clone();
        }
    }
    identity.clone()
}

/// Remove optional and pointer layers, leaving registered wrappers in place
pub fn strip_transparent(identity: &TypeIdentity) -> TypeIdentity {
    let mut current = identity.clone();
    while current.is_optional() || is_transparent_pointer(&current) {
        match current.first_type_parameter() {
            Some(inner) => current = inner.clone(),
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{register_wrapping, TypeWrapping};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct Meters;
    struct Distance;
    struct Ping;
    struct Pong;
    struct Selfish;

    impl TypeWrapping for Distance {
        type Wrapped = Option<Meters>;
    }

    impl TypeWrapping for Meters {
        type Wrapped = f32;
    }

    impl TypeWrapping for Ping {
        type Wrapped = Pong;
    }

    impl TypeWrapping for Pong {
        type Wrapped = Ping;
    }

    impl TypeWrapping for Selfish {
        type Wrapped = Selfish;
    }

    #[test]
    fn test_leaf_type_through_optional_and_registered_layers() {
        register_wrapping::<Distance>();
        register_wrapping::<Meters>();

        let leaf = leaf_type(&TypeIdentity::of::<Option<Distance>>());
        assert_eq!(leaf, TypeIdentity::of::<f32>());
    }

    #[test]
    fn test_leaf_type_of_plain_type_is_itself() {
        let identity = TypeIdentity::of::<Vec<String>>();
        assert_eq!(leaf_type(&identity), identity);
    }

    #[test]
    fn test_leaf_type_stops_on_wrapping_cycles() {
        register_wrapping::<Ping>();
        register_wrapping::<Pong>();
        register_wrapping::<Selfish>();

        assert_eq!(leaf_type(&TypeIdentity::of::<Ping>()), TypeIdentity::of::<Pong>());
        assert_eq!(leaf_type(&TypeIdentity::of::<Selfish>()), TypeIdentity::of::<Selfish>());
    }

    #[test]
    fn test_pointers_are_transparent() {
        let identity = TypeIdentity::of::<Option<Box<Arc<u8>>>>();
        assert_eq!(leaf_type(&identity), TypeIdentity::of::<u8>());
        assert_eq!(strip_transparent(&identity), TypeIdentity::of::<u8>());
    }

    #[test]
    fn test_strip_optional_removes_one_layer() {
        let identity = TypeIdentity::of::<Option<Option<u8>>>();
        assert_eq!(strip_optional(&identity), TypeIdentity::of::<Option<u8>>());
        assert_eq!(strip_optional(&TypeIdentity::of::<u8>()), TypeIdentity::of::<u8>());
    }
}
