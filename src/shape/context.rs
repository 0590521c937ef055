//! Values made available to `Deserialize` implementations while their shape is decoded.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;

thread_local! {
    static ACTIVE: RefCell<Vec<BTreeMap<String, Value>>> = RefCell::new(Vec::new());
}

/// Whether the current thread is decoding a shape rather than real data
pub fn is_documentation_decoding() -> bool {
    ACTIVE.with(|active| !active.borrow().is_empty())
}

/// A context value of the innermost shape decode running on this thread
pub fn context_value(key: &str) -> Option<Value> {
    ACTIVE.with(|active| {
        active
            .borrow()
            .last()
            .and_then(|values| values.get(key).cloned())
    })
}

/// Keeps a set of context values active until dropped
pub(crate) struct ContextGuard {
    _private: (),
}

pub(crate) fn enter(values: BTreeMap<String, Value>) -> ContextGuard {
    ACTIVE.with(|active| active.borrow_mut().push(values));
    ContextGuard { _private: () }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_contexts_shadow_outer() {
        assert!(!is_documentation_decoding());
        let outer = enter(BTreeMap::from([("locale".to_string(), Value::from("en"))]));
        assert_eq!(context_value("locale"), Some(Value::from("en")));
        {
            let _inner = enter(BTreeMap::new());
            assert!(is_documentation_decoding());
            assert_eq!(context_value("locale"), None);
        }
        assert_eq!(context_value("locale"), Some(Value::from("en")));
        drop(outer);
        assert!(!is_documentation_decoding());
    }
}
