// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in UNLang node library.

pub mod data;
pub mod debug;
pub mod flow;
pub mod math;
pub mod time;

pub use data::SetVariable;
pub use debug::Console;
pub use flow::{Entry, Update};
pub use math::Counter;
pub use time::DeltaTime;

use crate::registry::NodeRegistry;

/// Root category path of the built-in nodes
pub const UNLANG_CATEGORY: &str = "UNLang/";

/// Create a registry holding every built-in node type
pub fn builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    flow::register(&mut registry);
    time::register(&mut registry);
    debug::register(&mut registry);
    math::register(&mut registry);
    data::register(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), 6);
        for key in [
            Entry::type_key(),
            Update::type_key(),
            DeltaTime::type_key(),
            Console::type_key(),
            Counter::type_key(),
            SetVariable::type_key(),
        ] {
            assert!(registry.contains(&key), "missing {key}");
            assert!(key.category.starts_with(UNLANG_CATEGORY));
        }
        assert_eq!(registry.types_in_category("UNLang/Time/").count(), 1);
    }
}
