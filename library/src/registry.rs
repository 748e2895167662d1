//! Active game registry
//!
//! A discoverability pointer to the menu controller so switch code can route
//! back to it. Holds a weak reference: the frame loop and the launcher own the
//! menu, the registry never does.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use brickbox_core::{GameHandle, GameLifecycle};

/// Shared, last-write-wins pointer to the menu controller
///
/// Clones refer to the same slot.
#[derive(Clone, Default)]
pub struct ActiveGameRegistry {
    slot: Rc<RefCell<Option<Weak<RefCell<dyn GameLifecycle>>>>>,
}

impl ActiveGameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the menu, replacing any earlier registration.
    pub fn register(&self, menu: &GameHandle) {
        *self.slot.borrow_mut() = Some(Rc::downgrade(menu));
    }

    /// The registered menu, if it is still alive.
    pub fn get(&self) -> Option<GameHandle> {
        self.slot.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub fn has_instance(&self) -> bool {
        self.get().is_some()
    }

    /// Whether `game` is the registered menu.
    pub fn is_menu(&self, game: &GameHandle) -> bool {
        self.get().is_some_and(|menu| Rc::ptr_eq(&menu, game))
    }

    pub fn clear(&self) {
        self.slot.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickbox_core::test_utils::TestGame;

    #[test]
    fn test_empty_registry() {
        let registry = ActiveGameRegistry::new();
        assert!(!registry.has_instance());
        assert!(registry.get().is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ActiveGameRegistry::new();
        let first: GameHandle = TestGame::shared("first");
        let second: GameHandle = TestGame::shared("second");

        registry.register(&first);
        registry.register(&second);

        assert!(registry.is_menu(&second));
        assert!(!registry.is_menu(&first));
        assert_eq!(registry.get().unwrap().borrow().game_id(), "second");
    }

    #[test]
    fn test_registry_does_not_own_menu() {
        let registry = ActiveGameRegistry::new();
        let menu: GameHandle = TestGame::shared("menu");
        registry.register(&menu);
        assert!(registry.has_instance());

        drop(menu);
        assert!(!registry.has_instance());
    }

    #[test]
    fn test_clones_share_slot() {
        let registry = ActiveGameRegistry::new();
        let clone = registry.clone();
        let menu: GameHandle = TestGame::shared("menu");

        clone.register(&menu);
        assert!(registry.is_menu(&menu));

        registry.clear();
        assert!(!clone.has_instance());
    }
}
