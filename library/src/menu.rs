//! Menu controller
//!
//! The built-in game: a cyclic cursor over the catalog. Selecting a real
//! entry raises [`HostRequest::Launch`]; the launcher hands it to the
//! switch orchestrator.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use brickbox_core::{
    ControlAction, ControlEventType, ControlKey, FontAlign, FontSize, Frame, GameHandle,
    GameLifecycle, GameModules, HostRequest, LifecycleState, Sound,
};
use brickbox_shared::{CatalogEntry, MENU_GAME_ID};

use crate::catalog::GameCatalog;
use crate::orchestrator::SwitchGuard;
use crate::registry::ActiveGameRegistry;

/// Menu control actions
pub const ACTION_SELECT: u32 = 0;
pub const ACTION_PREVIOUS: u32 = 1;
pub const ACTION_NEXT: u32 = 2;

pub struct MenuController {
    id: String,
    modules: GameModules,
    active: bool,
    catalog: GameCatalog,
    pointer: usize,
    guard: SwitchGuard,
}

impl MenuController {
    /// Create the menu and register it as the registry's menu.
    pub fn create(
        catalog: GameCatalog,
        guard: SwitchGuard,
        registry: &ActiveGameRegistry,
    ) -> Rc<RefCell<Self>> {
        let mut modules = GameModules::new();
        modules.session_enabled = false;

        let menu = Rc::new(RefCell::new(Self {
            id: MENU_GAME_ID.to_string(),
            modules,
            active: false,
            catalog,
            pointer: 0,
            guard,
        }));
        let handle: GameHandle = menu.clone();
        registry.register(&handle);
        menu
    }

    /// Selection index, always within the current snapshot.
    pub fn pointer(&self) -> usize {
        self.pointer % self.catalog.len().max(1)
    }

    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    pub fn selected_entry(&self) -> Option<CatalogEntry> {
        self.catalog.get(self.pointer())
    }

    /// Name of the selected entry, for display.
    pub fn selected_display_name(&self) -> String {
        self.selected_entry()
            .map(|entry| entry.display_name().to_string())
            .unwrap_or_default()
    }

    /// Move the cursor one step right, wrapping at the end.
    pub fn select_next(&mut self) {
        let len = self.catalog.len().max(1);
        self.pointer = (self.pointer() + 1) % len;
    }

    /// Move the cursor one step left, wrapping at the start.
    pub fn select_previous(&mut self) {
        let len = self.catalog.len().max(1);
        self.pointer = (self.pointer() + len - 1) % len;
    }

    fn step(&mut self, forward: bool) {
        if !self.modules.state.is_playing() {
            return;
        }
        self.modules.sound.play(Sound::Action1);
        if forward {
            self.select_next();
        } else {
            self.select_previous();
        }
    }

    fn select(&self) -> Option<HostRequest> {
        if self.guard.in_flight() {
            tracing::debug!("Selection ignored: switch in flight");
            return None;
        }
        if !self.modules.state.is_started() {
            return None;
        }
        let entry = self.selected_entry()?;
        if entry.is_sentinel() {
            tracing::info!("Nothing to launch: catalog is '{}'", entry.id());
            return None;
        }
        Some(HostRequest::Launch(entry))
    }

    fn draw_title_screen(&self, frame: &mut Frame) {
        frame.text("Menu", 0.5, 0.15, FontSize::Large, FontAlign::Center);
        frame.text("Welcome to your", 0.5, 0.25, FontSize::Small, FontAlign::Center);
        frame.text("favorite brick game", 0.5, 0.32, FontSize::Small, FontAlign::Center);
        frame.text("simulator!", 0.5, 0.39, FontSize::Small, FontAlign::Center);
        frame.pulsing_text("Press start", 0.5, 0.64, FontSize::Medium);
        frame.pulsing_text("to continue.", 0.5, 0.72, FontSize::Medium);
    }

    fn draw_selection_screen(&self, frame: &mut Frame) {
        frame.text("Menu", 0.5, 0.15, FontSize::Large, FontAlign::Center);
        frame.text("Choose a game and", 0.5, 0.25, FontSize::Small, FontAlign::Center);
        frame.text("Press action to play", 0.5, 0.32, FontSize::Small, FontAlign::Center);
        frame.text("<", 0.1, 0.54, FontSize::Small, FontAlign::Right);
        frame.text(">", 0.9, 0.54, FontSize::Small, FontAlign::Left);
        frame.text(
            self.selected_display_name(),
            0.5,
            0.55,
            FontSize::Medium,
            FontAlign::Center,
        );
        frame.text("Left:    Previous option", 0.05, 0.78, FontSize::ExtraSmall, FontAlign::Left);
        frame.text("Right:   Next option", 0.05, 0.84, FontSize::ExtraSmall, FontAlign::Left);
        frame.text("Action:  Select", 0.05, 0.9, FontSize::ExtraSmall, FontAlign::Left);
    }
}

impl GameLifecycle for MenuController {
    fn game_id(&self) -> &str {
        &self.id
    }

    fn set_game_id(&mut self, id: String) {
        self.id = id;
    }

    fn modules(&self) -> &GameModules {
        &self.modules
    }

    fn modules_mut(&mut self) -> &mut GameModules {
        &mut self.modules
    }

    fn setup(&mut self) -> Result<()> {
        self.modules.control.unsubscribe_all();
        self.modules.install_default_bindings();

        let control = &mut self.modules.control;
        control.subscribe(
            ControlKey::Action,
            ControlEventType::Pressed,
            ControlAction::Game(ACTION_SELECT),
        );
        control.subscribe(
            ControlKey::Left,
            ControlEventType::Pressed,
            ControlAction::Game(ACTION_PREVIOUS),
        );
        control.subscribe(
            ControlKey::Right,
            ControlEventType::Pressed,
            ControlAction::Game(ACTION_NEXT),
        );
        self.modules.session_enabled = false;
        self.active = true;
        Ok(())
    }

    fn update(&mut self, _delta: f32) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) -> Result<()> {
        match self.modules.state.state() {
            LifecycleState::Off => {}
            LifecycleState::Idle => self.draw_title_screen(frame),
            LifecycleState::Paused | LifecycleState::Playing => self.draw_selection_screen(frame),
        }
        Ok(())
    }

    fn destroy(&mut self) {
        self.modules.control.unsubscribe_all();
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn on_action(&mut self, action: u32) -> Result<Option<HostRequest>> {
        if !self.active {
            return Ok(None);
        }
        match action {
            ACTION_SELECT => return Ok(self.select()),
            ACTION_PREVIOUS => self.step(false),
            ACTION_NEXT => self.step(true),
            other => tracing::debug!("Unknown menu action {other}"),
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickbox_core::{ControlEvent, Runtime};
    use brickbox_shared::Sentinel;

    fn entries(n: usize) -> Vec<CatalogEntry> {
        (0..n)
            .map(|i| CatalogEntry::new(format!("g{i}"), format!("Game {i}"), format!("u{i}")).unwrap())
            .collect()
    }

    fn menu_with(catalog: GameCatalog) -> (Rc<RefCell<MenuController>>, SwitchGuard, Runtime) {
        let registry = ActiveGameRegistry::new();
        let guard = SwitchGuard::default();
        let menu = MenuController::create(catalog, guard.clone(), &registry);
        menu.borrow_mut().setup().unwrap();

        let mut runtime = Runtime::default();
        runtime.set_active(menu.clone());
        runtime.resume();
        (menu, guard, runtime)
    }

    fn press(runtime: &mut Runtime, key: ControlKey) {
        runtime.handle_input(ControlEvent::pressed(key));
    }

    /// Power on and start: the state in which the cursor moves.
    fn start(runtime: &mut Runtime) {
        press(runtime, ControlKey::Power);
        press(runtime, ControlKey::Start);
    }

    // =============================================================
    // Registration / identity
    // =============================================================

    #[test]
    fn test_menu_registers_itself() {
        let registry = ActiveGameRegistry::new();
        let menu = MenuController::create(GameCatalog::fixed(entries(1)), SwitchGuard::default(), &registry);
        let handle: GameHandle = menu.clone();
        assert!(registry.is_menu(&handle));
        assert_eq!(menu.borrow().game_id(), "game-menu");
        assert!(!menu.borrow().modules().session_enabled);
    }

    // =============================================================
    // Selection pointer
    // =============================================================

    #[test]
    fn test_pointer_cycles_for_every_length() {
        for n in 1..=6 {
            let (menu, _guard, mut runtime) = menu_with(GameCatalog::fixed(entries(n)));
            start(&mut runtime);

            for _ in 0..n {
                press(&mut runtime, ControlKey::Right);
            }
            assert_eq!(menu.borrow().pointer(), 0, "n = {n}");

            press(&mut runtime, ControlKey::Left);
            assert_eq!(menu.borrow().pointer(), n - 1, "n = {n}");
        }
    }

    #[test]
    fn test_two_entry_scenario() {
        let catalog = GameCatalog::fixed(vec![
            CatalogEntry::new("a", "Alpha", "u1").unwrap(),
            CatalogEntry::new("b", "Beta", "u2").unwrap(),
        ]);
        let (menu, _guard, mut runtime) = menu_with(catalog);
        start(&mut runtime);

        assert_eq!(menu.borrow().pointer(), 0);
        press(&mut runtime, ControlKey::Right);
        assert_eq!(menu.borrow().pointer(), 1);
        assert_eq!(menu.borrow().selected_display_name(), "Beta");
        press(&mut runtime, ControlKey::Right);
        assert_eq!(menu.borrow().pointer(), 0);
    }

    #[test]
    fn test_cursor_only_moves_while_playing() {
        let (menu, _guard, mut runtime) = menu_with(GameCatalog::fixed(entries(3)));

        // Off
        press(&mut runtime, ControlKey::Right);
        assert_eq!(menu.borrow().pointer(), 0);

        // On, title screen
        press(&mut runtime, ControlKey::Power);
        press(&mut runtime, ControlKey::Right);
        assert_eq!(menu.borrow().pointer(), 0);

        // Playing
        press(&mut runtime, ControlKey::Start);
        press(&mut runtime, ControlKey::Right);
        assert_eq!(menu.borrow().pointer(), 1);

        // Paused
        press(&mut runtime, ControlKey::Start);
        press(&mut runtime, ControlKey::Right);
        assert_eq!(menu.borrow().pointer(), 1);
    }

    #[test]
    fn test_cursor_feedback_sound() {
        let (menu, _guard, mut runtime) = menu_with(GameCatalog::fixed(entries(2)));
        start(&mut runtime);
        menu.borrow_mut().modules_mut().sound.clear();

        press(&mut runtime, ControlKey::Left);
        assert_eq!(menu.borrow().modules().sound.pending(), &[Sound::Action1]);
    }

    #[test]
    fn test_power_on_plays_theme() {
        let (menu, _guard, mut runtime) = menu_with(GameCatalog::fixed(entries(2)));
        press(&mut runtime, ControlKey::Power);
        assert_eq!(menu.borrow().modules().sound.pending(), &[Sound::StartTheme]);
    }

    // =============================================================
    // Selection
    // =============================================================

    #[test]
    fn test_action_requests_launch_when_started() {
        let (_menu, _guard, mut runtime) = menu_with(GameCatalog::fixed(entries(2)));
        start(&mut runtime);
        press(&mut runtime, ControlKey::Right);
        press(&mut runtime, ControlKey::Action);

        match runtime.next_request() {
            Some(HostRequest::Launch(entry)) => assert_eq!(entry.id(), "g1"),
            other => panic!("expected launch, got {other:?}"),
        }
    }

    #[test]
    fn test_action_honored_while_paused() {
        let (_menu, _guard, mut runtime) = menu_with(GameCatalog::fixed(entries(2)));
        start(&mut runtime);
        press(&mut runtime, ControlKey::Start);
        press(&mut runtime, ControlKey::Action);
        assert!(matches!(runtime.next_request(), Some(HostRequest::Launch(_))));
    }

    #[test]
    fn test_action_ignored_before_start() {
        let (_menu, _guard, mut runtime) = menu_with(GameCatalog::fixed(entries(2)));
        press(&mut runtime, ControlKey::Action);
        press(&mut runtime, ControlKey::Power);
        press(&mut runtime, ControlKey::Action);
        assert!(!runtime.has_pending_requests());
    }

    #[test]
    fn test_action_ignored_for_sentinels() {
        for kind in Sentinel::ALL {
            let (menu, _guard, mut runtime) = menu_with(GameCatalog::sentinel(kind));
            start(&mut runtime);
            press(&mut runtime, ControlKey::Action);
            assert!(!runtime.has_pending_requests(), "{kind:?}");
            assert_eq!(menu.borrow().pointer(), 0);
        }
    }

    #[test]
    fn test_action_ignored_while_switch_in_flight() {
        let (_menu, guard, mut runtime) = menu_with(GameCatalog::fixed(entries(2)));
        start(&mut runtime);

        guard.set_in_flight(true);
        press(&mut runtime, ControlKey::Action);
        assert!(!runtime.has_pending_requests());

        guard.set_in_flight(false);
        press(&mut runtime, ControlKey::Action);
        assert!(runtime.has_pending_requests());
    }

    #[test]
    fn test_destroyed_menu_ignores_input() {
        let (menu, _guard, mut runtime) = menu_with(GameCatalog::fixed(entries(2)));
        start(&mut runtime);
        menu.borrow_mut().destroy();

        press(&mut runtime, ControlKey::Right);
        press(&mut runtime, ControlKey::Action);
        assert_eq!(menu.borrow().pointer(), 0);
        assert!(!runtime.has_pending_requests());
        assert!(menu.borrow_mut().on_action(ACTION_SELECT).unwrap().is_none());
    }

    // =============================================================
    // Rendering
    // =============================================================

    #[test]
    fn test_render_per_state() {
        let (menu, _guard, mut runtime) = menu_with(GameCatalog::fixed(entries(2)));
        let mut frame = Frame::new();

        menu.borrow_mut().render(&mut frame).unwrap();
        assert!(frame.is_empty());

        press(&mut runtime, ControlKey::Power);
        menu.borrow_mut().render(&mut frame).unwrap();
        assert!(frame.contains_text("Press start"));
        assert!(frame.contains_text("simulator!"));

        frame.clear();
        press(&mut runtime, ControlKey::Start);
        menu.borrow_mut().render(&mut frame).unwrap();
        assert!(frame.contains_text("Game 0"));
        assert!(frame.contains_text("Press action to play"));
        assert!(!frame.contains_text("Press start"));
    }

    #[test]
    fn test_render_loading_placeholder() {
        let (menu, _guard, mut runtime) = menu_with(GameCatalog::sentinel(Sentinel::Loading));
        start(&mut runtime);
        let mut frame = Frame::new();
        menu.borrow_mut().render(&mut frame).unwrap();
        assert!(frame.contains_text("Loading..."));
    }
}
