//! Control module: logical keys and input subscriptions
//!
//! Each controller owns one [`ControlModule`]. Subscriptions map a key and
//! press phase to a [`ControlAction`]; the runtime notifies the active
//! controller's module and dispatches the returned actions.

use smallvec::SmallVec;

/// Logical keys delivered by the display/control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Left,
    Right,
    Up,
    Down,
    Action,
    Start,
    Exit,
    Power,
}

impl ControlKey {
    pub const ALL: [ControlKey; 8] = [
        ControlKey::Left,
        ControlKey::Right,
        ControlKey::Up,
        ControlKey::Down,
        ControlKey::Action,
        ControlKey::Start,
        ControlKey::Exit,
        ControlKey::Power,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ControlKey::Left => "left",
            ControlKey::Right => "right",
            ControlKey::Up => "up",
            ControlKey::Down => "down",
            ControlKey::Action => "action",
            ControlKey::Start => "start",
            ControlKey::Exit => "exit",
            ControlKey::Power => "power",
        }
    }

    /// Parse a key name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
    }

    /// Numeric code passed to guest `on_control` handlers.
    pub fn code(self) -> i32 {
        match self {
            ControlKey::Left => 0,
            ControlKey::Right => 1,
            ControlKey::Up => 2,
            ControlKey::Down => 3,
            ControlKey::Action => 4,
            ControlKey::Start => 5,
            ControlKey::Exit => 6,
            ControlKey::Power => 7,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.code() as u32 == code)
    }
}

/// Press phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlEventType {
    Pressed,
    Released,
}

/// A single discrete key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlEvent {
    pub key: ControlKey,
    pub event_type: ControlEventType,
}

impl ControlEvent {
    pub fn pressed(key: ControlKey) -> Self {
        Self {
            key,
            event_type: ControlEventType::Pressed,
        }
    }

    pub fn released(key: ControlKey) -> Self {
        Self {
            key,
            event_type: ControlEventType::Released,
        }
    }
}

/// What a subscription does when its key fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    /// Game-defined action, handed back to the controller's `on_action`
    Game(u32),
    /// Engine default: toggle power
    TogglePower,
    /// Engine default: start from the title screen, otherwise pause/resume
    StartOrPause,
    /// Return to the menu
    ExitToMenu,
    /// Return to the menu powered off (only if the game is on)
    PowerToMenu,
}

/// Handle returned by [`ControlModule::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone)]
struct Subscription {
    id: SubscriptionId,
    key: ControlKey,
    event_type: ControlEventType,
    action: ControlAction,
}

/// Actions fired by one notification. Rarely more than two.
pub type FiredActions = SmallVec<[ControlAction; 2]>;

/// Per-controller set of input subscriptions.
#[derive(Debug, Default)]
pub struct ControlModule {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl ControlModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an action to a key phase. Actions fire in subscription order.
    pub fn subscribe(
        &mut self,
        key: ControlKey,
        event_type: ControlEventType,
        action: ControlAction,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            key,
            event_type,
            action,
        });
        id
    }

    /// Replace every subscription for a key phase with a single action.
    pub fn rebind(
        &mut self,
        key: ControlKey,
        event_type: ControlEventType,
        action: ControlAction,
    ) -> SubscriptionId {
        self.subscriptions
            .retain(|s| !(s.key == key && s.event_type == event_type));
        self.subscribe(key, event_type, action)
    }

    /// Remove one subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Remove every subscription.
    pub fn unsubscribe_all(&mut self) {
        self.subscriptions.clear();
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Whether any subscription targets the given action.
    pub fn is_bound(&self, action: ControlAction) -> bool {
        self.subscriptions.iter().any(|s| s.action == action)
    }

    /// Actions subscribed to a key phase, in subscription order.
    pub fn notify(&self, key: ControlKey, event_type: ControlEventType) -> FiredActions {
        self.subscriptions
            .iter()
            .filter(|s| s.key == key && s.event_type == event_type)
            .map(|s| s.action)
            .collect()
    }
}
