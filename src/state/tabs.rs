//! Exclusive tab selection.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::i18n::{Locale, Msg};

/// Panel tabs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Tab {
    #[default]
    #[strum(to_string = "routes-tab", serialize = "routes")]
    Routes,
    #[strum(to_string = "create-tab", serialize = "create")]
    Create,
    #[strum(to_string = "health-tab", serialize = "health")]
    Health,
}

impl Tab {
    /// Element id of the tab's content block.
    pub fn id(self) -> &'static str {
        match self {
            Tab::Routes => "routes-tab",
            Tab::Create => "create-tab",
            Tab::Health => "health-tab",
        }
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match self {
            Tab::Routes => locale.text(Msg::TabRoutes),
            Tab::Create => locale.text(Msg::TabCreate),
            Tab::Health => locale.text(Msg::TabHealth),
        }
    }
}

/// Outcome of activating a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabActivation {
    /// The active tab changed.
    pub changed: bool,
    /// The health snapshot must be (re)loaded.
    pub load_health: bool,
}

/// Exactly one tab is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabController {
    active: Tab,
}

impl TabController {
    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn is_active(&self, tab: Tab) -> bool {
        self.active == tab
    }

    /// Activate `tab`, deactivating every other one. Activating the health
    /// tab always asks for a fresh snapshot, even when already active.
    pub fn activate(&mut self, tab: Tab) -> TabActivation {
        let changed = self.active != tab;
        self.active = tab;
        TabActivation {
            changed,
            load_health: tab == Tab::Health,
        }
    }

    /// Every tab with its active flag, in display order.
    pub fn tabs(&self) -> impl Iterator<Item = (Tab, bool)> + '_ {
        Tab::iter().map(move |tab| (tab, tab == self.active))
    }
}
