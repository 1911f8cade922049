// Upstair - Views & Menu Navigation
//
// Which screen is showing and where the menu cursors point.  Drawing lives in
// `render`; the button-to-view mapping lives in `app`.

use crate::config::MAIN_MENU_LEN;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// Home screen: activity and score.
    #[default]
    Main,
    Menu,
    Messages,
    Stats,
    Settings,
    /// "Are you sure?" before powering off.
    ConfirmShutdown,
}

/// Entries of the main menu, in cursor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Home,
    Messages,
    Stats,
    Settings,
}

impl MenuItem {
    pub const ALL: [MenuItem; MAIN_MENU_LEN as usize] =
        [MenuItem::Home, MenuItem::Messages, MenuItem::Stats, MenuItem::Settings];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Messages => "Messages",
            Self::Stats => "Stats",
            Self::Settings => "Settings",
        }
    }

    /// Where selecting this entry leads.
    pub fn target(&self) -> View {
        match self {
            Self::Home => View::Main,
            Self::Messages => View::Messages,
            Self::Stats => View::Stats,
            Self::Settings => View::Settings,
        }
    }
}

/// Entries of the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    AutoSleep,
}

/// Cursor over a menu of `len` entries that wraps back to the first entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuCursor {
    pos: u8,
    len: u8,
}

impl MenuCursor {
    pub const fn new(len: u8) -> Self {
        Self { pos: 0, len }
    }

    pub fn advance(&mut self) {
        self.pos = if self.pos + 1 < self.len { self.pos + 1 } else { 0 };
    }

    pub fn position(&self) -> u8 {
        self.pos
    }
}

impl Default for MenuCursor {
    fn default() -> Self {
        Self::new(MAIN_MENU_LEN)
    }
}

/// Current view and main menu cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigation {
    pub view: View,
    pub menu: MenuCursor,
}

impl Navigation {
    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.menu.position() as usize % MenuItem::ALL.len()]
    }

    /// The settings screen has a single entry, so its cursor never moves.
    pub fn selected_setting(&self) -> SettingsItem {
        SettingsItem::AutoSleep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_after_last_item() {
        let mut cursor = MenuCursor::new(4);
        let seen: Vec<u8> = (0..6)
            .map(|_| {
                cursor.advance();
                cursor.position()
            })
            .collect();
        assert_eq!(seen, [1, 2, 3, 0, 1, 2]);
    }

    #[test]
    fn selected_item_follows_cursor() {
        let mut nav = Navigation::default();
        assert_eq!(nav.selected(), MenuItem::Home);
        nav.menu.advance();
        nav.menu.advance();
        assert_eq!(nav.selected(), MenuItem::Stats);
        assert_eq!(nav.selected().target(), View::Stats);
    }
}
