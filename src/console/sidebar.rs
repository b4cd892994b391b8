use super::page::Page;

pub const SIDEBAR_SELECTOR: &str = ".sidebar";
pub const TOGGLE_SELECTOR: &str = ".toggle-btn";
pub const COLLAPSED_CLASS: &str = "collapsed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidebarIcon {
    /// Shown while the sidebar is expanded.
    #[default]
    ChevronLeft,
    /// Shown while the sidebar is collapsed.
    ChevronRight,
}

impl SidebarIcon {
    pub fn for_state(collapsed: bool) -> Self {
        if collapsed {
            SidebarIcon::ChevronRight
        } else {
            SidebarIcon::ChevronLeft
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            SidebarIcon::ChevronLeft => "fa-chevron-left",
            SidebarIcon::ChevronRight => "fa-chevron-right",
        }
    }

    pub fn other(self) -> Self {
        match self {
            SidebarIcon::ChevronLeft => SidebarIcon::ChevronRight,
            SidebarIcon::ChevronRight => SidebarIcon::ChevronLeft,
        }
    }
}

/// Flips the sidebar between collapsed and expanded and returns the new
/// collapsed state.
pub fn toggle_sidebar<P: Page + ?Sized>(page: &P) -> bool {
    let collapsed = !page.sidebar_collapsed();
    page.set_sidebar(collapsed, SidebarIcon::for_state(collapsed));
    collapsed
}
