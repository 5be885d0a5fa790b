//! Custom widgets for the TUI

pub mod composer;
pub mod conversation_view;
pub mod help;
pub mod home;
pub mod sidebar;
pub mod spinner;

pub use composer::Composer;
pub use conversation_view::ConversationView;
pub use help::HelpPopup;
pub use home::HomePage;
pub use sidebar::{Sidebar, SidebarEntry, SidebarState};
pub use spinner::Spinner;
