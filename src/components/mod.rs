//! UI Components
//!
//! Pages and the reusable pieces they are built from.

mod board_page;
mod boards_page;
mod delete_confirm_button;
mod error_banner;
mod layout;
mod log_panel;
mod login_page;
mod modal;
mod quick_add;
mod task_card;
mod theme_toggle;
mod timeline_page;

pub use board_page::BoardPage;
pub use boards_page::BoardsPage;
pub use delete_confirm_button::DeleteConfirmButton;
pub use error_banner::ErrorBanner;
pub use layout::Layout;
pub use log_panel::LogPanel;
pub use login_page::LoginPage;
pub use modal::Modal;
pub use quick_add::QuickAdd;
pub use task_card::TaskCard;
pub use theme_toggle::ThemeToggle;
pub use timeline_page::TimelinePage;
