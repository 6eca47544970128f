//! UI Components
//!
//! The tree node, the three root-level views, and their shared pieces.

mod bible_grid;
mod create_folder_modal;
mod delete_confirm_button;
mod draft_input;
mod explorer_sidebar;
mod folder_tree;
mod global_panel;
mod kind_selector;
mod roots;

pub use bible_grid::BibleGrid;
pub use create_folder_modal::CreateFolderModal;
pub use delete_confirm_button::DeleteConfirmButton;
pub use draft_input::DraftNameInput;
pub use explorer_sidebar::ExplorerSidebar;
pub use folder_tree::FolderTreeNode;
pub use global_panel::GlobalPanel;
pub use kind_selector::KindSelector;
pub(crate) use roots::use_root_folders;
