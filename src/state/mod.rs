//! Client-side UI state.
//!
//! - Pagination and filters
//! - Search debouncing
//! - Tab selection
//! - Transient notices

pub mod debounce;
pub mod notice;
pub mod pagination;
pub mod tabs;

pub use debounce::Debouncer;
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use pagination::{PageState, PAGE_SIZES};
pub use tabs::{Tab, TabActivation, TabController};
