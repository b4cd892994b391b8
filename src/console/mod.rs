//! Script side of the admin users page.
//!
//! Forms on the page are intercepted, submitted in the background through a
//! [`FormTransport`], and the page is patched from the partial response.
//! Everything the handlers know about the document goes through the
//! [`Page`] port: [`MemoryPage`] drives them headlessly on native targets,
//! and on `wasm32` a `web-sys` implementation binds them to the browser.

pub mod bridge;
pub mod handlers;
#[cfg(not(target_arch = "wasm32"))]
pub mod memory;
pub mod notify;
pub mod page;
pub mod sidebar;
#[cfg(target_arch = "wasm32")]
mod web;

pub use bridge::{Bridge, FormSubmission, FormTransport, SubmitError};
pub use handlers::{handle_submission, FormPurpose, Outcome};
#[cfg(not(target_arch = "wasm32"))]
pub use memory::{FormId, MemoryForm, MemoryPage};
pub use notify::{display, Notice, NoticeKind, NOTICE_LIFETIME};
pub use page::Page;
pub use sidebar::{toggle_sidebar, SidebarIcon};
