// Row partial, shared by the server pages and the browser console
pub mod user_row_template;
pub use user_row_template::{RoleOptionsTemplate, UserRowTemplate};

// Full pages
#[cfg(not(target_arch = "wasm32"))]
pub mod admin_users_template;
#[cfg(not(target_arch = "wasm32"))]
pub mod dashboard_template;
#[cfg(not(target_arch = "wasm32"))]
pub mod login_template;
#[cfg(not(target_arch = "wasm32"))]
pub mod profile_template;

#[cfg(not(target_arch = "wasm32"))]
pub use admin_users_template::AdminUsersTemplate;
#[cfg(not(target_arch = "wasm32"))]
pub use dashboard_template::DashboardTemplate;
#[cfg(not(target_arch = "wasm32"))]
pub use login_template::LoginTemplate;
#[cfg(not(target_arch = "wasm32"))]
pub use profile_template::ProfileTemplate;
