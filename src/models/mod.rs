pub mod admin_response;
#[cfg(not(target_arch = "wasm32"))]
pub mod app_state;
pub mod current_user;
pub mod login_log;
pub mod role_record;
pub mod store;
pub mod user_record;
pub mod user_row;

pub use admin_response::AdminResponse;
#[cfg(not(target_arch = "wasm32"))]
pub use app_state::{AppState, Session};
pub use current_user::CurrentUser;
pub use login_log::{LoginLog, LoginStatus};
pub use role_record::RoleRecord;
pub use store::Store;
pub use user_record::UserRecord;
pub use user_row::UserRowView;
