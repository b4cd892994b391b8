pub mod admin_service;
pub mod store_service;
pub mod user_service;

// Re-export commonly used functions
pub use admin_service::{
    add_role, authenticate, change_password, create_user, delete_user, grant_role, reset_password,
    revoke_role, update_email, CreatedUser,
};
pub use store_service::{load_store, persist_store, seed_defaults};
pub use user_service::{generate_password_hash, random_session_id, verify_password};
