use serde::{Deserialize, Serialize};

/// One row of the users table, as rendered by the server page and by the
/// console when it appends a freshly created user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRowView {
    pub id: u64,
    pub username: String,
    pub email: String,
    /// Role names joined with `", "`.
    pub roles_text: String,
    /// Inner HTML of the role `<select>` in the grant and revoke forms.
    pub role_options_html: String,
}
