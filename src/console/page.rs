use std::time::Duration;

use crate::models::UserRowView;

use super::bridge::FormSubmission;
use super::handlers::FormPurpose;
use super::notify::Notice;
use super::sidebar::SidebarIcon;

/// The document operations the console needs. Implementations read state
/// straight from the page; nothing is cached on the Rust side.
pub trait Page {
    /// Handle to one form on the page.
    type Form;

    fn form_purpose(&self, form: &Self::Form) -> Option<FormPurpose>;
    fn form_submission(&self, form: &Self::Form) -> FormSubmission;
    /// Id of the `tr[data-uid]` row enclosing the form.
    fn form_row_id(&self, form: &Self::Form) -> Option<u64>;
    fn reset_form(&self, form: &Self::Form);
    /// Empties the form's `new_password` input. Returns false when the form
    /// has no such input.
    fn clear_password(&self, form: &Self::Form) -> bool;

    /// Blocking yes/no prompt.
    fn confirm(&self, message: &str) -> bool;

    /// Role `<option>` markup from an existing row's selector, or from the
    /// hidden `role-options` template when the table is empty.
    fn role_options_html(&self) -> String;
    /// Returns false when the row could not be added to the users table.
    fn append_row(&self, row: &UserRowView) -> bool;
    /// Returns false when no row has this id.
    fn set_row_roles(&self, id: u64, roles_text: &str) -> bool;
    /// Returns false when no row has this id.
    fn remove_row(&self, id: u64) -> bool;

    /// Shows `notice` and removes it once `lifetime` has passed.
    fn show_notice(&self, notice: &Notice, lifetime: Duration);

    fn sidebar_collapsed(&self) -> bool;
    fn set_sidebar(&self, collapsed: bool, icon: SidebarIcon);
}
