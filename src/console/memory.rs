//! In-memory page for driving the console without a browser.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::models::UserRowView;

use super::bridge::FormSubmission;
use super::handlers::{FormPurpose, PASSWORD_FIELD};
use super::notify::Notice;
use super::page::Page;
use super::sidebar::SidebarIcon;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryForm {
    /// `data-purpose` attribute.
    pub purpose_tag: Option<String>,
    pub classes: Vec<String>,
    pub submission: FormSubmission,
    /// Row the form sits in.
    pub row_id: Option<u64>,
}

impl MemoryForm {
    pub fn new(purpose_tag: &str, action: &str) -> Self {
        MemoryForm {
            purpose_tag: Some(purpose_tag.to_string()),
            ..MemoryForm::untagged(action)
        }
    }

    pub fn untagged(action: &str) -> Self {
        MemoryForm {
            purpose_tag: None,
            classes: Vec::new(),
            submission: FormSubmission::new(action, "post"),
            row_id: None,
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.submission = self.submission.field(name, value);
        self
    }

    pub fn in_row(mut self, id: u64) -> Self {
        self.row_id = Some(id);
        self
    }

    /// Returns false when the form has no field called `name`.
    fn set_value(&mut self, name: &str, value: &str) -> bool {
        let mut found = false;
        for (k, v) in self.submission.fields.iter_mut() {
            if k == name {
                *v = value.to_string();
                found = true;
            }
        }
        found
    }
}

#[derive(Default)]
struct Inner {
    rows: Vec<UserRowView>,
    forms: Vec<MemoryForm>,
    notices: Vec<(Notice, Instant)>,
    confirm_answer: bool,
    confirmations: Vec<String>,
    sidebar_collapsed: bool,
    sidebar_icon: SidebarIcon,
    role_template: Option<String>,
    /// Whether the page has a users table body to append to.
    has_table: bool,
}

/// A page held in memory. Confirmation prompts answer "yes" unless told
/// otherwise; notices expire on the tokio clock.
pub struct MemoryPage {
    inner: Mutex<Inner>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    pub fn new() -> Self {
        MemoryPage {
            inner: Mutex::new(Inner {
                confirm_answer: true,
                has_table: true,
                ..Default::default()
            }),
        }
    }

    /// Content of the hidden `role-options` template.
    pub fn with_role_template(self, html: &str) -> Self {
        self.lock().role_template = Some(html.to_string());
        self
    }

    /// A page with no users table, such as the profile page.
    pub fn without_table(self) -> Self {
        self.lock().has_table = false;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_row(&self, row: UserRowView) {
        self.lock().rows.push(row);
    }

    pub fn add_form(&self, form: MemoryForm) -> FormId {
        let mut inner = self.lock();
        inner.forms.push(form);
        FormId(inner.forms.len() - 1)
    }

    pub fn set_confirm_answer(&self, answer: bool) {
        self.lock().confirm_answer = answer;
    }

    pub fn rows(&self) -> Vec<UserRowView> {
        self.lock().rows.clone()
    }

    pub fn row(&self, id: u64) -> Option<UserRowView> {
        self.lock().rows.iter().find(|r| r.id == id).cloned()
    }

    pub fn form(&self, id: FormId) -> Option<MemoryForm> {
        self.lock().forms.get(id.0).cloned()
    }

    /// Notices still on screen, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.notices.retain(|(_, until)| *until > now);
        inner.notices.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Every confirmation prompt shown so far.
    pub fn confirmations(&self) -> Vec<String> {
        self.lock().confirmations.clone()
    }

    pub fn sidebar(&self) -> (bool, SidebarIcon) {
        let inner = self.lock();
        (inner.sidebar_collapsed, inner.sidebar_icon)
    }
}

impl Page for MemoryPage {
    type Form = FormId;

    fn form_purpose(&self, form: &FormId) -> Option<FormPurpose> {
        let inner = self.lock();
        let form = inner.forms.get(form.0)?;
        form.purpose_tag
            .as_deref()
            .and_then(FormPurpose::from_tag)
            .or_else(|| FormPurpose::from_classes(form.classes.iter().map(String::as_str)))
    }

    fn form_submission(&self, form: &FormId) -> FormSubmission {
        self.lock()
            .forms
            .get(form.0)
            .map(|f| f.submission.clone())
            .unwrap_or_default()
    }

    fn form_row_id(&self, form: &FormId) -> Option<u64> {
        self.lock().forms.get(form.0)?.row_id
    }

    fn reset_form(&self, form: &FormId) {
        if let Some(f) = self.lock().forms.get_mut(form.0) {
            for (_, v) in f.submission.fields.iter_mut() {
                v.clear();
            }
        }
    }

    fn clear_password(&self, form: &FormId) -> bool {
        match self.lock().forms.get_mut(form.0) {
            Some(f) => f.set_value(PASSWORD_FIELD, ""),
            None => false,
        }
    }

    fn confirm(&self, message: &str) -> bool {
        let mut inner = self.lock();
        inner.confirmations.push(message.to_string());
        inner.confirm_answer
    }

    fn role_options_html(&self) -> String {
        let inner = self.lock();
        inner
            .rows
            .first()
            .map(|r| r.role_options_html.clone())
            .or_else(|| inner.role_template.clone())
            .unwrap_or_default()
    }

    fn append_row(&self, row: &UserRowView) -> bool {
        let mut inner = self.lock();
        if !inner.has_table {
            return false;
        }
        inner.rows.push(row.clone());
        true
    }

    fn set_row_roles(&self, id: u64, roles_text: &str) -> bool {
        match self.lock().rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.roles_text = roles_text.to_string();
                true
            }
            None => false,
        }
    }

    fn remove_row(&self, id: u64) -> bool {
        let mut inner = self.lock();
        let before = inner.rows.len();
        inner.rows.retain(|r| r.id != id);
        inner.rows.len() != before
    }

    fn show_notice(&self, notice: &Notice, lifetime: Duration) {
        let until = Instant::now() + lifetime;
        self.lock().notices.push((notice.clone(), until));
    }

    fn sidebar_collapsed(&self) -> bool {
        self.lock().sidebar_collapsed
    }

    fn set_sidebar(&self, collapsed: bool, icon: SidebarIcon) {
        let mut inner = self.lock();
        inner.sidebar_collapsed = collapsed;
        inner.sidebar_icon = icon;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_falls_back_to_js_classes() {
        let page = MemoryPage::new();
        let tagged = page.add_form(MemoryForm::new("grant", "/a").class("js-delete"));
        let classed = page.add_form(MemoryForm::untagged("/b").class("js-revoke"));
        let plain = page.add_form(MemoryForm::untagged("/c"));
        assert_eq!(page.form_purpose(&tagged), Some(FormPurpose::Grant));
        assert_eq!(page.form_purpose(&classed), Some(FormPurpose::Revoke));
        assert_eq!(page.form_purpose(&plain), None);
    }

    #[test]
    fn unknown_rows_are_reported() {
        let page = MemoryPage::new();
        assert!(!page.set_row_roles(1, "x"));
        assert!(!page.remove_row(1));
    }

    #[test]
    fn missing_table_and_inputs_are_reported() {
        let page = MemoryPage::new().without_table();
        let row = UserRowView {
            id: 1,
            username: "a".into(),
            email: "a@b".into(),
            roles_text: String::new(),
            role_options_html: String::new(),
        };
        assert!(!page.append_row(&row));
        assert!(page.rows().is_empty());

        let bare = page.add_form(MemoryForm::new("reset", "/r"));
        let with_input = page.add_form(MemoryForm::new("reset", "/r").field(PASSWORD_FIELD, "pw"));
        assert!(!page.clear_password(&bare));
        assert!(page.clear_password(&with_input));
        assert!(!page.clear_password(&FormId(99)));
    }
}
