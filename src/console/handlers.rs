use crate::models::{AdminResponse, UserRowView};

use super::bridge::FormTransport;
use super::notify::{display, NoticeKind};
use super::page::Page;

pub const DELETE_CONFIRMATION: &str = "Delete this user? This cannot be undone.";
pub const PASSWORD_FIELD: &str = "new_password";
const ROW_NOT_FOUND: &str = "User row not found";
const TABLE_NOT_FOUND: &str = "User table not found";
const PASSWORD_INPUT_NOT_FOUND: &str = "Password field not found";

/// What a form is for. Resolved from the form's `data-purpose` tag, or
/// from a `js-<tag>` class on older markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormPurpose {
    Create,
    Grant,
    Revoke,
    ResetPassword,
    Delete,
}

const PURPOSE_TAGS: [(&str, FormPurpose); 5] = [
    ("create", FormPurpose::Create),
    ("grant", FormPurpose::Grant),
    ("revoke", FormPurpose::Revoke),
    ("reset", FormPurpose::ResetPassword),
    ("delete", FormPurpose::Delete),
];

impl FormPurpose {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        PURPOSE_TAGS
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, p)| *p)
    }

    pub fn tag(self) -> &'static str {
        PURPOSE_TAGS
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(t, _)| *t)
            .unwrap_or_default()
    }

    /// First `js-<tag>` class that names a purpose.
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        classes
            .into_iter()
            .filter_map(|c| c.strip_prefix("js-"))
            .find_map(Self::from_tag)
    }

    /// Shown on success when the server sends no message.
    pub fn success_message(self) -> &'static str {
        match self {
            FormPurpose::Create => "User created",
            FormPurpose::Grant => "Role granted",
            FormPurpose::Revoke => "Role revoked",
            FormPurpose::ResetPassword => "Password reset",
            FormPurpose::Delete => "User deleted",
        }
    }
}

/// How a submit event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The form has no purpose; the browser submits it normally.
    Ignored,
    /// The operator declined the confirmation; nothing was sent.
    Cancelled,
    Applied(FormPurpose),
    Failed(FormPurpose),
}

/// Runs one intercepted submission: request, then either one page patch
/// and a success notice, or an error notice and no patch.
///
/// Callers prevent the browser's own submission whenever
/// [`Page::form_purpose`] resolves for the form.
pub async fn handle_submission<P, T>(page: &P, transport: &T, form: &P::Form) -> Outcome
where
    P: Page,
    T: FormTransport,
{
    let Some(purpose) = page.form_purpose(form) else {
        return Outcome::Ignored;
    };
    if purpose == FormPurpose::Delete && !page.confirm(DELETE_CONFIRMATION) {
        return Outcome::Cancelled;
    }

    let submission = page.form_submission(form);
    let result = match transport.submit(&submission).await {
        Ok(resp) => apply_patch(page, purpose, form, &resp).map(|_| resp),
        Err(e) => Err(e.user_message()),
    };
    match result {
        Ok(resp) => {
            let message = resp
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| purpose.success_message().to_string());
            display(page, message, NoticeKind::Success);
            Outcome::Applied(purpose)
        }
        Err(message) => {
            display(page, message, NoticeKind::Error);
            Outcome::Failed(purpose)
        }
    }
}

/// Applies the page change for a successful response. Checks happen before
/// any mutation, so an `Err` leaves the page untouched.
fn apply_patch<P: Page>(
    page: &P,
    purpose: FormPurpose,
    form: &P::Form,
    resp: &AdminResponse,
) -> Result<(), String> {
    match purpose {
        FormPurpose::Create => {
            let (Some(id), Some(username), Some(email)) =
                (resp.id, resp.username.clone(), resp.email.clone())
            else {
                return Err("Server response is missing the new user".into());
            };
            let row = UserRowView {
                id,
                username,
                email,
                roles_text: resp.roles_text(),
                role_options_html: page.role_options_html(),
            };
            if !page.append_row(&row) {
                return Err(TABLE_NOT_FOUND.into());
            }
            page.reset_form(form);
        }
        FormPurpose::Grant | FormPurpose::Revoke => {
            let id = page.form_row_id(form).ok_or(ROW_NOT_FOUND)?;
            if !page.set_row_roles(id, &resp.roles_text()) {
                return Err(ROW_NOT_FOUND.into());
            }
        }
        FormPurpose::ResetPassword => {
            if !page.clear_password(form) {
                return Err(PASSWORD_INPUT_NOT_FOUND.into());
            }
        }
        FormPurpose::Delete => {
            let id = page.form_row_id(form).ok_or(ROW_NOT_FOUND)?;
            if !page.remove_row(id) {
                return Err(ROW_NOT_FOUND.into());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::console::bridge::{FormSubmission, SubmitError};
    use crate::console::memory::{MemoryForm, MemoryPage};
    use crate::console::notify::Notice;

    /// Replies with queued results and records what was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: RefCell<VecDeque<Result<AdminResponse, SubmitError>>>,
        sent: RefCell<Vec<FormSubmission>>,
    }

    impl ScriptedTransport {
        fn replying(reply: Result<AdminResponse, SubmitError>) -> Self {
            let t = ScriptedTransport::default();
            t.replies.borrow_mut().push_back(reply);
            t
        }
    }

    impl FormTransport for ScriptedTransport {
        async fn submit(&self, form: &FormSubmission) -> Result<AdminResponse, SubmitError> {
            self.sent.borrow_mut().push(form.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(SubmitError::Transport("no reply scripted".into())))
        }
    }

    fn row(id: u64, roles: &str) -> UserRowView {
        UserRowView {
            id,
            username: format!("user{}", id),
            email: format!("user{}@x.com", id),
            roles_text: roles.to_string(),
            role_options_html: r#"<option value="user">user</option>"#.to_string(),
        }
    }

    fn kinds(page: &MemoryPage) -> Vec<NoticeKind> {
        page.notices().into_iter().map(|n: Notice| n.kind).collect()
    }

    #[test]
    fn purposes_resolve_from_tags_and_classes() {
        assert_eq!(FormPurpose::from_tag("reset"), Some(FormPurpose::ResetPassword));
        assert_eq!(FormPurpose::from_tag("unknown"), None);
        assert_eq!(FormPurpose::Grant.tag(), "grant");
        assert_eq!(
            FormPurpose::from_classes(["inline", "js-delete"]),
            Some(FormPurpose::Delete)
        );
        assert_eq!(FormPurpose::from_classes(["delete"]), None);
    }

    #[tokio::test]
    async fn create_appends_row_and_clears_form() {
        let page = MemoryPage::new();
        page.add_row(row(1, "admin"));
        let form = page.add_form(
            MemoryForm::new("create", "/admin/users/create")
                .field("username", "bob")
                .field("email", "b@x.com"),
        );
        let transport = ScriptedTransport::replying(Ok(AdminResponse {
            ok: true,
            id: Some(7),
            username: Some("bob".into()),
            email: Some("b@x.com".into()),
            roles: Some(vec!["viewer".into()]),
            ..Default::default()
        }));

        let outcome = handle_submission(&page, &transport, &form).await;
        assert_eq!(outcome, Outcome::Applied(FormPurpose::Create));

        let added = page.row(7).unwrap();
        assert_eq!(added.username, "bob");
        assert_eq!(added.email, "b@x.com");
        assert_eq!(added.roles_text, "viewer");
        assert_eq!(added.role_options_html, r#"<option value="user">user</option>"#);
        assert_eq!(page.rows().len(), 2);

        let cleared = page.form(form).unwrap();
        assert!(cleared.submission.fields.iter().all(|(_, v)| v.is_empty()));
        assert_eq!(kinds(&page), vec![NoticeKind::Success]);
        assert_eq!(page.notices()[0].message, "User created");
    }

    #[tokio::test]
    async fn create_on_empty_table_uses_role_template() {
        let page = MemoryPage::new().with_role_template(r#"<option value="admin">admin</option>"#);
        let form = page.add_form(MemoryForm::new("create", "/admin/users"));
        let transport = ScriptedTransport::replying(Ok(AdminResponse {
            ok: true,
            message: Some("User bob created".into()),
            id: Some(2),
            username: Some("bob".into()),
            email: Some("b@x.com".into()),
            roles: Some(vec![]),
        }));

        handle_submission(&page, &transport, &form).await;
        let added = page.row(2).unwrap();
        assert_eq!(added.role_options_html, r#"<option value="admin">admin</option>"#);
        assert_eq!(added.roles_text, "");
        assert_eq!(page.notices()[0].message, "User bob created");
    }

    #[tokio::test]
    async fn create_response_without_user_is_an_error() {
        let page = MemoryPage::new();
        let form = page.add_form(MemoryForm::new("create", "/admin/users").field("username", "bob"));
        let transport = ScriptedTransport::replying(Ok(AdminResponse::success("created")));

        let outcome = handle_submission(&page, &transport, &form).await;
        assert_eq!(outcome, Outcome::Failed(FormPurpose::Create));
        assert!(page.rows().is_empty());
        assert_eq!(page.form(form).unwrap().submission.value("username"), Some("bob"));
        assert_eq!(kinds(&page), vec![NoticeKind::Error]);
    }

    #[tokio::test]
    async fn grant_and_revoke_rewrite_the_role_cell() {
        for tag in ["grant", "revoke"] {
            let page = MemoryPage::new();
            page.add_row(row(3, "user"));
            let form = page.add_form(
                MemoryForm::new(tag, "/admin/users/3/x").field("role", "editor").in_row(3),
            );
            let transport = ScriptedTransport::replying(Ok(AdminResponse {
                ok: true,
                roles: Some(vec!["editor".into(), "viewer".into()]),
                ..Default::default()
            }));

            handle_submission(&page, &transport, &form).await;
            assert_eq!(page.row(3).unwrap().roles_text, "editor, viewer");
            assert_eq!(kinds(&page), vec![NoticeKind::Success]);
            assert_eq!(transport.sent.borrow()[0].value("role"), Some("editor"));
        }
    }

    #[tokio::test]
    async fn grant_for_missing_row_reports_error() {
        let page = MemoryPage::new();
        let form = page.add_form(MemoryForm::new("grant", "/admin/users/9/grant").in_row(9));
        let transport = ScriptedTransport::replying(Ok(AdminResponse::success("ok").with_roles(vec![])));

        let outcome = handle_submission(&page, &transport, &form).await;
        assert_eq!(outcome, Outcome::Failed(FormPurpose::Grant));
        assert_eq!(page.notices()[0].message, ROW_NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_clears_the_password_input() {
        let page = MemoryPage::new();
        page.add_row(row(4, "user"));
        let form = page.add_form(
            MemoryForm::new("reset", "/admin/users/4/reset-password")
                .field(PASSWORD_FIELD, "S3cret!")
                .in_row(4),
        );
        let transport = ScriptedTransport::replying(Ok(AdminResponse {
            ok: true,
            ..Default::default()
        }));

        handle_submission(&page, &transport, &form).await;
        assert_eq!(page.form(form).unwrap().submission.value(PASSWORD_FIELD), Some(""));
        assert_eq!(page.notices()[0].message, "Password reset");
        assert_eq!(transport.sent.borrow()[0].value(PASSWORD_FIELD), Some("S3cret!"));
    }

    #[tokio::test]
    async fn create_without_a_table_reports_error_and_keeps_the_form() {
        let page = MemoryPage::new().without_table();
        let form = page.add_form(
            MemoryForm::new("create", "/admin/users/create")
                .field("username", "bob")
                .field("email", "b@x.com"),
        );
        let transport = ScriptedTransport::replying(Ok(AdminResponse {
            ok: true,
            id: Some(7),
            username: Some("bob".into()),
            email: Some("b@x.com".into()),
            roles: Some(vec!["user".into()]),
            ..Default::default()
        }));

        let outcome = handle_submission(&page, &transport, &form).await;
        assert_eq!(outcome, Outcome::Failed(FormPurpose::Create));
        assert!(page.rows().is_empty());
        assert_eq!(page.form(form).unwrap().submission.value("username"), Some("bob"));
        assert_eq!(kinds(&page), vec![NoticeKind::Error]);
        assert_eq!(page.notices()[0].message, TABLE_NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_without_a_password_input_reports_error() {
        let page = MemoryPage::new();
        page.add_row(row(4, "user"));
        let form = page.add_form(MemoryForm::new("reset", "/admin/users/4/reset-password").in_row(4));
        let transport = ScriptedTransport::replying(Ok(AdminResponse::success("Password reset")));

        let outcome = handle_submission(&page, &transport, &form).await;
        assert_eq!(outcome, Outcome::Failed(FormPurpose::ResetPassword));
        assert_eq!(kinds(&page), vec![NoticeKind::Error]);
        assert_eq!(page.notices()[0].message, PASSWORD_INPUT_NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_asks_first_and_cancel_sends_nothing() {
        let page = MemoryPage::new();
        page.add_row(row(5, "user"));
        page.set_confirm_answer(false);
        let form = page.add_form(MemoryForm::new("delete", "/admin/users/5/delete").in_row(5));
        let transport = ScriptedTransport::default();

        let outcome = handle_submission(&page, &transport, &form).await;
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(page.confirmations(), vec![DELETE_CONFIRMATION.to_string()]);
        assert!(transport.sent.borrow().is_empty());
        assert!(page.row(5).is_some());
        assert!(page.notices().is_empty());
    }

    #[tokio::test]
    async fn confirmed_delete_removes_the_row() {
        let page = MemoryPage::new();
        page.add_row(row(5, "user"));
        page.add_row(row(6, "user"));
        let form = page.add_form(MemoryForm::new("delete", "/admin/users/5/delete").in_row(5));
        let transport = ScriptedTransport::replying(Ok(AdminResponse::success("Deleted user5").with_id(5)));

        let outcome = handle_submission(&page, &transport, &form).await;
        assert_eq!(outcome, Outcome::Applied(FormPurpose::Delete));
        assert!(page.row(5).is_none());
        assert!(page.row(6).is_some());
        assert_eq!(page.notices()[0].message, "Deleted user5");
    }

    #[tokio::test]
    async fn failures_notify_once_and_leave_the_page_alone() {
        let failures = [
            SubmitError::Transport("connection refused".into()),
            SubmitError::Parse,
            SubmitError::Rejected { status: 400, message: "At least one administrator must remain".into() },
        ];
        for failure in failures {
            for tag in ["create", "grant", "revoke", "reset", "delete"] {
                let page = MemoryPage::new();
                page.add_row(row(1, "admin"));
                let form = page.add_form(
                    MemoryForm::new(tag, "/admin/users/1/x")
                        .field(PASSWORD_FIELD, "pw")
                        .in_row(1),
                );
                let transport = ScriptedTransport::replying(Err(failure.clone()));

                let outcome = handle_submission(&page, &transport, &form).await;
                assert!(matches!(outcome, Outcome::Failed(_)), "{tag}");
                assert_eq!(page.rows(), vec![row(1, "admin")], "{tag}");
                assert_eq!(page.form(form).unwrap().submission.value(PASSWORD_FIELD), Some("pw"));
                let notices = page.notices();
                assert_eq!(notices.len(), 1, "{tag}");
                assert_eq!(notices[0].kind, NoticeKind::Error);
                assert_eq!(notices[0].message, failure.user_message());
            }
        }
    }

    #[tokio::test]
    async fn forms_without_purpose_are_ignored() {
        let page = MemoryPage::new();
        let form = page.add_form(MemoryForm::untagged("/auth/logout"));
        let transport = ScriptedTransport::default();
        assert_eq!(handle_submission(&page, &transport, &form).await, Outcome::Ignored);
        assert!(transport.sent.borrow().is_empty());
    }
}
