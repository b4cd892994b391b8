//! Browser binding: `web-sys` page plus the module entry point.

use std::time::Duration;

use askama::Template;
use gloo_timers::future::sleep;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlElement, HtmlFormElement, HtmlInputElement};

use crate::models::UserRowView;
use crate::templates::UserRowTemplate;

use super::bridge::{Bridge, FormSubmission};
use super::handlers::{handle_submission, FormPurpose, PASSWORD_FIELD};
use super::notify::{Notice, NOTICE_FADE_AFTER};
use super::page::Page;
use super::sidebar::{toggle_sidebar, SidebarIcon, COLLAPSED_CLASS, SIDEBAR_SELECTOR, TOGGLE_SELECTOR};

const TABLE_BODY_SELECTOR: &str = ".data-table tbody";
const ROLE_SELECT_SELECTOR: &str = "form[data-purpose=\"grant\"] select, .js-grant select";
const ROLE_TEMPLATE_ID: &str = "role-options";

#[derive(Clone)]
struct DomPage {
    document: Document,
    /// `data-base-url` of the body, used for the actions of appended rows.
    base_url: String,
}

impl DomPage {
    fn new(document: &Document) -> Self {
        let base_url = document
            .body()
            .and_then(|b| b.get_attribute("data-base-url"))
            .unwrap_or_default();
        DomPage {
            document: document.clone(),
            base_url,
        }
    }

    fn row(&self, id: u64) -> Option<Element> {
        self.document
            .query_selector(&format!("tr[data-uid=\"{}\"]", id))
            .ok()
            .flatten()
    }

    fn sidebar(&self) -> Option<Element> {
        self.document.query_selector(SIDEBAR_SELECTOR).ok().flatten()
    }
}

fn form_fields(form: &HtmlFormElement) -> Vec<(String, String)> {
    let Ok(data) = web_sys::FormData::new_with_form(form) else {
        return Vec::new();
    };
    let Ok(Some(entries)) = js_sys::try_iter(data.as_ref()) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let pair = js_sys::Array::from(&entry);
            // File inputs yield non-string values; they are never sent here.
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect()
}

impl Page for DomPage {
    type Form = HtmlFormElement;

    fn form_purpose(&self, form: &HtmlFormElement) -> Option<FormPurpose> {
        form.get_attribute("data-purpose")
            .as_deref()
            .and_then(FormPurpose::from_tag)
            .or_else(|| FormPurpose::from_classes(form.class_name().split_whitespace()))
    }

    fn form_submission(&self, form: &HtmlFormElement) -> FormSubmission {
        FormSubmission {
            // Resolved by the browser against the document base.
            action: form.action(),
            method: form.method(),
            fields: form_fields(form),
        }
    }

    fn form_row_id(&self, form: &HtmlFormElement) -> Option<u64> {
        form.closest("tr[data-uid]")
            .ok()
            .flatten()?
            .get_attribute("data-uid")?
            .parse()
            .ok()
    }

    fn reset_form(&self, form: &HtmlFormElement) {
        form.reset();
    }

    fn clear_password(&self, form: &HtmlFormElement) -> bool {
        let selector = format!("input[name=\"{}\"]", PASSWORD_FIELD);
        match form
            .query_selector(&selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            Some(input) => {
                input.set_value("");
                true
            }
            None => false,
        }
    }

    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    fn role_options_html(&self) -> String {
        if let Ok(Some(select)) = self.document.query_selector(ROLE_SELECT_SELECTOR) {
            return select.inner_html();
        }
        self.document
            .get_element_by_id(ROLE_TEMPLATE_ID)
            .map(|tpl| tpl.inner_html())
            .unwrap_or_default()
    }

    fn append_row(&self, row: &UserRowView) -> bool {
        let Some(body) = self.document.query_selector(TABLE_BODY_SELECTOR).ok().flatten() else {
            return false;
        };
        let Ok(markup) = (UserRowTemplate { row, base_url: &self.base_url }).render() else {
            return false;
        };
        // Parse the row inside a scratch tbody so the <tr> survives.
        let Ok(scratch) = self.document.create_element("tbody") else {
            return false;
        };
        scratch.set_inner_html(&markup);
        match scratch.first_element_child() {
            Some(tr) => body.append_child(&tr).is_ok(),
            None => false,
        }
    }

    fn set_row_roles(&self, id: u64, roles_text: &str) -> bool {
        match self.row(id).and_then(|tr| tr.query_selector(".role-cell").ok().flatten()) {
            Some(cell) => {
                cell.set_text_content(Some(roles_text));
                true
            }
            None => false,
        }
    }

    fn remove_row(&self, id: u64) -> bool {
        match self.row(id) {
            Some(tr) => {
                tr.remove();
                true
            }
            None => false,
        }
    }

    fn show_notice(&self, notice: &Notice, lifetime: Duration) {
        let Some(body) = self.document.body() else {
            return;
        };
        let Ok(el) = self.document.create_element("div") else {
            return;
        };
        let Ok(notice_box) = el.dyn_into::<HtmlElement>() else {
            return;
        };
        let palette = notice.kind.palette();
        notice_box.set_class_name(&format!("toast {}", notice.kind.class_name()));
        let style = notice_box.style();
        let border = format!("4px solid {}", palette.border);
        for (prop, value) in [
            ("position", "fixed"),
            ("top", "16px"),
            ("right", "16px"),
            ("z-index", "2000"),
            ("background", palette.background),
            ("color", palette.text),
            ("border-left", border.as_str()),
            ("padding", "10px 14px"),
            ("border-radius", "6px"),
            ("box-shadow", "0 6px 18px rgba(0,0,0,.12)"),
            ("transition", "all .25s"),
        ] {
            let _ = style.set_property(prop, value);
        }
        notice_box.set_text_content(Some(&notice.message));
        if body.append_child(&notice_box).is_err() {
            return;
        }

        let fade_after = NOTICE_FADE_AFTER.min(lifetime);
        let remove_after = lifetime.saturating_sub(fade_after);
        spawn_local(async move {
            sleep(fade_after).await;
            let style = notice_box.style();
            let _ = style.set_property("opacity", "0");
            let _ = style.set_property("transform", "translateY(-6px)");
            sleep(remove_after).await;
            notice_box.remove();
        });
    }

    fn sidebar_collapsed(&self) -> bool {
        self.sidebar()
            .map(|s| s.class_list().contains(COLLAPSED_CLASS))
            .unwrap_or(false)
    }

    fn set_sidebar(&self, collapsed: bool, icon: SidebarIcon) {
        if let Some(sidebar) = self.sidebar() {
            let _ = sidebar.class_list().toggle_with_force(COLLAPSED_CLASS, collapsed);
        }
        let icon_selector = format!("{} i", TOGGLE_SELECTOR);
        if let Ok(Some(i)) = self.document.query_selector(&icon_selector) {
            let classes = i.class_list();
            let _ = classes.remove_1(icon.other().class_name());
            let _ = classes.add_1(icon.class_name());
        }
    }
}

fn install_submit_listener(document: &Document, bridge: Bridge) -> Result<(), JsValue> {
    let page = DomPage::new(document);
    let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(form) = event
            .target()
            .and_then(|t| t.dyn_into::<HtmlFormElement>().ok())
        else {
            return;
        };
        if page.form_purpose(&form).is_none() {
            return;
        }
        event.prevent_default();
        let page = page.clone();
        let bridge = bridge.clone();
        spawn_local(async move {
            handle_submission(&page, &bridge, &form).await;
        });
    });
    document.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();
    Ok(())
}

fn install_sidebar_toggle(document: &Document) -> Result<(), JsValue> {
    let Some(button) = document.query_selector(TOGGLE_SELECTOR)? else {
        return Ok(());
    };
    let page = DomPage::new(document);
    let on_click = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        toggle_sidebar(&page);
    });
    button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}

/// Module entry point, run once the bundle is loaded by the page.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let origin = window.location().origin()?;
    let bridge = Bridge::new(&origin).map_err(|e| JsValue::from_str(&e.to_string()))?;
    install_submit_listener(&document, bridge)?;
    install_sidebar_toggle(&document)?;
    Ok(())
}
