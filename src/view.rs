use crate::models::SignupForm;
use serde::Serialize;

pub const LOADING_TEXT: &str = "Loading activities...";
pub const LOAD_FAILURE_TEXT: &str = "Failed to load activities. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    pub fn css_class(self) -> &'static str {
        match self {
            MessageKind::Success => "message success",
            MessageKind::Error => "message error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Banner {
    Hidden,
    ShowingSuccess { text: String },
    ShowingError { text: String },
}

impl Banner {
    pub fn text(&self) -> Option<&str> {
        match self {
            Banner::Hidden => None,
            Banner::ShowingSuccess { text } | Banner::ShowingError { text } => Some(text),
        }
    }
}

/// What the controller needs from the page. Implementations own the
/// presentation surface; the controller never looks elements up itself.
pub trait View: Send + 'static {
    fn show_loading(&mut self);
    fn show_activities(&mut self, list_markup: String, options_markup: String);
    fn show_load_failure(&mut self);
    fn signup_form(&self) -> SignupForm;
    fn reset_form(&mut self);
    fn show_message(&mut self, kind: MessageKind, text: &str);
    fn hide_message(&mut self);
}

/// Contents of the list container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "markup", rename_all = "snake_case")]
pub enum ListArea {
    Loading,
    Activities(String),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub list: ListArea,
    pub options_markup: String,
    pub form: SignupForm,
    pub banner: Banner,
}

/// In-memory page state. The server renders it into the page shell and
/// tests inspect it directly.
#[derive(Debug, Clone)]
pub struct PageView {
    list: ListArea,
    options_markup: String,
    form: SignupForm,
    banner: Banner,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            list: ListArea::Loading,
            options_markup: crate::ui::PLACEHOLDER_OPTION.to_string(),
            form: SignupForm::default(),
            banner: Banner::Hidden,
        }
    }
}

impl PageView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies submitted field values in, as typing into the form would.
    pub fn fill_form(&mut self, form: SignupForm) {
        self.form = form;
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    pub fn list(&self) -> &ListArea {
        &self.list
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            list: self.list.clone(),
            options_markup: self.options_markup.clone(),
            form: self.form.clone(),
            banner: self.banner.clone(),
        }
    }
}

impl View for PageView {
    fn show_loading(&mut self) {
        self.list = ListArea::Loading;
    }

    fn show_activities(&mut self, list_markup: String, options_markup: String) {
        self.list = ListArea::Activities(list_markup);
        self.options_markup = options_markup;
    }

    fn show_load_failure(&mut self) {
        self.list = ListArea::Failed;
    }

    fn signup_form(&self) -> SignupForm {
        self.form.clone()
    }

    fn reset_form(&mut self) {
        self.form = SignupForm::default();
    }

    fn show_message(&mut self, kind: MessageKind, text: &str) {
        let text = text.to_string();
        self.banner = match kind {
            MessageKind::Success => Banner::ShowingSuccess { text },
            MessageKind::Error => Banner::ShowingError { text },
        };
    }

    fn hide_message(&mut self) {
        self.banner = Banner::Hidden;
    }
}
