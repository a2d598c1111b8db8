use crate::client::DataClient;
use crate::errors::ClientError;
use crate::models::SignupForm;
use crate::ui::{render_activity_list, render_activity_options};
use crate::view::{MessageKind, View};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const SIGNUP_FAILURE_TEXT: &str = "Failed to sign up. Please try again.";
pub const REMOVE_FAILURE_TEXT: &str = "Failed to remove participant. Please try again.";

pub const REMOVE_BUTTON_SELECTOR: &str = ".participant-remove";
pub const ROSTER_SELECTOR: &str = ".participants-list";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Ready,
    Error,
}

/// One element on a click's path: its classes and `data-*` attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    classes: Vec<String>,
    data: BTreeMap<String, String>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Only class selectors (`.name`) are supported.
    pub fn matches(&self, selector: &str) -> bool {
        selector
            .strip_prefix('.')
            .is_some_and(|class| self.classes.iter().any(|c| c == class))
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// A click delivered to the list container, target first, then each
/// ancestor up to the container.
#[derive(Debug, Clone, Default)]
pub struct ClickEvent {
    path: Vec<Element>,
}

impl ClickEvent {
    pub fn new(path: Vec<Element>) -> Self {
        Self { path }
    }

    pub fn target(&self) -> Option<&Element> {
        self.path.first()
    }

    pub fn closest(&self, selector: &str) -> Option<&Element> {
        self.path.iter().find(|element| element.matches(selector))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClickAction {
    RemoveParticipant,
}

const CLICK_ROUTES: &[(&str, ClickAction)] =
    &[(REMOVE_BUTTON_SELECTOR, ClickAction::RemoveParticipant)];

fn route_click(event: &ClickEvent) -> Option<ClickAction> {
    let target = event.target()?;
    CLICK_ROUTES
        .iter()
        .find(|(selector, _)| target.matches(selector))
        .map(|(_, action)| *action)
}

pub struct Controller<C, V> {
    client: C,
    view: Arc<Mutex<V>>,
    list_state: Mutex<ListState>,
    banner_timer: Mutex<Option<JoinHandle<()>>>,
    banner_epoch: Arc<AtomicU64>,
    banner_hide_after: Duration,
}

impl<C: DataClient, V: View> Controller<C, V> {
    pub fn new(client: C, view: V, banner_hide_after: Duration) -> Self {
        Self {
            client,
            view: Arc::new(Mutex::new(view)),
            list_state: Mutex::new(ListState::Idle),
            banner_timer: Mutex::new(None),
            banner_epoch: Arc::new(AtomicU64::new(0)),
            banner_hide_after,
        }
    }

    pub fn view(&self) -> Arc<Mutex<V>> {
        Arc::clone(&self.view)
    }

    pub async fn list_state(&self) -> ListState {
        *self.list_state.lock().await
    }

    /// Page load: show the placeholder and fetch the list.
    pub async fn init(&self) {
        self.view.lock().await.show_loading();
        self.refresh().await;
    }

    pub async fn refresh(&self) {
        *self.list_state.lock().await = ListState::Loading;

        let activities = match self.client.list_activities().await {
            Ok(activities) => activities,
            Err(err) => {
                error!("error fetching activities: {err}");
                return self.fail_load().await;
            }
        };

        let rendered = render_activity_list(&activities)
            .and_then(|list| Ok((list, render_activity_options(&activities)?)));
        match rendered {
            Ok((list, options)) => {
                self.view.lock().await.show_activities(list, options);
                *self.list_state.lock().await = ListState::Ready;
                debug!(count = activities.len(), "rendered activities");
            }
            Err(err) => {
                error!("error rendering activities: {err}");
                self.fail_load().await;
            }
        }
    }

    async fn fail_load(&self) {
        self.view.lock().await.show_load_failure();
        *self.list_state.lock().await = ListState::Error;
    }

    /// Submits whatever the view's form currently holds.
    pub async fn on_signup_submit(&self) {
        let form = self.view.lock().await.signup_form();
        self.on_signup_submit_with(form).await;
    }

    /// Submits `form` as posted. Concurrent posts each carry their own
    /// values, so one cannot submit another's email.
    pub async fn on_signup_submit_with(&self, form: SignupForm) {
        match self.client.sign_up(&form.activity, &form.email).await {
            Ok(response) => {
                info!(activity = %form.activity, "signed up participant");
                self.view.lock().await.reset_form();
                self.show_banner(MessageKind::Success, &response.message).await;
                self.refresh().await;
            }
            Err(err) => self.report_failure(err, "signing up", SIGNUP_FAILURE_TEXT).await,
        }
    }

    pub async fn on_list_click(&self, event: &ClickEvent) {
        if let Some(ClickAction::RemoveParticipant) = route_click(event) {
            self.remove_participant(event).await;
        }
    }

    async fn remove_participant(&self, event: &ClickEvent) {
        let email = event.target().and_then(|button| button.data("email"));
        let activity = event
            .closest(ROSTER_SELECTOR)
            .and_then(|roster| roster.data("activity"));
        let (Some(activity), Some(email)) = (activity, email) else {
            debug!("remove click without activity or participant, ignoring");
            return;
        };

        match self.client.unregister(activity, email).await {
            Ok(response) => {
                info!(%activity, "removed participant");
                self.show_banner(MessageKind::Success, &response.message).await;
                self.refresh().await;
            }
            Err(err) => {
                self.report_failure(err, "removing participant", REMOVE_FAILURE_TEXT)
                    .await
            }
        }
    }

    async fn report_failure(
        &self,
        err: ClientError,
        action: &str,
        network_text: &str,
    ) {
        match err {
            ClientError::Request { detail } => {
                warn!("backend refused {action}: {detail}");
                self.show_banner(MessageKind::Error, &detail).await;
            }
            err @ ClientError::Network(_) => {
                error!("error {action}: {err}");
                self.show_banner(MessageKind::Error, network_text).await;
            }
        }
    }

    /// Shows the banner and re-arms the hide timer. A pending timer from an
    /// earlier message is cancelled and can no longer hide this one.
    pub async fn show_banner(&self, kind: MessageKind, text: &str) {
        let mut slot = self.banner_timer.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let epoch = {
            let mut view = self.view.lock().await;
            view.show_message(kind, text);
            self.banner_epoch.fetch_add(1, Ordering::SeqCst) + 1
        };

        let view = Arc::clone(&self.view);
        let current = Arc::clone(&self.banner_epoch);
        let delay = self.banner_hide_after;
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut view = view.lock().await;
            if current.load(Ordering::SeqCst) == epoch {
                view.hide_message();
            }
        }));
    }
}

impl<C, V> Drop for Controller<C, V> {
    fn drop(&mut self) {
        if let Some(timer) = self.banner_timer.get_mut().take() {
            timer.abort();
        }
    }
}
