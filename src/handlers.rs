use crate::controller::{ClickEvent, Element};
use crate::errors::AppError;
use crate::models::{RemoveRequest, SignupForm};
use crate::state::AppState;
use crate::ui::render_index;
use crate::view::ViewSnapshot;
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};
use tracing::debug;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.controller.init().await;
    let view = state.controller.view();
    let snapshot = view.lock().await.snapshot();
    Ok(Html(render_index(&snapshot)?))
}

pub async fn get_view(State(state): State<AppState>) -> Json<ViewSnapshot> {
    let view = state.controller.view();
    let snapshot = view.lock().await.snapshot();
    Json(snapshot)
}

pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Redirect {
    debug!(activity = %form.activity, "signup form submitted");
    state.controller.view().lock().await.fill_form(form.clone());
    state.controller.on_signup_submit_with(form).await;
    Redirect::to("/")
}

pub async fn remove(State(state): State<AppState>, Form(request): Form<RemoveRequest>) -> Redirect {
    state.controller.on_list_click(&remove_click_event(request)).await;
    Redirect::to("/")
}

/// Rebuilds the click path the page script saw: the remove button, its
/// list item, then the roster list carrying the activity name.
fn remove_click_event(request: RemoveRequest) -> ClickEvent {
    let mut button = Element::new().with_class("participant-remove");
    if let Some(email) = request.email {
        button = button.with_data("email", email);
    }
    let mut roster = Element::new().with_class("participants-list");
    if let Some(activity) = request.activity {
        roster = roster.with_data("activity", activity);
    }
    ClickEvent::new(vec![button, Element::new(), roster])
}
