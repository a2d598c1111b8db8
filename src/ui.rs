use crate::formatter::{display_text_of, initials_of};
use crate::models::{Activities, ActivityDetails, Participant};
use crate::view::{Banner, ListArea, LOAD_FAILURE_TEXT, LOADING_TEXT, MessageKind, ViewSnapshot};
use askama::Template;

/// First entry of the activity select, shown before any list has loaded.
pub const PLACEHOLDER_OPTION: &str = r#"<option value="">-- Select an activity --</option>"#;

struct ParticipantEntry {
    badge: String,
    text: String,
}

impl ParticipantEntry {
    fn of(participant: &Participant) -> Self {
        let text = display_text_of(participant);
        Self {
            badge: initials_of(&text),
            text,
        }
    }
}

fn entries(participants: Option<&[Participant]>) -> Vec<ParticipantEntry> {
    participants
        .unwrap_or_default()
        .iter()
        .map(ParticipantEntry::of)
        .collect()
}

#[derive(Template)]
#[template(path = "participants.html")]
struct ParticipantsTemplate {
    participants: Vec<ParticipantEntry>,
}

#[derive(Template)]
#[template(path = "activity_card.html")]
struct ActivityCardTemplate<'a> {
    name: &'a str,
    description: &'a str,
    schedule: &'a str,
    spots_left: i64,
    participants: Vec<ParticipantEntry>,
}

#[derive(Template)]
#[template(path = "options.html")]
struct OptionsTemplate<'a> {
    names: Vec<&'a str>,
}

#[derive(Template)]
#[template(source = r#"<option value="{{ value }}">"#, ext = "html")]
struct OptionTag<'a> {
    value: &'a str,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    notice: Option<&'a str>,
    activities: &'a str,
    options: String,
    email: &'a str,
    message_class: &'a str,
    message: &'a str,
}

pub fn render_participants(
    participants: Option<&[Participant]>,
    _activity_name: &str,
) -> askama::Result<String> {
    ParticipantsTemplate {
        participants: entries(participants),
    }
    .render()
}

pub fn render_activity_card(name: &str, activity: &ActivityDetails) -> askama::Result<String> {
    ActivityCardTemplate {
        name,
        description: &activity.description,
        schedule: &activity.schedule,
        spots_left: activity.spots_left(),
        participants: entries(Some(&activity.participants)),
    }
    .render()
}

pub fn render_activity_list(activities: &Activities) -> askama::Result<String> {
    activities
        .iter()
        .map(|activity| render_activity_card(&activity.name, &activity.details))
        .collect()
}

pub fn render_activity_options(activities: &Activities) -> askama::Result<String> {
    OptionsTemplate {
        names: activities.iter().map(|activity| activity.name.as_str()).collect(),
    }
    .render()
}

/// Marks the option matching the current form value as selected.
fn select_option(options_markup: &str, selected: &str) -> askama::Result<String> {
    if selected.is_empty() {
        return Ok(options_markup.to_string());
    }
    let needle = OptionTag { value: selected }.render()?;
    let replacement = match needle.strip_suffix('>') {
        Some(open) => format!("{open} selected>"),
        None => return Ok(options_markup.to_string()),
    };
    Ok(options_markup.replacen(&needle, &replacement, 1))
}

pub fn render_index(view: &ViewSnapshot) -> askama::Result<String> {
    let (notice, activities) = match &view.list {
        ListArea::Loading => (Some(LOADING_TEXT), ""),
        ListArea::Activities(markup) => (None, markup.as_str()),
        ListArea::Failed => (Some(LOAD_FAILURE_TEXT), ""),
    };
    let (message_class, message) = match &view.banner {
        Banner::Hidden => ("hidden", ""),
        Banner::ShowingSuccess { text } => (MessageKind::Success.css_class(), text.as_str()),
        Banner::ShowingError { text } => (MessageKind::Error.css_class(), text.as_str()),
    };

    IndexTemplate {
        notice,
        activities,
        options: select_option(&view.options_markup, &view.form.activity)?,
        email: &view.form.email,
        message_class,
        message,
    }
    .render()
}
