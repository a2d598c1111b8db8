use activities_ui::errors::ClientError;
use activities_ui::models::Participant;
use activities_ui::{DataClient, HttpDataClient};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};

#[derive(Debug, Deserialize)]
struct ViewSnapshot {
    list: ListArea,
    form: Form,
    banner: Value,
}

#[derive(Debug, Deserialize)]
struct ListArea {
    state: String,
    markup: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Form {
    email: String,
    activity: String,
}

static BACKEND: Lazy<String> = Lazy::new(spawn_backend);

type Roster = Arc<Mutex<Map<String, Value>>>;

#[derive(Debug, Deserialize)]
struct EmailQuery {
    email: String,
}

fn seed() -> Map<String, Value> {
    let value = json!({
        "Chess Club": {
            "description": "Learn strategies and compete in chess tournaments",
            "schedule": "Fridays, 3:30 PM - 5:00 PM",
            "max_participants": 12,
            "participants": ["michael@mergington.edu", "daniel@mergington.edu"]
        },
        "Art & Craft": {
            "description": "Paint, sculpt and build",
            "schedule": "Mondays, 4:00 PM - 5:00 PM",
            "max_participants": 3,
            "participants": []
        },
        "Gym Class": {
            "description": "Physical education",
            "schedule": "Wednesdays, 2:00 PM - 3:00 PM",
            "max_participants": 30,
            "participants": [{"name": "Coach Carter", "email": "coach@mergington.edu"}]
        }
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

async fn list_activities(State(roster): State<Roster>) -> Json<Value> {
    Json(Value::Object(roster.lock().await.clone()))
}

async fn change_roster(
    roster: Roster,
    name: String,
    email: String,
    add: bool,
) -> (StatusCode, Json<Value>) {
    let mut roster = roster.lock().await;
    let Some(participants) = roster
        .get_mut(&name)
        .and_then(|activity| activity.get_mut("participants"))
        .and_then(Value::as_array_mut)
    else {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Activity not found" })));
    };
    let position = participants.iter().position(|p| p.as_str() == Some(email.as_str()));
    match (add, position) {
        (true, Some(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Student is already signed up" })),
        ),
        (true, None) => {
            participants.push(Value::from(email.clone()));
            (StatusCode::OK, Json(json!({ "message": format!("Signed up {email} for {name}") })))
        }
        (false, Some(index)) => {
            participants.remove(index);
            (
                StatusCode::OK,
                Json(json!({ "message": format!("Unregistered {email} from {name}") })),
            )
        }
        (false, None) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Student is not signed up for this activity" })),
        ),
    }
}

async fn signup(
    State(roster): State<Roster>,
    Path(name): Path<String>,
    Query(query): Query<EmailQuery>,
) -> (StatusCode, Json<Value>) {
    change_roster(roster, name, query.email, true).await
}

async fn unregister(
    State(roster): State<Roster>,
    Path(name): Path<String>,
    Query(query): Query<EmailQuery>,
) -> (StatusCode, Json<Value>) {
    change_roster(roster, name, query.email, false).await
}

fn mock_backend() -> Router {
    let roster: Roster = Arc::new(Mutex::new(seed()));
    Router::new()
        .route("/activities", get(list_activities))
        .route("/activities/:name/signup", post(signup))
        .route("/activities/:name/unregister", post(unregister))
        .route("/broken/activities", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/broken/activities/:name/signup",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        )
        .route(
            "/bare/activities/:name/signup",
            post(|| async { (StatusCode::CONFLICT, Json(json!({ "error": "nope" }))) }),
        )
        .with_state(roster)
}

fn spawn_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind backend port");
    listener.set_nonblocking(true).expect("nonblocking backend");
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, mock_backend()).await.unwrap();
        });
    });
    format!("http://{addr}")
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn backend_client(path: &str) -> HttpDataClient {
    let base = Url::parse(&format!("{}{}", *BACKEND, path)).unwrap();
    HttpDataClient::new(&base)
}

/// The built binary, pointed at the mock backend. Each test gets its own
/// process so page state never leaks between tests.
struct Frontend {
    base_url: String,
    http: Client,
    _process: Child,
}

impl Frontend {
    async fn start() -> Self {
        let port = free_port();
        let process = Command::new(env!("CARGO_BIN_EXE_activities_ui"))
            .env("PORT", port.to_string())
            .env("ACTIVITIES_API_URL", BACKEND.as_str())
            .env("RUST_LOG", "info")
            .kill_on_drop(true)
            .spawn()
            .expect("failed to start frontend");
        let frontend = Self {
            base_url: format!("http://127.0.0.1:{port}"),
            http: Client::new(),
            _process: process,
        };
        timeout(Duration::from_secs(5), frontend.wait_ready())
            .await
            .expect("frontend did not become ready");
        frontend
    }

    async fn wait_ready(&self) {
        loop {
            match self.http.get(self.url("/api/view")).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => sleep(Duration::from_millis(50)).await,
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn page(&self) -> String {
        self.http.get(self.url("/")).send().await.unwrap().text().await.unwrap()
    }

    async fn post(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.http.post(self.url(path)).form(fields).send().await.unwrap()
    }

    async fn view(&self) -> ViewSnapshot {
        self.http
            .get(self.url("/api/view"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn http_client_lists_and_changes_roster() {
    let client = backend_client("");

    let activities = client.list_activities().await.unwrap();
    let names: Vec<_> = activities.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Chess Club", "Art & Craft", "Gym Class"]);

    let before = client.list_activities().await.unwrap();
    let spots = before.get("Art & Craft").unwrap().details.spots_left();

    let signed = client.sign_up("Art & Craft", "new+one@mergington.edu").await.unwrap();
    assert_eq!(signed.message, "Signed up new+one@mergington.edu for Art & Craft");
    let after = client.list_activities().await.unwrap();
    assert_eq!(after.get("Art & Craft").unwrap().details.spots_left(), spots - 1);

    let again = client.sign_up("Art & Craft", "new+one@mergington.edu").await;
    assert_eq!(
        again,
        Err(ClientError::Request {
            detail: "Student is already signed up".into()
        })
    );

    let removed = client.unregister("Art & Craft", "new+one@mergington.edu").await.unwrap();
    assert_eq!(removed.message, "Unregistered new+one@mergington.edu from Art & Craft");

    let missing = client.unregister("Art & Craft", "nobody@mergington.edu").await;
    assert!(matches!(missing, Err(ClientError::Request { .. })));
}

#[tokio::test]
async fn http_client_reports_network_and_default_errors() {

    let broken = backend_client("/broken");
    assert!(matches!(broken.list_activities().await, Err(ClientError::Network(_))));
    assert!(matches!(broken.sign_up("Chess Club", "a@x.com").await, Err(ClientError::Network(_))));

    let bare = backend_client("/bare");
    assert_eq!(
        bare.sign_up("Chess Club", "a@x.com").await,
        Err(ClientError::Request {
            detail: "An error occurred".into()
        })
    );

    let port = free_port();
    let nowhere = HttpDataClient::new(&Url::parse(&format!("http://127.0.0.1:{port}")).unwrap());
    assert!(matches!(nowhere.list_activities().await, Err(ClientError::Network(_))));
}

#[tokio::test]
async fn http_page_renders_activities() {
    let frontend = Frontend::start().await;

    let page = frontend.page().await;

    assert!(page.contains("Chess Club"));
    assert!(page.contains("Art &amp; Craft"));
    assert!(page.contains(r#"data-email="Coach Carter""#));
    assert!(page.contains(r#"class="participant-name">Coach Carter<"#));
    assert!(page.contains(">CC</span>"));
    assert!(page.contains(r#"<option value="Gym Class">Gym Class</option>"#));

    let view = frontend.view().await;
    assert_eq!(view.list.state, "activities");
    assert!(view.list.markup.unwrap().contains("29 spots left"));
}

#[tokio::test]
async fn http_signup_and_remove_through_forms() {
    let frontend = Frontend::start().await;
    let email = "form.user@mergington.edu";

    let page = frontend
        .post("/signup", &[("email", email), ("activity", "Chess Club")])
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains(&format!("Signed up {email} for Chess Club")));
    assert!(page.contains(&format!(r#"data-email="{email}""#)));

    let view = frontend.view().await;
    assert_eq!(view.form.email, "");
    assert_eq!(view.form.activity, "");
    assert_eq!(view.banner["state"], "showing_success");

    let page = frontend
        .post("/signup", &[("email", email), ("activity", "Chess Club")])
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains(r#"class="message error">Student is already signed up<"#));
    let view = frontend.view().await;
    assert_eq!(view.form.email, email);

    let page = frontend
        .post("/remove", &[("activity", "Chess Club"), ("email", email)])
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains(&format!("Unregistered {email} from Chess Club")));
    assert!(!page.contains(&format!(r#"data-email="{email}""#)));
}

#[tokio::test]
async fn http_concurrent_signups_keep_their_own_email() {
    let frontend = Frontend::start().await;
    let first = "first.racer@mergington.edu";
    let second = "second.racer@mergington.edu";

    let first_form = [("email", first), ("activity", "Chess Club")];
    let second_form = [("email", second), ("activity", "Chess Club")];
    let (a, b) = tokio::join!(
        frontend.post("/signup", &first_form),
        frontend.post("/signup", &second_form),
    );
    assert!(a.status().is_success());
    assert!(b.status().is_success());

    let activities = backend_client("").list_activities().await.unwrap();
    let roster = &activities.get("Chess Club").unwrap().details.participants;
    for email in [first, second] {
        let count = roster
            .iter()
            .filter(|p| matches!(p, Participant::Identifier(id) if id == email))
            .count();
        assert_eq!(count, 1, "{email} should be signed up exactly once");
    }
}

#[tokio::test]
async fn http_remove_without_activity_is_ignored() {
    let frontend = Frontend::start().await;
    frontend.page().await;

    let response = frontend.post("/remove", &[("email", "michael@mergington.edu")]).await;
    assert!(response.status().is_success());

    let after = frontend.view().await;
    assert_eq!(after.banner["state"], "hidden");
    assert!(
        after
            .list
            .markup
            .unwrap()
            .contains(r#"data-email="michael@mergington.edu""#)
    );
}
