//! Web dashboard: pick a date, press the button, see the prices.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use bon::Builder;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::{
    api::{
        PriceSource,
        eptr::{self, Endpoints},
    },
    credentials::Credentials,
    fetch::{Message, Severity, fetch},
    prelude::*,
    table::{Shape, cell_text},
};

#[derive(Builder)]
pub struct AppState {
    #[builder(into)]
    secrets_path: PathBuf,

    endpoints: Endpoints,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(|| async { "OK" }))
        .with_state(Arc::new(state))
}

#[instrument(skip_all, fields(bind = %bind))]
pub async fn serve(bind: SocketAddr, state: AppState) -> Result {
    let listener =
        TcpListener::bind(bind).await.with_context(|| format!("failed to bind to `{bind}`"))?;
    info!("listening on http://{bind}/");
    axum::serve(listener, router(state)).await.context("the server has failed")
}

#[derive(Deserialize)]
struct DashboardQuery {
    date: Option<NaiveDate>,

    /// Set by the «Fetch Data» button.
    fetch: Option<String>,
}

async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());
    let template = if query.fetch.is_some() {
        let credentials = Credentials::from_secrets_file(&state.secrets_path);
        DashboardTemplate::fetched(date, credentials, move |credentials| async move {
            eptr::Api::login(&state.endpoints, &credentials).await
        })
        .await
    } else {
        DashboardTemplate::new(date)
    };
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(error) => {
            error!("failed to render the dashboard: {error:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to render the page: {error}"))
                .into_response()
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    date: String,
    messages: Vec<Message>,
    table: Option<HtmlTable>,
}

struct HtmlTable {
    shape: Shape,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DashboardTemplate {
    /// The page before the button is pressed.
    pub fn new(date: NaiveDate) -> Self {
        Self { date: date.format("%Y-%m-%d").to_string(), messages: Vec::new(), table: None }
    }

    /// The page after the button is pressed.
    ///
    /// Nothing gets fetched when the credentials are unavailable.
    #[instrument(skip_all, fields(date = %date))]
    pub async fn fetched<S, C, F>(
        date: NaiveDate,
        credentials: Result<Credentials>,
        connect: C,
    ) -> Self
    where
        S: PriceSource,
        C: FnOnce(Credentials) -> F,
        F: Future<Output = Result<S>>,
    {
        let mut page = Self::new(date);
        let credentials = match credentials {
            Ok(credentials) => credentials,
            Err(error) => {
                error!("{error:#}");
                page.messages.push(Message::new(Severity::Error, format!("{error}.")));
                return page;
            }
        };
        let outcome = fetch(date, move || connect(credentials)).await;
        page.messages = outcome.messages();
        page.table = outcome.table().map(|table| HtmlTable {
            shape: table.shape(),
            columns: table.columns().to_vec(),
            rows: table
                .rows()
                .iter()
                .map(|row| row.iter().map(|value| cell_text(value).into_owned()).collect())
                .collect(),
        });
        page
    }
}
