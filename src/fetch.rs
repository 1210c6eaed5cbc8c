//! Fetch-and-classify routine shared by the CLI and the dashboard.

use chrono::NaiveDate;

use crate::{api::PriceSource, prelude::*, table::PriceTable};

#[must_use]
#[derive(Debug)]
pub enum Outcome {
    /// Non-empty table.
    Fetched(PriceTable),

    /// The call succeeded but there were no rows.
    Empty,

    /// The call succeeded but the response was neither a table nor a list.
    Unrecognized,

    ConnectFailed(Error),
    FetchFailed(Error),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Severity {
    #[display("success")]
    Success,

    #[display("warning")]
    Warning,

    #[display("error")]
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

impl Message {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self { severity, text: text.into() }
    }
}

impl Outcome {
    pub const fn table(&self) -> Option<&PriceTable> {
        match self {
            Self::Fetched(table) => Some(table),
            _ => None,
        }
    }

    /// User-visible messages, in display order.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        const FETCHED: &str = "Data fetched successfully.";
        match self {
            Self::Fetched(_) => vec![Message::new(Severity::Success, FETCHED)],
            Self::Empty => vec![
                Message::new(Severity::Success, FETCHED),
                Message::new(Severity::Warning, "The table is empty. No data to display."),
            ],
            Self::Unrecognized => vec![
                Message::new(Severity::Success, FETCHED),
                Message::new(
                    Severity::Warning,
                    "No data returned or result is not a valid list or table.",
                ),
            ],
            Self::ConnectFailed(error) => vec![Message::new(
                Severity::Error,
                format!("Failed to create EPTR2 object: {error:#}"),
            )],
            Self::FetchFailed(error) => {
                vec![Message::new(Severity::Error, format!("Error while fetching data: {error:#}"))]
            }
        }
    }
}

/// Connect to the source and fetch the prices of the single day.
///
/// Never fails: every failure is reported through the [`Outcome`], and front ends log or show
/// [`Outcome::messages`] themselves.
#[instrument(skip_all, fields(on = %on))]
pub async fn fetch<S, C, F>(on: NaiveDate, connect: C) -> Outcome
where
    S: PriceSource,
    C: FnOnce() -> F,
    F: Future<Output = Result<S>>,
{
    let source = match connect().await {
        Ok(source) => source,
        Err(error) => {
            debug!("failed to connect: {error:#}");
            return Outcome::ConnectFailed(error);
        }
    };
    match source.get_market_clearing_prices(on, on, true).await {
        Ok(Some(table)) if table.is_empty() => {
            debug!("the table is empty");
            Outcome::Empty
        }
        Ok(Some(table)) => {
            debug!(shape = %table.shape(), "fetched");
            Outcome::Fetched(table)
        }
        Ok(None) => {
            debug!("the response is not a table");
            Outcome::Unrecognized
        }
        Err(error) => {
            debug!("failed to fetch: {error:#}");
            Outcome::FetchFailed(error)
        }
    }
}
