//! [EPİAŞ Transparency Platform](https://seffaflik.epias.com.tr) client.

mod payload;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use http::{HeaderValue, header::ACCEPT};
use reqwest::{Client, Url};
use serde::Serialize;

use self::payload::Payload;
use crate::{
    api::{PriceSource, client},
    credentials::Credentials,
    prelude::*,
    table::PriceTable,
};

/// Türkiye has been on UTC+3 all year round since 2016.
const TURKEY_UTC_OFFSET_SECONDS: i32 = 3 * 3600;

pub const LOGIN_URL: &str = "https://giris.epias.com.tr/cas/v1/tickets";
pub const BASE_URL: &str = "https://seffaflik.epias.com.tr/electricity-service";

#[derive(Clone, Debug)]
pub struct Endpoints {
    /// CAS ticket endpoint which exchanges the credentials for a TGT.
    pub login_url: Url,

    /// Electricity service base URL.
    pub base_url: Url,
}

impl Endpoints {
    pub fn production() -> Result<Self> {
        Ok(Self {
            login_url: LOGIN_URL.parse().context("invalid login URL")?,
            base_url: BASE_URL.parse().context("invalid base URL")?,
        })
    }
}

pub struct Api {
    client: Client,
    base_url: Url,

    /// Ticket-granting ticket, sent with every data request.
    ticket: HeaderValue,
}

impl Api {
    /// Log in and build the client.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(endpoints: &Endpoints, credentials: &Credentials) -> Result<Self> {
        let client = client::try_new()?;
        info!("logging in…");
        let ticket = client
            .post(endpoints.login_url.clone())
            .header(ACCEPT, "text/plain")
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("failed to call `{}`", endpoints.login_url))?
            .error_for_status()
            .context("login failed")?
            .text()
            .await
            .context("failed to read the ticket")?;
        let ticket = ticket.trim();
        ensure!(!ticket.is_empty(), "the platform returned an empty ticket");
        let ticket = HeaderValue::from_str(ticket).context("the ticket is not a valid header")?;
        debug!("logged in");
        Ok(Self { client, base_url: endpoints.base_url.clone(), ticket })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl PriceSource for Api {
    #[instrument(skip_all, fields(since = %since, until = %until, postprocess = postprocess))]
    async fn get_market_clearing_prices(
        &self,
        since: NaiveDate,
        until: NaiveDate,
        postprocess: bool,
    ) -> Result<Option<PriceTable>> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Request {
            start_date: DateTime<FixedOffset>,
            end_date: DateTime<FixedOffset>,
        }

        let request = Request { start_date: start_of(since)?, end_date: start_of(until)? };
        let url = self.endpoint("v1/markets/dam/data/mcp");
        info!("fetching…");
        let payload = self
            .client
            .post(&url)
            .header("TGT", self.ticket.clone())
            .json(&request)
            .send()
            .await
            .with_context(|| format!("failed to call `{url}`"))?
            .error_for_status()
            .context("request failed")?
            .json::<Payload>()
            .await
            .context("failed to deserialize the response")?;
        let table = payload.into_table(postprocess);
        match &table {
            Some(table) => info!(shape = %table.shape(), "fetched"),
            None => warn!("unrecognized response"),
        }
        Ok(table)
    }
}

/// Midnight of the date in Türkiye.
fn start_of(date: NaiveDate) -> Result<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(TURKEY_UTC_OFFSET_SECONDS).context("invalid offset")?;
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .with_context(|| format!("`{date}` has no midnight in Türkiye"))
}
