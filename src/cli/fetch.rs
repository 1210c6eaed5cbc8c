use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;

use crate::{
    api::{
        PriceSource,
        eptr::{self, Endpoints},
    },
    credentials::Credentials,
    export::write_csv,
    fetch::{Outcome, Severity, fetch},
    prelude::*,
    table::PriceTable,
    tables::build_preview_table,
};

const CREDENTIALS_PATH: &str = "credentials.json";
const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
pub struct FetchArgs {
    /// Day to fetch, for example: `2024-01-31`.
    #[clap(long)]
    pub date: NaiveDate,
}

impl FetchArgs {
    /// Fetch the prices and save them into the working directory.
    ///
    /// Returns the path of the saved file.
    pub async fn run(&self) -> Option<PathBuf> {
        self.run_with(
            Path::new(CREDENTIALS_PATH),
            Path::new("."),
            &mut io::stdout(),
            |credentials| async move {
                eptr::Api::login(&Endpoints::production()?, &credentials).await
            },
        )
        .await
    }

    #[instrument(skip_all, fields(date = %self.date))]
    async fn run_with<S, C, F>(
        &self,
        credentials_path: &Path,
        output_dir: &Path,
        output: &mut impl Write,
        connect: C,
    ) -> Option<PathBuf>
    where
        S: PriceSource,
        C: FnOnce(Credentials) -> F,
        F: Future<Output = Result<S>>,
    {
        let credentials = match Credentials::from_json_file(credentials_path) {
            Ok(credentials) => credentials,
            Err(error) => {
                error!("{error:#}");
                return None;
            }
        };
        let outcome = fetch(self.date, move || connect(credentials)).await;
        report(&outcome);
        save(&outcome, output_dir, Local::now().naive_local(), output)
    }
}

fn report(outcome: &Outcome) {
    for message in outcome.messages() {
        match message.severity {
            Severity::Success => info!("{}", message.text),
            Severity::Warning => warn!("{}", message.text),
            Severity::Error => error!("{}", message.text),
        }
    }
}

/// Print the preview, and write the CSV file.
fn save(
    outcome: &Outcome,
    output_dir: &Path,
    now: NaiveDateTime,
    output: &mut impl Write,
) -> Option<PathBuf> {
    let table = outcome.table()?;
    if let Err(error) = print_preview(table, output) {
        error!("failed to print the preview: {error:#}");
    }
    match write_csv(table, output_dir, now) {
        Ok(path) => {
            info!(path = %path.display(), "saved");
            Some(path)
        }
        Err(error) => {
            error!("failed to save the table: {error:#}");
            None
        }
    }
}

fn print_preview(table: &PriceTable, output: &mut impl Write) -> io::Result<()> {
    writeln!(output, "Shape: {}", table.shape())?;
    writeln!(output, "{}", build_preview_table(table, PREVIEW_ROWS))?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::{
            Arc,
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use tempfile::TempDir;
    use tracing::instrument::WithSubscriber;

    use super::*;
    use crate::fetch::tests::{FakeSource, ON, broken_prices, hourly_prices, no_prices};

    struct Run {
        path: Option<PathBuf>,
        output: String,
    }

    async fn run_in<S, C, F>(directory: &TempDir, connect: C) -> Result<Run>
    where
        S: PriceSource,
        C: FnOnce(Credentials) -> F,
        F: Future<Output = Result<S>>,
    {
        let credentials_path = directory.path().join("credentials.json");
        fs::write(&credentials_path, r#"{"username": "user", "password": "secret"}"#)?;
        let mut output = Vec::new();
        let path = FetchArgs { date: ON }
            .run_with(&credentials_path, directory.path(), &mut output, connect)
            .await;
        Ok(Run { path, output: String::from_utf8(output)? })
    }

    fn csv_files(directory: &TempDir) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(directory.path())? {
            let path = entry?.path();
            if path.extension().is_some_and(|extension| extension == "csv") {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    #[tokio::test]
    async fn saved_ok() -> Result {
        let directory = tempfile::tempdir()?;
        let run = run_in(&directory, |_| async { Ok(FakeSource::new(hourly_prices)) }).await?;
        let path = run.path.context("nothing has been saved")?;

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("PTF_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "PTF_".len() + 15 + ".csv".len());

        let mut reader = csv::Reader::from_path(&path)?;
        assert_eq!(reader.headers()?.len(), 3);
        assert_eq!(reader.records().count(), 24);
        Ok(())
    }

    #[tokio::test]
    async fn prints_shape_and_preview() -> Result {
        let directory = tempfile::tempdir()?;
        let run = run_in(&directory, |_| async { Ok(FakeSource::new(hourly_prices)) }).await?;

        assert!(run.output.starts_with("Shape: (24, 3)\n"));
        for hour in 0..5 {
            assert!(run.output.contains(&format!("{hour:02}:00")), "hour {hour}");
        }
        assert!(!run.output.contains("05:00"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_credentials_never_fetch() -> Result {
        let directory = tempfile::tempdir()?;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut output = Vec::new();
        let path = FetchArgs { date: ON }
            .run_with(
                &directory.path().join("missing.json"),
                directory.path(),
                &mut output,
                move |_| async move {
                    counter.fetch_add(1, Ordering::Relaxed);
                    Ok(FakeSource::new(hourly_prices))
                },
            )
            .await;

        assert!(path.is_none());
        assert_eq!(calls.load(Ordering::Relaxed), 0);
        assert!(output.is_empty());
        assert!(csv_files(&directory)?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn fetch_failed_writes_nothing() -> Result {
        let directory = tempfile::tempdir()?;
        let run = run_in(&directory, |_| async { Ok(FakeSource::new(broken_prices)) }).await?;
        assert!(run.path.is_none());
        assert!(run.output.is_empty());
        assert!(csv_files(&directory)?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn connect_failed_writes_nothing() -> Result {
        let directory = tempfile::tempdir()?;
        let run = run_in(&directory, |_| async {
            Err::<FakeSource, _>(anyhow::anyhow!("login failed"))
        })
        .await?;
        assert!(run.path.is_none());
        assert!(csv_files(&directory)?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn empty_writes_nothing() -> Result {
        let directory = tempfile::tempdir()?;
        let run = run_in(&directory, |_| async { Ok(FakeSource::new(no_prices)) }).await?;
        assert!(run.path.is_none());
        assert!(run.output.is_empty());
        assert!(csv_files(&directory)?.is_empty());
        Ok(())
    }

    #[test]
    fn save_failure_keeps_preview() {
        let table = PriceTable::from_records(vec![serde_json::json!({"price": 1})]);
        let outcome = Outcome::Fetched(table);
        let now = Local::now().naive_local();
        let mut output = Vec::new();
        assert!(save(&outcome, Path::new("/nonexistent/directory"), now, &mut output).is_none());
        assert!(String::from_utf8_lossy(&output).starts_with("Shape: (1, 1)"));
    }

    #[tokio::test]
    async fn unreachable_platform() -> Result {
        let directory = tempfile::tempdir()?;
        let endpoints = Endpoints {
            login_url: "http://127.0.0.1:9/cas/v1/tickets".parse()?,
            base_url: "http://127.0.0.1:9/electricity-service".parse()?,
        };
        let run = run_in(&directory, move |credentials| async move {
            eptr::Api::login(&endpoints, &credentials).await
        })
        .await?;
        assert!(run.path.is_none());
        assert!(csv_files(&directory)?.is_empty());
        Ok(())
    }

    #[derive(Clone, Default)]
    struct Logs(Arc<Mutex<Vec<u8>>>);

    impl Write for Logs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn fetch_error_is_logged_once() -> Result {
        let directory = tempfile::tempdir()?;
        let logs = Logs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .with_ansi(false)
            .without_time()
            .finish();

        run_in(&directory, |_| async { Ok(FakeSource::new(broken_prices)) })
            .with_subscriber(subscriber)
            .await?;

        let logs = String::from_utf8(logs.0.lock().unwrap().clone())?;
        assert_eq!(logs.matches("connection reset").count(), 1, "{logs}");
        assert!(logs.contains("Error while fetching data: connection reset"));
        Ok(())
    }
}
