//! Concurrent fan-out / fan-in over a [`DataSource`]
//!
//! Every fetch in a batch is a separate tokio task. The batch is awaited as a
//! whole and results are aligned with the input by position (snapshots) or by
//! key (series), independent of completion order. Failures, including a
//! panicking task, become `None` for that slot only.

use std::{future::Future, sync::Arc};

use futures::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, error, warn};

use crate::shared::{
    error::FetchError,
    source::DataSource,
    types::{Series, SeriesMap, Snapshot, Symbol, Timeframe},
};

pub struct FetchOrchestrator<S> {
    source: Arc<S>,
}

impl<S> Clone for FetchOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: DataSource> FetchOrchestrator<S> {
    pub fn new(source: S) -> Self {
        Self::from_shared(Arc::new(source))
    }

    pub fn from_shared(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Latest snapshot per symbol, same length and order as `symbols`
    pub async fn fetch_all(&self, symbols: &[Symbol]) -> Vec<Option<Snapshot>> {
        let handles = symbols.iter().cloned().map(|symbol| {
            let source = Arc::clone(&self.source);
            tokio::spawn(async move {
                let result = source.fetch_snapshot(&symbol).await;
                contain(source.name(), &symbol, None, result)
            })
        });

        let labels = symbols.iter().map(|symbol| (symbol, None));
        let results = join_handles(handles, labels).await;
        debug!(
            requested = symbols.len(),
            received = results.iter().filter(|r| r.is_some()).count(),
            "Fetched snapshots"
        );
        results
    }

    /// Series for every symbol × timeframe pair, keyed in configuration order
    pub async fn fetch_all_series(
        &self,
        symbols: &[Symbol],
        timeframes: &[Timeframe],
    ) -> SeriesMap {
        let pairs: Vec<(&Symbol, &Timeframe)> = symbols
            .iter()
            .flat_map(|symbol| timeframes.iter().map(move |timeframe| (symbol, timeframe)))
            .collect();

        let handles = pairs.iter().map(|(symbol, timeframe)| {
            let source = Arc::clone(&self.source);
            let symbol = (*symbol).clone();
            let timeframe = (*timeframe).clone();
            tokio::spawn(async move {
                let result = source.fetch_series(&symbol, &timeframe).await;
                contain(source.name(), &symbol, Some(&timeframe), result)
            })
        });

        let labels = pairs
            .iter()
            .map(|(symbol, timeframe)| (*symbol, Some(*timeframe)));
        let results = join_handles(handles, labels).await;

        let mut series: SeriesMap = symbols
            .iter()
            .map(|symbol| (symbol.clone(), IndexMap::with_capacity(timeframes.len())))
            .collect();

        for ((symbol, timeframe), result) in pairs.into_iter().zip(results) {
            if let Some(by_timeframe) = series.get_mut(symbol) {
                by_timeframe.insert(timeframe.name.clone(), result);
            }
        }

        series
    }
}

/// Await every handle in order; a task that panicked yields `None`
async fn join_handles<'a, T, H, L>(handles: H, labels: L) -> Vec<Option<T>>
where
    H: IntoIterator,
    H::Item: Future<Output = Result<Option<T>, tokio::task::JoinError>>,
    L: IntoIterator<Item = (&'a Symbol, Option<&'a Timeframe>)>,
{
    join_all(handles)
        .await
        .into_iter()
        .zip(labels)
        .map(|(joined, (symbol, timeframe))| match joined {
            Ok(result) => result,
            Err(join_error) => {
                let error = FetchError::from(join_error);
                log_failure("task", symbol, timeframe, &error);
                None
            }
        })
        .collect()
}

/// Convert a fetch outcome into an optional value, logging any failure
fn contain<T>(
    source: &str,
    symbol: &Symbol,
    timeframe: Option<&Timeframe>,
    result: Result<T, FetchError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            log_failure(source, symbol, timeframe, &error);
            None
        }
    }
}

fn log_failure(source: &str, symbol: &Symbol, timeframe: Option<&Timeframe>, error: &FetchError) {
    let timeframe = timeframe.map(|tf| tf.name.as_str()).unwrap_or("-");
    match error {
        FetchError::Empty => warn!(
            source,
            %symbol,
            timeframe,
            "No data returned"
        ),
        _ => error!(
            source,
            %symbol,
            timeframe,
            kind = error.kind(),
            %error,
            "Fetch failed"
        ),
    }
}
