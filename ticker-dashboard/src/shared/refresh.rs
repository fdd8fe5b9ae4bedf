//! Fetch → present → draw → sleep, until cancelled
//!
//! Phases run strictly in sequence; the only concurrency is inside a fetch
//! batch. Cancellation is observed at phase boundaries and interrupts the
//! sleep immediately. A fetch that is already in flight is allowed to finish,
//! but its result is never drawn.

use std::{sync::Arc, time::Duration};

use chrono::Local;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::shared::{
    config::DashboardConfig,
    error::DashboardError,
    fetch::FetchOrchestrator,
    present::Presenter,
    render::{spawn_input_watcher, Renderer, TerminalRenderer},
    source::DataSource,
    types::{SeriesMap, Symbol, Timeframe},
};

/// Shared trigger for stopping the dashboard
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

/// Create a cancel trigger and the receiver the [`RefreshLoop`] observes
pub fn cancel_channel() -> (CancelHandle, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(Arc::new(tx)), rx)
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

/// Cancel on SIGINT. Covers the window before raw mode is entered and
/// non-interactive runs.
pub fn spawn_signal_listener(cancel: CancelHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received interrupt signal");
                cancel.cancel();
            }
            Err(error) => warn!(%error, "Failed to listen for interrupt signal"),
        }
    })
}

pub struct RefreshLoop<S, R> {
    orchestrator: FetchOrchestrator<S>,
    presenter: Presenter,
    renderer: R,
    symbols: Vec<Symbol>,
    timeframes: Vec<Timeframe>,
    interval: Duration,
    cancel: watch::Receiver<bool>,
}

impl<S, R> RefreshLoop<S, R>
where
    S: DataSource,
    R: Renderer,
{
    pub fn new(
        config: &DashboardConfig,
        orchestrator: FetchOrchestrator<S>,
        renderer: R,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        let timeframes = if config.variant.has_charts() {
            config.timeframes.clone()
        } else {
            Vec::new()
        };

        Self {
            orchestrator,
            presenter: Presenter::new(config),
            renderer,
            symbols: config.symbols.clone(),
            timeframes,
            interval: config.update_interval,
            cancel,
        }
    }

    /// Run until cancelled or a draw fails, returning the number of completed
    /// cycles. The renderer is shut down on every exit path.
    pub async fn run(mut self) -> Result<u64, DashboardError> {
        info!(
            source = self.orchestrator.source().name(),
            symbols = self.symbols.len(),
            timeframes = self.timeframes.len(),
            interval_secs = self.interval.as_secs(),
            "Starting refresh loop"
        );

        let result = self.cycle_until_cancelled().await;

        if let Err(error) = self.renderer.shutdown() {
            warn!(%error, "Failed to shut down renderer");
        }

        match &result {
            Ok(cycles) => info!(cycles, "Refresh loop stopped"),
            Err(error) => error!(%error, "Refresh loop failed"),
        }
        result
    }

    async fn cycle_until_cancelled(&mut self) -> Result<u64, DashboardError> {
        let mut cycles = 0;

        loop {
            if self.is_cancelled() {
                return Ok(cycles);
            }

            let (snapshots, series) = tokio::join!(
                self.orchestrator.fetch_all(&self.symbols),
                self.fetch_series()
            );

            if self.is_cancelled() {
                debug!("Cancelled during fetch, skipping draw");
                return Ok(cycles);
            }

            let model = self
                .presenter
                .present(Local::now().naive_local(), &snapshots, series.as_ref());
            self.renderer.draw(&model)?;

            cycles += 1;
            debug!(
                cycle = cycles,
                rows = model.rows.len(),
                panels = model.panels.len(),
                "Cycle complete"
            );

            if self.sleep_or_cancel().await {
                return Ok(cycles);
            }
        }
    }

    /// Chart series for the configured timeframes, `None` for table-only variants
    async fn fetch_series(&self) -> Option<SeriesMap> {
        let (symbols, timeframes) = (&self.symbols, &self.timeframes);
        if timeframes.is_empty() {
            return None;
        }
        let series = self.orchestrator.fetch_all_series(symbols, timeframes);
        Some(series.await)
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Sleep for one interval; `true` if cancelled first. Dropping every
    /// [`CancelHandle`] counts as cancellation.
    async fn sleep_or_cancel(&mut self) -> bool {
        let sleep = tokio::time::sleep(self.interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = self.cancel.changed() => {
                    if changed.is_err() || *self.cancel.borrow_and_update() {
                        return true;
                    }
                }
            }
        }
    }
}

/// Wire a source to the live terminal and run until the user quits
pub async fn run_dashboard<S: DataSource>(
    config: &DashboardConfig,
    source: S,
) -> Result<u64, DashboardError> {
    let renderer = TerminalRenderer::new(config.chart.columns)?;

    let (cancel, cancel_rx) = cancel_channel();
    let signal = spawn_signal_listener(cancel.clone());
    let input = spawn_input_watcher(cancel.clone());

    let orchestrator = FetchOrchestrator::new(source);
    let result = RefreshLoop::new(config, orchestrator, renderer, cancel_rx)
        .run()
        .await;

    // Release the input watcher and signal listener
    cancel.cancel();
    signal.abort();
    if let Err(error) = input.await {
        warn!(%error, "Input watcher failed");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{
        config::Variant,
        error::{FetchError, RenderError},
        present::DisplayModel,
        types::{Series, Snapshot},
    };
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    struct InstantSource {
        delay: Duration,
    }

    #[async_trait]
    impl DataSource for InstantSource {
        fn name(&self) -> &str {
            "instant"
        }

        async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<Snapshot, FetchError> {
            tokio::time::sleep(self.delay).await;
            let mut snapshot = Snapshot::empty(symbol.clone());
            snapshot.last_price = 100.0.into();
            Ok(snapshot)
        }

        async fn fetch_series(&self, _: &Symbol, _: &Timeframe) -> Result<Series, FetchError> {
            tokio::time::sleep(self.delay).await;
            Ok(Series::from_closes(vec![1.0, 2.0, 3.0]))
        }
    }

    #[derive(Default)]
    struct Recorded {
        draws: AtomicUsize,
        shutdowns: AtomicUsize,
        models: Mutex<Vec<DisplayModel>>,
    }

    struct RecordingRenderer {
        recorded: Arc<Recorded>,
        fail_on_draw: Option<usize>,
    }

    impl Renderer for RecordingRenderer {
        fn draw(&mut self, model: &DisplayModel) -> Result<(), RenderError> {
            let draw = self.recorded.draws.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on_draw == Some(draw) {
                return Err(RenderError::Io(std::io::Error::other("terminal gone")));
            }
            self.recorded.models.lock().unwrap().push(model.clone());
            Ok(())
        }

        fn shutdown(&mut self) -> Result<(), RenderError> {
            self.recorded.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config(variant: Variant) -> DashboardConfig {
        let mut config = DashboardConfig::defaults(variant);
        config.update_interval = Duration::from_secs(1);
        config
    }

    fn refresh_loop(
        config: &DashboardConfig,
        delay: Duration,
        fail_on_draw: Option<usize>,
    ) -> (RefreshLoop<InstantSource, RecordingRenderer>, Arc<Recorded>, CancelHandle) {
        let recorded = Arc::new(Recorded::default());
        let (cancel, rx) = cancel_channel();
        let renderer = RecordingRenderer {
            recorded: Arc::clone(&recorded),
            fail_on_draw,
        };
        let orchestrator = FetchOrchestrator::new(InstantSource { delay });
        let refresh = RefreshLoop::new(config, orchestrator, renderer, rx);
        (refresh, recorded, cancel)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_second_cycle() {
        let config = config(Variant::CryptoTicker);
        let (refresh, recorded, cancel) = refresh_loop(&config, Duration::ZERO, None);

        // Cycles start at t=0s and t=1s; cancel while sleeping towards t=2s
        let (result, _) = tokio::join!(refresh.run(), async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            cancel.cancel();
        });

        assert_eq!(result.unwrap(), 2);
        assert_eq!(recorded.draws.load(Ordering::SeqCst), 2);
        assert_eq!(recorded.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_fetch_skips_draw() {
        let config = config(Variant::CryptoTicker);
        let (refresh, recorded, cancel) = refresh_loop(&config, Duration::from_millis(500), None);

        let (result, _) = tokio::join!(refresh.run(), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            cancel.cancel();
        });

        assert_eq!(result.unwrap(), 0);
        assert_eq!(recorded.draws.load(Ordering::SeqCst), 0);
        assert_eq!(recorded.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let config = config(Variant::CryptoTicker);
        let (refresh, recorded, cancel) = refresh_loop(&config, Duration::ZERO, None);
        cancel.cancel();

        assert_eq!(refresh.run().await.unwrap(), 0);
        assert_eq!(recorded.draws.load(Ordering::SeqCst), 0);
        assert_eq!(recorded.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_draw_error_stops_loop_and_shuts_down() {
        let config = config(Variant::CryptoTicker);
        let (refresh, recorded, _cancel) = refresh_loop(&config, Duration::ZERO, Some(2));

        let result = refresh.run().await;

        assert!(matches!(result, Err(DashboardError::Render(_))));
        assert_eq!(recorded.draws.load(Ordering::SeqCst), 2);
        assert_eq!(recorded.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_cancel_handle_stops_loop() {
        let config = config(Variant::CryptoTicker);
        let (refresh, recorded, cancel) = refresh_loop(&config, Duration::ZERO, None);
        drop(cancel);

        assert_eq!(refresh.run().await.unwrap(), 1);
        assert_eq!(recorded.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chart_variant_draws_panels() {
        let config = config(Variant::CryptoChart);
        let (refresh, recorded, cancel) = refresh_loop(&config, Duration::ZERO, None);

        let (result, _) = tokio::join!(refresh.run(), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            cancel.cancel();
        });

        assert_eq!(result.unwrap(), 1);
        let models = recorded.models.lock().unwrap();
        assert_eq!(models[0].rows.len(), config.symbols.len());
        assert_eq!(
            models[0].panels.len(),
            config.symbols.len() * config.timeframes.len()
        );
    }
}
