//! Chart Controller
//! Owns what the window shows and runs fetches off the UI thread.

use crate::api::{ChartDataResponse, ChartDataSource, ChartRequest, FetchError};
use crate::data::{export_filename, series_to_csv, validate_inputs, Aggregation, ExportError};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// How long the download success notice stays up.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Which action a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    Chart,
    Download,
}

impl FetchPurpose {
    fn index(self) -> usize {
        match self {
            FetchPurpose::Chart => 0,
            FetchPurpose::Download => 1,
        }
    }

    /// Message shown when the server fails without saying why.
    fn fallback_message(self) -> &'static str {
        match self {
            FetchPurpose::Chart => "Failed to load chart data",
            FetchPurpose::Download => "Failed to load data",
        }
    }
}

/// Summary shown under the controls after a chart loads.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInfo {
    pub data_points: usize,
    pub company_name: String,
    pub aggregation: Aggregation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

/// Visibility of every region of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub loading: bool,
    pub csv_loading: bool,
    pub placeholder_visible: bool,
    pub chart_visible: bool,
    pub error: Option<String>,
    pub info: Option<ChartInfo>,
    pub notice: Option<Notice>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            loading: false,
            csv_loading: false,
            placeholder_visible: true,
            chart_visible: false,
            error: None,
            info: None,
            notice: None,
        }
    }
}

impl ViewState {
    fn show_error(&mut self, message: String) {
        self.error = Some(message);
        self.placeholder_visible = true;
        self.chart_visible = false;
        self.info = None;
    }
}

/// CSV text ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvDownload {
    pub filename: String,
    pub content: String,
    pub data_points: usize,
}

/// Things the window has to act on after a poll.
#[derive(Debug)]
pub enum ControllerEvent {
    ChartReady,
    CsvReady(CsvDownload),
}

struct FetchOutcome {
    purpose: FetchPurpose,
    generation: u64,
    result: Result<ChartDataResponse, FetchError>,
}

pub struct ChartController {
    source: Arc<dyn ChartDataSource>,
    pub view: ViewState,
    chart: Option<ChartDataResponse>,
    next_generation: u64,
    /// Latest generation issued per purpose; older outcomes are dropped.
    latest: [u64; 2],
    in_flight: usize,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
}

impl ChartController {
    pub fn new(source: Arc<dyn ChartDataSource>) -> Self {
        let (tx, rx) = channel();
        Self {
            source,
            view: ViewState::default(),
            chart: None,
            next_generation: 0,
            latest: [0; 2],
            in_flight: 0,
            tx,
            rx,
        }
    }

    /// Chart currently on screen.
    pub fn chart(&self) -> Option<&ChartDataResponse> {
        self.chart.as_ref().filter(|_| self.view.chart_visible)
    }

    /// True while any fetch is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Validate the form and request a chart.
    pub fn generate(&mut self, company_id: &str, start: &str, end: &str) {
        let request = match validate_inputs(company_id, start, end) {
            Ok(request) => request,
            Err(e) => {
                self.reject(FetchPurpose::Chart, e.to_string());
                return;
            }
        };

        self.view.loading = true;
        self.view.placeholder_visible = false;
        self.view.chart_visible = false;
        self.view.error = None;
        self.view.info = None;

        self.dispatch(FetchPurpose::Chart, request);
    }

    /// Validate the form and request data for CSV export.
    pub fn download(&mut self, company_id: &str, start: &str, end: &str) {
        let request = match validate_inputs(company_id, start, end) {
            Ok(request) => request,
            Err(e) => {
                self.reject(FetchPurpose::Download, e.to_string());
                return;
            }
        };

        self.view.csv_loading = true;
        self.view.placeholder_visible = false;
        self.view.error = None;

        self.dispatch(FetchPurpose::Download, request);
    }

    /// Fail an action before it reaches the network. Any fetch still
    /// running for the same action is superseded.
    fn reject(&mut self, purpose: FetchPurpose, message: String) {
        self.next_generation += 1;
        self.latest[purpose.index()] = self.next_generation;
        match purpose {
            FetchPurpose::Chart => self.view.loading = false,
            FetchPurpose::Download => self.view.csv_loading = false,
        }
        self.view.show_error(message);
    }

    fn dispatch(&mut self, purpose: FetchPurpose, request: ChartRequest) {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.latest[purpose.index()] = generation;
        self.in_flight += 1;

        debug!(?purpose, generation, aggregation = %request.aggregation, "Dispatching fetch");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = source.fetch_chart_data(&request);
            let _ = tx.send(FetchOutcome {
                purpose,
                generation,
                result,
            });
        });
    }

    /// Apply finished fetches and expire the notice.
    pub fn poll(&mut self, now: Instant) -> Vec<ControllerEvent> {
        self.expire_notice(now);

        let mut events = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            events.extend(self.apply(outcome));
        }
        events
    }

    fn apply(&mut self, outcome: FetchOutcome) -> Option<ControllerEvent> {
        self.in_flight = self.in_flight.saturating_sub(1);

        let FetchOutcome {
            purpose,
            generation,
            result,
        } = outcome;

        if generation != self.latest[purpose.index()] {
            debug!(?purpose, generation, "Dropping superseded response");
            return None;
        }

        match purpose {
            FetchPurpose::Chart => self.view.loading = false,
            FetchPurpose::Download => self.view.csv_loading = false,
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!(?purpose, "Fetch failed: {}", e);
                self.view.show_error(e.user_message(purpose.fallback_message()));
                return None;
            }
        };

        match purpose {
            FetchPurpose::Chart => {
                info!(
                    "Chart loaded successfully with {} data points ({} aggregation)",
                    response.data_points, response.aggregation
                );
                self.view.chart_visible = true;
                self.view.info = Some(ChartInfo {
                    data_points: response.data_points,
                    company_name: response.company_name.clone(),
                    aggregation: response.aggregation,
                });
                self.chart = Some(response);
                Some(ControllerEvent::ChartReady)
            }
            FetchPurpose::Download => match series_to_csv(&response.chart_data) {
                Ok(content) => Some(ControllerEvent::CsvReady(CsvDownload {
                    filename: export_filename(
                        &response.company_name,
                        response.aggregation,
                        &response.start_date,
                        &response.end_date,
                    ),
                    content,
                    data_points: response.data_points,
                })),
                Err(e) => {
                    self.download_failed(e);
                    None
                }
            },
        }
    }

    /// The CSV was written to disk.
    pub fn download_saved(&mut self, data_points: usize, now: Instant) {
        info!("CSV downloaded successfully with {} data points", data_points);
        self.view.placeholder_visible = false;
        self.view.notice = Some(Notice {
            message: format!("CSV downloaded successfully: {} data points", data_points),
            expires_at: now + NOTICE_DURATION,
        });
    }

    /// The user dismissed the save dialog.
    pub fn download_cancelled(&mut self) {
        info!("CSV export cancelled");
        if !self.view.chart_visible {
            self.view.placeholder_visible = true;
        }
    }

    pub fn download_failed(&mut self, err: ExportError) {
        error!("CSV export failed: {}", err);
        self.view.show_error(err.to_string());
    }

    /// Time until the notice should disappear.
    pub fn notice_remaining(&self, now: Instant) -> Option<Duration> {
        self.view
            .notice
            .as_ref()
            .map(|n| n.expires_at.saturating_duration_since(now))
    }

    fn expire_notice(&mut self, now: Instant) {
        let expired = matches!(&self.view.notice, Some(n) if now >= n.expires_at);
        if expired {
            self.view.notice = None;
            if !self.view.chart_visible {
                self.view.placeholder_visible = true;
            }
        }
    }

    /// Block until every outstanding fetch has been applied.
    #[cfg(test)]
    fn settle(&mut self) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        while self.in_flight > 0 {
            let outcome = self.rx.recv().expect("fetch thread dropped its sender");
            events.extend(self.apply(outcome));
        }
        events
    }
}
