use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{spawn, JoinHandle},
};

use chrono::{Local, NaiveDate, NaiveDateTime};
use crossbeam_channel::{Receiver, Sender};
use tracing::{info, warn};

use crate::{
    catalog::{Catalog, FsCatalog},
    config::AuditConfig,
    error::AuditError,
    model::{CompanyResult, ReportModel},
    probe::{PdfProbe, PhraseProbe},
    verify::{AuditEvent, FolderVerifier},
};

/// Everything a batch needs, captured when the batch is created. Later edits
/// to the caller's configuration are not observed.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub root: PathBuf,
    pub config: AuditConfig,
    /// Local calendar date expiry is measured against.
    pub today: NaiveDate,
    pub generated_at: NaiveDateTime,
}

impl BatchRequest {
    pub fn new(root: &Path, config: &AuditConfig) -> BatchRequest {
        let now = Local::now();
        BatchRequest {
            root: root.into(),
            config: config.clone(),
            today: now.date_naive(),
            generated_at: now.naive_local(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    /// The root holds no company folders.
    NothingToDo,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Zero-based position of the company just finished.
    pub index: usize,
    pub total: usize,
    pub company: String,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        (self.index + 1) as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started { total: usize },
    Progress(Progress),
    Audit(AuditEvent),
    Finished(BatchStatus),
}

pub trait ProgressSink {
    fn emit(&self, event: BatchEvent);
}

impl ProgressSink for Sender<BatchEvent> {
    fn emit(&self, event: BatchEvent) {
        // a front-end that stopped listening doesn't stop the batch
        let _ = self.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn emit(&self, _: BatchEvent) {}
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    pub report: ReportModel,
}

/// Verifies every company folder under the request's root, one at a time,
/// in listing order.
///
/// Configuration and root problems fail the whole batch before anything is
/// scanned. A company whose folder can't be listed shows up as a
/// `ProcessingError` row instead. Cancellation is checked before each
/// company; results gathered so far are kept.
pub fn run_batch(
    request: &BatchRequest,
    catalog: &dyn Catalog,
    probe: &dyn PhraseProbe,
    cancel: &CancelToken,
    sink: &dyn ProgressSink,
) -> Result<BatchOutcome, AuditError> {
    request.config.validate()?;
    validate_root(&request.root)?;
    let companies = catalog
        .companies(&request.root)
        .map_err(|source| AuditError::RootUnreadable {
            path: request.root.clone(),
            source,
        })?;

    let total = companies.len();
    info!(
        root = %request.root.display(),
        mode = %request.config.mode,
        companies = total,
        "batch started"
    );
    sink.emit(BatchEvent::Started { total });

    let mut results: Vec<CompanyResult> = Vec::with_capacity(total);
    if total == 0 {
        info!(root = %request.root.display(), "no company folders found");
        sink.emit(BatchEvent::Finished(BatchStatus::NothingToDo));
        return Ok(outcome(request, BatchStatus::NothingToDo, results));
    }

    let verifier = FolderVerifier::new(&request.config, request.today, catalog, probe);
    for (index, folder) in companies.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(done = index, total, "batch cancelled");
            sink.emit(BatchEvent::Finished(BatchStatus::Cancelled));
            return Ok(outcome(request, BatchStatus::Cancelled, results));
        }
        let verification = verifier.verify(folder);
        results.push(verification.result);
        for event in verification.events {
            sink.emit(BatchEvent::Audit(event));
        }
        sink.emit(BatchEvent::Progress(Progress {
            index,
            total,
            company: folder.name.clone(),
        }));
    }

    info!(companies = total, "batch completed");
    sink.emit(BatchEvent::Finished(BatchStatus::Completed));
    Ok(outcome(request, BatchStatus::Completed, results))
}

fn validate_root(root: &Path) -> Result<(), AuditError> {
    if !root.exists() {
        return Err(AuditError::RootNotFound(root.into()));
    }
    if !root.is_dir() {
        return Err(AuditError::RootNotDirectory(root.into()));
    }
    Ok(())
}

fn outcome(
    request: &BatchRequest,
    status: BatchStatus,
    results: Vec<CompanyResult>,
) -> BatchOutcome {
    BatchOutcome {
        status,
        report: ReportModel::new(
            request.config.mode,
            request.config.expected_files.clone(),
            results,
            request.generated_at,
        ),
    }
}

/// A batch running on its own worker thread.
pub struct BatchHandle {
    events: Receiver<BatchEvent>,
    cancel: CancelToken,
    worker: JoinHandle<Result<BatchOutcome, AuditError>>,
}

impl BatchHandle {
    /// Events in emission order; the channel closes when the worker exits.
    pub fn events(&self) -> &Receiver<BatchEvent> {
        &self.events
    }
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
    pub fn join(self) -> Result<BatchOutcome, AuditError> {
        match self.worker.join() {
            Ok(result) => result,
            Err(_) => Err(AuditError::Worker),
        }
    }
}

pub fn spawn_batch(request: BatchRequest) -> BatchHandle {
    spawn_batch_with(request, Arc::new(FsCatalog), Arc::new(PdfProbe))
}

pub fn spawn_batch_with(
    request: BatchRequest,
    catalog: Arc<dyn Catalog>,
    probe: Arc<dyn PhraseProbe>,
) -> BatchHandle {
    let (sender, events) = crossbeam_channel::unbounded::<BatchEvent>();
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let worker = spawn(move || {
        run_batch(
            &request,
            catalog.as_ref(),
            probe.as_ref(),
            &token,
            &sender,
        )
    });
    BatchHandle {
        events,
        cancel,
        worker,
    }
}
