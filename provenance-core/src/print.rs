//! Print Dispatcher
//!
//! The only side-effecting part of the engine. A `Printer` opens an
//! independent surface, the dispatcher writes the document into it, waits
//! for referenced images to load and then triggers the print action.
//! A surface that cannot be opened ends in a user-visible notice, never
//! in an error returned to the caller.

use async_trait::async_trait;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Print surface blocked: {0}")]
    SurfaceBlocked(String),

    #[error("Print surface I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Print action failed: {0}")]
    Action(String),
}

/// One open display surface
#[async_trait]
pub trait PrintSurface: Send {
    fn set_title(&mut self, title: &str);

    /// Replace the whole content of the surface
    fn write(&mut self, markup: &str) -> Result<(), PrintError>;

    async fn print(&mut self) -> Result<(), PrintError>;

    /// Where the surface lives, if it has an address
    fn location(&self) -> Option<String> {
        None
    }
}

/// Port to the host environment
#[async_trait]
pub trait Printer: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PrintSurface>, PrintError>;
}

/// User-facing channel for print notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PrintOutcome {
    #[serde(rename_all = "camelCase")]
    Printed {
        job_id: Uuid,
        title: String,
        location: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Aborted { job_id: Uuid, notice: String },
}

impl PrintOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, Self::Printed { .. })
    }
}

#[derive(Clone)]
pub struct PrintDispatcher {
    printer: Arc<dyn Printer>,
    notifier: Arc<dyn Notifier>,
    delay: Duration,
}

impl PrintDispatcher {
    /// Time given to the surface to load images before printing
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    pub fn new(printer: Arc<dyn Printer>, notifier: Arc<dyn Notifier>) -> Self {
        Self { printer, notifier, delay: Self::DEFAULT_DELAY }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// open -> title -> write -> wait -> print
    pub async fn dispatch(&self, markup: &str, title: &str) -> PrintOutcome {
        let job_id = Uuid::new_v4();
        match self.run(markup, title).await {
            Ok(location) => {
                tracing::info!(%job_id, title, location = ?location, "document sent to print");
                PrintOutcome::Printed { job_id, title: title.to_string(), location }
            }
            Err(e) => {
                tracing::warn!(%job_id, title, error = %e, "print aborted");
                let notice = blocked_notice(title, &e);
                self.notifier.notify(&notice);
                PrintOutcome::Aborted { job_id, notice }
            }
        }
    }

    /// Fire-and-forget form of `dispatch`. Each call opens its own surface;
    /// there is no queueing between calls and no way to cancel.
    ///
    /// Outside a tokio runtime nothing is printed and the notifier is told.
    pub fn print_document(&self, markup: String, title: String) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let dispatcher = self.clone();
                handle.spawn(async move {
                    dispatcher.dispatch(&markup, &title).await;
                });
            }
            Err(e) => {
                let error = PrintError::SurfaceBlocked(format!("no async runtime: {}", e));
                tracing::warn!(title = %title, error = %error, "print not started");
                self.notifier.notify(&blocked_notice(&title, &error));
            }
        }
    }

    async fn run(&self, markup: &str, title: &str) -> Result<Option<String>, PrintError> {
        let mut surface = self.printer.open().await?;
        surface.set_title(title);
        surface.write(markup)?;
        tokio::time::sleep(self.delay).await;
        surface.print().await?;
        Ok(surface.location())
    }
}

fn blocked_notice(title: &str, error: &PrintError) -> String {
    match error {
        PrintError::SurfaceBlocked(_) => format!(
            "No se pudo abrir la ventana de impresión para «{}». Revise los permisos e inténtelo de nuevo.",
            title
        ),
        other => format!("No se pudo imprimir «{}»: {}", title, other),
    }
}

// --- Host implementations ---

/// Surfaces are standalone `.html` files in an output directory. Printing
/// hands the file to the system browser, whose print dialog does the rest.
#[derive(Debug, Clone)]
pub struct HtmlFilePrinter {
    out_dir: PathBuf,
    open_in_browser: bool,
}

impl HtmlFilePrinter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into(), open_in_browser: false }
    }

    pub fn open_in_browser(mut self, open: bool) -> Self {
        self.open_in_browser = open;
        self
    }
}

#[async_trait]
impl Printer for HtmlFilePrinter {
    async fn open(&self) -> Result<Box<dyn PrintSurface>, PrintError> {
        tokio::fs::create_dir_all(&self.out_dir).await.map_err(|e| {
            PrintError::SurfaceBlocked(format!("{}: {}", self.out_dir.display(), e))
        })?;
        Ok(Box::new(HtmlFileSurface {
            id: Uuid::new_v4(),
            out_dir: self.out_dir.clone(),
            title: String::new(),
            path: None,
            open_in_browser: self.open_in_browser,
        }))
    }
}

struct HtmlFileSurface {
    id: Uuid,
    out_dir: PathBuf,
    title: String,
    path: Option<PathBuf>,
    open_in_browser: bool,
}

#[async_trait]
impl PrintSurface for HtmlFileSurface {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    // One small file per document; a plain blocking write.
    fn write(&mut self, markup: &str) -> Result<(), PrintError> {
        let short_id = self.id.simple().to_string();
        let filename = format!("{}-{}.html", slugify(&self.title), &short_id[..8]);
        let path = self.out_dir.join(filename);
        fs::write(&path, markup)?;
        self.path = Some(path);
        Ok(())
    }

    async fn print(&mut self) -> Result<(), PrintError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| PrintError::Action("nothing written to surface".to_string()))?;
        if self.open_in_browser {
            webbrowser::open(&path.to_string_lossy()).map_err(|e| PrintError::Action(e.to_string()))?;
        }
        Ok(())
    }

    fn location(&self) -> Option<String> {
        self.path.as_ref().map(|p| p.display().to_string())
    }
}

/// Notices are logged and echoed to stderr, where a terminal user sees them
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: &str) {
        tracing::warn!(notice, "print notice");
        eprintln!("{}", notice);
    }
}

/// `Certificado - Marea Baja` -> `certificado-marea-baja`
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "documento".to_string()
    } else {
        slug.to_string()
    }
}
