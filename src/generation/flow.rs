use futures::channel::oneshot;
use uuid::Uuid;

use super::backend::{GenerationBackend, PendingGeneration};
use super::request::{GeneratedImage, GenerationRequest};
use crate::canvas::SketchCanvas;
use crate::error::GenerationError;
use crate::util::time::{current_time_secs, elapsed_secs};

pub const IDLE_LABEL: &str = "Generate Image";
pub const SUBMITTING_LABEL: &str = "Generating...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    Submitting,
}

/// State of the control that starts a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateButton {
    pub enabled: bool,
    pub label: &'static str,
}

impl GenerateButton {
    fn idle() -> Self {
        Self {
            enabled: true,
            label: IDLE_LABEL,
        }
    }

    fn submitting() -> Self {
        Self {
            enabled: false,
            label: SUBMITTING_LABEL,
        }
    }
}

/// What the output slot currently shows
#[derive(Debug, Clone, Default)]
pub enum OutputImage {
    #[default]
    Empty,
    Generated(GeneratedImage),
    /// Shown in place of an image after any failure
    FailurePlaceholder,
}

/// How a request ended, as reported by [`GenerationFlow::poll`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    Succeeded,
    /// Carries the message now shown in the error slot
    Failed(String),
}

struct InFlight {
    id: Uuid,
    started: f64,
    pending: PendingGeneration,
}

/// Drives one request/response cycle at a time and owns the UI state it
/// touches: loader, trigger button, error slot and output slot.
///
/// Every settled request, success or failure, puts the loader and the button
/// back into their idle state.
pub struct GenerationFlow {
    in_flight: Option<InFlight>,
    loader_visible: bool,
    button: GenerateButton,
    error_message: Option<String>,
    output: OutputImage,
    /// Bumped whenever `output` is replaced
    output_version: u64,
}

impl Default for GenerationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationFlow {
    pub fn new() -> Self {
        Self {
            in_flight: None,
            loader_visible: false,
            button: GenerateButton::idle(),
            error_message: None,
            output: OutputImage::Empty,
            output_version: 0,
        }
    }

    /// Start a generation from the current canvas and prompt.
    ///
    /// Rejected with [`GenerationError::Busy`] while another request is in
    /// flight; nothing about the current request is touched in that case.
    /// Every other failure is reported through the flow's UI state instead.
    pub fn trigger(
        &mut self,
        backend: &dyn GenerationBackend,
        canvas: &SketchCanvas,
        prompt: &str,
    ) -> Result<(), GenerationError> {
        if self.is_busy() {
            log::warn!("Ignoring generate request while another one is in flight");
            return Err(GenerationError::Busy);
        }

        self.loader_visible = true;
        self.button = GenerateButton::submitting();
        self.error_message = None;

        let id = Uuid::new_v4();
        let image_data = match canvas.to_png_data_url() {
            Ok(image_data) => image_data,
            Err(err) => {
                self.settle(id, Err(err.into()));
                return Ok(());
            }
        };

        log::info!(
            "Submitting generation request {} ({} bytes of image data)",
            id,
            image_data.len()
        );
        let pending = backend.generate(GenerationRequest {
            prompt: prompt.to_owned(),
            image_data,
        });
        self.in_flight = Some(InFlight {
            id,
            started: current_time_secs(),
            pending,
        });
        Ok(())
    }

    /// Check the in-flight request without blocking and apply its outcome if it settled
    pub fn poll(&mut self) -> Option<Settled> {
        let result = match self.in_flight.as_mut()?.pending.try_recv() {
            Ok(None) => return None,
            Ok(Some(result)) => result,
            Err(oneshot::Canceled) => Err(GenerationError::Transport(
                "the request was dropped before it completed".to_owned(),
            )),
        };

        let in_flight = self.in_flight.take()?;
        log::debug!(
            "Request {} settled after {:.2}s",
            in_flight.id,
            elapsed_secs(in_flight.started)
        );
        Some(self.settle(in_flight.id, result))
    }

    fn settle(&mut self, id: Uuid, result: Result<GeneratedImage, GenerationError>) -> Settled {
        let settled = match result {
            Ok(image) => {
                log::info!(
                    "Request {} produced a {}x{} image",
                    id,
                    image.image.width(),
                    image.image.height()
                );
                self.output = OutputImage::Generated(image);
                Settled::Succeeded
            }
            Err(err) => {
                log::error!("Request {} failed: {}", id, err);
                let message = err.to_string();
                self.error_message = Some(message.clone());
                self.output = OutputImage::FailurePlaceholder;
                Settled::Failed(message)
            }
        };
        self.output_version += 1;

        self.loader_visible = false;
        self.button = GenerateButton::idle();
        settled
    }

    pub fn phase(&self) -> FlowPhase {
        if self.in_flight.is_some() {
            FlowPhase::Submitting
        } else {
            FlowPhase::Idle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn loader_visible(&self) -> bool {
        self.loader_visible
    }

    pub fn generate_button(&self) -> GenerateButton {
        self.button
    }

    /// `None` while the error slot is hidden
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn output(&self) -> &OutputImage {
        &self.output
    }

    pub fn output_version(&self) -> u64 {
        self.output_version
    }
}
