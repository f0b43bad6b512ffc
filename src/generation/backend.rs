use std::future::Future;

use egui::ColorImage;
use futures::channel::oneshot;

use super::request::{
    GeneratedImage, GenerationRequest, decode_embedded, decode_image, interpret_response,
};
use crate::data_url::is_data_url;
use crate::error::GenerationError;

/// Receives the outcome of one request/response exchange
pub type PendingGeneration = oneshot::Receiver<Result<GeneratedImage, GenerationError>>;

/// Something that can turn a sketch and a prompt into an image.
///
/// `generate` must not block: it starts the exchange and hands back a
/// receiver that the UI polls once per frame.
pub trait GenerationBackend {
    fn generate(&self, request: GenerationRequest) -> PendingGeneration;
}

/// Talks to the generation endpoint over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
    /// Woken when a request settles so the result shows without user input
    repaint: Option<egui::Context>,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            repaint: None,
        }
    }

    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }
}

impl GenerationBackend for HttpBackend {
    fn generate(&self, request: GenerationRequest) -> PendingGeneration {
        let (sender, receiver) = oneshot::channel();
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let repaint = self.repaint.clone();

        spawn(async move {
            let result = exchange(&client, &endpoint, &request).await;
            if sender.send(result).is_err() {
                log::debug!("Generation result arrived after the flow was dropped");
            }
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });

        receiver
    }
}

fn transport(err: reqwest::Error) -> GenerationError {
    GenerationError::Transport(err.to_string())
}

async fn exchange(
    client: &reqwest::Client,
    endpoint: &str,
    request: &GenerationRequest,
) -> Result<GeneratedImage, GenerationError> {
    let response = client
        .post(endpoint)
        .json(request)
        .send()
        .await
        .map_err(transport)?;
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(transport)?;

    let reference = interpret_response(status, &body)?;
    let image = resolve_image(client, &reference).await?;
    Ok(GeneratedImage { reference, image })
}

/// Embedded references decode in place, anything else is fetched first
async fn resolve_image(
    client: &reqwest::Client,
    reference: &str,
) -> Result<ColorImage, GenerationError> {
    if is_data_url(reference) {
        return decode_embedded(reference);
    }

    let response = client.get(reference).send().await.map_err(transport)?;
    if !response.status().is_success() {
        return Err(GenerationError::Transport(format!(
            "failed to fetch generated image: HTTP {}",
            response.status()
        )));
    }
    let bytes = response.bytes().await.map_err(transport)?;
    decode_image(&bytes)
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn<F>(future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let spawned = std::thread::Builder::new()
        .name("generation-request".to_owned())
        .spawn(move || {
            match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(future),
                Err(err) => log::error!("Failed to start request runtime: {}", err),
            }
        });
    if let Err(err) = spawned {
        log::error!("Failed to spawn request thread: {}", err);
    }
}

#[cfg(target_arch = "wasm32")]
fn spawn<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}
