mod backend;
mod flow;
mod request;

pub use backend::{GenerationBackend, HttpBackend, PendingGeneration};
pub use flow::{
    FlowPhase, GenerateButton, GenerationFlow, OutputImage, Settled, IDLE_LABEL, SUBMITTING_LABEL,
};
pub use request::{
    GeneratedImage, GenerationRequest, GenerationResponse, decode_embedded, decode_image,
    interpret_response,
};
