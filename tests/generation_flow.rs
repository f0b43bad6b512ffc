use std::cell::RefCell;

use egui::{Color32, ColorImage, Pos2};
use futures::channel::oneshot;
use sketch_gen::canvas::SketchCanvas;
use sketch_gen::error::{GenerationError, UNKNOWN_ERROR};
use sketch_gen::generation::{
    FlowPhase, GeneratedImage, GenerationBackend, GenerationFlow, GenerationRequest, IDLE_LABEL,
    OutputImage, PendingGeneration, SUBMITTING_LABEL, Settled, interpret_response,
};

type Sender = oneshot::Sender<Result<GeneratedImage, GenerationError>>;

/// Records requests and lets the test decide when and how each one settles
#[derive(Default)]
struct ScriptedBackend {
    requests: RefCell<Vec<GenerationRequest>>,
    senders: RefCell<Vec<Sender>>,
}

impl ScriptedBackend {
    fn respond(&self, result: Result<GeneratedImage, GenerationError>) {
        let sender = self.senders.borrow_mut().remove(0);
        sender.send(result).ok().unwrap();
    }

    /// Answer the oldest request the way the HTTP backend would for this response
    fn respond_http(&self, status: u16, body: &str) {
        let result = interpret_response(status, body.as_bytes()).map(|reference| GeneratedImage {
            reference,
            image: ColorImage::new([4, 4], Color32::RED),
        });
        self.respond(result);
    }

    fn drop_request(&self) {
        self.senders.borrow_mut().remove(0);
    }
}

impl GenerationBackend for ScriptedBackend {
    fn generate(&self, request: GenerationRequest) -> PendingGeneration {
        let (sender, receiver) = oneshot::channel();
        self.requests.borrow_mut().push(request);
        self.senders.borrow_mut().push(sender);
        receiver
    }
}

fn sketched_canvas() -> SketchCanvas {
    let mut canvas = SketchCanvas::with_size([32, 32]);
    canvas.begin_stroke(Pos2::new(4.0, 4.0));
    canvas.extend_stroke(Pos2::new(28.0, 28.0), 3.0);
    canvas.end_stroke();
    canvas
}

fn assert_idle(flow: &GenerationFlow) {
    assert_eq!(flow.phase(), FlowPhase::Idle);
    assert!(!flow.loader_visible());
    assert!(flow.generate_button().enabled);
    assert_eq!(flow.generate_button().label, IDLE_LABEL);
}

#[test]
fn test_initial_state_is_idle() {
    let flow = GenerationFlow::new();
    assert_idle(&flow);
    assert!(flow.error_message().is_none());
    assert!(matches!(flow.output(), OutputImage::Empty));
}

#[test]
fn test_trigger_enters_submitting() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();

    flow.trigger(&backend, &sketched_canvas(), "a castle").unwrap();

    assert_eq!(flow.phase(), FlowPhase::Submitting);
    assert!(flow.loader_visible());
    assert!(!flow.generate_button().enabled);
    assert_eq!(flow.generate_button().label, SUBMITTING_LABEL);
    assert!(flow.poll().is_none());

    let requests = backend.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt, "a castle");
    assert!(requests[0].image_data.starts_with("data:image/png;base64,"));
}

#[test]
fn test_success_updates_output_and_keeps_error_hidden() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();
    flow.trigger(&backend, &sketched_canvas(), "a castle").unwrap();

    backend.respond_http(200, r#"{"image_url": "https://example.com/out.png"}"#);

    assert_eq!(flow.poll(), Some(Settled::Succeeded));
    assert_idle(&flow);
    assert!(flow.error_message().is_none());
    match flow.output() {
        OutputImage::Generated(generated) => {
            assert_eq!(generated.reference, "https://example.com/out.png");
            assert_eq!(generated.image.size, [4, 4]);
        }
        other => panic!("expected a generated image, got {other:?}"),
    }
}

#[test]
fn test_server_error_message_is_shown_verbatim() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();
    flow.trigger(&backend, &sketched_canvas(), "").unwrap();

    backend.respond_http(400, r#"{"error": "bad prompt"}"#);

    assert_eq!(flow.poll(), Some(Settled::Failed("bad prompt".to_owned())));
    assert_idle(&flow);
    assert_eq!(flow.error_message(), Some("bad prompt"));
    assert!(matches!(flow.output(), OutputImage::FailurePlaceholder));
}

#[test]
fn test_error_without_message_falls_back() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();
    flow.trigger(&backend, &sketched_canvas(), "").unwrap();

    backend.respond_http(500, "{}");

    flow.poll();
    assert_eq!(flow.error_message(), Some(UNKNOWN_ERROR));
    assert_eq!(flow.error_message(), Some("Unknown error"));
    assert_idle(&flow);
}

#[test]
fn test_transport_fault_is_surfaced() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();
    flow.trigger(&backend, &sketched_canvas(), "").unwrap();

    backend.respond(Err(GenerationError::Transport("connection refused".to_owned())));

    assert_eq!(
        flow.poll(),
        Some(Settled::Failed("connection refused".to_owned()))
    );
    assert!(matches!(flow.output(), OutputImage::FailurePlaceholder));
    assert_idle(&flow);
}

#[test]
fn test_dropped_request_settles_as_failure() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();
    flow.trigger(&backend, &sketched_canvas(), "").unwrap();

    backend.drop_request();

    assert!(matches!(flow.poll(), Some(Settled::Failed(_))));
    assert!(flow.error_message().is_some());
    assert_idle(&flow);
}

#[test]
fn test_second_trigger_while_busy_is_rejected() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();
    let canvas = sketched_canvas();
    flow.trigger(&backend, &canvas, "first").unwrap();

    let err = flow.trigger(&backend, &canvas, "second").unwrap_err();
    assert!(matches!(err, GenerationError::Busy));
    assert_eq!(backend.requests.borrow().len(), 1);
    assert_eq!(flow.phase(), FlowPhase::Submitting);
    assert!(flow.error_message().is_none());

    backend.respond_http(200, r#"{"image_url": "data:image/png;base64,AA=="}"#);
    assert_eq!(flow.poll(), Some(Settled::Succeeded));

    // Once settled, a new request goes through
    flow.trigger(&backend, &canvas, "third").unwrap();
    assert_eq!(backend.requests.borrow().len(), 2);
}

#[test]
fn test_new_request_hides_previous_error() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();
    let canvas = sketched_canvas();

    flow.trigger(&backend, &canvas, "").unwrap();
    backend.respond_http(400, r#"{"error": "bad prompt"}"#);
    flow.poll();
    assert!(flow.error_message().is_some());

    flow.trigger(&backend, &canvas, "better").unwrap();
    assert!(flow.error_message().is_none());
    assert!(flow.loader_visible());
}

#[test]
fn test_unencodable_canvas_fails_without_request() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();

    flow.trigger(&backend, &SketchCanvas::new(), "").unwrap();

    assert!(backend.requests.borrow().is_empty());
    assert!(flow.error_message().is_some());
    assert!(matches!(flow.output(), OutputImage::FailurePlaceholder));
    assert_idle(&flow);
}

#[test]
fn test_each_settle_bumps_output_version() {
    let backend = ScriptedBackend::default();
    let mut flow = GenerationFlow::new();
    let canvas = sketched_canvas();
    assert_eq!(flow.output_version(), 0);

    flow.trigger(&backend, &canvas, "").unwrap();
    backend.respond_http(500, "{}");
    flow.poll();
    assert_eq!(flow.output_version(), 1);

    flow.trigger(&backend, &canvas, "").unwrap();
    backend.respond_http(200, r#"{"image_url": "https://example.com/a.png"}"#);
    flow.poll();
    assert_eq!(flow.output_version(), 2);
}
