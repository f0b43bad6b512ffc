use egui::{Context, Event, PointerButton, Pos2, Rect, TouchId, TouchPhase};

/// Stroke commands for the sketch canvas, in canvas-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasInput {
    /// Pointer or first touch went down on the canvas
    Begin(Pos2),
    /// Pointer or tracked touch moved
    Extend(Pos2),
    /// Released, cancelled, or left the canvas
    End,
}

/// Turns raw egui events into [`CanvasInput`]s.
///
/// Mouse and touch share the same downstream commands. Only the first touch
/// drives a stroke, and pointer events are ignored while it is down so a
/// touch backend that also synthesizes pointer events never draws twice.
#[derive(Debug, Default)]
pub struct InputHandler {
    active_touch: Option<TouchId>,
    /// A pointer stroke is in progress
    pointer_down: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process this frame's input for a canvas occupying `canvas_rect`
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> Vec<CanvasInput> {
        let events = ctx.input(|input| input.events.clone());
        self.process_events(&events, canvas_rect)
    }

    pub fn process_events(&mut self, events: &[Event], canvas_rect: Rect) -> Vec<CanvasInput> {
        let mut out = Vec::new();
        let to_local = |pos: Pos2| (pos - canvas_rect.min).to_pos2();

        for event in events {
            match event {
                Event::Touch { id, phase, pos, .. } => match (self.active_touch, phase) {
                    (None, TouchPhase::Start) if canvas_rect.contains(*pos) => {
                        self.active_touch = Some(*id);
                        self.pointer_down = false;
                        out.push(CanvasInput::Begin(to_local(*pos)));
                    }
                    (Some(active), TouchPhase::Move) if active == *id => {
                        out.push(CanvasInput::Extend(to_local(*pos)));
                    }
                    (Some(active), TouchPhase::End | TouchPhase::Cancel) if active == *id => {
                        self.active_touch = None;
                        out.push(CanvasInput::End);
                    }
                    _ => {}
                },
                _ if self.active_touch.is_some() => {}
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed {
                        if canvas_rect.contains(*pos) {
                            self.pointer_down = true;
                            out.push(CanvasInput::Begin(to_local(*pos)));
                        }
                    } else if self.pointer_down {
                        self.pointer_down = false;
                        out.push(CanvasInput::End);
                    }
                }
                Event::PointerMoved(pos) => {
                    if canvas_rect.contains(*pos) {
                        out.push(CanvasInput::Extend(to_local(*pos)));
                    } else if self.pointer_down {
                        self.pointer_down = false;
                        out.push(CanvasInput::End);
                    }
                }
                Event::PointerGone => {
                    if self.pointer_down {
                        self.pointer_down = false;
                        out.push(CanvasInput::End);
                    }
                }
                _ => {}
            }
        }

        out
    }
}
