use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use effects::clock::FRAME_STEP;
use effects::{BoxedEffect, Dock, DockChange, EffectError, EffectKind, FrameContext, Point, PointerEvent, Viewport};
use tour::Tour;
use tracing::{error, info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::{time_source_for_policy, BoxedTimeSource, FrameScheduler, RenderPolicy, TimeSample};
use crate::types::{EffectOverrides, RendererConfig, SurfaceAlpha};

/// Upper bound on frames replayed to reach a still timestamp.
const MAX_STILL_FRAMES: u64 = 1_000_000;

/// Keyboard actions understood by the gallery window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    PreviousEffect,
    NextEffect,
    ToggleDock,
    SelectPrevious,
    SelectNext,
    Decrease,
    Increase,
    Activate,
    Reset,
    TourSkip,
    TourBack,
}

impl Command {
    /// Whether holding the key down should keep firing the command.
    fn repeats(self) -> bool {
        matches!(
            self,
            Command::Decrease | Command::Increase | Command::SelectPrevious | Command::SelectNext
        )
    }
}

pub(crate) fn command_for_key(key: &Key) -> Option<Command> {
    match key {
        Key::Named(NamedKey::Tab) => Some(Command::ToggleDock),
        Key::Named(NamedKey::ArrowUp) => Some(Command::SelectPrevious),
        Key::Named(NamedKey::ArrowDown) => Some(Command::SelectNext),
        Key::Named(NamedKey::ArrowLeft) => Some(Command::Decrease),
        Key::Named(NamedKey::ArrowRight) => Some(Command::Increase),
        Key::Named(NamedKey::Enter) | Key::Named(NamedKey::Space) => Some(Command::Activate),
        Key::Character(value) => match value.as_str() {
            "[" => Some(Command::PreviousEffect),
            "]" => Some(Command::NextEffect),
            " " => Some(Command::Activate),
            other if other.eq_ignore_ascii_case("r") => Some(Command::Reset),
            other if other.eq_ignore_ascii_case("n") => Some(Command::TourSkip),
            other if other.eq_ignore_ascii_case("b") => Some(Command::TourBack),
            _ => None,
        },
        _ => None,
    }
}

/// Turns raw cursor, button and touch input into gesture events.
#[derive(Debug, Default)]
pub(crate) struct PointerTracker {
    position: Option<Point>,
    pressed: bool,
}

impl PointerTracker {
    pub(crate) fn moved(&mut self, position: PhysicalPosition<f64>) -> Option<PointerEvent> {
        let point = Point::new(position.x as f32, position.y as f32);
        self.position = Some(point);
        self.pressed.then_some(PointerEvent::Drag(point))
    }

    pub(crate) fn button(&mut self, state: ElementState) -> Option<PointerEvent> {
        match state {
            ElementState::Pressed => {
                self.pressed = true;
                self.position.map(PointerEvent::Down)
            }
            ElementState::Released => {
                let was_pressed = std::mem::replace(&mut self.pressed, false);
                was_pressed.then_some(PointerEvent::Up)
            }
        }
    }

    pub(crate) fn touch(
        &mut self,
        phase: TouchPhase,
        location: PhysicalPosition<f64>,
    ) -> Option<PointerEvent> {
        match phase {
            TouchPhase::Started => {
                self.moved(location);
                self.button(ElementState::Pressed)
            }
            TouchPhase::Moved => self.moved(location),
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.position = Some(Point::new(location.x as f32, location.y as f32));
                self.button(ElementState::Released)
            }
        }
    }
}

/// Pairs the frame scheduler with the time source for the active policy.
pub(crate) struct RenderPolicyDriver {
    scheduler: FrameScheduler,
    time_source: BoxedTimeSource,
    /// Still frames advance the effect once; later redraws repaint that moment.
    hold_time: bool,
    advanced: bool,
}

impl RenderPolicyDriver {
    pub(crate) fn new(policy: &RenderPolicy) -> Self {
        Self {
            scheduler: FrameScheduler::new(policy),
            time_source: time_source_for_policy(policy),
            hold_time: matches!(policy, RenderPolicy::Still { .. }),
            advanced: false,
        }
    }

    /// Whether the next redraw should move the effect's clocks forward.
    pub(crate) fn should_advance(&mut self) -> bool {
        let first = !std::mem::replace(&mut self.advanced, true);
        first || !self.hold_time
    }

    pub(crate) fn sample(&mut self) -> TimeSample {
        self.time_source.sample()
    }

    pub(crate) fn mark_rendered(&mut self, now: Instant) {
        self.scheduler.mark_rendered(now);
    }

    pub(crate) fn ready_for_frame(&self, now: Instant) -> bool {
        self.scheduler.ready_for_frame(now)
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub(crate) fn request_frame(&mut self) {
        self.scheduler.request_frame();
    }

    pub(crate) fn reset(&mut self) {
        self.time_source.reset();
        self.scheduler.reset();
        self.advanced = false;
    }
}

/// Aggregates the effect, its GPU resources and the input state of the
/// gallery window.
pub(crate) struct WindowState {
    // declared before `window` so the surface is dropped first
    gpu: GpuState,
    window: Arc<Window>,
    effect: BoxedEffect,
    dock: Dock,
    pointer: PointerTracker,
    overrides: EffectOverrides,
    tour: Option<Tour>,
    policy: RenderPolicy,
    driver: RenderPolicyDriver,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: RendererConfig) -> Result<Self> {
        let RendererConfig {
            effect: initial,
            overrides,
            antialiasing,
            surface_alpha,
            policy,
            tour,
            ..
        } = config;

        let kind = tour.as_ref().map_or(initial, |tour| tour.current().kind);
        let mut effect = build_effect(kind, &overrides);
        prepare_still(effect.as_mut(), &policy, viewport_of(window.inner_size()));

        let gpu = GpuState::new(
            window.as_ref(),
            window.inner_size(),
            antialiasing,
            surface_alpha,
            effect.as_ref(),
        )?;

        let driver = RenderPolicyDriver::new(&policy);
        let state = Self {
            gpu,
            window,
            effect,
            dock: Dock::new(),
            pointer: PointerTracker::default(),
            overrides,
            tour,
            policy,
            driver,
        };
        info!(effect = %kind, "showing effect");
        state.update_title();
        Ok(state)
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
        self.driver.request_frame();
    }

    fn viewport(&self) -> Viewport {
        viewport_of(self.size())
    }

    pub(crate) fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let viewport = self.viewport();
        let frame = advance_for_redraw(self.effect.as_mut(), &mut self.driver, viewport);
        self.gpu.render(self.effect.as_ref(), &frame)
    }

    pub(crate) fn pointer(&mut self, event: Option<PointerEvent>) {
        if let Some(event) = event {
            let viewport = self.viewport();
            self.effect.pointer(event, viewport);
            self.driver.request_frame();
        }
    }

    pub(crate) fn handle_command(&mut self, command: Command) {
        let now = Instant::now();
        match command {
            Command::PreviousEffect => self.switch_to(self.effect.kind().previous()),
            Command::NextEffect => self.switch_to(self.effect.kind().next()),
            Command::ToggleDock => self.dock.toggle(),
            Command::SelectPrevious => self.dock.select_previous(&self.effect.controls()),
            Command::SelectNext => self.dock.select_next(&self.effect.controls()),
            Command::Decrease => {
                let result = self.dock.adjust(self.effect.as_mut(), -1);
                self.log_change(result);
            }
            Command::Increase => {
                let result = self.dock.adjust(self.effect.as_mut(), 1);
                self.log_change(result);
            }
            Command::Activate => {
                let result = self.dock.activate(self.effect.as_mut());
                self.log_change(result);
            }
            Command::Reset => {
                let kind = self.effect.kind();
                info!(effect = %kind, "reset effect to defaults");
                self.install(effects::create(kind));
            }
            Command::TourSkip => {
                if let Some(change) = self.tour.as_mut().and_then(|tour| tour.skip(now)) {
                    self.switch_to(change.item.kind);
                }
            }
            Command::TourBack => {
                if let Some(change) = self.tour.as_mut().and_then(|tour| tour.back(now)) {
                    self.switch_to(change.item.kind);
                }
            }
        }
        self.driver.request_frame();
        self.update_title();
    }

    /// Lets the tour advance on its own schedule.
    pub(crate) fn tick_tour(&mut self, now: Instant) {
        if let Some(change) = self.tour.as_mut().and_then(|tour| tour.tick(now)) {
            self.switch_to(change.item.kind);
            self.update_title();
        }
    }

    fn switch_to(&mut self, kind: EffectKind) {
        info!(effect = %kind, "showing effect");
        let effect = build_effect(kind, &self.overrides);
        self.install(effect);
    }

    fn install(&mut self, mut effect: BoxedEffect) {
        prepare_still(effect.as_mut(), &self.policy, self.viewport());
        self.gpu.set_effect(effect.as_ref());
        self.effect = effect;
        self.dock.reset();
        self.driver.reset();
    }

    fn log_change(&self, result: Result<Option<DockChange>, EffectError>) {
        match result {
            Ok(Some(change)) => info!(
                effect = %self.effect.kind(),
                control = change.id,
                value = %change.value,
                "control changed"
            ),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "control change rejected"),
        }
    }

    fn update_title(&self) {
        let controls = self.effect.controls();
        let mut title = format!(
            "{} | {}",
            self.effect.kind().title(),
            self.dock.summary(&controls)
        );
        if self.tour.is_some() {
            title.push_str(" | tour (N: next)");
        }
        self.window.set_title(&title);
    }
}

fn viewport_of(size: PhysicalSize<u32>) -> Viewport {
    Viewport::new(size.width.max(1) as f32, size.height.max(1) as f32)
}

/// Creates `kind` and applies its configured overrides; bad entries are
/// logged and skipped.
pub(crate) fn build_effect(kind: EffectKind, overrides: &EffectOverrides) -> BoxedEffect {
    let mut effect = effects::create(kind);
    for (key, value) in overrides.get(&kind).into_iter().flatten() {
        if let Err(err) = effect.apply_str(key, value) {
            warn!(effect = %kind, key = %key, value = %value, error = %err, "ignoring override");
        }
    }
    effect
}

/// Earliest instant the event loop must wake for: the next paced frame or
/// the tour's next automatic advance.
fn wake_deadline(frame: Option<Instant>, tour: Option<&Tour>, now: Instant) -> Option<Instant> {
    let advance = tour
        .filter(|tour| tour.len() > 1)
        .map(|tour| now + tour.remaining(now));
    match (frame, advance) {
        (Some(frame), Some(advance)) => Some(frame.min(advance)),
        (frame, advance) => frame.or(advance),
    }
}

/// Samples the policy clock and advances `effect` unless a still frame is
/// being repainted.
fn advance_for_redraw(
    effect: &mut dyn effects::Effect,
    driver: &mut RenderPolicyDriver,
    viewport: Viewport,
) -> FrameContext {
    let sample = driver.sample();
    let frame = FrameContext::new(sample.seconds, sample.frame_index, viewport);
    if driver.should_advance() {
        effect.advance(&frame);
    }
    frame
}

/// Replays step-clocked frames so a still policy shows the requested time.
fn prepare_still(effect: &mut dyn effects::Effect, policy: &RenderPolicy, viewport: Viewport) {
    let RenderPolicy::Still { time } = policy else {
        return;
    };
    if !time.is_finite() || *time <= 0.0 {
        return;
    }
    let frames = ((time / FRAME_STEP).round() as u64).min(MAX_STILL_FRAMES);
    for index in 0..frames.saturating_sub(1) {
        let seconds = index as f32 * FRAME_STEP;
        effect.advance(&FrameContext::new(seconds, index, viewport));
    }
}

/// Opens the gallery window and drives the `winit` event loop until it closes.
pub(crate) fn run(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("ShaderBits")
        .with_inner_size(window_size)
        .with_transparent(config.surface_alpha == SurfaceAlpha::Transparent)
        .build(&event_loop)
        .context("failed to create gallery window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, config)?;
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state != ElementState::Pressed {
                            return;
                        }
                        if let Some(command) = command_for_key(&event.logical_key) {
                            if !event.repeat || command.repeats() {
                                state.handle_command(command);
                            }
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let gesture = state.pointer.moved(position);
                        state.pointer(gesture);
                    }
                    WindowEvent::MouseInput {
                        state: button_state,
                        button: MouseButton::Left,
                        ..
                    } => {
                        let gesture = state.pointer.button(button_state);
                        state.pointer(gesture);
                    }
                    WindowEvent::Touch(touch) => {
                        let gesture = state.pointer.touch(touch.phase, touch.location);
                        state.pointer(gesture);
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size);
                    }
                    WindowEvent::ScaleFactorChanged {
                        mut inner_size_writer,
                        ..
                    } => {
                        let _ = inner_size_writer.request_inner_size(state.size());
                    }
                    WindowEvent::RedrawRequested => match state.render_frame() {
                        Ok(()) => state.driver.mark_rendered(Instant::now()),
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            let size = state.size();
                            state.resize(size);
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; exiting");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!(error = ?other, "surface error; retrying next frame");
                        }
                    },
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                state.tick_tour(now);
                if state.driver.ready_for_frame(now) {
                    state.window().request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) =
                    wake_deadline(state.driver.next_deadline(), state.tour.as_ref(), now)
                {
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn maps_gallery_keys() {
        assert_eq!(
            command_for_key(&Key::Character("[".into())),
            Some(Command::PreviousEffect)
        );
        assert_eq!(
            command_for_key(&Key::Character("]".into())),
            Some(Command::NextEffect)
        );
        assert_eq!(
            command_for_key(&Key::Named(NamedKey::Tab)),
            Some(Command::ToggleDock)
        );
        assert_eq!(
            command_for_key(&Key::Named(NamedKey::ArrowLeft)),
            Some(Command::Decrease)
        );
        assert_eq!(
            command_for_key(&Key::Named(NamedKey::Space)),
            Some(Command::Activate)
        );
        assert_eq!(
            command_for_key(&Key::Character("R".into())),
            Some(Command::Reset)
        );
        assert_eq!(
            command_for_key(&Key::Character("n".into())),
            Some(Command::TourSkip)
        );
        assert_eq!(command_for_key(&Key::Character("x".into())), None);
    }

    #[test]
    fn only_adjustments_repeat() {
        assert!(Command::Increase.repeats());
        assert!(!Command::NextEffect.repeats());
        assert!(!Command::Reset.repeats());
    }

    #[test]
    fn pointer_tracker_emits_gestures() {
        let mut tracker = PointerTracker::default();
        assert_eq!(tracker.moved(PhysicalPosition::new(10.0, 20.0)), None);
        assert_eq!(
            tracker.button(ElementState::Pressed),
            Some(PointerEvent::Down(Point::new(10.0, 20.0)))
        );
        assert_eq!(
            tracker.moved(PhysicalPosition::new(15.0, 25.0)),
            Some(PointerEvent::Drag(Point::new(15.0, 25.0)))
        );
        assert_eq!(tracker.button(ElementState::Released), Some(PointerEvent::Up));
        assert_eq!(tracker.button(ElementState::Released), None);
    }

    #[test]
    fn touch_maps_to_pointer_gestures() {
        let mut tracker = PointerTracker::default();
        let at = PhysicalPosition::new(3.0, 4.0);
        assert_eq!(
            tracker.touch(TouchPhase::Started, at),
            Some(PointerEvent::Down(Point::new(3.0, 4.0)))
        );
        assert!(matches!(
            tracker.touch(TouchPhase::Moved, at),
            Some(PointerEvent::Drag(_))
        ));
        assert_eq!(
            tracker.touch(TouchPhase::Cancelled, at),
            Some(PointerEvent::Up)
        );
    }

    #[test]
    fn overrides_are_applied_and_bad_ones_skipped() {
        let mut overrides = EffectOverrides::new();
        overrides.insert(
            EffectKind::Beams,
            vec![
                ("beam_number".to_string(), "6".to_string()),
                ("nonsense".to_string(), "1".to_string()),
            ],
        );
        let effect = build_effect(EffectKind::Beams, &overrides);
        let count = effect
            .controls()
            .into_iter()
            .find(|control| control.id == "beam_number")
            .map(|control| control.value)
            .unwrap();
        assert_eq!(count.as_float(), Some(6.0));
    }

    #[test]
    fn still_policy_replays_step_frames() {
        let mut effect = effects::create(EffectKind::Plasma);
        let viewport = Viewport::new(100.0, 100.0);
        prepare_still(effect.as_mut(), &RenderPolicy::Still { time: 1.6 }, viewport);
        let frame = FrameContext::new(1.6, 0, viewport);
        effect.advance(&frame);
        let payload = effect.uniforms(&frame);
        let time: f32 = bytemuck::pod_read_unaligned(&payload[..4]);
        assert!((time - 1.6).abs() < 1e-3, "time was {time}");
    }

    fn plasma_time(effect: &dyn effects::Effect, frame: &FrameContext) -> f32 {
        bytemuck::pod_read_unaligned(&effect.uniforms(frame)[..4])
    }

    #[test]
    fn still_redraws_after_input_keep_time() {
        let policy = RenderPolicy::Still { time: 1.6 };
        let viewport = Viewport::new(100.0, 100.0);
        let mut effect = effects::create(EffectKind::Plasma);
        let mut driver = RenderPolicyDriver::new(&policy);
        prepare_still(effect.as_mut(), &policy, viewport);

        let frame = advance_for_redraw(effect.as_mut(), &mut driver, viewport);
        let first = plasma_time(effect.as_ref(), &frame);
        assert!((first - 1.6).abs() < 1e-3, "time was {first}");

        for step in 0..30 {
            let point = Point::new(step as f32, 50.0);
            let event = if step == 0 {
                PointerEvent::Down(point)
            } else {
                PointerEvent::Drag(point)
            };
            effect.pointer(event, viewport);
            driver.request_frame();
            assert!(driver.ready_for_frame(Instant::now()));
            let frame = advance_for_redraw(effect.as_mut(), &mut driver, viewport);
            driver.mark_rendered(Instant::now());
            let time = plasma_time(effect.as_ref(), &frame);
            assert_eq!(time, first, "redraw {step} moved the clock");
        }
    }

    fn two_item_tour(now: Instant) -> Tour {
        let items = vec![
            tour::TourItem {
                kind: EffectKind::Plasma,
                duration: Duration::from_secs(10),
            },
            tour::TourItem {
                kind: EffectKind::Orb,
                duration: Duration::from_secs(5),
            },
        ];
        Tour::new(items, tour::TourMode::Continuous, 1, now).unwrap()
    }

    #[test]
    fn tour_wakes_the_loop_when_no_frame_is_pending() {
        let start = Instant::now();
        let tour = two_item_tour(start);
        let now = start + Duration::from_secs(4);
        assert_eq!(
            wake_deadline(None, Some(&tour), now),
            Some(start + Duration::from_secs(10))
        );

        let frame = now + Duration::from_millis(16);
        assert_eq!(wake_deadline(Some(frame), Some(&tour), now), Some(frame));
        assert_eq!(wake_deadline(None, None, now), None);

        let single = Tour::new(
            vec![tour::TourItem {
                kind: EffectKind::Aurora,
                duration: Duration::from_secs(1),
            }],
            tour::TourMode::Continuous,
            1,
            start,
        )
        .unwrap();
        assert_eq!(wake_deadline(None, Some(&single), now), None);
    }

    #[test]
    fn driver_reset_rearms_still_advance() {
        let mut driver = RenderPolicyDriver::new(&RenderPolicy::Still { time: 2.0 });
        assert!(driver.should_advance());
        assert!(!driver.should_advance());
        driver.reset();
        assert!(driver.should_advance());

        let mut animated = RenderPolicyDriver::new(&RenderPolicy::Animate { target_fps: None });
        assert!(animated.should_advance());
        assert!(animated.should_advance());
    }
}
