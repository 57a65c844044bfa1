//! The synchronous observer bus (component F, signal emission).
//!
//! Every signal fires synchronously from inside
//! [`crate::Loader::update_and_process_all`]: there is no queue, no thread
//! hop, and no re-entrancy guard beyond the loader's own pending-request
//! side-buffer. Per the decided ordering (emission order is part of the
//! observable contract, not an implementation detail): a request's typed
//! `<kind>_loaded` signal fires first, then `load_status_changed`, and only
//! then is the request considered finished.

use crate::builders::{Mat4, Vec3};
use crate::gl::GlName;
use crate::request::{RequestId, ResourceStatus};
use crate::Locator;

/// One observed event a [`SignalBus`] subscriber can react to.
///
/// Variant names mirror the typed `<kind>_loaded` signals every pending
/// request kind fires exactly once on a successful transition into
/// `Loaded`, plus the generic [`LoadEvent::StatusChanged`] every request
/// fires on every terminal transition.
#[derive(Debug, Clone)]
pub enum LoadEvent<'a> {
    /// Fires for every request on every status transition, after any
    /// kind-specific signal for the same transition.
    StatusChanged { request_id: RequestId, status: ResourceStatus },

    /// Fires once, only on a transition into `Loaded`, before the matching
    /// `StatusChanged` event for the same request.
    PlainTextLoaded { request_id: RequestId, text: &'a str },
    /// Fires once per line, in order, before the list-level
    /// [`LoadEvent::StringListLoaded`] and the request's `StatusChanged`.
    StringLineLoaded { request_id: RequestId, line: &'a str },
    StringListLoaded { request_id: RequestId, lines: &'a [String] },
    UrlListLoaded { request_id: RequestId, urls: &'a [Locator] },
    FloatVectorLoaded { request_id: RequestId, values: &'a [f64] },
    Vec3VectorLoaded { request_id: RequestId, values: &'a [Vec3] },
    SmoothVec3CurveLoaded { request_id: RequestId, values: &'a [Vec3] },
    Mat4VectorLoaded { request_id: RequestId, values: &'a [Mat4] },
    ValueTreeLoaded { request_id: RequestId, value: &'a serde_json::Value },
    MappedStructLoaded { request_id: RequestId, value: &'a serde_json::Value },
    GlslSourceLoaded { request_id: RequestId, text: &'a str },
    GlShaderIncludeLoaded { request_id: RequestId, text: &'a str },
    GlShaderLoaded { request_id: RequestId, shader: GlName },
    GlProgramLoaded { request_id: RequestId, program: GlName },
    GlTextureLoaded { request_id: RequestId, texture: GlName },
    GlTextureImagesLoaded { request_id: RequestId },
    GlBufferLoaded { request_id: RequestId, buffer: GlName },
    /// These three have no builder in this crate (see `pending::materialize`'s
    /// documented gap) so they carry the provider's raw bytes rather than a
    /// parsed artifact.
    ShapeGeneratorLoaded { request_id: RequestId, bytes: &'a [u8] },
    GlShapeLoaded { request_id: RequestId, bytes: &'a [u8] },
    GlGeometryAndBindingsLoaded { request_id: RequestId, bytes: &'a [u8] },
}

type Slot = Box<dyn FnMut(&LoadEvent<'_>)>;

/// A minimal synchronous pub/sub bus. Subscribers are plain closures kept in
/// registration order; there is no unsubscribe beyond dropping the whole bus,
/// matching the facade's own lifetime (subscriptions don't outlive one
/// `Loader`).
#[derive(Default)]
pub struct SignalBus {
    subscribers: Vec<Slot>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&LoadEvent<'_>) + 'static) {
        self.subscribers.push(Box::new(handler));
    }

    pub fn emit(&mut self, event: LoadEvent<'_>) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribers_observe_events_in_emission_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = SignalBus::new();

        let log_clone = Rc::clone(&log);
        bus.subscribe(move |event| {
            let label = match event {
                LoadEvent::StatusChanged { status, .. } => format!("status:{status:?}"),
                LoadEvent::PlainTextLoaded { text, .. } => format!("text:{text}"),
                LoadEvent::StringLineLoaded { line, .. } => format!("line:{line}"),
                _ => "other".to_string(),
            };
            log_clone.borrow_mut().push(label);
        });

        let mut arena: slotmap::SlotMap<RequestId, ()> = slotmap::SlotMap::with_key();
        let id = arena.insert(());

        bus.emit(LoadEvent::StatusChanged { request_id: id, status: ResourceStatus::Loaded });
        bus.emit(LoadEvent::PlainTextLoaded { request_id: id, text: "hi" });

        assert_eq!(
            *log.borrow(),
            vec!["status:Loaded".to_string(), "text:hi".to_string()]
        );
    }

    #[test]
    fn bus_with_no_subscribers_drops_events_silently() {
        let mut bus = SignalBus::new();
        assert!(bus.is_empty());
        let mut arena: slotmap::SlotMap<RequestId, ()> = slotmap::SlotMap::with_key();
        let id = arena.insert(());
        bus.emit(LoadEvent::StatusChanged { request_id: id, status: ResourceStatus::Loading });
    }

    #[test]
    fn typed_gl_events_carry_the_produced_name() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = SignalBus::new();
        let log_clone = Rc::clone(&log);
        bus.subscribe(move |event| {
            if let LoadEvent::GlProgramLoaded { program, .. } = event {
                log_clone.borrow_mut().push(*program);
            }
        });

        let mut arena: slotmap::SlotMap<RequestId, ()> = slotmap::SlotMap::with_key();
        let id = arena.insert(());
        bus.emit(LoadEvent::GlProgramLoaded { request_id: id, program: GlName(7) });

        assert_eq!(*log.borrow(), vec![GlName(7)]);
    }
}
