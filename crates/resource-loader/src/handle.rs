use crate::gl::{GlContext, GlName, GlObjectKind};

/// A move-only wrapper around a [`GlName`] that enforces linear-resource
/// discipline: the handle must be explicitly released through
/// [`OwnedGlName::release`], and a [`Drop`] without release logs a warning
/// instead of silently leaking, mirroring the teacher's
/// `HandleUntyped`/`Drop`-notifies-registry pattern adapted to GPU handles
/// instead of asset refcounts.
#[derive(Debug)]
pub struct OwnedGlName {
    name: Option<GlName>,
    kind: GlObjectKind,
}

impl OwnedGlName {
    pub fn new(name: GlName, kind: GlObjectKind) -> Self {
        Self {
            name: Some(name),
            kind,
        }
    }

    pub fn name(&self) -> GlName {
        self.name.expect("use after release")
    }

    pub fn kind(&self) -> GlObjectKind {
        self.kind
    }

    /// Explicitly destroys the underlying GL object through `ctx`, taking
    /// ownership out of `self` so the `Drop` impl becomes a no-op.
    pub fn release(mut self, ctx: &dyn GlContext) {
        if let Some(name) = self.name.take() {
            ctx.delete(self.kind, name);
        }
    }

    /// Relinquishes ownership without destroying the GL object — used when
    /// a successful `mark_loaded` moves ownership into the caller's typed
    /// resource wrapper.
    pub fn into_name(mut self) -> GlName {
        self.name.take().expect("use after release")
    }
}

impl Drop for OwnedGlName {
    fn drop(&mut self) {
        if let Some(name) = self.name.take() {
            log::warn!(
                "{:?} handle {:?} dropped without explicit release; leaking GL object",
                self.kind,
                name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::test_support::FakeGlContext;

    #[test]
    fn release_destroys_and_suppresses_leak_warning() {
        let ctx = FakeGlContext::default();
        let name = ctx.create(GlObjectKind::Texture);
        let owned = OwnedGlName::new(name, GlObjectKind::Texture);
        owned.release(&ctx);
        assert_eq!(ctx.deleted_count(), 1);
    }

    #[test]
    fn into_name_transfers_ownership_without_deleting() {
        let ctx = FakeGlContext::default();
        let name = ctx.create(GlObjectKind::Buffer);
        let owned = OwnedGlName::new(name, GlObjectKind::Buffer);
        let raw = owned.into_name();
        assert_eq!(raw, name);
        assert_eq!(ctx.deleted_count(), 0);
    }
}
