//! Owned subscription handles

/// Handle to a live subscription. Dropping it unsubscribes; the callback is not
/// invoked again afterwards.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    /// `unsubscribe` runs exactly once, when the handle is dropped.
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A handle with nothing to release, for subscriptions that never started.
    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }

    /// Keep the subscription alive for as long as its source lives.
    pub fn detach(mut self) {
        self.unsubscribe.take();
    }

    #[inline]
    pub fn unsubscribe(self) {
        drop(self)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
