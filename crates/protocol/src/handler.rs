//! The scheme handler and its two calling conventions.
//!
//! [`OverlayProtocol::load_tile`] is the single implementation. Hosts that
//! want a completion callback go through [`OverlayProtocol::handle`], which
//! drives the same future on the ambient tokio runtime and always hands
//! back a [`Cancelable`].

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use overlay_common::{TileError, TileResult};
use renderer::{render_raster, Profile, TransformOptions};
use tracing::{debug, instrument};

use crate::loader::ImageLoader;
use crate::request::{strip_scheme, RequestParameters, TileResponse};

/// Completion callback, invoked exactly once per request whose load future
/// completes. If the load panics, the callback is dropped without being called.
pub type TileCallback = Box<dyn FnOnce(TileResult<TileResponse>) + Send + 'static>;

/// Future returned by the future-style convention.
pub type TileFuture = BoxFuture<'static, TileResult<TileResponse>>;

/// Cancellation handle returned by the callback convention.
///
/// Cancellation is not supported: [`Cancelable::cancel`] does nothing and the
/// callback still fires once the load completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cancelable {
    _private: (),
}

impl Cancelable {
    /// No-op.
    pub fn cancel(&self) {}
}

/// Result of dispatching a request.
pub enum HandlerOutcome {
    /// A callback was supplied; it will receive the result.
    Callback(Cancelable),
    /// No callback; await the future for the result.
    Pending(TileFuture),
}

impl HandlerOutcome {
    /// Drive `future` according to the convention `callback` selects.
    ///
    /// With a callback and no tokio runtime in scope the callback receives
    /// [`TileError::Runtime`] immediately.
    pub fn dispatch(future: TileFuture, callback: Option<TileCallback>) -> Self {
        let Some(callback) = callback else {
            return HandlerOutcome::Pending(future);
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move { callback(future.await) });
            }
            Err(e) => callback(Err(TileError::Runtime(e.to_string()))),
        }
        HandlerOutcome::Callback(Cancelable::default())
    }

    /// The pending future, if the future convention was selected.
    pub fn into_future(self) -> Option<TileFuture> {
        match self {
            HandlerOutcome::Pending(future) => Some(future),
            HandlerOutcome::Callback(_) => None,
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, HandlerOutcome::Callback(_))
    }
}

impl fmt::Debug for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerOutcome::Callback(c) => f.debug_tuple("Callback").field(c).finish(),
            HandlerOutcome::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Handler for one custom scheme: load, classify, encode.
pub struct OverlayProtocol {
    scheme: String,
    profile: Profile,
    options: TransformOptions,
    loader: Arc<dyn ImageLoader>,
}

impl OverlayProtocol {
    pub fn new(scheme: impl Into<String>, profile: Profile, loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            scheme: scheme.into(),
            profile,
            options: TransformOptions::default(),
            loader,
        }
    }

    /// Request a specific alpha for classified pixels.
    ///
    /// Only honored by profiles with a configurable alpha policy.
    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.options = TransformOptions::with_alpha(alpha);
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Alpha this handler paints classified pixels with.
    pub fn alpha(&self) -> u8 {
        self.profile.alpha.resolve(self.options.alpha)
    }

    /// Load the source tile behind `params.url` and render its overlay.
    #[instrument(skip(self, params), fields(scheme = %self.scheme, url = %params.url))]
    pub async fn load_tile(&self, params: &RequestParameters) -> TileResult<TileResponse> {
        let locator = strip_scheme(&params.url, &self.scheme);
        let raster = self.loader.load(locator).await?;
        debug!(
            width = raster.width(),
            height = raster.height(),
            "Loaded source raster"
        );

        let png = render_raster(raster, &self.profile, self.options)?;
        Ok(TileResponse::new(png))
    }

    /// Dual-convention entry point.
    ///
    /// With a callback, the result is delivered to it and a no-op
    /// [`Cancelable`] is returned. Without one, the returned future resolves
    /// to the result.
    pub fn handle(
        self: &Arc<Self>,
        params: RequestParameters,
        callback: Option<TileCallback>,
    ) -> HandlerOutcome {
        let this = Arc::clone(self);
        let future: TileFuture = Box::pin(async move { this.load_tile(&params).await });
        HandlerOutcome::dispatch(future, callback)
    }
}

impl fmt::Debug for OverlayProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayProtocol")
            .field("scheme", &self.scheme)
            .field("profile", &self.profile.name)
            .field("alpha", &self.alpha())
            .finish_non_exhaustive()
    }
}
