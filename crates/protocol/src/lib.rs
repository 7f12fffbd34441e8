//! Protocol adapter for numeric flood-depth tiles.
//!
//! Bridges a custom URL scheme (`shinsui://tiles/5/10/12.png`) to the
//! overlay renderer:
//!
//! ```text
//! scheme://path
//!      │
//!      ▼
//! ProtocolRegistry::request(params, callback?)
//!      │
//!      ├─► strip "scheme://" ─► ImageLoader::load(path)
//!      │
//!      ├─► renderer::render_raster(profile)
//!      │
//!      └─► TileResponse { data, cache_control: None, expires: None }
//!               │
//!               ├─► callback(result)      (callback style)
//!               └─► future resolves       (future style)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use protocol::{HttpImageLoader, OverlayProtocol, ProtocolRegistry, RequestParameters};
//! use renderer::Profile;
//!
//! let registry = ProtocolRegistry::new();
//! let loader = Arc::new(HttpImageLoader::new(Default::default())?);
//! let handler = OverlayProtocol::new("shinsui", Profile::strict_transparency(), loader);
//! registry.add_protocol("shinsui", Arc::new(handler))?;
//!
//! let outcome = registry.request(RequestParameters::new("shinsui://tiles/5/10/12.png"), None);
//! let response = outcome.into_future().unwrap().await?;
//! ```

pub mod config;
pub mod handler;
pub mod loader;
pub mod registry;
pub mod request;

pub use config::{ProtocolConfig, ProtocolEntry};
pub use handler::{Cancelable, HandlerOutcome, OverlayProtocol, TileCallback, TileFuture};
pub use loader::{FileImageLoader, HttpImageLoader, HttpLoaderConfig, ImageLoader};
pub use registry::ProtocolRegistry;
pub use request::{scheme_of, strip_scheme, RequestParameters, TileResponse};
