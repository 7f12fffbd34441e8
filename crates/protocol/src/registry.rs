//! Scheme registry shared by the host.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future;
use overlay_common::{TileError, TileResult};
use tracing::info;

use crate::handler::{HandlerOutcome, OverlayProtocol, TileCallback};
use crate::request::{scheme_of, RequestParameters};

/// Maps scheme names to their handlers.
///
/// Written at startup, read on every request. Safe to share across tasks.
#[derive(Debug, Default)]
pub struct ProtocolRegistry {
    handlers: RwLock<HashMap<String, Arc<OverlayProtocol>>>,
}

impl ProtocolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `scheme`.
    ///
    /// The handler strips its own scheme from incoming URLs, so both names
    /// must agree.
    pub fn add_protocol(
        &self,
        scheme: impl Into<String>,
        handler: Arc<OverlayProtocol>,
    ) -> TileResult<()> {
        let scheme = scheme.into();
        validate_scheme(&scheme)?;
        if handler.scheme() != scheme {
            return Err(TileError::config(format!(
                "handler for '{}' registered under '{}'",
                handler.scheme(),
                scheme
            )));
        }

        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        if handlers.contains_key(&scheme) {
            return Err(TileError::AlreadyRegistered(scheme));
        }

        info!(
            scheme = %scheme,
            profile = %handler.profile().name,
            alpha = handler.alpha(),
            "Registered protocol"
        );
        handlers.insert(scheme, handler);
        Ok(())
    }

    /// Unregister a scheme, returning its handler if it was present.
    pub fn remove_protocol(&self, scheme: &str) -> Option<Arc<OverlayProtocol>> {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(scheme)
    }

    pub fn get(&self, scheme: &str) -> Option<Arc<OverlayProtocol>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(scheme)
            .cloned()
    }

    /// Handler responsible for `url`, selected by its `<scheme>://` prefix.
    pub fn handler_for(&self, url: &str) -> TileResult<Arc<OverlayProtocol>> {
        let scheme = scheme_of(url).ok_or_else(|| TileError::UnknownScheme(url.to_string()))?;
        self.get(scheme)
            .ok_or_else(|| TileError::UnknownScheme(scheme.to_string()))
    }

    /// Dispatch a request to the handler for its scheme.
    ///
    /// An unknown scheme is reported through the selected convention like
    /// any other failure.
    pub fn request(
        &self,
        params: RequestParameters,
        callback: Option<TileCallback>,
    ) -> HandlerOutcome {
        match self.handler_for(&params.url) {
            Ok(handler) => handler.handle(params, callback),
            Err(e) => HandlerOutcome::dispatch(Box::pin(future::ready(Err(e))), callback),
        }
    }

    /// Registered scheme names, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        schemes.sort();
        schemes
    }

    pub fn len(&self) -> usize {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scheme names follow URL syntax: a letter, then letters, digits, `+`, `-`, `.`.
pub(crate) fn validate_scheme(scheme: &str) -> TileResult<()> {
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(TileError::config(format!("invalid scheme name: '{}'", scheme)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_scheme() {
        assert!(validate_scheme("shinsui").is_ok());
        assert!(validate_scheme("numpng").is_ok());
        assert!(validate_scheme("x-tile.v2+png").is_ok());
        assert!(validate_scheme("").is_err());
        assert!(validate_scheme("2png").is_err());
        assert!(validate_scheme("bad scheme").is_err());
        assert!(validate_scheme("a:b").is_err());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProtocolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.schemes().is_empty());
        assert_eq!(
            registry.handler_for("shinsui://tiles/1/2/3.png").unwrap_err(),
            TileError::UnknownScheme("shinsui".to_string())
        );
        assert!(matches!(
            registry.handler_for("tiles/1/2/3.png"),
            Err(TileError::UnknownScheme(_))
        ));
    }
}
