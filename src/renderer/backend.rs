use std::fmt;
use std::future::Future;

/// Native stand-in for "WebGPU first, WebGL otherwise".
pub const PREFERRED_BACKENDS: wgpu::Backends = wgpu::Backends::PRIMARY;
pub const FALLBACK_BACKENDS: wgpu::Backends = wgpu::Backends::GL;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Preferred,
    Fallback,
}

impl BackendKind {
    pub fn backends(self) -> wgpu::Backends {
        match self {
            Self::Preferred => PREFERRED_BACKENDS,
            Self::Fallback => FALLBACK_BACKENDS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Preferred => "preferred",
            Self::Fallback => "fallback",
        }
    }
}

/// Rendering path chosen once at startup.
pub enum Capability<T> {
    Preferred(T),
    Fallback(T),
}

impl<T> Capability<T> {
    /// `fallback` is built by the caller before `preferred` is polled. A
    /// failing preferred path is logged and the fallback is used instead; the
    /// preferred error is returned only when neither path is usable.
    pub async fn resolve<E, F>(fallback: Result<T, E>, preferred: F) -> Result<Self, E>
    where
        E: fmt::Display,
        F: Future<Output = Result<T, E>>,
    {
        if let Err(e) = &fallback {
            log::warn!("fallback renderer unavailable: {e}");
        }

        match preferred.await {
            Ok(value) => {
                log::info!("preferred renderer initialized");
                Ok(Self::Preferred(value))
            }
            Err(e) => {
                log::error!("preferred renderer initialization failed: {e}");
                match fallback {
                    Ok(value) => {
                        log::info!("falling back to {FALLBACK_BACKENDS:?} renderer");
                        Ok(Self::Fallback(value))
                    }
                    Err(_) => Err(e),
                }
            }
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Preferred(_) => BackendKind::Preferred,
            Self::Fallback(_) => BackendKind::Fallback,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Self::Preferred(value) | Self::Fallback(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Preferred(value) | Self::Fallback(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(
        fallback: Result<u32, String>,
        preferred: Result<u32, String>,
    ) -> Result<Capability<u32>, String> {
        pollster::block_on(Capability::resolve(fallback, async { preferred }))
    }

    #[test]
    fn preferred_wins_when_it_initializes() {
        let capability = resolve(Ok(1), Ok(2)).unwrap();
        assert_eq!(capability.kind(), BackendKind::Preferred);
        assert_eq!(*capability.get(), 2);
    }

    #[test]
    fn failing_preferred_falls_back() {
        let capability = resolve(Ok(1), Err("no adapter".into())).unwrap();
        assert_eq!(capability.kind(), BackendKind::Fallback);
        assert_eq!(capability.into_inner(), 1);
    }

    #[test]
    fn missing_fallback_does_not_block_preferred() {
        let capability = resolve(Err("no gl".into()), Ok(2)).unwrap();
        assert_eq!(capability.kind(), BackendKind::Preferred);
    }

    #[test]
    fn both_failing_reports_the_preferred_error() {
        let err = resolve(Err("no gl".into()), Err("no vulkan".into()))
            .err()
            .unwrap();
        assert_eq!(err, "no vulkan");
    }

    #[test]
    fn backend_sets_do_not_overlap() {
        assert!(!BackendKind::Preferred
            .backends()
            .intersects(BackendKind::Fallback.backends()));
    }
}
