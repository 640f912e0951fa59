//! The interception contract implemented by the double.

use {
    crate::body::Body,
    http::{Request, Response},
    std::sync::Arc,
};

/// A trait representing the capability of sending HTTP requests.
///
/// Code that depends on this trait, instead of a concrete HTTP client, can be
/// tested with `MockClient` without touching the network.
pub trait Transport {
    /// Sends a request and returns its response.
    fn send(&self, request: Request<Body>) -> crate::Result<Response<Body>>;
}

impl<T: ?Sized + Transport> Transport for &T {
    #[inline]
    fn send(&self, request: Request<Body>) -> crate::Result<Response<Body>> {
        (**self).send(request)
    }
}

impl<T: ?Sized + Transport> Transport for Box<T> {
    #[inline]
    fn send(&self, request: Request<Body>) -> crate::Result<Response<Body>> {
        (**self).send(request)
    }
}

impl<T: ?Sized + Transport> Transport for Arc<T> {
    #[inline]
    fn send(&self, request: Request<Body>) -> crate::Result<Response<Body>> {
        (**self).send(request)
    }
}

/// Creates a `Transport` from the specified closure.
pub fn transport_fn<F>(f: F) -> impl Transport
where
    F: Fn(Request<Body>) -> crate::Result<Response<Body>>,
{
    #[allow(missing_debug_implementations)]
    struct TransportFn<F>(F);

    impl<F> Transport for TransportFn<F>
    where
        F: Fn(Request<Body>) -> crate::Result<Response<Body>>,
    {
        #[inline]
        fn send(&self, request: Request<Body>) -> crate::Result<Response<Body>> {
            (self.0)(request)
        }
    }

    TransportFn(f)
}
