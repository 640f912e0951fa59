use http::header::{AsHeaderName, CONTENT_LENGTH};

/// A set of extension methods of [`Response`] used within test cases.
///
/// [`Response`]: https://docs.rs/http/1/http/struct.Response.html
pub trait ResponseExt {
    /// Returns the value of the header field as a string.
    ///
    /// It returns `None` if the header is missing or is not valid UTF-8.
    fn header_str<K: AsHeaderName>(&self, name: K) -> Option<&str>;

    /// Returns the value of the `content-length` header.
    fn content_length(&self) -> Option<u64>;
}

impl<T> ResponseExt for http::Response<T> {
    fn header_str<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers().get(name)?.to_str().ok()
    }

    fn content_length(&self) -> Option<u64> {
        self.header_str(CONTENT_LENGTH)?.trim().parse().ok()
    }
}
