//! The byte stream carried by intercepted requests and scripted responses.

use {
    bytes::Bytes,
    std::{
        fmt,
        io::{self, Read},
    },
};

/// A readable stream of bytes used as the body of requests and responses.
///
/// Bodies created from in-memory data know their length up front.
/// Bodies created with `Body::from_reader` are drained when the request is intercepted.
pub struct Body {
    inner: Inner,
}

enum Inner {
    Sized(io::Cursor<Bytes>),
    Reader(Box<dyn Read + Send + 'static>),
}

impl Body {
    /// Creates an empty body.
    pub fn empty() -> Self {
        Self::sized(Bytes::new())
    }

    /// Creates a body from in-memory data.
    pub fn sized(data: impl Into<Bytes>) -> Self {
        Self {
            inner: Inner::Sized(io::Cursor::new(data.into())),
        }
    }

    /// Creates a body whose content is pulled from the specified reader.
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            inner: Inner::Reader(Box::new(reader)),
        }
    }

    /// Returns the number of remaining bytes, if known.
    pub fn len(&self) -> Option<u64> {
        match &self.inner {
            Inner::Sized(cursor) => {
                Some((cursor.get_ref().len() as u64).saturating_sub(cursor.position()))
            }
            Inner::Reader(..) => None,
        }
    }

    /// Returns `true` if the body is known to have no remaining bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Consumes the body and collects its remaining content.
    pub fn concat(self) -> io::Result<Bytes> {
        match self.inner {
            Inner::Sized(cursor) => {
                let position = cursor.position() as usize;
                let data = cursor.into_inner();
                Ok(data.slice(position.min(data.len())..))
            }
            Inner::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(buf.into())
            }
        }
    }

    /// Consumes the body and collects its remaining content as an UTF-8 string.
    pub fn into_string(self) -> io::Result<String> {
        let data = self.concat()?;
        String::from_utf8(data.to_vec()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Sized(cursor) => f
                .debug_struct("Body")
                .field("len", &cursor.get_ref().len())
                .field("position", &cursor.position())
                .finish(),
            Inner::Reader(..) => f.debug_struct("Body").field("reader", &"..").finish(),
        }
    }
}

impl Read for Body {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Sized(cursor) => cursor.read(buf),
            Inner::Reader(reader) => reader.read(buf),
        }
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

macro_rules! impl_from_for_sized_data {
    ($($t:ty,)*) => {$(
        impl From<$t> for Body {
            fn from(data: $t) -> Self {
                Self::sized(data)
            }
        }
    )*};
}

impl_from_for_sized_data! {
    &'static [u8],
    &'static str,
    String,
    Vec<u8>,
    Bytes,
}
