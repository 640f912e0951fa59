use {
    crate::{body::Body, error::Error, expectation::Respond},
    http::{header::CONTENT_LENGTH, Response},
};

/// Builds the outcome of a call answered by an expectation.
pub(crate) fn respond(template: Respond) -> crate::Result<Response<Body>> {
    if let Some(err) = template.error {
        return Err(Error::configured(err));
    }

    let content_length = template.content_length();
    let mut response = Response::builder().status(template.status);
    for (name, values) in &template.headers {
        for value in values {
            response = response.header(name.as_str(), value.as_str());
        }
    }
    if !template.headers.contains_key(CONTENT_LENGTH.as_str()) {
        response = response.header(CONTENT_LENGTH, content_length);
    }

    Ok(response.body(Body::sized(template.body))?)
}
