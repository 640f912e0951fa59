use {
    http::{Method, Request, StatusCode},
    httpdouble::{
        Body, ErrorKind, Expectation, Failure, MatchOrder, MockClient, Recorder, ResponseExt,
        Transport,
    },
    serde::Serialize,
    std::io,
};

#[test]
fn version_sync() {
    version_sync::assert_html_root_url_updated!("src/lib.rs");
}

fn recorded() -> (MockClient, Recorder) {
    let recorder = Recorder::new();
    (MockClient::with_reporter(recorder.clone()), recorder)
}

fn get(client: &MockClient, uri: &str) -> httpdouble::Result<http::Response<Body>> {
    client.send(Request::get(uri).body(Body::empty())?)
}

#[test]
fn default_expectation_answers_200_with_empty_body() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let id = client.register(Expectation::new(Method::GET, "/path"));

    let response = get(&client, "https://fake.url/path")?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_length(), Some(0));
    assert!(response.into_body().concat()?.is_empty());
    assert_eq!(client.times_called(id), Some(1));

    client.verify();
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn unregistered_route_is_reported() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();

    let err = get(&client, "/bad").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedRequest);
    assert_eq!(
        recorder.failures(),
        vec![Failure::UnexpectedRequest {
            method: Method::GET,
            path: "/bad".into(),
            exhausted: 0,
        }]
    );
    Ok(())
}

#[test]
fn body_headers_and_query_params() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let client = client
        .expect(
            Expectation::new(Method::POST, "/first")
                .expect_header("Authorization", ["Bearer TOKEN"])
                .expect_body("foobar")
                .expect_query_param("param1", "value1")
                .return_status(200)
                .return_body("hello world"),
        )
        .expect(
            Expectation::new(Method::POST, "/second")
                .return_error(io::Error::new(io::ErrorKind::Other, "oops")),
        );

    let response = client.send(
        Request::post("/first?param1=value1")
            .header("Authorization", "Bearer TOKEN")
            .body(Body::from("foobar"))?,
    )?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_length(), Some(11));
    assert_eq!(response.into_body().into_string()?, "hello world");
    assert!(!recorder.failed());

    let err = client
        .send(Request::post("/second").body(Body::empty())?)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configured);
    assert_eq!(err.to_string(), "oops");
    assert!(!recorder.failed());

    let err = client
        .send(Request::options("/toomuch").body(Body::empty())?)
        .unwrap_err();
    assert!(err.is_unexpected_request());
    assert!(recorder.failed());

    let expectations = client.expectations();
    assert_eq!(expectations.len(), 2);
    assert!(expectations.iter().all(|e| e.times_called() == 1));
    Ok(())
}

#[test]
fn json_body_query_values_and_return_headers() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let client = client
        .expect(
            Expectation::new(Method::POST, "/first")
                .expect_header("Authorization", ["Bearer TOKEN"])
                .expect_json(r#"{"foo": "bar"}"#)
                .expect_query_param("param1", "value1")
                .return_status(204)
                .return_body("hello world")
                .return_header("Content-Type", ["application/json"])
                .return_header("Content-Length", ["1024"]),
        )
        .expect(
            Expectation::new(Method::PUT, "/second")
                .expect_query_param_values("param", ["value1", "value2"]),
        );

    let response = client.send(
        Request::post("/first?param1=value1")
            .header("Authorization", "Bearer TOKEN")
            .body(Body::from(r#"{"foo":"bar"}"#))?,
    )?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.header_str("content-type"), Some("application/json"));
    assert_eq!(response.content_length(), Some(1024));

    let response = client.send(
        Request::put("/second?param=value1&param=value2").body(Body::empty())?,
    )?;
    assert_eq!(response.status(), StatusCode::OK);

    client.verify();
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn mismatch_reports_the_closest_expectation() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let client = client.expect(
        Expectation::new(Method::POST, "/path")
            .expect_query_param("query", "param")
            .expect_header("hello", ["world"])
            .expect_header("bonjour", ["monde"])
            .expect_json(r#"{"hello":"world"}"#),
    );

    let err = client
        .send(Request::post("https://fake.url/path").body(Body::from(r#"{"a": "b"}"#))?)
        .unwrap_err();
    assert!(err.is_unexpected_request());

    let failures = recorder.failures();
    assert_eq!(failures.len(), 1);
    match &failures[0] {
        Failure::ClosestMatchMismatch {
            method,
            path,
            closest,
            received,
        } => {
            assert_eq!(*method, Method::POST);
            assert_eq!(path, "/path");
            assert!(closest.contains("\t- bonjour: [\"monde\"]"));
            assert!(closest.contains("\t- hello: [\"world\"]"));
            assert!(closest.contains("\t- query: contains \"param\""));
            assert!(closest.contains("Expected JSON:"));
            assert!(received.contains("{\\\"a\\\": \\\"b\\\"}"));
        }
        failure => panic!("unexpected failure: {:?}", failure),
    }
    assert!(failures[0].to_string().contains("the closest request I have is"));

    client.verify();
    assert_eq!(recorder.failures().len(), 2);
    assert_eq!(recorder.failures()[1].outstanding(), Some(1));
    Ok(())
}

#[test]
fn exact_body_match() -> httpdouble::Result<()> {
    for (body, matches) in &[("foobar", true), ("foo", false), ("foobar ", false)] {
        let (client, recorder) = recorded();
        let client = client.expect(Expectation::new(Method::POST, "/").expect_body("foobar"));

        let result = client.send(Request::post("/").body(Body::from(*body))?);
        assert_eq!(result.is_ok(), *matches, "body = {:?}", body);
        assert_eq!(recorder.failed(), !*matches, "body = {:?}", body);
    }
    Ok(())
}

#[test]
fn json_match_ignores_key_order_and_whitespace() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let client = client.expect(
        Expectation::new(Method::POST, "/path")
            .expect_json(r#"{"c": "d", "a": "b"}"#)
            .times(2),
    );

    client.send(Request::post("/path").body(Body::from(r#"{"a": "b", "c": "d"}"#))?)?;
    client.send(Request::post("/path").body(Body::from("{\n\"a\":\"b\",\n\"c\":\"d\"\n}"))?)?;

    client.verify();
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn repeat_times() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let id = client.register(Expectation::new(Method::GET, "/path").times(3));

    for _ in 0..2 {
        get(&client, "/path")?;
    }
    client.verify();
    assert_eq!(
        recorder.failures(),
        vec![Failure::MissingCalls {
            method: Method::GET,
            path: "/path".into(),
            expected: 3,
            observed: 2,
        }]
    );
    assert!(recorder.failures()[0].to_string().contains("(1 outstanding)"));

    recorder.clear();
    get(&client, "/path")?;
    assert_eq!(client.times_called(id), Some(3));
    client.verify();
    assert!(!recorder.failed());

    let err = get(&client, "/path").unwrap_err();
    assert!(err.is_unexpected_request());
    assert_eq!(
        recorder.failures(),
        vec![Failure::UnexpectedRequest {
            method: Method::GET,
            path: "/path".into(),
            exhausted: 1,
        }]
    );
    assert_eq!(client.times_called(id), Some(3));
    Ok(())
}

#[test]
fn missing_calls_on_every_unmet_expectation() {
    let (client, recorder) = recorded();
    let client = client
        .expect(Expectation::new(Method::GET, "/path"))
        .expect(Expectation::new(Method::POST, "/test"));

    client.verify();
    let failures = recorder.failures();
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|f| f.outstanding() == Some(1)));
}

#[test]
fn configured_error_is_returned_on_every_matching_call() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let id = client.register(
        Expectation::new(Method::POST, "/path")
            .return_status(200)
            .return_error(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"))
            .times(2),
    );

    for _ in 0..2 {
        let err = client
            .send(Request::post("/path").body(Body::empty())?)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configured);
        let source = err.configured_error().expect("configured error");
        assert_eq!(
            source.downcast_ref::<io::Error>().map(io::Error::kind),
            Some(io::ErrorKind::ConnectionReset)
        );
    }
    assert_eq!(client.times_called(id), Some(2));
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn later_expectation_can_be_consumed_first() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let client = client
        .expect(Expectation::new(Method::GET, "/first"))
        .expect(Expectation::new(Method::GET, "/second"));

    get(&client, "/second")?;
    get(&client, "/first")?;
    client.verify();
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn on_configures_the_registered_expectation() -> httpdouble::Result<()> {
    #[derive(Serialize)]
    struct Greeting {
        hello: &'static str,
    }

    let (client, recorder) = recorded();
    let expectation = client
        .on(Method::POST, "/path")
        .expect_json(r#"{"c": "d", "a": "b"}"#)
        .return_status(201)
        .return_body_from_object(&Greeting { hello: "world" })?;
    let id = expectation.id();
    assert_eq!(expectation.times_called(), 0);

    let registered = client.expectation(id).expect("registered");
    assert_eq!(registered.return_status_code(), 201);
    assert_eq!(registered.returned_body(), r#"{"hello":"world"}"#);

    let response = client.send(Request::post("/path").body(Body::from(r#"{"a": "b", "c": "d"}"#))?)?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.into_body().into_string()?, r#"{"hello":"world"}"#);
    assert_eq!(client.times_called(id), Some(1));

    client.verify();
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn called_expectation_cannot_be_reconfigured() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let expectation = client.on(Method::GET, "/r");
    let id = expectation.id();

    get(&client, "/r")?;
    let expectation = expectation.times(3).expect_header("x-late", ["1"]);
    assert_eq!(expectation.times_called(), 1);

    let registered = client.expectation(id).expect("registered");
    assert_eq!(registered.expected_times_called(), 1);
    assert!(registered.expected_headers().is_empty());

    let err = get(&client, "/r").unwrap_err();
    assert!(err.is_unexpected_request());
    assert_eq!(client.times_called(id), Some(1));
    assert_eq!(recorder.failures().len(), 1);
    Ok(())
}

#[test]
fn json_numbers_match_across_integer_and_float_forms() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let client = client.expect(Expectation::new(Method::POST, "/observations").expect_json(r#"{"temperature": 12}"#));

    client.send(Request::post("/observations").body(Body::from(r#"{"temperature":12.0}"#))?)?;
    client.verify();
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn percent_encoded_path_matches_decoded_expectation() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let client = client.expect(Expectation::new(Method::GET, "/café"));

    get(&client, "https://fake.url/caf%C3%A9")?;
    client.verify();
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn streamed_request_body_is_consumed() -> httpdouble::Result<()> {
    let (client, recorder) = recorded();
    let client = client.expect(Expectation::new(Method::POST, "/upload").expect_body("chunked payload"));

    let body = Body::from_reader(io::Cursor::new(b"chunked payload".to_vec()));
    client.send(Request::post("/upload").body(body)?)?;
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn unreadable_request_body_is_returned_as_error() -> httpdouble::Result<()> {
    struct Broken;

    impl io::Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken"))
        }
    }

    let (client, recorder) = recorded();
    let id = client.register(Expectation::new(Method::POST, "/upload"));

    let err = client
        .send(Request::post("/upload").body(Body::from_reader(Broken))?)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Body);
    assert_eq!(client.times_called(id), Some(0));
    assert!(!recorder.failed());
    Ok(())
}

#[test]
fn sequential_order() -> httpdouble::Result<()> {
    let recorder = Recorder::new();
    let client = MockClient::builder()
        .reporter(recorder.clone())
        .match_order(MatchOrder::Sequential)
        .build()
        .expect(Expectation::new(Method::GET, "/first"))
        .expect(Expectation::new(Method::GET, "/second"));

    let err = get(&client, "/second").unwrap_err();
    assert!(err.is_unexpected_request());
    match &recorder.failures()[..] {
        [Failure::OutOfOrder { path, next, .. }] => {
            assert_eq!(path, "/second");
            assert!(next.starts_with("Request: [GET] \"/first\""));
        }
        failures => panic!("unexpected failures: {:?}", failures),
    }

    recorder.clear();
    get(&client, "/first")?;
    get(&client, "/second")?;
    client.verify();
    assert!(!recorder.failed());
    Ok(())
}

#[test]
#[should_panic(expected = "Unexpected request on route [DELETE] \"/nope\"")]
fn fail_fast_aborts_the_test() {
    let client = MockClient::builder()
        .reporter(Recorder::new())
        .fail_fast(true)
        .build();
    let request = Request::delete("/nope").body(Body::empty()).expect("valid request");
    let _ = client.send(request);
}

#[test]
fn verify_on_drop() {
    let recorder = Recorder::new();
    {
        let client = MockClient::builder()
            .reporter(recorder.clone())
            .verify_on_drop(true)
            .build()
            .expect(Expectation::new(Method::GET, "/never"));
        let _clone = client.clone();
    }
    assert_eq!(recorder.failures().len(), 1);
    assert_eq!(recorder.failures()[0].outstanding(), Some(1));
}

#[test]
#[should_panic(expected = "httpdouble recorded 1 failure(s)")]
fn default_reporter_fails_the_test_when_dropped() {
    let client = MockClient::new().expect(Expectation::new(Method::GET, "/path"));
    client.verify();
}

#[test]
fn default_reporter_is_silent_when_everything_matched() -> httpdouble::Result<()> {
    let client = MockClient::new().expect(Expectation::new(Method::GET, "/path"));
    get(&client, "/path")?;
    client.verify();
    Ok(())
}
