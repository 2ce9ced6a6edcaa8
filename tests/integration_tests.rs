//! End-to-end tests through the bundled HTTP transport
//!
//! Exercises the full stack (request machinery + reqwest transport) against
//! a local mock server.

use fetchkit::{
    Error, FirstPageRequest, HttpTransport, Page, PreparedRequest, Request, RequestOptions,
    RequestQueue, Transport,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> Arc<dyn Transport> {
    Arc::new(HttpTransport::new())
}

async fn recv<T>(receiver: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(10), receiver.recv())
        .await
        .expect("timed out waiting for a completion")
        .expect("completion channel closed")
}

#[tokio::test]
async fn test_json_array_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "title": "first"},
            {"id": 2, "title": "second"}
        ])))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/videos", server.uri())).unwrap();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let request = Request::json_array(
        transport(),
        PreparedRequest::get(url),
        RequestOptions::new(),
        move |values, _meta, error| {
            let _ = sender.send((values, error.cloned()));
        },
    );
    request.resume();

    let (values, error) = recv(&mut receiver).await;
    assert!(error.is_none());
    let values = values.unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["title"], "first");
    assert!(!request.is_running());
}

#[tokio::test]
async fn test_http_error_and_disabled_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let completion_sender = sender.clone();
    let request = Request::data(
        transport(),
        PreparedRequest::get(url),
        RequestOptions::new(),
        move |data, meta, error| {
            let _ = completion_sender.send((
                data,
                meta.map(|meta| meta.status().as_u16()),
                error.cloned(),
            ));
        },
    );

    request.resume();
    let (data, status, error) = recv(&mut receiver).await;
    assert!(data.is_none());
    assert_eq!(status, Some(404));
    assert!(matches!(error, Some(Error::HttpStatus { status: 404 })));

    // Same endpoint with HTTP errors disabled: the status is only
    // observable through the metadata.
    let relaxed = request.with_options(RequestOptions::new().http_errors_disabled(true));
    relaxed.resume();
    let (data, status, error) = recv(&mut receiver).await;
    assert!(error.is_none());
    assert_eq!(status, Some(404));
    assert_eq!(data.unwrap().as_ref(), b"not found");
}

#[tokio::test]
async fn test_connection_failure_yields_friendly_transport_error() {
    // Nothing listens on this port.
    let url = Url::parse("http://127.0.0.1:9/unreachable").unwrap();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let request = Request::data(
        transport(),
        PreparedRequest::get(url),
        RequestOptions::new(),
        move |_data, _meta, error| {
            let _ = sender.send(error.cloned());
        },
    );
    request.resume();

    let error = recv(&mut receiver).await.expect("an error was expected");
    match error {
        Error::Transport { message, source, .. } => {
            assert!(source.is_some());
            assert!(!message.is_empty());
        }
        other => panic!("expected a transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pagination_chain_over_http() {
    let server = MockServer::start().await;

    // Three pages of size 3: the last one is short, ending the chain.
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([4, 5, 6])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([7])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("pageSize", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2, 3])))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/videos", server.uri())).unwrap();
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let first = FirstPageRequest::json_array(
        transport(),
        PreparedRequest::get(url),
        RequestOptions::new(),
        |request, size| request.clone().with_query_param("pageSize", &size.to_string()),
        |request, values, _meta, size, number| {
            if values.len() < size {
                None
            } else {
                Some(request.clone().with_query_param("page", &number.to_string()))
            }
        },
        move |values, page, next, _meta, error| {
            let _ = sender.send((
                values.map(|values| values.len()),
                page.number(),
                next.cloned(),
                error.cloned(),
            ));
        },
    )
    .with_page_size(3);

    first.resume();

    let mut counts = Vec::new();
    let mut numbers = Vec::new();
    let mut next_page: Option<Page>;
    loop {
        let (count, number, next, error) = recv(&mut receiver).await;
        assert!(error.is_none());
        counts.push(count.unwrap());
        numbers.push(number);
        next_page = next;
        match &next_page {
            Some(page) => first.with_page(Some(page)).resume(),
            None => break,
        }
    }

    assert_eq!(counts, vec![3, 3, 1]);
    assert_eq!(numbers, vec![0, 1, 2]);
    assert!(next_page.is_none());
}

#[tokio::test]
async fn test_queue_aggregates_related_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 2])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let events = Arc::new(Mutex::new(Vec::new()));
    let (finished_sender, mut finished_receiver) = mpsc::unbounded_channel();

    let queue_events = Arc::clone(&events);
    let queue = RequestQueue::with_state_change(move |finished, error| {
        queue_events.lock().unwrap().push(if finished {
            "finished".to_string()
        } else {
            "started".to_string()
        });
        if finished {
            let _ = finished_sender.send(error.cloned());
        }
    });

    let transport = transport();
    for endpoint in ["/shows", "/broken"] {
        let url = Url::parse(&format!("{}{endpoint}", server.uri())).unwrap();
        let completion_events = Arc::clone(&events);
        let reporting = queue.clone();
        let request = Request::json_array(
            Arc::clone(&transport),
            PreparedRequest::get(url),
            RequestOptions::new(),
            move |_values, _meta, error| {
                completion_events.lock().unwrap().push("completion".to_string());
                reporting.report_error(error.cloned());
            },
        );
        queue.add(&request, true);
    }

    let error = recv(&mut finished_receiver).await;
    assert!(matches!(error, Some(Error::HttpStatus { status: 500 })));
    assert!(!queue.is_running());

    // The finished notification is strictly ordered after every member
    // completion.
    assert_eq!(
        *events.lock().unwrap(),
        vec!["started", "completion", "completion", "finished"]
    );
}

#[tokio::test]
async fn test_cancelled_http_request_stays_silent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
    let completions = Arc::new(Mutex::new(0usize));

    let counted = Arc::clone(&completions);
    let request = Request::data(
        transport(),
        PreparedRequest::get(url),
        RequestOptions::new(),
        move |_data, _meta, _error| {
            *counted.lock().unwrap() += 1;
        },
    );

    request.resume();
    assert!(request.is_running());
    request.cancel();
    assert!(!request.is_running());

    // Give the aborted submission time to have fired, had it survived.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(*completions.lock().unwrap(), 0);
}
