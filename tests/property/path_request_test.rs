// tests/property/path_request_test.rs

//! Properties of path parsing and sub-request derivation.

use docrelay::core::routing::{
    ComponentRegistry, ComponentRequestHandler, PathRequest, RequestHandler, RequestHeaders,
};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 %._~-]{1,12}"
}

fn url_from(segments: &[String], query: &Option<String>) -> String {
    let encoded: Vec<String> = segments
        .iter()
        .map(|s| urlencoding::encode(s).into_owned())
        .collect();
    let mut url = format!("/{}", encoded.join("/"));
    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }
    url
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_split_path_recovers_encoded_segments(
        segments in prop::collection::vec(segment(), 0..8),
        query in prop::option::of("[a-z]{1,5}=[a-z0-9/]{0,8}"),
    ) {
        let request = PathRequest::new(&url_from(&segments, &query), RequestHeaders::default());
        prop_assert_eq!(request.path_parts(), segments.as_slice());
        prop_assert_eq!(request.query(), query.as_deref());
    }

    #[test]
    fn test_repeated_slashes_do_not_create_segments(
        segments in prop::collection::vec("[a-z0-9]{1,6}", 0..6),
        slashes in prop::collection::vec(1usize..4, 0..6),
    ) {
        let mut url = String::new();
        for (i, segment) in segments.iter().enumerate() {
            url.push_str(&"/".repeat(slashes.get(i).copied().unwrap_or(1)));
            url.push_str(segment);
        }
        url.push('/');
        prop_assert_eq!(PathRequest::split_path(&url), segments);
    }

    #[test]
    fn test_sub_requests_compose(
        segments in prop::collection::vec(segment(), 0..8),
        query in prop::option::of("[a-z]{1,5}=[0-9]{1,3}"),
        a in 0usize..6,
        b in 0usize..6,
    ) {
        let request = PathRequest::new(&url_from(&segments, &query), RequestHeaders::with_wait(false));

        let stepwise = request.create_sub_request(a).create_sub_request(b);
        let direct = request.create_sub_request(a + b);
        prop_assert_eq!(&stepwise, &direct);

        let expected: Vec<String> = segments.iter().skip(a + b).cloned().collect();
        prop_assert_eq!(direct.path_parts(), expected.as_slice());
        prop_assert_eq!(direct.query(), query.as_deref());
        prop_assert_eq!(direct.wait(), Some(false));
    }

    #[test]
    fn test_component_handler_declines_empty_paths(slashes in "/{0,6}") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let answer = rt.block_on(async {
            let registry = ComponentRegistry::new();
            let request = PathRequest::new(&slashes, RequestHeaders::default());
            ComponentRequestHandler.handle(&request, &registry).await
        });
        prop_assert!(matches!(answer, Ok(None)));
    }
}
