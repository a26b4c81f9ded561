//! Error handling integration tests.

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use scs_client::{ClientConfig, ErrorKind, Metadata, Scs, ScsError};

    use crate::{
        MALFORMED_KEY, MockScs, STALL_KEY, client_config, create_test_bucket, impatient_client,
        scs_client, test_bucket_name,
    };

    #[tokio::test]
    async fn test_should_return_no_such_key_on_get() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "nokey").await;

        let err = scs
            .bucket(&name)
            .get("nonexistent.txt", None)
            .await
            .expect_err("missing key");

        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(err.to_string(), "NoSuchKey");
        let service = err.service_error().expect("service error");
        assert_eq!(service.status_code, 404);
        assert!(!service.request_id.is_empty());
        assert!(!service.date.is_empty());
    }

    #[tokio::test]
    async fn test_should_return_no_such_bucket_on_put() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);

        let err = scs
            .bucket(&test_bucket_name("ghost"))
            .put("file.txt", &Metadata::new(), Cursor::new(b"data".to_vec()))
            .await
            .expect_err("missing bucket");

        assert!(err.service_error().is_some_and(|e| e.is("NoSuchBucket")));
    }

    #[tokio::test]
    async fn test_should_reject_wrong_secret() {
        let server = MockScs::start().await;
        let config = ClientConfig {
            secret_key: "not-the-secret".to_owned(),
            ..client_config(&server)
        };
        let scs = Scs::new(&config).expect("client");

        let err = scs.list_buckets().await.expect_err("bad signature");
        let service = err.service_error().expect("service error");
        assert_eq!(service.status_code, 403);
        assert!(service.is("SignatureDoesNotMatch"));
    }

    #[tokio::test]
    async fn test_should_surface_malformed_error_response() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "malformed").await;

        let err = scs
            .bucket(&name)
            .head(MALFORMED_KEY)
            .await
            .expect_err("malformed response");

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(matches!(
            err,
            ScsError::MalformedErrorResponse {
                status: 503,
                header: "x-requestid"
            }
        ));
    }

    #[tokio::test]
    async fn test_should_time_out_waiting_for_headers() {
        let server = MockScs::start().await;
        let scs = impatient_client(&server);
        let name = create_test_bucket(&scs, "stall").await;

        let bucket = scs.bucket(&name);
        let err = tokio::time::timeout(Duration::from_secs(10), bucket.get(STALL_KEY, None))
            .await
            .expect("header timeout should fire before the outer bound")
            .expect_err("stalled response");

        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_should_reject_invalid_bucket_name_before_sending() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);

        let err = scs
            .bucket("evil/bucket")
            .delete("key")
            .await
            .expect_err("invalid bucket");

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(err, ScsError::InvalidBucketName { .. }));
    }

    #[tokio::test]
    async fn test_should_reject_invalid_metadata_header() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "badmeta").await;

        let mut metadata = Metadata::new();
        metadata.insert("x-amz-meta-bad name".to_owned(), "v".to_owned());
        let err = scs
            .bucket(&name)
            .put("k", &metadata, &b"x"[..])
            .await
            .expect_err("invalid header name");

        assert!(matches!(err, ScsError::InvalidHeader { .. }));
        assert!(server.object(&name, "k").is_none());
    }
}
