//! Multipart upload integration tests.

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use scs_client::{ErrorKind, Metadata, MultipartSession};

    use crate::{MockScs, create_test_bucket, scs_client};

    fn part(fill: u8, len: usize) -> Cursor<Vec<u8>> {
        Cursor::new(vec![fill; len])
    }

    #[tokio::test]
    async fn test_should_upload_parts_and_complete() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "mpu").await;
        let bucket = scs.bucket(&name);

        let mut metadata = Metadata::new();
        metadata.insert("x-amz-meta-origin".to_owned(), "multipart".to_owned());
        let mut session = bucket
            .start_multipart("big.iso", &metadata)
            .await
            .expect("initiate");

        // Out of order on purpose; completion sorts by part number.
        session.upload_part(2, part(b'b', 3)).await.expect("part 2");
        let first = session.upload_part(1, part(b'a', 5)).await.expect("part 1");
        assert_eq!(first.part_number, 1);
        assert_eq!(first.size, 5);
        assert!(!first.etag.is_empty());

        let listed = session.list_parts().await.expect("list parts");
        assert_eq!(listed.part_numbers().collect::<Vec<_>>(), [1, 2]);
        assert!(session.missing_parts().await.expect("reconcile").is_empty());

        session.complete().await.expect("complete");

        assert_eq!(
            server.object(&name, "big.iso").as_deref(),
            Some(&b"aaaaabbb"[..])
        );
        let meta = bucket.head("big.iso").await.expect("head");
        assert_eq!(meta.content_length, 8);
        assert_eq!(
            meta.metadata.get("x-amz-meta-origin").map(String::as_str),
            Some("multipart")
        );
    }

    #[tokio::test]
    async fn test_should_replace_reuploaded_part() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "replace").await;
        let bucket = scs.bucket(&name);

        let mut session = bucket
            .start_multipart("obj", &Metadata::new())
            .await
            .expect("initiate");
        session.upload_part(1, part(b'x', 4)).await.expect("first try");
        session.upload_part(1, part(b'y', 2)).await.expect("second try");
        assert_eq!(session.parts().count(), 1);

        session.complete().await.expect("complete");
        assert_eq!(server.object(&name, "obj").as_deref(), Some(&b"yy"[..]));
    }

    #[tokio::test]
    async fn test_should_report_parts_missing_on_service() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "missing").await;
        let bucket = scs.bucket(&name);

        let mut session = bucket
            .start_multipart("obj", &Metadata::new())
            .await
            .expect("initiate");
        for n in 1..=3 {
            session.upload_part(n, part(b'p', 2)).await.expect("part");
        }
        server.forget_part(session.upload_id(), 2);

        assert_eq!(session.missing_parts().await.expect("reconcile"), [2]);

        let err = session.complete().await.expect_err("service lacks part 2");
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(
            err.service_error().map(|e| e.error_code.as_str()),
            Some("InvalidPart")
        );
    }

    #[tokio::test]
    async fn test_should_reject_part_after_completion() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "done").await;
        let bucket = scs.bucket(&name);

        let mut session = bucket
            .start_multipart("obj", &Metadata::new())
            .await
            .expect("initiate");
        session.upload_part(1, part(b'a', 1)).await.expect("part");
        let upload_id = session.upload_id().to_owned();
        session.complete().await.expect("complete");

        let err = bucket
            .upload_part("obj", &upload_id, 2, part(b'b', 1))
            .await
            .expect_err("upload is finished");
        let service = err.service_error().expect("service error");
        assert_eq!(service.status_code, 404);
        assert!(service.is("NoSuchUpload"));
    }

    #[tokio::test]
    async fn test_should_resume_session_by_upload_id() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "resume").await;
        let bucket = scs.bucket(&name);

        let upload = bucket
            .initiate_multipart_upload("obj", &Metadata::new())
            .await
            .expect("initiate");
        let uploaded = bucket
            .upload_part("obj", &upload.upload_id, 1, part(b'r', 3))
            .await
            .expect("part from elsewhere");

        let mut session = MultipartSession::new(bucket.clone(), "obj", upload.upload_id);
        session.record_part(uploaded);
        session.upload_part(2, part(b's', 1)).await.expect("part 2");
        session.complete().await.expect("complete");

        assert_eq!(server.object(&name, "obj").as_deref(), Some(&b"rrrs"[..]));
    }
}
