//! Object read/write integration tests.

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use scs_client::{ByteRange, ClientConfig, Metadata, Scs, UnknownLength};

    use crate::{MockScs, client_config, create_test_bucket, scs_client};

    #[tokio::test]
    async fn test_should_put_and_get_object() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "putget").await;
        let bucket = scs.bucket(&name);

        bucket
            .put("greeting.txt", &Metadata::new(), Cursor::new(b"hello world".to_vec()))
            .await
            .expect("put");

        let data = bucket
            .get("greeting.txt", None)
            .await
            .expect("get")
            .bytes()
            .await
            .expect("read body");
        assert_eq!(&data[..], b"hello world");
        assert_eq!(
            server.object(&name, "greeting.txt").as_deref(),
            Some(&b"hello world"[..])
        );
    }

    #[tokio::test]
    async fn test_should_read_byte_ranges() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "range").await;
        let bucket = scs.bucket(&name);
        bucket
            .put("r.txt", &Metadata::new(), &b"hello world"[..])
            .await
            .expect("put");

        let head = bucket
            .get("r.txt", Some(ByteRange::new(0, Some(4))))
            .await
            .expect("get head")
            .bytes()
            .await
            .expect("read");
        assert_eq!(&head[..], b"hello");

        let tail = bucket
            .get("r.txt", Some(ByteRange::new(6, None)))
            .await
            .expect("get tail")
            .bytes()
            .await
            .expect("read");
        assert_eq!(&tail[..], b"world");

        let whole = bucket
            .get("r.txt", Some(ByteRange::new(0, Some(0))))
            .await
            .expect("get whole")
            .bytes()
            .await
            .expect("read");
        assert_eq!(&whole[..], b"hello world");
    }

    #[tokio::test]
    async fn test_should_return_metadata_on_head() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "head").await;
        let bucket = scs.bucket(&name);

        let mut metadata = Metadata::new();
        metadata.insert("x-amz-meta-color".to_owned(), "blue".to_owned());
        bucket
            .put("file.bin", &metadata, Cursor::new(vec![7u8; 11]))
            .await
            .expect("put");

        let meta = bucket.head("file.bin").await.expect("head");
        assert_eq!(meta.content_length, 11);
        assert_eq!(meta.metadata.get("x-amz-meta-color").map(String::as_str), Some("blue"));
        assert!(!meta.etag.is_empty(), "etag should be present");
        assert!(!meta.last_modified.is_empty());
    }

    #[tokio::test]
    async fn test_should_upload_spooled_body() {
        let server = MockScs::start().await;
        let config = ClientConfig {
            spool_threshold: 1024,
            ..client_config(&server)
        };
        let scs = Scs::new(&config).expect("client");
        let name = create_test_bucket(&scs, "spool").await;

        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(&payload).expect("write");
        let source = std::fs::File::open(file.path()).expect("open");

        scs.bucket(&name)
            .put("big.bin", &Metadata::new(), source)
            .await
            .expect("put spooled");

        assert_eq!(server.object(&name, "big.bin").as_deref(), Some(&payload[..]));
    }

    #[tokio::test]
    async fn test_should_upload_body_of_unknown_length() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "unknown").await;

        scs.bucket(&name)
            .put(
                "stream.txt",
                &Metadata::new(),
                UnknownLength(Cursor::new(b"streamed".to_vec())),
            )
            .await
            .expect("put");

        assert_eq!(
            server.object(&name, "stream.txt").as_deref(),
            Some(&b"streamed"[..])
        );
    }

    #[tokio::test]
    async fn test_should_upload_empty_object() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "empty").await;
        let bucket = scs.bucket(&name);

        bucket
            .put("empty", &Metadata::new(), Cursor::new(Vec::new()))
            .await
            .expect("put");

        assert_eq!(bucket.head("empty").await.expect("head").content_length, 0);
    }

    #[tokio::test]
    async fn test_should_encode_keys_with_spaces_and_unicode() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "keys").await;
        let bucket = scs.bucket(&name);

        let key = "dir/a b/中文.txt";
        bucket
            .put(key, &Metadata::new(), &b"data"[..])
            .await
            .expect("put");

        assert_eq!(server.object(&name, key).as_deref(), Some(&b"data"[..]));
        let data = bucket
            .get(key, None)
            .await
            .expect("get")
            .bytes()
            .await
            .expect("read");
        assert_eq!(&data[..], b"data");
    }

    #[tokio::test]
    async fn test_should_stream_object_into_writer() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "copy").await;
        let bucket = scs.bucket(&name);
        bucket
            .put("c.txt", &Metadata::new(), &b"copy me"[..])
            .await
            .expect("put");

        let mut out = Vec::new();
        let written = bucket
            .get("c.txt", None)
            .await
            .expect("get")
            .copy_to(&mut out)
            .await
            .expect("copy");
        assert_eq!(written, 7);
        assert_eq!(out, b"copy me");
    }

    #[tokio::test]
    async fn test_should_list_objects_with_delimiter() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "list").await;
        let bucket = scs.bucket(&name);

        for key in ["a.txt", "photos/1.jpg", "photos/2.jpg", "z.txt"] {
            bucket
                .put(key, &Metadata::new(), &b"x"[..])
                .await
                .expect("put");
        }

        let listing = bucket.list("/", "", "", 100).await.expect("list");
        let names: Vec<&str> = listing.contents.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "z.txt"]);
        assert_eq!(listing.common_prefixes.len(), 1);
        assert_eq!(listing.common_prefixes[0].prefix, "photos/");
        assert!(!listing.is_truncated);

        let page = bucket.list("", "photos/", "", 1).await.expect("list page");
        assert_eq!(page.contents.len(), 1);
        assert!(page.is_truncated);
        let next = page.next_marker.expect("next marker");

        let rest = bucket.list("", "photos/", &next, 10).await.expect("list rest");
        assert_eq!(rest.contents[0].name, "photos/2.jpg");
    }

    #[tokio::test]
    async fn test_should_delete_object() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "delete").await;
        let bucket = scs.bucket(&name);
        bucket
            .put("gone.txt", &Metadata::new(), &b"bye"[..])
            .await
            .expect("put");

        bucket.delete("gone.txt").await.expect("delete");

        assert!(server.object(&name, "gone.txt").is_none());
    }
}
