//! Bucket-level integration tests.

#[cfg(test)]
mod tests {
    use scs_client::{ErrorKind, Metadata, ScsError};
    use scs_model::Acl;

    use crate::{MockScs, OWNER_ID, create_test_bucket, scs_client, test_bucket_name};

    #[tokio::test]
    async fn test_should_create_and_list_buckets() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let first = create_test_bucket(&scs, "one").await;
        let second = create_test_bucket(&scs, "two").await;

        scs.bucket(&first)
            .put("k", &Metadata::new(), &b"12345"[..])
            .await
            .expect("put");

        let buckets = scs.list_buckets().await.expect("list buckets");
        assert_eq!(buckets.len(), 2);
        let one = buckets.iter().find(|b| b.name == first).expect("first bucket");
        assert_eq!(one.consumed_bytes, 5);
        assert!(buckets.iter().any(|b| b.name == second));
    }

    #[tokio::test]
    async fn test_should_look_up_bucket_by_name() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "lookup").await;

        let bucket = scs.get_bucket(&name).await.expect("existing bucket");
        assert_eq!(bucket.name(), name);

        let err = scs
            .get_bucket("no-such-bucket")
            .await
            .expect_err("unknown bucket");
        assert!(matches!(err, ScsError::BucketNotFound(ref n) if n == "no-such-bucket"));
    }

    #[tokio::test]
    async fn test_should_reject_unknown_canned_acl_locally() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = test_bucket_name("acl");

        let err = scs
            .put_bucket(&name, "world-writable")
            .await
            .expect_err("invalid acl");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(scs.list_buckets().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_should_read_bucket_meta_and_acl() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = test_bucket_name("meta");
        scs.put_bucket(&name, "public-read").await.expect("create");

        let meta = scs.get_bucket_meta(&name).await.expect("meta");
        assert_eq!(meta.project, name);
        assert_eq!(meta.owner, OWNER_ID);

        let acl = scs.get_bucket_acl(&name).await.expect("acl");
        assert_eq!(acl.owner, OWNER_ID);
        assert_eq!(
            acl.acl.get("GRPS000000ANONYMOUSE"),
            Some(&vec!["read".to_owned()])
        );
    }

    #[tokio::test]
    async fn test_should_replace_bucket_acl() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "putacl").await;

        let mut acl = Acl::new();
        acl.insert(
            "SINA0000000000000OTHER".to_owned(),
            vec!["read".to_owned(), "write".to_owned()],
        );
        scs.put_bucket_acl(&name, &acl).await.expect("put acl");

        assert_eq!(scs.get_bucket_acl(&name).await.expect("get acl").acl, acl);
    }

    #[tokio::test]
    async fn test_should_refuse_to_delete_non_empty_bucket() {
        let server = MockScs::start().await;
        let scs = scs_client(&server);
        let name = create_test_bucket(&scs, "rb").await;
        let bucket = scs.bucket(&name);
        bucket
            .put("k", &Metadata::new(), &b"x"[..])
            .await
            .expect("put");

        let err = scs.delete_bucket(&name).await.expect_err("not empty");
        assert!(err.service_error().is_some_and(|e| e.is("BucketNotEmpty")));

        bucket.delete("k").await.expect("delete object");
        scs.delete_bucket(&name).await.expect("delete bucket");
        assert!(scs.list_buckets().await.expect("list").is_empty());
    }
}
