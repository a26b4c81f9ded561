//! Subcommand implementations.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result, bail};
use scs_client::{Bucket, Metadata, Scs};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::cli::Commands;

const MIB: u64 = 1024 * 1024;

pub async fn run(scs: &Scs, bucket: Option<&str>, command: Commands) -> Result<()> {
    let bucket_name = || bucket.context("no bucket given; pass --bucket or set it in the config file");

    match command {
        Commands::Buckets => {
            for b in scs.list_buckets().await? {
                println!("{:>14}  {}  {}", b.consumed_bytes, b.creation_date, b.name);
            }
        }
        Commands::Meta => print_json(&scs.get_bucket_meta(bucket_name()?).await?)?,
        Commands::Mb { name, acl } => {
            scs.put_bucket(&name, &acl).await?;
            info!(bucket = %name, acl = %acl, "bucket created");
        }
        Commands::Rb { name } => {
            scs.delete_bucket(&name).await?;
            info!(bucket = %name, "bucket deleted");
        }
        Commands::Acl => print_json(&scs.get_bucket_acl(bucket_name()?).await?)?,
        Commands::Ls {
            prefix,
            delimiter,
            marker,
            limit,
        } => {
            let listing = scs
                .bucket(bucket_name()?)
                .list(&delimiter, &prefix, &marker, limit)
                .await?;
            for p in &listing.common_prefixes {
                println!("{:>14}  {}", "PRE", p.prefix);
            }
            for o in &listing.contents {
                println!("{:>14}  {}", o.size, o.name);
            }
            if listing.is_truncated {
                println!("(truncated, next marker: {})", listing.next_marker.unwrap_or_default());
            }
        }
        Commands::Head { key } => print_json(&scs.bucket(bucket_name()?).head(&key).await?)?,
        Commands::Get { key, range, out } => {
            let body = scs.bucket(bucket_name()?).get(&key, range).await?;
            let written = match out {
                Some(path) => {
                    let mut file = tokio::fs::File::create(&path)
                        .await
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    body.copy_to(&mut file).await?
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    let written = body.copy_to(&mut stdout).await?;
                    stdout.flush().await?;
                    written
                }
            };
            info!(key = %key, bytes = written, "downloaded object");
        }
        Commands::Put { key, file, meta } => {
            let source = open(&file)?;
            let metadata: Metadata = meta.into_iter().collect();
            scs.bucket(bucket_name()?).put(&key, &metadata, source).await?;
            info!(key = %key, "uploaded object");
        }
        Commands::Rm { key } => {
            scs.bucket(bucket_name()?).delete(&key).await?;
            info!(key = %key, "deleted object");
        }
        Commands::Upload {
            key,
            file,
            part_size,
            meta,
        } => {
            let metadata: Metadata = meta.into_iter().collect();
            let bucket = scs.bucket(bucket_name()?);
            multipart_upload(&bucket, &key, &file, part_size_bytes(part_size)?, &metadata).await?;
        }
    }

    Ok(())
}

fn part_size_bytes(mib: u64) -> Result<u64> {
    mib.checked_mul(MIB)
        .with_context(|| format!("part size of {mib} MiB is too large"))
}

async fn multipart_upload(
    bucket: &Bucket,
    key: &str,
    path: &Path,
    part_size: u64,
    metadata: &Metadata,
) -> Result<()> {
    if part_size == 0 {
        bail!("part size must be positive");
    }
    let total = open(path)?.metadata()?.len();
    let mut session = bucket.start_multipart(key, metadata).await?;
    info!(key, upload_id = session.upload_id(), total, "started multipart upload");

    let mut offset = 0;
    let mut part_number = 1u32;
    while offset < total || part_number == 1 {
        let mut source = open(path)?;
        source.seek(SeekFrom::Start(offset))?;
        let part = source.take(part_size);

        let size = session.upload_part(part_number, part).await?.size;
        info!(part_number, size, "uploaded part");

        offset = offset.saturating_add(part_size);
        part_number += 1;
    }

    let missing = session.missing_parts().await?;
    if !missing.is_empty() {
        bail!(
            "service is missing parts {missing:?} of upload {}",
            session.upload_id()
        );
    }

    session.complete().await?;
    info!(key, "completed multipart upload");
    Ok(())
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
