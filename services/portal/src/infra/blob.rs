use std::sync::Arc;

use anyhow::{Context as _, anyhow, bail};
use object_store::{ObjectStore, PutPayload, memory::InMemory, path::Path as ObjectPath};
use url::Url;

use crate::domain::repository::BlobStore;
use crate::domain::types::PictureUpload;
use crate::error::PortalError;

/// Profile pictures in an object store, served from `public_base_url`.
#[derive(Clone)]
pub struct ObjectStoreBlobStore {
    store: Arc<dyn ObjectStore>,
    prefix: ObjectPath,
    public_base_url: String,
}

impl ObjectStoreBlobStore {
    /// Build from a store URL: `s3://bucket/prefix`, `file:///dir` or `memory://`.
    ///
    /// S3 settings come from the `AWS_*` variables understood by
    /// `AmazonS3Builder::from_env`; `AWS_ENDPOINT` points at an S3-compatible server.
    pub fn from_url(store_url: &str, public_base_url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(store_url).with_context(|| format!("invalid blob store url {store_url:?}"))?;
        let (store, prefix): (Arc<dyn ObjectStore>, ObjectPath) = match url.scheme() {
            "s3" => s3_store(&url)?,
            "file" => local_store(&url)?,
            "memory" => (Arc::new(InMemory::new()), ObjectPath::from("")),
            other => bail!("unsupported blob store scheme {other:?}; expected s3, file or memory"),
        };
        Ok(Self {
            store,
            prefix,
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn in_memory(public_base_url: &str) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            prefix: ObjectPath::from(""),
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn object_path(&self, path: &str) -> ObjectPath {
        if self.prefix.as_ref().is_empty() {
            ObjectPath::from(path)
        } else {
            ObjectPath::from(format!("{}/{}", self.prefix, path))
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path)
    }

    /// Inverse of [`Self::public_url`]. `None` for URLs this store never issued.
    fn path_of(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.public_base_url)?
            .strip_prefix('/')
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
    }

    /// Cheap round trip used by readiness checks.
    pub async fn ping(&self) -> anyhow::Result<()> {
        match self.store.head(&self.object_path(".readyz")).await {
            Ok(_) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context("blob store head")),
        }
    }
}

fn s3_store(url: &Url) -> anyhow::Result<(Arc<dyn ObjectStore>, ObjectPath)> {
    let bucket = url
        .host_str()
        .ok_or_else(|| anyhow!("s3 url must name the bucket as host"))?;
    let prefix = url.path().trim_matches('/');

    let builder = object_store::aws::AmazonS3Builder::from_env().with_bucket_name(bucket);
    let store = builder.build().context("build s3 blob store")?;
    Ok((Arc::new(store), ObjectPath::from(prefix)))
}

fn local_store(url: &Url) -> anyhow::Result<(Arc<dyn ObjectStore>, ObjectPath)> {
    let dir = url.path();
    std::fs::create_dir_all(dir).with_context(|| format!("create blob directory {dir}"))?;
    let store = object_store::local::LocalFileSystem::new_with_prefix(dir)
        .with_context(|| format!("open blob directory {dir}"))?;
    Ok((Arc::new(store), ObjectPath::from("")))
}

impl BlobStore for ObjectStoreBlobStore {
    async fn upload(&self, path: &str, upload: &PictureUpload) -> Result<String, PortalError> {
        let payload = PutPayload::from(upload.bytes.clone());
        self.store
            .put(&self.object_path(path), payload)
            .await
            .with_context(|| format!("put {path}"))?;
        Ok(self.public_url(path))
    }

    async fn delete(&self, url: &str) -> Result<(), PortalError> {
        let path = self
            .path_of(url)
            .ok_or_else(|| PortalError::Internal(anyhow!("{url} is not served by this blob store")))?;
        match self.store.delete(&self.object_path(&path)).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context(format!("delete {path}")).into()),
        }
    }
}
