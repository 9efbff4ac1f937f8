//! Files attached to Markdown in projects and groups

use crate::client::Client;
use crate::error::Result;
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, with_upload, Many, NoContent,
    One, Raw, RequestOption, ResourceId, Upload,
};
use crate::response::Response;
use crate::types::{BasicUser, ResourceKind};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// An upload as listed by the uploads API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownUpload {
    pub id: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub uploaded_by: Option<BasicUser>,
}

/// Result of uploading a file, ready to paste into Markdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkdownUploadedFile {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub full_path: String,
    #[serde(default)]
    pub markdown: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListMarkdownUploadsOptions {
    #[serde(flatten)]
    pub list: ListOptions,
}

#[async_trait]
pub trait MarkdownUploadsService {
    /// Upload a file to a project, sent as the multipart field `file`
    async fn upload_project_markdown(
        &self,
        pid: &ResourceId,
        upload: Upload,
        req: &[RequestOption],
    ) -> Result<(MarkdownUploadedFile, Response)>;

    async fn list_project_markdown_uploads(
        &self,
        pid: &ResourceId,
        opts: &ListMarkdownUploadsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<MarkdownUpload>, Response)>;

    async fn download_project_markdown_upload(
        &self,
        pid: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)>;

    async fn download_project_markdown_upload_by_secret(
        &self,
        pid: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)>;

    async fn delete_project_markdown_upload(
        &self,
        pid: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<Response>;

    async fn delete_project_markdown_upload_by_secret(
        &self,
        pid: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<Response>;

    async fn list_group_markdown_uploads(
        &self,
        gid: &ResourceId,
        opts: &ListMarkdownUploadsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<MarkdownUpload>, Response)>;

    async fn download_group_markdown_upload(
        &self,
        gid: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)>;

    async fn download_group_markdown_upload_by_secret(
        &self,
        gid: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)>;

    async fn delete_group_markdown_upload(
        &self,
        gid: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<Response>;

    async fn delete_group_markdown_upload_by_secret(
        &self,
        gid: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<Response>;
}

/// Markdown uploads endpoints
#[derive(Debug, Clone)]
pub struct MarkdownUploads {
    client: Client,
}

impl MarkdownUploads {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        opts: &ListMarkdownUploadsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<MarkdownUpload>, Response)> {
        self.client
            .dispatch::<Many<MarkdownUpload>>(vec![
                with_path("{}/{}/uploads", &[kind.into(), id.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn download(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.client
            .dispatch::<Raw>(vec![
                with_path("{}/{}/uploads/{}", &[kind.into(), id.into(), upload.into()]),
                with_request_opts(req),
            ])
            .await
    }

    async fn download_by_secret(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.client
            .dispatch::<Raw>(vec![
                with_path(
                    "{}/{}/uploads/{}/{}",
                    &[kind.into(), id.into(), secret.into(), filename.into()],
                ),
                with_request_opts(req),
            ])
            .await
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path("{}/{}/uploads/{}", &[kind.into(), id.into(), upload.into()]),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }

    async fn delete_by_secret(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path(
                    "{}/{}/uploads/{}/{}",
                    &[kind.into(), id.into(), secret.into(), filename.into()],
                ),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl MarkdownUploadsService for MarkdownUploads {
    async fn upload_project_markdown(
        &self,
        pid: &ResourceId,
        upload: Upload,
        req: &[RequestOption],
    ) -> Result<(MarkdownUploadedFile, Response)> {
        self.client
            .dispatch::<One<MarkdownUploadedFile>>(vec![
                with_method(Method::POST),
                with_path("projects/{}/uploads", &[pid.into()]),
                with_upload(upload),
                with_request_opts(req),
            ])
            .await
    }

    async fn list_project_markdown_uploads(
        &self,
        pid: &ResourceId,
        opts: &ListMarkdownUploadsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<MarkdownUpload>, Response)> {
        self.list(ResourceKind::Project, pid, opts, req).await
    }

    async fn download_project_markdown_upload(
        &self,
        pid: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.download(ResourceKind::Project, pid, upload, req).await
    }

    async fn download_project_markdown_upload_by_secret(
        &self,
        pid: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.download_by_secret(ResourceKind::Project, pid, secret, filename, req)
            .await
    }

    async fn delete_project_markdown_upload(
        &self,
        pid: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        self.delete(ResourceKind::Project, pid, upload, req).await
    }

    async fn delete_project_markdown_upload_by_secret(
        &self,
        pid: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<Response> {
        self.delete_by_secret(ResourceKind::Project, pid, secret, filename, req)
            .await
    }

    async fn list_group_markdown_uploads(
        &self,
        gid: &ResourceId,
        opts: &ListMarkdownUploadsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<MarkdownUpload>, Response)> {
        self.list(ResourceKind::Group, gid, opts, req).await
    }

    async fn download_group_markdown_upload(
        &self,
        gid: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.download(ResourceKind::Group, gid, upload, req).await
    }

    async fn download_group_markdown_upload_by_secret(
        &self,
        gid: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.download_by_secret(ResourceKind::Group, gid, secret, filename, req)
            .await
    }

    async fn delete_group_markdown_upload(
        &self,
        gid: &ResourceId,
        upload: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        self.delete(ResourceKind::Group, gid, upload, req).await
    }

    async fn delete_group_markdown_upload_by_secret(
        &self,
        gid: &ResourceId,
        secret: &str,
        filename: &str,
        req: &[RequestOption],
    ) -> Result<Response> {
        self.delete_by_secret(ResourceKind::Group, gid, secret, filename, req)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::client;
    use serde_json::json;
    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_upload_project_markdown_is_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/5/uploads"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 5,
                "alt": "dk",
                "url": "/uploads/66dbcd21ec5d24ed6ea225176098d52b/dk.png",
                "full_path": "/-/project/1234/uploads/66dbcd21ec5d24ed6ea225176098d52b/dk.png",
                "markdown": "![dk](/uploads/66dbcd21ec5d24ed6ea225176098d52b/dk.png)"
            })))
            .mount(&server)
            .await;

        let upload = Upload::file("dk.png", b"\x89PNG".to_vec()).mime("image/png");
        let (file, _) = client(&server)
            .markdown_uploads()
            .upload_project_markdown(&5u64.into(), upload, &[])
            .await
            .unwrap();
        assert_eq!(file.alt, "dk");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"file\"; filename=\"dk.png\""));
        assert!(body.contains("image/png"));
    }

    #[tokio::test]
    async fn test_list_group_markdown_uploads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/groups/my-group/uploads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "size": 1024, "filename": "image.png",
                 "created_at": "2024-06-20T15:53:03.067Z",
                 "uploaded_by": {"id": 18, "name": "Alexandra Bashirian", "username": "eileen.lowe"}}
            ])))
            .mount(&server)
            .await;

        let (uploads, _) = client(&server)
            .markdown_uploads()
            .list_group_markdown_uploads(&"my-group".into(), &ListMarkdownUploadsOptions::default(), &[])
            .await
            .unwrap();
        assert_eq!(uploads[0].size, 1024);
        assert_eq!(uploads[0].uploaded_by.as_ref().unwrap().username, "eileen.lowe");
    }

    #[tokio::test]
    async fn test_download_project_upload_by_secret() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/5/uploads/648d97c6eef5fc5df8d1004565b3ee5a/sample%2Etxt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("sample"))
            .mount(&server)
            .await;

        let (content, _) = client(&server)
            .markdown_uploads()
            .download_project_markdown_upload_by_secret(
                &5u64.into(),
                "648d97c6eef5fc5df8d1004565b3ee5a",
                "sample.txt",
                &[],
            )
            .await
            .unwrap();
        assert_eq!(&content[..], b"sample");
    }

    #[tokio::test]
    async fn test_download_and_delete_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/groups/3/uploads/1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/groups/3/uploads/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/projects/5/uploads/abc/a%2Epng"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let service = client(&server).markdown_uploads();
        let (bytes, _) = service
            .download_group_markdown_upload(&3u64.into(), 1, &[])
            .await
            .unwrap();
        assert_eq!(bytes.len(), 3);

        service
            .delete_group_markdown_upload(&3u64.into(), 1, &[])
            .await
            .unwrap();
        service
            .delete_project_markdown_upload_by_secret(&5u64.into(), "abc", "a.png", &[])
            .await
            .unwrap();
    }
}
