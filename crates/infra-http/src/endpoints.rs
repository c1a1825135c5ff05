// Port implementations, one per backend endpoint

use crate::client::{decode_error, ResumeMatchHttpClient};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use resume_match_core::domain::{
    Credentials, DocumentKind, HistoryRecord, MatchPair, MatchPayload, StagedFile, UploadReceipt,
};
use resume_match_core::port::{
    AuthGateway, HistorySource, LoginVerdict, MatchRequester, RemoteCallError, UploadGateway,
    LOGIN_SUCCESS_BODY,
};
use tracing::{debug, info};

const UPLOAD_RESUME: &str = "upload-resume";
const UPLOAD_JOB: &str = "upload-job";
const MATCH_RESULT: &str = "getMatchResult";
const HISTORY: &str = "history";
const LOGIN: &str = "auth/login";

fn upload_endpoint(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Resume => UPLOAD_RESUME,
        DocumentKind::JobDescription => UPLOAD_JOB,
    }
}

#[async_trait]
impl UploadGateway for ResumeMatchHttpClient {
    async fn upload(
        &self,
        kind: DocumentKind,
        file: &StagedFile,
    ) -> Result<UploadReceipt, RemoteCallError> {
        let endpoint = upload_endpoint(kind);
        let mime = mime_guess::from_path(file.name()).first_or_octet_stream();

        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(mime.essence_str())
            .map_err(|e| decode_error(endpoint, e))?;
        let form = Form::new().part("file", part);

        let response = self
            .send(endpoint, self.http().post(self.url(endpoint)).multipart(form))
            .await?;
        let message = response
            .text()
            .await
            .map_err(|e| decode_error(endpoint, e))?;

        debug!(slot = %kind, mime = %mime, "Upload accepted");
        Ok(UploadReceipt::new(message))
    }
}

#[async_trait]
impl MatchRequester for ResumeMatchHttpClient {
    async fn request_match(&self, pair: MatchPair) -> Result<MatchPayload, RemoteCallError> {
        let request = self.http().get(self.url(MATCH_RESULT)).query(&pair);
        let response = self.send(MATCH_RESULT, request).await?;
        response
            .json::<MatchPayload>()
            .await
            .map_err(|e| decode_error(MATCH_RESULT, e))
    }
}

#[async_trait]
impl HistorySource for ResumeMatchHttpClient {
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, RemoteCallError> {
        let response = self.send(HISTORY, self.http().get(self.url(HISTORY))).await?;
        response
            .json::<Vec<HistoryRecord>>()
            .await
            .map_err(|e| decode_error(HISTORY, e))
    }
}

#[async_trait]
impl AuthGateway for ResumeMatchHttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginVerdict, RemoteCallError> {
        let request = self.http().post(self.url(LOGIN)).json(credentials);
        let response = self.send(LOGIN, request).await?;

        // Any other 2xx, or a different body, is a rejection
        let status = response.status();
        let body = response.text().await.map_err(|e| decode_error(LOGIN, e))?;
        let verdict = if status == reqwest::StatusCode::OK && body == LOGIN_SUCCESS_BODY {
            LoginVerdict::Accepted
        } else {
            LoginVerdict::Rejected
        };

        info!(username = %credentials.username, ?verdict, "Login answered");
        Ok(verdict)
    }
}
