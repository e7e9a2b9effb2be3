//! HTTP handlers

use crate::core::{FetchOutcome, FetchRequest, Notice, Preset};
use crate::error::TubedropError;
use crate::utils::{attachment_disposition, DOWNLOAD_CONTENT_TYPE};
use crate::web::auth::{
    cleared_cookie, cookie_value, current_user, session_cookie, session_token, UserContext,
};
use crate::web::page::{login_page, main_page};
use crate::web::server::AppState;
use crate::Result;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use futures::StreamExt;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Header carrying a percent-encoded warning alongside a delivered file
pub const NOTICE_HEADER: &str = "x-tubedrop-notice";

/// Cookie holding that same warning until the form page is shown again
pub const NOTICE_COOKIE: &str = "tubedrop_notice";

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub preset: String,
}

/// A failed download attempt, rendered back into the form page
#[derive(Debug)]
struct DownloadFailure {
    user: UserContext,
    url: String,
    preset: Preset,
    error: TubedropError,
}

impl DownloadFailure {
    fn status(&self) -> StatusCode {
        match &self.error {
            e if e.is_input_error() => StatusCode::BAD_REQUEST,
            e if e.is_fetch_failure() => StatusCode::BAD_GATEWAY,
            e if e.is_output_error() => StatusCode::INTERNAL_SERVER_ERROR,
            // io and json failures on our side
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn notice(&self) -> Notice {
        let notice = match &self.error {
            TubedropError::EmptyUrl => Notice::warning("URLが入力されていません。"),
            TubedropError::OutputNotFound => {
                Notice::error("ダウンロードされたファイルが見つかりませんでした。")
            }
            TubedropError::AmbiguousOutput(_) => {
                Notice::error("ダウンロードされたファイルを特定できませんでした。")
            }
            e => Notice::error(format!("エラーが発生しました: {}", e)),
        };
        notice.with_detail(self.error.detail())
    }
}

impl IntoResponse for DownloadFailure {
    fn into_response(self) -> Response {
        let page = main_page(&self.user, &self.url, self.preset, &[self.notice()]);
        (self.status(), Html(page)).into_response()
    }
}

fn notice_cookie(message: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age=600",
        NOTICE_COOKIE,
        urlencoding::encode(message)
    )
}

fn cleared_notice_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", NOTICE_COOKIE)
}

/// Warning left behind by the last delivery, if any
fn pending_notice(headers: &HeaderMap) -> Option<Notice> {
    let encoded = cookie_value(headers, NOTICE_COOKIE)?;
    let message = urlencoding::decode(&encoded).ok()?;
    Some(Notice::warning(message.into_owned()))
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(user) = current_user(state.identity.as_ref(), &headers).await else {
        return Html(login_page(&[], state.identity.requires_password())).into_response();
    };

    match pending_notice(&headers) {
        Some(notice) => {
            let page = main_page(&user, "", Preset::default(), &[notice]);
            ([(SET_COOKIE, cleared_notice_cookie())], Html(page)).into_response()
        }
        None => Html(main_page(&user, "", Preset::default(), &[])).into_response(),
    }
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.identity.login(&form.name, &form.password).await {
        Ok(user) => {
            ([(SET_COOKIE, session_cookie(&user.token))], Redirect::to("/")).into_response()
        }
        Err(e) => {
            let message = match e {
                TubedropError::LoginRejected(reason) => reason,
                other => other.to_string(),
            };
            let page = login_page(&[Notice::error(message)], state.identity.requires_password());
            (StatusCode::UNAUTHORIZED, Html(page)).into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.identity.logout(&token).await;
    }
    ([(SET_COOKIE, cleared_cookie())], Redirect::to("/")).into_response()
}

pub async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<DownloadForm>,
) -> Response {
    let Some(user) = current_user(state.identity.as_ref(), &headers).await else {
        debug!("Download attempted without a session");
        return Redirect::to("/").into_response();
    };

    let preset = if form.preset.trim().is_empty() {
        Preset::default()
    } else {
        match form.preset.parse::<Preset>() {
            Ok(preset) => preset,
            Err(error) => {
                return DownloadFailure {
                    user,
                    url: form.url,
                    preset: Preset::default(),
                    error,
                }
                .into_response()
            }
        }
    };

    info!("{} requested {} as {}", user.name, form.url.trim(), preset.id());
    let request = FetchRequest::new(form.url.clone(), preset);
    let delivered = match state.downloader.fetch(&request).await {
        Ok(outcome) => deliver(outcome).await,
        Err(e) => Err(e),
    };

    match delivered {
        Ok(response) => response,
        Err(error) => DownloadFailure {
            user,
            url: form.url,
            preset,
            error,
        }
        .into_response(),
    }
}

/// Stream the located file; the workspace lives until the body is dropped
///
/// A probe warning rides along in [`NOTICE_HEADER`] and in a short-lived
/// cookie, so the form page shows it the next time it is rendered.
async fn deliver(outcome: FetchOutcome) -> Result<Response> {
    let warning = outcome.probe_warning().map(|notice| notice.message.clone());
    let FetchOutcome { workspace, output, .. } = outcome;

    let file = tokio::fs::File::open(&output.path).await?;
    let length = file.metadata().await?.len();
    info!("Delivering {:?} ({} bytes)", output.filename, length);

    let stream = ReaderStream::new(file).map(move |chunk| {
        let _workspace = &workspace;
        chunk
    });
    let mut response = Response::new(Body::from_stream(stream));

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(DOWNLOAD_CONTENT_TYPE));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    if let Ok(value) = HeaderValue::from_str(&attachment_disposition(&output.filename)) {
        headers.insert(CONTENT_DISPOSITION, value);
    }
    if let Some(warning) = warning {
        if let Ok(value) = HeaderValue::try_from(urlencoding::encode(&warning).into_owned()) {
            headers.insert(HeaderName::from_static(NOTICE_HEADER), value);
        }
        if let Ok(value) = HeaderValue::try_from(notice_cookie(&warning)) {
            headers.append(SET_COOKIE, value);
        }
    }

    Ok(response)
}

pub async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Downloader;
    use crate::extractor::testing::{Output, Probe, ScriptedExtractor, MEDIA_BYTES};
    use crate::web::auth::MemorySessions;
    use axum::http::header::{COOKIE, LOCATION};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn state_with(extractor: &Arc<ScriptedExtractor>) -> AppState {
        AppState::new(Downloader::new(extractor.clone()), MemorySessions::new())
    }

    async fn signed_in(state: &AppState) -> HeaderMap {
        let user = state.identity.login("Hanako", "").await.unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("tubedrop_session={}", user.token)).unwrap(),
        );
        headers
    }

    fn form(url: &str, preset: &str) -> Form<DownloadForm> {
        Form(DownloadForm {
            url: url.to_string(),
            preset: preset.to_string(),
        })
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_shows_login_without_session() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let page = body_text(index(State(state_with(&extractor)), HeaderMap::new()).await).await;
        assert!(page.contains(r#"action="/login""#));
        assert!(!page.contains(r#"action="/download""#));
    }

    #[tokio::test]
    async fn test_index_shows_form_with_session() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let state = state_with(&extractor);
        let headers = signed_in(&state).await;
        let response = index(State(state), headers).await;
        assert!(response.headers().get(SET_COOKIE).is_none());
        let page = body_text(response).await;
        assert!(page.contains("ようこそ、Hanako さん！"));
        assert!(page.contains(r#"action="/download""#));
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_redirects() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let response = login(
            State(state_with(&extractor)),
            Form(LoginForm {
                name: "Taro".into(),
                password: String::new(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("tubedrop_session="));
    }

    #[tokio::test]
    async fn test_rejected_login_is_unauthorized() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let response = login(State(state_with(&extractor)), Form(LoginForm::default())).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert!(body_text(response).await.contains("名前を入力してください。"));
    }

    #[tokio::test]
    async fn test_logout_drops_session() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let state = state_with(&extractor);
        let headers = signed_in(&state).await;
        let token = session_token(&headers).unwrap();

        let response = logout(State(state.clone()), headers).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));
        assert!(state.identity.lookup(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_download_requires_session() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let response = download(
            State(state_with(&extractor)),
            HeaderMap::new(),
            form("https://example.com/v", "mp4_best"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(extractor.probe_calls().is_empty());
        assert!(extractor.download_calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_url_is_a_warning() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let state = state_with(&extractor);
        let headers = signed_in(&state).await;
        let response = download(State(state), headers, form("", "mp4_best")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let page = body_text(response).await;
        assert!(page.contains("URLが入力されていません。"));
        assert!(page.contains(r#"class="notice warning""#));
        assert!(extractor.probe_calls().is_empty());
        assert!(extractor.download_calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_preset_is_bad_request() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let state = state_with(&extractor);
        let headers = signed_in(&state).await;
        let response = download(State(state), headers, form("https://example.com/v", "flac")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("flac"));
        assert!(extractor.download_calls().is_empty());
    }

    #[tokio::test]
    async fn test_non_http_url_is_bad_request() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let state = state_with(&extractor);
        let headers = signed_in(&state).await;
        let response = download(State(state), headers, form("ftp://example.com/v", "mp4_best")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(extractor.download_calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_download_streams_file() {
        let root = TempDir::new().unwrap();
        let extractor = Arc::new(ScriptedExtractor::producing("名曲", "mp3"));
        let state = AppState::new(
            Downloader::new(extractor.clone()).with_temp_root(root.path()),
            MemorySessions::new(),
        );
        let headers = signed_in(&state).await;

        let response = download(
            State(state),
            headers,
            form("https://example.com/watch?v=XYZ", "MP3 (音声のみ - 標準音質)"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let response_headers = response.headers().clone();
        assert_eq!(response_headers[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(
            response_headers[CONTENT_LENGTH],
            MEDIA_BYTES.len().to_string().as_str()
        );
        let disposition = response_headers[CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment;"));
        assert!(disposition.contains("filename*=UTF-8''%E5%90%8D%E6%9B%B2.mp3"));
        assert!(response_headers.get(NOTICE_HEADER).is_none());
        assert!(response_headers.get(SET_COOKIE).is_none());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], MEDIA_BYTES);
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_probe_failure_still_delivers_with_notice() {
        let extractor = Arc::new(ScriptedExtractor::new(
            Probe::Fail,
            vec![Output::Ext("mp4".into())],
        ));
        let state = state_with(&extractor);
        let headers = signed_in(&state).await;
        let response = download(State(state), headers, form("https://example.com/v", "mp4_360p")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.contains("downloaded_video.mp4"));
        assert!(response.headers().get(NOTICE_HEADER).is_some());
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("tubedrop_notice="));
    }

    #[tokio::test]
    async fn test_title_warning_is_shown_on_next_page() {
        let extractor = Arc::new(ScriptedExtractor::new(
            Probe::Fail,
            vec![Output::Ext("mp4".into())],
        ));
        let state = state_with(&extractor);
        let mut headers = signed_in(&state).await;
        let response = download(
            State(state.clone()),
            headers.clone(),
            form("https://example.com/v", "mp4_360p"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        let session = headers[COOKIE].to_str().unwrap().to_string();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{}; {}", session, pair)).unwrap(),
        );

        let response = index(State(state.clone()), headers).await;
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .starts_with("tubedrop_notice=;"));
        let page = body_text(response).await;
        assert!(page.contains("動画タイトルの取得に失敗しました。"));
        assert!(page.contains(r#"class="notice warning""#));
    }

    #[tokio::test]
    async fn test_notice_cookie_ignored_without_session() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4"));
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("tubedrop_notice=hello"));
        let response = index(State(state_with(&extractor)), headers).await;
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert!(!body_text(response).await.contains("hello"));
    }

    #[tokio::test]
    async fn test_extractor_failure_is_bad_gateway_with_detail() {
        let extractor = Arc::new(ScriptedExtractor::producing("t", "mp4").failing_download());
        let state = state_with(&extractor);
        let headers = signed_in(&state).await;
        let response = download(State(state), headers, form("https://example.com/v", "mp4_best")).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let page = body_text(response).await;
        assert!(page.contains("エラーが発生しました"));
        assert!(page.contains("<pre>"));
        assert!(page.contains("Unsupported URL"));
        assert!(page.contains(r#"value="https://example.com/v""#));
    }

    #[tokio::test]
    async fn test_missing_output_is_server_error() {
        let extractor = Arc::new(ScriptedExtractor::new(Probe::Title("t".into()), vec![]));
        let state = state_with(&extractor);
        let headers = signed_in(&state).await;
        let response = download(State(state), headers, form("https://example.com/v", "mp4_best")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let page = body_text(response).await;
        assert!(page.contains("ダウンロードされたファイルが見つかりませんでした。"));
        assert!(page.contains("<pre>Downloaded file not found</pre>"));
    }

    fn failure(error: TubedropError) -> DownloadFailure {
        DownloadFailure {
            user: UserContext {
                name: "Hanako".into(),
                token: "t".into(),
            },
            url: "https://example.com/v".into(),
            preset: Preset::default(),
            error,
        }
    }

    #[test]
    fn test_every_failure_carries_detail() {
        let errors = vec![
            TubedropError::EmptyUrl,
            TubedropError::UnknownPreset("flac".into()),
            TubedropError::ExtractorNotFound("yt-dlp".into()),
            TubedropError::OutputNotFound,
            TubedropError::AmbiguousOutput(vec!["a.mp4".into(), "b.mkv".into()]),
            TubedropError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only file system",
            )),
        ];
        for error in errors {
            let notice = failure(error).notice();
            assert!(notice.detail.is_some(), "{:?} has no detail", notice);
        }

        let io = failure(TubedropError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(io.notice().detail.unwrap().contains("read-only file system"));
    }

    #[test]
    fn test_failure_status_mapping() {
        assert_eq!(failure(TubedropError::EmptyUrl).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            failure(TubedropError::ExtractorNotFound("yt-dlp".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            failure(TubedropError::AmbiguousOutput(vec![])).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_healthz() {
        let Json(body) = healthz().await;
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_long_extractor_output_reaches_page() {
        let stderr = (1..=12)
            .map(|n| format!("[debug] line {}", n))
            .collect::<Vec<_>>()
            .join("\n");
        let response = failure(TubedropError::ExtractorFailed {
            status: "exit status: 1".into(),
            stderr,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let page = body_text(response).await;
        assert!(page.contains("[debug] line 1\n"));
        assert!(page.contains("[debug] line 12"));
    }
}
