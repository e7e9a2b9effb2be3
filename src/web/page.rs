//! Server-rendered HTML

use crate::core::{Notice, NoticeLevel, Preset};
use crate::web::auth::UserContext;
use htmlescape::encode_minimal;

const TITLE: &str = "YouTube 動画ダウンローダー";

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; text-align: center; }
form { margin: 1rem 0; }
input[type=text], input[type=url], input[type=password], select { width: 100%; padding: .5rem; margin: .25rem 0 .75rem; box-sizing: border-box; }
button { padding: .5rem 1.5rem; }
.notice { padding: .75rem; margin: .5rem 0; border-radius: .25rem; text-align: left; }
.notice.success { background: #e6f4ea; }
.notice.warning { background: #fff4d6; }
.notice.error { background: #fde8e8; }
.notice pre { white-space: pre-wrap; font-size: .85em; }
.usage { font-size: .9em; color: #555; }
"#;

fn layout(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = TITLE,
        style = STYLE,
        body = body
    )
}

fn icon(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "✅",
        NoticeLevel::Warning => "⚠️",
        NoticeLevel::Error => "❌",
    }
}

fn render_notice(notice: &Notice) -> String {
    let detail = notice
        .detail
        .as_deref()
        .map(|d| format!("<pre>{}</pre>", encode_minimal(d)))
        .unwrap_or_default();
    format!(
        r#"<div class="notice {}">{} {}{}</div>"#,
        notice.level.css_class(),
        icon(notice.level),
        encode_minimal(&notice.message),
        detail
    )
}

fn render_notices(notices: &[Notice]) -> String {
    notices.iter().map(render_notice).collect()
}

fn preset_options(selected: Preset) -> String {
    Preset::ALL
        .iter()
        .map(|preset| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                preset.id(),
                if *preset == selected { " selected" } else { "" },
                encode_minimal(preset.label())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The page shown to visitors without a session
pub fn login_page(notices: &[Notice], password_required: bool) -> String {
    let password_field = if password_required {
        r#"<label for="password">パスワード:</label>
<input type="password" id="password" name="password">"#
    } else {
        ""
    };

    layout(&format!(
        r#"<h1>{title}</h1>
<p>お好きなYouTube動画をダウンロードできます。まずはログインから</p>
{notices}
<form method="post" action="/login">
<label for="name">お名前:</label>
<input type="text" id="name" name="name" required>
{password_field}
<button type="submit">ログイン</button>
</form>"#,
        title = TITLE,
        notices = render_notices(notices),
        password_field = password_field
    ))
}

/// The download form for a signed-in user.
///
/// `url` and `selected` refill the form after a failed attempt.
pub fn main_page(user: &UserContext, url: &str, selected: Preset, notices: &[Notice]) -> String {
    layout(&format!(
        r#"<p>ようこそ、{name} さん！</p>
<h1>{title}</h1>
<p>お好きなYouTube動画をダウンロードできます。URLを入力し、形式を選択してください。</p>
{notices}
<form method="post" action="/download">
<label for="url">YouTube動画のURLを入力してください:</label>
<input type="url" id="url" name="url" value="{url}" placeholder="例: https://www.youtube.com/watch?v=...">
<label for="preset">ダウンロードする形式を選択してください:</label>
<select id="preset" name="preset">
{options}
</select>
<button type="submit">📥 ダウンロード開始</button>
</form>
<hr>
<p class="usage">ご利用上の注意: ダウンロードしたコンテンツの著作権にご注意ください。個人利用の範囲に留めてください。</p>
<form method="post" action="/logout">
<button type="submit">ログアウト</button>
</form>"#,
        name = encode_minimal(&user.name),
        title = TITLE,
        notices = render_notices(notices),
        url = encode_minimal(url),
        options = preset_options(selected)
    ))
}
