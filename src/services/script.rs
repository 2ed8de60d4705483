//! 追踪脚本生成
//!
//! 模板 `assets/tracker.js` 编译期嵌入，运行时注入追踪器 id 与上报地址。

use actix_web::HttpRequest;
use rust_embed::Embed;

use crate::errors::{Result, ScrolldepthError};

#[derive(Embed)]
#[folder = "assets/"]
struct ScriptAssets;

const TEMPLATE: &str = "tracker.js";
const TRACK_PATH: &str = "/track";

/// 转成可以安全嵌入 `<script>` 的 JS 字符串字面量
fn js_string_literal(value: &str) -> Result<String> {
    let json = serde_json::to_string(value)?;
    // `</script>` 不能出现在内联脚本里；U+2028/2029 在旧引擎中是行终止符
    Ok(json
        .replace("</", "<\\/")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029"))
}

/// 渲染追踪脚本
///
/// `tracker_id` 为空时脚本在浏览器端从 `data-tracker-id` 或 script src 的 `?id=` 读取
pub fn render(tracker_id: Option<&str>, endpoint: &str) -> Result<String> {
    let asset = ScriptAssets::get(TEMPLATE)
        .ok_or_else(|| ScrolldepthError::script_template("tracker.js is not embedded"))?;
    let template = std::str::from_utf8(&asset.data)
        .map_err(|e| ScrolldepthError::script_template(format!("tracker.js is not UTF-8: {}", e)))?;

    let id_literal = match tracker_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => js_string_literal(id)?,
        None => "null".to_string(),
    };

    Ok(template
        .replace("%TRACK_ENDPOINT%", &js_string_literal(endpoint)?)
        .replace("%TRACKER_ID%", &id_literal))
}

/// 计算脚本里使用的上报地址
///
/// 配置的 public_url 优先，否则由请求的 scheme + host 推导
pub fn resolve_endpoint(req: &HttpRequest, configured_public_url: Option<&str>) -> String {
    match configured_public_url
        .map(|url| url.trim().trim_end_matches('/'))
        .filter(|url| !url.is_empty())
    {
        Some(base) => format!("{}{}", base, TRACK_PATH),
        None => {
            let info = req.connection_info();
            format!("{}://{}{}", info.scheme(), info.host(), TRACK_PATH)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_render_injects_id_and_endpoint() {
        let js = render(Some("abcd1234"), "https://stats.example.com/track").unwrap();
        assert!(js.contains(r#"var ENDPOINT = "https://stats.example.com/track";"#));
        assert!(js.contains(r#""abcd1234" ||"#));
        assert!(!js.contains("%TRACKER_ID%"));
        assert!(!js.contains("%TRACK_ENDPOINT%"));
    }

    #[test]
    fn test_render_without_id_defers_to_browser() {
        let js = render(None, "/track").unwrap();
        assert!(js.contains("null ||"));
        assert!(js.contains("data-tracker-id"));

        let blank = render(Some("   "), "/track").unwrap();
        assert!(blank.contains("null ||"));
    }

    #[test]
    fn test_render_escapes_script_breakout() {
        let js = render(Some(r#"x"</script><script>alert(1)//"#), "/track").unwrap();
        assert!(!js.contains("</script>"));
        assert!(js.contains(r#""x\"<\/script><script>alert(1)//""#));
    }

    #[test]
    fn test_resolve_endpoint_prefers_configured_url() {
        let req = TestRequest::default()
            .insert_header(("Host", "internal:8080"))
            .to_http_request();
        assert_eq!(
            resolve_endpoint(&req, Some("https://stats.example.com/")),
            "https://stats.example.com/track"
        );
        assert_eq!(resolve_endpoint(&req, None), "http://internal:8080/track");
        assert_eq!(resolve_endpoint(&req, Some("")), "http://internal:8080/track");
    }
}
