//! Profile-card skeleton: navigation bar, labelled profile rows, hobby and
//! skill boxes, self-PR and one block per question. Shared by the five
//! colour templates.

use crate::profile::record::ProfileRecord;
use crate::template::markup::{html_escape, list_items, multiline};
use crate::template::{SCRIPT_TAG, STYLESHEET_TAG};

pub const SCRIPT: &str = "document.addEventListener('DOMContentLoaded', () => {
  console.log('ポートフォリオサイトへようこそ！');
});
";

pub fn render_html(record: &ProfileRecord, image_filename: Option<&str>) -> String {
    let image_tag = image_filename
        .map(|name| {
            format!(r#"<img src="img/{name}" alt="プロフィール写真" class="profile-image">"#)
        })
        .unwrap_or_default();

    let rows = [
        ("名前", &record.your_name),
        ("出身地", &record.hometown),
        ("大学", &record.university),
        ("学部/学科", &record.faculty),
        ("将来の夢", &record.dream),
    ];

    let mut html = String::with_capacity(4096);
    html.push_str(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
"#,
    );
    html.push_str(&format!("    {STYLESHEET_TAG}\n"));
    html.push_str(
        r#"    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin="anonymous">
    <link href="https://fonts.googleapis.com/css2?family=Noto+Sans+JP:wght@100..900&family=Noto+Serif+JP:wght@200..900&display=swap" rel="stylesheet">
    <script src="https://kit.fontawesome.com/8036d0d404.js" crossorigin="anonymous" async></script>
"#,
    );
    html.push_str(&format!(
        "    <title>{} | NAITEI.site</title>\n</head>\n",
        html_escape(&record.your_name)
    ));

    html.push_str(
        r#"<body>
    <nav>
        <div class="container navigation">
            <img class="logo" src="img/logo.png" alt="logo">
            <div class="language">
                <img src="img/english-icon.png" alt="English" class="flag">
                <a href="/">English</a>
                <i class="fa-solid fa-chevron-up"></i>
            </div>
        </div>
    </nav>
    <section class="basic-info">
        <div class="container">
            <div class="first-block section-divider">
"#,
    );
    html.push_str(&format!("                {image_tag}\n"));
    html.push_str("                <div class=\"profile-text\">\n");
    for (label, value) in rows {
        html.push_str(&format!(
            r#"                    <div class="profile-row">
                        <div class="profile-label">{label}</div>
                        <div class="profile-colon">:</div>
                        <div class="profile-value">{}</div>
                    </div>
"#,
            html_escape(value)
        ));
    }
    html.push_str("                </div>\n            </div>\n");

    html.push_str(&format!(
        r#"            <div class="second-block section-divider">
                <div class="second-box-wrapper">
                    <h2 class="header">趣味</h2>
                    <div class="second-box">
                        <ul class="hobby-list">{}</ul>
                    </div>
                </div>
                <div class="second-box-wrapper">
                    <h2 class="header">スキル・資格</h2>
                    <div class="second-box">
                        <ul class="skill-list">{}</ul>
                    </div>
                </div>
            </div>
            <div class="third-block section-divider">
                <h2 class="header">自己PR</h2>
                <div class="text-box">
                    <p>{}</p>
                </div>
            </div>
"#,
        list_items(&record.hobby),
        list_items(&record.skill),
        multiline(&record.self_pr)
    ));

    for q in &record.questions {
        html.push_str(&format!(
            r#"            <div class="question-block section-divider">
                <h2 class="header">{}</h2>
                <div class="text-box">
                    <p>{}</p>
                </div>
            </div>
"#,
            html_escape(&q.question),
            multiline(&q.answer)
        ));
    }

    html.push_str(
        r#"        </div>
        <footer>
            <p>&copy;NAITEI.site 2025 All rights reserved.</p>
        </footer>
    </section>
"#,
    );
    html.push_str(&format!("    {SCRIPT_TAG}\n</body>\n</html>\n"));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_record;

    #[test]
    fn test_one_question_block_per_entry() {
        let mut record = sample_record();
        record.questions.push(record.questions[0].clone());
        record.questions[1].id = "2".into();
        let html = render_html(&record, None);
        assert_eq!(html.matches("question-block").count(), 2);
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut record = sample_record();
        record.your_name = "<script>alert(1)</script>".into();
        let html = render_html(&record, None);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_references_fixed_static_images() {
        let html = render_html(&sample_record(), None);
        assert!(html.contains(r#"src="img/logo.png""#));
        assert!(html.contains(r#"src="img/english-icon.png""#));
    }
}
