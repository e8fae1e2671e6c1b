//! Document skeleton used by the "stylish" and "simple" templates: a plain
//! heading-led page ending in a FAQ whose answers collapse on click.

use crate::profile::record::ProfileRecord;
use crate::template::markup::{html_escape, list_items, multiline};
use crate::template::{SCRIPT_TAG, STYLESHEET_TAG};

pub const SCRIPT: &str = "document.addEventListener('DOMContentLoaded', () => {
  document.querySelectorAll('.faq-item h3').forEach((heading) => {
    heading.addEventListener('click', () => {
      heading.parentElement.classList.toggle('collapsed');
    });
  });
});
";

pub fn render_html(record: &ProfileRecord, image_filename: Option<&str>) -> String {
    let name = html_escape(&record.your_name);

    let mut html = String::with_capacity(2048);
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{name}のポートフォリオ</title>
  {STYLESHEET_TAG}
</head>
<body>
  <div class="container">
"#
    ));

    if let Some(file) = image_filename {
        html.push_str(&format!(
            "    <img src=\"img/{file}\" alt=\"プロフィール写真\" class=\"profile-image\">\n"
        ));
    }

    html.push_str(&format!(
        r#"    <h1>{name}</h1>
    <p class="catchphrase">{dream}</p>

    <h2>プロフィール</h2>
    <dl class="profile">
      <dt>出身地</dt><dd>{hometown}</dd>
      <dt>大学</dt><dd>{university}</dd>
      <dt>学部/学科</dt><dd>{faculty}</dd>
    </dl>

    <h2>趣味</h2>
    <ul class="hobby-list">{hobbies}</ul>

    <h2>スキル・資格</h2>
    <ul class="skill-list">{skills}</ul>

    <h2>自己PR</h2>
    <p class="self-pr">{self_pr}</p>

    <div class="faq-section">
      <h2>よくあるご質問 (FAQ)</h2>
"#,
        dream = html_escape(&record.dream),
        hometown = html_escape(&record.hometown),
        university = html_escape(&record.university),
        faculty = html_escape(&record.faculty),
        hobbies = list_items(&record.hobby),
        skills = list_items(&record.skill),
        self_pr = multiline(&record.self_pr),
    ));

    for q in &record.questions {
        html.push_str(&format!(
            r#"      <div class="faq-item">
        <h3>{}</h3>
        <p>{}</p>
      </div>
"#,
            html_escape(&q.question),
            multiline(&q.answer)
        ));
    }

    html.push_str(&format!(
        "    </div>\n  </div>\n  {SCRIPT_TAG}\n</body>\n</html>\n"
    ));
    html
}
