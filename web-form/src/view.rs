use caption_engine::PostOutcome;

const TITLE: &str = "Instagram Caption &amp; Hashtag Generator";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Text shown in the output box after a successful run.
pub fn result_text(outcome: &PostOutcome) -> String {
    let record = &outcome.record;
    format!(
        "Caption: {}\nEmojis: {}\nHashtags: {}\n\nSaved to: {}",
        record.caption,
        record.emojis,
        record.hashtags,
        outcome.path.display()
    )
}

/// The whole page: one text input, one read-only output box.
pub fn render_page(prompt: &str, output: Option<&str>) -> String {
    let output_box = match output {
        Some(text) => format!(
            "<label for=\"output\">Generated post</label>\n\
             <textarea id=\"output\" rows=\"8\" cols=\"80\" readonly>{}</textarea>\n",
            escape_html(text)
        ),
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         <form method=\"post\" action=\"/\">\n\
         <label for=\"prompt\">Keyword or theme</label>\n\
         <input id=\"prompt\" name=\"prompt\" type=\"text\" size=\"60\" value=\"{prompt}\" \
         placeholder=\"beautiful sunset, morning coffee, new pet\">\n\
         <button type=\"submit\">Generate</button>\n\
         </form>\n\
         {output_box}\
         </body>\n\
         </html>\n",
        title = TITLE,
        prompt = escape_html(prompt),
        output_box = output_box,
    )
}
