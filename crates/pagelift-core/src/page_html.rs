//! Server-side HTML rendering for published landing pages.
//!
//! Produces the self-contained document served from the public pages path and
//! the body fragment pushed to WordPress. All interpolated content is
//! HTML-escaped; page authors supply plain text, not markup.

use crate::models::LandingPage;

/// Escape text for safe interpolation into HTML content and attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the lead form markup for a page.
///
/// The honeypot input (`website`) is rendered hidden; the capture endpoint
/// rejects any submission that fills it.
fn render_form(page: &LandingPage) -> String {
    let mut html = String::new();
    html.push_str("<form class=\"lead-form\" method=\"post\" action=\"/api/public/leads\">\n");
    html.push_str(&format!(
        "  <input type=\"hidden\" name=\"landing_page_id\" value=\"{}\">\n",
        page.id
    ));
    html.push_str(
        "  <input type=\"text\" name=\"website\" tabindex=\"-1\" autocomplete=\"off\" \
         style=\"position:absolute;left:-9999px\" aria-hidden=\"true\">\n",
    );

    for field in &page.form_fields.fields {
        let name = escape_html(&field.name);
        let label = escape_html(&field.label);
        let placeholder = escape_html(field.placeholder.as_deref().unwrap_or(""));
        let required_mark = if field.required { " *" } else { "" };
        let required_attr = if field.required { " required" } else { "" };

        html.push_str("  <div class=\"form-field\">\n");
        html.push_str(&format!(
            "    <label for=\"{name}\">{label}{required_mark}</label>\n"
        ));
        if field.field_type == "textarea" {
            html.push_str(&format!(
                "    <textarea name=\"{name}\" id=\"{name}\" rows=\"4\" \
                 placeholder=\"{placeholder}\"{required_attr}></textarea>\n"
            ));
        } else {
            let ftype = escape_html(&field.field_type);
            html.push_str(&format!(
                "    <input type=\"{ftype}\" name=\"{name}\" id=\"{name}\" \
                 placeholder=\"{placeholder}\"{required_attr}>\n"
            ));
        }
        html.push_str("  </div>\n");
    }

    html.push_str(&format!(
        "  <button type=\"submit\">{}</button>\n",
        escape_html(&page.cta_text)
    ));
    html.push_str("</form>");
    html
}

/// Render the content fragment for a page: hero image, headline, subheading,
/// body paragraphs, and the lead form. Used both by the public page and as
/// the WordPress post body.
pub fn render_landing_page_body(page: &LandingPage) -> String {
    let mut html = String::new();

    if let Some(hero) = &page.hero_image_url {
        html.push_str(&format!(
            "<div class=\"hero\"><img src=\"{}\" alt=\"{}\"></div>\n",
            escape_html(hero),
            escape_html(&page.title)
        ));
    }

    if let Some(headline) = &page.headline {
        html.push_str(&format!("<h2>{}</h2>\n", escape_html(headline)));
    }

    if let Some(subheading) = &page.subheading {
        html.push_str(&format!(
            "<p class=\"subheading\">{}</p>\n",
            escape_html(subheading)
        ));
    }

    if let Some(body) = &page.body_text {
        for para in body.split("\n\n").filter(|p| !p.trim().is_empty()) {
            html.push_str(&format!("<p>{}</p>\n", escape_html(para.trim())));
        }
    }

    html.push_str(&render_form(page));
    html
}

/// Render the full standalone HTML document for a published page.
pub fn render_landing_page_html(page: &LandingPage) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         <main class=\"landing-page\" data-slug=\"{slug}\">\n\
         {body}\n\
         </main>\n\
         </body>\n\
         </html>\n",
        title = escape_html(&page.title),
        slug = escape_html(&page.slug),
        body = render_landing_page_body(page),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormField, FormFields, PublishStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_page() -> LandingPage {
        LandingPage {
            id: Uuid::nil(),
            title: "Spring Sale".to_string(),
            slug: "spring-sale".to_string(),
            headline: Some("Save 20% <today>".to_string()),
            subheading: Some("Limited time".to_string()),
            body_text: Some("First paragraph.\n\nSecond paragraph.".to_string()),
            cta_text: "Sign Up".to_string(),
            hero_image_url: Some("https://cdn.example.com/hero.png".to_string()),
            form_fields: FormFields::default_lead_form(),
            publish_status: PublishStatus::Published,
            published_url: None,
            published_at: None,
            created_by: Uuid::nil(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>&\"quoted\"'</b>"),
            "&lt;b&gt;&amp;&quot;quoted&quot;&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_document_has_escaped_headline() {
        let html = render_landing_page_html(&sample_page());
        assert!(html.contains("Save 20% &lt;today&gt;"));
        assert!(!html.contains("<today>"));
    }

    #[test]
    fn test_body_paragraphs_split_on_blank_lines() {
        let html = render_landing_page_body(&sample_page());
        assert!(html.contains("<p>First paragraph.</p>"));
        assert!(html.contains("<p>Second paragraph.</p>"));
    }

    #[test]
    fn test_form_carries_page_id_and_honeypot() {
        let html = render_landing_page_body(&sample_page());
        assert!(html.contains(&format!("value=\"{}\"", Uuid::nil())));
        assert!(html.contains("name=\"website\""));
        assert!(html.contains("aria-hidden=\"true\""));
    }

    #[test]
    fn test_required_fields_marked() {
        let html = render_landing_page_body(&sample_page());
        assert!(html.contains("Email Address *"));
        assert!(html.contains("name=\"email\""));
        // phone is optional in the default form
        assert!(html.contains("Phone Number</label>"));
    }

    #[test]
    fn test_textarea_fields_render_as_textarea() {
        let mut page = sample_page();
        page.form_fields = FormFields {
            fields: vec![FormField {
                name: "message".to_string(),
                label: "Message".to_string(),
                field_type: "textarea".to_string(),
                required: false,
                placeholder: None,
            }],
        };
        let html = render_landing_page_body(&page);
        assert!(html.contains("<textarea name=\"message\""));
    }

    #[test]
    fn test_cta_text_is_button_label() {
        let html = render_landing_page_body(&sample_page());
        assert!(html.contains("<button type=\"submit\">Sign Up</button>"));
    }

    #[test]
    fn test_document_title_and_slug() {
        let html = render_landing_page_html(&sample_page());
        assert!(html.contains("<title>Spring Sale</title>"));
        assert!(html.contains("data-slug=\"spring-sale\""));
    }
}
