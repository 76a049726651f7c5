use dq_core::QuoteRecord;

pub const APOLOGY_TEXT: &str = "❌ Sorry, couldn't fetch today's quote. Please try again later.";

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders a quote as a Telegram HTML message.
pub fn format_message(quote: &QuoteRecord) -> String {
    format!(
        "🌟 <b>Daily Motivator</b>\n\n\
         📅 <i>{}</i>\n\n\
         <b>{}</b>\n\n\
         {}\n\n\
         — <i>{}</i>",
        escape_html(&quote.date_label),
        escape_html(&quote.title),
        escape_html(&quote.body),
        escape_html(&quote.author),
    )
}

pub fn apology_message() -> &'static str {
    APOLOGY_TEXT
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote() -> QuoteRecord {
        QuoteRecord {
            date_label: "Monday, June 2, 2025".to_string(),
            title: "Stay the Course".to_string(),
            body: "Keep going.\n\nEvery step counts.".to_string(),
            author: "Ralph Marston".to_string(),
            fetch_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        }
    }

    #[test]
    fn test_format_message_template() {
        assert_eq!(
            format_message(&quote()),
            "🌟 <b>Daily Motivator</b>\n\n📅 <i>Monday, June 2, 2025</i>\n\n<b>Stay the Course</b>\n\n\
             Keep going.\n\nEvery step counts.\n\n— <i>Ralph Marston</i>"
        );
    }

    #[test]
    fn test_format_message_escapes_markup() {
        let mut q = quote();
        q.title = "Rock & <Roll>".to_string();
        let text = format_message(&q);
        assert!(text.contains("<b>Rock &amp; &lt;Roll&gt;</b>"));
    }
}
