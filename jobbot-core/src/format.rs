use crate::{JobListing, MatchScore, OutgoingMessage};

pub const APPLY_BUTTON: &str = "Apply Now";

/// Escapes text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn listing_header(listing: &JobListing) -> String {
    format!(
        "<b>Job Title:</b> {}\n<b>Company:</b> {}\n<b>Location:</b> {}",
        escape_html(&listing.title),
        escape_html(&listing.company),
        escape_html(&listing.location)
    )
}

/// A search result, with its relevance score.
pub fn scored_listing_message(listing: &JobListing, score: &MatchScore) -> OutgoingMessage {
    let mut text = listing_header(listing);
    text.push_str(&format!(
        "\n<b>✨ Match Score™: {}/100</b>",
        score.display_score()
    ));
    if !score.reason.is_empty() {
        text.push_str(&format!("\n<i>Reason: {}</i>", escape_html(&score.reason)));
    }
    if listing.has_salary() {
        text.push_str(&format!("\n<b>Salary:</b> {}", escape_html(&listing.salary)));
    }
    OutgoingMessage::html(text).with_url_button(APPLY_BUTTON, listing.link.clone())
}

/// A daily alert entry; alerts are not scored.
pub fn alert_listing_message(listing: &JobListing) -> OutgoingMessage {
    let mut text = listing_header(listing);
    if listing.has_salary() {
        text.push_str(&format!("\n<b>Salary:</b> {}", escape_html(&listing.salary)));
    }
    OutgoingMessage::html(text).with_url_button(APPLY_BUTTON, listing.link.clone())
}

pub fn alert_summary_message(keyword: &str, count: usize) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "☀️ Good morning! Here are your daily job alerts for '{}' ({} found):",
        keyword, count
    ))
}

/// Formats whole rupees with Indian digit grouping, e.g. `8,00,000`.
pub fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Button, ParseMode, SALARY_PLACEHOLDER};

    fn listing(salary: &str) -> JobListing {
        JobListing {
            title: "Rust <Engineer>".to_string(),
            company: "A & B".to_string(),
            location: "Remote".to_string(),
            salary: salary.to_string(),
            link: "https://jobs.example/1".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn test_scored_listing_message() {
        let score = MatchScore {
            score: Some(80),
            reason: "Strong match".to_string(),
        };
        let message = scored_listing_message(&listing("£50k"), &score);

        assert_eq!(message.parse_mode, Some(ParseMode::Html));
        assert!(message.text.contains("Rust &lt;Engineer&gt;"));
        assert!(message.text.contains("A &amp; B"));
        assert!(message.text.contains("80/100"));
        assert!(message.text.contains("Strong match"));
        assert!(message.text.contains("£50k"));
        assert_eq!(
            message.buttons,
            vec![vec![Button::Url {
                text: APPLY_BUTTON.to_string(),
                url: "https://jobs.example/1".to_string(),
            }]]
        );
    }

    #[test]
    fn test_unscored_listing_shows_na_and_hides_placeholder_salary() {
        let message = scored_listing_message(&listing(SALARY_PLACEHOLDER), &MatchScore::unavailable());
        assert!(message.text.contains("N/A/100"));
        assert!(!message.text.contains("Salary"));
        assert!(!message.text.contains("Reason"));
    }

    #[test]
    fn test_alert_listing_message() {
        let message = alert_listing_message(&listing("Up to 40000"));
        assert!(message.text.contains("Up to 40000"));
        assert!(!message.text.contains("Match Score"));
    }

    #[test]
    fn test_format_rupees() {
        assert_eq!(format_rupees(0), "0");
        assert_eq!(format_rupees(999), "999");
        assert_eq!(format_rupees(7900), "7,900");
        assert_eq!(format_rupees(800000), "8,00,000");
        assert_eq!(format_rupees(12345678), "1,23,45,678");
    }
}
