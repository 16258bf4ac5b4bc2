use jobbot_core::format::{escape_html, format_rupees};

pub const START_PAYMENT: &str = "start_payment";

pub fn welcome(first_name: &str) -> String {
    format!(
        "👋 <b>Welcome to UOR Job Bot, {}!</b>\n\n\
         I'm your intelligent career assistant. Just tell me what you're looking for!\n\n\
         <b>Example:</b> <code>find me remote software engineer jobs</code>\n\n\
         <b>Top Features:</b>\n\
         🧠 <b>Smart Search:</b> I understand natural language.\n\
         📅 <b>Daily Alerts:</b> Get custom job alerts every morning with /daily.\n\
         💎 <b>Lifetime Premium:</b> Unlock unlimited features with /premium.\n\n\
         Type /help to see all commands.",
        escape_html(first_name)
    )
}

pub const HELP: &str = "<b>Here's how I can help you:</b>\n\n\
    <b>Job Searching</b>\n\
    To search for a job, just send me a message with what you want. For example:\n\
    - <code>data science internships in bangalore</code>\n\
    - <code>work from home python developer jobs</code>\n\n\
    <b>Commands</b>\n\
    /start - Welcome message\n\
    /daily - Set up a conversational daily job alert\n\
    /stop - Unsubscribe from daily job alerts (or cancel an alert setup)\n\
    /premium - Upgrade to a Lifetime Premium account\n\
    /help - Shows this message";

pub const UNKNOWN_COMMAND: &str = "I don't know that command. Type /help to see what I can do.";

pub const DAILY_START: &str = "Of course! I can set up a daily job alert for you.\n\n\
    What kind of job or skill are you looking for? (e.g., 'Software Engineer' or 'Python')";

pub const KEYWORD_REPROMPT: &str = "Please tell me a job title or skill to search for.";

pub fn ask_location(keyword: &str) -> String {
    format!(
        "Great, '{}'. Now, where should I look for this job?\n\n\
         You can give me a city name or simply say 'remote'.",
        escape_html(keyword)
    )
}

pub const LOCATION_REPROMPT: &str = "Please give me a city name or say 'remote'.";

pub fn ask_salary(location: &str) -> String {
    format!(
        "Okay, I'll search in '{}'.\n\n\
         What is the minimum annual salary (in ₹) you're looking for? (e.g., 800000).\n\n\
         Type <b>0</b> if you don't want to filter by salary.",
        escape_html(location)
    )
}

pub const SALARY_REPROMPT: &str =
    "That doesn't look like a valid number. Please enter the salary again (e.g., 500000).";

pub fn alert_confirmed(keyword: &str, location: &str, min_salary: u64) -> String {
    let salary_text = if min_salary > 0 {
        format!("with a minimum salary of ₹{}", format_rupees(min_salary))
    } else {
        "with no salary preference".to_string()
    };
    format!(
        "Perfect! Your alert is all set up. I will search for <b>{}</b> jobs in <b>{}</b> {}.\n\n\
         You can change this anytime by running /daily again.",
        escape_html(keyword),
        escape_html(location),
        salary_text
    )
}

pub const SETUP_CANCELLED: &str = "Okay, I've cancelled the setup.";
pub const UNSUBSCRIBED: &str = "You have been unsubscribed from all daily job alerts.";

pub const QUOTA_EXHAUSTED: &str =
    "You have reached your daily search limit. Upgrade to /premium for unlimited searches.";
pub const UNDERSTANDING: &str = "🧠 Understanding your request...";

pub fn searching(keywords: &str, location: &str) -> String {
    format!("🔍 Searching for '{}' jobs in '{}'...", keywords, location)
}

pub const NO_JOBS: &str = "No jobs found for your search criteria.";
pub const SOMETHING_WENT_WRONG: &str = "Sorry, something went wrong. Please try again.";

pub const PREMIUM_OFFER: &str = "<b>Go Premium for LIFE!</b>\n\n\
    For a one-time payment, unlock the best features forever.\n\n\
    💎 <b>Premium Plan (Lifetime):</b>\n\
    \u{20}\u{20}- Unlimited intelligent job searches\n\
    \u{20}\u{20}- Daily alerts with salary preferences\n\
    \u{20}\u{20}- Job Match Score™ to see job relevance\n\n\
    <b>Special Offer:</b> Just <b>₹79</b> for Lifetime Access!\n\n\
    Click below to get instant premium access forever.";
pub const PAY_BUTTON: &str = "Pay ₹79 for Lifetime Access";
pub const ALREADY_PREMIUM: &str =
    "💎 You already have Lifetime Premium. Enjoy unlimited searches!";

pub const GENERATING_LINK: &str = "Generating your secure payment link...";
pub const LINK_READY: &str =
    "Your payment link is ready. You will be upgraded after your payment is confirmed.";
pub const PAY_LINK_BUTTON: &str = "Click Here to Pay Securely";
pub const PAYMENT_LINK_FAILED: &str =
    "Sorry, we couldn't create a payment link. Please try again later.";

pub const GRANT_USAGE: &str = "Usage: /grant <user_id>";

pub fn premium_granted(user_id: i64) -> String {
    format!("User {} now has Lifetime Premium.", user_id)
}
