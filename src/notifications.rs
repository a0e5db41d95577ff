//! The four transactional messages: one per (route, recipient) pair.
use htmlescape::encode_minimal;

use crate::domain::{CareerApplication, ContactInquiry};
use crate::email_client::EmailContent;

const SIGNATURE_HTML: &str = "<p>Best regards,<br>Team NAOH</p>";
const SIGNATURE_TEXT: &str = "Best regards,\nTeam NAOH";

pub fn contact_thank_you(inquiry: &ContactInquiry) -> EmailContent {
    EmailContent {
        subject: "Welcome to HR web".into(),
        html: format!(
            "<p>Hello {name}</p><p>Thank you for contacting us</p>{signature}",
            name = encode_minimal(&inquiry.name),
            signature = SIGNATURE_HTML,
        ),
        text: format!(
            "Hello {name}\n\nThank you for contacting us\n\n{signature}",
            name = inquiry.name,
            signature = SIGNATURE_TEXT,
        ),
    }
}

pub fn contact_owner_notification(inquiry: &ContactInquiry) -> EmailContent {
    let fields = [
        ("Name", inquiry.name.as_str()),
        ("Email", inquiry.email.as_str()),
        ("Mobile", inquiry.mobile.as_str()),
        ("Service", inquiry.service.as_str()),
        ("Message", inquiry.message.as_str()),
    ];
    EmailContent {
        subject: "New Contact Form Submission".into(),
        html: format!(
            "<p>You have a new contact form submission:</p>{}",
            html_field_list(&fields)
        ),
        text: format!(
            "You have a new contact form submission:\n\n{}",
            text_field_list(&fields)
        ),
    }
}

pub fn application_receipt(application: &CareerApplication) -> EmailContent {
    EmailContent {
        subject: "Application Received".into(),
        html: format!(
            "<p>Hello {name},</p><p>Thank you for applying for the {position} position. \
             We have received your application and will get back to you soon.</p>{signature}",
            name = encode_minimal(&application.name),
            position = encode_minimal(&application.position),
            signature = SIGNATURE_HTML,
        ),
        text: format!(
            "Hello {name},\n\nThank you for applying for the {position} position. \
             We have received your application and will get back to you soon.\n\n{signature}",
            name = application.name,
            position = application.position,
            signature = SIGNATURE_TEXT,
        ),
    }
}

pub fn application_owner_notification(application: &CareerApplication) -> EmailContent {
    let fields = [
        ("Name", application.name.as_str()),
        ("Email", application.email.as_str()),
        ("Phone", application.phone.as_str()),
        ("Position", application.position.as_str()),
        ("Message", application.message.as_deref().unwrap_or("")),
    ];
    EmailContent {
        subject: "New Career Application".into(),
        html: format!(
            "<p>You have a new career application:</p>{}",
            html_field_list(&fields)
        ),
        text: format!(
            "You have a new career application:\n\n{}",
            text_field_list(&fields)
        ),
    }
}

fn html_field_list(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(label, value)| {
            format!(
                "<p><strong>{}:</strong> {}</p>",
                label,
                encode_minimal(value)
            )
        })
        .collect()
}

fn text_field_list(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
}
