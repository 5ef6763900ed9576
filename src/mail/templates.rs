use tera::{Context, Tera};

use super::{MailError, OutgoingEmail};

const RESET_TEMPLATE_NAME: &str = "reset_password.html";
const RESET_TEMPLATE: &str = include_str!("templates/reset_password.html");

/// Data for the password reset email
#[derive(Debug, Clone)]
pub struct ResetEmail<'a> {
    pub portal_name: &'a str,
    pub to_email: &'a str,
    pub to_name: &'a str,
    pub reset_link: &'a str,
    pub expires_in_minutes: i64,
}

pub fn render_reset_email(data: &ResetEmail<'_>) -> Result<OutgoingEmail, MailError> {
    let mut tera = Tera::default();
    tera.add_raw_template(RESET_TEMPLATE_NAME, RESET_TEMPLATE)?;

    let mut context = Context::new();
    context.insert("portal_name", data.portal_name);
    context.insert("name", data.to_name);
    context.insert("reset_link", data.reset_link);
    context.insert("expires_in_minutes", &data.expires_in_minutes);

    let html = tera.render(RESET_TEMPLATE_NAME, &context)?;

    Ok(OutgoingEmail {
        to_email: data.to_email.to_string(),
        to_name: Some(data.to_name.to_string()),
        subject: format!("Reset Your {} Password", data.portal_name),
        html,
    })
}
