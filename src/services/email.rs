use std::sync::Arc;

use resend_rs::types::CreateEmailBaseOptions;
use resend_rs::Resend;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Message sent from the public contact form.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

/// Outgoing mail. Without an API key every message is only logged.
#[derive(Clone)]
pub struct EmailService {
    client: Option<Arc<Resend>>,
    from_email: String,
    contact_inbox: String,
}

impl EmailService {
    pub fn new(api_key: &str, from_email: String, contact_inbox: String) -> Self {
        let client = (!api_key.trim().is_empty()).then(|| Arc::new(Resend::new(api_key)));
        Self {
            client,
            from_email,
            contact_inbox,
        }
    }

    async fn deliver(&self, to: &str, subject: &str, html: String) -> AppResult<()> {
        let Some(client) = &self.client else {
            info!(to = %to, from = %self.from_email, "📧 Would send email. Subject: {}", subject);
            return Ok(());
        };

        let email = CreateEmailBaseOptions::new(&self.from_email, [to], subject).with_html(&html);
        client.emails.send(email).await.map_err(|e| {
            warn!("Email delivery to {} failed: {}", to, e);
            AppError::Internal(format!("email delivery failed: {}", e))
        })?;

        info!(to = %to, "📧 Sent email. Subject: {}", subject);
        Ok(())
    }

    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        reset_token: &str,
        base_url: &str,
    ) -> AppResult<()> {
        let reset_url = reset_link(base_url, reset_token);
        info!("Password reset link for {}: {}", to_email, reset_url);

        let html = format!(
            "<p>Has solicitado restablecer tu contraseña.</p>\
             <p><a href=\"{url}\">Restablecer contraseña</a></p>\
             <p>El enlace caduca en una hora.</p>",
            url = reset_url
        );
        self.deliver(to_email, "Restablecer contraseña", html).await
    }

    pub async fn send_contact_notification(&self, message: &ContactMessage) -> AppResult<()> {
        let html = format!(
            "<p><strong>{name}</strong> &lt;{email}&gt;</p><p>Teléfono: {phone}</p><p>{body}</p>",
            name = escape(&message.name),
            email = escape(&message.email),
            phone = escape(message.phone.as_deref().unwrap_or("sin teléfono")),
            body = escape(&message.message).replace('\n', "<br>"),
        );
        info!(reply_to = %message.email, "Contact message from {}", message.name);
        self.deliver(&self.contact_inbox, "Nuevo mensaje de contacto", html).await
    }
}

fn reset_link(base_url: &str, token: &str) -> String {
    format!("{}/admin/reset-password?token={}", base_url.trim_end_matches('/'), token)
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
