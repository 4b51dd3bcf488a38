//! Email and SMS templates
//!
//! Subjects and bodies for every notification the workflows dispatch.

/// A rendered email
#[derive(Debug, Clone)]
pub struct EmailContent {
    pub subject: String,
    pub html_body: String,
}

/// Verification code email
#[must_use]
pub fn otp_email(otp: &str) -> EmailContent {
    EmailContent {
        subject: "Your KomfyAz Verification Code".to_string(),
        html_body: format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2>KomfyAz - Verification Code</h2>\
             <p>Your verification code is:</p>\
             <div style=\"background: #f5f5f5; padding: 20px; text-align: center; \
             font-size: 32px; letter-spacing: 8px; font-weight: bold; border-radius: 8px;\">\
             {otp}</div>\
             <p style=\"color: #666; margin-top: 16px;\">This code expires in 5 minutes. \
             Do not share it with anyone.</p>\
             </div>"
        ),
    }
}

/// Verification code SMS body
#[must_use]
pub fn otp_sms(otp: &str) -> String {
    format!("Your KomfyAz verification code is {otp}. It expires in 5 minutes.")
}

/// Warranty activation confirmation email
#[must_use]
pub fn warranty_confirmation_email(
    model_name: &str,
    start_date: &str,
    end_date: &str,
    frontend_url: &str,
) -> EmailContent {
    EmailContent {
        subject: "Warranty Activated - KomfyAz".to_string(),
        html_body: format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2>KomfyAz - Warranty Activated</h2>\
             <p>Your warranty has been successfully activated.</p>\
             <table style=\"width: 100%; border-collapse: collapse; margin: 16px 0;\">\
             <tr><td style=\"padding: 8px; font-weight: bold;\">Product</td>\
             <td style=\"padding: 8px;\">{model_name}</td></tr>\
             <tr><td style=\"padding: 8px; font-weight: bold;\">Start Date</td>\
             <td style=\"padding: 8px;\">{start_date}</td></tr>\
             <tr><td style=\"padding: 8px; font-weight: bold;\">End Date</td>\
             <td style=\"padding: 8px;\">{end_date}</td></tr>\
             </table>\
             <p>You can view your warranty details in your \
             <a href=\"{frontend_url}/dashboard\">customer dashboard</a>.</p>\
             </div>"
        ),
    }
}

/// Password reset link email
#[must_use]
pub fn password_reset_email(reset_token: &str, frontend_url: &str) -> EmailContent {
    let reset_url = format!("{frontend_url}/reset-password?token={reset_token}");
    EmailContent {
        subject: "Password Reset - KomfyAz".to_string(),
        html_body: format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2>KomfyAz - Password Reset</h2>\
             <p>You requested a password reset. Click the button below to set a new password:</p>\
             <div style=\"text-align: center; margin: 24px 0;\">\
             <a href=\"{reset_url}\" style=\"background: #2563eb; color: white; \
             padding: 12px 24px; text-decoration: none; border-radius: 6px; \
             display: inline-block;\">Reset Password</a></div>\
             <p style=\"color: #666;\">This link expires in 1 hour. If you didn't request \
             this, you can safely ignore this email.</p>\
             </div>"
        ),
    }
}
