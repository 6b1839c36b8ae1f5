//! Shared email content templates
//!
//! Canonical content generators used by both the SMTP and mock services.

fn html_shell(heading: &str, body: &str, button_label: &str, link: &str, footer: &str) -> String {
    format!(
        r#"
            <html>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #2b6cb0;">{heading}</h2>

                    {body}

                    <div style="text-align: center; margin: 30px 0;">
                        <a href="{link}"
                           style="background-color: #2b6cb0; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block; font-weight: bold;">
                            {button_label}
                        </a>
                    </div>

                    <p>Or copy and paste this link in your browser:</p>
                    <p style="background-color: #f5f5f5; padding: 10px; border-radius: 4px; word-break: break-all;">
                        <a href="{link}">{link}</a>
                    </p>

                    <p style="color: #666; font-size: 14px;"><em>{footer}</em></p>

                    <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">

                    <p style="color: #666; font-size: 12px;">Thanks, The TeamTact Team</p>
                </div>
            </body>
            </html>
            "#,
    )
}

/// Plain-text body for the email verification message.
pub fn verification_text(fullname: &str, link: &str, expires_in_hours: i64) -> String {
    format!(
        "Hi {},\n\n\
        Welcome to TeamTact! Please confirm your email address by opening the link below:\n\
        {}\n\n\
        This link will expire in {} hours.\n\n\
        If you didn't create an account, you can ignore this email.\n\n\
        Thanks,\n\
        The TeamTact Team",
        fullname, link, expires_in_hours
    )
}

pub fn verification_html(fullname: &str, link: &str, expires_in_hours: i64) -> String {
    html_shell(
        "Verify your email address",
        &format!(
            "<p>Hi {},</p><p>Welcome to TeamTact! Please confirm your email address.</p>",
            fullname
        ),
        "Verify Email",
        link,
        &format!("This link will expire in {} hours.", expires_in_hours),
    )
}

/// Plain-text body for the password reset message.
pub fn password_reset_text(fullname: &str, link: &str, expires_in_minutes: i64) -> String {
    format!(
        "Hi {},\n\n\
        We received a request to reset your TeamTact password. Open the link below to choose a new one:\n\
        {}\n\n\
        This link will expire in {} minutes.\n\n\
        If you didn't request a reset, you can ignore this email.\n\n\
        Thanks,\n\
        The TeamTact Team",
        fullname, link, expires_in_minutes
    )
}

pub fn password_reset_html(fullname: &str, link: &str, expires_in_minutes: i64) -> String {
    html_shell(
        "Reset your password",
        &format!(
            "<p>Hi {},</p><p>We received a request to reset your TeamTact password.</p>",
            fullname
        ),
        "Reset Password",
        link,
        &format!("This link will expire in {} minutes.", expires_in_minutes),
    )
}

/// Plain-text body for a team invitation email.
pub fn team_invitation_text(
    inviter_name: &str,
    team_name: &str,
    role: &str,
    link: &str,
    expires_in_days: i64,
) -> String {
    format!(
        "Hi there!\n\n\
        {} has invited you to join the team '{}' as {}.\n\n\
        Click the link below to accept the invitation:\n\
        {}\n\n\
        This invitation will expire in {} days.\n\n\
        If you don't have a TeamTact account, sign up with this email address first.\n\n\
        Thanks,\n\
        The TeamTact Team",
        inviter_name, team_name, role, link, expires_in_days
    )
}

/// Styled HTML body for a team invitation email.
pub fn team_invitation_html(
    inviter_name: &str,
    team_name: &str,
    role: &str,
    link: &str,
    expires_in_days: i64,
) -> String {
    html_shell(
        &format!("You're invited to join {}!", team_name),
        &format!(
            "<p>Hi there!</p><p><strong>{}</strong> has invited you to join the team '<strong>{}</strong>' as <strong>{}</strong>.</p>",
            inviter_name, team_name, role
        ),
        "Accept Invitation",
        link,
        &format!("This invitation will expire in {} days.", expires_in_days),
    )
}
