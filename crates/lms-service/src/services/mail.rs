//! Account mails. Bodies are plain text; delivery is handled outside the service.

use lms_core::{Member, OutgoingMail, RESET_TOKEN_TTL_HOURS};

/// Link that lets a pending account choose its first password
pub fn setup_mail(member: &Member, token: &str, base_url: &str) -> OutgoingMail {
    OutgoingMail {
        to: member.email.clone(),
        subject: "Set up your library account".to_string(),
        body: format!(
            "Hello {name},\n\n\
             An account ({code}) has been created for you.\n\
             Choose your password here:\n\n\
             {base_url}/setup?token={token}\n",
            name = member.full_name,
            code = member.user_code,
        ),
    }
}

pub fn password_reset_mail(member: &Member, token: &str, base_url: &str) -> OutgoingMail {
    OutgoingMail {
        to: member.email.clone(),
        subject: "Reset your library password".to_string(),
        body: format!(
            "Hello {name},\n\n\
             Use the link below to choose a new password. \
             It expires in {RESET_TOKEN_TTL_HOURS} hours.\n\n\
             {base_url}/reset-password?token={token}\n\n\
             If you did not ask for this, ignore this mail.\n",
            name = member.full_name,
        ),
    }
}
