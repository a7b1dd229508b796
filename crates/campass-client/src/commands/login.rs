//! Login commands.

use campass_portal::credentials::{Credential, CredentialStore};
use campass_portal::session::CasSession;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Runs the password or SMS login flow and stores the credential.
pub async fn run(
    username: Option<String>,
    password: Option<String>,
    sms: bool,
    phone: Option<String>,
    code: Option<String>,
    config: &ClientConfig,
) -> ClientResult<()> {
    if sms {
        return sms_flow(phone, code, config).await;
    }

    let username = pick(username, config.credentials.username.as_deref(), "username")?;
    let password = pick(password, config.credentials.password.as_deref(), "password")?;

    let session = CasSession::new(config.portal.cas())?;
    let mut credential = Credential::new(username, password);
    if !session.login_with_password(&mut credential).await? {
        return Err(ClientError::Auth(
            "the portal rejected the credential".to_string(),
        ));
    }

    let store = CredentialStore::new(config.credentials.store_file());
    store.save(&credential)?;

    match credential.student_id {
        Some(ref id) => println!("Logged in as {} (student {}).", credential.username, id),
        None => println!("Logged in as {}.", credential.username),
    }
    println!("Credential stored at {}.", store.path().display());
    Ok(())
}

async fn sms_flow(
    phone: Option<String>,
    code: Option<String>,
    config: &ClientConfig,
) -> ClientResult<()> {
    let phone =
        phone.ok_or_else(|| ClientError::Config("--sms needs --phone".to_string()))?;
    let session = CasSession::new(config.portal.cas())?;

    let Some(code) = code else {
        if !session.send_sms_code(&phone).await? {
            return Err(ClientError::Auth(
                "the portal refused to send a code".to_string(),
            ));
        }
        println!("Code sent to {}. Finish with:", phone);
        println!("  campass login --sms --phone {} --code <code>", phone);
        return Ok(());
    };

    if !session.login_with_sms(&phone, &code).await? {
        return Err(ClientError::Auth("the portal rejected the code".to_string()));
    }
    match session.student_id() {
        Some(id) => println!("Logged in as student {}.", id),
        None => println!("Logged in."),
    }
    Ok(())
}

fn pick(flag: Option<String>, configured: Option<&str>, what: &str) -> ClientResult<String> {
    let raw = flag
        .or_else(|| configured.map(str::to_string))
        .ok_or_else(|| {
            ClientError::Config(format!(
                "no {what} given; pass --{what} or set it in [credentials]"
            ))
        })?;
    crate::secret::resolve(what, &raw)
}
