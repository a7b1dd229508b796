//! Command implementations.

pub mod config;
pub mod exams;
pub mod login;
pub mod payment;
pub mod schedule;
pub mod students;

use campass_portal::academic::AcademicClient;
use campass_portal::bridge::ServiceBridge;
use campass_portal::credentials::{Credential, CredentialStore};
use campass_portal::session::CasSession;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Builds a session and logs it in with the stored or configured credential.
///
/// The stored credential file wins; without one, the `[credentials]` config
/// section (with secret references resolved) is used. A successful login
/// refreshes the stored file.
pub(crate) async fn established_session(config: &ClientConfig) -> ClientResult<CasSession> {
    let session = CasSession::new(config.portal.cas())?;
    let store = CredentialStore::new(config.credentials.store_file());

    let mut credential = match store.load()? {
        Some(credential) => credential,
        None => credential_from_config(config)?,
    };

    if !session.login_with_password(&mut credential).await? {
        return Err(ClientError::Auth(
            "the portal rejected the credential; run `campass login` again".to_string(),
        ));
    }
    store.save(&credential)?;
    Ok(session)
}

/// Bridges the session into the academic system.
pub(crate) async fn bridged_academic(
    config: &ClientConfig,
    session: &CasSession,
) -> ClientResult<AcademicClient> {
    let mut academic = AcademicClient::new(config.portal.academic());
    if !academic.authenticate_by_cas(session).await? {
        return Err(ClientError::Auth(
            "could not bridge into the academic system".to_string(),
        ));
    }
    Ok(academic)
}

fn credential_from_config(config: &ClientConfig) -> ClientResult<Credential> {
    let settings = &config.credentials;
    let (Some(username), Some(password)) =
        (settings.username.as_deref(), settings.password.as_deref())
    else {
        return Err(ClientError::Config(format!(
            "no stored credential and no [credentials] section in {}; \
             run `campass login --username <id> --password <password>` first",
            ClientConfig::default_path().display()
        )));
    };
    let username = crate::secret::resolve("username", username)?;
    let password = crate::secret::resolve("password", password)?;
    Ok(Credential::new(username, password))
}
