//! Payment platform commands.

use campass_portal::bridge::ServiceBridge;
use campass_portal::payment::PaymentClient;
use campass_portal::session::CasSession;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Shows the payment account profile.
pub async fn info(config: &ClientConfig) -> ClientResult<()> {
    let (session, payment) = bridged(config).await?;
    let user = payment.user_info(&session).await?;
    println!("{} ({})", user.name, user.student_id);
    println!("account id: {}", user.id);
    println!("sex: {}", user.sex);
    Ok(())
}

/// Lists the payable projects.
pub async fn projects(config: &ClientConfig) -> ClientResult<()> {
    let (session, payment) = bridged(config).await?;
    let projects = payment.projects(&session).await?;
    if projects.is_empty() {
        println!("No payable projects listed.");
        return Ok(());
    }
    for project in projects {
        println!("{}  {}", project.id, project.name);
    }
    Ok(())
}

async fn bridged(config: &ClientConfig) -> ClientResult<(CasSession, PaymentClient)> {
    let session = super::established_session(config).await?;
    let mut payment = PaymentClient::new(config.portal.payment());
    if !payment.authenticate_by_cas(&session).await? {
        return Err(ClientError::Auth(
            "could not bridge into the payment platform".to_string(),
        ));
    }
    Ok((session, payment))
}
