use franchise_hub::config::NotificationConfig;
use franchise_hub::workflows::enquiries::{
    EnquiryNotification, EnquiryNotifier, NotificationError,
};
use serde_json::{json, Value};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Notifier selected at startup: SendGrid when an API key is configured, log output otherwise.
pub(crate) enum ConfiguredNotifier {
    SendGrid(SendGridNotifier),
    Log(LogNotifier),
}

impl ConfiguredNotifier {
    pub(crate) fn from_config(config: &NotificationConfig) -> Self {
        match &config.sendgrid_api_key {
            Some(api_key) => ConfiguredNotifier::SendGrid(SendGridNotifier::new(
                config.sendgrid_api_url.clone(),
                api_key.clone(),
                config.from_address.clone(),
            )),
            None => ConfiguredNotifier::Log(LogNotifier),
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            ConfiguredNotifier::SendGrid(_) => "sendgrid",
            ConfiguredNotifier::Log(_) => "log",
        }
    }
}

impl EnquiryNotifier for ConfiguredNotifier {
    fn notify(&self, notification: &EnquiryNotification) -> Result<(), NotificationError> {
        match self {
            ConfiguredNotifier::SendGrid(notifier) => notifier.notify(notification),
            ConfiguredNotifier::Log(notifier) => notifier.notify(notification),
        }
    }
}

/// Writes notifications to the tracing output instead of sending them.
pub(crate) struct LogNotifier;

impl EnquiryNotifier for LogNotifier {
    fn notify(&self, notification: &EnquiryNotification) -> Result<(), NotificationError> {
        info!(
            enquiry_id = notification.enquiry_id.0,
            subject = %notification.subject,
            recipients = %notification.recipients.join(", "),
            "enquiry notification (mail relay not configured)"
        );
        Ok(())
    }
}

/// SendGrid v3 mail-send client. Delivery runs on the tokio runtime so intake never waits on it.
pub(crate) struct SendGridNotifier {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

impl SendGridNotifier {
    pub(crate) fn new(api_url: String, api_key: String, from_address: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from_address,
        }
    }

    pub(crate) fn payload(&self, notification: &EnquiryNotification) -> Value {
        let to: Vec<Value> = notification
            .recipients
            .iter()
            .map(|email| json!({ "email": email }))
            .collect();

        json!({
            "personalizations": [{ "to": to }],
            "from": { "email": self.from_address },
            "subject": notification.subject,
            "content": [{ "type": "text/plain", "value": notification.body }],
        })
    }
}

impl EnquiryNotifier for SendGridNotifier {
    fn notify(&self, notification: &EnquiryNotification) -> Result<(), NotificationError> {
        if notification.recipients.is_empty() {
            debug!(enquiry_id = notification.enquiry_id.0, "no recipients; notification skipped");
            return Ok(());
        }

        let runtime = Handle::try_current()
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        let request = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.payload(notification));
        let enquiry_id = notification.enquiry_id.0;

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(enquiry_id, status = response.status().as_u16(), "enquiry notification accepted");
                }
                Ok(response) => {
                    let error = NotificationError::Rejected {
                        status: response.status().as_u16(),
                    };
                    warn!(enquiry_id, %error, "enquiry notification failed");
                }
                Err(err) => {
                    let error = NotificationError::Transport(err.to_string());
                    warn!(enquiry_id, %error, "enquiry notification failed");
                }
            }
        });

        Ok(())
    }
}
