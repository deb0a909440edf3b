//! Client notifications sent after a booking write has committed.
//!
//! Handlers enqueue and move on; a task on the actix runtime renders each message and hands it to
//! the [`Mailer`]. Nothing here can change the outcome of a booking.

use crate::models::appointments::Appointment;
use actix_web::web;
use futures::{channel::mpsc, StreamExt};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum Notification {
    Confirmed(Appointment),
    Modified(Appointment),
    Cancelled(Appointment),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub trait Mailer: Send + Sync {
    fn deliver(&self, mail: &Mail) -> anyhow::Result<()>;
}

/// Writes every mail to the log instead of a mail server.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn deliver(&self, mail: &Mail) -> anyhow::Result<()> {
        tracing::info!(
            from = %mail.from,
            to = %mail.to,
            subject = %mail.subject,
            "mail queued for delivery\n{}",
            mail.body
        );
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct MailSettings {
    /// Notifications are skipped while this is unset.
    pub from: Option<String>,
    pub shop_name: String,
    pub app_url: String,
}

impl MailSettings {
    pub fn render(&self, notification: &Notification, from: &str) -> Mail {
        let (appointment, subject, intro, outro) = match notification {
            Notification::Confirmed(a) | Notification::Modified(a) => {
                let action = if let Notification::Modified(_) = notification {
                    "updated"
                } else {
                    "confirmed"
                };
                (
                    a,
                    format!("Appointment {} - {}", action, self.shop_name),
                    format!("Your tire change appointment has been {}:", action),
                    format!(
                        "Important:\n\
                         - Please arrive 5 minutes before your time slot\n\
                         - Bring your tires if you already have them\n\
                         - The service takes about 45 minutes\n\n\
                         To review or change your appointment: {}/mes-rendez-vous",
                        self.app_url
                    ),
                )
            }
            Notification::Cancelled(a) => (
                a,
                format!("Appointment cancelled - {}", self.shop_name),
                "The following appointment has been cancelled:".to_string(),
                format!("You can book a new appointment online: {}", self.app_url),
            ),
        };

        let body = format!(
            "Hello {name},\n\n\
             {intro}\n\n\
             Date: {date}\n\
             Time: {slot}\n\
             Vehicle: {car}\n\
             Name: {name}\n\
             Email: {email}\n\n\
             {outro}\n\n\
             {shop} - Tire change service\n\
             This message was sent automatically, please do not reply.\n",
            name = appointment.client_name,
            intro = intro,
            date = appointment.date.format("%A %-d %B %Y"),
            slot = appointment.time_slot,
            car = appointment.car_brand,
            email = appointment.email,
            outro = outro,
            shop = self.shop_name,
        );

        Mail {
            from: format!("\"{}\" <{}>", self.shop_name, from),
            to: appointment.email.clone(),
            subject,
            body,
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Spawns the delivery task; must be called from within an actix system.
    pub fn start(settings: MailSettings, mailer: Arc<dyn Mailer>) -> Self {
        let (tx, mut rx) = mpsc::unbounded::<Notification>();

        actix_web::rt::spawn(async move {
            while let Some(notification) = rx.next().await {
                let from = match &settings.from {
                    Some(from) => from.clone(),
                    None => {
                        tracing::warn!("mail sender not configured, notification skipped");
                        continue;
                    }
                };
                let mail = settings.render(&notification, &from);
                let to = mail.to.clone();
                let mailer = mailer.clone();
                match web::block(move || mailer.deliver(&mail)).await {
                    Ok(()) => tracing::debug!(%to, "notification delivered"),
                    Err(err) => tracing::error!(%to, error = ?err, "failed to send notification"),
                }
            }
            tracing::debug!("notification queue closed");
        });

        Self { tx }
    }

    pub fn notify(&self, notification: Notification) {
        if let Err(err) = self.tx.unbounded_send(notification) {
            tracing::error!(error = %err, "failed to enqueue notification");
        }
    }
}
