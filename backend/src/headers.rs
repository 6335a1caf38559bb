//! Alert headers
//!
//! Clients display a notification for every entity mutation. The notification travels in
//! response headers, not in the body: `X-<app>-alert` carries a message key such as
//! `peducApp.peer.created` and `X-<app>-params` carries its parameter (the entity id).
//! Failures use `X-<app>-error: error.<reason>` with the entity name as parameter.

use rocket::http::Header;

pub const DEFAULT_APPLICATION_NAME: &str = "peducApp";

#[derive(Clone, Debug)]
pub struct HeaderUtil {
    application_name: String,
}

impl Default for HeaderUtil {
    fn default() -> Self {
        Self::new(DEFAULT_APPLICATION_NAME)
    }
}

impl HeaderUtil {
    pub fn new(application_name: &str) -> Self {
        Self {
            application_name: application_name.to_string(),
        }
    }

    pub fn alert_header(&self) -> String {
        format!("X-{}-alert", self.application_name)
    }

    pub fn params_header(&self) -> String {
        format!("X-{}-params", self.application_name)
    }

    pub fn error_header(&self) -> String {
        format!("X-{}-error", self.application_name)
    }

    pub fn alert(&self, message: String, param: &str) -> Vec<Header<'static>> {
        vec![
            Header::new(self.alert_header(), message),
            Header::new(self.params_header(), param.to_string()),
        ]
    }

    pub fn entity_creation_alert(&self, entity: &str, param: &str) -> Vec<Header<'static>> {
        self.alert(format!("{}.{entity}.created", self.application_name), param)
    }

    pub fn entity_update_alert(&self, entity: &str, param: &str) -> Vec<Header<'static>> {
        self.alert(format!("{}.{entity}.updated", self.application_name), param)
    }

    pub fn entity_deletion_alert(&self, entity: &str, param: &str) -> Vec<Header<'static>> {
        self.alert(format!("{}.{entity}.deleted", self.application_name), param)
    }

    pub fn failure_alert(&self, entity: &str, error_key: &str) -> Vec<Header<'static>> {
        vec![
            Header::new(self.error_header(), format!("error.{error_key}")),
            Header::new(self.params_header(), entity.to_string()),
        ]
    }
}
