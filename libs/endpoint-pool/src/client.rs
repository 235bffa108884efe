//! HTTP Client Factory (C3): one long-lived `reqwest::Client` per
//! endpoint, created lazily and mutex-guarded so two callers never race
//! to build the same client.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;

const USER_AGENT: &str = concat!("chainviz-gateway/", env!("CARGO_PKG_VERSION"));
const MIN_TIMEOUT: Duration = Duration::from_millis(500);

pub struct HttpClientFactory {
 clients: Mutex<HashMap<String, Client>>,
}

impl Default for HttpClientFactory {
 fn default() -> Self {
 Self::new()
 }
}

impl HttpClientFactory {
 pub fn new() -> Self {
 HttpClientFactory {
 clients: Mutex::new(HashMap::new()),
 }
 }

 /// Returns the client for `base_url`, building one if this is the
 /// first request to it. `request_timeout` floors at
 /// [`MIN_TIMEOUT`] so a misconfigured near-zero timeout cannot make
 /// every call fail instantly.
 pub fn client_for(&self, base_url: &str, request_timeout: Duration) -> Client {
 let mut clients = self.clients.lock();
 if let Some(client) = clients.get(base_url) {
 return client.clone();
 }

 let timeout = request_timeout.max(MIN_TIMEOUT);
 let client = Client::builder()
.timeout(timeout)
.user_agent(USER_AGENT)
.default_headers({
 let mut headers = reqwest::header::HeaderMap::new();
 headers.insert(reqwest::header::ACCEPT, "application/json".parse().unwrap());
 headers.insert(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9".parse().unwrap());
 headers
 })
.build()
.expect("reqwest client configuration is static and always valid");

 clients.insert(base_url.to_string(), client.clone());
 client
 }

 pub fn client_count(&self) -> usize {
 self.clients.lock().len()
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 #[test]
 fn reuses_client_for_the_same_base_url() {
 let factory = HttpClientFactory::new();
 let _ = factory.client_for("http://a.example.com", Duration::from_secs(5));
 let _ = factory.client_for("http://a.example.com", Duration::from_secs(5));
 let _ = factory.client_for("http://b.example.com", Duration::from_secs(5));
 assert_eq!(factory.client_count(), 2);
 }
}
