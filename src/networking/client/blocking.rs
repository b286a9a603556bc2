//! Blocking HTTP transport for Piazza

use crate::config::ClientConfig;
use crate::errors::Result;
use crate::networking::client::{HttpMethod, HttpRequest, HttpResponse, Transport};
use log::{debug, trace};
use reqwest::blocking::Client;
use reqwest::redirect;

/// Create a configured HTTP client for Piazza operations
///
/// Redirects are left to the session so cookies set on intermediate hops
/// are not lost, and the client keeps no cookie store of its own.
///
/// # Example
/// ```no_run
/// use piazza_api::config::ClientConfig;
/// use piazza_api::networking::create_client;
/// let client = create_client(&ClientConfig::default()).expect("Failed to create client");
/// ```
pub fn create_client(config: &ClientConfig) -> Result<Client> {
    Ok(Client::builder()
        .redirect(redirect::Policy::none())
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .build()?)
}

/// [`Transport`] over a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct BlockingTransport {
    client: Client,
}

impl BlockingTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for BlockingTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!("{:?} {}", request.method, request.url);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => self.client.post(request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        trace!("status {}", status);
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
